use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use derivative::Derivative;
use printer::theme::ThemeExt;
use printer::{Alloc, Builder, Precedence, Print, PrintCfg};
use serde_derive::{Deserialize, Serialize};

use crate::ident::VarBind;

use super::Exp;

static NEXT_VAR_ID: AtomicU64 = AtomicU64::new(0);

/// The globally unique identity of a bound variable.
///
/// Fresh ids come from a process-wide counter. Deserialization bumps the
/// counter past every id it reads, so ids generated later can never collide
/// with ids restored from an object file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(u64);

impl VarId {
    pub fn fresh() -> Self {
        VarId(NEXT_VAR_ID.fetch_add(1, Ordering::SeqCst))
    }
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl serde::Serialize for VarId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.0)
    }
}

impl<'de> serde::Deserialize<'de> for VarId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = u64::deserialize(deserializer)?;
        NEXT_VAR_ID.fetch_max(raw + 1, Ordering::SeqCst);
        Ok(VarId(raw))
    }
}

/// A bound variable occurrence.
///
/// Equality is equality of the numeric identity; the name hint is display
/// information and ignored.
#[derive(Debug, Clone, Derivative, Serialize, Deserialize)]
#[derivative(Eq, PartialEq, Hash)]
pub struct Variable {
    pub id: VarId,
    #[derivative(PartialEq = "ignore", Hash = "ignore")]
    pub name: VarBind,
}

impl Variable {
    pub fn fresh(name: VarBind) -> Self {
        Variable { id: VarId::fresh(), name }
    }

    /// A new variable with the same name hint but a fresh identity.
    pub fn refresh(&self) -> Self {
        Variable { id: VarId::fresh(), name: self.name.clone() }
    }
}

impl From<Variable> for Exp {
    fn from(val: Variable) -> Self {
        Exp::Variable(val)
    }
}

impl Print for Variable {
    fn print_prec<'a>(
        &'a self,
        cfg: &PrintCfg,
        alloc: &'a Alloc<'a>,
        _prec: Precedence,
    ) -> Builder<'a> {
        if cfg.print_var_ids {
            alloc.var(&format!("{}#{}", self.name, self.id))
        } else {
            alloc.var(&self.name.id)
        }
    }
}
