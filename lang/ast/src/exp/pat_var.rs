use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use derivative::Derivative;
use printer::theme::ThemeExt;
use printer::{Alloc, Builder, Precedence, Print, PrintCfg};
use serde_derive::{Deserialize, Serialize};

use crate::ident::VarBind;

use super::Exp;

static NEXT_PATVAR_ID: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PatVarId(u64);

impl fmt::Display for PatVarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl serde::Serialize for PatVarId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.0)
    }
}

impl<'de> serde::Deserialize<'de> for PatVarId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = u64::deserialize(deserializer)?;
        NEXT_PATVAR_ID.fetch_max(raw + 1, Ordering::SeqCst);
        Ok(PatVarId(raw))
    }
}

/// A pattern variable: an interior-mutable cell bound by matching during
/// reduction.
///
/// Pattern variables live for the duration of a single match attempt and
/// never appear in signatures. Assignment is monotone within an attempt;
/// [PatVar::assign] panics on a second assignment.
#[derive(Debug, Clone, Derivative, Serialize, Deserialize)]
#[derivative(Eq, PartialEq)]
pub struct PatVar {
    pub id: PatVarId,
    #[derivative(PartialEq = "ignore")]
    pub name: VarBind,
    #[derivative(PartialEq = "ignore")]
    cell: Rc<RefCell<Option<Exp>>>,
}

impl PatVar {
    pub fn fresh(name: VarBind) -> Self {
        PatVar {
            id: PatVarId(NEXT_PATVAR_ID.fetch_add(1, Ordering::SeqCst)),
            name,
            cell: Rc::new(RefCell::new(None)),
        }
    }

    pub fn is_assigned(&self) -> bool {
        self.cell.borrow().is_some()
    }

    pub fn content(&self) -> Option<Exp> {
        self.cell.borrow().clone()
    }

    pub fn assign(&self, exp: Exp) {
        let mut cell = self.cell.borrow_mut();
        assert!(cell.is_none(), "pattern variable ${} assigned twice", self.name);
        *cell = Some(exp);
    }
}

impl From<PatVar> for Exp {
    fn from(val: PatVar) -> Self {
        Exp::PatVar(val)
    }
}

impl Print for PatVar {
    fn print_prec<'a>(
        &'a self,
        _cfg: &PrintCfg,
        alloc: &'a Alloc<'a>,
        _prec: Precedence,
    ) -> Builder<'a> {
        alloc.meta(&format!("${}", self.name))
    }
}
