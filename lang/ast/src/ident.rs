use std::fmt;

use printer::theme::ThemeExt;
use printer::tokens::DOT;
use printer::{Alloc, Builder, Precedence, Print, PrintCfg};
use serde_derive::{Deserialize, Serialize};

// Local variables (name hints at binding sites)
//
//

/// The name hint attached to a binder.
///
/// Hints are display information only: the identity of a bound variable is
/// its [crate::VarId], never its hint. Two binders may share a hint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VarBind {
    pub id: String,
}

impl VarBind {
    pub fn from_string(id: &str) -> Self {
        VarBind { id: id.to_owned() }
    }
}

impl fmt::Display for VarBind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

// Global identifiers (binding site)
//
//

/// The name of a symbol at its declaration site in a signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdBind {
    pub id: String,
}

impl IdBind {
    pub fn from_string(id: &str) -> Self {
        IdBind { id: id.to_owned() }
    }
}

impl fmt::Display for IdBind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

// Global identifiers (bound occurrence)
//
//

/// A reference to a symbol: the path of the module that declares it together
/// with its name. Symbol identity across (de)serialization is exactly this
/// pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdBound {
    pub path: ModulePath,
    pub id: String,
}

impl IdBound {
    pub fn new(path: ModulePath, id: &str) -> Self {
        IdBound { path, id: id.to_owned() }
    }
}

impl fmt::Display for IdBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.path, self.id)
    }
}

impl Print for IdBound {
    fn print_prec<'a>(
        &'a self,
        cfg: &PrintCfg,
        alloc: &'a Alloc<'a>,
        _prec: Precedence,
    ) -> Builder<'a> {
        let in_current_module =
            cfg.current_module.as_deref().is_some_and(|current| current == self.path.to_string());
        if in_current_module {
            alloc.sym(&self.id)
        } else {
            alloc.sym(&self.path.to_string()).append(DOT).append(alloc.sym(&self.id))
        }
    }
}

// Module paths
//
//

/// A dot-separated module path, e.g. `arith.nat`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModulePath {
    pub segments: Vec<String>,
}

impl ModulePath {
    pub fn new<S: Into<String>, I: IntoIterator<Item = S>>(segments: I) -> Self {
        ModulePath { segments: segments.into_iter().map(Into::into).collect() }
    }

    pub fn from_dotted(path: &str) -> Self {
        ModulePath { segments: path.split('.').map(str::to_owned).collect() }
    }
}

impl fmt::Display for ModulePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}
