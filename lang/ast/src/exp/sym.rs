use printer::{Alloc, Builder, Precedence, Print, PrintCfg};
use serde_derive::{Deserialize, Serialize};

use crate::decls::SymbolKind;
use crate::ident::IdBound;

use super::Exp;

/// A reference to a signature entry.
///
/// The `kind` tag is a cache of the declaration kind of the referenced entry:
/// the reduction machine uses it to decide whether a head can rewrite at all
/// without consulting the signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sym {
    pub name: IdBound,
    pub kind: SymbolKind,
}

impl Sym {
    pub fn new(name: IdBound, kind: SymbolKind) -> Self {
        Sym { name, kind }
    }
}

impl From<Sym> for Exp {
    fn from(val: Sym) -> Self {
        Exp::Sym(val)
    }
}

impl Print for Sym {
    fn print_prec<'a>(
        &'a self,
        cfg: &PrintCfg,
        alloc: &'a Alloc<'a>,
        prec: Precedence,
    ) -> Builder<'a> {
        self.name.print_prec(cfg, alloc, prec)
    }
}
