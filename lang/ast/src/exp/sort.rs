use printer::theme::ThemeExt;
use printer::tokens::{KIND, TYPE};
use printer::{Alloc, Builder, Precedence, Print, PrintCfg};
use serde_derive::{Deserialize, Serialize};

use super::Exp;

/// The sort `Type` of small types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeUniv;

impl From<TypeUniv> for Exp {
    fn from(val: TypeUniv) -> Self {
        Exp::TypeUniv(val)
    }
}

impl Print for TypeUniv {
    fn print_prec<'a>(
        &'a self,
        _cfg: &PrintCfg,
        alloc: &'a Alloc<'a>,
        _prec: Precedence,
    ) -> Builder<'a> {
        alloc.keyword(TYPE)
    }
}

/// The sort `Kind` of large types. It classifies `Type` and products into
/// `Type`, and is itself untyped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kind;

impl From<Kind> for Exp {
    fn from(val: Kind) -> Self {
        Exp::Kind(val)
    }
}

impl Print for Kind {
    fn print_prec<'a>(
        &'a self,
        _cfg: &PrintCfg,
        alloc: &'a Alloc<'a>,
        _prec: Precedence,
    ) -> Builder<'a> {
        alloc.keyword(KIND)
    }
}
