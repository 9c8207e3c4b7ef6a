use derivative::Derivative;
use pretty::DocAllocator;
use printer::tokens::{COLON, DOT, LAMBDA};
use printer::util::ParensExt;
use printer::{Alloc, Builder, Precedence, Print, PrintCfg};
use serde_derive::{Deserialize, Serialize};

use crate::traits::{Assign, Occurs, Substitutable};

use super::{Binder, Exp};

/// An abstraction `λ(x : A). t`.
#[derive(Debug, Clone, Derivative, Serialize, Deserialize)]
#[derivative(Eq, PartialEq)]
pub struct Lam {
    pub domain: Box<Exp>,
    pub binder: Binder,
}

impl Lam {
    pub fn new(domain: Exp, binder: Binder) -> Self {
        Lam { domain: Box::new(domain), binder }
    }
}

impl From<Lam> for Exp {
    fn from(val: Lam) -> Self {
        Exp::Lam(val)
    }
}

impl Substitutable for Lam {
    fn subst(&self, assign: &Assign) -> Self {
        Lam { domain: self.domain.subst(assign), binder: self.binder.subst(assign) }
    }
}

impl Occurs for Lam {
    fn occurs<F>(&self, f: &F) -> bool
    where
        F: Fn(&Exp) -> bool,
    {
        self.domain.occurs(f) || self.binder.occurs(f)
    }
}

impl Print for Lam {
    fn print_prec<'a>(
        &'a self,
        cfg: &PrintCfg,
        alloc: &'a Alloc<'a>,
        prec: Precedence,
    ) -> Builder<'a> {
        alloc
            .text(LAMBDA)
            .append(
                self.binder
                    .var
                    .print(cfg, alloc)
                    .append(alloc.space())
                    .append(COLON)
                    .append(alloc.space())
                    .append(self.domain.print(cfg, alloc))
                    .parens(),
            )
            .append(DOT)
            .append(alloc.space())
            .append(self.binder.body.print_prec(cfg, alloc, Precedence::Exp))
            .parens_if(Precedence::Exp, prec)
    }
}
