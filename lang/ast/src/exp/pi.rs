use derivative::Derivative;
use pretty::DocAllocator;
use printer::tokens::{ARROW, COLON, DOT, PI};
use printer::util::ParensExt;
use printer::{Alloc, Builder, Precedence, Print, PrintCfg};
use serde_derive::{Deserialize, Serialize};

use crate::traits::{Assign, Occurs, Substitutable};

use super::{Binder, Exp};

/// A dependent product `Π(x : A). B`.
#[derive(Debug, Clone, Derivative, Serialize, Deserialize)]
#[derivative(Eq, PartialEq)]
pub struct Pi {
    pub domain: Box<Exp>,
    pub binder: Binder,
}

impl Pi {
    pub fn new(domain: Exp, binder: Binder) -> Self {
        Pi { domain: Box::new(domain), binder }
    }

    /// Whether the codomain actually depends on the bound variable.
    pub fn is_dependent(&self) -> bool {
        self.binder.body.occurs_var(self.binder.var.id)
    }
}

impl From<Pi> for Exp {
    fn from(val: Pi) -> Self {
        Exp::Pi(val)
    }
}

impl Substitutable for Pi {
    fn subst(&self, assign: &Assign) -> Self {
        Pi { domain: self.domain.subst(assign), binder: self.binder.subst(assign) }
    }
}

impl Occurs for Pi {
    fn occurs<F>(&self, f: &F) -> bool
    where
        F: Fn(&Exp) -> bool,
    {
        self.domain.occurs(f) || self.binder.occurs(f)
    }
}

impl Print for Pi {
    fn print_prec<'a>(
        &'a self,
        cfg: &PrintCfg,
        alloc: &'a Alloc<'a>,
        prec: Precedence,
    ) -> Builder<'a> {
        let doc = if self.is_dependent() {
            alloc
                .text(PI)
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
        } else {
            // Non-dependent products print as arrows
            self.domain
                .print_prec(cfg, alloc, Precedence::App)
                .append(alloc.space())
                .append(ARROW)
                .append(alloc.space())
                .append(self.binder.body.print_prec(cfg, alloc, Precedence::Exp))
        };
        doc.parens_if(Precedence::Exp, prec)
    }
}
