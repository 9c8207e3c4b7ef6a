use derivative::Derivative;
use pretty::DocAllocator;
use printer::util::ParensExt;
use printer::{Alloc, Builder, Precedence, Print, PrintCfg};
use serde_derive::{Deserialize, Serialize};

use crate::decls::SymbolKind;
use crate::traits::{Assign, Occurs, Substitutable};

use super::Exp;

/// An application `f a`.
///
/// The `rigid` flag caches that the head of the application can never reduce
/// at the top level: the reduction machine does not traverse rigid nodes.
/// The flag is an optimization only; equality ignores it.
#[derive(Debug, Clone, Derivative, Serialize, Deserialize)]
#[derivative(Eq, PartialEq)]
pub struct App {
    #[derivative(PartialEq = "ignore")]
    pub rigid: bool,
    pub fun: Box<Exp>,
    pub arg: Box<Exp>,
}

impl App {
    /// Construct an application, deriving the rigid flag from the head: the
    /// application is rigid when its function is a static symbol or itself a
    /// rigid application.
    pub fn new(fun: Exp, arg: Exp) -> Self {
        let rigid = match &fun {
            Exp::Sym(sym) => sym.kind == SymbolKind::Static,
            Exp::App(app) => app.rigid,
            _ => false,
        };
        App { rigid, fun: Box::new(fun), arg: Box::new(arg) }
    }
}

impl From<App> for Exp {
    fn from(val: App) -> Self {
        Exp::App(val)
    }
}

impl Substitutable for App {
    fn subst(&self, assign: &Assign) -> Self {
        App { rigid: self.rigid, fun: self.fun.subst(assign), arg: self.arg.subst(assign) }
    }
}

impl Occurs for App {
    fn occurs<F>(&self, f: &F) -> bool
    where
        F: Fn(&Exp) -> bool,
    {
        self.fun.occurs(f) || self.arg.occurs(f)
    }
}

impl Print for App {
    fn print_prec<'a>(
        &'a self,
        cfg: &PrintCfg,
        alloc: &'a Alloc<'a>,
        prec: Precedence,
    ) -> Builder<'a> {
        self.fun
            .print_prec(cfg, alloc, Precedence::App)
            .append(alloc.space())
            .append(self.arg.print_prec(cfg, alloc, Precedence::Atom))
            .parens_if(Precedence::App, prec)
    }
}
