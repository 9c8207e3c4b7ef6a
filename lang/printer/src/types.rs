use pretty::termcolor::ColorSpec;
use pretty::DocAllocator;

use crate::tokens::INDENT;

pub type Alloc<'a> = pretty::Arena<'a, ColorSpec>;
pub type Builder<'a> = pretty::DocBuilder<'a, Alloc<'a>, ColorSpec>;

/// Precedence levels for deciding where parentheses are required.
///
/// The order of the variants is significant: a term whose own precedence is
/// *lower* than the precedence of the position it is printed in must be
/// parenthesized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    /// Binders and arrows
    Exp,
    /// Application spines
    App,
    /// Atoms; never parenthesized
    Atom,
}

#[derive(Debug, Clone)]
pub struct PrintCfg {
    pub width: usize,
    pub indent: isize,
    /// Print the numeric identity of variables next to their name hint.
    pub print_var_ids: bool,
    /// Print the argument environment of metavariables.
    pub print_metavar_args: bool,
    /// Symbols declared in this module are printed without their module path.
    pub current_module: Option<String>,
}

impl Default for PrintCfg {
    fn default() -> Self {
        Self {
            width: crate::DEFAULT_WIDTH,
            indent: INDENT,
            print_var_ids: false,
            print_metavar_args: false,
            current_module: None,
        }
    }
}

impl PrintCfg {
    /// The configuration used in trace logs: maximally explicit output.
    pub fn trace() -> Self {
        Self { print_var_ids: true, print_metavar_args: true, ..Self::default() }
    }
}

pub trait Print {
    fn print_prec<'a>(
        &'a self,
        cfg: &PrintCfg,
        alloc: &'a Alloc<'a>,
        prec: Precedence,
    ) -> Builder<'a>;

    fn print<'a>(&'a self, cfg: &PrintCfg, alloc: &'a Alloc<'a>) -> Builder<'a> {
        self.print_prec(cfg, alloc, Precedence::Exp)
    }
}

impl<T: Print> Print for Box<T> {
    fn print_prec<'a>(
        &'a self,
        cfg: &PrintCfg,
        alloc: &'a Alloc<'a>,
        prec: Precedence,
    ) -> Builder<'a> {
        (**self).print_prec(cfg, alloc, prec)
    }
}

impl<T: Print> Print for &T {
    fn print_prec<'a>(
        &'a self,
        cfg: &PrintCfg,
        alloc: &'a Alloc<'a>,
        prec: Precedence,
    ) -> Builder<'a> {
        (**self).print_prec(cfg, alloc, prec)
    }
}

impl<T: Print> Print for Option<T> {
    fn print_prec<'a>(
        &'a self,
        cfg: &PrintCfg,
        alloc: &'a Alloc<'a>,
        prec: Precedence,
    ) -> Builder<'a> {
        match self {
            Some(inner) => inner.print_prec(cfg, alloc, prec),
            None => alloc.nil(),
        }
    }
}
