//! The language of constraints collected by the constraint solver.
use ast::Exp;
use printer::Print;

/// An equality constraint between two expressions.
///
/// In constraint mode, conversion defers these instead of failing; the rule
/// checker later decides whether the deferred constraints of a right-hand
/// side are entailed by those of the left-hand side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    pub lhs: Box<Exp>,
    pub rhs: Box<Exp>,
}

impl Print for Constraint {
    fn print_prec<'a>(
        &'a self,
        cfg: &printer::PrintCfg,
        alloc: &'a printer::Alloc<'a>,
        _prec: printer::Precedence,
    ) -> printer::Builder<'a> {
        self.lhs.print(cfg, alloc).append(" = ").append(self.rhs.print(cfg, alloc))
    }
}
