use crate::exp::{Exp, MetaVar, VarId};

/// Whether a subexpression that fulfills a predicate occurs
///
/// The actual traversal is done in the implementation for [Exp]; the other
/// implementations pass the call on to all subexpressions. The traversal
/// looks through assigned metavariable and pattern-variable cells, so an
/// occurrence inside a solution is found as well.
pub trait Occurs {
    fn occurs<F>(&self, f: &F) -> bool
    where
        F: Fn(&Exp) -> bool;

    /// Whether the variable with the given identity occurs as a subexpression
    fn occurs_var(&self, id: VarId) -> bool {
        self.occurs(&|exp| matches!(exp, Exp::Variable(var) if var.id == id))
    }

    /// Whether a hole for the given metavariable occurs as a subexpression
    fn occurs_metavar(&self, metavar: &MetaVar) -> bool {
        let id = metavar.id;
        self.occurs(&move |exp| matches!(exp, Exp::Hole(hole) if hole.metavar.id == id))
    }
}

impl<T: Occurs> Occurs for Box<T> {
    fn occurs<F>(&self, f: &F) -> bool
    where
        F: Fn(&Exp) -> bool,
    {
        T::occurs(self, f)
    }
}

impl<T: Occurs> Occurs for Vec<T> {
    fn occurs<F>(&self, f: &F) -> bool
    where
        F: Fn(&Exp) -> bool,
    {
        self.iter().any(|x| x.occurs(f))
    }
}

impl<T: Occurs> Occurs for Option<T> {
    fn occurs<F>(&self, f: &F) -> bool
    where
        F: Fn(&Exp) -> bool,
    {
        self.as_ref().map(|inner| inner.occurs(f)).unwrap_or_default()
    }
}
