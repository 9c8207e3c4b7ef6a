use derivative::Derivative;
use serde_derive::{Deserialize, Serialize};

use crate::traits::{Assign, FreeVars, Occurs, Substitutable};
use crate::{HashSet, VarId};

use super::{Exp, Variable};

/// A scope-safe binder of arity one, used by products and abstractions.
///
/// The stored variable never occurs free outside `body`: [Binder::open]
/// substitutes a fresh variable before exposing the body, and
/// [Binder::instantiate] replaces the variable by a term without exposing it.
#[derive(Debug, Clone, Derivative, Serialize, Deserialize)]
#[derivative(Eq, PartialEq)]
pub struct Binder {
    pub var: Variable,
    pub body: Box<Exp>,
}

impl Binder {
    pub fn bind(var: Variable, body: Exp) -> Self {
        Binder { var, body: Box::new(body) }
    }

    /// Replace the bound variable by `arg` in the body.
    pub fn instantiate(&self, arg: &Exp) -> Exp {
        *self.body.subst(&Assign::single(self.var.id, arg.clone()))
    }

    /// Re-open the binder as a fresh variable together with the body in which
    /// the bound variable has been replaced by that fresh variable.
    pub fn open(&self) -> (Variable, Exp) {
        let var = self.var.refresh();
        let body = self.open_with(&var);
        (var, body)
    }

    /// Open the binder with a caller-supplied variable. Opening two binders
    /// with the *same* variable is how α-equivalence is decided.
    pub fn open_with(&self, var: &Variable) -> Exp {
        self.instantiate(&Exp::Variable(var.clone()))
    }
}

impl Substitutable for Binder {
    fn subst(&self, assign: &Assign) -> Self {
        Binder { var: self.var.clone(), body: self.body.subst(assign) }
    }
}

impl Occurs for Binder {
    fn occurs<F>(&self, f: &F) -> bool
    where
        F: Fn(&Exp) -> bool,
    {
        self.body.occurs(f)
    }
}

/// A closed binder of arity `k`: rewrite-rule sides and metavariable
/// solutions bind all their variables at once.
#[derive(Debug, Clone, Derivative, Serialize, Deserialize)]
#[derivative(Eq, PartialEq)]
pub struct MultiBinder<T> {
    pub vars: Vec<Variable>,
    pub body: T,
}

impl<T: Substitutable> MultiBinder<T> {
    pub fn bind(vars: Vec<Variable>, body: T) -> Self {
        MultiBinder { vars, body }
    }

    pub fn arity(&self) -> usize {
        self.vars.len()
    }

    /// Replace all bound variables at once. Panics on an arity mismatch,
    /// which is a kernel bug: arities are validated before rules are stored.
    pub fn instantiate(&self, args: &[Exp]) -> T {
        self.body.subst(&Assign::from_pairs(&self.vars, args))
    }

    pub fn open(&self) -> (Vec<Variable>, T) {
        let vars: Vec<Variable> = self.vars.iter().map(Variable::refresh).collect();
        let args: Vec<Exp> = vars.iter().cloned().map(Exp::Variable).collect();
        (vars, self.instantiate(&args))
    }
}

impl<T: Substitutable> Substitutable for MultiBinder<T> {
    fn subst(&self, assign: &Assign) -> Self {
        MultiBinder { vars: self.vars.clone(), body: self.body.subst(assign) }
    }
}

impl<T: Occurs> Occurs for MultiBinder<T> {
    fn occurs<F>(&self, f: &F) -> bool
    where
        F: Fn(&Exp) -> bool,
    {
        self.body.occurs(f)
    }
}

impl<T: FreeVars> FreeVars for MultiBinder<T> {
    fn free_vars_mut(&self, bound: &mut HashSet<VarId>, fvs: &mut Vec<Variable>) {
        for var in &self.vars {
            bound.insert(var.id);
        }
        self.body.free_vars_mut(bound, fvs);
        for var in &self.vars {
            bound.remove(&var.id);
        }
    }
}
