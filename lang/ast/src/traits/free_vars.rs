use crate::exp::{Exp, VarId, Variable};
use crate::HashSet;

/// Collect the free variables of an expression in order of first occurrence.
///
/// Used by rule elaboration to discover the wildcard variables of a pattern.
pub trait FreeVars {
    fn free_vars_mut(&self, bound: &mut HashSet<VarId>, fvs: &mut Vec<Variable>);

    fn free_vars(&self) -> Vec<Variable> {
        let mut bound = HashSet::default();
        let mut fvs = Vec::new();
        self.free_vars_mut(&mut bound, &mut fvs);
        fvs
    }
}

impl<T: FreeVars> FreeVars for Box<T> {
    fn free_vars_mut(&self, bound: &mut HashSet<VarId>, fvs: &mut Vec<Variable>) {
        T::free_vars_mut(self, bound, fvs)
    }
}

impl<T: FreeVars> FreeVars for Vec<T> {
    fn free_vars_mut(&self, bound: &mut HashSet<VarId>, fvs: &mut Vec<Variable>) {
        for x in self {
            x.free_vars_mut(bound, fvs);
        }
    }
}

impl<T: FreeVars> FreeVars for Option<T> {
    fn free_vars_mut(&self, bound: &mut HashSet<VarId>, fvs: &mut Vec<Variable>) {
        if let Some(inner) = self {
            inner.free_vars_mut(bound, fvs);
        }
    }
}

impl FreeVars for Exp {
    fn free_vars_mut(&self, bound: &mut HashSet<VarId>, fvs: &mut Vec<Variable>) {
        match self {
            Exp::Variable(var) => {
                if !bound.contains(&var.id) && !fvs.iter().any(|fv| fv.id == var.id) {
                    fvs.push(var.clone());
                }
            }
            Exp::TypeUniv(_) | Exp::Kind(_) | Exp::Sym(_) => {}
            Exp::Pi(pi) => {
                pi.domain.free_vars_mut(bound, fvs);
                bound.insert(pi.binder.var.id);
                pi.binder.body.free_vars_mut(bound, fvs);
                bound.remove(&pi.binder.var.id);
            }
            Exp::Lam(lam) => {
                lam.domain.free_vars_mut(bound, fvs);
                bound.insert(lam.binder.var.id);
                lam.binder.body.free_vars_mut(bound, fvs);
                bound.remove(&lam.binder.var.id);
            }
            Exp::App(app) => {
                app.fun.free_vars_mut(bound, fvs);
                app.arg.free_vars_mut(bound, fvs);
            }
            Exp::Hole(hole) => hole.args.free_vars_mut(bound, fvs),
            Exp::PatVar(pat_var) => {
                if let Some(content) = pat_var.content() {
                    content.free_vars_mut(bound, fvs);
                }
            }
        }
    }
}
