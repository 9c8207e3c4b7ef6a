use printer::{Alloc, Builder, Precedence, Print, PrintCfg};
use serde_derive::{Deserialize, Serialize};

use crate::traits::{Assign, Occurs, Substitutable};

mod app;
mod binder;
mod hole;
mod lam;
mod pat_var;
mod pi;
mod sort;
mod sym;
mod variable;

pub use app::*;
pub use binder::*;
pub use hole::*;
pub use lam::*;
pub use pat_var::*;
pub use pi::*;
pub use sort::*;
pub use sym::*;
pub use variable::*;

// Exp
//
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Exp {
    Variable(Variable),
    TypeUniv(TypeUniv),
    Kind(Kind),
    Sym(Sym),
    Pi(Pi),
    Lam(Lam),
    App(App),
    Hole(Hole),
    PatVar(PatVar),
}

impl Exp {
    /// Collapse assigned metavariable and pattern-variable cells at the top
    /// of the term. This is the only approved way to observe a term's head:
    /// every structural match in the kernel begins with `unfold`.
    ///
    /// Unassigned cells and all other term shapes are returned unchanged.
    pub fn unfold(&self) -> Exp {
        let mut current = self.clone();
        loop {
            match &current {
                Exp::Hole(hole) => match hole.metavar.solution() {
                    Some(solution) => current = *solution.instantiate(&hole.args),
                    None => return current,
                },
                Exp::PatVar(pat_var) => match pat_var.content() {
                    Some(content) => current = content,
                    None => return current,
                },
                _ => return current,
            }
        }
    }

    pub fn app(fun: Exp, arg: Exp) -> Exp {
        Exp::App(App::new(fun, arg))
    }

    /// Apply a head to a spine of arguments, left to right.
    pub fn app_spine<I: IntoIterator<Item = Exp>>(head: Exp, args: I) -> Exp {
        args.into_iter().fold(head, Exp::app)
    }

    pub fn pi(domain: Exp, binder: Binder) -> Exp {
        Exp::Pi(Pi::new(domain, binder))
    }

    pub fn lam(domain: Exp, binder: Binder) -> Exp {
        Exp::Lam(Lam::new(domain, binder))
    }

    /// A non-dependent product `a → b`.
    pub fn arrow(domain: Exp, codomain: Exp) -> Exp {
        let var = Variable::fresh(crate::ident::VarBind::from_string("_"));
        Exp::pi(domain, Binder::bind(var, codomain))
    }
}

impl Substitutable for Exp {
    fn subst(&self, assign: &Assign) -> Self {
        match self {
            Exp::Variable(var) => {
                assign.get(var.id).cloned().unwrap_or_else(|| Exp::Variable(var.clone()))
            }
            Exp::TypeUniv(_) | Exp::Kind(_) | Exp::Sym(_) => self.clone(),
            Exp::Pi(pi) => pi.subst(assign).into(),
            Exp::Lam(lam) => lam.subst(assign).into(),
            Exp::App(app) => app.subst(assign).into(),
            Exp::Hole(hole) => hole.subst(assign).into(),
            Exp::PatVar(pat_var) => Exp::PatVar(pat_var.clone()),
        }
    }
}

impl Occurs for Exp {
    fn occurs<F>(&self, f: &F) -> bool
    where
        F: Fn(&Exp) -> bool,
    {
        if f(self) {
            return true;
        }
        match self {
            Exp::Variable(_) | Exp::TypeUniv(_) | Exp::Kind(_) | Exp::Sym(_) => false,
            Exp::Pi(pi) => pi.occurs(f),
            Exp::Lam(lam) => lam.occurs(f),
            Exp::App(app) => app.occurs(f),
            Exp::Hole(hole) => hole.occurs(f),
            Exp::PatVar(pat_var) => pat_var.content().as_ref().is_some_and(|c| c.occurs(f)),
        }
    }
}

impl Print for Exp {
    fn print_prec<'a>(
        &'a self,
        cfg: &PrintCfg,
        alloc: &'a Alloc<'a>,
        prec: Precedence,
    ) -> Builder<'a> {
        match self {
            Exp::Variable(e) => e.print_prec(cfg, alloc, prec),
            Exp::TypeUniv(e) => e.print_prec(cfg, alloc, prec),
            Exp::Kind(e) => e.print_prec(cfg, alloc, prec),
            Exp::Sym(e) => e.print_prec(cfg, alloc, prec),
            Exp::Pi(e) => e.print_prec(cfg, alloc, prec),
            Exp::Lam(e) => e.print_prec(cfg, alloc, prec),
            Exp::App(e) => e.print_prec(cfg, alloc, prec),
            Exp::Hole(e) => e.print_prec(cfg, alloc, prec),
            Exp::PatVar(e) => e.print_prec(cfg, alloc, prec),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ident::VarBind;
    use crate::traits::FreeVars;

    use super::*;

    fn var(name: &str) -> Variable {
        Variable::fresh(VarBind::from_string(name))
    }

    #[test]
    fn open_freshens_the_bound_variable() {
        let x = var("x");
        let lam = Lam::new(Exp::TypeUniv(TypeUniv), Binder::bind(x.clone(), Exp::Variable(x)));

        let (x1, body1) = lam.binder.open();
        let (x2, body2) = lam.binder.open();

        assert_ne!(x1.id, x2.id);
        assert_eq!(body1, Exp::Variable(x1));
        assert_eq!(body2, Exp::Variable(x2));
    }

    #[test]
    fn instantiate_replaces_the_bound_variable() {
        let x = var("x");
        let binder = Binder::bind(x.clone(), Exp::app(Exp::Variable(x.clone()), Exp::Variable(x)));

        let body = binder.instantiate(&Exp::TypeUniv(TypeUniv));

        assert_eq!(body, Exp::app(Exp::TypeUniv(TypeUniv), Exp::TypeUniv(TypeUniv)));
    }

    #[test]
    fn substitution_does_not_cross_an_unrelated_binder() {
        // (λy. x)[Type/x] = λy. Type
        let x = var("x");
        let y = var("y");
        let lam =
            Exp::lam(Exp::TypeUniv(TypeUniv), Binder::bind(y.clone(), Exp::Variable(x.clone())));

        let result = lam.subst(&Assign::single(x.id, Exp::TypeUniv(TypeUniv)));

        let Exp::Lam(lam) = result else { panic!("expected an abstraction") };
        assert_eq!(*lam.binder.body, Exp::TypeUniv(TypeUniv));
        assert_eq!(lam.binder.var.id, y.id);
    }

    #[test]
    fn unfold_exposes_a_solved_metavariable() {
        let x = var("x");
        let hole = Hole::fresh(&[x.clone()]);
        let exp: Exp = hole.clone().into();

        assert_eq!(exp.unfold(), exp);

        hole.metavar.solve(MultiBinder::bind(
            vec![x.clone()],
            Box::new(Exp::Variable(x.clone())),
        ));
        assert_eq!(exp.unfold(), Exp::Variable(x));
    }

    #[test]
    fn unfold_dereferences_pattern_variables() {
        let pat_var = PatVar::fresh(VarBind::from_string("p"));
        let exp: Exp = pat_var.clone().into();

        assert_eq!(exp.unfold(), exp);

        pat_var.assign(Exp::Kind(Kind));
        assert_eq!(exp.unfold(), Exp::Kind(Kind));
    }

    #[test]
    #[should_panic(expected = "assigned twice")]
    fn metavariable_assignment_is_monotone() {
        let metavar = MetaVar::fresh();
        metavar.solve(MultiBinder::bind(vec![], Box::new(Exp::TypeUniv(TypeUniv))));
        metavar.solve(MultiBinder::bind(vec![], Box::new(Exp::Kind(Kind))));
    }

    #[test]
    fn free_vars_in_order_of_first_occurrence() {
        let x = var("x");
        let y = var("y");
        let z = var("z");
        // λz. y x y
        let exp = Exp::lam(
            Exp::TypeUniv(TypeUniv),
            Binder::bind(
                z,
                Exp::app_spine(
                    Exp::Variable(y.clone()),
                    [Exp::Variable(x.clone()), Exp::Variable(y.clone())],
                ),
            ),
        );

        let fvs = exp.free_vars();
        let ids: Vec<_> = fvs.iter().map(|fv| fv.id).collect();
        assert_eq!(ids, vec![y.id, x.id]);
    }
}
