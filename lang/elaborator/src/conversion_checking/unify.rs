//! Strict equality, conversion and metavariable instantiation
//!
//! Metavariable solving is restricted to Miller's pattern fragment:
//!
//! 1. the environment of the metavariable consists of distinct variables,
//! 2. the metavariable does not occur in its candidate solution.
//!
//! Under these conditions the equation `?m[e₁,…,eₖ] = t` has the unique
//! solution `λe₁…eₖ. t`, obtained by abstracting the environment variables.

use log::trace;

use ast::*;
use printer::PrintToString;

use crate::normalizer::whnf::{apply_stack, whnf_stk, Stack};
use crate::result::{TcResult, TypeError};

use super::constraints::Constraint;
use super::dec::*;

/// Strict equality: structural on the head after `unfold`, with
/// α-equivalence for binders. Rigid flags are ignored.
///
/// With `rewrite` set, an unresolved pattern variable on the left captures
/// its counterpart and the comparison succeeds; this is the
/// equality-with-assignment used by rule matching. A pattern variable on the
/// right is an invariant violation in either mode.
pub fn eq(lhs: &Exp, rhs: &Exp, rewrite: bool) -> TcResult<Dec> {
    let lhs = lhs.unfold();
    let rhs = rhs.unfold();
    match (&lhs, &rhs) {
        (Exp::PatVar(p1), Exp::PatVar(p2)) if p1.id == p2.id => Ok(Yes),
        (Exp::PatVar(pat_var), _) if rewrite => {
            pat_var.assign(rhs.clone());
            Ok(Yes)
        }
        (_, Exp::PatVar(pat_var)) => Err(TypeError::Impossible {
            message: format!(
                "pattern variable ${} escaped to the right-hand side of an equality",
                pat_var.name
            ),
        }
        .into()),
        (Exp::PatVar(pat_var), _) => Err(TypeError::Impossible {
            message: format!(
                "pattern variable ${} observed outside of rule matching",
                pat_var.name
            ),
        }
        .into()),
        (Exp::Variable(v1), Exp::Variable(v2)) => Ok(Dec::from(v1.id == v2.id)),
        (Exp::TypeUniv(_), Exp::TypeUniv(_)) | (Exp::Kind(_), Exp::Kind(_)) => Ok(Yes),
        (Exp::Sym(s1), Exp::Sym(s2)) => Ok(Dec::from(s1.name == s2.name)),
        (Exp::Pi(p1), Exp::Pi(p2)) => {
            if let No = eq(&p1.domain, &p2.domain, rewrite)? {
                return Ok(No);
            }
            let (var, body1) = p1.binder.open();
            let body2 = p2.binder.open_with(&var);
            eq(&body1, &body2, rewrite)
        }
        (Exp::Lam(l1), Exp::Lam(l2)) => {
            if let No = eq(&l1.domain, &l2.domain, rewrite)? {
                return Ok(No);
            }
            let (var, body1) = l1.binder.open();
            let body2 = l2.binder.open_with(&var);
            eq(&body1, &body2, rewrite)
        }
        (Exp::App(a1), Exp::App(a2)) => {
            if let No = eq(&a1.fun, &a2.fun, rewrite)? {
                return Ok(No);
            }
            eq(&a1.arg, &a2.arg, rewrite)
        }
        (Exp::Hole(h1), Exp::Hole(h2)) if h1.metavar == h2.metavar => {
            if h1.args.len() != h2.args.len() {
                return Ok(No);
            }
            for (e1, e2) in h1.args.iter().zip(&h2.args) {
                if let No = eq(e1, e2, rewrite)? {
                    return Ok(No);
                }
            }
            Ok(Yes)
        }
        (Exp::Hole(hole), _) => {
            solve_meta_var(hole, &rhs)?;
            Ok(Yes)
        }
        (_, Exp::Hole(hole)) => {
            solve_meta_var(hole, &lhs)?;
            Ok(Yes)
        }
        (_, _) => Ok(No),
    }
}

/// Attempt to solve the equation `?m[e₁,…,eₖ] = candidate`.
///
/// On success the metavariable's cell monotonically receives the closed
/// binder `λe₁…eₖ. candidate`; `unfold` exposes the assignment everywhere
/// the metavariable occurs.
pub fn solve_meta_var(hole: &Hole, candidate: &Exp) -> TcResult {
    trace!(
        "Attempting to solve metavariable ?{} with {}",
        hole.metavar.id,
        candidate.print_trace()
    );

    // Condition 2: the metavariable does not occur in the candidate
    if candidate.occurs_metavar(&hole.metavar) {
        return Err(TypeError::MetaOccursCheckFailed {
            meta_var: format!("?{}", hole.metavar.id),
        }
        .into());
    }

    // Condition 1: the environment consists of distinct variables
    let mut vars = Vec::with_capacity(hole.args.len());
    let mut seen: HashSet<VarId> = HashSet::default();
    for arg in &hole.args {
        match arg.unfold() {
            Exp::Variable(var) => {
                if !seen.insert(var.id) {
                    return Err(TypeError::MetaArgNotDistinct {
                        meta_var: format!("?{}", hole.metavar.id),
                        arg: var.name.to_string(),
                    }
                    .into());
                }
                vars.push(var);
            }
            other => {
                return Err(TypeError::MetaArgNotVariable {
                    meta_var: format!("?{}", hole.metavar.id),
                    arg: other.print_to_string(None),
                }
                .into());
            }
        }
    }

    hole.metavar.solve(MultiBinder::bind(vars, Box::new(candidate.clone())));
    Ok(())
}

/// The conversion-checking context: a worklist of equality constraints and
/// the optional sink of the enclosing constraint mode.
pub struct Ctx<'a> {
    sigs: &'a Signatures,
    /// Constraints that have not yet been solved
    worklist: Vec<Constraint>,
    /// In constraint mode, irreducible disequalities are deferred here
    /// instead of failing the conversion.
    deferred: Option<&'a mut Vec<Constraint>>,
}

impl<'a> Ctx<'a> {
    pub fn new(sigs: &'a Signatures, deferred: Option<&'a mut Vec<Constraint>>) -> Self {
        Self { sigs, worklist: Vec::new(), deferred }
    }

    /// Equality modulo β and rewriting.
    pub fn eq_modulo(&mut self, lhs: &Exp, rhs: &Exp) -> TcResult<Dec> {
        trace!("{} =? {}", lhs.print_trace(), rhs.print_trace());
        self.worklist.push(Constraint { lhs: Box::new(lhs.clone()), rhs: Box::new(rhs.clone()) });
        while let Some(constraint) = self.worklist.pop() {
            if let No = self.step(constraint)? {
                return Ok(No);
            }
        }
        Ok(Yes)
    }

    fn step(&mut self, constraint: Constraint) -> TcResult<Dec> {
        let Constraint { lhs, rhs } = constraint;
        let (mut h1, mut s1) = whnf_stk(self.sigs, *lhs, Stack::new())?;
        let (mut h2, mut s2) = whnf_stk(self.sigs, *rhs, Stack::new())?;

        // Synchronize the spines right to left: surplus arguments of the
        // longer spine belong to its head.
        while s1.len() > s2.len() {
            match s1.pop_front() {
                Some(arg) => h1 = Exp::app(h1, arg),
                None => break,
            }
        }
        while s2.len() > s1.len() {
            match s2.pop_front() {
                Some(arg) => h2 = Exp::app(h2, arg),
                None => break,
            }
        }

        let heads = match (&h1, &h2) {
            // Two holes for the same metavariable: their environments must
            // agree pointwise.
            (Exp::Hole(a), Exp::Hole(b)) if a.metavar == b.metavar => {
                if a.args.len() == b.args.len() {
                    for (lhs, rhs) in a.args.iter().zip(&b.args) {
                        self.worklist.push(Constraint {
                            lhs: Box::new(lhs.clone()),
                            rhs: Box::new(rhs.clone()),
                        });
                    }
                    Yes
                } else {
                    No
                }
            }
            // A hole head on either side is instantiated with the opposite
            // head; the spine positions are compared pairwise below.
            (Exp::Hole(hole), other) | (other, Exp::Hole(hole)) => {
                solve_meta_var(hole, other)?;
                Yes
            }
            (Exp::Variable(v1), Exp::Variable(v2)) if v1.id == v2.id => Yes,
            (Exp::TypeUniv(_), Exp::TypeUniv(_)) | (Exp::Kind(_), Exp::Kind(_)) => Yes,
            (Exp::Sym(a), Exp::Sym(b)) if a.name == b.name => Yes,
            (Exp::PatVar(p1), Exp::PatVar(p2)) if p1.id == p2.id => Yes,
            (Exp::Pi(p1), Exp::Pi(p2)) => {
                let (var, body1) = p1.binder.open();
                let body2 = p2.binder.open_with(&var);
                self.worklist.push(Constraint {
                    lhs: p1.domain.clone(),
                    rhs: p2.domain.clone(),
                });
                self.worklist
                    .push(Constraint { lhs: Box::new(body1), rhs: Box::new(body2) });
                Yes
            }
            (Exp::Lam(l1), Exp::Lam(l2)) => {
                let (var, body1) = l1.binder.open();
                let body2 = l2.binder.open_with(&var);
                self.worklist.push(Constraint {
                    lhs: l1.domain.clone(),
                    rhs: l2.domain.clone(),
                });
                self.worklist
                    .push(Constraint { lhs: Box::new(body1), rhs: Box::new(body2) });
                Yes
            }
            (Exp::App(a1), Exp::App(a2)) => {
                self.worklist.push(Constraint { lhs: a1.fun.clone(), rhs: a2.fun.clone() });
                self.worklist.push(Constraint { lhs: a1.arg.clone(), rhs: a2.arg.clone() });
                Yes
            }
            (_, _) => No,
        };

        match heads {
            Yes => {
                for (lhs, rhs) in s1.into_iter().zip(s2) {
                    self.worklist
                        .push(Constraint { lhs: Box::new(lhs), rhs: Box::new(rhs) });
                }
                Ok(Yes)
            }
            No => match &mut self.deferred {
                Some(sink) => {
                    let deferred = Constraint {
                        lhs: Box::new(apply_stack(h1, s1)),
                        rhs: Box::new(apply_stack(h2, s2)),
                    };
                    trace!("Deferring constraint {}", deferred.print_trace());
                    sink.push(deferred);
                    Ok(Yes)
                }
                None => Ok(No),
            },
        }
    }
}
