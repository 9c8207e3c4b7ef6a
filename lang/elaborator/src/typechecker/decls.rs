//! Elaboration and checking of rewrite rules
//!
//! A rule arrives as a context of optionally-typed variables together with a
//! left- and a right-hand side over those variables. Elaboration validates
//! the pattern shape, discovers wildcard variables, and replaces omitted
//! context types by fresh metavariables. The rule checker then types both
//! sides under collected constraints and only hands back a storable
//! [ast::Rule] when the two types agree.

use log::{trace, warn};

use ast::*;
use printer::PrintToString;

use crate::conversion_checking::constraints::Constraint;
use crate::conversion_checking::unify;
use crate::result::{TcResult, TypeError};

use super::ctx::{Binding, Ctx};

/// One context variable of a rule declaration. A missing type is filled in
/// by a fresh metavariable during elaboration.
#[derive(Debug, Clone)]
pub struct Param {
    pub var: Variable,
    pub typ: Option<Box<Exp>>,
}

/// A rewrite-rule declaration as handed over by the frontend, scoped to core
/// terms but not yet elaborated.
#[derive(Debug, Clone)]
pub struct RuleDecl {
    pub params: Vec<Param>,
    pub lhs: Box<Exp>,
    pub rhs: Box<Exp>,
}

/// An elaborated rule, ready for the rule checker.
#[derive(Debug, Clone)]
pub struct ElabRule {
    /// The definable symbol the rule belongs to
    pub sym: IdBound,
    /// The number of arguments the pattern matches
    pub arity: usize,
    /// All rule variables with their (possibly invented) types
    pub params: Vec<(Variable, Box<Exp>)>,
    /// The argument patterns of the left-hand side
    pub lhs_args: Vec<Exp>,
    pub lhs: Box<Exp>,
    pub rhs: Box<Exp>,
}

/// Split a term into its head and its argument spine, left to right.
pub fn destruct_spine(exp: &Exp) -> (Exp, Vec<Exp>) {
    match exp.unfold() {
        Exp::App(app) => {
            let (head, mut args) = destruct_spine(&app.fun);
            args.push((*app.arg).clone());
            (head, args)
        }
        other => (other, Vec::new()),
    }
}

pub fn elaborate_rule(sigs: &Signatures, decl: &RuleDecl) -> TcResult<ElabRule> {
    let (head, lhs_args) = destruct_spine(&decl.lhs);
    let sym = match head {
        Exp::Sym(sym) => sym,
        _ => {
            return Err(TypeError::PatternHeadNotDefinable {
                lhs: decl.lhs.print_to_string(None),
            }
            .into());
        }
    };
    let symbol = sigs.lookup(&sym.name)?;
    if symbol.kind != SymbolKind::Definable {
        return Err(TypeError::PatternHeadNotDefinable { lhs: decl.lhs.print_to_string(None) }
            .into());
    }
    let arity = lhs_args.len();

    // Free variables of the pattern that the context does not bind are
    // wildcards; they become additional rule variables.
    let mut params = decl.params.clone();
    let bound: HashSet<VarId> = params.iter().map(|param| param.var.id).collect();
    for free_var in decl.lhs.free_vars() {
        if !bound.contains(&free_var.id) {
            params.push(Param { var: free_var, typ: None });
        }
    }

    // The right-hand side may only mention rule variables.
    let rule_vars: HashSet<VarId> = params.iter().map(|param| param.var.id).collect();
    for free_var in decl.rhs.free_vars() {
        if !rule_vars.contains(&free_var.id) {
            return Err(TypeError::UnboundVariable { name: free_var.name.to_string() }.into());
        }
    }

    // An omitted context type becomes a fresh metavariable over the
    // variables scoped so far.
    let mut scoped: Vec<Variable> = Vec::new();
    let mut typed = Vec::with_capacity(params.len());
    for param in &params {
        let typ = match &param.typ {
            Some(typ) => typ.clone(),
            None => Box::new(Hole::fresh(&scoped).into()),
        };
        scoped.push(param.var.clone());
        typed.push((param.var.clone(), typ));
    }

    Ok(ElabRule {
        sym: sym.name,
        arity,
        params: typed,
        lhs_args,
        lhs: decl.lhs.clone(),
        rhs: decl.rhs.clone(),
    })
}

/// Check an elaborated rule:
///
/// 1. infer the type of the left-hand side, collecting constraints,
/// 2. infer the type of the right-hand side, collecting constraints,
/// 3. require every right-hand constraint to be entailed by the left,
/// 4. solve the left-hand constraints into a substitution and require both
///    types to be convertible under it.
pub fn check_rule(sigs: &Signatures, elab: &ElabRule) -> TcResult<Rule> {
    let mut ctx = Ctx::new(sigs);
    let bindings: Vec<Binding> = elab
        .params
        .iter()
        .map(|(var, typ)| Binding { var: var.clone(), typ: typ.clone() })
        .collect();

    ctx.bind_iter(bindings, |ctx| -> TcResult<()> {
        let (lhs_typ, lhs_constraints) = ctx.infer_with_constrs(&elab.lhs)?;
        let (rhs_typ, rhs_constraints) = ctx.infer_with_constrs(&elab.rhs)?;

        for constraint in &rhs_constraints {
            if !entailed(ctx.sigs, constraint, &lhs_constraints)? {
                return Err(TypeError::ConstraintNotEntailed {
                    lhs: constraint.lhs.print_to_string(None),
                    rhs: constraint.rhs.print_to_string(None),
                }
                .into());
            }
        }

        let assign = solve_constraints(&lhs_constraints);
        let lhs_typ = lhs_typ.subst(&assign);
        let rhs_typ = rhs_typ.subst(&assign);

        let mut conv = unify::Ctx::new(ctx.sigs, None);
        if !conv.eq_modulo(&lhs_typ, &rhs_typ)?.is_yes() {
            return Err(TypeError::RuleTypeMismatch {
                lhs_typ: lhs_typ.print_to_string(None),
                rhs_typ: rhs_typ.print_to_string(None),
            }
            .into());
        }
        Ok(())
    })?;

    trace!("Accepted rewrite rule for {}", elab.sym);
    let vars: Vec<Variable> = elab.params.iter().map(|(var, _)| var.clone()).collect();
    Ok(Rule {
        arity: elab.arity,
        lhs: MultiBinder::bind(vars.clone(), elab.lhs_args.clone()),
        rhs: MultiBinder::bind(vars, elab.rhs.clone()),
    })
}

/// Whether a deferred constraint of the right-hand side already follows from
/// one of the left-hand side, in either orientation.
fn entailed(
    sigs: &Signatures,
    constraint: &Constraint,
    lhs_constraints: &[Constraint],
) -> TcResult<bool> {
    for candidate in lhs_constraints {
        let straight = unify::Ctx::new(sigs, None)
            .eq_modulo(&constraint.lhs, &candidate.lhs)?
            .is_yes()
            && unify::Ctx::new(sigs, None).eq_modulo(&constraint.rhs, &candidate.rhs)?.is_yes();
        if straight {
            return Ok(true);
        }
        let flipped = unify::Ctx::new(sigs, None)
            .eq_modulo(&constraint.lhs, &candidate.rhs)?
            .is_yes()
            && unify::Ctx::new(sigs, None).eq_modulo(&constraint.rhs, &candidate.lhs)?.is_yes();
        if flipped {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Orient the left-hand constraints into a substitution on rule variables.
///
/// A pair whose sides share a static symbol head is decomposed into its
/// arguments; a bare variable is assigned the opposite side. Pairs with
/// equal definable heads are dropped with a warning, since a definable
/// symbol need not be injective.
fn solve_constraints(constraints: &[Constraint]) -> Assign {
    let mut assign = Assign::new();
    let mut work: Vec<(Exp, Exp)> = constraints
        .iter()
        .map(|constraint| ((*constraint.lhs).clone(), (*constraint.rhs).clone()))
        .collect();

    while let Some((lhs, rhs)) = work.pop() {
        let (lhs_head, lhs_args) = destruct_spine(&lhs);
        let (rhs_head, rhs_args) = destruct_spine(&rhs);
        match (&lhs_head, &rhs_head) {
            (Exp::Variable(var), _) if lhs_args.is_empty() => assign.add(var.id, rhs),
            (_, Exp::Variable(var)) if rhs_args.is_empty() => assign.add(var.id, lhs),
            (Exp::Sym(s1), Exp::Sym(s2)) if s1.name == s2.name => match s1.kind {
                SymbolKind::Static => {
                    if lhs_args.len() == rhs_args.len() {
                        work.extend(lhs_args.into_iter().zip(rhs_args));
                    } else {
                        trace!("Dropping constraint with mismatched argument counts on {}", s1.name);
                    }
                }
                SymbolKind::Definable => {
                    warn!(
                        "Dropping constraint on definable symbol {}: it need not be injective",
                        s1.name
                    );
                }
            },
            (_, _) => {
                trace!(
                    "Dropping unorientable constraint {} = {}",
                    lhs.print_trace(),
                    rhs.print_trace()
                );
            }
        }
    }
    assign
}

#[cfg(test)]
mod tests {
    use crate::normalizer::whnf::eval;

    use super::*;

    /// `Nat`, `z`, `s` and a definable `plus` without rules yet.
    fn nat_sigs() -> (Signatures, ModulePath) {
        let path = ModulePath::from_dotted("nat");
        let mut sig = Signature::new(path.clone());
        let nat = sig.add_static(IdBind::from_string("Nat"), Box::new(Exp::TypeUniv(TypeUniv)));
        let nat_exp = Exp::Sym(Sym::new(nat, SymbolKind::Static));
        sig.add_static(IdBind::from_string("z"), Box::new(nat_exp.clone()));
        sig.add_static(
            IdBind::from_string("s"),
            Box::new(Exp::arrow(nat_exp.clone(), nat_exp.clone())),
        );
        sig.add_definable(
            IdBind::from_string("plus"),
            Box::new(Exp::arrow(nat_exp.clone(), Exp::arrow(nat_exp.clone(), nat_exp))),
        );
        let mut sigs = Signatures::new();
        sigs.insert(sig);
        (sigs, path)
    }

    fn sym(path: &ModulePath, name: &str, kind: SymbolKind) -> Exp {
        Exp::Sym(Sym::new(IdBound::new(path.clone(), name), kind))
    }

    fn church(path: &ModulePath, n: usize) -> Exp {
        let mut exp = sym(path, "z", SymbolKind::Static);
        for _ in 0..n {
            exp = Exp::app(sym(path, "s", SymbolKind::Static), exp);
        }
        exp
    }

    /// The two untyped rule declarations for plus; the variables are
    /// wildcards discovered by elaboration.
    fn plus_rules(path: &ModulePath) -> Vec<RuleDecl> {
        let y = Variable::fresh(VarBind::from_string("y"));
        let zero_rule = RuleDecl {
            params: vec![],
            lhs: Box::new(Exp::app_spine(
                sym(path, "plus", SymbolKind::Definable),
                [sym(path, "z", SymbolKind::Static), Exp::Variable(y.clone())],
            )),
            rhs: Box::new(Exp::Variable(y)),
        };

        let x = Variable::fresh(VarBind::from_string("x"));
        let y = Variable::fresh(VarBind::from_string("y"));
        let succ_rule = RuleDecl {
            params: vec![],
            lhs: Box::new(Exp::app_spine(
                sym(path, "plus", SymbolKind::Definable),
                [
                    Exp::app(sym(path, "s", SymbolKind::Static), Exp::Variable(x.clone())),
                    Exp::Variable(y.clone()),
                ],
            )),
            rhs: Box::new(Exp::app(
                sym(path, "s", SymbolKind::Static),
                Exp::app_spine(
                    sym(path, "plus", SymbolKind::Definable),
                    [Exp::Variable(x), Exp::Variable(y)],
                ),
            )),
        };
        vec![zero_rule, succ_rule]
    }

    #[test]
    fn plus_rules_pass_the_rule_checker() {
        let (mut sigs, path) = nat_sigs();
        for decl in plus_rules(&path) {
            let elab = elaborate_rule(&sigs, &decl).unwrap();
            assert_eq!(elab.arity, 2);
            let rule = check_rule(&sigs, &elab).unwrap();
            sigs.get_mut(&path).unwrap().attach_rule("plus", rule).unwrap();
        }

        // The checked rules compute: plus (s z) (s z) ▷ s (s z)
        let exp = Exp::app_spine(
            sym(&path, "plus", SymbolKind::Definable),
            [church(&path, 1), church(&path, 1)],
        );
        let result = eval(&sigs, exp).unwrap();
        assert_eq!(result, church(&path, 2));
    }

    #[test]
    fn wildcards_become_rule_variables() {
        let (sigs, path) = nat_sigs();
        let decl = &plus_rules(&path)[0];
        let elab = elaborate_rule(&sigs, decl).unwrap();
        // The single wildcard y was discovered and given a metavariable type.
        assert_eq!(elab.params.len(), 1);
        assert!(matches!(*elab.params[0].1, Exp::Hole(_)));
    }

    #[test]
    fn an_ill_typed_rule_is_rejected() {
        let (mut sigs, path) = nat_sigs();
        let nat_exp = sym(&path, "Nat", SymbolKind::Static);
        sigs.get_mut(&path).unwrap().add_definable(
            IdBind::from_string("f"),
            Box::new(Exp::arrow(nat_exp.clone(), nat_exp)),
        );

        // f x ↪ x x
        let x = Variable::fresh(VarBind::from_string("x"));
        let decl = RuleDecl {
            params: vec![],
            lhs: Box::new(Exp::app(
                sym(&path, "f", SymbolKind::Definable),
                Exp::Variable(x.clone()),
            )),
            rhs: Box::new(Exp::app(Exp::Variable(x.clone()), Exp::Variable(x))),
        };
        let elab = elaborate_rule(&sigs, &decl).unwrap();
        assert!(check_rule(&sigs, &elab).is_err());
    }

    #[test]
    fn the_pattern_head_must_be_definable() {
        let (sigs, path) = nat_sigs();
        let x = Variable::fresh(VarBind::from_string("x"));
        let decl = RuleDecl {
            params: vec![],
            lhs: Box::new(Exp::app(
                sym(&path, "s", SymbolKind::Static),
                Exp::Variable(x.clone()),
            )),
            rhs: Box::new(Exp::Variable(x)),
        };
        let err = elaborate_rule(&sigs, &decl).unwrap_err();
        assert!(matches!(*err, TypeError::PatternHeadNotDefinable { .. }));
    }

    #[test]
    fn rhs_variables_must_be_rule_variables() {
        let (sigs, path) = nat_sigs();
        let x = Variable::fresh(VarBind::from_string("x"));
        let stray = Variable::fresh(VarBind::from_string("stray"));
        let decl = RuleDecl {
            params: vec![],
            lhs: Box::new(Exp::app(
                sym(&path, "plus", SymbolKind::Definable),
                Exp::Variable(x),
            )),
            rhs: Box::new(Exp::Variable(stray)),
        };
        let err = elaborate_rule(&sigs, &decl).unwrap_err();
        assert!(matches!(*err, TypeError::UnboundVariable { .. }));
    }

    #[test]
    fn subject_reduction_for_accepted_rules() {
        use crate::typechecker::exprs::CheckInfer;

        let (mut sigs, path) = nat_sigs();
        for decl in plus_rules(&path) {
            let elab = elaborate_rule(&sigs, &decl).unwrap();
            let rule = check_rule(&sigs, &elab).unwrap();
            sigs.get_mut(&path).unwrap().attach_rule("plus", rule).unwrap();
        }

        // plus (s z) z and its reduct have convertible types.
        let exp = Exp::app_spine(
            sym(&path, "plus", SymbolKind::Definable),
            [church(&path, 1), church(&path, 0)],
        );
        let reduct = eval(&sigs, exp.clone()).unwrap();

        let mut ctx = Ctx::new(&sigs);
        let typ_before = exp.infer(&mut ctx).unwrap();
        let typ_after = reduct.infer(&mut ctx).unwrap();
        ctx.expect_convertible(&typ_before, &typ_after).unwrap();
    }
}
