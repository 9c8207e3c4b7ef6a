use log::trace;

use ast::*;
use printer::PrintToString;

use crate::conversion_checking::solve_meta_var;
use crate::normalizer::whnf::whnf;
use crate::result::{TcResult, TypeError};

use super::ctx::Ctx;

/// The CheckInfer trait for bidirectional type inference.
/// Expressions which implement this trait provide both a `check` function
/// to typecheck the expression against an expected type and an `infer`
/// function to infer the type of the given expression.
pub trait CheckInfer {
    /// Checks whether the expression has the given expected type. For
    /// checking we use the following syntax:
    /// ```text
    ///            Σ, Γ ⊢ e ⇐ τ
    /// ```
    /// - Σ: The signatures of the loaded modules.
    /// - Γ: The context of locally bound variables.
    /// - τ: The type we check against.
    fn check(&self, ctx: &mut Ctx, t: &Exp) -> TcResult;

    /// Tries to infer a type for the given expression. For inference we use
    /// the following syntax:
    /// ```text
    ///            Σ, Γ ⊢ e ⇒ τ
    /// ```
    /// - Σ: The signatures of the loaded modules.
    /// - Γ: The context of locally bound variables.
    ///
    /// The returned type is in weak-head normal form.
    fn infer(&self, ctx: &mut Ctx) -> TcResult<Box<Exp>>;
}

impl<T: CheckInfer> CheckInfer for Box<T> {
    fn check(&self, ctx: &mut Ctx, t: &Exp) -> TcResult {
        (**self).check(ctx, t)
    }
    fn infer(&self, ctx: &mut Ctx) -> TcResult<Box<Exp>> {
        (**self).infer(ctx)
    }
}

// Expressions
//
//

impl CheckInfer for Exp {
    fn check(&self, ctx: &mut Ctx, t: &Exp) -> TcResult {
        trace!(
            "{} |- {} <= {}",
            ctx.vars.print_trace(),
            self.print_trace(),
            t.print_trace()
        );
        let expected = whnf(ctx.sigs, t.clone())?;
        match self.unfold() {
            Exp::Variable(e) => e.check(ctx, &expected),
            Exp::TypeUniv(e) => e.check(ctx, &expected),
            Exp::Kind(e) => e.check(ctx, &expected),
            Exp::Sym(e) => e.check(ctx, &expected),
            Exp::Pi(e) => e.check(ctx, &expected),
            Exp::Lam(e) => e.check(ctx, &expected),
            Exp::App(e) => e.check(ctx, &expected),
            Exp::Hole(e) => e.check(ctx, &expected),
            Exp::PatVar(e) => e.check(ctx, &expected),
        }
    }

    fn infer(&self, ctx: &mut Ctx) -> TcResult<Box<Exp>> {
        let res = match self.unfold() {
            Exp::Variable(e) => e.infer(ctx),
            Exp::TypeUniv(e) => e.infer(ctx),
            Exp::Kind(e) => e.infer(ctx),
            Exp::Sym(e) => e.infer(ctx),
            Exp::Pi(e) => e.infer(ctx),
            Exp::Lam(e) => e.infer(ctx),
            Exp::App(e) => e.infer(ctx),
            Exp::Hole(e) => e.infer(ctx),
            Exp::PatVar(e) => e.infer(ctx),
        };
        trace!(
            "{} |- {} => {}",
            ctx.vars.print_trace(),
            self.print_trace(),
            res.as_ref().map(|typ| typ.print_trace()).unwrap_or_else(|_| "✗".to_owned())
        );
        res
    }
}

impl CheckInfer for Variable {
    fn check(&self, ctx: &mut Ctx, t: &Exp) -> TcResult {
        let inferred = self.infer(ctx)?;
        ctx.expect_convertible(&inferred, t)
    }

    fn infer(&self, ctx: &mut Ctx) -> TcResult<Box<Exp>> {
        let binding = ctx.vars.lookup(self.id).ok_or_else(|| TypeError::UnboundVariable {
            name: self.name.to_string(),
        })?;
        let typ = binding.typ.clone();
        Ok(Box::new(whnf(ctx.sigs, *typ)?))
    }
}

impl CheckInfer for TypeUniv {
    /// `Type` checks against `Kind` and nothing else.
    fn check(&self, _ctx: &mut Ctx, t: &Exp) -> TcResult {
        match t.unfold() {
            Exp::Kind(_) => Ok(()),
            other => Err(TypeError::checking_failure(&Exp::TypeUniv(TypeUniv), &other).into()),
        }
    }

    fn infer(&self, _ctx: &mut Ctx) -> TcResult<Box<Exp>> {
        Ok(Box::new(Exp::Kind(Kind)))
    }
}

impl CheckInfer for Kind {
    fn check(&self, _ctx: &mut Ctx, _t: &Exp) -> TcResult {
        Err(TypeError::UntypedKind.into())
    }

    fn infer(&self, _ctx: &mut Ctx) -> TcResult<Box<Exp>> {
        Err(TypeError::UntypedKind.into())
    }
}

impl CheckInfer for Sym {
    fn check(&self, ctx: &mut Ctx, t: &Exp) -> TcResult {
        let inferred = self.infer(ctx)?;
        ctx.expect_convertible(&inferred, t)
    }

    fn infer(&self, ctx: &mut Ctx) -> TcResult<Box<Exp>> {
        let symbol = ctx.sigs.lookup(&self.name)?;
        let typ = symbol.typ.clone();
        Ok(Box::new(whnf(ctx.sigs, *typ)?))
    }
}

impl CheckInfer for Pi {
    /// A product checks against a sort: its domain must itself be sorted
    /// (a `Type`-sorted domain abstracts over terms, a `Kind`-sorted one
    /// over types) and its codomain must check against the same sort.
    fn check(&self, ctx: &mut Ctx, t: &Exp) -> TcResult {
        match t.unfold() {
            Exp::TypeUniv(_) | Exp::Kind(_) => {
                sort_of(ctx, &self.domain)?;
                let (var, body) = self.binder.open();
                ctx.bind(var, self.domain.clone(), |ctx| body.check(ctx, t))
            }
            other => Err(TypeError::expected_sort(&other).into()),
        }
    }

    /// The type of a product is the sort of its codomain.
    fn infer(&self, ctx: &mut Ctx) -> TcResult<Box<Exp>> {
        let (var, body) = self.binder.open();
        let sort = ctx.bind(var, self.domain.clone(), |ctx| body.infer(ctx))?;
        match sort.unfold() {
            Exp::TypeUniv(_) | Exp::Kind(_) => Ok(sort),
            other => Err(TypeError::expected_sort(&other).into()),
        }
    }
}

impl CheckInfer for Lam {
    fn check(&self, ctx: &mut Ctx, t: &Exp) -> TcResult {
        match t.unfold() {
            Exp::Pi(pi) => {
                ctx.expect_convertible(&self.domain, &pi.domain)?;
                sort_of(ctx, &self.domain)?;
                let (var, body) = self.binder.open();
                let codomain = pi.binder.open_with(&var);
                ctx.bind(var, self.domain.clone(), |ctx| body.check(ctx, &codomain))
            }
            other => Err(TypeError::checking_failure(&self.clone().into(), &other).into()),
        }
    }

    fn infer(&self, ctx: &mut Ctx) -> TcResult<Box<Exp>> {
        let (var, body) = self.binder.open();
        let body_typ =
            ctx.bind(var.clone(), self.domain.clone(), |ctx| body.infer(ctx))?;
        Ok(Box::new(Exp::pi((*self.domain).clone(), Binder::bind(var, *body_typ))))
    }
}

impl CheckInfer for App {
    fn check(&self, ctx: &mut Ctx, t: &Exp) -> TcResult {
        let inferred = self.infer(ctx)?;
        ctx.expect_convertible(&inferred, t)
    }

    fn infer(&self, ctx: &mut Ctx) -> TcResult<Box<Exp>> {
        let fun_typ = self.fun.infer(ctx)?;
        match fun_typ.unfold() {
            Exp::Pi(pi) => {
                self.arg.check(ctx, &pi.domain)?;
                let result = pi.binder.instantiate(&self.arg);
                Ok(Box::new(whnf(ctx.sigs, result)?))
            }
            // An unknown function type is forced to a product over two fresh
            // metavariables in the ambient environment.
            Exp::Hole(hole) => {
                let domain: Exp = ctx.fresh_hole().into();
                let codomain: Exp = ctx.fresh_hole().into();
                let product = Exp::arrow(domain.clone(), codomain.clone());
                solve_meta_var(&hole, &product)?;
                self.arg.check(ctx, &domain)?;
                Ok(Box::new(whnf(ctx.sigs, codomain)?))
            }
            other => Err(TypeError::app_non_product(&self.fun, &other).into()),
        }
    }
}

impl CheckInfer for Hole {
    fn check(&self, _ctx: &mut Ctx, _t: &Exp) -> TcResult {
        Err(TypeError::CannotInferHole { hole: self.print_to_string(None) }.into())
    }

    fn infer(&self, _ctx: &mut Ctx) -> TcResult<Box<Exp>> {
        Err(TypeError::CannotInferHole { hole: self.print_to_string(None) }.into())
    }
}

impl CheckInfer for PatVar {
    fn check(&self, _ctx: &mut Ctx, _t: &Exp) -> TcResult {
        Err(TypeError::Impossible {
            message: format!("pattern variable ${} reached the typechecker", self.name),
        }
        .into())
    }

    fn infer(&self, _ctx: &mut Ctx) -> TcResult<Box<Exp>> {
        Err(TypeError::Impossible {
            message: format!("pattern variable ${} reached the typechecker", self.name),
        }
        .into())
    }
}

/// Decide whether a declared type belongs to `Type` or to `Kind`. Both are
/// tried in this order; a type in neither sort is a declaration error.
pub fn sort_of(ctx: &mut Ctx, typ: &Exp) -> TcResult<Exp> {
    if typ.check(ctx, &Exp::TypeUniv(TypeUniv)).is_ok() {
        return Ok(Exp::TypeUniv(TypeUniv));
    }
    if typ.check(ctx, &Exp::Kind(Kind)).is_ok() {
        return Ok(Exp::Kind(Kind));
    }
    Err(TypeError::not_a_sort(typ).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `Nat : Type`, `z : Nat`, `s : Nat → Nat`.
    fn nat_sigs() -> (Signatures, ModulePath) {
        let path = ModulePath::from_dotted("nat");
        let mut sig = Signature::new(path.clone());
        let nat = sig.add_static(IdBind::from_string("Nat"), Box::new(Exp::TypeUniv(TypeUniv)));
        let nat_exp = Exp::Sym(Sym::new(nat, SymbolKind::Static));
        sig.add_static(IdBind::from_string("z"), Box::new(nat_exp.clone()));
        sig.add_static(
            IdBind::from_string("s"),
            Box::new(Exp::arrow(nat_exp.clone(), nat_exp)),
        );
        let mut sigs = Signatures::new();
        sigs.insert(sig);
        (sigs, path)
    }

    fn sym(path: &ModulePath, name: &str, kind: SymbolKind) -> Exp {
        Exp::Sym(Sym::new(IdBound::new(path.clone(), name), kind))
    }

    #[test]
    fn successor_application_infers_nat() {
        let (sigs, path) = nat_sigs();
        let mut ctx = Ctx::new(&sigs);
        // s (s z) => Nat
        let exp = Exp::app(
            sym(&path, "s", SymbolKind::Static),
            Exp::app(sym(&path, "s", SymbolKind::Static), sym(&path, "z", SymbolKind::Static)),
        );
        let typ = exp.infer(&mut ctx).unwrap();
        assert_eq!(*typ, sym(&path, "Nat", SymbolKind::Static));
    }

    #[test]
    fn applying_a_non_function_fails() {
        let (sigs, path) = nat_sigs();
        let mut ctx = Ctx::new(&sigs);
        // z z
        let exp = Exp::app(sym(&path, "z", SymbolKind::Static), sym(&path, "z", SymbolKind::Static));
        let err = exp.infer(&mut ctx).unwrap_err();
        assert!(matches!(*err, TypeError::AppNonProduct { .. }));
    }

    #[test]
    fn type_universe_infers_kind() {
        let (sigs, _) = nat_sigs();
        let mut ctx = Ctx::new(&sigs);
        assert_eq!(*Exp::TypeUniv(TypeUniv).infer(&mut ctx).unwrap(), Exp::Kind(Kind));
        assert!(Exp::Kind(Kind).infer(&mut ctx).is_err());
    }

    #[test]
    fn check_implies_infer_up_to_conversion() {
        let (sigs, path) = nat_sigs();
        let mut ctx = Ctx::new(&sigs);
        let exp = Exp::app(sym(&path, "s", SymbolKind::Static), sym(&path, "z", SymbolKind::Static));
        let nat = sym(&path, "Nat", SymbolKind::Static);

        exp.check(&mut ctx, &nat).unwrap();
        let inferred = exp.infer(&mut ctx).unwrap();
        ctx.expect_convertible(&inferred, &nat).unwrap();
    }

    #[test]
    fn lambda_checks_against_a_product() {
        let (sigs, path) = nat_sigs();
        let mut ctx = Ctx::new(&sigs);
        let nat = sym(&path, "Nat", SymbolKind::Static);
        let x = Variable::fresh(VarBind::from_string("x"));
        let id = Exp::lam(nat.clone(), Binder::bind(x.clone(), Exp::Variable(x)));

        id.check(&mut ctx, &Exp::arrow(nat.clone(), nat.clone())).unwrap();

        // λ(x : Nat). x does not check against Nat itself.
        assert!(id.check(&mut ctx, &nat).is_err());
    }

    #[test]
    fn sort_of_declared_types() {
        let (sigs, path) = nat_sigs();
        let mut ctx = Ctx::new(&sigs);
        let nat = sym(&path, "Nat", SymbolKind::Static);

        // Nat is in Type, Nat → Type is in Kind.
        assert_eq!(sort_of(&mut ctx, &nat).unwrap(), Exp::TypeUniv(TypeUniv));
        assert_eq!(
            sort_of(&mut ctx, &Exp::arrow(nat.clone(), Exp::TypeUniv(TypeUniv))).unwrap(),
            Exp::Kind(Kind)
        );
        // z is not a type at all.
        assert!(sort_of(&mut ctx, &sym(&path, "z", SymbolKind::Static)).is_err());
    }

    #[test]
    fn unbound_variables_are_rejected() {
        let (sigs, _) = nat_sigs();
        let mut ctx = Ctx::new(&sigs);
        let x = Variable::fresh(VarBind::from_string("x"));
        let err = Exp::Variable(x).infer(&mut ctx).unwrap_err();
        assert!(matches!(*err, TypeError::UnboundVariable { .. }));
    }

    #[test]
    fn application_typing_through_a_metavariable() {
        let (sigs, path) = nat_sigs();
        let mut ctx = Ctx::new(&sigs);
        let nat = sym(&path, "Nat", SymbolKind::Static);

        // f : ?0 ⊢ f z forces ?0 to a product over fresh metavariables.
        let f = Variable::fresh(VarBind::from_string("f"));
        let hole: Exp = Hole::fresh(&[]).into();
        ctx.bind(f.clone(), Box::new(hole.clone()), |ctx| -> TcResult<()> {
            let exp = Exp::app(Exp::Variable(f.clone()), sym(&path, "z", SymbolKind::Static));
            let typ = exp.infer(ctx)?;
            // The forced domain metavariable was solved against Nat.
            let forced = hole.unfold();
            let Exp::Pi(pi) = forced else { panic!("expected a forced product") };
            assert!(matches!(pi.domain.unfold(), Exp::Sym(s) if s.name.id == "Nat"));
            assert!(matches!(typ.unfold(), Exp::Hole(_)));
            Ok(())
        })
        .unwrap();
        let _ = nat;
    }
}
