//! Variable context
//!
//! Tracks locally bound variables

use pretty::DocAllocator;
use printer::tokens::COLON;
use printer::util::BracketsExt;
use printer::{Alloc, Builder, Precedence, Print, PrintCfg};

use ast::*;

use crate::conversion_checking::constraints::Constraint;
use crate::conversion_checking::{unify, Dec};
use crate::result::{TcResult, TypeError};

/// The typing of one bound variable.
#[derive(Debug, Clone)]
pub struct Binding {
    pub var: Variable,
    pub typ: Box<Exp>,
}

/// Typing of bound variables, in binding order.
#[derive(Debug, Clone, Default)]
pub struct TypeCtx {
    bound: Vec<Binding>,
}

impl TypeCtx {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bound.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bound.is_empty()
    }

    pub fn lookup(&self, id: VarId) -> Option<&Binding> {
        self.bound.iter().rev().find(|binding| binding.var.id == id)
    }

    /// The variables currently in scope, in binding order. These become the
    /// environment of a metavariable created under this context.
    pub fn vars(&self) -> Vec<Variable> {
        self.bound.iter().map(|binding| binding.var.clone()).collect()
    }

    fn push(&mut self, binding: Binding) {
        self.bound.push(binding);
    }

    fn pop(&mut self) {
        self.bound.pop();
    }
}

impl Print for TypeCtx {
    fn print_prec<'a>(
        &'a self,
        cfg: &PrintCfg,
        alloc: &'a Alloc<'a>,
        _prec: Precedence,
    ) -> Builder<'a> {
        let sep = alloc.text(",").append(alloc.space());
        alloc
            .intersperse(
                self.bound.iter().map(|binding| {
                    binding
                        .var
                        .print(cfg, alloc)
                        .append(alloc.space())
                        .append(COLON)
                        .append(alloc.space())
                        .append(binding.typ.print(cfg, alloc))
                }),
                sep,
            )
            .brackets_anno()
    }
}

/// The typing context.
pub struct Ctx<'a> {
    /// Typing of bound variables
    pub vars: TypeCtx,
    /// The registry of loaded signatures
    pub sigs: &'a Signatures,
    /// `Some` while constraint mode is active: conversion defers irreducible
    /// disequalities here instead of failing. Strict mode is `None`.
    pub constraints: Option<Vec<Constraint>>,
}

impl<'a> Ctx<'a> {
    pub fn new(sigs: &'a Signatures) -> Self {
        Self { vars: TypeCtx::empty(), sigs, constraints: None }
    }

    /// Run `f` with one additional variable binding in scope.
    pub fn bind<T, F: FnOnce(&mut Self) -> T>(&mut self, var: Variable, typ: Box<Exp>, f: F) -> T {
        self.vars.push(Binding { var, typ });
        let res = f(self);
        self.vars.pop();
        res
    }

    /// Run `f` with a whole telescope of bindings in scope.
    pub fn bind_iter<T, I, F>(&mut self, bindings: I, f: F) -> T
    where
        I: IntoIterator<Item = Binding>,
        F: FnOnce(&mut Self) -> T,
    {
        let mut count = 0;
        for binding in bindings {
            self.vars.push(binding);
            count += 1;
        }
        let res = f(self);
        for _ in 0..count {
            self.vars.pop();
        }
        res
    }

    /// A hole for a fresh metavariable over the variables currently in scope.
    pub fn fresh_hole(&self) -> Hole {
        Hole::fresh(&self.vars.vars())
    }

    /// Conversion under the current mode: strict, or collecting constraints.
    pub fn convert(&mut self, lhs: &Exp, rhs: &Exp) -> TcResult<Dec> {
        let sigs = self.sigs;
        let mut unify = unify::Ctx::new(sigs, self.constraints.as_mut());
        unify.eq_modulo(lhs, rhs)
    }

    pub fn expect_convertible(&mut self, lhs: &Exp, rhs: &Exp) -> TcResult {
        match self.convert(lhs, rhs)? {
            Dec::Yes => Ok(()),
            Dec::No => Err(TypeError::not_eq(lhs, rhs).into()),
        }
    }

    /// Run inference with constraint mode active and return the collected
    /// constraints together with the inferred type. Nested use is a kernel
    /// bug.
    pub fn infer_with_constrs(&mut self, exp: &Exp) -> TcResult<(Box<Exp>, Vec<Constraint>)> {
        use crate::typechecker::exprs::CheckInfer;

        if self.constraints.is_some() {
            return Err(TypeError::Impossible {
                message: "constraint mode is not reentrant".to_owned(),
            }
            .into());
        }
        self.constraints = Some(Vec::new());
        let result = exp.infer(self);
        let constraints = self.constraints.take().unwrap_or_default();
        Ok((result?, constraints))
    }
}
