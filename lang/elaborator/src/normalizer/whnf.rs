use std::collections::VecDeque;

use log::{trace, warn};

use ast::*;
use printer::PrintToString;

use crate::result::TcResult;

use super::matching::match_rules;

/// The argument stack of the reduction machine: the spine of still-unreduced
/// arguments, in left-to-right order.
pub type Stack = VecDeque<Exp>;

/// Reduce a machine state `(exp, stack)` to weak-head normal form.
///
/// Transitions, the first matching one fires:
///
/// 1. a non-rigid application uncovers its head and pushes the argument,
/// 2. an abstraction with a non-empty stack β-reduces,
/// 3. a definable symbol rewrites by the first matching rule,
/// 4. everything else halts; the stack is the spine.
pub fn whnf_stk(sigs: &Signatures, exp: Exp, mut stack: Stack) -> TcResult<(Exp, Stack)> {
    let mut head = exp;
    loop {
        head = head.unfold();
        match head {
            Exp::App(app) if !app.rigid => {
                stack.push_front(*app.arg);
                head = *app.fun;
            }
            Exp::Lam(lam) => match stack.pop_front() {
                Some(arg) => head = lam.binder.instantiate(&arg),
                None => return Ok((Exp::Lam(lam), stack)),
            },
            Exp::Sym(sym) if sym.kind == SymbolKind::Definable => {
                let mut candidates = match_rules(sigs, &sym, &stack)?;
                if candidates.is_empty() {
                    return Ok((Exp::Sym(sym), stack));
                }
                if candidates.len() > 1 {
                    warn!(
                        "Overlapping rewrite rules: {} candidates fire for {}",
                        candidates.len(),
                        sym.name
                    );
                }
                let (next_head, next_stack) = candidates.swap_remove(0);
                head = next_head;
                stack = next_stack;
            }
            other => return Ok((other, stack)),
        }
    }
}

/// Reassemble a machine state into a term. Rigid flags of static heads are
/// re-derived by the application smart constructor.
pub fn apply_stack(head: Exp, stack: Stack) -> Exp {
    Exp::app_spine(head, stack)
}

/// The weak-head normal form of a term.
pub fn whnf(sigs: &Signatures, exp: Exp) -> TcResult<Exp> {
    let (head, stack) = whnf_stk(sigs, exp, Stack::new())?;
    Ok(apply_stack(head, stack))
}

/// The `evaluate` command: weak-head normalization, applied recursively to
/// the spine. Binder bodies are not evaluated.
pub fn eval(sigs: &Signatures, exp: Exp) -> TcResult<Exp> {
    let (mut head, mut stack) = whnf_stk(sigs, exp.clone(), Stack::new())?;
    // A whnf head can still be an application when it is rigid; its
    // arguments belong to the spine as well.
    while let Exp::App(app) = head {
        stack.push_front(*app.arg);
        head = *app.fun;
    }
    let mut spine = Vec::with_capacity(stack.len());
    for arg in stack {
        spine.push(eval(sigs, arg)?);
    }
    let result = Exp::app_spine(head, spine);
    trace!("{} ▷ {}", exp.print_trace(), result.print_trace());
    Ok(result)
}
