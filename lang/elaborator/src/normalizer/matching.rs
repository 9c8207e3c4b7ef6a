use log::trace;

use ast::*;
use printer::PrintToString;

use crate::conversion_checking::{eq, Dec};
use crate::result::TcResult;

use super::whnf::{whnf, Stack};

/// Match the rules of a definable symbol against an argument stack.
///
/// Arguments up to the largest fitting rule arity are pre-reduced to whnf
/// first; a rule whose pattern needs a deeper argument shape can only fire
/// because of this step. All successful candidates are returned in insertion
/// order together with the remainder of the (pre-reduced) stack; the caller
/// commits to the first one.
pub fn match_rules(sigs: &Signatures, sym: &Sym, stack: &Stack) -> TcResult<Vec<(Exp, Stack)>> {
    let symbol = sigs.lookup(&sym.name)?;
    let len = stack.len();
    let Some(max_arity) = symbol.rules.iter().map(|rule| rule.arity).filter(|&a| a <= len).max()
    else {
        return Ok(Vec::new());
    };

    let mut reduced = stack.clone();
    for position in 0..max_arity {
        let arg = reduced[position].clone();
        reduced[position] = whnf(sigs, arg)?;
    }

    let mut candidates = Vec::new();
    for rule in &symbol.rules {
        if rule.arity > len {
            continue;
        }
        if let Some(candidate) = try_rule(sym, rule, &reduced)? {
            candidates.push(candidate);
        }
    }
    Ok(candidates)
}

/// Attempt a single rule with a fresh set of pattern-variable cells.
fn try_rule(sym: &Sym, rule: &Rule, stack: &Stack) -> TcResult<Option<(Exp, Stack)>> {
    let pat_vars: Vec<PatVar> =
        rule.lhs.vars.iter().map(|var| PatVar::fresh(var.name.clone())).collect();
    let pat_args: Vec<Exp> = pat_vars.iter().cloned().map(Exp::PatVar).collect();
    let patterns = rule.lhs.instantiate(&pat_args);

    for (pattern, arg) in patterns.iter().zip(stack.iter()) {
        match eq(pattern, arg, true)? {
            Dec::Yes => {}
            Dec::No => return Ok(None),
        }
    }

    // Dereference the pattern variables bound by the match. A variable the
    // patterns never mention dereferences to itself.
    let rhs_args: Vec<Exp> = pat_vars
        .iter()
        .map(|pat_var| pat_var.content().unwrap_or_else(|| Exp::PatVar(pat_var.clone())))
        .collect();
    let rhs = rule.rhs.instantiate(&rhs_args);
    let rest: Stack = stack.iter().skip(rule.arity).cloned().collect();
    trace!("{} ↪ {}", sym.name, rhs.print_trace());
    Ok(Some((*rhs, rest)))
}
