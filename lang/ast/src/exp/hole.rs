use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use derivative::Derivative;
use pretty::DocAllocator;
use printer::theme::ThemeExt;
use printer::tokens::{COMMA, QUESTION_MARK};
use printer::util::BracketsExt;
use printer::{Alloc, Builder, Precedence, Print, PrintCfg};
use serde_derive::{Deserialize, Serialize};

use crate::traits::{Assign, Occurs, Substitutable};

use super::{Exp, MultiBinder, Variable};

static NEXT_METAVAR_ID: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MetaVarId(u64);

impl fmt::Display for MetaVarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl serde::Serialize for MetaVarId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.0)
    }
}

impl<'de> serde::Deserialize<'de> for MetaVarId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = u64::deserialize(deserializer)?;
        NEXT_METAVAR_ID.fetch_max(raw + 1, Ordering::SeqCst);
        Ok(MetaVarId(raw))
    }
}

/// A unification metavariable: an interior-mutable cell that may eventually
/// hold a closed binder over the metavariable's environment.
///
/// The cell is shared between all holes for the same metavariable, so an
/// assignment becomes visible everywhere at once. Assignment is monotone:
/// once solved, a metavariable is never reassigned, and [MetaVar::solve]
/// panics on a second assignment.
#[derive(Debug, Clone, Derivative, Serialize, Deserialize)]
#[derivative(Eq, PartialEq, Hash)]
pub struct MetaVar {
    pub id: MetaVarId,
    #[derivative(PartialEq = "ignore", Hash = "ignore")]
    cell: Rc<RefCell<Option<MultiBinder<Box<Exp>>>>>,
}

impl MetaVar {
    pub fn fresh() -> Self {
        MetaVar {
            id: MetaVarId(NEXT_METAVAR_ID.fetch_add(1, Ordering::SeqCst)),
            cell: Rc::new(RefCell::new(None)),
        }
    }

    pub fn is_solved(&self) -> bool {
        self.cell.borrow().is_some()
    }

    pub fn solution(&self) -> Option<MultiBinder<Box<Exp>>> {
        self.cell.borrow().clone()
    }

    pub fn solve(&self, solution: MultiBinder<Box<Exp>>) {
        let mut cell = self.cell.borrow_mut();
        assert!(cell.is_none(), "metavariable ?{} assigned twice", self.id);
        *cell = Some(solution);
    }
}

/// A metavariable applied to its environment: `?m[e₁,…,eₖ]`.
///
/// The environment records the variables that were in scope when the
/// metavariable was created; at creation every entry is a variable term.
/// Substitution may later replace entries by arbitrary terms, which is
/// exactly the situation in which Miller-pattern instantiation fails.
#[derive(Debug, Clone, Derivative, Serialize, Deserialize)]
#[derivative(Eq, PartialEq)]
pub struct Hole {
    pub metavar: MetaVar,
    pub args: Vec<Exp>,
}

impl Hole {
    /// A hole for a fresh metavariable over the given variables in scope.
    pub fn fresh(scope: &[Variable]) -> Self {
        Hole {
            metavar: MetaVar::fresh(),
            args: scope.iter().cloned().map(Exp::Variable).collect(),
        }
    }
}

impl From<Hole> for Exp {
    fn from(val: Hole) -> Self {
        Exp::Hole(val)
    }
}

impl Substitutable for Hole {
    fn subst(&self, assign: &Assign) -> Self {
        Hole { metavar: self.metavar.clone(), args: self.args.subst(assign) }
    }
}

impl Occurs for Hole {
    fn occurs<F>(&self, f: &F) -> bool
    where
        F: Fn(&Exp) -> bool,
    {
        self.args.occurs(f)
            || self.metavar.solution().as_ref().is_some_and(|solution| solution.occurs(f))
    }
}

impl Print for Hole {
    fn print_prec<'a>(
        &'a self,
        cfg: &PrintCfg,
        alloc: &'a Alloc<'a>,
        _prec: Precedence,
    ) -> Builder<'a> {
        let mut doc = alloc.meta(&format!("{}{}", QUESTION_MARK, self.metavar.id));
        if cfg.print_metavar_args {
            let sep = alloc.text(COMMA).append(alloc.space());
            doc = doc.append(
                alloc
                    .intersperse(self.args.iter().map(|arg| arg.print(cfg, alloc)), sep)
                    .brackets_anno(),
            );
        }
        doc
    }
}
