//! Equality and conversion checking
//!
//! Two terms can be compared in two modes. Strict equality ([eq]) is purely
//! structural on `unfold`ed heads, with α-equivalence for binders: both
//! binders are opened with the same fresh variable before their bodies are
//! compared. Conversion ([unify::Ctx::eq_modulo]) additionally reduces both
//! sides with the weak-head machine before comparing, so it decides equality
//! modulo β and the user's rewrite rules.
//!
//! Both modes may encounter metavariables. A metavariable is solved on the
//! spot when its environment falls into the Miller pattern fragment: the
//! environment entries must be distinct variables, and the metavariable must
//! not occur in its own candidate solution. Assignments are monotone and are
//! never undone.
//!
//! During rule matching, strict equality runs with the `rewrite` flag set;
//! an unresolved pattern variable encountered on the left then captures its
//! counterpart instead of being compared.
//!
//! When the typing context is in constraint mode, conversion records
//! irreducible disequalities as deferred [constraints::Constraint]s instead
//! of failing. This mode is used while typing the left-hand side of a
//! rewrite rule, whose pattern variables stand for arbitrary well-typed
//! terms.

pub mod constraints;
pub mod dec;
pub mod unify;

pub use dec::*;
pub use unify::{eq, solve_meta_var};
