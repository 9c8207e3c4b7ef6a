//! Bidirectional type inference and checking
//!
//! The typing context carries the local variable typings, the signature
//! registry, and the optional constraint-collection mode used while typing
//! the left-hand side of a rewrite rule.

pub mod ctx;
pub mod decls;
pub mod exprs;
