pub mod conversion_checking;
pub mod normalizer;
pub mod result;
pub mod typechecker;

pub use normalizer::whnf::{eval, whnf};
pub use typechecker::ctx::Ctx;
pub use typechecker::decls::{check_rule, elaborate_rule, Param, RuleDecl};
pub use typechecker::exprs::{sort_of, CheckInfer};
