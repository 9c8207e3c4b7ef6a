use miette::Diagnostic;
use thiserror::Error;

use ast::{Exp, LookupError};
use printer::PrintToString;

pub type TcResult<T = ()> = Result<T, Box<TypeError>>;

#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("Variable {name} is not bound in the context")]
    #[diagnostic(code("T-001"))]
    UnboundVariable { name: String },
    #[error("The following terms are not convertible:\n  1: {lhs}\n  2: {rhs}\n")]
    #[diagnostic(code("T-002"))]
    NotEq { lhs: String, rhs: String },
    #[error("Expected a sort, got {got}")]
    #[diagnostic(code("T-003"))]
    ExpectedSort { got: String },
    #[error("The type {typ} is neither in Type nor in Kind")]
    #[diagnostic(code("T-004"))]
    NotASort { typ: String },
    #[error("Cannot apply {fun}: its type {typ} is not a product")]
    #[diagnostic(code("T-005"))]
    AppNonProduct { fun: String, typ: String },
    #[error("The sort Kind does not itself have a type")]
    #[diagnostic(code("T-006"))]
    UntypedKind,
    #[error("Type annotation required for hole {hole}")]
    #[diagnostic(code("T-007"))]
    CannotInferHole { hole: String },
    #[error("{exp} does not check against the expected type {typ}")]
    #[diagnostic(code("T-008"))]
    CheckingFailure { exp: String, typ: String },
    #[error("Occurs check failed: metavariable {meta_var} occurs in its candidate solution")]
    #[diagnostic(code("T-009"))]
    MetaOccursCheckFailed { meta_var: String },
    #[error("The argument {arg} of metavariable {meta_var} is not a variable")]
    #[diagnostic(code("T-010"))]
    MetaArgNotVariable { meta_var: String, arg: String },
    #[error("The arguments of metavariable {meta_var} mention the variable {arg} twice")]
    #[diagnostic(code("T-011"))]
    MetaArgNotDistinct { meta_var: String, arg: String },
    #[error("The head of the rewrite pattern {lhs} is not a definable symbol")]
    #[diagnostic(code("T-012"))]
    PatternHeadNotDefinable { lhs: String },
    #[error("The right-hand side constraint {lhs} = {rhs} is not entailed by the left-hand side")]
    #[diagnostic(code("T-013"))]
    ConstraintNotEntailed { lhs: String, rhs: String },
    #[error("Ill-typed rewrite rule: the left-hand side has type {lhs_typ} but the right-hand side has type {rhs_typ}")]
    #[diagnostic(code("T-014"))]
    RuleTypeMismatch { lhs_typ: String, rhs_typ: String },
    #[error("An unexpected internal error occurred: {message}")]
    #[diagnostic(code("T-XXX"))]
    /// This error should not occur.
    /// Some internal invariant has been violated.
    Impossible { message: String },
    #[error(transparent)]
    #[diagnostic(transparent)]
    Lookup(#[from] LookupError),
}

impl TypeError {
    pub fn not_eq(lhs: &Exp, rhs: &Exp) -> Self {
        Self::NotEq { lhs: lhs.print_to_string(None), rhs: rhs.print_to_string(None) }
    }

    pub fn expected_sort(got: &Exp) -> Self {
        Self::ExpectedSort { got: got.print_to_string(None) }
    }

    pub fn not_a_sort(typ: &Exp) -> Self {
        Self::NotASort { typ: typ.print_to_string(None) }
    }

    pub fn app_non_product(fun: &Exp, typ: &Exp) -> Self {
        Self::AppNonProduct { fun: fun.print_to_string(None), typ: typ.print_to_string(None) }
    }

    pub fn checking_failure(exp: &Exp, typ: &Exp) -> Self {
        Self::CheckingFailure { exp: exp.print_to_string(None), typ: typ.print_to_string(None) }
    }
}

impl From<LookupError> for Box<TypeError> {
    fn from(err: LookupError) -> Self {
        Box::new(TypeError::Lookup(err))
    }
}
