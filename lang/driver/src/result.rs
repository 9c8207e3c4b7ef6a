use miette::Diagnostic;
use thiserror::Error;

use ast::LookupError;
use elaborator::result::TypeError;

#[derive(Error, Diagnostic, Debug)]
#[diagnostic(transparent)]
#[error(transparent)]
pub enum Error {
    Type(#[from] Box<TypeError>),
    Lookup(#[from] LookupError),
    Driver(#[from] DriverError),
}

#[derive(Error, Debug, Diagnostic)]
pub enum DriverError {
    #[error("No object file found for module {module}")]
    #[diagnostic(code("D-001"))]
    ModuleNotFound { module: String },
    #[error("Assertion failed: {message}")]
    #[diagnostic(code("D-002"))]
    AssertionFailed { message: String },
    #[error("IO error: {0}")]
    #[diagnostic(code("D-003"))]
    Io(#[from] std::io::Error),
    #[error("Malformed object file: {0}")]
    #[diagnostic(code("D-004"))]
    Serialize(#[from] serde_json::Error),
}
