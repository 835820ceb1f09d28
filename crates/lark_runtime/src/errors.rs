//! Errors raised by the allocation core.
//!
//! Every failure is reported synchronously to the immediate caller; nothing here
//! is retried. Unboxing a value of the wrong type is not an error but a panic,
//! since it means a caller broke the boxing contract.

use thiserror::Error;

/// Common error message constants used throughout the runtime.
pub mod messages {
    pub const INVALID_UNION: &str = "invalid union: a union of one type is that type";
    pub const UNION_PATTERN_TOO_COMPLEX: &str = "union type pattern too complex";
    pub const TOO_FEW_ARGUMENTS: &str = "too few arguments to constructor";
    pub const TOO_MANY_ARGUMENTS: &str = "too many arguments to constructor";
    pub const CANNOT_INFER_PARAMETERS: &str = "type parameters cannot be inferred from arguments";
    pub const UNDEFINED_REFERENCE: &str = "access to undefined reference";
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RuntimeError {
    // Type system well-formedness
    #[error("{}", messages::INVALID_UNION)]
    InvalidUnion,
    #[error("{}", messages::UNION_PATTERN_TOO_COMPLEX)]
    AmbiguousUnionPattern,
    #[error("{name}: {}", messages::CANNOT_INFER_PARAMETERS)]
    CannotInferParameters { name: String },
    #[error("{name}: expected {expected} type parameters, got {actual}")]
    TypeParameterCount {
        name: String,
        expected: usize,
        actual: usize,
    },
    #[error("{0} is not a type constructor")]
    NotATypeConstructor(String),

    // Construction contract
    #[error("{}", messages::TOO_FEW_ARGUMENTS)]
    TooFewArguments,
    #[error("{}", messages::TOO_MANY_ARGUMENTS)]
    TooManyArguments,
    #[error("{func}: expected {expected}, got {actual}")]
    TypeCheck {
        func: String,
        expected: String,
        actual: String,
    },
    #[error("{func}: expected at least {min} arguments, got {actual}")]
    ArgumentCount {
        func: String,
        min: usize,
        actual: usize,
    },
    #[error("cannot convert a value of type {from} to {to}")]
    ConversionFailed { from: String, to: String },
    #[error("{0}: no constructor matches the argument types")]
    NoMatchingConstructor(String),
    #[error("{0} is not callable")]
    NotCallable(String),
    #[error("{0} cannot be constructed")]
    NotConstructible(String),
    #[error("{ty} has no field {field}")]
    UnknownField { ty: String, field: String },

    // Arrays
    #[error("{func}: dimension must be non-negative, got {actual}")]
    NegativeDimension { func: String, actual: i64 },
    #[error("{func}: expected {expected} dimensions, got {actual}")]
    DimensionCount {
        func: String,
        expected: usize,
        actual: usize,
    },
    #[error("array of dimensions {dims} exceeds the address space")]
    ArrayTooLarge { dims: String },
    #[error("index {index} out of bounds for array of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },
    #[error("{}", messages::UNDEFINED_REFERENCE)]
    UndefinedReference,

    // Configuration
    #[error("unsupported pointer width: {0} bits")]
    UnsupportedPointerWidth(u32),
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
