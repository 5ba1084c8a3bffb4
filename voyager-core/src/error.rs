use thiserror::Error;

/// Configuration problems detected while building an engine.
///
/// These are always raised before any sample is iterated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("unknown function \"{0}\"")]
    UnknownFunction(String),

    #[error("one substitution flag per coefficient: expected {expected}, got {actual}")]
    SubstitutionLengthMismatch { expected: usize, actual: usize },

    #[error("function \"{function}\" takes {expected} extra argument(s), got {actual}")]
    ArityMismatch {
        function: String,
        expected: usize,
        actual: usize,
    },

    #[error("function \"{0}\" is already registered")]
    DuplicateFunction(String),

    #[error("at most {max} terms are supported, got {actual}")]
    TooManyTerms { max: usize, actual: usize },

    #[error("invalid max iterations: {0} (must be >= 1)")]
    InvalidMaxIterations(u32),

    #[error("invalid precision: {0} digits (must be >= 1)")]
    InvalidPrecision(u32),

    #[error("invalid escape radius: {0} (must be > 0.0)")]
    InvalidEscapeRadius(f64),

    #[error("invalid number \"{value}\": {reason}")]
    InvalidNumber { value: String, reason: String },

    #[error("invalid sample grid: {reason}")]
    InvalidGrid { reason: String },
}

/// Failures raised while iterating a single sample.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArithmeticError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("{function}: {reason}")]
    Domain {
        function: &'static str,
        reason: String,
    },
}

impl ArithmeticError {
    pub(crate) fn domain(function: &'static str, reason: impl Into<String>) -> Self {
        Self::Domain {
            function,
            reason: reason.into(),
        }
    }
}

/// Errors originating from the core iteration engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Arithmetic(#[from] ArithmeticError),
}
