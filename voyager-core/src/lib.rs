pub mod big;
pub mod coefficient;
pub mod complex;
pub mod config;
pub mod engine;
pub mod error;
pub mod functions;
pub mod grid;
pub mod term;
pub mod value;

// Re-export primary types for convenience.
pub use big::{digits_to_bits, BigComplex};
pub use coefficient::{Binding, ExtendedParameterList, SubstitutableCoefficient};
pub use complex::Complex;
pub use config::{
    CoefficientConfig, ComplexLiteral, EngineConfig, IterationParams, Precision, PrecisionMode,
    RecurrenceConfig, TermConfig, MAX_TERMS,
};
pub use engine::{IterationEngine, Recurrence, RecurrenceKind};
pub use error::{ArithmeticError, ConfigError, CoreError};
pub use functions::{ComplexFn, FunctionEntry, FunctionRegistry};
pub use grid::SampleGrid;
pub use term::Term;
pub use value::ComplexValue;

/// Convenience result type for the core crate.
pub type Result<T> = std::result::Result<T, CoreError>;
