use thiserror::Error;

/// Main error type for the Evolver workspace
#[derive(Error, Debug)]
pub enum EvError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    #[error("Evaluation error: {0}")]
    Evaluation(#[from] EvaluationError),

    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Parse and decode time errors. Raised before any algorithm is assembled.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Unknown parameter: {name}")]
    UnknownParameter { name: String },

    #[error("Missing parameter: {name}")]
    MissingParameter { name: String },

    #[error("Parameter {parameter}: invalid value '{value}' ({reason})")]
    InvalidValue {
        parameter: String,
        value: String,
        reason: String,
    },

    #[error("Parameter {parameter}={value} requires sub-parameter {sub_parameter}")]
    MissingSpecificSubParameter {
        parameter: String,
        value: String,
        sub_parameter: String,
    },

    #[error("Encoding length mismatch: expected {expected} coordinates, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Parameter {parameter}: coordinate {value} is outside [0, 1]")]
    FractionOutOfRange { parameter: String, value: f64 },

    #[error("Parameter {name} is declared twice with different domains")]
    ConflictingDeclaration { name: String },

    #[error("Malformed token list: {message}")]
    MalformedTokens { message: String },

    #[error("Invalid domain for {parameter}: {message}")]
    InvalidDomain { parameter: String, message: String },

    #[error("Unknown name '{name}' for {kind}")]
    UnknownName { kind: String, name: String },
}

/// Build time errors. These indicate a violated internal invariant, never bad user input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    #[error("Parameter {parameter} was not decoded")]
    NotDecoded { parameter: String },

    #[error("Parameter {parameter} is not active in this configuration")]
    Inactive { parameter: String },

    #[error("Parameter {parameter} holds a {found} value, expected {expected}")]
    WrongValueKind {
        parameter: String,
        expected: String,
        found: String,
    },

    #[error("Non-configurable value {name} was not injected for {owner}")]
    MissingNonConfigurable { owner: String, name: String },

    #[error("Parameter {parameter}: unsupported value '{value}'")]
    UnsupportedValue { parameter: String, value: String },

    #[error("Inconsistent assembly: {message}")]
    Inconsistent { message: String },
}

/// Errors raised while scoring a candidate configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluationError {
    #[error("Reference front for {problem} is empty")]
    EmptyReferenceFront { problem: String },

    #[error("Inner run on {problem} produced an empty front")]
    EmptyFront { problem: String },

    #[error("Objective dimension mismatch on {problem}: front has {front}, reference has {reference}")]
    ObjectiveMismatch {
        problem: String,
        front: usize,
        reference: usize,
    },

    #[error("Indicator {indicator} produced a non-finite value")]
    NonFiniteIndicator { indicator: String },

    #[error("Inner run failed: {message}")]
    InnerRunFailed { message: String },

    #[error("Worker {worker} stopped unexpectedly")]
    WorkerLost { worker: usize },
}

/// Errors raised while reading or writing data files.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Parse error in {path} at line {line}: {message}")]
    ParseError {
        path: String,
        line: usize,
        message: String,
    },

    #[error("Invalid data format: {message}")]
    InvalidFormat { message: String },

    #[error("Data loading failed: {message}")]
    LoadingFailed { message: String },

    #[error("Data writing failed: {message}")]
    WritingFailed { message: String },
}

/// Result type alias for Evolver operations
pub type EvResult<T> = Result<T, EvError>;

/// Helper trait for converting string errors
pub trait IntoEvError {
    fn into_ev_error(self) -> EvError;
}

impl IntoEvError for String {
    fn into_ev_error(self) -> EvError {
        EvError::Internal(self)
    }
}

impl IntoEvError for &str {
    fn into_ev_error(self) -> EvError {
        EvError::Internal(self.to_string())
    }
}

/// Macro for creating validation errors
#[macro_export]
macro_rules! validation_error {
    ($($arg:tt)*) => {
        $crate::EvError::Validation(format!($($arg)*))
    };
}

/// Macro for creating internal errors
#[macro_export]
macro_rules! internal_error {
    ($($arg:tt)*) => {
        $crate::EvError::Internal(format!($($arg)*))
    };
}

/// Macro for creating configuration errors from a free-form message
#[macro_export]
macro_rules! config_error {
    ($($arg:tt)*) => {
        $crate::EvError::Config($crate::ConfigError::MalformedTokens {
            message: format!($($arg)*),
        })
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = ConfigError::DimensionMismatch {
            expected: 12,
            actual: 4,
        };

        assert!(error.to_string().contains("expected 12"));
        assert!(error.to_string().contains("got 4"));
    }

    #[test]
    fn test_error_conversion() {
        let build_error = BuildError::MissingNonConfigurable {
            owner: "mutation".to_string(),
            name: "maxIterations".to_string(),
        };
        let ev_error: EvError = build_error.into();

        match ev_error {
            EvError::Build(BuildError::MissingNonConfigurable { name, .. }) => {
                assert_eq!(name, "maxIterations")
            }
            _ => panic!("Expected Build error"),
        }
    }

    #[test]
    fn test_macros() {
        let _validation_err = validation_error!("Invalid value: {}", 42);
        let _internal_err = internal_error!("Something went wrong");
        let config_err = config_error!("Missing value after {}", "--crossover");
        assert!(matches!(config_err, EvError::Config(_)));
    }
}
