//! Error types for the lir-rs library.
//!
//! Every transform in this crate is fail-fast: a violated precondition is
//! reported at the call that detects it, with structured context describing
//! the offending operation and shapes.

use std::io;

use thiserror::Error;

/// Main result type for lir-rs operations.
pub type Result<T> = std::result::Result<T, LirError>;

/// Error type for all lir-rs operations.
#[derive(Error, Debug)]
pub enum LirError {
    /// An array had the wrong number of axes or mismatched lengths
    #[error("Shape mismatch in {operation}: expected {expected}, got {actual}")]
    ShapeMismatch {
        /// Operation that rejected the input
        operation: String,
        /// Shape the operation requires
        expected: String,
        /// Shape that was received
        actual: String,
    },

    /// A semantic precondition on input values failed
    #[error("Value constraint violated: {message}")]
    ValueConstraint {
        /// Error description
        message: String,
        /// Input that failed the constraint
        field: Option<String>,
    },

    /// A stateful transformer was used before being fitted
    #[error("{transformer} must be fitted before transform")]
    NotFitted {
        /// Name of the transformer
        transformer: String,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config {
        /// Error description
        message: String,
        /// Configuration field that caused the error
        field: Option<String>,
    },

    /// Mathematical computation errors
    #[error("Mathematical error: {message}")]
    Math {
        /// Error description
        message: String,
        /// Context of the mathematical operation
        context: Option<String>,
    },

    /// I/O related errors
    #[error("I/O error: {message}")]
    Io {
        /// Human-readable error message
        message: String,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error description
        message: String,
        /// Data type being serialized
        data_type: Option<String>,
        /// Underlying serialization error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl LirError {
    /// Create a new shape mismatch error
    pub fn shape_mismatch(
        operation: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::ShapeMismatch {
            operation: operation.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create a new value constraint error naming the offending input
    pub fn value_constraint_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::ValueConstraint {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a new not-fitted error
    pub fn not_fitted(transformer: impl Into<String>) -> Self {
        Self::NotFitted {
            transformer: transformer.into(),
        }
    }

    /// Create a new configuration error with field context
    pub fn config_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a new mathematical error
    pub fn math(message: impl Into<String>) -> Self {
        Self::Math {
            message: message.into(),
            context: None,
        }
    }

    /// Create a new I/O error with context
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Add context to an existing error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        match &mut self {
            Self::Math { context: ctx, .. } => {
                *ctx = Some(context.into());
            }
            Self::ValueConstraint { field, .. } if field.is_none() => {
                *field = Some(context.into());
            }
            _ => {} // Shape and config errors already name their origin
        }
        self
    }
}

impl From<io::Error> for LirError {
    fn from(err: io::Error) -> Self {
        Self::io("I/O operation failed", err)
    }
}

impl From<serde_yaml::Error> for LirError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization {
            message: format!("YAML serialization failed: {err}"),
            data_type: Some("YAML".to_string()),
            source: Some(Box::new(err)),
        }
    }
}

impl From<statrs::StatsError> for LirError {
    fn from(err: statrs::StatsError) -> Self {
        Self::math(format!("Invalid distribution parameters: {err}"))
    }
}

/// Result extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;

    /// Add static context to an error result
    fn context(self, msg: &'static str) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<LirError>,
{
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.into().with_context(f()))
    }

    fn context(self, msg: &'static str) -> Result<T> {
        self.map_err(|e| e.into().with_context(msg))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_mismatch_display() {
        let err = LirError::shape_mismatch("abs_diff", "(m, f, 2)", "(3, 4, 3)");
        let display = format!("{err}");
        assert!(display.contains("abs_diff"));
        assert!(display.contains("(m, f, 2)"));
        assert!(display.contains("(3, 4, 3)"));
    }

    #[test]
    fn test_value_constraint_field() {
        let err = LirError::value_constraint_field("expected 2 distinct labels, got 3", "y");

        if let LirError::ValueConstraint { message, field } = err {
            assert_eq!(message, "expected 2 distinct labels, got 3");
            assert_eq!(field, Some("y".to_string()));
        } else {
            panic!("Expected ValueConstraint error");
        }
    }

    #[test]
    fn test_not_fitted_display() {
        let err = LirError::not_fitted("GaussianCdfTransformer");
        assert_eq!(
            err.to_string(),
            "GaussianCdfTransformer must be fitted before transform"
        );
    }

    #[test]
    fn test_with_context_math_error() {
        let err = LirError::math("Invalid standard deviation").with_context("gaussian_cdf.fit");

        if let LirError::Math { context, .. } = err {
            assert_eq!(context, Some("gaussian_cdf.fit".to_string()));
        } else {
            panic!("Expected Math error with context");
        }
    }

    #[test]
    fn test_with_context_keeps_existing_field() {
        let err = LirError::value_constraint_field("no groups", "groups").with_context("ignored");

        if let LirError::ValueConstraint { field, .. } = err {
            assert_eq!(field, Some("groups".to_string()));
        } else {
            panic!("Expected ValueConstraint error");
        }
    }

    #[test]
    fn test_from_yaml_error() {
        let yaml_err = serde_yaml::from_str::<i32>("invalid: yaml: content").unwrap_err();
        let err: LirError = yaml_err.into();

        if let LirError::Serialization { data_type, .. } = err {
            assert_eq!(data_type, Some("YAML".to_string()));
        } else {
            panic!("Expected Serialization error");
        }
    }

    #[test]
    fn test_result_ext_context() {
        let result: std::result::Result<i32, std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing",
        ));

        let err = result.context("Failed to read pipeline config").unwrap_err();
        assert!(matches!(err, LirError::Io { .. }));
    }
}
