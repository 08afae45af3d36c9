//! Error types.
//!
//! Shape-level errors (`InvalidInput`, `DimensionsCalculation`, `Clean`) are
//! isolated by the processing queue: the shape is skipped and the run goes on.
//! Mode-level errors (`NotPermitted`, `Layout`, `Render`, `Configuration` for
//! an unknown mode) fail only the mode being compiled.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the library.
pub type Result<T, E = SpriteError> = std::result::Result<T, E>;

#[derive(Debug, Clone, Error)]
pub enum SpriteError {
    #[error("invalid SVG document `{name}`: {reason}")]
    InvalidInput { name: String, reason: String },

    #[error("could not determine dimensions of `{name}`: {reason}")]
    DimensionsCalculation { name: String, reason: String },

    #[error("transformation of `{name}` failed: {source}")]
    Clean {
        name: String,
        #[source]
        source: TransformError,
    },

    #[error("operation not permitted on `{name}`: {reason}")]
    NotPermitted { name: String, reason: String },

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("layout failed: {0}")]
    Layout(String),

    #[error("rendering `{target}` failed: {reason}")]
    Render { target: String, reason: String },

    #[error("IO error when accessing `{0}`: {1}")]
    Io(PathBuf, String),
}

impl SpriteError {
    pub(crate) fn invalid_input(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn dimensions(name: &str, reason: impl Into<String>) -> Self {
        Self::DimensionsCalculation {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn not_permitted(name: &str, reason: impl Into<String>) -> Self {
        Self::NotPermitted {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether the error only invalidates a single shape.
    pub fn is_shape_level(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput { .. } | Self::DimensionsCalculation { .. } | Self::Clean { .. }
        )
    }
}

/// Failure reported by an external collaborator (cleaner or dimension renderer).
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct TransformError(pub String);

impl TransformError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<usvg::Error> for TransformError {
    fn from(err: usvg::Error) -> Self {
        Self(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_level_classification() {
        assert!(SpriteError::invalid_input("a.svg", "no root").is_shape_level());
        assert!(SpriteError::dimensions("a.svg", "zero").is_shape_level());
        assert!(!SpriteError::not_permitted("a", "not ready").is_shape_level());
        assert!(!SpriteError::Layout("overflow".into()).is_shape_level());
    }

    #[test]
    fn test_display_includes_name() {
        let err = SpriteError::invalid_input("icons/a.svg", "missing <svg> root");
        let message = err.to_string();
        assert!(message.contains("icons/a.svg"));
        assert!(message.contains("missing <svg> root"));
    }
}
