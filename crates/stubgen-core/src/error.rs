//! Error handling for the stubgen code generation library.
//!
//! This module defines the main error type `Error` used throughout the library,
//! along with a convenient `Result` type alias. It uses `thiserror` for easy
//! error handling and implements conversions from common error types.
//!
//! # Examples
//!
//! ```
//! use stubgen_core::error::{Error, Result};
//!
//! fn might_fail() -> Result<()> {
//!     // Operations that might fail...
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Result type for stubgen generation operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for stubgen generation operations
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed IR rejected at construction time. `path` identifies the
    /// offending entity, e.g. `UserService.GetUser.id`.
    #[error("invalid IR at {path}: {reason}")]
    InvalidIr { path: String, reason: String },

    /// A default value that the target language cannot express
    #[error("literal {value} of type {type_name} is not representable in target {target}")]
    UnrepresentableLiteral {
        target: String,
        type_name: String,
        value: String,
    },

    /// Two distinct source names case-convert to the same identifier
    /// within one scope
    #[error("identifiers `{first}` and `{second}` in {scope} both render as `{rendered}`")]
    IdentifierCollision {
        scope: String,
        first: String,
        second: String,
        rendered: String,
    },

    /// A backend returned an empty or malformed fragment where the IR
    /// demands content
    #[error("formatter contract violation: {0}")]
    FormatterContractViolation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new invalid-IR error for the entity at `path`
    pub fn invalid_ir<P: Into<String>, R: Into<String>>(path: P, reason: R) -> Self {
        Self::InvalidIr {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a new formatter-contract-violation error
    pub fn contract<S: Into<String>>(msg: S) -> Self {
        Self::FormatterContractViolation(msg.into())
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Self::Config(s.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Self::Config(s)
    }
}
