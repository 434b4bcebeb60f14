//! Error types for the projection pipeline.
use thiserror::Error;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the projection pipeline and its loaders.
///
/// The core never recovers from these. They describe inputs that are
/// insufficient or invalid for a given region and must be surfaced to the
/// caller as is.
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or invalid case/population/rate data.
    #[error("data error in {context}: {message}")]
    Data { context: String, message: String },

    /// Undefined numerical operation (log of non-positive values, zero
    /// population, non-finite integration state).
    #[error("numeric error in {context}: {message}")]
    Numeric { context: String, message: String },

    /// Unrecognized clinical model name.
    #[error("unknown clinical model: {0:?}")]
    ModelSelection(String),

    /// Parameters outside the domain of a simulation or request.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Creates a data error with context.
    pub fn data(context: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Data {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Creates a numeric error with context.
    pub fn numeric(context: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Numeric {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid input error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Error::InvalidInput(message.into())
    }

    pub fn is_data(&self) -> bool {
        matches!(self, Error::Data { .. })
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Error::Numeric { .. })
    }
}
