//! Error types for the ModelDB syncer.

use thiserror::Error;

/// A shared error type for the whole syncer workspace.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait.
#[derive(Error, Debug, Clone)]
pub enum ModelDbError {
    /// The transport to the metadata store could not be opened.
    #[error("Connection error: {0}")]
    Connection(String),

    /// A single RPC call failed while flushing or syncing context.
    #[error("Transmission error while sending {event}: {message}")]
    Transmission { event: &'static str, message: String },

    /// A frame could not be brought into columnar shape.
    #[error("Schema error: {0}")]
    Schema(String),

    /// Context was set out of order (e.g. experiment before project).
    #[error("Context order error: {0}")]
    ContextOrder(String),

    /// The session slot is already held with a different configuration.
    #[error("Session already initialized with a different configuration")]
    AlreadyInitialized,

    /// The interceptor table does not enable this operation for the type.
    #[error("Operation '{operation}' is not enabled for '{type_name}'")]
    Unsupported {
        type_name: String,
        operation: &'static str,
    },

    /// Caller supplied arguments that cannot be recorded.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The wrapped estimator operation itself failed.
    #[error("Estimator error: {0}")]
    Estimator(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ModelDbError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Connection error
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Wraps any error raised while sending `event` into a Transmission error.
    pub fn transmission(event: &'static str, source: impl std::fmt::Display) -> Self {
        Self::Transmission {
            event,
            message: source.to_string(),
        }
    }

    /// Re-labels any failure of a store call as a Transmission error for
    /// `event`. Errors that already are Transmission errors keep their label.
    pub fn into_transmission(self, event: &'static str) -> Self {
        match self {
            err @ Self::Transmission { .. } => err,
            other => Self::transmission(event, other),
        }
    }

    /// Creates a Schema error
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema(message.into())
    }

    /// Creates a ContextOrder error
    pub fn context_order(message: impl Into<String>) -> Self {
        Self::ContextOrder(message.into())
    }

    /// Creates an Unsupported error
    pub fn unsupported(type_name: impl Into<String>, operation: &'static str) -> Self {
        Self::Unsupported {
            type_name: type_name.into(),
            operation,
        }
    }

    /// Creates an InvalidInput error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Creates an Estimator error from the wrapped library's failure.
    pub fn estimator(err: anyhow::Error) -> Self {
        Self::Estimator(format!("{err:#}"))
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a Connection error
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// Check if this is a Transmission error
    pub fn is_transmission(&self) -> bool {
        matches!(self, Self::Transmission { .. })
    }

    /// Check if this is a Schema error
    pub fn is_schema(&self) -> bool {
        matches!(self, Self::Schema(_))
    }

    /// Check if this is a ContextOrder error
    pub fn is_context_order(&self) -> bool {
        matches!(self, Self::ContextOrder(_))
    }

    /// Check if this is an Unsupported error
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for ModelDbError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for ModelDbError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for ModelDbError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for ModelDbError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, ModelDbError>`.
pub type Result<T> = std::result::Result<T, ModelDbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transmission_keeps_event_kind_and_message() {
        let err = ModelDbError::transmission("FitEvent", "broken pipe");
        assert!(err.is_transmission());
        assert_eq!(
            err.to_string(),
            "Transmission error while sending FitEvent: broken pipe"
        );
    }

    #[test]
    fn io_error_converts_with_kind() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err: ModelDbError = io.into();
        assert!(err.to_string().contains("ConnectionRefused"));
    }
}
