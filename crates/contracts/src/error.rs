//! Layered error definitions
//!
//! Two families: `StreamError` travels the notification channel into
//! `MessageListener::on_error`; `ContractError` is the Result-style error
//! for fallible operations (config loading, session setup).

use thiserror::Error;

/// Fault delivered to listeners through the uniform error channel.
///
/// Closed enumeration: adding a variant is a deliberate breaking change so
/// every match over faults has to decide how the new kind is handled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    /// Connection to the SENSR endpoint was lost.
    #[error("lost connection to SENSR (reason: {reason})")]
    Connection { reason: String },

    /// A stream payload could not be interpreted.
    #[error("failed to decode stream payload: {reason}")]
    Decode { reason: String },

    /// Any other client-side fault.
    #[error("internal stream fault: {reason}")]
    Internal { reason: String },
}

impl StreamError {
    /// Create a connection-loss fault
    pub fn connection(reason: impl Into<String>) -> Self {
        Self::Connection {
            reason: reason.into(),
        }
    }

    /// Create a decode fault
    pub fn decode(reason: impl Into<String>) -> Self {
        Self::Decode {
            reason: reason.into(),
        }
    }

    /// Create an internal fault
    pub fn internal(reason: impl Into<String>) -> Self {
        Self::Internal {
            reason: reason.into(),
        }
    }

    /// Short kind label for log fields and metric tags
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Connection { .. } => "connection",
            Self::Decode { .. } => "decode",
            Self::Internal { .. } => "internal",
        }
    }
}

/// Unified error type for fallible operations
#[derive(Debug, Error)]
pub enum ContractError {
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_display_names_loss_and_reason() {
        let error = StreamError::connection("network down");
        let text = error.to_string();
        assert!(text.contains("lost connection"));
        assert!(text.contains("network down"));
    }

    #[test]
    fn kind_labels_are_stable() {
        assert_eq!(StreamError::connection("x").kind(), "connection");
        assert_eq!(StreamError::decode("x").kind(), "decode");
        assert_eq!(StreamError::internal("x").kind(), "internal");
    }
}
