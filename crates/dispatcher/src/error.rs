//! Error types for the dispatcher

use thiserror::Error;

/// Errors that can occur in the dispatcher
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// Listener creation failed
    #[error("failed to create listener '{name}': {message}")]
    ListenerCreation { name: String, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DispatcherError {
    /// Create a listener creation error
    pub fn listener_creation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ListenerCreation {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Result type for dispatcher operations
pub type Result<T> = std::result::Result<T, DispatcherError>;
