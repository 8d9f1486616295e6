//! Error types for a3s-attack-store

use thiserror::Error;

/// A single listener that failed while being notified of a new attack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerFailure {
    /// Listener name as reported by `Listener::name`
    pub listener: String,

    /// Position of the listener in registration order
    pub position: usize,

    /// Error message or panic payload
    pub reason: String,
}

impl std::fmt::Display for ListenerFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{} {}: {}", self.position, self.listener, self.reason)
    }
}

/// Errors that can occur in the attack store
#[derive(Debug, Error)]
pub enum AttackStoreError {
    /// Caller supplied an unusable argument (missing criteria, bad timestamp)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Repository read or write failure
    #[error("Storage error during {operation}: {reason}")]
    Storage {
        operation: String,
        reason: String,
    },

    /// Serialization/deserialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error raised by a listener implementation
    #[error("Listener error: {0}")]
    Listener(String),

    /// One or more listeners failed after the attack was persisted
    #[error(
        "Attack '{attack_id}' was stored but {} listener(s) failed: {}",
        .failures.len(),
        format_failures(.failures)
    )]
    Notification {
        attack_id: String,
        failures: Vec<ListenerFailure>,
    },
}

impl AttackStoreError {
    /// Build a storage error for the given operation
    pub fn storage(operation: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Storage {
            operation: operation.into(),
            reason: reason.to_string(),
        }
    }
}

fn format_failures(failures: &[ListenerFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type alias for attack store operations
pub type Result<T> = std::result::Result<T, AttackStoreError>;
