//! Error types for batchpoll.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BatchPollError>;

#[derive(Error, Debug)]
pub enum BatchPollError {
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// An item was offered to a local batch that had already reported itself full.
    #[error("Batch capacity exceeded: store already holds {capacity} items")]
    CapacityExceeded { capacity: usize },

    #[error("Invalid message: {reason}")]
    InvalidMessage { reason: String },

    #[error("Unexpected error: {message}")]
    Unexpected { message: String },
}

impl BatchPollError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfig { message: message.into() }
    }

    pub fn capacity_exceeded(capacity: usize) -> Self {
        Self::CapacityExceeded { capacity }
    }

    pub fn invalid_message(reason: impl Into<String>) -> Self {
        Self::InvalidMessage { reason: reason.into() }
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected { message: message.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_exceeded_message() {
        let err = BatchPollError::capacity_exceeded(3);
        assert_eq!(err.to_string(), "Batch capacity exceeded: store already holds 3 items");
        assert!(matches!(err, BatchPollError::CapacityExceeded { capacity: 3 }));
    }
}
