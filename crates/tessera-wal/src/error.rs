//! WAL error types.

use thiserror::Error;

/// Result type for WAL operations.
pub type WalResult<T> = Result<T, WalError>;

/// Errors that can occur while building or decoding tuple records.
#[derive(Debug, Error)]
pub enum WalError {
    /// Unknown record type tag.
    #[error("unknown tuple record type: {value}")]
    UnknownRecordType {
        /// The offending tag byte.
        value: i8,
    },

    /// A record whose locations violate its type's invariants.
    #[error("invalid tuple record: {reason}")]
    InvalidRecord {
        /// Which invariant is violated.
        reason: String,
    },

    /// Failed to decode a record header.
    #[error("failed to deserialize tuple record: {reason}")]
    Deserialization {
        /// What went wrong.
        reason: String,
    },
}

impl WalError {
    /// Creates an invalid-record error.
    pub fn invalid_record(reason: impl Into<String>) -> Self {
        Self::InvalidRecord {
            reason: reason.into(),
        }
    }

    /// Creates a deserialization error.
    pub fn deserialization(reason: impl Into<String>) -> Self {
        Self::Deserialization {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = WalError::UnknownRecordType { value: 7 };
        assert!(format!("{}", err).contains('7'));

        let err = WalError::invalid_record("insert location missing");
        assert!(format!("{}", err).contains("insert location"));
    }
}
