//! Storage error types.

use thiserror::Error;

use crate::value::ValueType;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur in the storage layer.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend could not satisfy an allocation request.
    #[error("backend '{backend}' could not allocate {requested} bytes")]
    AllocationFailed {
        /// Name of the backend that refused the request.
        backend: &'static str,
        /// Number of bytes requested.
        requested: usize,
    },

    /// A tuple slot index past the tile's capacity.
    #[error("tuple slot {slot} out of range (capacity {capacity})")]
    SlotOutOfRange {
        /// The offending slot.
        slot: u32,
        /// The tile's slot capacity.
        capacity: u32,
    },

    /// A column index past the schema's column count.
    #[error("column {column} out of range ({count} columns)")]
    ColumnOutOfRange {
        /// The offending column index.
        column: usize,
        /// Number of columns in the schema.
        count: usize,
    },

    /// Incoming serialized column set does not match the tile schema.
    #[error(
        "column count mismatch: expecting {expected} columns {expected_names:?}, \
         but {received} given {received_names:?}"
    )]
    ColumnCountMismatch {
        /// Columns the receiving schema defines.
        expected: usize,
        /// Columns the input carries.
        received: usize,
        /// Names of the expected columns.
        expected_names: Vec<String>,
        /// Names of the received columns.
        received_names: Vec<String>,
    },

    /// Serialized tuple count does not fit the receiving tile.
    #[error("serialized tuple count {count} exceeds tile capacity {capacity}")]
    TupleCountExceedsCapacity {
        /// Tuples the input carries.
        count: u32,
        /// The receiving tile's slot capacity.
        capacity: u32,
    },

    /// Unknown value type tag in serialized input.
    #[error("unknown value type tag {tag}")]
    UnknownValueType {
        /// The offending tag byte.
        tag: u8,
    },

    /// Serialized input ended before a complete field.
    #[error("unexpected end of input: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof {
        /// Bytes the next field requires.
        needed: usize,
        /// Bytes left in the input.
        remaining: usize,
    },

    /// A negative or oversized length prefix in serialized input.
    #[error("invalid length prefix {length}")]
    InvalidLength {
        /// The offending length value.
        length: i32,
    },

    /// Length-prefixed string bytes were not valid UTF-8.
    #[error("invalid utf-8 in serialized string")]
    InvalidUtf8,

    /// Two values of incomparable types.
    #[error("cannot compare {left:?} with {right:?}")]
    TypeMismatch {
        /// Type of the left operand.
        left: ValueType,
        /// Type of the right operand.
        right: ValueType,
    },

    /// A value whose type does not match its column.
    #[error("value of type {value:?} does not fit column '{column}' of type {expected:?}")]
    ValueTypeMismatch {
        /// Type of the offending value.
        value: ValueType,
        /// Name of the target column.
        column: String,
        /// Type the column expects.
        expected: ValueType,
    },

    /// A null value written into a non-nullable column.
    #[error("null value in non-nullable column '{column}'")]
    NullNotAllowed {
        /// Name of the column.
        column: String,
    },

    /// A pool offset that names no allocated record.
    #[error("invalid pool offset {offset:#018x}")]
    InvalidPoolOffset {
        /// The raw offset value.
        offset: u64,
    },

    /// An invalid engine configuration.
    #[error("invalid engine configuration: {reason}")]
    InvalidConfig {
        /// What is wrong with the configuration.
        reason: String,
    },
}

impl StorageError {
    /// Creates an allocation failure error.
    pub fn allocation_failed(backend: &'static str, requested: usize) -> Self {
        Self::AllocationFailed { backend, requested }
    }

    /// Creates a slot-out-of-range error.
    pub fn slot_out_of_range(slot: u32, capacity: u32) -> Self {
        Self::SlotOutOfRange { slot, capacity }
    }

    /// Creates a column-out-of-range error.
    pub fn column_out_of_range(column: usize, count: usize) -> Self {
        Self::ColumnOutOfRange { column, count }
    }

    /// Returns true if this error indicates corrupt or truncated input.
    pub fn is_serialization(&self) -> bool {
        matches!(
            self,
            Self::ColumnCountMismatch { .. }
                | Self::TupleCountExceedsCapacity { .. }
                | Self::UnknownValueType { .. }
                | Self::UnexpectedEof { .. }
                | Self::InvalidLength { .. }
                | Self::InvalidUtf8
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StorageError::allocation_failed("heap", 4096);
        assert!(format!("{}", err).contains("4096"));

        let err = StorageError::slot_out_of_range(10, 4);
        assert!(format!("{}", err).contains("10"));
    }

    #[test]
    fn test_serialization_classification() {
        assert!(StorageError::UnknownValueType { tag: 99 }.is_serialization());
        assert!(StorageError::InvalidUtf8.is_serialization());
        assert!(!StorageError::allocation_failed("heap", 1).is_serialization());
    }
}
