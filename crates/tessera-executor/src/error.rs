//! Executor error types.

use thiserror::Error;

use tessera_storage::StorageError;

/// Result type for executor operations.
pub type ExecutorResult<T> = Result<T, ExecutorError>;

/// Errors that can occur during query execution.
#[derive(Debug, Error)]
pub enum ExecutorError {
    /// Predicate evaluation failed.
    #[error("expression evaluation failed: {message}")]
    Expression {
        /// What went wrong.
        message: String,
    },

    /// A scan node with neither a child nor a bound table.
    #[error("no table bound to the scan node")]
    TableNotBound,

    /// `execute` called before `init`.
    #[error("executor was not initialized")]
    NotInitialized,

    /// A storage-layer failure surfaced through the pipeline.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ExecutorError {
    /// Creates an expression evaluation error.
    pub fn expression(message: impl Into<String>) -> Self {
        Self::Expression {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ExecutorError::expression("type coercion failed");
        assert!(format!("{}", err).contains("type coercion failed"));
        assert!(format!("{}", ExecutorError::TableNotBound).contains("table"));
    }

    #[test]
    fn test_storage_conversion() {
        let storage = StorageError::slot_out_of_range(5, 4);
        let err: ExecutorError = storage.into();
        assert!(matches!(err, ExecutorError::Storage(_)));
    }
}
