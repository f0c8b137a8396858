//! Execution context.
//!
//! Everything the pipeline used to reach into ambient state for is
//! carried here explicitly: the observing transaction, its snapshot
//! commit point, and the database being queried.

use tessera_common::types::{CommitId, Oid, TxnId};

/// Per-query execution context.
///
/// # Example
///
/// ```rust
/// use tessera_common::types::{CommitId, Oid, TxnId};
/// use tessera_executor::ExecutorContext;
///
/// let ctx = ExecutorContext::new(TxnId::new(99), CommitId::new(10), Oid::new(1));
/// assert_eq!(ctx.txn_id(), TxnId::new(99));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ExecutorContext {
    txn_id: TxnId,
    last_commit_id: CommitId,
    database_id: Oid,
}

impl ExecutorContext {
    /// Creates a context for the given observer.
    #[must_use]
    pub fn new(txn_id: TxnId, last_commit_id: CommitId, database_id: Oid) -> Self {
        Self {
            txn_id,
            last_commit_id,
            database_id,
        }
    }

    /// Returns the observing transaction's id.
    #[inline]
    pub fn txn_id(&self) -> TxnId {
        self.txn_id
    }

    /// Returns the observer's snapshot commit point.
    #[inline]
    pub fn last_commit_id(&self) -> CommitId {
        self.last_commit_id
    }

    /// Returns the database being queried.
    #[inline]
    pub fn database_id(&self) -> Oid {
        self.database_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let ctx = ExecutorContext::new(TxnId::new(7), CommitId::new(3), Oid::new(1));
        assert_eq!(ctx.txn_id().as_u64(), 7);
        assert_eq!(ctx.last_commit_id().as_u64(), 3);
        assert_eq!(ctx.database_id().as_u32(), 1);
    }
}
