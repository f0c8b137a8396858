//! The pull-based operator interface.
//!
//! Operators form a Volcano-style pipeline: the caller drives `execute`
//! until it reports exhaustion, taking one logical tile per successful
//! call. No suspension happens inside `execute`; a call runs to
//! completion.

use crate::error::ExecutorResult;
use crate::logical_tile::LogicalTile;

/// A pipeline operator.
pub trait Executor {
    /// Prepares the operator for a fresh run.
    ///
    /// Binding failures (no table, missing schema) surface here, before
    /// any batch is produced.
    fn init(&mut self) -> ExecutorResult<()>;

    /// Produces the next batch.
    ///
    /// Returns `Ok(true)` when a logical tile is available through
    /// [`Executor::output`], `Ok(false)` on exhaustion. Exhaustion is
    /// not an error; evaluation failures are.
    fn execute(&mut self) -> ExecutorResult<bool>;

    /// Takes the batch produced by the last `execute` call.
    ///
    /// A batch is consumed exactly once; a second take returns `None`.
    fn output(&mut self) -> Option<LogicalTile>;

    /// Returns the operator's children.
    fn children_mut(&mut self) -> &mut [Box<dyn Executor>];
}
