//! # tessera-executor
//!
//! Query execution layer for TesseraDB.
//!
//! This crate implements:
//! - **LogicalTile**: a zero-copy view over physical tiles, built from
//!   position lists, a visibility bitmap, and column bindings
//! - **Expressions**: a predicate tree evaluating to tri-valued
//!   booleans over tuple façades
//! - **Executors**: the pull-based operator interface and the
//!   sequential scan, which applies MVCC visibility and an optional
//!   predicate tile group by tile group

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod context;
pub mod error;
pub mod executor;
pub mod expression;
pub mod logical_tile;
pub mod seq_scan;

pub use context::ExecutorContext;
pub use error::{ExecutorError, ExecutorResult};
pub use executor::Executor;
pub use expression::{CompareOp, LogicalTileTuple, Operand, Predicate, RowView, TileGroupTuple};
pub use logical_tile::{ColumnBinding, LogicalTile};
pub use seq_scan::{SeqScanExecutor, SeqScanPlan};
