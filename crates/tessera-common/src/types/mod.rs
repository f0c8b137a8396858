//! Type definitions for TesseraDB.
//!
//! This module contains the core identifier types used across the engine.

mod ids;
mod item_pointer;

pub use ids::{CommitId, Oid, TxnId};
pub use item_pointer::ItemPointer;
