//! # tessera-common
//!
//! Common types and utilities for TesseraDB.
//!
//! This crate provides the foundational pieces shared by every TesseraDB
//! component:
//!
//! - **Types**: Core identifiers (`Oid`, `TxnId`, `CommitId`) and the
//!   `ItemPointer` physical tuple locator
//! - **Memory**: The pluggable `Backend` allocator and the variable-length
//!   value `Pool`
//! - **Config**: Engine configuration structures
//! - **Constants**: System-wide constants and wire-format values
//!
//! ## Example
//!
//! ```rust
//! use tessera_common::types::{Oid, TxnId, CommitId, ItemPointer};
//!
//! let table = Oid::new(42);
//! let txn = TxnId::new(1);
//! let location = ItemPointer::new(Oid::new(0), Oid::new(3));
//! assert!(table.is_valid() && txn.is_valid() && !location.is_zero());
//! assert!(CommitId::new(7) < CommitId::MAX);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod constants;
pub mod memory;
pub mod types;
