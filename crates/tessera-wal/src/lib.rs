//! # tessera-wal
//!
//! Tuple-level write-ahead log records for TesseraDB.
//!
//! This crate defines the in-memory shape and bit-exact serialization
//! of the tuple record: the unit the recovery manager writes for every
//! insert, delete, and update. The record header carries the mutating
//! transaction, the affected table, and the physical tuple locations;
//! insert and update records append the tuple payload serialized
//! against the table's schema (the schema itself is not inlined — the
//! recovery reader looks it up by table oid).

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod record;

pub use error::{WalError, WalResult};
pub use record::{TupleRecord, TupleRecordType};
