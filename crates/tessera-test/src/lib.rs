//! # tessera-test
//!
//! Integration tests for TesseraDB.
//!
//! This crate contains:
//! - End-to-end scan scenarios
//! - Cross-crate invariant checks (wire round-trips, MVCC isolation)
//! - Shared fixtures for building populated tables

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod fixtures;
