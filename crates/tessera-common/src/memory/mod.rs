//! Memory management for TesseraDB.
//!
//! This module provides the two allocation primitives the storage layer
//! is built on:
//!
//! - **Backend**: a pluggable byte-buffer allocator with explicit
//!   `allocate`/`free`, used for tile slabs and pool chunks
//! - **Pool**: a chunked bump allocator for variable-length values whose
//!   lifetime tracks the tile that owns it
//!
//! # Design Principles
//!
//! 1. **Explicit ownership**: a `RawBuffer` is a handle, not a guard;
//!    whoever allocated it frees it through the same backend
//! 2. **Zeroed slabs**: backends hand out zero-initialized memory so
//!    fresh tuple slots read as empty
//! 3. **Bulk free**: pool memory is released all at once when the pool
//!    is dropped, never per value

mod backend;
mod pool;

pub use backend::{Backend, HeapBackend, RawBuffer};
pub use pool::{Pool, PoolOffset};
