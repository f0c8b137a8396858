//! System-wide constants for TesseraDB.
//!
//! This module defines constants used across the engine, including the
//! fixed values of the tile and WAL wire formats.

// =============================================================================
// Tile Group Constants
// =============================================================================

/// Default number of tuple slots per tile group.
pub const DEFAULT_TUPLES_PER_TILEGROUP: u32 = 1000;

// =============================================================================
// Wire Format Constants
// =============================================================================

/// Status byte written into every serialized tile header.
pub const TILE_SERIALIZATION_STATUS: i8 = -128;

/// Wire length marker for a null variable-length value.
pub const WIRE_NULL_LENGTH: i32 = -1;

/// Slot width of an uninlined (pooled) column, in bytes.
///
/// Uninlined columns store a pool offset in the tuple; the payload
/// itself lives in the tile's variable-length pool.
pub const UNINLINED_VALUE_SLOT_SIZE: usize = 8;

/// Tuple-record WAL header size.
///
/// Contains: record_type (1), txn_id (8), db_oid (4), table_oid (4),
/// insert_location (8), delete_location (8) = 33 bytes.
pub const TUPLE_RECORD_HEADER_SIZE: usize = 33;

// =============================================================================
// Pool Constants
// =============================================================================

/// Default chunk size for variable-length pools (64 KB).
pub const DEFAULT_POOL_CHUNK_SIZE: usize = 64 * 1024;

/// Minimum pool chunk size (4 KB).
pub const MIN_POOL_CHUNK_SIZE: usize = 4 * 1024;
