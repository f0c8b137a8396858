//! # tessera-storage
//!
//! Tile-based storage substrate for TesseraDB.
//!
//! This crate implements the physical row-set layout:
//! - **Tile**: a fixed-capacity, row-major slab of tuples sharing one schema
//! - **TileGroup**: a horizontal partition of a table's slot space, split
//!   vertically across one or more tiles
//! - **TileGroupHeader**: per-slot MVCC metadata (writer id, begin/end
//!   commit ids) plus the slot allocation cursor
//! - **DataTable**: the tile-group collection with the slot-reserving
//!   insert path
//!
//! Tiles carry a self-describing big-endian wire format used for both
//! network shipping and persistence.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod schema;
pub mod table;
pub mod tile;
pub mod tile_group;
pub mod tile_group_header;
pub mod tuple;
pub mod value;

mod wire;

pub use error::{StorageError, StorageResult};
pub use schema::{Column, Schema};
pub use table::DataTable;
pub use tile::{Tile, TileIterator};
pub use tile_group::TileGroup;
pub use tile_group_header::TileGroupHeader;
pub use tuple::{Tuple, TupleRef};
pub use value::{TriBool, Value, ValueType};
