//! Physical tuple locator.
//!
//! An `ItemPointer` names a physical tuple location as a
//! `(block, offset)` pair: the tile group that holds the tuple and the
//! slot inside it. WAL records carry two of these (insert and delete
//! locations), zero-filled when unused.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Oid;

/// A `(block, offset)` pair identifying a physical tuple location.
///
/// # Example
///
/// ```rust
/// use tessera_common::types::{ItemPointer, Oid};
///
/// let ptr = ItemPointer::new(Oid::new(7), Oid::new(3));
/// assert!(!ptr.is_zero());
/// assert!(ItemPointer::ZERO.is_zero());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemPointer {
    /// The tile group holding the tuple.
    pub block: Oid,
    /// The slot inside the tile group.
    pub offset: Oid,
}

impl ItemPointer {
    /// The zero-filled pointer, marking an unused location.
    pub const ZERO: Self = Self {
        block: Oid::new(0),
        offset: Oid::new(0),
    };

    /// Size of the wire encoding in bytes.
    pub const WIRE_SIZE: usize = 8;

    /// Creates a new item pointer.
    #[inline]
    #[must_use]
    pub const fn new(block: Oid, offset: Oid) -> Self {
        Self { block, offset }
    }

    /// Checks whether this is the zero-filled "unused" pointer.
    #[inline]
    #[must_use]
    pub fn is_zero(self) -> bool {
        self == Self::ZERO
    }

    /// Converts to bytes (big-endian, block then offset).
    #[inline]
    #[must_use]
    pub fn to_be_bytes(self) -> [u8; Self::WIRE_SIZE] {
        let mut bytes = [0u8; Self::WIRE_SIZE];
        bytes[0..4].copy_from_slice(&self.block.to_be_bytes());
        bytes[4..8].copy_from_slice(&self.offset.to_be_bytes());
        bytes
    }

    /// Creates an item pointer from bytes (big-endian).
    #[inline]
    #[must_use]
    pub fn from_be_bytes(bytes: [u8; Self::WIRE_SIZE]) -> Self {
        let block = Oid::from_be_bytes(bytes[0..4].try_into().expect("slice is 4 bytes"));
        let offset = Oid::from_be_bytes(bytes[4..8].try_into().expect("slice is 4 bytes"));
        Self { block, offset }
    }
}

impl fmt::Debug for ItemPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            write!(f, "ItemPointer(ZERO)")
        } else {
            write!(f, "ItemPointer({}, {})", self.block, self.offset)
        }
    }
}

impl fmt::Display for ItemPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.block, self.offset)
    }
}
