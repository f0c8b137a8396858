//! Core identifier types for TesseraDB.
//!
//! These types provide type-safe wrappers around numeric identifiers,
//! preventing accidental misuse of different ID types. Every catalog
//! object (database, table, tile group, tile, column) is addressed by a
//! 32-bit `Oid`; transactions and commit points use 64-bit identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Object identifier - addresses a catalog object.
///
/// Databases, tables, tile groups, tiles, and columns all share this
/// 32-bit identifier space. The all-ones value is reserved as the
/// "unset" sentinel.
///
/// # Example
///
/// ```rust
/// use tessera_common::types::Oid;
///
/// let table = Oid::new(42);
/// assert_eq!(table.as_u32(), 42);
/// assert!(!Oid::INVALID.is_valid());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Oid(u32);

impl Oid {
    /// Invalid object ID, used as a sentinel value.
    pub const INVALID: Self = Self(u32::MAX);

    /// First valid object ID.
    pub const FIRST: Self = Self(0);

    /// Creates a new `Oid` from a raw u32 value.
    #[inline]
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw u32 value.
    #[inline]
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// Returns the next object ID.
    #[inline]
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Checks if this is a valid object ID.
    #[inline]
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != Self::INVALID.0
    }

    /// Creates an Oid from bytes (big-endian).
    #[inline]
    #[must_use]
    pub fn from_be_bytes(bytes: [u8; 4]) -> Self {
        Self(u32::from_be_bytes(bytes))
    }

    /// Converts to bytes (big-endian).
    #[inline]
    #[must_use]
    pub fn to_be_bytes(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }
}

impl fmt::Debug for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::INVALID {
            write!(f, "Oid(INVALID)")
        } else {
            write!(f, "Oid({})", self.0)
        }
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for Oid {
    #[inline]
    fn from(id: u32) -> Self {
        Self::new(id)
    }
}

impl From<Oid> for u32 {
    #[inline]
    fn from(id: Oid) -> Self {
        id.0
    }
}

/// Transaction identifier - uniquely identifies a transaction.
///
/// Transaction IDs are assigned at transaction start and are used to:
/// - Mark a tuple slot's writer (the slot "lock")
/// - Decide own-write visibility in MVCC
///
/// Zero is the "no writer" sentinel, so an unlocked slot is simply one
/// whose writer field holds `TxnId::INVALID`.
///
/// # Example
///
/// ```rust
/// use tessera_common::types::TxnId;
///
/// let txn = TxnId::new(1);
/// assert!(txn.is_valid());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct TxnId(u64);

impl TxnId {
    /// Invalid transaction ID, used as the "no writer" sentinel.
    pub const INVALID: Self = Self(0);

    /// Minimum valid transaction ID.
    pub const MIN: Self = Self(1);

    /// Creates a new `TxnId` from a raw u64 value.
    #[inline]
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw u64 value.
    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Returns the next transaction ID.
    #[inline]
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Checks if this is a valid transaction ID.
    #[inline]
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != Self::INVALID.0
    }

    /// Creates a TxnId from bytes (big-endian).
    #[inline]
    #[must_use]
    pub fn from_be_bytes(bytes: [u8; 8]) -> Self {
        Self(u64::from_be_bytes(bytes))
    }

    /// Converts to bytes (big-endian).
    #[inline]
    #[must_use]
    pub fn to_be_bytes(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }
}

impl fmt::Debug for TxnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::INVALID {
            write!(f, "TxnId(INVALID)")
        } else {
            write!(f, "TxnId({})", self.0)
        }
    }
}

impl fmt::Display for TxnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TxnId {
    #[inline]
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

impl From<TxnId> for u64 {
    #[inline]
    fn from(id: TxnId) -> Self {
        id.0
    }
}

/// Commit identifier - a monotonically increasing commit point.
///
/// Commit IDs order committed transactions. A tuple slot stores the
/// commit ID at which it became visible (`begin`) and the commit ID at
/// which it ceased to be visible (`end`); `CommitId::MAX` stands for
/// "not yet" / "never" on both bounds.
///
/// # Example
///
/// ```rust
/// use tessera_common::types::CommitId;
///
/// let cid = CommitId::new(10);
/// assert!(cid < CommitId::MAX);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct CommitId(u64);

impl CommitId {
    /// First valid commit ID.
    pub const FIRST: Self = Self(1);

    /// Maximum commit ID, standing for "infinity".
    ///
    /// A `begin` bound of `MAX` marks an in-flight tuple; an `end` bound
    /// of `MAX` marks a live one.
    pub const MAX: Self = Self(u64::MAX);

    /// Creates a new `CommitId` from a raw u64 value.
    #[inline]
    #[must_use]
    pub const fn new(cid: u64) -> Self {
        Self(cid)
    }

    /// Returns the raw u64 value.
    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Returns the next commit ID.
    #[inline]
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Checks whether this is the "infinity" bound.
    #[inline]
    #[must_use]
    pub const fn is_max(self) -> bool {
        self.0 == Self::MAX.0
    }

    /// Creates a CommitId from bytes (big-endian).
    #[inline]
    #[must_use]
    pub fn from_be_bytes(bytes: [u8; 8]) -> Self {
        Self(u64::from_be_bytes(bytes))
    }

    /// Converts to bytes (big-endian).
    #[inline]
    #[must_use]
    pub fn to_be_bytes(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }
}

impl fmt::Debug for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::MAX {
            write!(f, "CommitId(MAX)")
        } else {
            write!(f, "CommitId({})", self.0)
        }
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for CommitId {
    #[inline]
    fn from(cid: u64) -> Self {
        Self::new(cid)
    }
}

impl From<CommitId> for u64 {
    #[inline]
    fn from(cid: CommitId) -> Self {
        cid.0
    }
}
