//! Per-slot MVCC metadata for a tile group.
//!
//! Each tuple slot carries three words:
//!
//! - `txn_id`: the writer currently holding the slot (the slot "lock");
//!   `TxnId::INVALID` means unlocked
//! - `begin`: the commit id at which the tuple becomes visible;
//!   `CommitId::MAX` while uncommitted
//! - `end`: the commit id at which it ceases to be visible;
//!   `CommitId::MAX` while live
//!
//! Slot allocation is a fetch-add cursor; committed state transitions
//! publish the commit ids with release ordering on the `txn_id` clear,
//! so a reader that observes an unlocked slot also observes that
//! committer's bounds.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use tessera_common::types::{CommitId, TxnId};

/// MVCC state of one tuple slot.
#[derive(Debug)]
struct SlotHeader {
    txn_id: AtomicU64,
    begin: AtomicU64,
    end: AtomicU64,
}

impl SlotHeader {
    fn new() -> Self {
        Self {
            txn_id: AtomicU64::new(TxnId::INVALID.as_u64()),
            begin: AtomicU64::new(CommitId::MAX.as_u64()),
            end: AtomicU64::new(CommitId::MAX.as_u64()),
        }
    }
}

/// Per-slot MVCC metadata plus the slot allocation cursor.
///
/// # Example
///
/// ```rust
/// use tessera_common::types::{CommitId, TxnId};
/// use tessera_storage::tile_group_header::TileGroupHeader;
///
/// let header = TileGroupHeader::new(4);
/// let writer = TxnId::new(7);
///
/// let slot = header.reserve_slot(writer).expect("capacity remains");
/// assert!(header.is_visible(slot, writer, CommitId::new(1)));
///
/// header.commit_insert(slot, CommitId::new(2));
/// assert!(header.is_visible(slot, TxnId::new(9), CommitId::new(5)));
/// ```
#[derive(Debug)]
pub struct TileGroupHeader {
    slots: Vec<SlotHeader>,
    next_free_slot: AtomicU32,
    active_tuple_count: AtomicU32,
}

impl TileGroupHeader {
    /// Creates a header for `capacity` tuple slots.
    #[must_use]
    pub fn new(capacity: u32) -> Self {
        let slots = (0..capacity).map(|_| SlotHeader::new()).collect();

        Self {
            slots,
            next_free_slot: AtomicU32::new(0),
            active_tuple_count: AtomicU32::new(0),
        }
    }

    /// Returns the slot capacity.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> u32 {
        self.slots.len() as u32
    }

    /// Returns the exclusive upper bound of allocated slot ids.
    ///
    /// This counts aborted slots too; visibility, not allocation,
    /// determines tuple liveness.
    #[inline]
    #[must_use]
    pub fn next_tuple_slot(&self) -> u32 {
        self.next_free_slot.load(Ordering::Acquire)
    }

    /// Returns the number of active (reserved minus deleted/aborted)
    /// tuples.
    #[inline]
    #[must_use]
    pub fn active_tuple_count(&self) -> u32 {
        self.active_tuple_count.load(Ordering::Relaxed)
    }

    /// Atomically claims the next free slot for `txn_id`.
    ///
    /// The claimed slot starts in-flight: `begin = end = MAX`, locked by
    /// the writer. Returns `None` when the group is full.
    #[must_use]
    pub fn reserve_slot(&self, txn_id: TxnId) -> Option<u32> {
        debug_assert!(txn_id.is_valid());

        let capacity = self.capacity();
        let slot = self
            .next_free_slot
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                (current < capacity).then_some(current + 1)
            })
            .ok()?;

        let header = &self.slots[slot as usize];
        header.begin.store(CommitId::MAX.as_u64(), Ordering::Relaxed);
        header.end.store(CommitId::MAX.as_u64(), Ordering::Relaxed);
        header.txn_id.store(txn_id.as_u64(), Ordering::Release);

        self.active_tuple_count.fetch_add(1, Ordering::Relaxed);

        Some(slot)
    }

    /// Publishes an inserted tuple at commit point `cid` and releases
    /// the slot lock.
    pub fn commit_insert(&self, slot: u32, cid: CommitId) {
        let header = &self.slots[slot as usize];
        header.begin.store(cid.as_u64(), Ordering::Relaxed);
        // The release store on the lock word publishes the bound above.
        header.txn_id.store(TxnId::INVALID.as_u64(), Ordering::Release);
    }

    /// Closes a tuple's visibility at commit point `cid` and releases
    /// the slot lock.
    pub fn commit_delete(&self, slot: u32, cid: CommitId) {
        let header = &self.slots[slot as usize];
        header.end.store(cid.as_u64(), Ordering::Relaxed);
        header.txn_id.store(TxnId::INVALID.as_u64(), Ordering::Release);

        self.active_tuple_count.fetch_sub(1, Ordering::Relaxed);
    }

    /// Rolls a slot back to in-flight-never-visible and releases the
    /// slot lock. The slot stays allocated; garbage collection reclaims
    /// it later.
    pub fn abort(&self, slot: u32) {
        let header = &self.slots[slot as usize];
        header.begin.store(CommitId::MAX.as_u64(), Ordering::Relaxed);
        header.end.store(CommitId::MAX.as_u64(), Ordering::Relaxed);
        header.txn_id.store(TxnId::INVALID.as_u64(), Ordering::Release);

        self.active_tuple_count.fetch_sub(1, Ordering::Relaxed);
    }

    /// The MVCC visibility predicate.
    ///
    /// A slot is visible to the observer iff:
    /// 1. the observer holds the slot lock (own uncommitted writes), or
    /// 2. the slot is unlocked, `begin <= last_commit_id`, and
    ///    `end > last_commit_id`.
    ///
    /// The predicate is monotone in `last_commit_id` for a fixed slot
    /// state.
    #[must_use]
    pub fn is_visible(&self, slot: u32, txn_id: TxnId, last_commit_id: CommitId) -> bool {
        let header = &self.slots[slot as usize];

        // The acquire load pairs with the committer's release store, so
        // an observed-unlocked slot implies its bounds are visible.
        let owner = TxnId::new(header.txn_id.load(Ordering::Acquire));

        if owner == txn_id && txn_id.is_valid() {
            return true;
        }

        if owner != TxnId::INVALID {
            return false;
        }

        let begin = CommitId::new(header.begin.load(Ordering::Relaxed));
        let end = CommitId::new(header.end.load(Ordering::Relaxed));

        begin <= last_commit_id && end > last_commit_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserve_slot() {
        let header = TileGroupHeader::new(2);
        let txn = TxnId::new(1);

        assert_eq!(header.reserve_slot(txn), Some(0));
        assert_eq!(header.reserve_slot(txn), Some(1));
        assert_eq!(header.reserve_slot(txn), None);

        assert_eq!(header.next_tuple_slot(), 2);
        assert_eq!(header.active_tuple_count(), 2);
    }

    #[test]
    fn test_own_writes_visible() {
        let header = TileGroupHeader::new(4);
        let writer = TxnId::new(77);
        let observer = TxnId::new(99);

        let slot = header.reserve_slot(writer).unwrap();

        // In-flight: visible to the writer, hidden from everyone else.
        assert!(header.is_visible(slot, writer, CommitId::new(10)));
        assert!(!header.is_visible(slot, observer, CommitId::new(10)));
    }

    #[test]
    fn test_commit_insert_publishes() {
        let header = TileGroupHeader::new(4);
        let writer = TxnId::new(1);
        let observer = TxnId::new(2);

        let slot = header.reserve_slot(writer).unwrap();
        header.commit_insert(slot, CommitId::new(5));

        assert!(header.is_visible(slot, observer, CommitId::new(5)));
        assert!(header.is_visible(slot, observer, CommitId::new(100)));
        // Observers before the commit point see nothing.
        assert!(!header.is_visible(slot, observer, CommitId::new(4)));
    }

    #[test]
    fn test_commit_delete_closes() {
        let header = TileGroupHeader::new(4);
        let writer = TxnId::new(1);
        let observer = TxnId::new(2);

        let slot = header.reserve_slot(writer).unwrap();
        header.commit_insert(slot, CommitId::new(5));
        header.commit_delete(slot, CommitId::new(10));

        assert!(header.is_visible(slot, observer, CommitId::new(7)));
        assert!(!header.is_visible(slot, observer, CommitId::new(10)));
        assert!(!header.is_visible(slot, observer, CommitId::new(11)));
        assert_eq!(header.active_tuple_count(), 0);
    }

    #[test]
    fn test_abort_hides() {
        let header = TileGroupHeader::new(4);
        let writer = TxnId::new(1);

        let slot = header.reserve_slot(writer).unwrap();
        header.abort(slot);

        // Invisible to everyone, including the former writer.
        assert!(!header.is_visible(slot, writer, CommitId::new(10)));
        assert!(!header.is_visible(slot, TxnId::new(2), CommitId::new(10)));
        // The slot stays allocated.
        assert_eq!(header.next_tuple_slot(), 1);
        assert_eq!(header.active_tuple_count(), 0);
    }

    #[test]
    fn test_unreserved_slot_invisible() {
        let header = TileGroupHeader::new(4);
        assert!(!header.is_visible(3, TxnId::new(1), CommitId::new(100)));
    }

    #[test]
    fn test_visibility_monotonicity() {
        let header = TileGroupHeader::new(4);
        let writer = TxnId::new(1);
        let observer = TxnId::new(2);

        let slot = header.reserve_slot(writer).unwrap();
        header.commit_insert(slot, CommitId::new(5));

        // Once visible, visibility persists for every later commit
        // point below `end`.
        let mut seen = false;
        for cid in 0..100u64 {
            let visible = header.is_visible(slot, observer, CommitId::new(cid));
            assert!(!seen || visible, "visibility regressed at cid {}", cid);
            seen |= visible;
        }
        assert!(seen);
    }

    #[test]
    fn test_concurrent_reservation() {
        use std::sync::Arc;
        use std::thread;

        let header = Arc::new(TileGroupHeader::new(64));
        let mut handles = vec![];

        for t in 0..4u64 {
            let header = Arc::clone(&header);
            handles.push(thread::spawn(move || {
                let txn = TxnId::new(t + 1);
                let mut claimed = vec![];
                while let Some(slot) = header.reserve_slot(txn) {
                    claimed.push(slot);
                }
                claimed
            }));
        }

        let mut all: Vec<u32> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        all.sort_unstable();

        // Every slot claimed exactly once.
        assert_eq!(all, (0..64).collect::<Vec<_>>());
        assert_eq!(header.next_tuple_slot(), 64);
    }
}
