//! Logical tiles: zero-copy views over physical tiles.
//!
//! A logical tile addresses tuples indirectly. It holds:
//!
//! - one or more *position lists*, each an ordered sequence of tuple
//!   slot ids into some backing tile group
//! - a *visibility bitmap* over positions, all set at construction;
//!   filtering clears bits instead of rewriting lists
//! - *column bindings* mapping output columns to
//!   `(backing tile, tile-local column, position list)`
//!
//! Backing tiles are reference counted: a binding clones the tile's
//! `Arc`, so a projected tile held only by the logical tile is freed
//! when the logical tile drops, while table-owned tiles survive.

use std::sync::Arc;

use bitvec::vec::BitVec;
use tessera_storage::{Tile, Value};

use crate::error::{ExecutorError, ExecutorResult};

/// One output column of a logical tile.
#[derive(Debug, Clone)]
pub struct ColumnBinding {
    /// The backing physical tile.
    pub tile: Arc<Tile>,
    /// Column index inside the backing tile.
    pub tile_column: usize,
    /// Which position list this column resolves slots through.
    pub position_list: usize,
}

/// A view over one or more physical tiles.
///
/// A logical tile is produced by an executor and consumed exactly once
/// by its parent.
///
/// # Example
///
/// ```rust
/// use tessera_executor::LogicalTile;
///
/// let mut tile = LogicalTile::new();
/// let list = tile.add_position_list(vec![0, 2, 3]);
/// assert_eq!(list, 0);
/// assert_eq!(tile.visible_count(), 3);
///
/// tile.remove_visibility(1);
/// let positions: Vec<usize> = tile.visible_positions().collect();
/// assert_eq!(positions, vec![0, 2]);
/// ```
#[derive(Debug, Default)]
pub struct LogicalTile {
    position_lists: Vec<Vec<u32>>,
    visible: BitVec,
    visible_count: usize,
    columns: Vec<ColumnBinding>,
}

impl LogicalTile {
    /// Creates an empty logical tile.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a position list and returns its index.
    ///
    /// The first list sizes the visibility bitmap, with every position
    /// visible; later lists must have the same length.
    pub fn add_position_list(&mut self, list: Vec<u32>) -> usize {
        if self.position_lists.is_empty() {
            self.visible = BitVec::repeat(true, list.len());
            self.visible_count = list.len();
        } else {
            debug_assert_eq!(
                list.len(),
                self.visible.len(),
                "position lists must share one length"
            );
        }

        self.position_lists.push(list);
        self.position_lists.len() - 1
    }

    /// Records a column binding.
    ///
    /// The binding holds its own reference to the backing tile, so the
    /// tile lives at least as long as this logical tile.
    pub fn add_column(&mut self, tile: Arc<Tile>, tile_column: usize, position_list: usize) {
        debug_assert!(position_list < self.position_lists.len());

        self.columns.push(ColumnBinding {
            tile,
            tile_column,
            position_list,
        });
    }

    /// Returns the number of output columns.
    #[inline]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Returns the column bindings.
    #[inline]
    pub fn columns(&self) -> &[ColumnBinding] {
        &self.columns
    }

    /// Returns the number of positions (visible or not).
    #[inline]
    pub fn position_count(&self) -> usize {
        self.visible.len()
    }

    /// Returns the number of visible positions.
    #[inline]
    pub fn visible_count(&self) -> usize {
        self.visible_count
    }

    /// Returns true if no position is visible.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.visible_count == 0
    }

    /// Clears the visibility bit of a position; iteration skips it.
    pub fn remove_visibility(&mut self, position: usize) {
        if self.visible[position] {
            self.visible.set(position, false);
            self.visible_count -= 1;
        }
    }

    /// Iterates the visible position indices in ascending order.
    pub fn visible_positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.visible.iter_ones()
    }

    /// Resolves a position through a position list to a tuple slot id.
    pub fn slot_id(&self, position_list: usize, position: usize) -> Option<u32> {
        self.position_lists
            .get(position_list)
            .and_then(|list| list.get(position))
            .copied()
    }

    /// Reads the value of an output column at a position.
    pub fn value_at(&self, column: usize, position: usize) -> ExecutorResult<Value> {
        let binding = self.columns.get(column).ok_or_else(|| {
            ExecutorError::Storage(tessera_storage::StorageError::column_out_of_range(
                column,
                self.columns.len(),
            ))
        })?;

        let slot = self
            .slot_id(binding.position_list, position)
            .ok_or_else(|| ExecutorError::expression(format!("position {} out of range", position)))?;

        Ok(binding.tile.value_at(slot, binding.tile_column)?)
    }
}
