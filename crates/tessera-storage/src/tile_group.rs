//! Tile groups: horizontal partitions of a table's slot space.
//!
//! A tile group vertically partitions its columns across one or more
//! tiles; the *k*-th tuple of the group is the *k*-th slot of every
//! tile. One MVCC header covers the whole group, and a column routing
//! table built at construction maps schema-global column ids to
//! `(tile index, tile-local column id)`.

use std::sync::Arc;

use tessera_common::config::EngineConfig;
use tessera_common::memory::Backend;
use tessera_common::types::Oid;
use tracing::trace;

use crate::error::{StorageError, StorageResult};
use crate::schema::Schema;
use crate::tile::Tile;
use crate::tile_group_header::TileGroupHeader;
use crate::value::Value;

/// A set of tiles sharing one slot space and one MVCC header.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use tessera_common::config::EngineConfig;
/// use tessera_common::memory::HeapBackend;
/// use tessera_common::types::Oid;
/// use tessera_storage::schema::{Column, Schema};
/// use tessera_storage::tile_group::TileGroup;
/// use tessera_storage::value::ValueType;
///
/// let schema = Schema::new(vec![
///     Column::new("id", ValueType::Integer),
///     Column::new("score", ValueType::Double),
/// ]);
/// let group = TileGroup::new(
///     Arc::new(HeapBackend),
///     Oid::new(1),
///     Oid::new(2),
///     Oid::new(0),
///     &schema,
///     &[vec![0], vec![1]],
///     &EngineConfig::for_testing(),
/// )
/// .unwrap();
///
/// assert_eq!(group.tile_count(), 2);
/// assert_eq!(group.locate(1), Some((1, 0)));
/// ```
#[derive(Debug)]
pub struct TileGroup {
    database_id: Oid,
    table_id: Oid,
    tile_group_id: Oid,

    header: Arc<TileGroupHeader>,
    tiles: Vec<Arc<Tile>>,

    /// Schema-global column id -> (tile index, tile-local column id).
    column_map: Vec<(usize, usize)>,
}

impl TileGroup {
    /// Creates a tile group for `schema`, vertically partitioned per
    /// `layout`.
    ///
    /// Each entry of `layout` lists the schema-global column indices of
    /// one tile; every column must appear in exactly one tile. Slot
    /// capacity and pool sizing come from `config`.
    pub fn new(
        backend: Arc<dyn Backend>,
        database_id: Oid,
        table_id: Oid,
        tile_group_id: Oid,
        schema: &Schema,
        layout: &[Vec<usize>],
        config: &EngineConfig,
    ) -> StorageResult<Self> {
        let column_count = schema.column_count();

        // Routing table: walk the layout once.
        let mut column_map = vec![(usize::MAX, usize::MAX); column_count];
        for (tile_index, tile_columns) in layout.iter().enumerate() {
            for (local, &global) in tile_columns.iter().enumerate() {
                if global >= column_count {
                    return Err(StorageError::column_out_of_range(global, column_count));
                }
                column_map[global] = (tile_index, local);
            }
        }
        debug_assert!(
            column_map.iter().all(|&(t, _)| t != usize::MAX),
            "partition layout must cover every column"
        );

        let capacity = config.tuples_per_tilegroup;
        let header = Arc::new(TileGroupHeader::new(capacity));

        let mut tiles = Vec::with_capacity(layout.len());
        for (tile_index, tile_schema) in schema.partition(layout).into_iter().enumerate() {
            let mut tile = Tile::new(
                Arc::clone(&backend),
                Arc::new(tile_schema),
                Some(Arc::clone(&header)),
                capacity,
                config.pool_chunk_size,
            )?;
            tile.set_location(
                database_id,
                table_id,
                tile_group_id,
                Oid::new(tile_index as u32),
            );
            tiles.push(Arc::new(tile));
        }

        trace!(
            %tile_group_id,
            tiles = tiles.len(),
            capacity,
            "created tile group"
        );

        Ok(Self {
            database_id,
            table_id,
            tile_group_id,
            header,
            tiles,
            column_map,
        })
    }

    /// Returns the group's id.
    #[inline]
    pub fn tile_group_id(&self) -> Oid {
        self.tile_group_id
    }

    /// Returns the database this group belongs to.
    #[inline]
    pub fn database_id(&self) -> Oid {
        self.database_id
    }

    /// Returns the table this group belongs to.
    #[inline]
    pub fn table_id(&self) -> Oid {
        self.table_id
    }

    /// Returns the group's MVCC header.
    #[inline]
    pub fn header(&self) -> &Arc<TileGroupHeader> {
        &self.header
    }

    /// Returns the number of tiles.
    #[inline]
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Returns the *i*-th tile.
    #[inline]
    pub fn tile(&self, index: usize) -> Option<&Arc<Tile>> {
        self.tiles.get(index)
    }

    /// Returns the group's slot capacity.
    #[inline]
    pub fn capacity(&self) -> u32 {
        self.header.capacity()
    }

    /// Returns the exclusive upper bound of allocated slot ids.
    ///
    /// Includes aborted slots; visibility, not allocation, determines
    /// tuple liveness.
    #[inline]
    pub fn next_tuple_slot(&self) -> u32 {
        self.header.next_tuple_slot()
    }

    /// Routes a schema-global column id to
    /// `(tile index, tile-local column id)`.
    pub fn locate(&self, column_id: usize) -> Option<(usize, usize)> {
        self.column_map.get(column_id).copied()
    }

    /// Writes a full-schema row into the given slot, splitting it
    /// across the vertical partitions.
    ///
    /// The slot must have been reserved through the header; no MVCC
    /// checks happen here.
    pub fn insert_tuple(&self, slot: u32, values: &[Value]) -> StorageResult<()> {
        if values.len() != self.column_map.len() {
            return Err(StorageError::column_out_of_range(
                values.len(),
                self.column_map.len(),
            ));
        }

        for (global, value) in values.iter().enumerate() {
            let (tile_index, local) = self.column_map[global];
            self.tiles[tile_index].set_value(slot, local, value)?;
        }

        Ok(())
    }

    /// Reads one schema-global column of one slot.
    pub fn value_at(&self, slot: u32, column_id: usize) -> StorageResult<Value> {
        let (tile_index, local) = self
            .locate(column_id)
            .ok_or_else(|| StorageError::column_out_of_range(column_id, self.column_map.len()))?;
        self.tiles[tile_index].value_at(slot, local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Column;
    use crate::value::ValueType;
    use tessera_common::memory::HeapBackend;
    use tessera_common::types::TxnId;

    fn sample_schema() -> Schema {
        Schema::new(vec![
            Column::new("id", ValueType::Integer),
            Column::nullable("name", ValueType::Varchar),
            Column::new("score", ValueType::Double),
        ])
    }

    fn sample_group(layout: &[Vec<usize>]) -> TileGroup {
        TileGroup::new(
            Arc::new(HeapBackend),
            Oid::new(1),
            Oid::new(2),
            Oid::new(0),
            &sample_schema(),
            layout,
            &EngineConfig::for_testing(),
        )
        .expect("tile group construction failed")
    }

    #[test]
    fn test_single_tile_layout() {
        let group = sample_group(&[vec![0, 1, 2]]);

        assert_eq!(group.tile_count(), 1);
        assert_eq!(group.locate(0), Some((0, 0)));
        assert_eq!(group.locate(2), Some((0, 2)));
        assert_eq!(group.locate(3), None);
    }

    #[test]
    fn test_vertical_partitioning() {
        let group = sample_group(&[vec![0, 2], vec![1]]);

        assert_eq!(group.tile_count(), 2);
        assert_eq!(group.locate(0), Some((0, 0)));
        assert_eq!(group.locate(2), Some((0, 1)));
        assert_eq!(group.locate(1), Some((1, 0)));

        // Per-tile schemas follow the partition.
        assert_eq!(group.tile(0).unwrap().schema().column_count(), 2);
        assert_eq!(group.tile(1).unwrap().schema().column_count(), 1);
    }

    #[test]
    fn test_insert_and_read_across_tiles() {
        let group = sample_group(&[vec![0, 2], vec![1]]);

        let slot = group.header().reserve_slot(TxnId::new(1)).unwrap();
        group
            .insert_tuple(
                slot,
                &[
                    Value::Integer(7),
                    Value::Varchar("seven".into()),
                    Value::Double(0.5),
                ],
            )
            .unwrap();

        assert_eq!(group.value_at(slot, 0).unwrap(), Value::Integer(7));
        assert_eq!(
            group.value_at(slot, 1).unwrap(),
            Value::Varchar("seven".into())
        );
        assert_eq!(group.value_at(slot, 2).unwrap(), Value::Double(0.5));
    }

    #[test]
    fn test_tiles_share_slot_space() {
        let group = sample_group(&[vec![0], vec![1], vec![2]]);
        let capacity = group.capacity();

        for tile_index in 0..3 {
            assert_eq!(group.tile(tile_index).unwrap().tuple_count(), capacity);
        }
        assert_eq!(group.next_tuple_slot(), 0);
    }

    #[test]
    fn test_bad_layout_column() {
        let result = TileGroup::new(
            Arc::new(HeapBackend),
            Oid::new(1),
            Oid::new(2),
            Oid::new(0),
            &sample_schema(),
            &[vec![0, 1, 7]],
            &EngineConfig::for_testing(),
        );
        assert!(matches!(
            result,
            Err(StorageError::ColumnOutOfRange { column: 7, .. })
        ));
    }

    #[test]
    fn test_wrong_value_count() {
        let group = sample_group(&[vec![0, 1, 2]]);
        let slot = group.header().reserve_slot(TxnId::new(1)).unwrap();

        assert!(group.insert_tuple(slot, &[Value::Integer(1)]).is_err());
    }
}
