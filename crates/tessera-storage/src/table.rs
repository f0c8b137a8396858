//! Data tables: tile-group collections with the insert path.
//!
//! A table appends tile groups on demand; the tuple insert path
//! reserves a slot through the newest group's MVCC header and splits
//! the row across that group's tiles. The database id is carried
//! explicitly on the table rather than read from ambient state.

use std::sync::Arc;

use parking_lot::RwLock;
use tessera_common::config::EngineConfig;
use tessera_common::memory::Backend;
use tessera_common::types::{ItemPointer, Oid, TxnId};
use tracing::debug;

use crate::error::{StorageError, StorageResult};
use crate::schema::Schema;
use crate::tile_group::TileGroup;
use crate::value::Value;

/// A table: schema plus an append-only list of tile groups.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use tessera_common::config::EngineConfig;
/// use tessera_common::memory::HeapBackend;
/// use tessera_common::types::{Oid, TxnId};
/// use tessera_storage::schema::{Column, Schema};
/// use tessera_storage::table::DataTable;
/// use tessera_storage::value::{Value, ValueType};
///
/// let schema = Schema::new(vec![Column::new("a", ValueType::Integer)]);
/// let table = DataTable::new(
///     Oid::new(1),
///     Oid::new(2),
///     "numbers",
///     schema,
///     Arc::new(HeapBackend),
///     EngineConfig::for_testing(),
/// )
/// .unwrap();
///
/// let location = table.insert_tuple(TxnId::new(1), &[Value::Integer(42)]).unwrap();
/// assert_eq!(table.tile_group_count(), 1);
/// assert_eq!(location.offset.as_u32(), 0);
/// ```
#[derive(Debug)]
pub struct DataTable {
    database_id: Oid,
    table_id: Oid,
    name: String,

    schema: Arc<Schema>,
    backend: Arc<dyn Backend>,
    config: EngineConfig,

    tile_groups: RwLock<Vec<Arc<TileGroup>>>,
}

impl DataTable {
    /// Creates an empty table.
    pub fn new(
        database_id: Oid,
        table_id: Oid,
        name: impl Into<String>,
        schema: Schema,
        backend: Arc<dyn Backend>,
        config: EngineConfig,
    ) -> StorageResult<Self> {
        config
            .validate()
            .map_err(|reason| StorageError::InvalidConfig { reason })?;

        Ok(Self {
            database_id,
            table_id,
            name: name.into(),
            schema: Arc::new(schema),
            backend,
            config,
            tile_groups: RwLock::new(Vec::new()),
        })
    }

    /// Returns the table's schema.
    #[inline]
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Returns the table name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the database this table belongs to.
    #[inline]
    pub fn database_id(&self) -> Oid {
        self.database_id
    }

    /// Returns the table's id.
    #[inline]
    pub fn table_id(&self) -> Oid {
        self.table_id
    }

    /// Returns the number of tile groups.
    pub fn tile_group_count(&self) -> usize {
        self.tile_groups.read().len()
    }

    /// Returns the tile group at the given offset (insertion order).
    pub fn tile_group(&self, offset: usize) -> Option<Arc<TileGroup>> {
        self.tile_groups.read().get(offset).cloned()
    }

    /// Returns the tile group with the given id.
    pub fn tile_group_by_id(&self, tile_group_id: Oid) -> Option<Arc<TileGroup>> {
        self.tile_groups
            .read()
            .iter()
            .find(|tg| tg.tile_group_id() == tile_group_id)
            .cloned()
    }

    /// Appends a new tile group (single-tile layout over all columns).
    pub fn add_tile_group(&self) -> StorageResult<Arc<TileGroup>> {
        let mut groups = self.tile_groups.write();
        self.add_tile_group_locked(&mut groups)
    }

    fn add_tile_group_locked(
        &self,
        groups: &mut Vec<Arc<TileGroup>>,
    ) -> StorageResult<Arc<TileGroup>> {
        let tile_group_id = Oid::new(groups.len() as u32);
        let layout = vec![(0..self.schema.column_count()).collect::<Vec<_>>()];

        let group = Arc::new(TileGroup::new(
            Arc::clone(&self.backend),
            self.database_id,
            self.table_id,
            tile_group_id,
            &self.schema,
            &layout,
            &self.config,
        )?);

        groups.push(Arc::clone(&group));
        debug!(table = %self.name, %tile_group_id, "added tile group");

        Ok(group)
    }

    /// Grows the table by one tile group unless another writer already
    /// did; returns the newest group either way.
    fn grow(&self, seen_count: usize) -> StorageResult<Arc<TileGroup>> {
        let mut groups = self.tile_groups.write();
        if groups.len() > seen_count {
            return Ok(Arc::clone(groups.last().expect("len > seen_count >= 0")));
        }
        self.add_tile_group_locked(&mut groups)
    }

    /// Inserts a row on behalf of `txn_id`.
    ///
    /// Reserves a slot in the newest tile group (appending a group when
    /// the newest is full) and writes the row's values. The inserted
    /// tuple stays in-flight until the caller commits it through the
    /// group header.
    pub fn insert_tuple(&self, txn_id: TxnId, values: &[Value]) -> StorageResult<ItemPointer> {
        loop {
            let newest = {
                let groups = self.tile_groups.read();
                (groups.len(), groups.last().cloned())
            };

            let (seen_count, group) = match newest {
                (count, Some(group)) => (count, group),
                (count, None) => (count + 1, self.grow(count)?),
            };

            if let Some(slot) = group.header().reserve_slot(txn_id) {
                group.insert_tuple(slot, values)?;
                return Ok(ItemPointer::new(group.tile_group_id(), Oid::new(slot)));
            }

            // Newest group is full; grow and retry.
            self.grow(seen_count)?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Column;
    use crate::value::ValueType;
    use tessera_common::memory::HeapBackend;

    fn sample_table() -> DataTable {
        let schema = Schema::new(vec![
            Column::new("id", ValueType::Integer),
            Column::nullable("name", ValueType::Varchar),
        ]);
        DataTable::new(
            Oid::new(1),
            Oid::new(10),
            "people",
            schema,
            Arc::new(HeapBackend),
            EngineConfig::for_testing(),
        )
        .expect("table construction failed")
    }

    fn row(id: i32, name: &str) -> Vec<Value> {
        vec![Value::Integer(id), Value::Varchar(name.into())]
    }

    #[test]
    fn test_empty_table() {
        let table = sample_table();
        assert_eq!(table.tile_group_count(), 0);
        assert!(table.tile_group(0).is_none());
    }

    #[test]
    fn test_insert_creates_group() {
        let table = sample_table();
        let ptr = table
            .insert_tuple(TxnId::new(1), &row(1, "ada"))
            .unwrap();

        assert_eq!(table.tile_group_count(), 1);
        assert_eq!(ptr.block, Oid::new(0));
        assert_eq!(ptr.offset, Oid::new(0));

        let group = table.tile_group(0).unwrap();
        assert_eq!(group.value_at(0, 0).unwrap(), Value::Integer(1));
        assert_eq!(group.value_at(0, 1).unwrap(), Value::Varchar("ada".into()));
    }

    #[test]
    fn test_insert_spills_into_new_group() {
        let table = sample_table();
        let capacity = EngineConfig::for_testing().tuples_per_tilegroup;

        for i in 0..capacity + 2 {
            table
                .insert_tuple(TxnId::new(1), &row(i as i32, "x"))
                .unwrap();
        }

        assert_eq!(table.tile_group_count(), 2);
        assert_eq!(table.tile_group(0).unwrap().next_tuple_slot(), capacity);
        assert_eq!(table.tile_group(1).unwrap().next_tuple_slot(), 2);
    }

    #[test]
    fn test_tile_group_by_id() {
        let table = sample_table();
        table.insert_tuple(TxnId::new(1), &row(1, "a")).unwrap();

        assert!(table.tile_group_by_id(Oid::new(0)).is_some());
        assert!(table.tile_group_by_id(Oid::new(9)).is_none());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let schema = Schema::new(vec![Column::new("a", ValueType::Integer)]);
        let config = EngineConfig {
            tuples_per_tilegroup: 0,
            ..EngineConfig::default()
        };

        let result = DataTable::new(
            Oid::new(1),
            Oid::new(2),
            "bad",
            schema,
            Arc::new(HeapBackend),
            config,
        );
        assert!(matches!(result, Err(StorageError::InvalidConfig { .. })));
    }

    #[test]
    fn test_concurrent_inserts() {
        use std::thread;

        let table = Arc::new(sample_table());
        let mut handles = vec![];

        for t in 0..4u64 {
            let table = Arc::clone(&table);
            handles.push(thread::spawn(move || {
                for i in 0..10 {
                    table
                        .insert_tuple(TxnId::new(t + 1), &row(i, "w"))
                        .unwrap();
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        let total: u32 = (0..table.tile_group_count())
            .map(|i| table.tile_group(i).unwrap().next_tuple_slot())
            .sum();
        assert_eq!(total, 40);
    }
}
