//! The physical tile: a fixed-capacity, row-major slab of tuples.
//!
//! A tile owns a backend-allocated byte buffer holding `tuple_count`
//! slots of one schema; slot `k` lives at byte offset
//! `k * tuple_length`. Tiles whose schema is not fully inlined also own
//! a variable-length [`Pool`] with the same lifetime.
//!
//! # Wire Format
//!
//! All multi-byte integers are big-endian; strings are
//! `(i32 length, bytes)`:
//!
//! ```text
//! [i32 total_size]            non-inclusive of itself
//! [i32 header_size]           non-inclusive of itself
//! [i8  status = -128]
//! [i16 column_count]
//! [i8  column_type]  x column_count
//! [i32 name_length, bytes] x column_count
//! [i32 tuple_count]
//! [tuple_bytes]      x tuple_count
//! ```
//!
//! The serialized column header is identical for every call against a
//! given tile; it is built once and cached.

use std::fmt;
use std::sync::{Arc, OnceLock};

use bytes::{Buf, BufMut, Bytes, BytesMut};
use tessera_common::constants::TILE_SERIALIZATION_STATUS;
use tessera_common::memory::{Backend, Pool, RawBuffer};
use tessera_common::types::Oid;
use tracing::trace;

use crate::error::{StorageError, StorageResult};
use crate::schema::Schema;
use crate::tile_group_header::TileGroupHeader;
use crate::tuple::{Tuple, TupleRef};
use crate::value::Value;
use crate::wire;

/// A fixed-capacity, row-major slab of tuples sharing one schema.
///
/// Concurrency contract: distinct slots may be read and written
/// concurrently; accessors of the same slot must be externally ordered.
/// Within a scan, slots below the group header's allocation cursor are
/// stable.
pub struct Tile {
    backend: Arc<dyn Backend>,
    data: RawBuffer,
    pool: Option<Pool>,
    schema: Arc<Schema>,

    tuple_length: usize,
    num_tuple_slots: u32,
    tile_size: usize,

    database_id: Oid,
    table_id: Oid,
    tile_group_id: Oid,
    tile_id: Oid,

    /// Write-once cache of the serialized column header.
    column_header: OnceLock<Bytes>,

    /// Back reference to the owning group's MVCC header, for
    /// active-tuple reporting. `None` for tiles not bound to a group.
    group_header: Option<Arc<TileGroupHeader>>,
}

impl Tile {
    /// Creates a tile with `tuple_count` zeroed slots.
    ///
    /// Acquires `tuple_count * schema.tuple_length()` bytes from the
    /// backend and, if the schema is not fully inlined, a pool bound to
    /// the same backend.
    pub fn new(
        backend: Arc<dyn Backend>,
        schema: Arc<Schema>,
        group_header: Option<Arc<TileGroupHeader>>,
        tuple_count: u32,
        pool_chunk_size: usize,
    ) -> StorageResult<Self> {
        debug_assert!(tuple_count > 0, "tiles hold at least one slot");
        debug_assert!(schema.tuple_length() > 0, "schema must have columns");

        let tuple_length = schema.tuple_length();
        let tile_size = tuple_count as usize * tuple_length;

        let data = backend
            .allocate(tile_size)
            .ok_or(StorageError::allocation_failed(backend.name(), tile_size))?;

        let pool = (!schema.is_inlined())
            .then(|| Pool::with_chunk_size(Arc::clone(&backend), pool_chunk_size));

        Ok(Self {
            backend,
            data,
            pool,
            schema,
            tuple_length,
            num_tuple_slots: tuple_count,
            tile_size,
            database_id: Oid::INVALID,
            table_id: Oid::INVALID,
            tile_group_id: Oid::INVALID,
            tile_id: Oid::INVALID,
            column_header: OnceLock::new(),
            group_header,
        })
    }

    /// Records the tile's catalog location.
    pub fn set_location(
        &mut self,
        database_id: Oid,
        table_id: Oid,
        tile_group_id: Oid,
        tile_id: Oid,
    ) {
        self.database_id = database_id;
        self.table_id = table_id;
        self.tile_group_id = tile_group_id;
        self.tile_id = tile_id;
    }

    /// Returns the tile's schema.
    #[inline]
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Returns the number of tuple slots.
    #[inline]
    pub fn tuple_count(&self) -> u32 {
        self.num_tuple_slots
    }

    /// Returns the byte length of one tuple slot.
    #[inline]
    pub fn tuple_length(&self) -> usize {
        self.tuple_length
    }

    /// Returns the total slab size in bytes.
    #[inline]
    pub fn tile_size(&self) -> usize {
        self.tile_size
    }

    /// Returns the database this tile belongs to.
    #[inline]
    pub fn database_id(&self) -> Oid {
        self.database_id
    }

    /// Returns the tile's variable-length pool, if any.
    #[inline]
    pub fn pool(&self) -> Option<&Pool> {
        self.pool.as_ref()
    }

    fn check_slot(&self, slot: u32) -> StorageResult<()> {
        if slot < self.num_tuple_slots {
            Ok(())
        } else {
            Err(StorageError::slot_out_of_range(slot, self.num_tuple_slots))
        }
    }

    /// Returns a raw pointer to the start of a slot.
    ///
    /// Slot `k` lives at `data + k * tuple_length`.
    pub fn tuple_location(&self, slot: u32) -> StorageResult<*const u8> {
        self.check_slot(slot)?;
        // SAFETY: the offset is inside the slab by the check above.
        Ok(unsafe { self.data.as_ptr().add(slot as usize * self.tuple_length) })
    }

    /// Copies a tuple's bytes into the given slot.
    ///
    /// No MVCC checks happen here; slot reservation and visibility live
    /// in the group header.
    pub fn insert_tuple(&self, slot: u32, tuple: &Tuple) -> StorageResult<()> {
        self.check_slot(slot)?;
        debug_assert_eq!(
            tuple.schema().as_ref(),
            self.schema.as_ref(),
            "tuple schema must match the tile schema"
        );

        // SAFETY: the destination range is one in-bounds slot, and the
        // concurrency contract gives the writer exclusive slot access.
        unsafe {
            std::ptr::copy_nonoverlapping(
                tuple.bytes().as_ptr(),
                self.data.as_mut_ptr().add(slot as usize * self.tuple_length),
                self.tuple_length,
            );
        }

        Ok(())
    }

    /// Writes one column value of one slot.
    ///
    /// Uninlined values are copied into the tile's pool.
    pub fn set_value(&self, slot: u32, column: usize, value: &Value) -> StorageResult<()> {
        self.check_slot(slot)?;
        let col = self
            .schema
            .column(column)
            .ok_or_else(|| StorageError::column_out_of_range(column, self.schema.column_count()))?;

        // SAFETY: one in-bounds slot; exclusive access per the
        // concurrency contract.
        let data = unsafe {
            std::slice::from_raw_parts_mut(
                self.data.as_mut_ptr().add(slot as usize * self.tuple_length),
                self.tuple_length,
            )
        };

        value.write_to_tuple(data, col, self.pool.as_ref())
    }

    /// Returns a borrowed window over the given slot.
    pub fn tuple_ref(&self, slot: u32) -> StorageResult<TupleRef<'_>> {
        self.check_slot(slot)?;

        // SAFETY: one in-bounds slot; readers of stable slots do not
        // overlap writers per the concurrency contract.
        let data = unsafe {
            std::slice::from_raw_parts(
                self.data.as_ptr().add(slot as usize * self.tuple_length),
                self.tuple_length,
            )
        };

        Ok(TupleRef::new(&self.schema, data, self.pool.as_ref()))
    }

    /// Returns a fresh owning copy of the tuple at the given slot.
    ///
    /// The copy's uninlined values keep resolving through this tile's
    /// pool.
    pub fn get_tuple(&self, slot: u32) -> StorageResult<Tuple> {
        let window = self.tuple_ref(slot)?;
        Ok(Tuple::from_bytes(Arc::clone(&self.schema), window.bytes()))
    }

    /// Reads one column value of one slot.
    pub fn value_at(&self, slot: u32, column: usize) -> StorageResult<Value> {
        self.tuple_ref(slot)?.value(column)
    }

    /// Finds the index of the column with the given name.
    ///
    /// Linear search; returns `None` on a miss.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.schema.column_index(name)
    }

    /// Returns a restartable iterator over all slots, yielding windows.
    pub fn iter(&self) -> TileIterator<'_> {
        TileIterator {
            tile: self,
            slot: 0,
        }
    }

    /// Builds the serialized column header (without the cache).
    fn build_column_header(&self) -> Bytes {
        let mut body = BytesMut::new();

        body.put_i8(TILE_SERIALIZATION_STATUS);
        body.put_i16(self.schema.column_count() as i16);

        for column in self.schema.columns() {
            body.put_u8(column.value_type().as_u8());
        }

        for column in self.schema.columns() {
            body.put_i32(column.name().len() as i32);
            body.put_slice(column.name().as_bytes());
        }

        // Prepend the non-inclusive header size.
        let mut header = BytesMut::with_capacity(4 + body.len());
        header.put_i32(body.len() as i32);
        header.put_slice(&body);
        header.freeze()
    }

    /// Appends the serialized column header, building it on first use.
    fn serialize_header_to(&self, out: &mut BytesMut) {
        let header = self
            .column_header
            .get_or_init(|| self.build_column_header());
        out.put_slice(header);
    }

    /// Serializes the tile, writing at most `num_tuples` tuples in
    /// iteration order.
    pub fn serialize_to(&self, out: &mut BytesMut, num_tuples: u32) -> StorageResult<()> {
        debug_assert!(num_tuples <= self.num_tuple_slots);

        // Placeholder for the non-inclusive total size.
        let pos = out.len();
        out.put_i32(-1);

        self.serialize_header_to(out);

        out.put_i32(num_tuples as i32);

        let mut written = 0u32;
        for window in self.iter().take(num_tuples as usize) {
            window.serialize_into(out)?;
            written += 1;
        }
        debug_assert_eq!(written, num_tuples);

        let total = (out.len() - pos - 4) as i32;
        out[pos..pos + 4].copy_from_slice(&total.to_be_bytes());

        Ok(())
    }

    /// Serializes an externally-supplied selection of tuples, with the
    /// same header.
    pub fn serialize_tuples_to(&self, out: &mut BytesMut, tuples: &[Tuple]) -> StorageResult<()> {
        let pos = out.len();
        out.put_i32(-1);

        self.serialize_header_to(out);

        out.put_i32(tuples.len() as i32);
        for tuple in tuples {
            tuple.serialize_into(out, self.pool.as_ref())?;
        }

        let total = (out.len() - pos - 4) as i32;
        out[pos..pos + 4].copy_from_slice(&total.to_be_bytes());

        Ok(())
    }

    /// Loads serialized tuples into consecutive slots, validating the
    /// incoming column header against this tile's schema.
    ///
    /// The column types and names are read but not re-validated; only
    /// the column count gates the load.
    pub fn deserialize_tuples_from(&self, input: &mut impl Buf) -> StorageResult<u32> {
        wire::read_i32(input)?; // total size
        wire::read_i32(input)?; // header size
        wire::read_i8(input)?; // status

        let column_count = wire::read_i16(input)?;
        if column_count < 0 {
            return Err(StorageError::InvalidLength {
                length: column_count as i32,
            });
        }
        let column_count = column_count as usize;

        let mut received_types = Vec::with_capacity(column_count);
        for _ in 0..column_count {
            received_types.push(wire::read_u8(input)?);
        }

        let mut received_names = Vec::with_capacity(column_count);
        for _ in 0..column_count {
            received_names.push(wire::read_string(input)?);
        }

        if column_count != self.schema.column_count() {
            return Err(StorageError::ColumnCountMismatch {
                expected: self.schema.column_count(),
                received: column_count,
                expected_names: self
                    .schema
                    .columns()
                    .iter()
                    .map(|c| c.name().to_string())
                    .collect(),
                received_names,
            });
        }

        self.deserialize_tuples_from_without_header(input)
    }

    /// Loads serialized tuples into consecutive slots, assuming the
    /// schema is already known (recovery path; no header present).
    pub fn deserialize_tuples_from_without_header(
        &self,
        input: &mut impl Buf,
    ) -> StorageResult<u32> {
        let tuple_count = wire::read_i32(input)?;
        if tuple_count < 0 {
            return Err(StorageError::InvalidLength { length: tuple_count });
        }
        let tuple_count = tuple_count as u32;

        if tuple_count > self.num_tuple_slots {
            return Err(StorageError::TupleCountExceedsCapacity {
                count: tuple_count,
                capacity: self.num_tuple_slots,
            });
        }

        for slot in 0..tuple_count {
            let tuple =
                Tuple::deserialize_from(Arc::clone(&self.schema), input, self.pool.as_ref())?;
            self.insert_tuple(slot, &tuple)?;
        }

        trace!(tuple_count, tile_id = %self.tile_id, "loaded serialized tuples");

        Ok(tuple_count)
    }
}

impl Drop for Tile {
    fn drop(&mut self) {
        // The pool (if any) frees its chunks through the same backend
        // when it drops; the slab goes back here.
        self.backend.free(self.data);
    }
}

impl PartialEq for Tile {
    /// Tile equality: column count, database id, schema, and the full
    /// tuple sequence in iteration order. Expensive.
    fn eq(&self, other: &Self) -> bool {
        if self.schema.column_count() != other.schema.column_count() {
            return false;
        }

        if self.database_id != other.database_id {
            return false;
        }

        if self.schema.as_ref() != other.schema.as_ref() {
            return false;
        }

        let mut other_iter = other.iter();
        for window in self.iter() {
            let Some(other_window) = other_iter.next() else {
                return false;
            };
            match window.values_equal(&other_window) {
                Ok(true) => {}
                _ => return false,
            }
        }

        true
    }
}

impl fmt::Debug for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tile")
            .field("tile_id", &self.tile_id)
            .field("tile_group_id", &self.tile_group_id)
            .field("tuple_count", &self.num_tuple_slots)
            .field("tuple_length", &self.tuple_length)
            .finish()
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\tTILE")?;
        writeln!(
            f,
            "\tCatalog :: Backend: {} DB: {} Table: {} Tile Group: {} Tile: {}",
            self.backend.name(),
            self.database_id,
            self.table_id,
            self.tile_group_id,
            self.tile_id
        )?;

        match &self.group_header {
            Some(header) => writeln!(
                f,
                "\tActive Tuples: {} out of {} slots",
                header.active_tuple_count(),
                self.num_tuple_slots
            )?,
            None => writeln!(f, "\tActive Tuples: {} slots", self.num_tuple_slots)?,
        }

        writeln!(f, "\tDATA")?;
        for window in self.iter() {
            writeln!(f, "\t{}", window)?;
        }

        Ok(())
    }
}

/// A restartable iterator over a tile's slots, yielding windows.
pub struct TileIterator<'a> {
    tile: &'a Tile,
    slot: u32,
}

impl<'a> Iterator for TileIterator<'a> {
    type Item = TupleRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.slot >= self.tile.num_tuple_slots {
            return None;
        }

        let window = self.tile.tuple_ref(self.slot).ok()?;
        self.slot += 1;
        Some(window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Column;
    use crate::value::ValueType;
    use tessera_common::constants::DEFAULT_POOL_CHUNK_SIZE;
    use tessera_common::memory::HeapBackend;

    fn int_schema() -> Arc<Schema> {
        Arc::new(Schema::new(vec![
            Column::new("a", ValueType::Integer),
            Column::nullable("b", ValueType::BigInt),
        ]))
    }

    fn varchar_schema() -> Arc<Schema> {
        Arc::new(Schema::new(vec![
            Column::new("id", ValueType::Integer),
            Column::nullable("name", ValueType::Varchar),
        ]))
    }

    fn new_tile(schema: Arc<Schema>, slots: u32) -> Tile {
        Tile::new(
            Arc::new(HeapBackend),
            schema,
            None,
            slots,
            DEFAULT_POOL_CHUNK_SIZE,
        )
        .expect("tile allocation failed")
    }

    fn fill_tile(tile: &Tile, rows: &[(i32, i64)]) {
        for (slot, (a, b)) in rows.iter().enumerate() {
            tile.set_value(slot as u32, 0, &Value::Integer(*a)).unwrap();
            tile.set_value(slot as u32, 1, &Value::BigInt(*b)).unwrap();
        }
    }

    #[test]
    fn test_construction() {
        let tile = new_tile(int_schema(), 8);
        assert_eq!(tile.tuple_count(), 8);
        assert_eq!(tile.tuple_length(), 12);
        assert_eq!(tile.tile_size(), 96);
        assert!(tile.pool().is_none());

        let tile = new_tile(varchar_schema(), 8);
        assert!(tile.pool().is_some());
    }

    #[test]
    fn test_slot_addressing() {
        let tile = new_tile(int_schema(), 4);
        let base = tile.tuple_location(0).unwrap();

        for slot in 0..4u32 {
            let location = tile.tuple_location(slot).unwrap();
            let expected = unsafe { base.add(slot as usize * tile.tuple_length()) };
            assert_eq!(location, expected);
        }

        assert!(tile.tuple_location(4).is_err());
    }

    #[test]
    fn test_insert_and_get() {
        let schema = int_schema();
        let tile = new_tile(schema.clone(), 4);

        let tuple =
            Tuple::from_values(schema, &[Value::Integer(10), Value::BigInt(20)], None).unwrap();
        tile.insert_tuple(2, &tuple).unwrap();

        let copy = tile.get_tuple(2).unwrap();
        assert_eq!(copy.value(0, None).unwrap(), Value::Integer(10));
        assert_eq!(copy.value(1, None).unwrap(), Value::BigInt(20));

        // Untouched slots read as zeroed rows.
        assert_eq!(tile.value_at(0, 0).unwrap(), Value::Integer(0));
    }

    #[test]
    fn test_insert_out_of_range() {
        let schema = int_schema();
        let tile = new_tile(schema.clone(), 2);
        let tuple = Tuple::new(schema);

        assert!(matches!(
            tile.insert_tuple(2, &tuple),
            Err(StorageError::SlotOutOfRange { slot: 2, capacity: 2 })
        ));
    }

    #[test]
    fn test_set_value_with_pool() {
        let tile = new_tile(varchar_schema(), 2);

        tile.set_value(0, 0, &Value::Integer(1)).unwrap();
        tile.set_value(0, 1, &Value::Varchar("alpha".into())).unwrap();
        tile.set_value(1, 0, &Value::Integer(2)).unwrap();
        tile.set_value(1, 1, &Value::Null).unwrap();

        assert_eq!(tile.value_at(0, 1).unwrap(), Value::Varchar("alpha".into()));
        assert!(tile.value_at(1, 1).unwrap().is_null());
    }

    #[test]
    fn test_iterator() {
        let tile = new_tile(int_schema(), 3);
        fill_tile(&tile, &[(1, 10), (2, 20), (3, 30)]);

        let values: Vec<Value> = tile.iter().map(|w| w.value(0).unwrap()).collect();
        assert_eq!(
            values,
            vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)]
        );

        // Restartable: a second pass yields the same sequence.
        assert_eq!(tile.iter().count(), 3);
    }

    #[test]
    fn test_column_index() {
        let tile = new_tile(int_schema(), 1);
        assert_eq!(tile.column_index("b"), Some(1));
        assert_eq!(tile.column_index("missing"), None);
    }

    #[test]
    fn test_equality() {
        let schema = int_schema();
        let a = new_tile(schema.clone(), 3);
        let b = new_tile(schema.clone(), 3);
        fill_tile(&a, &[(1, 10), (2, 20), (3, 30)]);
        fill_tile(&b, &[(1, 10), (2, 20), (3, 30)]);

        assert!(a == b);

        b.set_value(1, 0, &Value::Integer(99)).unwrap();
        assert!(a != b);
    }

    #[test]
    fn test_serialize_roundtrip() {
        let schema = int_schema();
        let tile = new_tile(schema.clone(), 4);
        fill_tile(&tile, &[(10, 1), (20, 2), (30, 3), (40, 4)]);

        let mut out = BytesMut::new();
        tile.serialize_to(&mut out, 4).unwrap();

        // Non-inclusive total size prefix.
        let total = i32::from_be_bytes(out[0..4].try_into().unwrap());
        assert_eq!(total as usize, out.len() - 4);

        let fresh = new_tile(schema, 4);
        let mut input = out.freeze();
        let loaded = fresh.deserialize_tuples_from(&mut input).unwrap();

        assert_eq!(loaded, 4);
        assert!(tile == fresh);
    }

    #[test]
    fn test_serialize_prefix_roundtrip() {
        let schema = int_schema();
        let tile = new_tile(schema.clone(), 4);
        fill_tile(&tile, &[(10, 1), (20, 2), (30, 3), (40, 4)]);

        // A prefix of n tuples loads back as the first n slots.
        let mut out = BytesMut::new();
        tile.serialize_to(&mut out, 2).unwrap();

        let fresh = new_tile(schema, 4);
        let mut input = out.freeze();
        assert_eq!(fresh.deserialize_tuples_from(&mut input).unwrap(), 2);

        for slot in 0..2u32 {
            assert_eq!(
                tile.value_at(slot, 0).unwrap(),
                fresh.value_at(slot, 0).unwrap()
            );
        }
    }

    #[test]
    fn test_serialize_varchar_roundtrip() {
        let schema = varchar_schema();
        let tile = new_tile(schema.clone(), 2);
        tile.set_value(0, 0, &Value::Integer(1)).unwrap();
        tile.set_value(0, 1, &Value::Varchar("alpha".into())).unwrap();
        tile.set_value(1, 0, &Value::Integer(2)).unwrap();
        tile.set_value(1, 1, &Value::Null).unwrap();

        let mut out = BytesMut::new();
        tile.serialize_to(&mut out, 2).unwrap();

        let fresh = new_tile(schema, 2);
        let mut input = out.freeze();
        fresh.deserialize_tuples_from(&mut input).unwrap();

        assert_eq!(fresh.value_at(0, 1).unwrap(), Value::Varchar("alpha".into()));
        assert!(fresh.value_at(1, 1).unwrap().is_null());
        assert!(tile == fresh);
    }

    #[test]
    fn test_header_cache_stability() {
        let tile = new_tile(int_schema(), 4);
        fill_tile(&tile, &[(1, 1), (2, 2), (3, 3), (4, 4)]);

        let mut first = BytesMut::new();
        tile.serialize_to(&mut first, 4).unwrap();
        let mut second = BytesMut::new();
        tile.serialize_to(&mut second, 4).unwrap();

        assert_eq!(&first[..], &second[..]);
    }

    #[test]
    fn test_serialize_tuples_to() {
        let schema = int_schema();
        let tile = new_tile(schema.clone(), 4);
        fill_tile(&tile, &[(10, 1), (20, 2), (30, 3), (40, 4)]);

        // Serialize a selection (slots 1 and 3).
        let selection = vec![tile.get_tuple(1).unwrap(), tile.get_tuple(3).unwrap()];
        let mut out = BytesMut::new();
        tile.serialize_tuples_to(&mut out, &selection).unwrap();

        let fresh = new_tile(schema, 4);
        let mut input = out.freeze();
        assert_eq!(fresh.deserialize_tuples_from(&mut input).unwrap(), 2);
        assert_eq!(fresh.value_at(0, 0).unwrap(), Value::Integer(20));
        assert_eq!(fresh.value_at(1, 0).unwrap(), Value::Integer(40));
    }

    #[test]
    fn test_column_count_mismatch() {
        let tile = new_tile(int_schema(), 2);
        fill_tile(&tile, &[(1, 1), (2, 2)]);

        let mut out = BytesMut::new();
        tile.serialize_to(&mut out, 2).unwrap();

        let narrow = Arc::new(Schema::new(vec![Column::new("a", ValueType::Integer)]));
        let fresh = new_tile(narrow, 2);
        let mut input = out.freeze();

        let err = fresh.deserialize_tuples_from(&mut input);
        match err {
            Err(StorageError::ColumnCountMismatch {
                expected,
                received,
                expected_names,
                received_names,
            }) => {
                assert_eq!(expected, 1);
                assert_eq!(received, 2);
                assert_eq!(expected_names, vec!["a"]);
                assert_eq!(received_names, vec!["a", "b"]);
            }
            other => panic!("expected ColumnCountMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_deserialize_too_many_tuples() {
        let schema = int_schema();
        let big = new_tile(schema.clone(), 4);
        fill_tile(&big, &[(1, 1), (2, 2), (3, 3), (4, 4)]);

        let mut out = BytesMut::new();
        big.serialize_to(&mut out, 4).unwrap();

        let small = new_tile(schema, 2);
        let mut input = out.freeze();
        assert!(matches!(
            small.deserialize_tuples_from(&mut input),
            Err(StorageError::TupleCountExceedsCapacity { count: 4, capacity: 2 })
        ));
    }

    #[test]
    fn test_truncated_input() {
        let tile = new_tile(int_schema(), 2);
        fill_tile(&tile, &[(1, 1), (2, 2)]);

        let mut out = BytesMut::new();
        tile.serialize_to(&mut out, 2).unwrap();

        let fresh = new_tile(int_schema(), 2);
        let mut input = out.freeze().slice(0..10);
        assert!(matches!(
            fresh.deserialize_tuples_from(&mut input),
            Err(StorageError::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn test_display() {
        let mut tile = new_tile(int_schema(), 2);
        tile.set_location(Oid::new(1), Oid::new(2), Oid::new(3), Oid::new(0));
        fill_tile(&tile, &[(7, 70), (8, 80)]);

        let rendered = format!("{}", tile);
        assert!(rendered.contains("Backend: heap"));
        assert!(rendered.contains("(7, 70)"));
        assert!(rendered.contains("2 slots"));
    }
}
