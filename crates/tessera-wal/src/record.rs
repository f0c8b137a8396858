//! The tuple record: in-memory shape and bit-exact serialization.
//!
//! Header layout (33 bytes, big-endian):
//!
//! ```text
//! [i8  record_type]
//! [u64 txn_id]
//! [u32 db_oid]
//! [u32 table_oid]
//! [8B  insert_location]   (block u32, offset u32)
//! [8B  delete_location]
//! ```
//!
//! Insert and update records are followed by the affected tuple's
//! payload, serialized per the tile wire format's per-column rules
//! against the table's current schema. The schema is not inlined in
//! the record; the recovery reader looks it up by `table_oid`.
//!
//! Location invariants per type: an insert carries a valid insert
//! location and a zero delete location; a delete carries the reverse;
//! an update carries both.

use std::sync::OnceLock;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use tessera_common::constants::TUPLE_RECORD_HEADER_SIZE;
use tessera_common::types::{ItemPointer, Oid, TxnId};

use crate::error::{WalError, WalResult};

/// Tuple record type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i8)]
pub enum TupleRecordType {
    /// A tuple was inserted.
    Insert = 1,
    /// A tuple was deleted.
    Delete = 2,
    /// A tuple was updated (delete + insert).
    Update = 3,
}

impl TupleRecordType {
    /// Converts the record type to its wire tag.
    pub const fn as_i8(self) -> i8 {
        self as i8
    }

    /// Creates a record type from a wire tag.
    pub fn from_i8(value: i8) -> WalResult<Self> {
        match value {
            1 => Ok(Self::Insert),
            2 => Ok(Self::Delete),
            3 => Ok(Self::Update),
            _ => Err(WalError::UnknownRecordType { value }),
        }
    }
}

/// A tuple-level WAL record.
///
/// # Example
///
/// ```rust
/// use tessera_common::types::{ItemPointer, Oid, TxnId};
/// use tessera_wal::{TupleRecord, TupleRecordType};
///
/// let location = ItemPointer::new(Oid::new(0), Oid::new(3));
/// let record = TupleRecord::insert(
///     TxnId::new(42),
///     Oid::new(1),
///     Oid::new(7),
///     location,
///     bytes::Bytes::from_static(&[0, 0, 0, 5]),
/// )
/// .unwrap();
///
/// let wire = record.serialize();
/// let decoded = TupleRecord::deserialize_header(&mut wire.clone()).unwrap();
/// assert_eq!(decoded.record_type(), TupleRecordType::Insert);
/// assert_eq!(decoded.insert_location(), location);
/// ```
#[derive(Debug)]
pub struct TupleRecord {
    record_type: TupleRecordType,
    txn_id: TxnId,
    database_oid: Oid,
    table_oid: Oid,
    insert_location: ItemPointer,
    delete_location: ItemPointer,

    /// Serialized tuple payload (insert and update records).
    payload: Option<Bytes>,

    /// Lazily-built serialized form; dropping an unserialized record
    /// frees nothing.
    message: OnceLock<Bytes>,
}

impl TupleRecord {
    /// Size of the record header in bytes.
    pub const HEADER_SIZE: usize = TUPLE_RECORD_HEADER_SIZE;

    fn new(
        record_type: TupleRecordType,
        txn_id: TxnId,
        database_oid: Oid,
        table_oid: Oid,
        insert_location: ItemPointer,
        delete_location: ItemPointer,
        payload: Option<Bytes>,
    ) -> WalResult<Self> {
        if !txn_id.is_valid() {
            return Err(WalError::invalid_record("transaction id is invalid"));
        }
        if !database_oid.is_valid() || !table_oid.is_valid() {
            return Err(WalError::invalid_record("database or table oid is invalid"));
        }

        match record_type {
            TupleRecordType::Insert => {
                if delete_location != ItemPointer::ZERO {
                    return Err(WalError::invalid_record(
                        "insert records carry a zero delete location",
                    ));
                }
            }
            TupleRecordType::Delete => {
                if insert_location != ItemPointer::ZERO {
                    return Err(WalError::invalid_record(
                        "delete records carry a zero insert location",
                    ));
                }
            }
            TupleRecordType::Update => {}
        }

        Ok(Self {
            record_type,
            txn_id,
            database_oid,
            table_oid,
            insert_location,
            delete_location,
            payload,
            message: OnceLock::new(),
        })
    }

    /// Builds an insert record.
    pub fn insert(
        txn_id: TxnId,
        database_oid: Oid,
        table_oid: Oid,
        insert_location: ItemPointer,
        payload: Bytes,
    ) -> WalResult<Self> {
        Self::new(
            TupleRecordType::Insert,
            txn_id,
            database_oid,
            table_oid,
            insert_location,
            ItemPointer::ZERO,
            Some(payload),
        )
    }

    /// Builds a delete record.
    pub fn delete(
        txn_id: TxnId,
        database_oid: Oid,
        table_oid: Oid,
        delete_location: ItemPointer,
    ) -> WalResult<Self> {
        Self::new(
            TupleRecordType::Delete,
            txn_id,
            database_oid,
            table_oid,
            ItemPointer::ZERO,
            delete_location,
            None,
        )
    }

    /// Builds an update record.
    pub fn update(
        txn_id: TxnId,
        database_oid: Oid,
        table_oid: Oid,
        insert_location: ItemPointer,
        delete_location: ItemPointer,
        payload: Bytes,
    ) -> WalResult<Self> {
        Self::new(
            TupleRecordType::Update,
            txn_id,
            database_oid,
            table_oid,
            insert_location,
            delete_location,
            Some(payload),
        )
    }

    /// Returns the record type.
    #[inline]
    pub fn record_type(&self) -> TupleRecordType {
        self.record_type
    }

    /// Returns the mutating transaction.
    #[inline]
    pub fn txn_id(&self) -> TxnId {
        self.txn_id
    }

    /// Returns the database oid.
    #[inline]
    pub fn database_oid(&self) -> Oid {
        self.database_oid
    }

    /// Returns the table oid.
    #[inline]
    pub fn table_oid(&self) -> Oid {
        self.table_oid
    }

    /// Returns the inserted tuple's location.
    #[inline]
    pub fn insert_location(&self) -> ItemPointer {
        self.insert_location
    }

    /// Returns the deleted tuple's location.
    #[inline]
    pub fn delete_location(&self) -> ItemPointer {
        self.delete_location
    }

    /// Returns the serialized tuple payload, if the type carries one.
    #[inline]
    pub fn payload(&self) -> Option<&Bytes> {
        self.payload.as_ref()
    }

    /// Writes the 33-byte header.
    pub fn serialize_header(&self, out: &mut BytesMut) {
        out.put_i8(self.record_type.as_i8());
        out.put_u64(self.txn_id.as_u64());
        out.put_u32(self.database_oid.as_u32());
        out.put_u32(self.table_oid.as_u32());
        out.put_slice(&self.insert_location.to_be_bytes());
        out.put_slice(&self.delete_location.to_be_bytes());
    }

    /// Serializes the record (header plus payload for insert/update).
    ///
    /// The serialized form is built once and cached; repeated calls
    /// return the same bytes.
    pub fn serialize(&self) -> Bytes {
        self.message
            .get_or_init(|| {
                let payload_len = self.payload.as_ref().map_or(0, Bytes::len);
                let mut out = BytesMut::with_capacity(Self::HEADER_SIZE + payload_len);

                self.serialize_header(&mut out);
                if let Some(payload) = &self.payload {
                    out.put_slice(payload);
                }

                out.freeze()
            })
            .clone()
    }

    /// Decodes a record header.
    ///
    /// The body layout is `record_type`-specific and owned by the
    /// recovery reader, so the payload (if any) is left in `input`.
    pub fn deserialize_header(input: &mut impl Buf) -> WalResult<Self> {
        if input.remaining() < Self::HEADER_SIZE {
            return Err(WalError::deserialization(format!(
                "not enough bytes for header: {} < {}",
                input.remaining(),
                Self::HEADER_SIZE
            )));
        }

        let record_type = TupleRecordType::from_i8(input.get_i8())?;
        let txn_id = TxnId::new(input.get_u64());
        let database_oid = Oid::new(input.get_u32());
        let table_oid = Oid::new(input.get_u32());

        let mut location = [0u8; ItemPointer::WIRE_SIZE];
        input.copy_to_slice(&mut location);
        let insert_location = ItemPointer::from_be_bytes(location);
        input.copy_to_slice(&mut location);
        let delete_location = ItemPointer::from_be_bytes(location);

        Self::new(
            record_type,
            txn_id,
            database_oid,
            table_oid,
            insert_location,
            delete_location,
            None,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(block: u32, offset: u32) -> ItemPointer {
        ItemPointer::new(Oid::new(block), Oid::new(offset))
    }

    #[test]
    fn test_record_type_roundtrip() {
        for rt in [
            TupleRecordType::Insert,
            TupleRecordType::Delete,
            TupleRecordType::Update,
        ] {
            assert_eq!(TupleRecordType::from_i8(rt.as_i8()).unwrap(), rt);
        }
        assert!(TupleRecordType::from_i8(0).is_err());
        assert!(TupleRecordType::from_i8(-1).is_err());
    }

    #[test]
    fn test_header_layout() {
        let record = TupleRecord::insert(
            TxnId::new(0x0102030405060708),
            Oid::new(0x0A),
            Oid::new(0x0B),
            location(0x0C, 0x0D),
            Bytes::new(),
        )
        .unwrap();

        let wire = record.serialize();
        assert_eq!(wire.len(), TupleRecord::HEADER_SIZE);

        assert_eq!(wire[0] as i8, 1);
        assert_eq!(&wire[1..9], &0x0102030405060708u64.to_be_bytes());
        assert_eq!(&wire[9..13], &0x0Au32.to_be_bytes());
        assert_eq!(&wire[13..17], &0x0Bu32.to_be_bytes());
        assert_eq!(&wire[17..21], &0x0Cu32.to_be_bytes());
        assert_eq!(&wire[21..25], &0x0Du32.to_be_bytes());
        assert_eq!(&wire[25..33], &[0u8; 8]);
    }

    #[test]
    fn test_insert_roundtrip() {
        let payload = Bytes::from_static(&[0, 0, 0, 42]);
        let record = TupleRecord::insert(
            TxnId::new(7),
            Oid::new(1),
            Oid::new(2),
            location(3, 4),
            payload.clone(),
        )
        .unwrap();

        let wire = record.serialize();
        assert_eq!(wire.len(), TupleRecord::HEADER_SIZE + payload.len());

        let mut input = wire.clone();
        let decoded = TupleRecord::deserialize_header(&mut input).unwrap();

        assert_eq!(decoded.record_type(), TupleRecordType::Insert);
        assert_eq!(decoded.txn_id(), TxnId::new(7));
        assert_eq!(decoded.database_oid(), Oid::new(1));
        assert_eq!(decoded.table_oid(), Oid::new(2));
        assert_eq!(decoded.insert_location(), location(3, 4));
        assert!(decoded.delete_location().is_zero());

        // The body stays in the input for the recovery reader.
        assert_eq!(input.remaining(), payload.len());
    }

    #[test]
    fn test_delete_roundtrip() {
        let record =
            TupleRecord::delete(TxnId::new(7), Oid::new(1), Oid::new(2), location(5, 6)).unwrap();

        let wire = record.serialize();
        let decoded = TupleRecord::deserialize_header(&mut wire.clone()).unwrap();

        assert_eq!(decoded.record_type(), TupleRecordType::Delete);
        assert!(decoded.insert_location().is_zero());
        assert_eq!(decoded.delete_location(), location(5, 6));
    }

    #[test]
    fn test_update_roundtrip() {
        let record = TupleRecord::update(
            TxnId::new(7),
            Oid::new(1),
            Oid::new(2),
            location(3, 4),
            location(5, 6),
            Bytes::from_static(b"row"),
        )
        .unwrap();

        let wire = record.serialize();
        let decoded = TupleRecord::deserialize_header(&mut wire.clone()).unwrap();

        assert_eq!(decoded.record_type(), TupleRecordType::Update);
        assert_eq!(decoded.insert_location(), location(3, 4));
        assert_eq!(decoded.delete_location(), location(5, 6));
    }

    #[test]
    fn test_serialize_is_cached() {
        let record =
            TupleRecord::delete(TxnId::new(1), Oid::new(1), Oid::new(1), location(1, 1)).unwrap();

        let first = record.serialize();
        let second = record.serialize();
        assert_eq!(first, second);
        // Same backing buffer, not a rebuild.
        assert_eq!(first.as_ptr(), second.as_ptr());
    }

    #[test]
    fn test_invalid_constructions() {
        // Invalid transaction.
        assert!(TupleRecord::delete(
            TxnId::INVALID,
            Oid::new(1),
            Oid::new(1),
            location(1, 1)
        )
        .is_err());

        // Invalid table oid.
        assert!(
            TupleRecord::delete(TxnId::new(1), Oid::new(1), Oid::INVALID, location(1, 1)).is_err()
        );
    }

    #[test]
    fn test_truncated_header() {
        let mut input = Bytes::from_static(&[1, 2, 3]);
        assert!(matches!(
            TupleRecord::deserialize_header(&mut input),
            Err(WalError::Deserialization { .. })
        ));
    }

    #[test]
    fn test_unknown_type_in_header() {
        let mut bytes = BytesMut::new();
        bytes.put_i8(9);
        bytes.put_slice(&[0u8; TupleRecord::HEADER_SIZE - 1]);

        let mut input = bytes.freeze();
        assert!(matches!(
            TupleRecord::deserialize_header(&mut input),
            Err(WalError::UnknownRecordType { value: 9 })
        ));
    }
}
