//! Owning tuples and tuple windows.
//!
//! A [`Tuple`] owns its byte buffer; a [`TupleRef`] is a window over a
//! slot inside a tile. Both read and write values through the schema's
//! column offsets, resolving uninlined columns through a pool.

use std::sync::Arc;

use bytes::{Buf, BytesMut};
use tessera_common::memory::Pool;

use crate::error::StorageResult;
use crate::schema::Schema;
use crate::value::Value;

/// A tuple that owns its byte buffer.
///
/// The buffer holds the slot encoding of every column; uninlined
/// columns hold pool offsets, so a tuple built against a tile's pool
/// resolves its variable-length values only as long as that pool lives.
#[derive(Debug, Clone)]
pub struct Tuple {
    schema: Arc<Schema>,
    data: Box<[u8]>,
}

impl Tuple {
    /// Creates a zeroed tuple for the given schema.
    #[must_use]
    pub fn new(schema: Arc<Schema>) -> Self {
        let data = vec![0u8; schema.tuple_length()].into_boxed_slice();
        Self { schema, data }
    }

    /// Creates a tuple from raw slot bytes.
    ///
    /// `data` must be exactly `schema.tuple_length()` bytes.
    #[must_use]
    pub fn from_bytes(schema: Arc<Schema>, data: &[u8]) -> Self {
        debug_assert_eq!(data.len(), schema.tuple_length());
        Self {
            schema,
            data: data.into(),
        }
    }

    /// Creates a tuple from a value per column.
    pub fn from_values(
        schema: Arc<Schema>,
        values: &[Value],
        pool: Option<&Pool>,
    ) -> StorageResult<Self> {
        debug_assert_eq!(values.len(), schema.column_count());

        let mut tuple = Self::new(schema);
        for (index, value) in values.iter().enumerate() {
            tuple.set_value(index, value, pool)?;
        }
        Ok(tuple)
    }

    /// Returns the tuple's schema.
    #[inline]
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Returns the raw slot bytes.
    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Writes a value into the given column.
    pub fn set_value(
        &mut self,
        column: usize,
        value: &Value,
        pool: Option<&Pool>,
    ) -> StorageResult<()> {
        let col = self
            .schema
            .column(column)
            .ok_or_else(|| crate::StorageError::column_out_of_range(column, self.schema.column_count()))?;
        value.write_to_tuple(&mut self.data, col, pool)
    }

    /// Reads the value of the given column.
    pub fn value(&self, column: usize, pool: Option<&Pool>) -> StorageResult<Value> {
        TupleRef::new(&self.schema, &self.data, pool).value(column)
    }

    /// Serializes the tuple into the wire stream.
    pub fn serialize_into(&self, out: &mut BytesMut, pool: Option<&Pool>) -> StorageResult<()> {
        TupleRef::new(&self.schema, &self.data, pool).serialize_into(out)
    }

    /// Deserializes a tuple of `schema` from the wire stream.
    ///
    /// Variable-length payloads are copied into `pool`.
    pub fn deserialize_from(
        schema: Arc<Schema>,
        input: &mut impl Buf,
        pool: Option<&Pool>,
    ) -> StorageResult<Self> {
        let mut tuple = Self::new(schema.clone());
        for index in 0..schema.column_count() {
            let col = schema.column(index).expect("index bounded by column count");
            let value = Value::deserialize_from(input, col)?;
            tuple.set_value(index, &value, pool)?;
        }
        Ok(tuple)
    }
}

/// A borrowed window over one tuple's slot bytes.
#[derive(Debug, Clone, Copy)]
pub struct TupleRef<'a> {
    schema: &'a Schema,
    data: &'a [u8],
    pool: Option<&'a Pool>,
}

impl<'a> TupleRef<'a> {
    /// Creates a window over `data`, resolving uninlined columns
    /// through `pool`.
    #[must_use]
    pub fn new(schema: &'a Schema, data: &'a [u8], pool: Option<&'a Pool>) -> Self {
        debug_assert_eq!(data.len(), schema.tuple_length());
        Self { schema, data, pool }
    }

    /// Returns the window's schema.
    #[inline]
    pub fn schema(&self) -> &'a Schema {
        self.schema
    }

    /// Returns the raw slot bytes.
    #[inline]
    pub fn bytes(&self) -> &'a [u8] {
        self.data
    }

    /// Reads the value of the given column.
    pub fn value(&self, column: usize) -> StorageResult<Value> {
        let col = self
            .schema
            .column(column)
            .ok_or_else(|| crate::StorageError::column_out_of_range(column, self.schema.column_count()))?;
        Value::read_from_tuple(self.data, col, self.pool)
    }

    /// Serializes the windowed tuple into the wire stream.
    ///
    /// Fixed-width columns are packed at their offsets; variable-length
    /// columns are written as `(i32 length, bytes)` inline.
    pub fn serialize_into(&self, out: &mut BytesMut) -> StorageResult<()> {
        for index in 0..self.schema.column_count() {
            let col = self.schema.column(index).expect("index bounded by column count");
            let value = Value::read_from_tuple(self.data, col, self.pool)?;
            value.serialize_into(out, col)?;
        }
        Ok(())
    }

    /// Compares two windows column by column.
    ///
    /// Null equals null here; this is structural equality for tile
    /// comparison, not SQL equality.
    pub fn values_equal(&self, other: &TupleRef<'_>) -> StorageResult<bool> {
        if self.schema != other.schema {
            return Ok(false);
        }
        for index in 0..self.schema.column_count() {
            if self.value(index)? != other.value(index)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl std::fmt::Display for TupleRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(")?;
        for index in 0..self.schema.column_count() {
            if index > 0 {
                write!(f, ", ")?;
            }
            match self.value(index) {
                Ok(value) => write!(f, "{}", value)?,
                Err(_) => write!(f, "<error>")?,
            }
        }
        write!(f, ")")
    }
}
