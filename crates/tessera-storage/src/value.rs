//! Scalar values and tri-valued boolean logic.
//!
//! A [`Value`] is a tagged variant over the engine's scalar types. A
//! nullable comparison does not produce a `bool`: it produces a
//! [`TriBool`], and null propagates through `and`/`or` per SQL's Kleene
//! semantics. Predicates retain a tuple only on strictly-true.
//!
//! Fixed-width values are stored in tuple slots as big-endian bytes with
//! per-type null sentinels (`i32::MIN` for a null int32, and so on);
//! variable-length values store a pool offset in the slot, with the
//! all-ones offset as the null sentinel.

use std::cmp::Ordering;

use bytes::{Buf, BufMut, BytesMut};
use rust_decimal::Decimal;
use tessera_common::constants::{UNINLINED_VALUE_SLOT_SIZE, WIRE_NULL_LENGTH};
use tessera_common::memory::{Pool, PoolOffset};

use crate::error::{StorageError, StorageResult};
use crate::schema::Column;
use crate::wire;

/// Null sentinel for a 16-byte decimal slot.
const DECIMAL_NULL: [u8; 16] = [0xFF; 16];

/// Value type tag.
///
/// The numeric discriminants are the wire tags written into serialized
/// tile headers, so they are stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ValueType {
    /// The null type (a value with no column type).
    Null = 1,
    /// 8-bit signed integer.
    TinyInt = 3,
    /// 16-bit signed integer.
    SmallInt = 4,
    /// 32-bit signed integer.
    Integer = 5,
    /// 64-bit signed integer.
    BigInt = 6,
    /// 64-bit IEEE float.
    Double = 8,
    /// Variable-length UTF-8 string.
    Varchar = 9,
    /// Microseconds since the epoch.
    Timestamp = 11,
    /// 128-bit fixed-point decimal.
    Decimal = 22,
    /// Boolean.
    Boolean = 23,
    /// Variable-length byte string.
    Varbinary = 25,
}

impl ValueType {
    /// Converts the type to its wire tag.
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Creates a value type from a wire tag.
    pub fn from_u8(tag: u8) -> StorageResult<Self> {
        match tag {
            1 => Ok(Self::Null),
            3 => Ok(Self::TinyInt),
            4 => Ok(Self::SmallInt),
            5 => Ok(Self::Integer),
            6 => Ok(Self::BigInt),
            8 => Ok(Self::Double),
            9 => Ok(Self::Varchar),
            11 => Ok(Self::Timestamp),
            22 => Ok(Self::Decimal),
            23 => Ok(Self::Boolean),
            25 => Ok(Self::Varbinary),
            _ => Err(StorageError::UnknownValueType { tag }),
        }
    }

    /// Returns the slot width of this type, in bytes.
    ///
    /// Uninlined types occupy a fixed pool-offset slot.
    pub const fn length(self) -> usize {
        match self {
            Self::Null => 0,
            Self::Boolean | Self::TinyInt => 1,
            Self::SmallInt => 2,
            Self::Integer => 4,
            Self::BigInt | Self::Double | Self::Timestamp => 8,
            Self::Decimal => 16,
            Self::Varchar | Self::Varbinary => UNINLINED_VALUE_SLOT_SIZE,
        }
    }

    /// Returns true if values of this type are stored inline in the slot.
    pub const fn is_inlined(self) -> bool {
        !matches!(self, Self::Varchar | Self::Varbinary)
    }

    /// Returns true if this type belongs to the integer family.
    pub const fn is_integral(self) -> bool {
        matches!(
            self,
            Self::TinyInt | Self::SmallInt | Self::Integer | Self::BigInt
        )
    }
}

/// Tri-valued boolean: the result of evaluating a nullable condition.
///
/// Composition follows SQL's Kleene logic: `Unknown` absorbs through
/// `and`/`or` unless the other side decides the outcome, and negating
/// `Unknown` stays `Unknown`. Only [`TriBool::True`] satisfies a
/// predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriBool {
    /// Strictly true.
    True,
    /// Strictly false.
    False,
    /// Null / unknown.
    Unknown,
}

impl TriBool {
    /// Returns true iff this is strictly true.
    #[inline]
    pub const fn is_true(self) -> bool {
        matches!(self, Self::True)
    }

    /// Returns true iff this is strictly false.
    #[inline]
    pub const fn is_false(self) -> bool {
        matches!(self, Self::False)
    }

    /// Returns true iff this is the null case.
    #[inline]
    pub const fn is_unknown(self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// Kleene conjunction.
    #[must_use]
    pub const fn and(self, other: Self) -> Self {
        match (self, other) {
            (Self::False, _) | (_, Self::False) => Self::False,
            (Self::True, Self::True) => Self::True,
            _ => Self::Unknown,
        }
    }

    /// Kleene disjunction.
    #[must_use]
    pub const fn or(self, other: Self) -> Self {
        match (self, other) {
            (Self::True, _) | (_, Self::True) => Self::True,
            (Self::False, Self::False) => Self::False,
            _ => Self::Unknown,
        }
    }

    /// Kleene negation.
    #[must_use]
    pub const fn not(self) -> Self {
        match self {
            Self::True => Self::False,
            Self::False => Self::True,
            Self::Unknown => Self::Unknown,
        }
    }
}

impl From<bool> for TriBool {
    #[inline]
    fn from(b: bool) -> Self {
        if b {
            Self::True
        } else {
            Self::False
        }
    }
}

/// A scalar value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// The null value.
    Null,
    /// Boolean.
    Boolean(bool),
    /// 8-bit signed integer.
    TinyInt(i8),
    /// 16-bit signed integer.
    SmallInt(i16),
    /// 32-bit signed integer.
    Integer(i32),
    /// 64-bit signed integer.
    BigInt(i64),
    /// 64-bit IEEE float.
    Double(f64),
    /// 128-bit fixed-point decimal.
    Decimal(Decimal),
    /// Microseconds since the epoch.
    Timestamp(i64),
    /// Variable-length UTF-8 string.
    Varchar(String),
    /// Variable-length byte string.
    Varbinary(Vec<u8>),
}

impl Value {
    /// Returns the type tag of this value.
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Null => ValueType::Null,
            Self::Boolean(_) => ValueType::Boolean,
            Self::TinyInt(_) => ValueType::TinyInt,
            Self::SmallInt(_) => ValueType::SmallInt,
            Self::Integer(_) => ValueType::Integer,
            Self::BigInt(_) => ValueType::BigInt,
            Self::Double(_) => ValueType::Double,
            Self::Decimal(_) => ValueType::Decimal,
            Self::Timestamp(_) => ValueType::Timestamp,
            Self::Varchar(_) => ValueType::Varchar,
            Self::Varbinary(_) => ValueType::Varbinary,
        }
    }

    /// Returns true if this is the null value.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    fn as_i64(&self) -> Option<i64> {
        match *self {
            Self::TinyInt(v) => Some(v as i64),
            Self::SmallInt(v) => Some(v as i64),
            Self::Integer(v) => Some(v as i64),
            Self::BigInt(v) => Some(v),
            _ => None,
        }
    }

    /// Compares two values, coercing across the numeric family.
    ///
    /// Returns `None` when either side is null; mixing non-coercible
    /// types is a type mismatch.
    pub fn try_cmp(&self, other: &Value) -> StorageResult<Option<Ordering>> {
        if self.is_null() || other.is_null() {
            return Ok(None);
        }

        let mismatch = || StorageError::TypeMismatch {
            left: self.value_type(),
            right: other.value_type(),
        };

        let ord = match (self, other) {
            (Self::Boolean(a), Self::Boolean(b)) => a.cmp(b),
            (Self::Timestamp(a), Self::Timestamp(b)) => a.cmp(b),
            (Self::Varchar(a), Self::Varchar(b)) => a.cmp(b),
            (Self::Varbinary(a), Self::Varbinary(b)) => a.cmp(b),
            (Self::Decimal(a), Self::Decimal(b)) => a.cmp(b),
            (Self::Decimal(a), b) => {
                let rhs = Decimal::from(b.as_i64().ok_or_else(mismatch)?);
                a.cmp(&rhs)
            }
            (a, Self::Decimal(b)) => {
                let lhs = Decimal::from(a.as_i64().ok_or_else(mismatch)?);
                lhs.cmp(b)
            }
            (Self::Double(a), Self::Double(b)) => a.partial_cmp(b).ok_or_else(mismatch)?,
            (Self::Double(a), b) => {
                let rhs = b.as_i64().ok_or_else(mismatch)? as f64;
                a.partial_cmp(&rhs).ok_or_else(mismatch)?
            }
            (a, Self::Double(b)) => {
                let lhs = a.as_i64().ok_or_else(mismatch)? as f64;
                lhs.partial_cmp(b).ok_or_else(mismatch)?
            }
            (a, b) => {
                let lhs = a.as_i64().ok_or_else(mismatch)?;
                let rhs = b.as_i64().ok_or_else(mismatch)?;
                lhs.cmp(&rhs)
            }
        };

        Ok(Some(ord))
    }

    fn check_column(&self, column: &Column) -> StorageResult<()> {
        if self.is_null() {
            if !column.allow_null() {
                return Err(StorageError::NullNotAllowed {
                    column: column.name().to_string(),
                });
            }
            return Ok(());
        }

        let compatible = match (self.value_type(), column.value_type()) {
            (a, b) if a == b => true,
            // The integer family narrows/widens freely at the column boundary.
            (a, b) if a.is_integral() && b.is_integral() => true,
            _ => false,
        };

        if compatible {
            Ok(())
        } else {
            Err(StorageError::ValueTypeMismatch {
                value: self.value_type(),
                column: column.name().to_string(),
                expected: column.value_type(),
            })
        }
    }

    /// Writes this value into its column's slice of a tuple buffer.
    ///
    /// Uninlined values are copied into `pool` and the slot receives
    /// their pool offset.
    pub fn write_to_tuple(
        &self,
        data: &mut [u8],
        column: &Column,
        pool: Option<&Pool>,
    ) -> StorageResult<()> {
        self.check_column(column)?;

        let slot = &mut data[column.offset()..column.offset() + column.length()];

        match column.value_type() {
            ValueType::Boolean => {
                slot[0] = match self {
                    Self::Null => i8::MIN as u8,
                    Self::Boolean(true) => 1,
                    _ => 0,
                };
            }
            ValueType::TinyInt => {
                let v = self.as_i64().unwrap_or(i8::MIN as i64) as i8;
                slot[0] = v as u8;
            }
            ValueType::SmallInt => {
                let v = self.as_i64().unwrap_or(i16::MIN as i64) as i16;
                slot.copy_from_slice(&v.to_be_bytes());
            }
            ValueType::Integer => {
                let v = self.as_i64().unwrap_or(i32::MIN as i64) as i32;
                slot.copy_from_slice(&v.to_be_bytes());
            }
            ValueType::BigInt => {
                let v = self.as_i64().unwrap_or(i64::MIN);
                slot.copy_from_slice(&v.to_be_bytes());
            }
            ValueType::Timestamp => {
                let v = match self {
                    Self::Timestamp(v) => *v,
                    _ => i64::MIN,
                };
                slot.copy_from_slice(&v.to_be_bytes());
            }
            ValueType::Double => {
                let v = match self {
                    Self::Double(v) => *v,
                    _ => f64::MIN,
                };
                slot.copy_from_slice(&v.to_be_bytes());
            }
            ValueType::Decimal => {
                let bytes = match self {
                    Self::Decimal(d) => d.serialize(),
                    _ => DECIMAL_NULL,
                };
                slot.copy_from_slice(&bytes);
            }
            ValueType::Varchar | ValueType::Varbinary => {
                let payload: Option<&[u8]> = match self {
                    Self::Varchar(s) => Some(s.as_bytes()),
                    Self::Varbinary(b) => Some(b),
                    _ => None,
                };
                let offset = match payload {
                    Some(bytes) => {
                        let pool = pool.expect("uninlined column requires a pool");
                        pool.allocate(bytes)
                            .ok_or(StorageError::allocation_failed("pool", bytes.len()))?
                    }
                    None => PoolOffset::NULL,
                };
                slot.copy_from_slice(&offset.as_u64().to_be_bytes());
            }
            ValueType::Null => unreachable!("columns cannot have the null type"),
        }

        Ok(())
    }

    /// Reads a value from its column's slice of a tuple buffer.
    pub fn read_from_tuple(
        data: &[u8],
        column: &Column,
        pool: Option<&Pool>,
    ) -> StorageResult<Value> {
        let slot = &data[column.offset()..column.offset() + column.length()];

        let value = match column.value_type() {
            ValueType::Boolean => match slot[0] as i8 {
                v if v == i8::MIN => Self::Null,
                0 => Self::Boolean(false),
                _ => Self::Boolean(true),
            },
            ValueType::TinyInt => match slot[0] as i8 {
                i8::MIN => Self::Null,
                v => Self::TinyInt(v),
            },
            ValueType::SmallInt => {
                match i16::from_be_bytes(slot.try_into().expect("slot is 2 bytes")) {
                    i16::MIN => Self::Null,
                    v => Self::SmallInt(v),
                }
            }
            ValueType::Integer => {
                match i32::from_be_bytes(slot.try_into().expect("slot is 4 bytes")) {
                    i32::MIN => Self::Null,
                    v => Self::Integer(v),
                }
            }
            ValueType::BigInt => {
                match i64::from_be_bytes(slot.try_into().expect("slot is 8 bytes")) {
                    i64::MIN => Self::Null,
                    v => Self::BigInt(v),
                }
            }
            ValueType::Timestamp => {
                match i64::from_be_bytes(slot.try_into().expect("slot is 8 bytes")) {
                    i64::MIN => Self::Null,
                    v => Self::Timestamp(v),
                }
            }
            ValueType::Double => {
                let v = f64::from_be_bytes(slot.try_into().expect("slot is 8 bytes"));
                if v == f64::MIN {
                    Self::Null
                } else {
                    Self::Double(v)
                }
            }
            ValueType::Decimal => {
                let bytes: [u8; 16] = slot.try_into().expect("slot is 16 bytes");
                if bytes == DECIMAL_NULL {
                    Self::Null
                } else {
                    Self::Decimal(Decimal::deserialize(bytes))
                }
            }
            ValueType::Varchar | ValueType::Varbinary => {
                let raw = u64::from_be_bytes(slot.try_into().expect("slot is 8 bytes"));
                let offset = PoolOffset::from_u64(raw);
                if offset.is_null() {
                    Self::Null
                } else {
                    let pool = pool.expect("uninlined column requires a pool");
                    let bytes = pool
                        .read(offset)
                        .ok_or(StorageError::InvalidPoolOffset { offset: raw })?;
                    if column.value_type() == ValueType::Varchar {
                        let s =
                            String::from_utf8(bytes).map_err(|_| StorageError::InvalidUtf8)?;
                        Self::Varchar(s)
                    } else {
                        Self::Varbinary(bytes)
                    }
                }
            }
            ValueType::Null => unreachable!("columns cannot have the null type"),
        };

        Ok(value)
    }

    /// Serializes this value into the wire stream for its column.
    ///
    /// Fixed-width columns write their slot encoding; variable-length
    /// columns write `(i32 length, bytes)` with length -1 for null.
    pub fn serialize_into(&self, out: &mut BytesMut, column: &Column) -> StorageResult<()> {
        self.check_column(column)?;

        if column.is_inlined() {
            // Reuse the slot encoding: write into a scratch buffer laid
            // out as a single-column tuple.
            let start = out.len();
            out.resize(start + column.length(), 0);
            let mut scratch = vec![0u8; column.offset() + column.length()];
            self.write_to_tuple(&mut scratch, column, None)?;
            out[start..].copy_from_slice(&scratch[column.offset()..]);
            return Ok(());
        }

        match self {
            Self::Null => out.put_i32(WIRE_NULL_LENGTH),
            Self::Varchar(s) => {
                out.put_i32(s.len() as i32);
                out.put_slice(s.as_bytes());
            }
            Self::Varbinary(b) => {
                out.put_i32(b.len() as i32);
                out.put_slice(b);
            }
            _ => unreachable!("check_column admits only varlen values here"),
        }

        Ok(())
    }

    /// Deserializes a value of `column`'s type from the wire stream.
    pub fn deserialize_from(input: &mut impl Buf, column: &Column) -> StorageResult<Value> {
        if column.is_inlined() {
            let bytes = wire::read_bytes(input, column.length())?;
            let mut scratch = vec![0u8; column.offset() + column.length()];
            scratch[column.offset()..].copy_from_slice(&bytes);
            return Self::read_from_tuple(&scratch, column, None);
        }

        let length = wire::read_i32(input)?;
        if length == WIRE_NULL_LENGTH {
            return Ok(Self::Null);
        }
        if length < 0 {
            return Err(StorageError::InvalidLength { length });
        }

        let bytes = wire::read_bytes(input, length as usize)?;
        match column.value_type() {
            ValueType::Varchar => {
                let s = String::from_utf8(bytes).map_err(|_| StorageError::InvalidUtf8)?;
                Ok(Self::Varchar(s))
            }
            ValueType::Varbinary => Ok(Self::Varbinary(bytes)),
            _ => unreachable!("only varlen columns reach the length-prefixed path"),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Boolean(v) => write!(f, "{}", v),
            Self::TinyInt(v) => write!(f, "{}", v),
            Self::SmallInt(v) => write!(f, "{}", v),
            Self::Integer(v) => write!(f, "{}", v),
            Self::BigInt(v) => write!(f, "{}", v),
            Self::Double(v) => write!(f, "{}", v),
            Self::Decimal(v) => write!(f, "{}", v),
            Self::Timestamp(v) => write!(f, "{}", v),
            Self::Varchar(v) => write!(f, "{}", v),
            Self::Varbinary(v) => write!(f, "{} bytes", v.len()),
        }
    }
}
