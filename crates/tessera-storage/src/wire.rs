//! Checked reads for the big-endian wire formats.
//!
//! The `bytes` crate panics on short reads; these helpers turn a
//! truncated input into a serialization error instead.

use bytes::Buf;

use crate::error::{StorageError, StorageResult};

fn ensure(input: &impl Buf, needed: usize) -> StorageResult<()> {
    if input.remaining() < needed {
        return Err(StorageError::UnexpectedEof {
            needed,
            remaining: input.remaining(),
        });
    }
    Ok(())
}

pub(crate) fn read_i8(input: &mut impl Buf) -> StorageResult<i8> {
    ensure(input, 1)?;
    Ok(input.get_i8())
}

pub(crate) fn read_i16(input: &mut impl Buf) -> StorageResult<i16> {
    ensure(input, 2)?;
    Ok(input.get_i16())
}

pub(crate) fn read_i32(input: &mut impl Buf) -> StorageResult<i32> {
    ensure(input, 4)?;
    Ok(input.get_i32())
}

pub(crate) fn read_u8(input: &mut impl Buf) -> StorageResult<u8> {
    ensure(input, 1)?;
    Ok(input.get_u8())
}

pub(crate) fn read_bytes(input: &mut impl Buf, len: usize) -> StorageResult<Vec<u8>> {
    ensure(input, len)?;
    let mut buf = vec![0u8; len];
    input.copy_to_slice(&mut buf);
    Ok(buf)
}

/// Reads a `(i32 length, bytes)` prefixed UTF-8 string.
pub(crate) fn read_string(input: &mut impl Buf) -> StorageResult<String> {
    let length = read_i32(input)?;
    if length < 0 {
        return Err(StorageError::InvalidLength { length });
    }
    let bytes = read_bytes(input, length as usize)?;
    String::from_utf8(bytes).map_err(|_| StorageError::InvalidUtf8)
}
