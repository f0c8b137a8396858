//! Variable-length value pool.
//!
//! A `Pool` is a chunked bump allocator for the out-of-line payloads of
//! uninlined columns (varchar, varbinary). A tuple slot stores only a
//! [`PoolOffset`]; the payload bytes live in the pool as a
//! `[u32 length][bytes]` record. Allocation bumps a cursor within the
//! current chunk and grows by whole chunks; all memory is returned to
//! the backend at once when the pool is dropped.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::constants::{DEFAULT_POOL_CHUNK_SIZE, MIN_POOL_CHUNK_SIZE};
use crate::memory::{Backend, RawBuffer};

/// Length-prefix width of a pool record.
const LENGTH_PREFIX_SIZE: usize = 4;

/// A stable address of a value inside a [`Pool`].
///
/// Encodes `(chunk index, byte offset within chunk)` in a single u64,
/// so a tuple slot can hold it in 8 bytes. The all-ones value is the
/// null sentinel stored by uninlined null columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct PoolOffset(u64);

impl PoolOffset {
    /// The null sentinel, stored in a slot whose uninlined value is null.
    pub const NULL: Self = Self(u64::MAX);

    const fn encode(chunk: u32, offset: u32) -> Self {
        Self(((chunk as u64) << 32) | offset as u64)
    }

    const fn chunk(self) -> u32 {
        (self.0 >> 32) as u32
    }

    const fn offset(self) -> u32 {
        self.0 as u32
    }

    /// Returns the raw u64 value.
    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Creates an offset from a raw u64 value.
    #[inline]
    #[must_use]
    pub const fn from_u64(raw: u64) -> Self {
        Self(raw)
    }

    /// Checks whether this is the null sentinel.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == Self::NULL.0
    }
}

/// A chunk of pool memory with its bump cursor.
struct PoolChunk {
    buffer: RawBuffer,
    used: usize,
}

impl PoolChunk {
    fn remaining(&self) -> usize {
        self.buffer.len() - self.used
    }
}

struct PoolInner {
    chunks: Vec<PoolChunk>,
    bytes_allocated: usize,
}

/// A chunked bump allocator for variable-length values.
///
/// The pool's lifetime is tied to the tile that owns it; there is no
/// per-value free.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use tessera_common::memory::{HeapBackend, Pool};
///
/// let pool = Pool::new(Arc::new(HeapBackend));
/// let offset = pool.allocate(b"hello").expect("pool allocation failed");
/// assert_eq!(pool.read(offset).as_deref(), Some(&b"hello"[..]));
/// ```
pub struct Pool {
    backend: Arc<dyn Backend>,
    chunk_size: usize,
    inner: Mutex<PoolInner>,
}

impl Pool {
    /// Creates a new pool with the default chunk size (64 KB).
    #[must_use]
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self::with_chunk_size(backend, DEFAULT_POOL_CHUNK_SIZE)
    }

    /// Creates a new pool with the specified chunk size.
    ///
    /// The chunk size is clamped to at least 4 KB.
    #[must_use]
    pub fn with_chunk_size(backend: Arc<dyn Backend>, chunk_size: usize) -> Self {
        let chunk_size = chunk_size.max(MIN_POOL_CHUNK_SIZE);

        Self {
            backend,
            chunk_size,
            inner: Mutex::new(PoolInner {
                chunks: Vec::new(),
                bytes_allocated: 0,
            }),
        }
    }

    /// Copies `data` into the pool and returns its address.
    ///
    /// Returns `None` if the backend cannot satisfy a chunk request;
    /// callers surface that as an allocation error.
    #[must_use]
    pub fn allocate(&self, data: &[u8]) -> Option<PoolOffset> {
        let record_size = LENGTH_PREFIX_SIZE + data.len();
        let mut inner = self.inner.lock();

        let needs_chunk = match inner.chunks.last() {
            Some(chunk) => chunk.remaining() < record_size,
            None => true,
        };

        if needs_chunk {
            // Oversized records get a dedicated chunk.
            let size = self.chunk_size.max(record_size);
            let buffer = self.backend.allocate(size)?;
            inner.chunks.push(PoolChunk { buffer, used: 0 });
        }

        let chunk_index = inner.chunks.len() - 1;
        let chunk = inner
            .chunks
            .last_mut()
            .expect("chunk pushed above if absent");
        let offset = chunk.used;

        // SAFETY: the lock gives exclusive access, and the range
        // [offset, offset + record_size) fits the chunk by the check above.
        unsafe {
            let dst = chunk.buffer.as_mut_ptr().add(offset);
            let len = data.len() as u32;
            std::ptr::copy_nonoverlapping(len.to_be_bytes().as_ptr(), dst, LENGTH_PREFIX_SIZE);
            std::ptr::copy_nonoverlapping(data.as_ptr(), dst.add(LENGTH_PREFIX_SIZE), data.len());
        }

        chunk.used += record_size;
        inner.bytes_allocated += record_size;

        Some(PoolOffset::encode(chunk_index as u32, offset as u32))
    }

    /// Reads the value stored at `offset`.
    ///
    /// Returns `None` for the null sentinel or an address that does not
    /// name an allocated record.
    #[must_use]
    pub fn read(&self, offset: PoolOffset) -> Option<Vec<u8>> {
        if offset.is_null() {
            return None;
        }

        let inner = self.inner.lock();
        let chunk = inner.chunks.get(offset.chunk() as usize)?;
        let start = offset.offset() as usize;

        if start + LENGTH_PREFIX_SIZE > chunk.used {
            return None;
        }

        // SAFETY: the range is inside the chunk's bump-allocated prefix,
        // which is never mutated after allocation.
        let len = unsafe {
            let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
            std::ptr::copy_nonoverlapping(
                chunk.buffer.as_ptr().add(start),
                prefix.as_mut_ptr(),
                LENGTH_PREFIX_SIZE,
            );
            u32::from_be_bytes(prefix) as usize
        };

        if start + LENGTH_PREFIX_SIZE + len > chunk.used {
            return None;
        }

        let mut data = vec![0u8; len];
        // SAFETY: bounds checked against the allocated prefix above.
        unsafe {
            std::ptr::copy_nonoverlapping(
                chunk.buffer.as_ptr().add(start + LENGTH_PREFIX_SIZE),
                data.as_mut_ptr(),
                len,
            );
        }

        Some(data)
    }

    /// Returns the total bytes of live records in the pool.
    #[must_use]
    pub fn bytes_allocated(&self) -> usize {
        self.inner.lock().bytes_allocated
    }

    /// Returns the number of chunks acquired from the backend.
    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.inner.lock().chunks.len()
    }
}

impl Drop for Pool {
    fn drop(&mut self) {
        let mut inner = self.inner.lock();
        for chunk in inner.chunks.drain(..) {
            self.backend.free(chunk.buffer);
        }
    }
}

impl std::fmt::Debug for Pool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("Pool")
            .field("chunk_size", &self.chunk_size)
            .field("chunks", &inner.chunks.len())
            .field("bytes_allocated", &inner.bytes_allocated)
            .finish()
    }
}
