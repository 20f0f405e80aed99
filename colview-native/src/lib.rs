//! Engine-facing interface.
//!
//! The engine hands out vectors, chunks and results through the traits in this
//! crate. Everything above it (descriptors, converters, the chunk facade) is
//! written against these traits only, so the same readers work over the real
//! engine and over the in-memory engine in [`mem`].

use std::sync::Arc;

use colview_result::Result;
use colview_types::LogicalType;

pub mod layout;
pub mod mem;

pub use layout::ListEntry;
pub use mem::{MemChunk, MemResult, MemVector};

/// Shared handle to a native vector. Holding one keeps the vector's memory
/// alive.
pub type VectorHandle = Arc<dyn NativeVector>;

/// Shared handle to a native chunk.
pub type ChunkHandle = Arc<dyn NativeChunk>;

/// The child vector of a LIST or MAP vector and its element count.
#[derive(Clone)]
pub struct ChildVector {
    pub vector: VectorHandle,
    pub len: usize,
}

impl std::fmt::Debug for ChildVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChildVector")
            .field("len", &self.len)
            .finish_non_exhaustive()
    }
}

/// One column's worth of values within a chunk.
///
/// # Safety
///
/// Implementors guarantee, for as long as the object is alive:
/// - `data()` points to `len() * slot_width` readable bytes laid out as the
///   engine's slots for the storage kind of `logical_type()`;
/// - out-of-line string payloads referenced from those slots stay readable;
/// - `validity()` is null or points to `ceil(len() / 64)` readable words;
/// - child and member vectors have the types `logical_type()` names for them.
pub unsafe trait NativeVector: Send + Sync {
    /// Full type of the vector. Allocates; callers resolve it once per column.
    fn logical_type(&self) -> Result<LogicalType>;

    /// Number of slots behind `data()` and rows covered by `validity()`.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn data(&self) -> *const u8;

    /// Validity bitmap, or null when every row is valid.
    fn validity(&self) -> *const u64;

    /// Child vector of a LIST or MAP vector together with its length.
    fn list_child(&self) -> Result<ChildVector>;

    /// Child vector of an ARRAY vector; its length is `rows * size`.
    fn array_child(&self) -> Result<VectorHandle>;

    /// Member vector `index` of a STRUCT or UNION vector.
    fn struct_member(&self, index: usize) -> Result<VectorHandle>;
}

/// A horizontal slice of a query result.
pub trait NativeChunk: Send + Sync {
    fn row_count(&self) -> usize;

    fn column_count(&self) -> usize;

    fn vector(&self, index: usize) -> Result<VectorHandle>;
}

/// A query result that yields chunks until exhausted.
pub trait NativeResult: Send {
    fn column_count(&self) -> usize;

    fn column_name(&self, index: usize) -> Result<String>;

    fn column_type(&self, index: usize) -> Result<LogicalType>;

    /// The next chunk, or `None` once the result is exhausted.
    fn fetch_chunk(&mut self) -> Result<Option<ChunkHandle>>;
}
