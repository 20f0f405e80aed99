//! colview: typed access to the vectors of columnar query chunks.
//!
//! This crate is the entrypoint for the colview workspace. It re-exports the
//! chunk readers, the conversion engine and the value types from the
//! underlying `colview-*` crates.
//!
//! # Quick Start
//!
//! Wrap an engine result in a [`QueryResult`] and read rows by column:
//!
//! ```rust
//! use colview::native::{MemResult, MemVector};
//! use colview::QueryResult;
//!
//! let ids = MemVector::primitive(&[Some(1i32), None, Some(3)]);
//! let names = MemVector::varchars(&[Some("ada"), Some("grace"), None]).unwrap();
//! let result = MemResult::single(vec![("id", ids), ("name", names)]).unwrap();
//!
//! let mut result = QueryResult::new(result).unwrap();
//! let chunk = result.next_chunk().unwrap().unwrap();
//! let id = chunk.column_by_name("id").unwrap();
//! assert_eq!(id.get::<i64>(0).unwrap(), 1);
//! assert_eq!(id.try_get::<i32>(1).unwrap(), None);
//! assert_eq!(chunk.column(1).unwrap().get::<String>(1).unwrap(), "grace");
//! ```
//!
//! # Architecture
//!
//! - **Facade** (`colview-chunk`): results, chunks, column readers and the
//!   converter caches.
//! - **Conversion** (`colview-convert`): converter plans, resolution and the
//!   composite readers.
//! - **Descriptors** (`colview-vector`): vector descriptors and the type
//!   compatibility matrix.
//! - **Engine interface** (`colview-native`): the traits the engine implements,
//!   plus an in-memory engine.
//! - **Arrow** (`colview-arrowhead`, `arrow` feature): record batches as chunks.

// Re-export the chunk facade as the primary user-facing API
pub use colview_chunk::{ColumnReader, DataChunk, QueryResult, ReaderConfig, Schema, SchemaColumn};

// Re-export the conversion engine for callers that work on vectors directly
pub use colview_convert::{
    Converter, HostEnum, HostValue, host_enum, resolve, resolve_boxed, resolve_dynamic,
};
pub use colview_vector::{ColumnDescriptor, Vector};

pub use colview_types::{
    BitString, DateValue, DecimalValue, HostType, IntervalValue, LogicalType, MapValue,
    StructValue, TimeTzValue, TimeValue, TimestampValue, Value, ValueKind, VarInt,
};

// Re-export result types for error handling
pub use colview_result::{Error, Result};

pub mod native {
    //! Engine-facing traits and the in-memory engine.

    pub use colview_native::{
        ChunkHandle, MemChunk, MemResult, MemVector, NativeChunk, NativeResult, NativeVector,
        VectorHandle,
    };
}

#[cfg(feature = "arrow")]
pub mod arrow {
    //! Arrow record batches as chunks and results.

    pub use colview_arrowhead::{
        chunk_from_batch, logical_type_from_arrow, logical_type_of, result_from_batches,
        vector_from_array,
    };
}
