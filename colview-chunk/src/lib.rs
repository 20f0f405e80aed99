//! Chunk and result facade over the conversion engine.
//!
//! A [`QueryResult`] reads its schema once and hands out [`DataChunk`]s;
//! [`DataChunk::column`] gives a [`ColumnReader`] with typed accessors.
//! Converter plans are resolved once per (column, target) and shared across
//! chunks; bound converters are cached per chunk. See [`ReaderConfig`].

mod cache;
mod chunk;
mod config;
mod reader;
mod result;
mod schema;

pub use chunk::DataChunk;
pub use config::ReaderConfig;
pub use reader::ColumnReader;
pub use result::QueryResult;
pub use schema::{Schema, SchemaColumn};
