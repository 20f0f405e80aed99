use std::any::TypeId;
use std::fmt;
use std::sync::{Arc, OnceLock};

use colview_convert::{Converter, HostValue, resolve, resolve_dynamic};
use colview_native::ChunkHandle;
use colview_result::{Error, Result};
use colview_types::{HostType, LogicalType, Value};
use colview_vector::Vector;
use tracing::debug;

use crate::cache::{ConverterCache, TargetKey};
use crate::config::ReaderConfig;
use crate::reader::ColumnReader;
use crate::schema::Schema;

/// One chunk of a query result.
///
/// Vectors are described lazily, once per column. Bound converters are cached
/// per chunk; plans come from a cache that may be shared with other chunks of
/// the same result. Dropping the chunk while vectors or converters taken from
/// it are alive only drops its reference to the native chunk.
pub struct DataChunk {
    native: ChunkHandle,
    rows: usize,
    schema: Arc<Schema>,
    vectors: Vec<OnceLock<Vector>>,
    config: ReaderConfig,
    plans: Arc<ConverterCache>,
    bound: ConverterCache,
}

impl fmt::Debug for DataChunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataChunk")
            .field("rows", &self.rows)
            .field("columns", &self.schema.len())
            .field("config", &self.config)
            .finish()
    }
}

impl DataChunk {
    /// Wrap a native chunk, asking each vector for its type.
    ///
    /// Columns are named `column0`, `column1`, ...
    pub fn from_native(native: ChunkHandle) -> Result<Self> {
        let columns = (0..native.column_count())
            .map(|i| {
                let ty: LogicalType = native.vector(i)?.logical_type()?;
                Ok((format!("column{i}"), ty))
            })
            .collect::<Result<Vec<_>>>()?;
        let schema = Arc::new(Schema::new(columns)?);
        Self::with_schema(native, schema, ReaderConfig::default(), None)
    }

    pub(crate) fn with_schema(
        native: ChunkHandle,
        schema: Arc<Schema>,
        config: ReaderConfig,
        plans: Option<Arc<ConverterCache>>,
    ) -> Result<Self> {
        if native.column_count() != schema.len() {
            return Err(Error::Native(format!(
                "chunk has {} columns, result schema has {}",
                native.column_count(),
                schema.len()
            )));
        }
        let rows = native.row_count();
        let vectors = (0..schema.len()).map(|_| OnceLock::new()).collect();
        debug!(rows, columns = schema.len(), "opened chunk");
        Ok(Self {
            native,
            rows,
            schema,
            vectors,
            config,
            plans: plans.unwrap_or_else(|| Arc::new(ConverterCache::new())),
            bound: ConverterCache::new(),
        })
    }

    /// Replace the configuration. Caches already filled are kept.
    pub fn with_config(mut self, config: ReaderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> ReaderConfig {
        self.config
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn column_count(&self) -> usize {
        self.schema.len()
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn column(&self, index: usize) -> Result<ColumnReader<'_>> {
        let vector = self.vector(index)?;
        Ok(ColumnReader::new(self, index, vector))
    }

    pub fn column_by_name(&self, name: &str) -> Result<ColumnReader<'_>> {
        self.column(self.schema.index_of(name)?)
    }

    /// The described vector of column `index`, built on first use.
    pub fn vector(&self, index: usize) -> Result<&Vector> {
        let slot = self.vectors.get(index).ok_or(Error::IndexOutOfRange {
            index,
            len: self.vectors.len(),
        })?;
        if let Some(vector) = slot.get() {
            return Ok(vector);
        }
        let descriptor = self.schema.column(index)?.descriptor.clone();
        let native = self.native.vector(index)?;
        let vector = Vector::with_descriptor(native, descriptor, self.rows)?;
        // A racing initializer may win; both built the same description.
        let _ = slot.set(vector);
        slot.get()
            .ok_or_else(|| Error::Internal(format!("vector {index} was not initialized")))
    }

    fn plan<T: HostValue>(&self, index: usize) -> Result<Converter<T>> {
        let descriptor = &self.schema.column(index)?.descriptor;
        self.plans
            .get_or_insert(index, TargetKey::Static(TypeId::of::<T>()), || {
                resolve::<T>(descriptor)
            })
    }

    /// Bound converter reading column `index` as `T`.
    pub(crate) fn converter<T: HostValue>(&self, index: usize) -> Result<Converter<T>> {
        let vector = self.vector(index)?;
        let bind = || self.plan::<T>(index)?.prepare(vector);
        let converter = if self.config.cache_converters {
            self.bound
                .get_or_insert(index, TargetKey::Static(TypeId::of::<T>()), bind)?
        } else {
            bind()?
        };
        debug_assert_eq!(converter.target(), &T::host_type());
        Ok(converter)
    }

    /// Bound runtime-keyed converter reading column `index` as `target`.
    pub(crate) fn dynamic_converter(
        &self,
        index: usize,
        target: &HostType,
    ) -> Result<Converter<Value>> {
        let vector = self.vector(index)?;
        let descriptor = &self.schema.column(index)?.descriptor;
        let key = TargetKey::Dynamic(target.clone());
        let bind = || {
            self.plans
                .get_or_insert(index, key.clone(), || resolve_dynamic(descriptor, target))?
                .prepare(vector)
        };
        let converter = if self.config.cache_converters {
            self.bound.get_or_insert(index, key.clone(), bind)?
        } else {
            bind()?
        };
        debug_assert_eq!(converter.target(), target);
        Ok(converter)
    }
}
