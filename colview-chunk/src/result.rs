use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

use colview_convert::{HostValue, resolve};
use colview_native::NativeResult;
use colview_result::Result;
use tracing::debug;

use crate::cache::{ConverterCache, TargetKey};
use crate::chunk::DataChunk;
use crate::config::ReaderConfig;
use crate::schema::Schema;

/// A streaming query result: a schema and a sequence of chunks.
pub struct QueryResult {
    native: Box<dyn NativeResult>,
    schema: Arc<Schema>,
    config: ReaderConfig,
    plans: Arc<ConverterCache>,
}

impl fmt::Debug for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryResult")
            .field("schema", &self.schema)
            .field("config", &self.config)
            .finish()
    }
}

impl QueryResult {
    /// Read the result's column names and types.
    pub fn new<R: NativeResult + 'static>(native: R) -> Result<Self> {
        let columns = (0..native.column_count())
            .map(|i| Ok((native.column_name(i)?, native.column_type(i)?)))
            .collect::<Result<Vec<_>>>()?;
        let schema = Arc::new(Schema::new(columns)?);
        debug!(columns = schema.len(), "opened query result");
        Ok(Self {
            native: Box::new(native),
            schema,
            config: ReaderConfig::default(),
            plans: Arc::new(ConverterCache::new()),
        })
    }

    pub fn with_config(mut self, config: ReaderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Pre-flight check that column `index` can be read as `T`, resolving the
    /// plan ahead of the first chunk.
    pub fn check_type<T: HostValue>(&self, index: usize) -> Result<()> {
        let descriptor = &self.schema.column(index)?.descriptor;
        self.plans
            .get_or_insert(index, TargetKey::Static(TypeId::of::<T>()), || {
                resolve::<T>(descriptor)
            })
            .map(|_| ())
    }

    /// Fetch the next chunk, `None` once the result is exhausted.
    pub fn next_chunk(&mut self) -> Result<Option<DataChunk>> {
        let Some(native) = self.native.fetch_chunk()? else {
            return Ok(None);
        };
        let plans = self.config.share_plans.then(|| Arc::clone(&self.plans));
        DataChunk::with_schema(native, Arc::clone(&self.schema), self.config, plans).map(Some)
    }

    /// Iterate the remaining chunks.
    pub fn chunks(&mut self) -> impl Iterator<Item = Result<DataChunk>> + '_ {
        std::iter::from_fn(move || self.next_chunk().transpose())
    }
}
