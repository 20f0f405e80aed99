/// Caching behaviour of chunk readers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReaderConfig {
    /// Keep bound converters per chunk, keyed by column and target, so
    /// repeated reads of one column skip resolution and binding.
    pub cache_converters: bool,
    /// Share resolved plans across every chunk of a result. Plans depend
    /// only on the schema; turning this off resolves them per chunk.
    pub share_plans: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            cache_converters: true,
            share_plans: true,
        }
    }
}
