//! Type-erased converter caches.
//!
//! Entries are keyed by column index and target; racing writers may both
//! compute a converter, the first insert wins and the loser adopts it.

use std::any::{Any, TypeId};
use std::sync::{Arc, RwLock};

use colview_convert::Converter;
use colview_result::{Error, Result};
use colview_types::HostType;
use rustc_hash::FxHashMap;
use tracing::trace;

/// Identity of a converter's target within one column.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) enum TargetKey {
    /// A statically typed target.
    Static(TypeId),
    /// A runtime-keyed target read as `Value`.
    Dynamic(HostType),
}

type Entry = Arc<dyn Any + Send + Sync>;

#[derive(Default)]
pub(crate) struct ConverterCache {
    entries: RwLock<FxHashMap<(usize, TargetKey), Entry>>,
}

impl ConverterCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// The cached converter for `(column, key)`, computing it with `build` on
    /// a miss.
    pub(crate) fn get_or_insert<T, F>(
        &self,
        column: usize,
        key: TargetKey,
        build: F,
    ) -> Result<Converter<T>>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Result<Converter<T>>,
    {
        let slot = (column, key);
        {
            let entries = self.entries.read().map_err(|_| poisoned())?;
            if let Some(entry) = entries.get(&slot) {
                trace!(column, "converter cache hit");
                return downcast(entry);
            }
        }
        trace!(column, "converter cache miss");
        let built: Entry = Arc::new(build()?);
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        let entry = entries.entry(slot).or_insert(built);
        downcast(entry)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }
}

fn downcast<T: Send + Sync + 'static>(entry: &Entry) -> Result<Converter<T>> {
    entry
        .downcast_ref::<Converter<T>>()
        .cloned()
        .ok_or_else(|| Error::Internal("cached converter has an unexpected type".into()))
}

fn poisoned() -> Error {
    Error::Internal("converter cache lock poisoned".into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use colview_convert::resolve;
    use colview_types::ValueKind;
    use colview_vector::ColumnDescriptor;

    #[test]
    fn first_insert_wins() {
        let cache = ConverterCache::new();
        let column = ColumnDescriptor::from_logical_type(ValueKind::Integer.into()).unwrap();
        let key = TargetKey::Static(TypeId::of::<i64>());
        let first = cache
            .get_or_insert(0, key.clone(), || resolve::<i64>(&column))
            .unwrap();
        let second = cache
            .get_or_insert(0, key, || -> Result<Converter<i64>> {
                panic!("cached entry must be reused")
            })
            .unwrap();
        assert_eq!(first.target(), second.target());
        assert_eq!(cache.len(), 1);
    }
}
