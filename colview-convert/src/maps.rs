//! MAP targets. A MAP is a LIST of STRUCT(key, value) entries.

use std::collections::HashMap;
use std::hash::{BuildHasher, Hash};
use std::sync::Arc;

use colview_result::Result;
use colview_types::{HostType, MapValue, Value, ValueKind};
use colview_vector::{ColumnDescriptor, Vector, compat};

use crate::boxed;
use crate::converter::{Binder, Converter, ElementReader};
use crate::host::HostValue;
use crate::list::child_range;

pub(crate) type FinishMap<K, V, C> = fn(Vec<(K, V)>) -> C;

struct MapPlan<K, V, C> {
    key: Converter<K>,
    value: Converter<V>,
    finish: FinishMap<K, V, C>,
}

impl<K: HostValue, V: HostValue, C: 'static> Binder<C> for MapPlan<K, V, C> {
    fn bind(&self, vector: &Vector) -> Result<Arc<dyn ElementReader<C>>> {
        let entries = vector.list_children()?;
        let keys = entries.struct_member(0)?;
        let values = entries.struct_member(1)?;
        Ok(Arc::new(BoundMap {
            key: self.key.prepare(&keys)?,
            value: self.value.prepare(&values)?,
            keys,
            values,
            finish: self.finish,
        }))
    }
}

struct BoundMap<K, V, C> {
    key: Converter<K>,
    value: Converter<V>,
    keys: Vector,
    values: Vector,
    finish: FinishMap<K, V, C>,
}

impl<K: HostValue, V: HostValue, C> ElementReader<C> for BoundMap<K, V, C> {
    unsafe fn read(&self, vector: &Vector, index: usize) -> Result<C> {
        // SAFETY: forwarded from the caller.
        let (start, end) = unsafe { child_range(vector, index, None, self.keys.len()) }?;
        let mut pairs = Vec::with_capacity(end - start);
        for entry in start..end {
            let key = self.key.convert(&self.keys, entry, true)?;
            let value = self.value.convert(&self.values, entry, true)?;
            pairs.push((key, value));
        }
        Ok((self.finish)(pairs))
    }
}

/// Plan for a MAP column given key and value plans.
pub(crate) fn resolve_map<K, V, C>(
    column: &ColumnDescriptor,
    key: Converter<K>,
    value: Converter<V>,
    finish: FinishMap<K, V, C>,
) -> Result<Converter<C>>
where
    K: HostValue,
    V: HostValue,
    C: HostValue,
{
    if column.kind() != ValueKind::Map {
        return Err(compat::mismatch(column, &C::host_type()));
    }
    Ok(Converter::unbound(column, MapPlan { key, value, finish }, false))
}

/// Key and value descriptors, or the mismatch error for `target`.
pub(crate) fn key_value_columns(
    column: &ColumnDescriptor,
    target: &HostType,
) -> Result<(ColumnDescriptor, ColumnDescriptor)> {
    match column.kind() {
        ValueKind::Map => column.map_key_value(),
        _ => Err(compat::mismatch(column, target)),
    }
}

impl HostValue for MapValue {
    fn host_type() -> HostType {
        HostType::MapValue
    }

    fn resolve(column: &ColumnDescriptor) -> Result<Converter<Self>> {
        let (key, value) = key_value_columns(column, &Self::host_type())?;
        resolve_map(
            column,
            boxed::resolve_boxed(&key)?,
            boxed::resolve_boxed(&value)?,
            MapValue,
        )
    }

    fn missing() -> Self {
        MapValue::default()
    }

    fn into_value(self) -> Value {
        Value::Map(self)
    }
}

impl<K, V, S> HostValue for HashMap<K, V, S>
where
    K: HostValue + Eq + Hash,
    V: HostValue,
    S: BuildHasher + Default + Send + Sync + 'static,
{
    fn host_type() -> HostType {
        HostType::map(K::host_type(), V::host_type())
    }

    fn resolve(column: &ColumnDescriptor) -> Result<Converter<Self>> {
        let (key, value) = key_value_columns(column, &Self::host_type())?;
        resolve_map(
            column,
            K::resolve(&key)?,
            V::resolve(&value)?,
            |pairs| pairs.into_iter().collect(),
        )
    }

    fn missing() -> Self {
        HashMap::default()
    }

    fn into_value(self) -> Value {
        Value::Map(MapValue(
            self.into_iter()
                .map(|(k, v)| (k.into_value(), v.into_value()))
                .collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use colview_native::MemVector;
    use colview_result::Error;
    use colview_types::LogicalType;
    use rustc_hash::FxHashMap;

    fn map_vector(rows: &[Value]) -> Vector {
        let ty = LogicalType::map(ValueKind::Varchar, ValueKind::Integer);
        let native = MemVector::from_values(ty, rows).unwrap().into_handle();
        Vector::from_native(native, rows.len()).unwrap()
    }

    fn entry(key: &str, value: Value) -> (Value, Value) {
        (Value::Text(key.into()), value)
    }

    #[test]
    fn ordered_pairs_keep_nulls() {
        let rows = [Value::Map(MapValue(vec![
            entry("b", Value::Integer(2)),
            entry("a", Value::Null),
        ]))];
        let v = map_vector(&rows);
        let conv = MapValue::resolve(v.column()).unwrap().prepare(&v).unwrap();
        let map = conv.convert(&v, 0, true).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.entries()[0], entry("b", Value::Integer(2)));
        assert_eq!(map.get(&Value::Text("a".into())), Some(&Value::Null));
    }

    #[test]
    fn typed_hash_map() {
        let rows = [
            Value::Map(MapValue(vec![
                entry("x", Value::Integer(1)),
                entry("y", Value::Integer(2)),
            ])),
            Value::Map(MapValue(vec![entry("z", Value::Null)])),
        ];
        let v = map_vector(&rows);
        let conv = FxHashMap::<String, i64>::resolve(v.column())
            .unwrap()
            .prepare(&v)
            .unwrap();
        let first = conv.convert(&v, 0, true).unwrap();
        assert_eq!(first.get("y"), Some(&2));
        assert!(matches!(
            conv.convert(&v, 1, true),
            Err(Error::NullViolation { .. })
        ));

        let optional = HashMap::<String, Option<i32>>::resolve(v.column())
            .unwrap()
            .prepare(&v)
            .unwrap();
        assert_eq!(optional.convert(&v, 1, true).unwrap()["z"], None);
    }
}
