//! LIST and ARRAY targets.
//!
//! The plan owns the element plan; binding fetches the children vector once
//! and binds the element plan to it. A read slices the children by the row's
//! `{offset, length}` entry (or `index * size` for arrays) and converts every
//! element with nulls required to be representable.

use std::any::{Any, TypeId};
use std::sync::Arc;

use colview_result::{Error, Result};
use colview_types::{HostType, Value, ValueKind};
use colview_vector::{ColumnDescriptor, Vector, compat};

use crate::converter::{Binder, Converter, ElementReader};
use crate::host::HostValue;
use crate::text;

/// Collects converted elements into the row's host value.
pub(crate) type Finish<T, C> = fn(Vec<T>) -> C;

struct ListPlan<T, C> {
    element: Converter<T>,
    array_size: Option<usize>,
    finish: Finish<T, C>,
}

impl<T: HostValue, C: 'static> Binder<C> for ListPlan<T, C> {
    fn bind(&self, vector: &Vector) -> Result<Arc<dyn ElementReader<C>>> {
        let children = match self.array_size {
            Some(_) => vector.array_children()?,
            None => vector.list_children()?,
        };
        let element = self.element.prepare(&children)?;
        Ok(Arc::new(BoundList {
            element,
            children,
            array_size: self.array_size,
            finish: self.finish,
        }))
    }
}

struct BoundList<T, C> {
    element: Converter<T>,
    children: Vector,
    array_size: Option<usize>,
    finish: Finish<T, C>,
}

/// Child range `[start, end)` of row `index`, checked against `child_len`.
///
/// # Safety
///
/// `index < vector.len()`; without `array_size` the vector is a LIST or MAP.
pub(crate) unsafe fn child_range(
    vector: &Vector,
    index: usize,
    array_size: Option<usize>,
    child_len: usize,
) -> Result<(usize, usize)> {
    let malformed = |offset: u64, length: u64| {
        Error::Native(format!(
            "list entry {index} {{offset: {offset}, length: {length}}} \
             exceeds {child_len} child elements"
        ))
    };
    let (offset, length) = match array_size {
        Some(size) => (index * size, size),
        None => {
            // SAFETY: forwarded from the caller; LIST and MAP slots are entries.
            let entry = unsafe { vector.list_entry(index) };
            match (usize::try_from(entry.offset), usize::try_from(entry.length)) {
                (Ok(offset), Ok(length)) => (offset, length),
                _ => return Err(malformed(entry.offset, entry.length)),
            }
        }
    };
    match offset.checked_add(length) {
        Some(end) if end <= child_len => Ok((offset, end)),
        _ => Err(malformed(offset as u64, length as u64)),
    }
}

impl<T: HostValue, C> ElementReader<C> for BoundList<T, C> {
    unsafe fn read(&self, vector: &Vector, index: usize) -> Result<C> {
        // SAFETY: forwarded from the caller.
        let (start, end) =
            unsafe { child_range(vector, index, self.array_size, self.children.len()) }?;
        let mut out = Vec::with_capacity(end - start);
        for child in start..end {
            out.push(self.element.convert(&self.children, child, true)?);
        }
        Ok((self.finish)(out))
    }
}

/// Plan for a LIST or ARRAY column given its element plan.
pub(crate) fn resolve_list<T, C>(
    column: &ColumnDescriptor,
    element: Converter<T>,
    finish: Finish<T, C>,
) -> Result<Converter<C>>
where
    T: HostValue,
    C: HostValue,
{
    let array_size = match column.kind() {
        ValueKind::List => None,
        ValueKind::Array => column.array_size(),
        _ => return Err(compat::mismatch(column, &C::host_type())),
    };
    let plan = ListPlan {
        element,
        array_size,
        finish,
    };
    Ok(Converter::unbound(column, plan, false))
}

/// Element descriptor of a LIST or ARRAY, or the mismatch error for `target`.
pub(crate) fn element_column(
    column: &ColumnDescriptor,
    target: &HostType,
) -> Result<ColumnDescriptor> {
    match column.kind() {
        ValueKind::List | ValueKind::Array => column.child(),
        _ => Err(compat::mismatch(column, target)),
    }
}

fn is_bytes<T: 'static>() -> bool {
    TypeId::of::<T>() == TypeId::of::<u8>()
}

/// Hand a converter built for a concrete type back as the generic one.
fn cast_converter<A: 'static, B: 'static>(converter: Converter<A>) -> Result<Converter<B>> {
    let erased: Box<dyn Any> = Box::new(converter);
    erased
        .downcast::<Converter<B>>()
        .map(|converter| *converter)
        .map_err(|_| Error::Internal("converter type does not match its target".into()))
}

fn into_values<T: HostValue>(items: impl IntoIterator<Item = T>) -> Value {
    Value::List(items.into_iter().map(HostValue::into_value).collect())
}

impl<T: HostValue> HostValue for Vec<T> {
    fn host_type() -> HostType {
        HostType::list(T::host_type())
    }

    fn resolve(column: &ColumnDescriptor) -> Result<Converter<Self>> {
        if is_bytes::<T>() && column.kind() == ValueKind::Blob {
            return cast_converter(Converter::<Vec<u8>>::stateless(column, text::read_blob));
        }
        let element = T::resolve(&element_column(column, &Self::host_type())?)?;
        resolve_list(column, element, |items| items)
    }

    fn missing() -> Self {
        Vec::new()
    }

    fn into_value(self) -> Value {
        if is_bytes::<T>() {
            let erased: Box<dyn Any> = Box::new(self);
            return match erased.downcast::<Vec<u8>>() {
                Ok(bytes) => Value::Blob(*bytes),
                Err(erased) => match erased.downcast::<Vec<T>>() {
                    Ok(items) => into_values(*items),
                    Err(_) => Value::Null,
                },
            };
        }
        into_values(self)
    }
}

impl<T: HostValue> HostValue for Box<[T]> {
    fn host_type() -> HostType {
        HostType::fixed_list(T::host_type())
    }

    fn resolve(column: &ColumnDescriptor) -> Result<Converter<Self>> {
        if is_bytes::<T>() && column.kind() == ValueKind::Blob {
            return cast_converter(Converter::<Box<[u8]>>::stateless(
                column,
                text::read_blob_boxed_slice,
            ));
        }
        let element = T::resolve(&element_column(column, &Self::host_type())?)?;
        resolve_list(column, element, Vec::into_boxed_slice)
    }

    fn missing() -> Self {
        Box::default()
    }

    fn into_value(self) -> Value {
        self.into_vec().into_value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use colview_native::{ListEntry, MemVector};
    use colview_types::LogicalType;

    fn list_vector(rows: &[Value], child: ValueKind) -> Vector {
        let native = MemVector::from_values(LogicalType::list(child), rows)
            .unwrap()
            .into_handle();
        Vector::from_native(native, rows.len()).unwrap()
    }

    fn ints(items: &[i32]) -> Value {
        Value::List(items.iter().copied().map(Value::Integer).collect())
    }

    #[test]
    fn reads_rows_and_empty_lists() {
        let v = list_vector(&[ints(&[10, 20, 30]), ints(&[]), Value::Null], ValueKind::Integer);
        let plan = Vec::<i64>::resolve(v.column()).unwrap();
        assert!(!plan.is_bound());
        let conv = plan.bind_to_vector(&v).unwrap();
        assert_eq!(conv.convert(&v, 0, true).unwrap(), vec![10, 20, 30]);
        assert!(conv.convert(&v, 1, true).unwrap().is_empty());
        assert_eq!(conv.try_convert(&v, 2).unwrap(), None);
    }

    #[test]
    fn null_element_requires_optional() {
        let row = Value::List(vec![Value::Integer(1), Value::Null]);
        let v = list_vector(&[row], ValueKind::Integer);
        let strict = Vec::<i32>::resolve(v.column()).unwrap().prepare(&v).unwrap();
        assert!(matches!(
            strict.convert(&v, 0, true),
            Err(Error::NullViolation { index: 1, .. })
        ));
        let lenient = Vec::<Option<i32>>::resolve(v.column())
            .unwrap()
            .prepare(&v)
            .unwrap();
        assert_eq!(lenient.convert(&v, 0, true).unwrap(), vec![Some(1), None]);
    }

    #[test]
    fn malformed_entry_is_native_error() {
        let child = MemVector::primitive(&[Some(1i32), Some(2)]).into_handle();
        let native = MemVector::from_list_parts(
            LogicalType::list(ValueKind::Integer),
            &[ListEntry::new(1, 5)],
            None,
            child,
            2,
        )
        .unwrap()
        .into_handle();
        let v = Vector::from_native(native, 1).unwrap();
        let conv = Vec::<i32>::resolve(v.column()).unwrap().prepare(&v).unwrap();
        assert!(matches!(conv.convert(&v, 0, true), Err(Error::Native(_))));
    }

    #[test]
    fn arrays_and_blobs() {
        let rows = [ints(&[1, 2]), ints(&[3, 4])];
        let native = MemVector::from_values(LogicalType::array(ValueKind::Integer, 2), &rows)
            .unwrap()
            .into_handle();
        let v = Vector::from_native(native, 2).unwrap();
        let conv = Box::<[i32]>::resolve(v.column()).unwrap().prepare(&v).unwrap();
        assert_eq!(&*conv.convert(&v, 1, true).unwrap(), &[3, 4]);

        let blob = MemVector::from_values(
            LogicalType::from(ValueKind::Blob),
            &[Value::Blob(vec![0xde, 0xad])],
        )
        .unwrap()
        .into_handle();
        let b = Vector::from_native(blob, 1).unwrap();
        let bytes = Vec::<u8>::resolve(b.column()).unwrap();
        assert!(bytes.is_bound());
        assert_eq!(bytes.convert(&b, 0, true).unwrap(), vec![0xde, 0xad]);
        assert_eq!(vec![1u8].into_value(), Value::Blob(vec![1]));
    }
}
