//! Numeric and boolean targets.
//!
//! A matching layout is one unaligned load; a widening read loads the source
//! slot and converts with `From`. `Option<T>` and boxed reads get their own
//! functions so they skip the mapping layer.

use colview_result::Result;
use colview_types::{HostType, NativePrimitive, Value, ValueKind};
use colview_vector::{ColumnDescriptor, Vector, compat};

use crate::converter::{Converter, ReadFn};
use crate::decimal;
use crate::host::HostValue;

#[inline]
unsafe fn read_widen<S: Copy, H: From<S>>(vector: &Vector, index: usize) -> Result<H> {
    // SAFETY: the caller resolved `S` from the vector's slot kind.
    Ok(H::from(unsafe { vector.read_unchecked::<S>(index) }))
}

#[inline]
unsafe fn read_widen_some<S: Copy, H: From<S>>(
    vector: &Vector,
    index: usize,
) -> Result<Option<H>> {
    // SAFETY: as above.
    Ok(Some(H::from(unsafe { vector.read_unchecked::<S>(index) })))
}

/// Boxed read of a primitive slot.
#[inline]
pub(crate) unsafe fn read_boxed<T: NativePrimitive + HostValue>(
    vector: &Vector,
    index: usize,
) -> Result<Value> {
    // SAFETY: `T::KIND` matches the vector's kind.
    Ok(unsafe { vector.read_unchecked::<T>(index) }.into_value())
}

#[inline]
pub(crate) unsafe fn read_bool(vector: &Vector, index: usize) -> Result<bool> {
    // SAFETY: BOOLEAN slots are one byte.
    Ok(unsafe { vector.read_unchecked::<u8>(index) } != 0)
}

#[inline]
unsafe fn read_bool_some(vector: &Vector, index: usize) -> Result<Option<bool>> {
    // SAFETY: forwarded from the caller.
    unsafe { read_bool(vector, index) }.map(Some)
}

#[inline]
pub(crate) unsafe fn read_bool_boxed(vector: &Vector, index: usize) -> Result<Value> {
    // SAFETY: forwarded from the caller.
    unsafe { read_bool(vector, index) }.map(Value::Boolean)
}

/// Slot kind a numeric read loads: ENUM columns read their code.
fn slot_kind(column: &ColumnDescriptor) -> ValueKind {
    if column.kind() == ValueKind::Enum {
        column.storage()
    } else {
        column.kind()
    }
}

macro_rules! primitive_host {
    ($ty:ty, $host:ident, $boxed:ident, [$($kind:ident => $src:ty),+ $(,)?]) => {
        impl HostValue for $ty {
            fn host_type() -> HostType {
                HostType::$host
            }

            fn resolve(column: &ColumnDescriptor) -> Result<Converter<Self>> {
                let read: ReadFn<Self> = match slot_kind(column) {
                    $(ValueKind::$kind => read_widen::<$src, Self>,)+
                    _ => return Err(compat::mismatch(column, &Self::host_type())),
                };
                Ok(Converter::stateless(column, read))
            }

            fn resolve_optional(column: &ColumnDescriptor) -> Result<Converter<Option<Self>>> {
                let read: ReadFn<Option<Self>> = match slot_kind(column) {
                    $(ValueKind::$kind => read_widen_some::<$src, Self>,)+
                    _ => {
                        let target = HostType::optional(Self::host_type());
                        return Err(compat::mismatch(column, &target));
                    }
                };
                Ok(Converter::stateless(column, read))
            }

            fn missing() -> Self {
                <$ty>::default()
            }

            fn into_value(self) -> Value {
                Value::$boxed(self)
            }
        }
    };
}

primitive_host!(i8, I8, TinyInt, [TinyInt => i8]);
primitive_host!(i16, I16, SmallInt, [TinyInt => i8, SmallInt => i16, UTinyInt => u8]);
primitive_host!(
    i32,
    I32,
    Integer,
    [TinyInt => i8, SmallInt => i16, Integer => i32, UTinyInt => u8, USmallInt => u16]
);
primitive_host!(
    i64,
    I64,
    BigInt,
    [
        TinyInt => i8,
        SmallInt => i16,
        Integer => i32,
        BigInt => i64,
        UTinyInt => u8,
        USmallInt => u16,
        UInteger => u32,
    ]
);
primitive_host!(
    i128,
    I128,
    HugeInt,
    [
        TinyInt => i8,
        SmallInt => i16,
        Integer => i32,
        BigInt => i64,
        HugeInt => i128,
        UTinyInt => u8,
        USmallInt => u16,
        UInteger => u32,
        UBigInt => u64,
    ]
);
primitive_host!(u8, U8, UTinyInt, [UTinyInt => u8]);
primitive_host!(u16, U16, USmallInt, [UTinyInt => u8, USmallInt => u16]);
primitive_host!(u32, U32, UInteger, [UTinyInt => u8, USmallInt => u16, UInteger => u32]);
primitive_host!(
    u64,
    U64,
    UBigInt,
    [UTinyInt => u8, USmallInt => u16, UInteger => u32, UBigInt => u64]
);
primitive_host!(
    u128,
    U128,
    UHugeInt,
    [
        UTinyInt => u8,
        USmallInt => u16,
        UInteger => u32,
        UBigInt => u64,
        UHugeInt => u128,
    ]
);
primitive_host!(f32, F32, Float, [Float => f32]);

impl HostValue for f64 {
    fn host_type() -> HostType {
        HostType::F64
    }

    fn resolve(column: &ColumnDescriptor) -> Result<Converter<Self>> {
        let read: ReadFn<Self> = match column.kind() {
            ValueKind::Float => read_widen::<f32, f64>,
            ValueKind::Double => read_widen::<f64, f64>,
            ValueKind::Decimal => decimal::f64_reader(column)?,
            _ => return Err(compat::mismatch(column, &Self::host_type())),
        };
        Ok(Converter::stateless(column, read))
    }

    fn resolve_optional(column: &ColumnDescriptor) -> Result<Converter<Option<Self>>> {
        match column.kind() {
            ValueKind::Float => Ok(Converter::stateless(column, read_widen_some::<f32, f64>)),
            ValueKind::Double => Ok(Converter::stateless(column, read_widen_some::<f64, f64>)),
            _ => Ok(Self::resolve(column)?.map(|value| Ok(Some(value)))),
        }
    }

    fn missing() -> Self {
        0.0
    }

    fn into_value(self) -> Value {
        Value::Double(self)
    }
}

impl HostValue for bool {
    fn host_type() -> HostType {
        HostType::Bool
    }

    fn resolve(column: &ColumnDescriptor) -> Result<Converter<Self>> {
        match column.kind() {
            ValueKind::Boolean => Ok(Converter::stateless(column, read_bool)),
            _ => Err(compat::mismatch(column, &Self::host_type())),
        }
    }

    fn resolve_optional(column: &ColumnDescriptor) -> Result<Converter<Option<Self>>> {
        match column.kind() {
            ValueKind::Boolean => Ok(Converter::stateless(column, read_bool_some)),
            _ => Err(compat::mismatch(column, &HostType::optional(Self::host_type()))),
        }
    }

    fn missing() -> Self {
        false
    }

    fn into_value(self) -> Value {
        Value::Boolean(self)
    }
}
