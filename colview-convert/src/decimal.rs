//! DECIMAL targets.

use colview_result::Result;
use colview_types::{DecimalValue, HostType, Value, ValueKind};
use colview_vector::{ColumnDescriptor, Vector, compat};
use rust_decimal::Decimal;

use crate::converter::{Converter, ReadFn};
use crate::host::HostValue;

#[inline]
unsafe fn read_raw<S: Copy + Into<i128>>(vector: &Vector, index: usize) -> DecimalValue {
    // SAFETY: `S` is the decimal's storage kind.
    let value: i128 = unsafe { vector.read_unchecked::<S>(index) }.into();
    DecimalValue::new(value, vector.column().scale())
}

unsafe fn read_decimal_value<S: Copy + Into<i128>>(
    vector: &Vector,
    index: usize,
) -> Result<DecimalValue> {
    // SAFETY: forwarded from the caller.
    Ok(unsafe { read_raw::<S>(vector, index) })
}

unsafe fn read_decimal<S: Copy + Into<i128>>(vector: &Vector, index: usize) -> Result<Decimal> {
    // SAFETY: forwarded from the caller.
    unsafe { read_raw::<S>(vector, index) }.to_decimal()
}

unsafe fn read_f64<S: Copy + Into<i128>>(vector: &Vector, index: usize) -> Result<f64> {
    // SAFETY: forwarded from the caller.
    Ok(unsafe { read_raw::<S>(vector, index) }.to_f64())
}

/// Boxes as `Value::Decimal`, falling back to the raw scaled integer when the
/// value exceeds `rust_decimal`'s 96-bit mantissa.
unsafe fn read_boxed<S: Copy + Into<i128>>(vector: &Vector, index: usize) -> Result<Value> {
    // SAFETY: forwarded from the caller.
    let raw = unsafe { read_raw::<S>(vector, index) };
    Ok(raw
        .to_decimal()
        .map_or(Value::RawDecimal(raw), Value::Decimal))
}

/// Pick the instantiation of `$read` matching the decimal storage width.
macro_rules! by_storage {
    ($column:expr, $target:expr, $read:ident) => {
        match $column.storage() {
            ValueKind::SmallInt if $column.kind() == ValueKind::Decimal => $read::<i16>,
            ValueKind::Integer if $column.kind() == ValueKind::Decimal => $read::<i32>,
            ValueKind::BigInt if $column.kind() == ValueKind::Decimal => $read::<i64>,
            ValueKind::HugeInt if $column.kind() == ValueKind::Decimal => $read::<i128>,
            _ => return Err(compat::mismatch($column, &$target)),
        }
    };
}

pub(crate) fn f64_reader(column: &ColumnDescriptor) -> Result<ReadFn<f64>> {
    Ok(by_storage!(column, HostType::F64, read_f64))
}

pub(crate) fn boxed_reader(column: &ColumnDescriptor) -> Result<ReadFn<Value>> {
    Ok(by_storage!(column, HostType::Value, read_boxed))
}

impl HostValue for Decimal {
    fn host_type() -> HostType {
        HostType::Decimal
    }

    fn resolve(column: &ColumnDescriptor) -> Result<Converter<Self>> {
        let read: ReadFn<Self> = by_storage!(column, Self::host_type(), read_decimal);
        Ok(Converter::stateless(column, read))
    }

    fn missing() -> Self {
        Decimal::ZERO
    }

    fn into_value(self) -> Value {
        Value::Decimal(self)
    }
}

impl HostValue for DecimalValue {
    fn host_type() -> HostType {
        HostType::DecimalValue
    }

    fn resolve(column: &ColumnDescriptor) -> Result<Converter<Self>> {
        let read: ReadFn<Self> = by_storage!(column, Self::host_type(), read_decimal_value);
        Ok(Converter::stateless(column, read))
    }

    fn missing() -> Self {
        DecimalValue::default()
    }

    fn into_value(self) -> Value {
        Value::RawDecimal(self)
    }
}
