//! Date, time, timestamp and interval targets.
//!
//! Each target reads the raw slot and performs one conversion. Values with no
//! calendar form (infinities, `24:00:00`, out-of-range instants) fail with
//! [`Error::DomainMismatch`](colview_result::Error::DomainMismatch) for the
//! `time` types; the raw value types accept everything.

use colview_result::Result;
use colview_types::{
    DateValue, HostType, IntervalValue, TimeTzValue, TimeValue, TimestampValue, Value, ValueKind,
    slot_to_offset_date_time,
};
use colview_vector::{ColumnDescriptor, Vector, compat};
use time::{Date, Duration, OffsetDateTime, PrimitiveDateTime, Time};

use crate::converter::{Converter, ReadFn};
use crate::host::HostValue;

#[inline]
unsafe fn date_slot(vector: &Vector, index: usize) -> DateValue {
    // SAFETY: DATE slots are i32 days.
    DateValue::new(unsafe { vector.read_unchecked::<i32>(index) })
}

#[inline]
unsafe fn time_slot(vector: &Vector, index: usize) -> TimeValue {
    // SAFETY: TIME slots are i64 microseconds.
    TimeValue::new(unsafe { vector.read_unchecked::<i64>(index) })
}

#[inline]
unsafe fn timestamp_slot(vector: &Vector, index: usize) -> i64 {
    // SAFETY: every timestamp kind is an i64 slot.
    unsafe { vector.read_unchecked::<i64>(index) }
}

fn utc_wall_clock(dt: OffsetDateTime) -> PrimitiveDateTime {
    PrimitiveDateTime::new(dt.date(), dt.time())
}

unsafe fn read_date(vector: &Vector, index: usize) -> Result<Date> {
    // SAFETY: forwarded from the caller.
    unsafe { date_slot(vector, index) }.to_date()
}

unsafe fn read_date_value(vector: &Vector, index: usize) -> Result<DateValue> {
    // SAFETY: forwarded from the caller.
    Ok(unsafe { date_slot(vector, index) })
}

unsafe fn read_date_midnight(vector: &Vector, index: usize) -> Result<PrimitiveDateTime> {
    // SAFETY: forwarded from the caller.
    Ok(unsafe { date_slot(vector, index) }.to_date()?.midnight())
}

unsafe fn read_time(vector: &Vector, index: usize) -> Result<Time> {
    // SAFETY: forwarded from the caller.
    unsafe { time_slot(vector, index) }.to_time()
}

unsafe fn read_time_value(vector: &Vector, index: usize) -> Result<TimeValue> {
    // SAFETY: forwarded from the caller.
    Ok(unsafe { time_slot(vector, index) })
}

unsafe fn read_time_tz(vector: &Vector, index: usize) -> Result<TimeTzValue> {
    // SAFETY: TIME_TZ slots are the packed u64 form.
    Ok(TimeTzValue::from_bits(unsafe {
        vector.read_unchecked::<u64>(index)
    }))
}

unsafe fn read_offset_date_time(vector: &Vector, index: usize) -> Result<OffsetDateTime> {
    // SAFETY: forwarded from the caller.
    let raw = unsafe { timestamp_slot(vector, index) };
    slot_to_offset_date_time(raw, vector.kind())
}

unsafe fn read_primitive_date_time(vector: &Vector, index: usize) -> Result<PrimitiveDateTime> {
    // SAFETY: forwarded from the caller.
    unsafe { read_offset_date_time(vector, index) }.map(utc_wall_clock)
}

unsafe fn read_timestamp_value(vector: &Vector, index: usize) -> Result<TimestampValue> {
    // SAFETY: forwarded from the caller.
    let raw = unsafe { timestamp_slot(vector, index) };
    TimestampValue::from_slot(raw, vector.kind())
}

unsafe fn read_interval(vector: &Vector, index: usize) -> Result<IntervalValue> {
    // SAFETY: INTERVAL slots have the `#[repr(C)]` layout of IntervalValue.
    Ok(unsafe { vector.read_unchecked::<IntervalValue>(index) })
}

unsafe fn read_duration(vector: &Vector, index: usize) -> Result<Duration> {
    // SAFETY: forwarded from the caller.
    unsafe { read_interval(vector, index) }?.to_duration()
}

pub(crate) unsafe fn read_date_boxed(vector: &Vector, index: usize) -> Result<Value> {
    // SAFETY: forwarded from the caller.
    let raw = unsafe { date_slot(vector, index) };
    Ok(raw.to_date().map_or(Value::RawDate(raw), Value::Date))
}

pub(crate) unsafe fn read_time_boxed(vector: &Vector, index: usize) -> Result<Value> {
    // SAFETY: forwarded from the caller.
    let raw = unsafe { time_slot(vector, index) };
    Ok(raw.to_time().map_or(Value::RawTime(raw), Value::Time))
}

pub(crate) unsafe fn read_time_tz_boxed(vector: &Vector, index: usize) -> Result<Value> {
    // SAFETY: forwarded from the caller.
    unsafe { read_time_tz(vector, index) }.map(Value::TimeTz)
}

pub(crate) unsafe fn read_timestamp_boxed(vector: &Vector, index: usize) -> Result<Value> {
    // SAFETY: forwarded from the caller.
    let raw = unsafe { timestamp_slot(vector, index) };
    let kind = vector.kind();
    match slot_to_offset_date_time(raw, kind) {
        Ok(dt) if kind == ValueKind::TimestampTz => Ok(Value::TimestampTz(dt)),
        Ok(dt) => Ok(Value::Timestamp(utc_wall_clock(dt))),
        Err(_) => TimestampValue::from_slot(raw, kind).map(Value::RawTimestamp),
    }
}

pub(crate) unsafe fn read_interval_boxed(vector: &Vector, index: usize) -> Result<Value> {
    // SAFETY: forwarded from the caller.
    unsafe { read_interval(vector, index) }.map(Value::Interval)
}

fn is_timestamp(column: &ColumnDescriptor) -> bool {
    column.kind().is_timestamp()
}

/// Resolve a leaf target read from exactly one source kind.
fn resolve_leaf<T: HostValue>(
    column: &ColumnDescriptor,
    accepts: bool,
    read: ReadFn<T>,
) -> Result<Converter<T>> {
    if accepts {
        Ok(Converter::stateless(column, read))
    } else {
        Err(compat::mismatch(column, &T::host_type()))
    }
}

fn unix_epoch() -> PrimitiveDateTime {
    utc_wall_clock(OffsetDateTime::UNIX_EPOCH)
}

impl HostValue for Date {
    fn host_type() -> HostType {
        HostType::Date
    }

    fn resolve(column: &ColumnDescriptor) -> Result<Converter<Self>> {
        resolve_leaf(column, column.kind() == ValueKind::Date, read_date)
    }

    fn missing() -> Self {
        unix_epoch().date()
    }

    fn into_value(self) -> Value {
        Value::Date(self)
    }
}

impl HostValue for Time {
    fn host_type() -> HostType {
        HostType::Time
    }

    fn resolve(column: &ColumnDescriptor) -> Result<Converter<Self>> {
        resolve_leaf(column, column.kind() == ValueKind::Time, read_time)
    }

    fn missing() -> Self {
        Time::MIDNIGHT
    }

    fn into_value(self) -> Value {
        Value::Time(self)
    }
}

impl HostValue for PrimitiveDateTime {
    fn host_type() -> HostType {
        HostType::DateTime
    }

    fn resolve(column: &ColumnDescriptor) -> Result<Converter<Self>> {
        if column.kind() == ValueKind::Date {
            return Ok(Converter::stateless(column, read_date_midnight));
        }
        resolve_leaf(column, is_timestamp(column), read_primitive_date_time)
    }

    fn missing() -> Self {
        unix_epoch()
    }

    fn into_value(self) -> Value {
        Value::Timestamp(self)
    }
}

impl HostValue for OffsetDateTime {
    fn host_type() -> HostType {
        HostType::OffsetDateTime
    }

    fn resolve(column: &ColumnDescriptor) -> Result<Converter<Self>> {
        resolve_leaf(column, is_timestamp(column), read_offset_date_time)
    }

    fn missing() -> Self {
        OffsetDateTime::UNIX_EPOCH
    }

    fn into_value(self) -> Value {
        Value::TimestampTz(self)
    }
}

impl HostValue for Duration {
    fn host_type() -> HostType {
        HostType::Duration
    }

    fn resolve(column: &ColumnDescriptor) -> Result<Converter<Self>> {
        resolve_leaf(column, column.kind() == ValueKind::Interval, read_duration)
    }

    fn missing() -> Self {
        Duration::ZERO
    }

    fn into_value(self) -> Value {
        Value::Duration(self)
    }
}

impl HostValue for DateValue {
    fn host_type() -> HostType {
        HostType::DateValue
    }

    fn resolve(column: &ColumnDescriptor) -> Result<Converter<Self>> {
        resolve_leaf(column, column.kind() == ValueKind::Date, read_date_value)
    }

    fn missing() -> Self {
        DateValue::default()
    }

    fn into_value(self) -> Value {
        Value::RawDate(self)
    }
}

impl HostValue for TimeValue {
    fn host_type() -> HostType {
        HostType::TimeValue
    }

    fn resolve(column: &ColumnDescriptor) -> Result<Converter<Self>> {
        resolve_leaf(column, column.kind() == ValueKind::Time, read_time_value)
    }

    fn missing() -> Self {
        TimeValue::default()
    }

    fn into_value(self) -> Value {
        Value::RawTime(self)
    }
}

impl HostValue for TimeTzValue {
    fn host_type() -> HostType {
        HostType::TimeTzValue
    }

    fn resolve(column: &ColumnDescriptor) -> Result<Converter<Self>> {
        resolve_leaf(column, column.kind() == ValueKind::TimeTz, read_time_tz)
    }

    fn missing() -> Self {
        TimeTzValue::default()
    }

    fn into_value(self) -> Value {
        Value::TimeTz(self)
    }
}

impl HostValue for TimestampValue {
    fn host_type() -> HostType {
        HostType::TimestampValue
    }

    fn resolve(column: &ColumnDescriptor) -> Result<Converter<Self>> {
        resolve_leaf(column, is_timestamp(column), read_timestamp_value)
    }

    fn missing() -> Self {
        TimestampValue::default()
    }

    fn into_value(self) -> Value {
        Value::RawTimestamp(self)
    }
}

impl HostValue for IntervalValue {
    fn host_type() -> HostType {
        HostType::IntervalValue
    }

    fn resolve(column: &ColumnDescriptor) -> Result<Converter<Self>> {
        resolve_leaf(column, column.kind() == ValueKind::Interval, read_interval)
    }

    fn missing() -> Self {
        IntervalValue::zero()
    }

    fn into_value(self) -> Value {
        Value::Interval(self)
    }
}
