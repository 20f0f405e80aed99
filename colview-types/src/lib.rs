//! Type vocabulary shared by every colview crate.
//!
//! - [`ValueKind`] and [`LogicalType`] describe what the engine stores.
//! - [`HostType`] describes what a caller asks for.
//! - The leaf value types ([`DateValue`], [`DecimalValue`], [`BitString`], ...)
//!   mirror engine slot encodings that have no exact `std`/`time` equivalent.
//! - [`Value`] is the boxed form every column can be read as.

pub mod bits;
pub mod decimal;
pub mod host;
pub mod interval;
pub mod kind;
pub mod logical;
pub mod primitive;
pub mod temporal;
pub mod value;

pub use bits::{BitString, VarInt, uuid_from_hugeint, uuid_to_hugeint};
pub use decimal::DecimalValue;
pub use host::HostType;
pub use interval::IntervalValue;
pub use kind::{StorageKind, ValueKind};
pub use logical::{LogicalType, MAX_DECIMAL_WIDTH, decimal_storage, enum_storage};
pub use primitive::NativePrimitive;
pub use temporal::{
    DateValue, MICROS_PER_DAY, MICROS_PER_SECOND, TimeTzValue, TimeValue, TimestampValue,
    slot_to_offset_date_time,
};
pub use value::{MapValue, StructValue, Value};
