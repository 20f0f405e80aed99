//! String-like targets: VARCHAR, BLOB, BIT, VARINT and UUID.

use colview_result::{Error, Result};
use colview_types::{BitString, HostType, Value, ValueKind, VarInt, uuid_from_hugeint};
use colview_vector::{ColumnDescriptor, Vector, compat};
use uuid::Uuid;

use crate::converter::{Converter, ReadFn};
use crate::enums;
use crate::host::HostValue;

#[inline]
unsafe fn payload(vector: &Vector, index: usize) -> &[u8] {
    // SAFETY: the caller resolved a string-like kind and checked the index.
    unsafe { vector.string_bytes(index) }
}

fn utf8(bytes: &[u8]) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|e| Error::domain(format!("VARCHAR value is not valid UTF-8: {e}")))
}

unsafe fn read_string(vector: &Vector, index: usize) -> Result<String> {
    // SAFETY: forwarded from the caller.
    utf8(unsafe { payload(vector, index) })
}

unsafe fn read_bit_string(vector: &Vector, index: usize) -> Result<BitString> {
    // SAFETY: forwarded from the caller.
    BitString::from_blob(unsafe { payload(vector, index) })
}

unsafe fn read_bit_text(vector: &Vector, index: usize) -> Result<String> {
    // SAFETY: forwarded from the caller.
    unsafe { read_bit_string(vector, index) }.map(|bits| bits.to_string())
}

unsafe fn read_varint(vector: &Vector, index: usize) -> Result<VarInt> {
    // SAFETY: forwarded from the caller.
    VarInt::from_blob(unsafe { payload(vector, index) })
}

unsafe fn read_varint_text(vector: &Vector, index: usize) -> Result<String> {
    // SAFETY: forwarded from the caller.
    unsafe { read_varint(vector, index) }.map(|v| v.to_string())
}

unsafe fn read_uuid(vector: &Vector, index: usize) -> Result<Uuid> {
    // SAFETY: UUID slots are 16-byte hugeints.
    Ok(uuid_from_hugeint(unsafe {
        vector.read_unchecked::<i128>(index)
    }))
}

pub(crate) unsafe fn read_blob(vector: &Vector, index: usize) -> Result<Vec<u8>> {
    // SAFETY: forwarded from the caller.
    Ok(unsafe { payload(vector, index) }.to_vec())
}

pub(crate) unsafe fn read_blob_boxed_slice(vector: &Vector, index: usize) -> Result<Box<[u8]>> {
    // SAFETY: forwarded from the caller.
    Ok(Box::from(unsafe { payload(vector, index) }))
}

/// Boxed read of any string-like kind or UUID; `None` for other kinds.
pub(crate) fn boxed_reader(kind: ValueKind) -> Option<ReadFn<Value>> {
    unsafe fn text(vector: &Vector, index: usize) -> Result<Value> {
        // SAFETY: forwarded from the caller.
        unsafe { read_string(vector, index) }.map(Value::Text)
    }
    unsafe fn blob(vector: &Vector, index: usize) -> Result<Value> {
        // SAFETY: forwarded from the caller.
        unsafe { read_blob(vector, index) }.map(Value::Blob)
    }
    unsafe fn bit(vector: &Vector, index: usize) -> Result<Value> {
        // SAFETY: forwarded from the caller.
        unsafe { read_bit_string(vector, index) }.map(Value::Bit)
    }
    unsafe fn varint(vector: &Vector, index: usize) -> Result<Value> {
        // SAFETY: forwarded from the caller.
        unsafe { read_varint(vector, index) }.map(Value::VarInt)
    }
    unsafe fn uuid(vector: &Vector, index: usize) -> Result<Value> {
        // SAFETY: forwarded from the caller.
        unsafe { read_uuid(vector, index) }.map(Value::Uuid)
    }

    let read: ReadFn<Value> = match kind {
        ValueKind::Varchar => text,
        ValueKind::Blob => blob,
        ValueKind::Bit => bit,
        ValueKind::VarInt => varint,
        ValueKind::Uuid => uuid,
        _ => return None,
    };
    Some(read)
}

impl HostValue for String {
    fn host_type() -> HostType {
        HostType::String
    }

    fn resolve(column: &ColumnDescriptor) -> Result<Converter<Self>> {
        let read: ReadFn<Self> = match column.kind() {
            ValueKind::Varchar => read_string,
            ValueKind::Bit => read_bit_text,
            ValueKind::VarInt => read_varint_text,
            ValueKind::Enum => return enums::resolve_names(column),
            _ => return Err(compat::mismatch(column, &Self::host_type())),
        };
        Ok(Converter::stateless(column, read))
    }

    fn missing() -> Self {
        String::new()
    }

    fn into_value(self) -> Value {
        Value::Text(self)
    }
}

impl HostValue for BitString {
    fn host_type() -> HostType {
        HostType::BitString
    }

    fn resolve(column: &ColumnDescriptor) -> Result<Converter<Self>> {
        match column.kind() {
            ValueKind::Bit => Ok(Converter::stateless(column, read_bit_string)),
            _ => Err(compat::mismatch(column, &Self::host_type())),
        }
    }

    fn missing() -> Self {
        BitString::default()
    }

    fn into_value(self) -> Value {
        Value::Bit(self)
    }
}

impl HostValue for VarInt {
    fn host_type() -> HostType {
        HostType::VarInt
    }

    fn resolve(column: &ColumnDescriptor) -> Result<Converter<Self>> {
        match column.kind() {
            ValueKind::VarInt => Ok(Converter::stateless(column, read_varint)),
            _ => Err(compat::mismatch(column, &Self::host_type())),
        }
    }

    fn missing() -> Self {
        VarInt::default()
    }

    fn into_value(self) -> Value {
        Value::VarInt(self)
    }
}

impl HostValue for Uuid {
    fn host_type() -> HostType {
        HostType::Uuid
    }

    fn resolve(column: &ColumnDescriptor) -> Result<Converter<Self>> {
        match column.kind() {
            ValueKind::Uuid => Ok(Converter::stateless(column, read_uuid)),
            _ => Err(compat::mismatch(column, &Self::host_type())),
        }
    }

    fn missing() -> Self {
        Uuid::nil()
    }

    fn into_value(self) -> Value {
        Value::Uuid(self)
    }
}
