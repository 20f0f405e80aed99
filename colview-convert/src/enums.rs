//! ENUM columns: dictionary codes read as names or host enumerations.
//!
//! The dictionary is captured once per plan. Host enums are matched by member
//! name, so the code-to-member table is built at resolution and every read is
//! one slot load plus one table lookup.

use std::sync::Arc;

use colview_result::{Error, Result};
use colview_types::{HostType, Value, ValueKind};
use colview_vector::{ColumnDescriptor, Vector, compat};

use crate::converter::Converter;

/// A Rust enumeration readable from ENUM columns by member name.
///
/// Implemented by [`host_enum!`](crate::host_enum).
pub trait HostEnum: Copy + Send + Sync + 'static {
    /// Type name used in [`HostType::Enum`] and error messages.
    const NAME: &'static str;
    /// Member labels in declaration order.
    const MEMBERS: &'static [&'static str];

    fn from_name(name: &str) -> Option<Self>;

    fn name(self) -> &'static str;
}

/// Declare a Rust enum readable from ENUM columns.
///
/// Each variant matches the dictionary entry of the same name, or the label
/// given with `= "LABEL"`. The first variant is the value a missing element
/// reads as when nulls are tolerated.
///
/// ```
/// colview_convert::host_enum! {
///     pub enum Color {
///         Red = "RED",
///         Green = "GREEN",
///         Blue = "BLUE",
///     }
/// }
/// ```
#[macro_export]
macro_rules! host_enum {
    (@label $variant:ident $label:literal) => {
        $label
    };
    (@label $variant:ident) => {
        stringify!($variant)
    };
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $first:ident $(= $first_label:literal)?
            $(, $variant:ident $(= $label:literal)?)* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $first,
            $($variant,)*
        }

        impl $crate::HostEnum for $name {
            const NAME: &'static str = stringify!($name);
            const MEMBERS: &'static [&'static str] = &[
                $crate::host_enum!(@label $first $($first_label)?),
                $($crate::host_enum!(@label $variant $($label)?),)*
            ];

            fn from_name(name: &str) -> Option<Self> {
                match name {
                    n if n == $crate::host_enum!(@label $first $($first_label)?) => {
                        Some(Self::$first)
                    }
                    $(n if n == $crate::host_enum!(@label $variant $($label)?) => {
                        Some(Self::$variant)
                    })*
                    _ => None,
                }
            }

            fn name(self) -> &'static str {
                match self {
                    Self::$first => $crate::host_enum!(@label $first $($first_label)?),
                    $(Self::$variant => $crate::host_enum!(@label $variant $($label)?),)*
                }
            }
        }

        impl $crate::HostValue for $name {
            fn host_type() -> $crate::HostType {
                $crate::enums::host_type::<Self>()
            }

            fn resolve(
                column: &$crate::ColumnDescriptor,
            ) -> $crate::Result<$crate::Converter<Self>> {
                $crate::enums::resolve_host_enum::<Self>(column)
            }

            fn missing() -> Self {
                Self::$first
            }

            fn into_value(self) -> $crate::Value {
                $crate::Value::Enum(<Self as $crate::HostEnum>::name(self).to_owned())
            }
        }
    };
}

/// Runtime identity of a host enum.
pub fn host_type<E: HostEnum>() -> HostType {
    HostType::Enum {
        name: E::NAME,
        members: E::MEMBERS.to_vec(),
    }
}

/// Dictionary code of element `index`, loaded at the column's storage width.
///
/// # Safety
///
/// The vector is an ENUM vector and `index < vector.len()`.
#[inline]
unsafe fn code_at(vector: &Vector, index: usize) -> Result<usize> {
    // SAFETY: forwarded from the caller; the storage kind names the slot width.
    let code = unsafe {
        match vector.column().storage() {
            ValueKind::UTinyInt => u32::from(vector.read_unchecked::<u8>(index)),
            ValueKind::USmallInt => u32::from(vector.read_unchecked::<u16>(index)),
            ValueKind::UInteger => vector.read_unchecked::<u32>(index),
            other => {
                return Err(Error::Internal(format!("{other} is not an ENUM storage kind")));
            }
        }
    };
    Ok(code as usize)
}

fn dictionary(column: &ColumnDescriptor, target: &HostType) -> Result<Arc<[String]>> {
    match (column.kind(), column.enum_dictionary()) {
        (ValueKind::Enum, Some(dictionary)) => Ok(Arc::clone(dictionary)),
        _ => Err(compat::mismatch(column, target)),
    }
}

fn unknown_code(code: usize, len: usize, target: &str) -> Error {
    Error::domain(format!(
        "ENUM code {code} is outside the dictionary of {len} names (reading as {target})"
    ))
}

fn name_at<'a>(dictionary: &'a [String], code: usize, target: &str) -> Result<&'a str> {
    dictionary
        .get(code)
        .map(String::as_str)
        .ok_or_else(|| unknown_code(code, dictionary.len(), target))
}

unsafe fn read_name(dictionary: &Arc<[String]>, vector: &Vector, index: usize) -> Result<String> {
    // SAFETY: forwarded from the caller.
    let code = unsafe { code_at(vector, index) }?;
    name_at(dictionary, code, "String").map(str::to_owned)
}

/// Plan reading member names.
pub(crate) fn resolve_names(column: &ColumnDescriptor) -> Result<Converter<String>> {
    let dictionary = dictionary(column, &HostType::String)?;
    Ok(Converter::create(column, dictionary, read_name, false))
}

/// Plan reading member names as `Value::Enum`.
pub(crate) fn resolve_boxed(column: &ColumnDescriptor) -> Result<Converter<Value>> {
    Ok(resolve_names(column)?.map(|name| Ok(Value::Enum(name))))
}

struct HostTable<E> {
    dictionary: Arc<[String]>,
    members: Vec<Option<E>>,
}

unsafe fn read_host<E: HostEnum>(
    table: &HostTable<E>,
    vector: &Vector,
    index: usize,
) -> Result<E> {
    // SAFETY: forwarded from the caller.
    let code = unsafe { code_at(vector, index) }?;
    match table.members.get(code) {
        Some(Some(member)) => Ok(*member),
        Some(None) => Err(Error::domain(format!(
            "ENUM member '{}' (code {code}) has no counterpart in {}",
            table.dictionary[code],
            E::NAME
        ))),
        None => Err(unknown_code(code, table.dictionary.len(), E::NAME)),
    }
}

/// Plan reading a host enum, matching dictionary entries by name.
pub fn resolve_host_enum<E>(column: &ColumnDescriptor) -> Result<Converter<E>>
where
    E: HostEnum + crate::HostValue,
{
    let dictionary = dictionary(column, &host_type::<E>())?;
    let members = dictionary.iter().map(|name| E::from_name(name)).collect();
    let table = HostTable {
        dictionary,
        members,
    };
    Ok(Converter::create(column, table, read_host::<E>, false))
}

struct DynamicTable {
    dictionary: Arc<[String]>,
    known: Vec<bool>,
    target: &'static str,
}

unsafe fn read_dynamic(table: &DynamicTable, vector: &Vector, index: usize) -> Result<Value> {
    // SAFETY: forwarded from the caller.
    let code = unsafe { code_at(vector, index) }?;
    let name = name_at(&table.dictionary, code, table.target)?;
    if table.known[code] {
        Ok(Value::Enum(name.to_owned()))
    } else {
        Err(Error::domain(format!(
            "ENUM member '{name}' (code {code}) has no counterpart in {}",
            table.target
        )))
    }
}

/// Runtime-keyed host enum plan: validates membership, yields `Value::Enum`.
pub(crate) fn resolve_dynamic(
    column: &ColumnDescriptor,
    name: &'static str,
    members: &[&'static str],
) -> Result<Converter<Value>> {
    let target = HostType::Enum {
        name,
        members: members.to_vec(),
    };
    let dictionary = dictionary(column, &target)?;
    let known = dictionary
        .iter()
        .map(|entry| members.contains(&entry.as_str()))
        .collect();
    let table = DynamicTable {
        dictionary,
        known,
        target: name,
    };
    Ok(Converter::create(column, table, read_dynamic, false))
}
