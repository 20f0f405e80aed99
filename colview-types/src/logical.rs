//! Logical type descriptions as reported by the engine.
//!
//! A [`LogicalType`] is the owned form of the engine's native type handle.
//! Obtaining one is the (allocating) introspection call; dropping it is the
//! release of the transient handle.

use std::sync::Arc;

use colview_result::{Error, Result};

use crate::kind::{StorageKind, ValueKind};

/// Largest decimal width the engine supports.
pub const MAX_DECIMAL_WIDTH: u8 = 38;

/// Full type of a column, including nested children.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LogicalType {
    /// Any kind without type parameters.
    Scalar(ValueKind),
    /// Fixed-point decimal with `width` total digits, `scale` after the point.
    Decimal { width: u8, scale: u8 },
    /// Enumeration; the code of a value is its index in `dictionary`.
    Enum { dictionary: Arc<[String]> },
    /// Variable-length list.
    List(Box<LogicalType>),
    /// Fixed-size array of `size` elements per row.
    Array { child: Box<LogicalType>, size: usize },
    /// Struct with named members in declared order.
    Struct(Vec<(String, LogicalType)>),
    /// Map stored as a list of `STRUCT(key, value)`.
    Map {
        key: Box<LogicalType>,
        value: Box<LogicalType>,
    },
    /// Tagged union; the members are the alternatives in tag order.
    Union(Vec<(String, LogicalType)>),
}

impl From<ValueKind> for LogicalType {
    fn from(kind: ValueKind) -> Self {
        LogicalType::Scalar(kind)
    }
}

impl LogicalType {
    pub fn decimal(width: u8, scale: u8) -> Result<Self> {
        if width == 0 || width > MAX_DECIMAL_WIDTH || scale > width {
            return Err(Error::InvalidArgumentError(format!(
                "invalid DECIMAL({width}, {scale})"
            )));
        }
        Ok(LogicalType::Decimal { width, scale })
    }

    pub fn enumeration<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let dictionary: Vec<String> = names.into_iter().map(Into::into).collect();
        LogicalType::Enum {
            dictionary: dictionary.into(),
        }
    }

    pub fn list(child: impl Into<LogicalType>) -> Self {
        LogicalType::List(Box::new(child.into()))
    }

    pub fn array(child: impl Into<LogicalType>, size: usize) -> Self {
        LogicalType::Array {
            child: Box::new(child.into()),
            size,
        }
    }

    pub fn structure<I, S>(members: I) -> Self
    where
        I: IntoIterator<Item = (S, LogicalType)>,
        S: Into<String>,
    {
        LogicalType::Struct(
            members
                .into_iter()
                .map(|(name, ty)| (name.into(), ty))
                .collect(),
        )
    }

    pub fn map(key: impl Into<LogicalType>, value: impl Into<LogicalType>) -> Self {
        LogicalType::Map {
            key: Box::new(key.into()),
            value: Box::new(value.into()),
        }
    }

    pub fn union<I, S>(members: I) -> Self
    where
        I: IntoIterator<Item = (S, LogicalType)>,
        S: Into<String>,
    {
        LogicalType::Union(
            members
                .into_iter()
                .map(|(name, ty)| (name.into(), ty))
                .collect(),
        )
    }

    /// The declared kind.
    pub fn kind(&self) -> ValueKind {
        match self {
            LogicalType::Scalar(kind) => *kind,
            LogicalType::Decimal { .. } => ValueKind::Decimal,
            LogicalType::Enum { .. } => ValueKind::Enum,
            LogicalType::List(_) => ValueKind::List,
            LogicalType::Array { .. } => ValueKind::Array,
            LogicalType::Struct(_) => ValueKind::Struct,
            LogicalType::Map { .. } => ValueKind::Map,
            LogicalType::Union(_) => ValueKind::Union,
        }
    }

    /// The physical slot kind backing values of this type.
    pub fn storage_kind(&self) -> StorageKind {
        match self {
            LogicalType::Decimal { width, .. } => decimal_storage(*width),
            LogicalType::Enum { dictionary } => enum_storage(dictionary.len()),
            other => other.kind(),
        }
    }

    /// Check that the type is well formed (parametrized kinds use their own
    /// variants, no `Invalid`/`Any` leaves).
    pub fn validate(&self) -> Result<()> {
        match self {
            LogicalType::Scalar(kind) => match kind {
                ValueKind::Decimal
                | ValueKind::Enum
                | ValueKind::List
                | ValueKind::Array
                | ValueKind::Struct
                | ValueKind::Map
                | ValueKind::Union => Err(Error::Native(format!(
                    "{kind} type reported without its type parameters"
                ))),
                ValueKind::Invalid | ValueKind::Any => Err(Error::Native(format!(
                    "{kind} is not a valid column type"
                ))),
                _ => Ok(()),
            },
            LogicalType::Decimal { width, scale } => {
                if *width == 0 || *width > MAX_DECIMAL_WIDTH || scale > width {
                    Err(Error::Native(format!("invalid DECIMAL({width}, {scale})")))
                } else {
                    Ok(())
                }
            }
            LogicalType::Enum { dictionary } => {
                if dictionary.len() > u32::MAX as usize {
                    Err(Error::Native("enum dictionary too large".to_string()))
                } else {
                    Ok(())
                }
            }
            LogicalType::List(child) => child.validate(),
            LogicalType::Array { child, .. } => child.validate(),
            LogicalType::Struct(members) => {
                for (_, member) in members {
                    member.validate()?;
                }
                Ok(())
            }
            LogicalType::Map { key, value } => {
                key.validate()?;
                value.validate()
            }
            LogicalType::Union(members) => {
                if members.is_empty() || members.len() > u8::MAX as usize {
                    return Err(Error::Native(format!(
                        "union with {} members is not supported",
                        members.len()
                    )));
                }
                for (_, member) in members {
                    member.validate()?;
                }
                Ok(())
            }
        }
    }

    /// The struct type of a map's entries.
    pub fn map_entry_type(key: &LogicalType, value: &LogicalType) -> LogicalType {
        LogicalType::Struct(vec![
            ("key".to_string(), key.clone()),
            ("value".to_string(), value.clone()),
        ])
    }
}

/// Integer slot kind used for a decimal of `width` digits.
pub fn decimal_storage(width: u8) -> StorageKind {
    match width {
        0..=4 => ValueKind::SmallInt,
        5..=9 => ValueKind::Integer,
        10..=18 => ValueKind::BigInt,
        _ => ValueKind::HugeInt,
    }
}

/// Unsigned slot kind used for an enum with `len` members.
pub fn enum_storage(len: usize) -> StorageKind {
    if len <= u8::MAX as usize {
        ValueKind::UTinyInt
    } else if len <= u16::MAX as usize {
        ValueKind::USmallInt
    } else {
        ValueKind::UInteger
    }
}
