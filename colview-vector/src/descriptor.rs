//! Column metadata derived from a logical type.

use std::sync::Arc;

use colview_result::{Error, Result};
use colview_types::{HostType, LogicalType, StorageKind, ValueKind};

use crate::compat;

/// Immutable description of a column: declared kind, physical slot kind and
/// the type parameters readers need.
///
/// Built from a live vector or from schema metadata alone; child and member
/// descriptors are derived without touching native memory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnDescriptor {
    kind: ValueKind,
    storage: StorageKind,
    /// Slot width in bytes, or member count for STRUCT/UNION, or element count
    /// per row for ARRAY.
    width: usize,
    scale: u8,
    logical: Arc<LogicalType>,
}

impl ColumnDescriptor {
    pub fn from_logical_type(ty: LogicalType) -> Result<Self> {
        ty.validate()?;
        Ok(Self::from_validated(Arc::new(ty)))
    }

    fn from_validated(logical: Arc<LogicalType>) -> Self {
        let kind = logical.kind();
        let storage = logical.storage_kind();
        let (width, scale) = match logical.as_ref() {
            LogicalType::Decimal { scale, .. } => (storage.slot_width().unwrap_or(0), *scale),
            LogicalType::Struct(members) => (members.len(), 0),
            LogicalType::Union(members) => (members.len() + 1, 0),
            LogicalType::Array { size, .. } => (*size, 0),
            _ => (storage.slot_width().unwrap_or(0), 0),
        };
        Self {
            kind,
            storage,
            width,
            scale,
            logical,
        }
    }

    fn derived(ty: &LogicalType) -> Self {
        Self::from_validated(Arc::new(ty.clone()))
    }

    #[inline]
    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    #[inline]
    pub fn storage(&self) -> StorageKind {
        self.storage
    }

    /// Slot width in bytes (0 for kinds without own slots).
    pub fn slot_width(&self) -> usize {
        match self.kind {
            ValueKind::Struct | ValueKind::Union | ValueKind::Array => 0,
            _ => self.width,
        }
    }

    /// Number of member vectors of a STRUCT or UNION (the tag included).
    pub fn member_count(&self) -> usize {
        match self.kind {
            ValueKind::Struct | ValueKind::Union => self.width,
            _ => 0,
        }
    }

    pub fn array_size(&self) -> Option<usize> {
        (self.kind == ValueKind::Array).then_some(self.width)
    }

    #[inline]
    pub fn scale(&self) -> u8 {
        self.scale
    }

    pub fn logical_type(&self) -> &LogicalType {
        &self.logical
    }

    pub fn enum_dictionary(&self) -> Option<&Arc<[String]>> {
        match self.logical.as_ref() {
            LogicalType::Enum { dictionary } => Some(dictionary),
            _ => None,
        }
    }

    /// Element descriptor of a LIST or ARRAY, or the entry struct of a MAP.
    pub fn child(&self) -> Result<ColumnDescriptor> {
        match self.logical.as_ref() {
            LogicalType::List(child) => Ok(Self::derived(child)),
            LogicalType::Array { child, .. } => Ok(Self::derived(child)),
            LogicalType::Map { key, value } => {
                Ok(Self::derived(&LogicalType::map_entry_type(key, value)))
            }
            _ => Err(self.no_children()),
        }
    }

    /// Key and value descriptors of a MAP.
    pub fn map_key_value(&self) -> Result<(ColumnDescriptor, ColumnDescriptor)> {
        match self.logical.as_ref() {
            LogicalType::Map { key, value } => Ok((Self::derived(key), Self::derived(value))),
            _ => Err(self.no_children()),
        }
    }

    /// Descriptor of member vector `index`. For a UNION member 0 is the tag.
    pub fn member(&self, index: usize) -> Result<ColumnDescriptor> {
        let ty = match self.logical.as_ref() {
            LogicalType::Struct(members) => members.get(index).map(|(_, ty)| ty.clone()),
            LogicalType::Union(members) => match index {
                0 => Some(LogicalType::Scalar(ValueKind::UTinyInt)),
                i => members.get(i - 1).map(|(_, ty)| ty.clone()),
            },
            _ => return Err(self.no_children()),
        };
        ty.map(|ty| Self::from_validated(Arc::new(ty)))
            .ok_or(Error::IndexOutOfRange {
                index,
                len: self.member_count(),
            })
    }

    /// Member names of a STRUCT, or alternative names of a UNION.
    pub fn member_names(&self) -> Vec<String> {
        match self.logical.as_ref() {
            LogicalType::Struct(members) | LogicalType::Union(members) => {
                members.iter().map(|(name, _)| name.clone()).collect()
            }
            _ => Vec::new(),
        }
    }

    /// Canonical host type of the column, `None` for kinds that never back a
    /// column.
    pub fn default_host_type(&self) -> Option<HostType> {
        compat::default_type(self.kind, self.storage)
    }

    fn no_children(&self) -> Error {
        Error::InvalidArgumentError(format!("{} column has no child columns", self.kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_descriptor() {
        let d = ColumnDescriptor::from_logical_type(LogicalType::decimal(9, 3).unwrap()).unwrap();
        assert_eq!(d.kind(), ValueKind::Decimal);
        assert_eq!(d.storage(), ValueKind::Integer);
        assert_eq!(d.slot_width(), 4);
        assert_eq!(d.scale(), 3);
    }

    #[test]
    fn nested_children() {
        let ty = LogicalType::structure([
            ("a", LogicalType::from(ValueKind::Integer)),
            ("b", LogicalType::list(ValueKind::Varchar)),
        ]);
        let d = ColumnDescriptor::from_logical_type(ty).unwrap();
        assert_eq!(d.member_count(), 2);
        assert_eq!(d.member_names(), vec!["a".to_string(), "b".to_string()]);
        let b = d.member(1).unwrap();
        assert_eq!(b.kind(), ValueKind::List);
        assert_eq!(b.child().unwrap().kind(), ValueKind::Varchar);
        assert!(matches!(d.member(2), Err(Error::IndexOutOfRange { .. })));
        assert!(d.child().is_err());
    }

    #[test]
    fn union_tag_is_member_zero() {
        let ty = LogicalType::union([
            ("num", LogicalType::from(ValueKind::Integer)),
            ("str", LogicalType::from(ValueKind::Varchar)),
        ]);
        let d = ColumnDescriptor::from_logical_type(ty).unwrap();
        assert_eq!(d.member_count(), 3);
        assert_eq!(d.member(0).unwrap().kind(), ValueKind::UTinyInt);
        assert_eq!(d.member(2).unwrap().kind(), ValueKind::Varchar);
    }

    #[test]
    fn map_entry_child() {
        let d = ColumnDescriptor::from_logical_type(LogicalType::map(
            ValueKind::Varchar,
            ValueKind::Double,
        ))
        .unwrap();
        let entry = d.child().unwrap();
        assert_eq!(entry.kind(), ValueKind::Struct);
        let (k, v) = d.map_key_value().unwrap();
        assert_eq!((k.kind(), v.kind()), (ValueKind::Varchar, ValueKind::Double));
    }
}
