use colview_result::{Error, Result};
use colview_types::LogicalType;
use colview_vector::ColumnDescriptor;
use rustc_hash::FxHashMap;

/// One named column of a result.
#[derive(Clone, Debug)]
pub struct SchemaColumn {
    pub name: String,
    pub descriptor: ColumnDescriptor,
}

/// Column names and descriptors shared by every chunk of a result.
#[derive(Clone, Debug, Default)]
pub struct Schema {
    columns: Vec<SchemaColumn>,
    by_name: FxHashMap<String, usize>,
}

impl Schema {
    /// Build from `(name, type)` pairs. The first column of a duplicated name
    /// wins name lookups.
    pub fn new<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, LogicalType)>,
        S: Into<String>,
    {
        let mut schema = Self::default();
        for (name, ty) in columns {
            let name = name.into();
            let descriptor = ColumnDescriptor::from_logical_type(ty)?;
            schema
                .by_name
                .entry(name.clone())
                .or_insert(schema.columns.len());
            schema.columns.push(SchemaColumn { name, descriptor });
        }
        Ok(schema)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> &[SchemaColumn] {
        &self.columns
    }

    pub fn column(&self, index: usize) -> Result<&SchemaColumn> {
        self.columns.get(index).ok_or(Error::IndexOutOfRange {
            index,
            len: self.columns.len(),
        })
    }

    pub fn index_of(&self, name: &str) -> Result<usize> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| Error::UnknownColumn(name.to_string()))
    }
}
