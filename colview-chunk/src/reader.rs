use colview_convert::HostValue;
use colview_result::Result;
use colview_types::{HostType, NativePrimitive, Value, ValueKind};
use colview_vector::{ColumnDescriptor, Vector};

use crate::chunk::DataChunk;

/// Typed access to one column of a [`DataChunk`].
#[derive(Clone, Copy, Debug)]
pub struct ColumnReader<'a> {
    chunk: &'a DataChunk,
    index: usize,
    vector: &'a Vector,
}

impl<'a> ColumnReader<'a> {
    pub(crate) fn new(chunk: &'a DataChunk, index: usize, vector: &'a Vector) -> Self {
        Self {
            chunk,
            index,
            vector,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &'a str {
        self.chunk
            .schema()
            .columns()
            .get(self.index)
            .map_or("", |column| column.name.as_str())
    }

    pub fn descriptor(&self) -> &'a ColumnDescriptor {
        self.vector.column()
    }

    pub fn kind(&self) -> ValueKind {
        self.vector.kind()
    }

    pub fn len(&self) -> usize {
        self.vector.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vector.is_empty()
    }

    pub fn vector(&self) -> &'a Vector {
        self.vector
    }

    pub fn is_valid(&self, row: usize) -> Result<bool> {
        self.vector.is_valid(row)
    }

    /// Read `row` as `T`; a missing element fails with
    /// [`Error::NullViolation`](colview_result::Error::NullViolation) unless
    /// `T` can represent it.
    pub fn get<T: HostValue>(&self, row: usize) -> Result<T> {
        self.chunk
            .converter::<T>(self.index)?
            .convert(self.vector, row, true)
    }

    /// Read `row` as `T`, `None` when the element is missing.
    pub fn try_get<T: HostValue>(&self, row: usize) -> Result<Option<T>> {
        self.chunk
            .converter::<T>(self.index)?
            .try_convert(self.vector, row)
    }

    /// Read `row` as `T`, the default value of `T` when the element is missing.
    pub fn get_or_default<T: HostValue>(&self, row: usize) -> Result<T> {
        self.chunk
            .converter::<T>(self.index)?
            .convert(self.vector, row, false)
    }

    /// Read `row` boxed as its canonical type.
    pub fn get_value(&self, row: usize) -> Result<Value> {
        self.get::<Value>(row)
    }

    /// Read `row` as a type chosen at run time.
    pub fn get_as(&self, row: usize, target: &HostType) -> Result<Value> {
        self.chunk
            .dynamic_converter(self.index, target)?
            .convert(self.vector, row, true)
    }

    /// Zero-copy view of a primitive column. Null rows hold unspecified
    /// values.
    pub fn span<T: NativePrimitive>(&self) -> Result<&'a [T]> {
        self.vector.as_slice::<T>()
    }

    /// Every row as `T`, failing on the first missing row `T` cannot
    /// represent.
    pub fn values<T: HostValue>(&self) -> Result<Vec<T>> {
        let converter = self.chunk.converter::<T>(self.index)?;
        (0..self.vector.len())
            .map(|row| converter.convert(self.vector, row, true))
            .collect()
    }
}
