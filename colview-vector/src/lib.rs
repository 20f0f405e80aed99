//! Column and vector descriptors plus the type compatibility matrix.

pub mod compat;
pub mod descriptor;
pub mod vector;

pub use compat::{check, compatible, default_type};
pub use descriptor::ColumnDescriptor;
pub use vector::Vector;
