//! The vector element conversion engine.
//!
//! Given a column descriptor and a target type, [`resolve`] (static target,
//! any [`HostValue`]) or [`resolve_dynamic`] (runtime [`HostType`]) builds a
//! [`Converter`] plan. Plans depend only on the schema and can be cached; a
//! plan is bound to each vector with [`Converter::bind_to_vector`] and then
//! reads elements with [`Converter::convert`] or [`Converter::try_convert`].
//!
//! ```
//! use colview_convert::resolve;
//! use colview_native::MemVector;
//! use colview_vector::Vector;
//!
//! let native = MemVector::primitive(&[Some(1i32), None, Some(3)]).into_handle();
//! let vector = Vector::from_native(native, 3).unwrap();
//! let conv = resolve::<i64>(vector.column()).unwrap();
//! assert_eq!(conv.convert(&vector, 2, true).unwrap(), 3);
//! assert_eq!(conv.try_convert(&vector, 1).unwrap(), None);
//! ```

mod boxed;
pub mod converter;
mod decimal;
mod dynamic;
pub mod enums;
mod host;
mod list;
mod maps;
mod primitive;
mod resolve;
mod structs;
mod temporal;
mod text;
mod unions;

pub use boxed::resolve_boxed;
pub use converter::{Binder, Converter, ElementReader, ReadFn, StateFn};
pub use dynamic::resolve_dynamic;
pub use enums::HostEnum;
pub use host::HostValue;
pub use resolve::resolve;

// Paths used by `host_enum!` expansions.
pub use colview_result::{Error, Result};
pub use colview_types::{HostType, Value};
pub use colview_vector::ColumnDescriptor;
