//! UNION columns: a tag member selecting one alternative member per row.

use std::sync::Arc;

use colview_result::{Error, Result};
use colview_types::{Value, ValueKind};
use colview_vector::{ColumnDescriptor, Vector, compat};

use crate::boxed;
use crate::converter::{Binder, Converter, ElementReader};
use crate::host::HostValue;

struct UnionPlan {
    tag: Converter<u8>,
    alternatives: Vec<Converter<Value>>,
}

impl Binder<Value> for UnionPlan {
    fn bind(&self, vector: &Vector) -> Result<Arc<dyn ElementReader<Value>>> {
        let tags = vector.struct_member(0)?;
        let alternatives = self
            .alternatives
            .iter()
            .enumerate()
            .map(|(i, plan)| {
                let member = vector.struct_member(i + 1)?;
                Ok((plan.prepare(&member)?, member))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Arc::new(BoundUnion {
            tag: self.tag.prepare(&tags)?,
            tags,
            alternatives,
        }))
    }
}

struct BoundUnion {
    tag: Converter<u8>,
    tags: Vector,
    alternatives: Vec<(Converter<Value>, Vector)>,
}

impl ElementReader<Value> for BoundUnion {
    unsafe fn read(&self, _vector: &Vector, index: usize) -> Result<Value> {
        let tag = self.tag.convert(&self.tags, index, true)?;
        let (converter, member) = self.alternatives.get(usize::from(tag)).ok_or_else(|| {
            Error::Native(format!(
                "UNION tag {tag} at row {index} names none of {} alternatives",
                self.alternatives.len()
            ))
        })?;
        converter.convert(member, index, false)
    }
}

/// Plan reading the selected alternative of each row as a boxed value.
pub(crate) fn resolve_union(column: &ColumnDescriptor) -> Result<Converter<Value>> {
    if column.kind() != ValueKind::Union {
        return Err(compat::mismatch(column, &Value::host_type()));
    }
    let tag = u8::resolve(&column.member(0)?)?;
    let alternatives = (1..column.member_count())
        .map(|i| boxed::resolve_boxed(&column.member(i)?))
        .collect::<Result<Vec<_>>>()?;
    Ok(Converter::unbound(column, UnionPlan { tag, alternatives }, true))
}
