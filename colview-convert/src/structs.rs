//! STRUCT targets.

use std::sync::Arc;

use colview_result::Result;
use colview_types::{HostType, StructValue, Value, ValueKind};
use colview_vector::{ColumnDescriptor, Vector, compat};

use crate::boxed;
use crate::converter::{Binder, Converter, ElementReader};
use crate::host::HostValue;

struct StructPlan {
    names: Arc<[String]>,
    members: Vec<Converter<Value>>,
}

impl Binder<StructValue> for StructPlan {
    fn bind(&self, vector: &Vector) -> Result<Arc<dyn ElementReader<StructValue>>> {
        let members = self
            .members
            .iter()
            .enumerate()
            .map(|(i, plan)| {
                let member = vector.struct_member(i)?;
                Ok((plan.prepare(&member)?, member))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Arc::new(BoundStruct {
            names: Arc::clone(&self.names),
            members,
        }))
    }
}

struct BoundStruct {
    names: Arc<[String]>,
    members: Vec<(Converter<Value>, Vector)>,
}

impl ElementReader<StructValue> for BoundStruct {
    unsafe fn read(&self, _vector: &Vector, index: usize) -> Result<StructValue> {
        let values = self
            .members
            .iter()
            .map(|(converter, member)| converter.convert(member, index, false))
            .collect::<Result<Vec<_>>>()?;
        Ok(StructValue::new(Arc::clone(&self.names), values))
    }
}

impl HostValue for StructValue {
    fn host_type() -> HostType {
        HostType::Struct
    }

    fn resolve(column: &ColumnDescriptor) -> Result<Converter<Self>> {
        if column.kind() != ValueKind::Struct {
            return Err(compat::mismatch(column, &Self::host_type()));
        }
        let names: Arc<[String]> = column.member_names().into();
        let members = (0..column.member_count())
            .map(|i| boxed::resolve_boxed(&column.member(i)?))
            .collect::<Result<Vec<_>>>()?;
        Ok(Converter::unbound(column, StructPlan { names, members }, false))
    }

    fn missing() -> Self {
        StructValue::new(Arc::from(Vec::new()), Vec::new())
    }

    fn into_value(self) -> Value {
        Value::Struct(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use colview_native::MemVector;
    use colview_types::LogicalType;

    #[test]
    fn members_in_declared_order() {
        let ty = LogicalType::structure([
            ("a", LogicalType::from(ValueKind::Integer)),
            ("b", LogicalType::from(ValueKind::Varchar)),
        ]);
        let names: Arc<[String]> = vec!["a".to_string(), "b".to_string()].into();
        let row =
            |a: Value, b: Value| Value::Struct(StructValue::new(Arc::clone(&names), vec![a, b]));
        let rows = [
            Value::Null,
            row(Value::Integer(1), Value::Null),
            row(Value::Integer(7), Value::Text("x".into())),
        ];
        let native = MemVector::from_values(ty, &rows).unwrap().into_handle();
        let v = Vector::from_native(native, 3).unwrap();

        let conv = StructValue::resolve(v.column()).unwrap().prepare(&v).unwrap();
        let third = conv.convert(&v, 2, true).unwrap();
        assert_eq!(third.names(), &["a".to_string(), "b".to_string()]);
        assert_eq!(third.get("a"), Some(&Value::Integer(7)));
        assert_eq!(third.get("b"), Some(&Value::Text("x".into())));
        assert_eq!(conv.convert(&v, 1, true).unwrap().get("b"), Some(&Value::Null));
        assert_eq!(conv.try_convert(&v, 0).unwrap(), None);
    }
}
