//! Arrow record batches read back through the typed chunk readers.

use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, Date32Array, Decimal128Array, DictionaryArray, DurationSecondArray,
    Int32Array, Int64Array, ListArray, StringArray, StructArray, TimestampMicrosecondArray,
    TimestampMillisecondArray,
};
use arrow::datatypes::{DataType, Field, Int8Type, Int32Type, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use colview_arrowhead::{
    chunk_from_batch, logical_type_from_arrow, logical_type_of, result_from_batches,
    vector_from_array,
};
use colview_chunk::{DataChunk, QueryResult};
use colview_result::Error;
use colview_test_utils::{init_tracing_for_tests, random_column, seeded_rng};
use colview_types::{DateValue, LogicalType, TimestampValue, Value, ValueKind};
use rand::Rng;
use rust_decimal::Decimal;
use time::OffsetDateTime;

fn single_chunk(batch: RecordBatch) -> DataChunk {
    let result = result_from_batches(batch.schema().as_ref(), &[batch]).unwrap();
    let mut result = QueryResult::new(result).unwrap();
    result.next_chunk().unwrap().expect("one chunk")
}

#[test]
fn scalar_columns() {
    init_tracing_for_tests();
    let schema = Schema::new(vec![
        Field::new("id", DataType::Int32, true),
        Field::new("name", DataType::Utf8, true),
        Field::new("day", DataType::Date32, false),
        Field::new("price", DataType::Decimal128(10, 2), true),
    ]);
    let batch = RecordBatch::try_new(
        Arc::new(schema),
        vec![
            Arc::new(Int32Array::from(vec![Some(1), None, Some(3)])) as ArrayRef,
            Arc::new(StringArray::from(vec![Some("ada"), Some("grace"), None])),
            Arc::new(Date32Array::from(vec![0, 1, 19_000])),
            Arc::new(
                Decimal128Array::from(vec![Some(12_345), None, Some(-5)])
                    .with_precision_and_scale(10, 2)
                    .unwrap(),
            ),
        ],
    )
    .unwrap();
    let chunk = single_chunk(batch);
    assert_eq!(chunk.row_count(), 3);

    let id = chunk.column_by_name("id").unwrap();
    assert_eq!(id.kind(), ValueKind::Integer);
    assert_eq!(id.get::<i32>(0).unwrap(), 1);
    assert_eq!(id.try_get::<i32>(1).unwrap(), None);
    assert_eq!(id.span::<i32>().unwrap()[2], 3);

    let name = chunk.column(1).unwrap();
    assert_eq!(name.get::<String>(1).unwrap(), "grace");
    assert!(!name.is_valid(2).unwrap());

    let day = chunk.column(2).unwrap();
    assert_eq!(day.get::<DateValue>(2).unwrap().days, 19_000);

    let price = chunk.column(3).unwrap();
    assert_eq!(price.kind(), ValueKind::Decimal);
    assert_eq!(price.get::<Decimal>(0).unwrap(), Decimal::new(12_345, 2));
    assert_eq!(price.get::<Decimal>(2).unwrap(), Decimal::new(-5, 2));
    assert_eq!(price.try_get::<Decimal>(1).unwrap(), None);
}

#[test]
fn sliced_primitive_keeps_offset_and_nulls() {
    let array = Int32Array::from(vec![Some(1), Some(2), None, Some(4)]);
    let sliced = array.slice(1, 3);
    let vector = vector_from_array(&sliced).unwrap();
    assert_eq!(vector.len(), 3);

    let schema = Schema::new(vec![Field::new("n", DataType::Int32, true)]);
    let batch = RecordBatch::try_new(Arc::new(schema), vec![Arc::new(sliced) as ArrayRef]).unwrap();
    let chunk = single_chunk(batch);
    let column = chunk.column(0).unwrap();
    assert_eq!(
        column.values::<Option<i32>>().unwrap(),
        vec![Some(2), None, Some(4)]
    );
}

#[test]
fn random_int64_columns_round_trip() {
    let mut rng = seeded_rng(0xA77);
    let expected = random_column(&mut rng, 500, 0.2, |rng| rng.random::<i64>());
    let schema = Schema::new(vec![Field::new("v", DataType::Int64, true)]);
    let batch = RecordBatch::try_new(
        Arc::new(schema),
        vec![Arc::new(Int64Array::from(expected.clone())) as ArrayRef],
    )
    .unwrap();
    let chunk = single_chunk(batch);
    assert_eq!(
        chunk.column(0).unwrap().values::<Option<i64>>().unwrap(),
        expected
    );
}

#[test]
fn dictionary_becomes_enum() {
    let colors: DictionaryArray<Int8Type> =
        vec![Some("red"), None, Some("blue"), Some("red")].into_iter().collect();
    assert_eq!(
        logical_type_of(&colors).unwrap(),
        LogicalType::enumeration(["red", "blue"])
    );
    assert!(matches!(
        logical_type_from_arrow(colors.data_type()),
        Err(Error::InvalidArgumentError(_))
    ));

    let schema = Schema::new(vec![Field::new("color", colors.data_type().clone(), true)]);
    let batch = RecordBatch::try_new(Arc::new(schema), vec![Arc::new(colors) as ArrayRef]).unwrap();
    let chunk = single_chunk(batch);
    let color = chunk.column(0).unwrap();
    assert_eq!(color.kind(), ValueKind::Enum);
    assert_eq!(color.get::<String>(0).unwrap(), "red");
    assert_eq!(color.try_get::<String>(1).unwrap(), None);
    assert_eq!(color.get_value(2).unwrap(), Value::Enum("blue".into()));
}

#[test]
fn lists_and_structs() {
    let tags = ListArray::from_iter_primitive::<Int32Type, _, _>(vec![
        Some(vec![Some(1), Some(2)]),
        Some(vec![]),
        None,
    ]);
    let point = StructArray::from(vec![
        (
            Arc::new(Field::new("x", DataType::Int32, true)),
            Arc::new(Int32Array::from(vec![Some(7), None, Some(9)])) as ArrayRef,
        ),
        (
            Arc::new(Field::new("label", DataType::Utf8, true)),
            Arc::new(StringArray::from(vec![Some("a"), Some("b"), None])) as ArrayRef,
        ),
    ]);
    let schema = Schema::new(vec![
        Field::new("tags", tags.data_type().clone(), true),
        Field::new("point", point.data_type().clone(), true),
    ]);
    let batch = RecordBatch::try_new(
        Arc::new(schema),
        vec![Arc::new(tags) as ArrayRef, Arc::new(point) as ArrayRef],
    )
    .unwrap();
    let chunk = single_chunk(batch);

    let tags = chunk.column(0).unwrap();
    assert_eq!(tags.get::<Vec<i32>>(0).unwrap(), vec![1, 2]);
    assert!(tags.get::<Vec<i32>>(1).unwrap().is_empty());
    assert_eq!(tags.try_get::<Vec<i32>>(2).unwrap(), None);

    let point = chunk.column(1).unwrap();
    let Value::Struct(first) = point.get_value(0).unwrap() else {
        panic!("expected a struct row");
    };
    assert_eq!(first.get("x"), Some(&Value::Integer(7)));
    assert_eq!(first.get("label"), Some(&Value::Text("a".into())));
    let Value::Struct(second) = point.get_value(1).unwrap() else {
        panic!("expected a struct row");
    };
    assert_eq!(second.get("x"), Some(&Value::Null));
}

#[test]
fn timestamps_by_unit_and_zone() {
    let zoned = TimestampMicrosecondArray::from(vec![Some(0), None]).with_timezone("UTC");
    let local = TimestampMillisecondArray::from(vec![Some(1_500), Some(-1)]);
    let schema = Schema::new(vec![
        Field::new("zoned", zoned.data_type().clone(), true),
        Field::new("local", DataType::Timestamp(TimeUnit::Millisecond, None), true),
    ]);
    let batch = RecordBatch::try_new(
        Arc::new(schema),
        vec![Arc::new(zoned) as ArrayRef, Arc::new(local) as ArrayRef],
    )
    .unwrap();
    let chunk = single_chunk(batch);

    let zoned = chunk.column(0).unwrap();
    assert_eq!(zoned.kind(), ValueKind::TimestampTz);
    assert_eq!(
        zoned.get::<OffsetDateTime>(0).unwrap(),
        OffsetDateTime::UNIX_EPOCH
    );
    assert_eq!(zoned.try_get::<OffsetDateTime>(1).unwrap(), None);

    let local = chunk.column(1).unwrap();
    assert_eq!(local.kind(), ValueKind::TimestampMs);
    assert_eq!(local.get::<TimestampValue>(1).unwrap().micros, -1_000);
    assert_eq!(
        local.get::<OffsetDateTime>(0).unwrap(),
        OffsetDateTime::UNIX_EPOCH + time::Duration::milliseconds(1_500)
    );
}

#[test]
fn batches_share_one_schema() {
    let schema = Arc::new(Schema::new(vec![Field::new("n", DataType::Int32, false)]));
    let batches: Vec<RecordBatch> = [vec![1, 2], vec![3]]
        .into_iter()
        .map(|rows| {
            let column = Arc::new(Int32Array::from(rows)) as ArrayRef;
            RecordBatch::try_new(Arc::clone(&schema), vec![column]).unwrap()
        })
        .collect();
    let mut result = QueryResult::new(result_from_batches(&schema, &batches).unwrap()).unwrap();
    let totals: Vec<i64> = result
        .chunks()
        .map(|chunk| {
            let chunk = chunk.unwrap();
            chunk.column(0).unwrap().values::<i64>().unwrap().iter().sum()
        })
        .collect();
    assert_eq!(totals, vec![3, 3]);
}

#[test]
fn empty_result_takes_types_from_schema() {
    let schema = Schema::new(vec![
        Field::new("n", DataType::Int16, true),
        Field::new("s", DataType::LargeUtf8, true),
    ]);
    let mut result = QueryResult::new(result_from_batches(&schema, &[]).unwrap()).unwrap();
    assert_eq!(result.schema().len(), 2);
    assert_eq!(
        result.schema().column(1).unwrap().descriptor.kind(),
        ValueKind::Varchar
    );
    assert!(result.next_chunk().unwrap().is_none());
}

#[test]
fn differing_dictionaries_are_rejected() {
    let first: DictionaryArray<Int8Type> = vec!["a", "b"].into_iter().collect();
    let second: DictionaryArray<Int8Type> = vec!["c"].into_iter().collect();
    let schema = Arc::new(Schema::new(vec![Field::new(
        "e",
        first.data_type().clone(),
        false,
    )]));
    let batches = [
        RecordBatch::try_new(Arc::clone(&schema), vec![Arc::new(first) as ArrayRef]).unwrap(),
        RecordBatch::try_new(Arc::clone(&schema), vec![Arc::new(second) as ArrayRef]).unwrap(),
    ];
    assert!(matches!(
        result_from_batches(&schema, &batches),
        Err(Error::InvalidArgumentError(_))
    ));
}

#[test]
fn unsupported_types_report_arrow_errors() {
    let elapsed = DurationSecondArray::from(vec![5]);
    assert!(matches!(vector_from_array(&elapsed), Err(Error::Arrow(_))));

    let schema = Schema::new(vec![Field::new("d", elapsed.data_type().clone(), false)]);
    let batch =
        RecordBatch::try_new(Arc::new(schema), vec![Arc::new(elapsed) as ArrayRef]).unwrap();
    assert!(matches!(chunk_from_batch(&batch), Err(Error::Arrow(_))));
}
