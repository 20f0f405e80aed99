use std::sync::Arc;

use colview_convert::{HostValue, resolve, resolve_dynamic};
use colview_native::MemVector;
use colview_result::Error;
use colview_test_utils::{init_tracing_for_tests, random_column, seeded_rng, vector_of};
use colview_types::{
    BitString, HostType, IntervalValue, LogicalType, StructValue, TimeTzValue, TimeValue, Value,
    ValueKind, VarInt,
};
use colview_vector::Vector;
use rand::Rng;
use time::macros::{date, datetime, time};
use time::{Duration, OffsetDateTime, PrimitiveDateTime};

colview_convert::host_enum! {
    enum Color {
        Red = "RED",
        Green = "GREEN",
        Blue = "BLUE",
    }
}

fn names(items: &[&str]) -> Arc<[String]> {
    items.iter().map(|s| s.to_string()).collect::<Vec<_>>().into()
}

#[test]
fn primitive_round_trip() {
    init_tracing_for_tests();
    let mut rng = seeded_rng(0x5eed);
    let values = random_column(&mut rng, 1_000, 0.2, |r| r.random::<i32>());
    let native = MemVector::primitive(&values).into_handle();
    let vector = Vector::from_native(native, values.len()).unwrap();

    let conv = resolve::<i32>(vector.column()).unwrap();
    let wide = resolve::<i128>(vector.column()).unwrap();
    for (i, expected) in values.iter().enumerate() {
        assert_eq!(conv.try_convert(&vector, i).unwrap(), *expected);
        assert_eq!(
            wide.try_convert(&vector, i).unwrap(),
            expected.map(i128::from)
        );
    }
}

#[test]
fn boxed_and_optional_preserve_structure() {
    let vector = vector_of(ValueKind::BigInt, &[Value::BigInt(42), Value::Null]).unwrap();

    let boxed = resolve::<Value>(vector.column()).unwrap();
    assert_eq!(boxed.convert(&vector, 0, true).unwrap(), Value::BigInt(42));
    assert_eq!(boxed.convert(&vector, 1, true).unwrap(), Value::Null);

    let optional = resolve::<Option<i64>>(vector.column()).unwrap();
    assert_eq!(optional.convert(&vector, 0, true).unwrap(), Some(42));
    assert_eq!(optional.convert(&vector, 1, true).unwrap(), None);

    let nested = resolve::<Option<Value>>(vector.column()).unwrap();
    assert_eq!(
        nested.convert(&vector, 0, true).unwrap(),
        Some(Value::BigInt(42))
    );
}

#[test]
fn list_fidelity() {
    let rows = [
        Value::List(vec![Value::Integer(10), Value::Integer(20), Value::Integer(30)]),
        Value::List(Vec::new()),
    ];
    let vector = vector_of(LogicalType::list(ValueKind::Integer), &rows).unwrap();
    let plan = resolve::<Vec<i32>>(vector.column()).unwrap();
    let conv = plan.bind_to_vector(&vector).unwrap();
    assert_eq!(conv.convert(&vector, 0, true).unwrap(), vec![10, 20, 30]);
    assert_eq!(conv.convert(&vector, 1, true).unwrap(), Vec::<i32>::new());

    let boxed = resolve::<Value>(vector.column())
        .unwrap()
        .prepare(&vector)
        .unwrap();
    assert_eq!(boxed.convert(&vector, 0, true).unwrap(), rows[0]);
}

#[test]
fn struct_fidelity() {
    let ty = LogicalType::structure([
        ("id", LogicalType::from(ValueKind::Integer)),
        ("tag", LogicalType::from(ValueKind::Varchar)),
    ]);
    let fields = names(&["id", "tag"]);
    let row = |id: i32, tag: &str| {
        Value::Struct(StructValue::new(
            Arc::clone(&fields),
            vec![Value::Integer(id), Value::Text(tag.into())],
        ))
    };
    let vector = vector_of(ty, &[row(1, "a"), row(4, "b"), row(7, "x")]).unwrap();
    let conv = resolve::<StructValue>(vector.column())
        .unwrap()
        .prepare(&vector)
        .unwrap();
    let value = conv.convert(&vector, 2, true).unwrap();
    assert_eq!(value.values(), &[Value::Integer(7), Value::Text("x".into())]);
    assert_eq!(value.names(), &*fields);
}

#[test]
fn enum_round_trip_and_mismatch() {
    let ty = LogicalType::enumeration(["RED", "BLUE", "GREEN"]);
    let vector = vector_of(ty, &[Value::UTinyInt(1), Value::Enum("GREEN".into())]).unwrap();

    let conv = resolve::<Color>(vector.column()).unwrap();
    assert_eq!(conv.convert(&vector, 0, true).unwrap(), Color::Blue);
    assert_eq!(conv.convert(&vector, 1, true).unwrap(), Color::Green);
    assert_eq!(
        resolve::<String>(vector.column())
            .unwrap()
            .convert(&vector, 0, true)
            .unwrap(),
        "BLUE"
    );
    assert_eq!(
        resolve::<u8>(vector.column())
            .unwrap()
            .convert(&vector, 0, true)
            .unwrap(),
        1
    );

    let other = LogicalType::enumeration(["RED", "PURPLE"]);
    let vector = vector_of(other, &[Value::UTinyInt(1)]).unwrap();
    let conv = resolve::<Color>(vector.column()).unwrap();
    assert!(matches!(
        conv.convert(&vector, 0, true),
        Err(Error::DomainMismatch(_))
    ));
}

#[test]
fn type_mismatch_fails_at_resolution() {
    let vector = vector_of(ValueKind::Integer, &[Value::Integer(1)]).unwrap();
    assert!(matches!(
        resolve::<f64>(vector.column()),
        Err(Error::TypeMismatch { .. })
    ));
    assert!(matches!(
        resolve::<u32>(vector.column()),
        Err(Error::TypeMismatch { .. })
    ));
    assert!(matches!(
        resolve_dynamic(vector.column(), &HostType::String),
        Err(Error::TypeMismatch { .. })
    ));
}

#[test]
fn null_required_versus_default() {
    let vector = vector_of(ValueKind::Double, &[Value::Null]).unwrap();
    let conv = resolve::<f64>(vector.column()).unwrap();
    assert!(matches!(
        conv.convert(&vector, 0, true),
        Err(Error::NullViolation { index: 0, .. })
    ));
    assert_eq!(conv.convert(&vector, 0, false).unwrap(), 0.0);
    assert!(matches!(
        conv.convert(&vector, 1, false),
        Err(Error::IndexOutOfRange { index: 1, len: 1 })
    ));
}

#[test]
fn second_bind_fails() {
    let rows = [Value::List(vec![Value::Integer(1)])];
    let vector = vector_of(LogicalType::list(ValueKind::Integer), &rows).unwrap();
    let plan = resolve::<Vec<i32>>(vector.column()).unwrap();
    assert!(matches!(
        plan.convert(&vector, 0, true),
        Err(Error::NotBound { .. })
    ));
    let bound = plan.bind_to_vector(&vector).unwrap();
    assert!(matches!(
        bound.bind_to_vector(&vector),
        Err(Error::AlreadyBound { .. })
    ));
    // The plan itself can still be bound to other vectors.
    assert!(plan.bind_to_vector(&vector).is_ok());
}

#[test]
fn converter_rejects_vectors_of_another_kind() {
    let ints = vector_of(ValueKind::Integer, &[Value::Integer(1)]).unwrap();
    let longs = vector_of(ValueKind::BigInt, &[Value::BigInt(1)]).unwrap();
    let conv = resolve::<i64>(ints.column()).unwrap();
    assert!(matches!(
        conv.convert(&longs, 0, true),
        Err(Error::TypeMismatch { .. })
    ));
}

#[test]
fn temporal_targets() {
    let dates = vector_of(ValueKind::Date, &[Value::Date(date!(2024 - 02 - 29))]).unwrap();
    assert_eq!(
        resolve::<time::Date>(dates.column())
            .unwrap()
            .convert(&dates, 0, true)
            .unwrap(),
        date!(2024 - 02 - 29)
    );
    assert_eq!(
        resolve::<PrimitiveDateTime>(dates.column())
            .unwrap()
            .convert(&dates, 0, true)
            .unwrap(),
        datetime!(2024 - 02 - 29 0:00)
    );

    let instant = datetime!(2021 - 06 - 01 12:30:15.25 UTC);
    let stamps = vector_of(ValueKind::TimestampTz, &[Value::TimestampTz(instant)]).unwrap();
    assert_eq!(
        resolve::<OffsetDateTime>(stamps.column())
            .unwrap()
            .convert(&stamps, 0, true)
            .unwrap(),
        instant
    );
    assert_eq!(
        resolve::<PrimitiveDateTime>(stamps.column())
            .unwrap()
            .convert(&stamps, 0, true)
            .unwrap(),
        datetime!(2021 - 06 - 01 12:30:15.25)
    );

    let times = vector_of(
        ValueKind::Time,
        &[Value::Time(time!(23:59:59)), Value::RawTime(TimeValue::new(86_400_000_000))],
    )
    .unwrap();
    let conv = resolve::<time::Time>(times.column()).unwrap();
    assert_eq!(conv.convert(&times, 0, true).unwrap(), time!(23:59:59));
    assert!(matches!(
        conv.convert(&times, 1, true),
        Err(Error::DomainMismatch(_))
    ));

    let tz = TimeTzValue::new(TimeValue::new(3_600_000_000), -7_200);
    let tzs = vector_of(ValueKind::TimeTz, &[Value::TimeTz(tz)]).unwrap();
    assert_eq!(
        resolve::<TimeTzValue>(tzs.column())
            .unwrap()
            .convert(&tzs, 0, true)
            .unwrap(),
        tz
    );
}

#[test]
fn intervals_to_durations() {
    let vector = vector_of(
        ValueKind::Interval,
        &[
            Value::Interval(IntervalValue::new(0, 2, 1_500_000)),
            Value::Interval(IntervalValue::new(1, 0, 0)),
        ],
    )
    .unwrap();
    let conv = resolve::<Duration>(vector.column()).unwrap();
    assert_eq!(
        conv.convert(&vector, 0, true).unwrap(),
        Duration::days(2) + Duration::milliseconds(1_500)
    );
    assert!(matches!(
        conv.convert(&vector, 1, true),
        Err(Error::DomainMismatch(_))
    ));
    let raw = resolve::<IntervalValue>(vector.column()).unwrap();
    assert_eq!(raw.convert(&vector, 1, true).unwrap().months, 1);
}

#[test]
fn string_like_targets() {
    let bits = BitString::from_bits([true, false, true]);
    let vector = vector_of(ValueKind::Bit, &[Value::Bit(bits.clone())]).unwrap();
    assert_eq!(
        resolve::<BitString>(vector.column())
            .unwrap()
            .convert(&vector, 0, true)
            .unwrap(),
        bits
    );
    assert_eq!(
        resolve::<String>(vector.column())
            .unwrap()
            .convert(&vector, 0, true)
            .unwrap(),
        "101"
    );

    let big = VarInt::from_i128(-123_456_789_012_345_678_901);
    let vector = vector_of(ValueKind::VarInt, &[Value::VarInt(big.clone())]).unwrap();
    assert_eq!(
        resolve::<String>(vector.column())
            .unwrap()
            .convert(&vector, 0, true)
            .unwrap(),
        "-123456789012345678901"
    );

    let id = uuid::Uuid::from_u128(0x0123_4567_89ab_cdef_0123_4567_89ab_cdef);
    let vector = vector_of(ValueKind::Uuid, &[Value::Uuid(id)]).unwrap();
    assert_eq!(
        resolve::<uuid::Uuid>(vector.column())
            .unwrap()
            .convert(&vector, 0, true)
            .unwrap(),
        id
    );

    let invalid: &[u8] = &[0x66, 0xff, 0x6f];
    let native = MemVector::from_strings(LogicalType::from(ValueKind::Varchar), &[Some(invalid)])
        .unwrap()
        .into_handle();
    let vector = Vector::from_native(native, 1).unwrap();
    assert!(matches!(
        resolve::<String>(vector.column())
            .unwrap()
            .convert(&vector, 0, true),
        Err(Error::DomainMismatch(_))
    ));
}

#[test]
fn decimal_targets() {
    let ty = LogicalType::decimal(9, 3).unwrap();
    let vector = vector_of(ty, &[Value::Decimal(rust_decimal::Decimal::new(-12_345, 3))]).unwrap();
    assert_eq!(
        resolve::<rust_decimal::Decimal>(vector.column())
            .unwrap()
            .convert(&vector, 0, true)
            .unwrap(),
        rust_decimal::Decimal::new(-12_345, 3)
    );
    let approx = resolve::<f64>(vector.column())
        .unwrap()
        .convert(&vector, 0, true)
        .unwrap();
    assert!((approx + 12.345).abs() < 1e-9);
}

#[test]
fn host_enum_values_box_by_name() {
    assert_eq!(Color::Blue.into_value(), Value::Enum("BLUE".into()));
    assert_eq!(
        Color::host_type(),
        HostType::Enum {
            name: "Color",
            members: vec!["RED", "GREEN", "BLUE"],
        }
    );
}
