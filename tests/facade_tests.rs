//! End-to-end reads through the facade re-exports.

use colview::native::{MemChunk, MemResult, MemVector};
use colview::{Error, HostType, LogicalType, QueryResult, ReaderConfig, Value, ValueKind};
use colview_test_utils::init_tracing_for_tests;

colview::host_enum! {
    enum Mood {
        Calm = "calm",
        Loud = "loud",
    }
}

fn moods() -> MemResult {
    let ty = LogicalType::enumeration(["calm", "loud"]);
    let mood = MemVector::from_values(
        ty.clone(),
        &[Value::Enum("loud".into()), Value::Null, Value::Enum("calm".into())],
    )
    .unwrap();
    let score = MemVector::primitive(&[Some(3i16), Some(-1), None]);
    let mut result = MemResult::new(vec![
        ("mood".to_string(), ty),
        ("score".to_string(), ValueKind::SmallInt.into()),
    ]);
    result.push_chunk(MemChunk::new(vec![mood, score]).unwrap()).unwrap();
    result
}

#[test]
fn enum_and_runtime_targets() {
    init_tracing_for_tests();
    let mut result = QueryResult::new(moods()).unwrap();
    result.check_type::<Mood>(0).unwrap();
    assert!(matches!(
        result.check_type::<f64>(0),
        Err(Error::TypeMismatch { .. })
    ));

    let chunk = result.next_chunk().unwrap().expect("one chunk");
    let mood = chunk.column(0).unwrap();
    assert_eq!(mood.get::<Mood>(0).unwrap(), Mood::Loud);
    assert_eq!(mood.try_get::<Mood>(1).unwrap(), None);
    assert_eq!(mood.get_or_default::<Mood>(1).unwrap(), Mood::Calm);

    let score = chunk.column_by_name("score").unwrap();
    assert_eq!(
        score.get_as(0, &HostType::I64).unwrap(),
        Value::BigInt(3)
    );
    assert_eq!(
        score.get_as(2, &HostType::optional(HostType::I32)).unwrap(),
        Value::Null
    );
    assert!(matches!(
        score.get::<i32>(2),
        Err(Error::NullViolation { index: 2, .. })
    ));
}

#[test]
fn config_without_caches_reads_the_same() {
    let config = ReaderConfig {
        cache_converters: false,
        share_plans: false,
    };
    let mut result = QueryResult::new(moods()).unwrap().with_config(config);
    let chunk = result.next_chunk().unwrap().expect("one chunk");
    assert_eq!(
        chunk.column(1).unwrap().values::<Option<i16>>().unwrap(),
        vec![Some(3), Some(-1), None]
    );
}
