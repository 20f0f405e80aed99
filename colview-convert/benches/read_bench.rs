//! Element read paths over one in-memory BIGINT vector.
//!
//! Run:
//!   cargo bench -p colview-convert --bench read_bench

use std::hint::black_box;

use colview_convert::resolve;
use colview_native::MemVector;
use colview_test_utils::{random_column, seeded_rng};
use colview_types::Value;
use colview_vector::Vector;
use criterion::{Criterion, criterion_group, criterion_main};
use rand::Rng;

const ROWS: usize = 100_000;

fn fixture() -> Vector {
    let mut rng = seeded_rng(42);
    let values = random_column(&mut rng, ROWS, 0.1, |r| r.random::<i64>());
    let native = MemVector::primitive(&values).into_handle();
    Vector::from_native(native, ROWS).unwrap()
}

fn bench_read_paths(c: &mut Criterion) {
    let vector = fixture();
    let mut group = c.benchmark_group("read_100k_bigint");
    group.sample_size(30);

    group.bench_function("primitive_i64", |b| {
        let conv = resolve::<i64>(vector.column()).unwrap();
        b.iter(|| {
            let mut sum = 0i64;
            for i in 0..ROWS {
                sum = sum.wrapping_add(conv.convert(&vector, i, false).unwrap());
            }
            black_box(sum)
        })
    });

    group.bench_function("widened_i128", |b| {
        let conv = resolve::<i128>(vector.column()).unwrap();
        b.iter(|| {
            let mut sum = 0i128;
            for i in 0..ROWS {
                sum = sum.wrapping_add(conv.convert(&vector, i, false).unwrap());
            }
            black_box(sum)
        })
    });

    group.bench_function("optional_i64", |b| {
        let conv = resolve::<Option<i64>>(vector.column()).unwrap();
        b.iter(|| {
            let mut present = 0usize;
            for i in 0..ROWS {
                present += usize::from(conv.convert(&vector, i, true).unwrap().is_some());
            }
            black_box(present)
        })
    });

    group.bench_function("boxed_value", |b| {
        let conv = resolve::<Value>(vector.column()).unwrap();
        b.iter(|| {
            let mut present = 0usize;
            for i in 0..ROWS {
                present += usize::from(!conv.convert(&vector, i, true).unwrap().is_null());
            }
            black_box(present)
        })
    });

    group.bench_function("zero_copy_slice", |b| {
        b.iter(|| {
            let slice = vector.as_slice::<i64>().unwrap();
            black_box(slice.iter().fold(0i64, |acc, v| acc.wrapping_add(*v)))
        })
    });

    group.finish();
}

criterion_group!(benches, bench_read_paths);
criterion_main!(benches);
