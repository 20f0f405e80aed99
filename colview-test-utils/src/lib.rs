//! Shared helpers for colview test suites and benches.

use std::sync::Once;

use colview_native::MemVector;
use colview_result::Result;
use colview_types::{LogicalType, Value};
use colview_vector::Vector;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

static INIT: Once = Once::new();

/// Initialize tracing for test binaries. Safe to call multiple times.
///
/// Honors `RUST_LOG`; defaults to `info`.
pub fn init_tracing_for_tests() {
    INIT.call_once(|| {
        use tracing_subscriber::filter::EnvFilter;
        use tracing_subscriber::fmt;
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let _ = fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_test_writer()
            .try_init();
    });
}

#[cfg(feature = "auto-init")]
mod auto {
    use ctor::ctor;

    #[ctor]
    fn init() {
        super::init_tracing_for_tests();
    }
}

/// Deterministic RNG for generated fixtures.
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// `len` values from `gen_value`, each missing with probability `null_ratio`.
pub fn random_column<T, F>(
    rng: &mut StdRng,
    len: usize,
    null_ratio: f64,
    mut gen_value: F,
) -> Vec<Option<T>>
where
    F: FnMut(&mut StdRng) -> T,
{
    (0..len)
        .map(|_| {
            if rng.random_bool(null_ratio) {
                None
            } else {
                Some(gen_value(rng))
            }
        })
        .collect()
}

/// A [`Vector`] over an in-memory vector holding `values`.
pub fn vector_of(ty: impl Into<LogicalType>, values: &[Value]) -> Result<Vector> {
    let native = MemVector::from_values(ty.into(), values)?.into_handle();
    Vector::from_native(native, values.len())
}
