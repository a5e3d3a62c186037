//! Benchmarking utilities
//!
//! Please consider using the macros provided by this crate instead of calling
//! these implementation details directly.

use crate::Simulate;
use criterion::{BenchmarkId, Criterion, Throughput};
use data::{
    concentration::Species,
    parameters::{Boundary, Parameters},
};
use std::{hint::black_box, sync::Once};

/// Re-export criterion for the criterion_benchmark macro
pub use criterion;

// Make sure env_logger is only initialized once
fn init_logger() {
    static INIT_LOGGER: Once = Once::new();
    INIT_LOGGER.call_once(env_logger::init);
}

/// Common criterion benchmark for all Gray-Scott reaction computations
/// Use via the criterion_benchmark macro
pub fn criterion_benchmark<Simulation: Simulate>(c: &mut Criterion, backend_name: &str) {
    init_logger();

    let sim = Simulation::new(black_box(Parameters::default()));
    let mut group = c.benchmark_group(backend_name.to_owned());
    for boundary in [Boundary::Clamped, Boundary::Toroidal] {
        for size_pow2 in 3..=10 {
            let size = 2usize.pow(size_pow2);
            let num_elems = (size * size) as u64;

            let mut species = Species::new(size, black_box(size), boundary)
                .expect("Benchmark grid sizes are valid");

            group.throughput(Throughput::Elements(num_elems));
            group.bench_function(
                BenchmarkId::from_parameter(format!("{boundary},{size}x{size}elems")),
                |b| {
                    b.iter(|| sim.perform_steps(&mut species, 1));
                },
            );
            black_box(species);
        }
    }
    group.finish();
}
