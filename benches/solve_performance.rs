//! Performance benchmarks for discretization solves
//!
//! # What We're Measuring
//!
//! 1. **Stationary solve**: one LU factorization per call, `O(n³)`
//! 2. **Time-steppers** on the same decay problem:
//!    - Implicit Euler: one factorization, then one triangular solve per step
//!    - Explicit Euler: one operator application per step
//!    - RK4: four operator applications per step
//! 3. **Cache hit**: parameter validation plus a lookup, independent of `n`
//!
//! # Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench --bench solve_performance
//!
//! # Run only the time-stepper comparison
//! cargo bench --bench solve_performance timestepping
//! ```

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use nalgebra::DMatrix;
use std::hint::black_box;
use std::sync::Arc;
use std::time::Duration;

use mor_rs::cache::MemoryRegion;
use mor_rs::discretizations::{Discretization, InstationaryDiscretization, StationaryDiscretization};
use mor_rs::operators::{MatrixOperator, Operator, VectorFunctional};
use mor_rs::timestepping::{
    ExplicitEulerTimeStepper, ImplicitEulerTimeStepper, RungeKutta4TimeStepper, TimeStepper,
};
use mor_rs::vectorarrays::{VectorArray, VectorSpace};

// =================================================================================================
// Problem Setup
// =================================================================================================

/// 1D finite-difference Laplacian (scaled to unit mesh width)
///
/// Symmetric positive definite, so every scheme is well posed and implicit
/// Euler is unconditionally stable.
fn laplacian(n: usize) -> Arc<dyn Operator> {
    let mut m = DMatrix::zeros(n, n);
    for i in 0..n {
        m[(i, i)] = 2.0;
        if i > 0 {
            m[(i, i - 1)] = -1.0;
        }
        if i + 1 < n {
            m[(i, i + 1)] = -1.0;
        }
    }
    Arc::new(MatrixOperator::new(m))
}

fn ones(n: usize) -> VectorArray {
    VectorArray::from_vec(VectorSpace::new(n), vec![1.0; n]).unwrap()
}

fn stationary(n: usize) -> StationaryDiscretization {
    StationaryDiscretization::new(laplacian(n), Arc::new(VectorFunctional::new(ones(n)).unwrap()))
        .unwrap()
}

fn instationary(n: usize, stepper: Arc<dyn TimeStepper>) -> InstationaryDiscretization {
    InstationaryDiscretization::builder(1.0)
        .operator(laplacian(n))
        .initial_data(ones(n))
        .time_stepper(stepper)
        .build()
        .unwrap()
}

// =================================================================================================
// Benchmark Functions
// =================================================================================================

/// Stationary solve with different problem sizes
fn benchmark_stationary_solve(c: &mut Criterion) {
    let mut group = c.benchmark_group("stationary");

    for n in [10, 50, 100, 200].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(n), n, |b, &n| {
            let d = stationary(n);
            b.iter(|| d.solve(black_box(None)).unwrap());
        });
    }

    group.finish();
}

/// The three schemes on the same problem and step count
///
/// The step count keeps the explicit schemes stable for `n = 50`
/// (`dt·λ_max ≈ 4/400 = 0.01`).
fn benchmark_timestepping(c: &mut Criterion) {
    let mut group = c.benchmark_group("timestepping");
    group.measurement_time(Duration::from_secs(10));
    group.sample_size(50);

    let n = 50;
    let nt = 400;
    let steppers: Vec<(&str, Arc<dyn TimeStepper>)> = vec![
        ("implicit_euler", Arc::new(ImplicitEulerTimeStepper::new(nt).unwrap())),
        ("explicit_euler", Arc::new(ExplicitEulerTimeStepper::new(nt).unwrap())),
        ("rk4", Arc::new(RungeKutta4TimeStepper::new(nt).unwrap())),
    ];

    for (name, stepper) in steppers {
        let d = instationary(n, stepper);
        group.bench_function(name, |b| b.iter(|| d.solve(black_box(None)).unwrap()));
    }

    group.finish();
}

/// Repeated solves served from a cache region
fn benchmark_cache_hit(c: &mut Criterion) {
    let d = StationaryDiscretization::builder()
        .operator(laplacian(200))
        .rhs(Arc::new(VectorFunctional::new(ones(200)).unwrap()))
        .cache_region(Arc::new(MemoryRegion::new()))
        .build()
        .unwrap();
    d.solve(None).unwrap();

    c.bench_function("cache_hit", |b| b.iter(|| d.solve(black_box(None)).unwrap()));
}

criterion_group!(
    benches,
    benchmark_stationary_solve,
    benchmark_timestepping,
    benchmark_cache_hit,
);

criterion_main!(benches);
