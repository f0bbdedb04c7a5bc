//! Helper functions for integration tests

use nalgebra::DMatrix;
use std::sync::Arc;

use mor_rs::discretizations::InstationaryDiscretization;
use mor_rs::operators::{IdentityOperator, MatrixOperator, Operator, VectorFunctional};
use mor_rs::timestepping::TimeStepper;
use mor_rs::vectorarrays::{VectorArray, VectorSpace};

pub fn vector(values: &[f64]) -> VectorArray {
    VectorArray::from_vec(VectorSpace::new(values.len()), values.to_vec()).unwrap()
}

pub fn identity(dim: usize) -> Arc<dyn Operator> {
    Arc::new(IdentityOperator::new(VectorSpace::new(dim)))
}

/// `λ·I` as an assemblable matrix operator
pub fn scaled_identity(dim: usize, lambda: f64) -> Arc<dyn Operator> {
    Arc::new(MatrixOperator::new(DMatrix::identity(dim, dim) * lambda))
}

/// Inner product with `values`
pub fn functional(values: &[f64]) -> Arc<dyn Operator> {
    Arc::new(VectorFunctional::new(vector(values)).unwrap())
}

/// `∂ₜu + λu = 0` on `[0, t_end]`
pub fn decay_discretization(
    lambda: f64,
    u0: &[f64],
    t_end: f64,
    time_stepper: Arc<dyn TimeStepper>,
) -> InstationaryDiscretization {
    InstationaryDiscretization::builder(t_end)
        .operator(scaled_identity(u0.len(), lambda))
        .mass(identity(u0.len()))
        .initial_data(vector(u0))
        .time_stepper(time_stepper)
        .build()
        .unwrap()
}

/// Assert that two arrays agree entry-wise (within tolerance)
pub fn assert_arrays_close(
    actual: &VectorArray,
    expected: &VectorArray,
    tolerance: f64,
    message: &str,
) {
    assert_eq!(actual.len(), expected.len(), "{}: length mismatch", message);
    assert_eq!(actual.dim(), expected.dim(), "{}: dimension mismatch", message);

    for (i, (a, e)) in actual.data().iter().zip(expected.data().iter()).enumerate() {
        let diff = (a - e).abs();
        assert!(
            diff < tolerance,
            "{}: entry {} differs by {} (tolerance {})",
            message,
            i,
            diff,
            tolerance
        );
    }
}
