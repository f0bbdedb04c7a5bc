//! Stand-in collaborators for testing
//!
//! Each one either counts how often it is used or records what it was
//! handed, so tests can observe what a discretization forwards.

use nalgebra::{DMatrix, DVector};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use mor_rs::discretizations::{Discretization, Estimator, VisualizeOptions, Visualizer};
use mor_rs::operators::Operator;
use mor_rs::parameters::{Parameter, ParameterType};
use mor_rs::timestepping::{TimeStepper, TimeSteppingProblem};
use mor_rs::vectorarrays::{VectorArray, VectorSpace};
use mor_rs::{MorError, MorResult};

// =================================================================================================
// Counting Operator
// =================================================================================================

/// Delegates to an inner operator and counts inverse solves
///
/// The counter is shared, so it stays readable after the operator has been
/// moved into a discretization.
#[derive(Debug)]
pub struct CountingOperator {
    inner: Arc<dyn Operator>,
    inverse_calls: Arc<AtomicUsize>,
}

impl CountingOperator {
    pub fn new(inner: Arc<dyn Operator>) -> (Self, Arc<AtomicUsize>) {
        let inverse_calls = Arc::new(AtomicUsize::new(0));
        let op = Self {
            inner,
            inverse_calls: Arc::clone(&inverse_calls),
        };
        (op, inverse_calls)
    }
}

impl Operator for CountingOperator {
    fn source(&self) -> &VectorSpace {
        self.inner.source()
    }

    fn range(&self) -> &VectorSpace {
        self.inner.range()
    }

    fn linear(&self) -> bool {
        self.inner.linear()
    }

    fn name(&self) -> &str {
        "counting"
    }

    fn parameter_type(&self) -> &ParameterType {
        self.inner.parameter_type()
    }

    fn apply(&self, u: &VectorArray, mu: Option<&Parameter>) -> MorResult<VectorArray> {
        self.inner.apply(u, mu)
    }

    fn matrix(&self, mu: Option<&Parameter>) -> MorResult<DMatrix<f64>> {
        self.inner.matrix(mu)
    }

    fn apply_inverse(&self, v: &VectorArray, mu: Option<&Parameter>) -> MorResult<VectorArray> {
        self.inverse_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.apply_inverse(v, mu)
    }
}

// =================================================================================================
// Exact Stepper: u(t) = exp(-M⁻¹L·(t - t0)) u0
// =================================================================================================

/// Exact integration of autonomous linear problems without load
///
/// Returns `num_values` (default 11) equidistant samples of the exact
/// solution, so any deviation comes from the discretization, not from a
/// truncation error.
#[derive(Debug, Default)]
pub struct ExactStepper;

impl TimeStepper for ExactStepper {
    fn solve(&self, problem: &TimeSteppingProblem<'_>) -> MorResult<VectorArray> {
        problem.validate()?;
        if problem.rhs.is_some() {
            return Err(MorError::Unsupported("exact stepper has no load".to_string()));
        }

        let mu = problem.mu_at(problem.initial_time);
        let l = problem.operator.matrix(Some(&mu))?;
        let generator = match problem.mass {
            Some(mass) => mass
                .matrix(Some(&mu))?
                .lu()
                .solve(&l)
                .ok_or_else(|| MorError::NumericalSolve("singular mass".to_string()))?,
            None => l,
        };

        let u0: DVector<f64> = problem.initial_data.data().column(0).into_owned();
        let num_values = problem.num_values.unwrap_or(11);
        let span = problem.end_time - problem.initial_time;

        let states: Vec<DVector<f64>> = (0..num_values)
            .map(|k| {
                let t = if num_values == 1 {
                    0.0
                } else {
                    span * k as f64 / (num_values - 1) as f64
                };
                (-(&generator) * t).exp() * &u0
            })
            .collect();
        VectorArray::from_vectors(problem.initial_data.space().clone(), &states)
    }

    fn name(&self) -> &str {
        "exact"
    }
}

// =================================================================================================
// Recording Estimator & Visualizer
// =================================================================================================

/// Returns the number of vectors as error and records who asked
#[derive(Debug, Default)]
pub struct RecordingEstimator {
    pub calls: Mutex<Vec<String>>,
}

impl Estimator for RecordingEstimator {
    fn estimate(
        &self,
        u: &VectorArray,
        _mu: Option<&Parameter>,
        discretization: &dyn Discretization,
    ) -> MorResult<DVector<f64>> {
        self.calls
            .lock()
            .unwrap()
            .push(discretization.name().to_string());
        Ok(DVector::from_element(u.len(), u.len() as f64))
    }
}

/// Records discretization name and title of every call
#[derive(Debug, Default)]
pub struct RecordingVisualizer {
    pub calls: Mutex<Vec<(String, Option<String>)>>,
}

impl Visualizer for RecordingVisualizer {
    fn visualize(
        &self,
        _u: &VectorArray,
        discretization: &dyn Discretization,
        options: &VisualizeOptions,
    ) -> MorResult<()> {
        self.calls
            .lock()
            .unwrap()
            .push((discretization.name().to_string(), options.title.clone()));
        Ok(())
    }
}
