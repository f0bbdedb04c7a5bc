//! Backward (implicit) Euler time-stepper
//!
//! # Mathematical Background
//!
//! For `M ∂ₜu + L(t) u = F(t)` the scheme advances the state by solving
//!
//! ```text
//! (M + dt·L(t_{n+1})) u_{n+1} = M u_n + dt·F(t_{n+1})
//! ```
//!
//! # Characteristics
//!
//! - **Order**: first-order accurate
//! - **Stability**: unconditionally stable for positive semi-definite `L`
//! - **Cost**: one linear solve per step; the system is factorized once when
//!   neither `L` nor `M` depends on time
//!
//! Only linear, assemblable operators are supported.

use log::debug;
use nalgebra::linalg::LU;
use nalgebra::{DMatrix, Dyn};
use std::sync::Arc;

use super::traits::{TimeStepper, TimeSteppingProblem, validate_nt, validate_state};
use super::trajectory::TrajectoryRecorder;
use crate::error::{MorError, MorResult};
use crate::operators::Operator;
use crate::parameters::{Parameter, TIME_PARAMETER};
use crate::vectorarrays::VectorArray;

/// Implicit Euler with a fixed number of equidistant steps
///
/// # Example
///
/// ```rust
/// use mor_rs::operators::IdentityOperator;
/// use mor_rs::timestepping::{ImplicitEulerTimeStepper, TimeStepper, TimeSteppingProblem};
/// use mor_rs::vectorarrays::{VectorArray, VectorSpace};
///
/// let space = VectorSpace::new(1);
/// let op = IdentityOperator::new(space.clone());
/// let u0 = VectorArray::from_vec(space, vec![1.0])?;
///
/// let stepper = ImplicitEulerTimeStepper::new(10)?;
/// let trajectory = stepper.solve(&TimeSteppingProblem::new(&op, &u0, 1.0))?;
///
/// assert_eq!(trajectory.len(), 11);
/// # Ok::<(), mor_rs::MorError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImplicitEulerTimeStepper {
    nt: usize,
}

impl ImplicitEulerTimeStepper {
    pub fn new(nt: usize) -> MorResult<Self> {
        validate_nt(nt)?;
        Ok(Self { nt })
    }
}

/// Factorized `M + dt·L`
struct SystemMatrix {
    lu: LU<f64, Dyn, Dyn>,
    mass: DMatrix<f64>,
}

impl SystemMatrix {
    fn assemble(problem: &TimeSteppingProblem<'_>, dt: f64, mu: &Parameter) -> MorResult<Self> {
        let n = problem.operator.source().dim();
        let mass = match problem.mass {
            Some(mass) => mass.matrix(Some(mu))?,
            None => DMatrix::identity(n, n),
        };
        let system = &mass + problem.operator.matrix(Some(mu))? * dt;
        Ok(Self {
            lu: system.lu(),
            mass,
        })
    }

    fn step(&self, u: &VectorArray, load: Option<&VectorArray>, dt: f64) -> MorResult<VectorArray> {
        let mut rhs = &self.mass * u.data();
        if let Some(f) = load {
            rhs += f.data() * dt;
        }
        let next = self.lu.solve(&rhs).ok_or_else(|| {
            MorError::NumericalSolve("implicit Euler system matrix is singular".to_string())
        })?;
        VectorArray::from_data(u.space().clone(), next)
    }
}

fn depends_on_time(op: Option<&dyn Operator>) -> bool {
    op.is_some_and(|op| op.parameter_type().contains(TIME_PARAMETER))
}

impl TimeStepper for ImplicitEulerTimeStepper {
    fn solve(&self, problem: &TimeSteppingProblem<'_>) -> MorResult<VectorArray> {
        // ====== Step 1: Validation ======

        problem.validate()?;
        for op in [Some(problem.operator), problem.mass, problem.rhs]
            .into_iter()
            .flatten()
        {
            if !op.linear() {
                return Err(MorError::Unsupported(format!(
                    "implicit Euler requires linear operators, '{}' is nonlinear",
                    op.name()
                )));
            }
        }

        // ====== Step 2: Setup ======

        let t0 = problem.initial_time;
        let dt = (problem.end_time - t0) / self.nt as f64;
        let system_depends_on_time =
            depends_on_time(Some(problem.operator)) || depends_on_time(problem.mass);
        let rhs_depends_on_time = depends_on_time(problem.rhs);

        debug!(
            "{}: {} steps of size {:e} on [{}, {}]",
            self.name(),
            self.nt,
            dt,
            t0,
            problem.end_time
        );

        let mu0 = problem.mu_at(t0);
        let mut system = SystemMatrix::assemble(problem, dt, &mu0)?;
        let mut load = match problem.rhs {
            Some(rhs) if !rhs_depends_on_time => Some(rhs.as_source_array(Some(&mu0))?),
            _ => None,
        };

        let mut state = problem.initial_data.clone();
        let mut recorder =
            TrajectoryRecorder::new(&state, t0, problem.end_time, self.nt, problem.num_values);

        // ====== Step 3: Time Integration ======

        for step in 0..self.nt {
            // computed from the index to avoid accumulating rounding errors
            let t = t0 + (step as f64 + 1.0) * dt;

            if system_depends_on_time || rhs_depends_on_time {
                let mu = problem.mu_at(t);
                if system_depends_on_time {
                    system = SystemMatrix::assemble(problem, dt, &mu)?;
                }
                if let Some(rhs) = problem.rhs.filter(|_| rhs_depends_on_time) {
                    load = Some(rhs.as_source_array(Some(&mu))?);
                }
            }

            state = system.step(&state, load.as_ref(), dt)?;
            validate_state(&state, step + 1, self.name())?;
            recorder.record(t, &state)?;
        }

        Ok(recorder.finish())
    }

    fn name(&self) -> &str {
        "implicit Euler"
    }

    fn nt(&self) -> Option<usize> {
        Some(self.nt)
    }

    fn with_nt(&self, nt: usize) -> MorResult<Arc<dyn TimeStepper>> {
        Ok(Arc::new(Self::new(nt)?))
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operators::{
        Coefficient, IdentityOperator, LincombOperator, MatrixOperator, VectorFunctional,
    };
    use crate::parameters::{GenericParameterFunctional, ParameterType};
    use crate::vectorarrays::VectorSpace;
    use approx::assert_relative_eq;

    fn decay_operator(rate: f64) -> MatrixOperator {
        MatrixOperator::new(DMatrix::from_diagonal_element(1, 1, rate))
    }

    #[test]
    fn test_zero_steps_rejected() {
        assert!(ImplicitEulerTimeStepper::new(0).is_err());
    }

    #[test]
    fn test_matches_closed_form_recursion() {
        // u_{n+1} = u_n / (1 + λ dt)
        let op = decay_operator(2.0);
        let u0 = VectorArray::from_vec(VectorSpace::new(1), vec![1.0]).unwrap();
        let stepper = ImplicitEulerTimeStepper::new(4).unwrap();
        let trajectory = stepper
            .solve(&TimeSteppingProblem::new(&op, &u0, 1.0))
            .unwrap();

        let values: Vec<f64> = trajectory.to_vecs().into_iter().map(|v| v[0]).collect();
        for (n, value) in values.iter().enumerate() {
            assert_relative_eq!(*value, 1.5f64.powi(-(n as i32)), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_converges_to_stationary_solution() {
        // ∂ₜu + u = 3 tends to u = 3
        let space = VectorSpace::new(1);
        let op = IdentityOperator::new(space.clone());
        let rhs = VectorFunctional::new(VectorArray::from_vec(space.clone(), vec![3.0]).unwrap())
            .unwrap();
        let u0 = VectorArray::zeros(space, 1);

        let mut problem = TimeSteppingProblem::new(&op, &u0, 50.0);
        problem.rhs = Some(&rhs);
        let trajectory = ImplicitEulerTimeStepper::new(100)
            .unwrap()
            .solve(&problem)
            .unwrap();
        assert_relative_eq!(trajectory.last().unwrap()[0], 3.0, epsilon = 1e-8);
    }

    #[test]
    fn test_time_dependent_operator_is_reassembled() {
        // ∂ₜu + t·u = 0 has u = exp(-t²/2)
        let space = VectorSpace::new(1);
        let theta = Arc::new(GenericParameterFunctional::new(
            "t",
            ParameterType::scalar(TIME_PARAMETER),
            |mu| mu.scalar(TIME_PARAMETER).unwrap_or_default(),
        ));
        let id: Arc<dyn Operator> = Arc::new(IdentityOperator::new(space.clone()));
        let op = LincombOperator::new(vec![id], vec![Coefficient::Parametric(theta)]).unwrap();
        let u0 = VectorArray::from_vec(space, vec![1.0]).unwrap();

        let trajectory = ImplicitEulerTimeStepper::new(2000)
            .unwrap()
            .solve(&TimeSteppingProblem::new(&op, &u0, 1.0))
            .unwrap();
        assert_relative_eq!(
            trajectory.last().unwrap()[0],
            (-0.5f64).exp(),
            epsilon = 1e-3
        );
    }

    #[test]
    fn test_num_values_subsamples() {
        let op = decay_operator(1.0);
        let u0 = VectorArray::from_vec(VectorSpace::new(1), vec![1.0]).unwrap();
        let mut problem = TimeSteppingProblem::new(&op, &u0, 1.0);
        problem.num_values = Some(5);
        let trajectory = ImplicitEulerTimeStepper::new(100)
            .unwrap()
            .solve(&problem)
            .unwrap();
        assert_eq!(trajectory.len(), 5);
    }

    #[test]
    fn test_with_nt() {
        let stepper = ImplicitEulerTimeStepper::new(10).unwrap();
        let finer = stepper.with_nt(20).unwrap();
        assert_eq!(finer.nt(), Some(20));
        assert!(stepper.with_nt(0).is_err());
    }
}
