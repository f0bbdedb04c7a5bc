//! Forward (explicit) Euler time-stepper
//!
//! # Mathematical Background
//!
//! Writing the problem as `∂ₜu = M⁻¹ (F(t) - L(u, t))`, the scheme advances
//! the state with the slope at the beginning of the step:
//!
//! ```text
//! u_{n+1} = u_n + dt · M⁻¹ (F(t_n) - L(u_n, t_n))
//! ```
//!
//! # Characteristics
//!
//! - **Order**: first-order accurate (error ~ O(dt))
//! - **Stability**: conditionally stable, `|1 - λ·dt| ≤ 1` for `L = λ·I`
//! - **Cost**: one operator evaluation (plus one mass solve) per step
//!
//! Nonlinear operators are supported since `L` is only applied, never
//! inverted.

use log::debug;
use std::sync::Arc;

use super::traits::{TimeStepper, TimeSteppingProblem, validate_nt, validate_state};
use super::trajectory::TrajectoryRecorder;
use crate::error::MorResult;
use crate::vectorarrays::VectorArray;

/// Forward Euler with a fixed number of equidistant steps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExplicitEulerTimeStepper {
    nt: usize,
}

impl ExplicitEulerTimeStepper {
    pub fn new(nt: usize) -> MorResult<Self> {
        validate_nt(nt)?;
        Ok(Self { nt })
    }
}

impl TimeStepper for ExplicitEulerTimeStepper {
    fn solve(&self, problem: &TimeSteppingProblem<'_>) -> MorResult<VectorArray> {
        problem.validate()?;

        let t0 = problem.initial_time;
        let dt = (problem.end_time - t0) / self.nt as f64;
        debug!("{}: {} steps of size {:e}", self.name(), self.nt, dt);

        let mut state = problem.initial_data.clone();
        let mut recorder =
            TrajectoryRecorder::new(&state, t0, problem.end_time, self.nt, problem.num_values);

        for step in 0..self.nt {
            let t = t0 + step as f64 * dt;

            // u_{n+1} = u_n + dt * f(u_n, t_n)
            let rate = problem.time_derivative(&state, t)?;
            state.axpy(dt, &rate)?;

            validate_state(&state, step + 1, self.name())?;
            recorder.record(t + dt, &state)?;
        }

        Ok(recorder.finish())
    }

    fn name(&self) -> &str {
        "explicit Euler"
    }

    fn nt(&self) -> Option<usize> {
        Some(self.nt)
    }

    fn with_nt(&self, nt: usize) -> MorResult<Arc<dyn TimeStepper>> {
        Ok(Arc::new(Self::new(nt)?))
    }
}
