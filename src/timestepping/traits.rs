//! Time-stepper trait and the problem it integrates
//!
//! This module defines the contract between instationary discretizations and
//! numerical integrators:
//! - `TimeSteppingProblem`: everything needed to integrate
//!   `M ∂ₜu + L(u, t, μ) = F(t, μ)` over `[t0, t1]`
//! - `TimeStepper`: integrates a problem into a trajectory

use std::fmt;
use std::sync::Arc;

use crate::error::{MorError, MorResult};
use crate::operators::Operator;
use crate::parameters::{Parameter, TIME_PARAMETER};
use crate::vectorarrays::VectorArray;

// =================================================================================================
// Problem
// =================================================================================================

/// Inputs of one time integration
///
/// `rhs` is a functional (its source array is the load vector), `mass`
/// defaults to the identity.
#[derive(Debug, Clone, Copy)]
pub struct TimeSteppingProblem<'a> {
    pub operator: &'a dyn Operator,
    pub rhs: Option<&'a dyn Operator>,
    pub initial_data: &'a VectorArray,
    pub mass: Option<&'a dyn Operator>,
    pub initial_time: f64,
    pub end_time: f64,
    pub mu: Option<&'a Parameter>,
    pub num_values: Option<usize>,
}

impl<'a> TimeSteppingProblem<'a> {
    /// Problem on `[0, end_time]` without load, mass or parameter
    pub fn new(operator: &'a dyn Operator, initial_data: &'a VectorArray, end_time: f64) -> Self {
        Self {
            operator,
            rhs: None,
            initial_data,
            mass: None,
            initial_time: 0.0,
            end_time,
            mu: None,
            num_values: None,
        }
    }

    /// Check dimensions and the time interval
    pub fn validate(&self) -> MorResult<()> {
        let space = self.operator.source();

        if !(self.initial_time.is_finite() && self.end_time.is_finite()) {
            return Err(MorError::Configuration(format!(
                "time interval [{}, {}] is not finite",
                self.initial_time, self.end_time
            )));
        }
        if self.end_time <= self.initial_time {
            return Err(MorError::Configuration(format!(
                "end time {} must be after initial time {}",
                self.end_time, self.initial_time
            )));
        }
        if self.num_values == Some(0) {
            return Err(MorError::Configuration(
                "num_values must be greater than 0".to_string(),
            ));
        }

        if self.operator.range() != space {
            return Err(MorError::space_mismatch(
                "time-stepper operator range",
                space,
                self.operator.range(),
            ));
        }
        if self.initial_data.space() != space {
            return Err(MorError::space_mismatch(
                "time-stepper initial data",
                space,
                self.initial_data.space(),
            ));
        }
        if self.initial_data.len() != 1 {
            return Err(MorError::InvariantViolation(format!(
                "initial data must hold exactly one vector, got {}",
                self.initial_data.len()
            )));
        }
        if let Some(rhs) = self.rhs {
            if rhs.source() != space {
                return Err(MorError::space_mismatch(
                    "time-stepper rhs source",
                    space,
                    rhs.source(),
                ));
            }
            if !rhs.range().is_scalar() {
                return Err(MorError::InvariantViolation(format!(
                    "time-stepper rhs '{}' must be a functional, range is {}",
                    rhs.name(),
                    rhs.range()
                )));
            }
        }
        if let Some(mass) = self.mass
            && (mass.source() != space || mass.range() != space)
        {
            return Err(MorError::InvariantViolation(format!(
                "mass '{}' must map {} to itself",
                mass.name(),
                space
            )));
        }
        Ok(())
    }

    /// Parameter with the time component set to `t`
    pub fn mu_at(&self, t: f64) -> Parameter {
        let mut mu = self.mu.cloned().unwrap_or_default();
        mu.set_scalar(TIME_PARAMETER, t);
        mu
    }

    /// `M⁻¹ (F(t) - L(u, t))`, the right-hand side of the explicit ODE form
    pub(crate) fn time_derivative(&self, u: &VectorArray, t: f64) -> MorResult<VectorArray> {
        let mu = self.mu_at(t);
        let mut rate = self.operator.apply(u, Some(&mu))?;
        rate.scal(-1.0);
        if let Some(rhs) = self.rhs {
            rate.axpy(1.0, &rhs.as_source_array(Some(&mu))?)?;
        }
        match self.mass {
            Some(mass) => mass.apply_inverse(&rate, Some(&mu)),
            None => Ok(rate),
        }
    }
}

// =================================================================================================
// TimeStepper Trait
// =================================================================================================

/// Numerical integration scheme
///
/// # Responsibility
///
/// Integrates one `TimeSteppingProblem` into a trajectory. Does NOT validate
/// discretization-level invariants; the discretization has already done so.
///
/// # Trajectory
///
/// The returned array starts with the initial data. Without `num_values`
/// it holds one state per step (`nt + 1` vectors for a fixed step count);
/// with it, exactly `num_values` equidistant samples.
pub trait TimeStepper: Send + Sync + fmt::Debug {
    /// Integrate `problem`
    fn solve(&self, problem: &TimeSteppingProblem<'_>) -> MorResult<VectorArray>;

    /// Name (used for logging)
    fn name(&self) -> &str;

    /// Fixed number of steps, if the scheme has one
    fn nt(&self) -> Option<usize> {
        None
    }

    /// Copy of this stepper with a different step count
    fn with_nt(&self, _nt: usize) -> MorResult<Arc<dyn TimeStepper>> {
        Err(MorError::Unsupported(format!(
            "time-stepper '{}' has no configurable step count",
            self.name()
        )))
    }
}

/// Reject a step count of zero
pub(crate) fn validate_nt(nt: usize) -> MorResult<()> {
    if nt == 0 {
        return Err(MorError::InvalidOverride {
            field: "nt",
            reason: "number of time steps must be greater than 0".to_string(),
        });
    }
    Ok(())
}

/// Fail on NaN or infinite entries
///
/// Catches unstable integrations early instead of propagating garbage.
pub(crate) fn validate_state(state: &VectorArray, step: usize, stepper: &str) -> MorResult<()> {
    if !state.is_finite() {
        return Err(MorError::NumericalSolve(format!(
            "{}: non-finite state at step {}. Try increasing the number of time steps.",
            stepper, step
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operators::{IdentityOperator, MatrixOperator, VectorFunctional};
    use crate::vectorarrays::VectorSpace;
    use nalgebra::DMatrix;

    #[test]
    fn test_problem_validation() {
        let space = VectorSpace::new(2);
        let op = IdentityOperator::new(space.clone());
        let u0 = VectorArray::zeros(space.clone(), 1);

        assert!(TimeSteppingProblem::new(&op, &u0, 1.0).validate().is_ok());
        assert!(TimeSteppingProblem::new(&op, &u0, 0.0).validate().is_err());
        assert!(TimeSteppingProblem::new(&op, &u0, f64::NAN).validate().is_err());

        let two = VectorArray::zeros(space.clone(), 2);
        assert!(TimeSteppingProblem::new(&op, &two, 1.0).validate().is_err());

        let wrong_mass = IdentityOperator::new(VectorSpace::new(3));
        let mut problem = TimeSteppingProblem::new(&op, &u0, 1.0);
        problem.mass = Some(&wrong_mass);
        assert!(problem.validate().is_err());

        let mut problem = TimeSteppingProblem::new(&op, &u0, 1.0);
        problem.num_values = Some(0);
        assert!(problem.validate().is_err());
    }

    #[test]
    fn test_time_derivative() {
        let space = VectorSpace::new(2);
        let op = MatrixOperator::new(DMatrix::from_diagonal_element(2, 2, 2.0));
        let mass = MatrixOperator::new(DMatrix::from_diagonal_element(2, 2, 0.5));
        let f = VectorArray::from_vec(space.clone(), vec![1.0, 1.0]).unwrap();
        let rhs = VectorFunctional::new(f).unwrap();
        let u = VectorArray::from_vec(space, vec![1.0, 0.0]).unwrap();

        let mut problem = TimeSteppingProblem::new(&op, &u, 1.0);
        problem.rhs = Some(&rhs);
        problem.mass = Some(&mass);

        // 2 * (f - 2u)
        let rate = problem.time_derivative(&u, 0.0).unwrap();
        assert_eq!(rate.to_vecs(), vec![vec![-2.0, 2.0]]);
    }

    #[test]
    fn test_mu_at_sets_time() {
        let space = VectorSpace::new(1);
        let op = IdentityOperator::new(space.clone());
        let u0 = VectorArray::zeros(space, 1);
        let base = Parameter::from_scalars([("k", 2.0)]);
        let mut problem = TimeSteppingProblem::new(&op, &u0, 1.0);
        problem.mu = Some(&base);

        let mu = problem.mu_at(0.25);
        assert_eq!(mu.scalar(TIME_PARAMETER).unwrap(), 0.25);
        assert_eq!(mu.scalar("k").unwrap(), 2.0);
    }

    #[test]
    fn test_zero_steps_rejected() {
        assert!(validate_nt(0).is_err());
        assert!(validate_nt(1).is_ok());
    }

    #[test]
    fn test_validate_state() {
        let mut state = VectorArray::zeros(VectorSpace::new(2), 1);
        assert!(validate_state(&state, 1, "test").is_ok());
        state.map_in_place(|_| f64::NAN);
        assert!(matches!(
            validate_state(&state, 1, "test"),
            Err(MorError::NumericalSolve(_))
        ));
    }
}
