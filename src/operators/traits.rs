//! Operator trait
//!
//! This module defines the capability every operator offers to
//! discretizations and time-steppers:
//! - `Operator`: apply, inverse apply, adjoint apply and the induced
//!   bilinear forms, all evaluated for an optional parameter

use nalgebra::{DMatrix, DVector};
use std::fmt;

use crate::error::{MorError, MorResult};
use crate::parameters::{Parameter, ParameterType};
use crate::vectorarrays::{VectorArray, VectorSpace};

// =================================================================================================
// Operator Trait
// =================================================================================================

/// A (possibly nonlinear, possibly parameter-dependent) map between vector
/// spaces
///
/// # Responsibility
///
/// Evaluates the map. Does NOT decide how a problem is solved (that is the
/// discretization's and time-stepper's job).
///
/// # Provided methods
///
/// Only `source`, `range`, `linear`, `name` and `apply` are mandatory.
/// Operators that can be assembled into a matrix implement [`matrix`] and
/// get `apply_inverse`, `apply_adjoint` and `as_source_array` for free;
/// operators that cannot override them directly.
///
/// A **functional** is an operator whose range is the one-dimensional space;
/// a **vector-like** operator has the one-dimensional space as source.
///
/// [`matrix`]: Operator::matrix
pub trait Operator: Send + Sync + fmt::Debug {
    /// Space the operator is applied to
    fn source(&self) -> &VectorSpace;

    /// Space the operator maps into
    fn range(&self) -> &VectorSpace;

    /// Whether the operator is linear in its argument
    fn linear(&self) -> bool;

    /// Name (used for display and logging)
    fn name(&self) -> &str;

    /// Parameter names and shapes the operator depends on
    fn parameter_type(&self) -> &ParameterType {
        ParameterType::empty()
    }

    /// Whether the operator depends on a parameter at all
    fn parametric(&self) -> bool {
        !self.parameter_type().is_empty()
    }

    /// Evaluate the operator on every vector of `u`
    fn apply(&self, u: &VectorArray, mu: Option<&Parameter>) -> MorResult<VectorArray>;

    /// Matrix representation for the given parameter
    fn matrix(&self, _mu: Option<&Parameter>) -> MorResult<DMatrix<f64>> {
        Err(MorError::NotAssemblable {
            operator: self.name().to_string(),
        })
    }

    /// Apply the adjoint (transpose) to every vector of `v`
    fn apply_adjoint(&self, v: &VectorArray, mu: Option<&Parameter>) -> MorResult<VectorArray> {
        check_space(self.range(), v, self.name(), "apply_adjoint")?;
        let m = self.matrix(mu)?;
        VectorArray::from_data(self.source().clone(), m.transpose() * v.data())
    }

    /// Solve `op(u) = v` for every vector of `v`
    ///
    /// Fails with a numerical-solve error when the system is singular.
    fn apply_inverse(&self, v: &VectorArray, mu: Option<&Parameter>) -> MorResult<VectorArray> {
        check_space(self.range(), v, self.name(), "apply_inverse")?;
        let m = self.matrix(mu)?;
        if !m.is_square() {
            return Err(MorError::NumericalSolve(format!(
                "cannot invert non-square operator '{}' ({} x {})",
                self.name(),
                m.nrows(),
                m.ncols()
            )));
        }
        let solution = m.lu().solve(v.data()).ok_or_else(|| {
            MorError::NumericalSolve(format!("operator '{}' is singular", self.name()))
        })?;
        if solution.iter().any(|x| !x.is_finite()) {
            return Err(MorError::NumericalSolve(format!(
                "inverse of operator '{}' produced non-finite values",
                self.name()
            )));
        }
        VectorArray::from_data(self.source().clone(), solution)
    }

    /// Matrix of bilinear form values `⟨vᵢ, op(uⱼ)⟩`
    fn apply2(
        &self,
        v: &VectorArray,
        u: &VectorArray,
        mu: Option<&Parameter>,
    ) -> MorResult<DMatrix<f64>> {
        let au = self.apply(u, mu)?;
        v.dot(&au)
    }

    /// Bilinear form values `⟨vᵢ, op(uᵢ)⟩` for vectors with the same index
    fn pairwise_apply2(
        &self,
        v: &VectorArray,
        u: &VectorArray,
        mu: Option<&Parameter>,
    ) -> MorResult<DVector<f64>> {
        let au = self.apply(u, mu)?;
        v.pairwise_dot(&au)
    }

    /// Images of the canonical basis of the source space
    ///
    /// For a vector-like operator this is the vector it represents.
    fn as_range_array(&self, mu: Option<&Parameter>) -> MorResult<VectorArray> {
        self.apply(&VectorArray::identity(self.source().clone()), mu)
    }

    /// Adjoint images of the canonical basis of the range space
    ///
    /// For a functional this is the Riesz-free vector representation `f`
    /// with `F(u) = ⟨f, u⟩`.
    fn as_source_array(&self, mu: Option<&Parameter>) -> MorResult<VectorArray> {
        self.apply_adjoint(&VectorArray::identity(self.range().clone()), mu)
    }
}

/// Check that `array` lives in `expected`
pub(crate) fn check_space(
    expected: &VectorSpace,
    array: &VectorArray,
    operator: &str,
    method: &str,
) -> MorResult<()> {
    if array.space() != expected {
        return Err(MorError::space_mismatch(
            format!("{}.{}", operator, method),
            expected,
            array.space(),
        ));
    }
    Ok(())
}
