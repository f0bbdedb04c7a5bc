//! Norms induced by inner-product operators

use nalgebra::DVector;
use std::sync::Arc;

use super::traits::Operator;
use crate::error::{MorError, MorResult};
use crate::parameters::Parameter;
use crate::vectorarrays::VectorArray;

/// Squares in `(-NORM_TOLERANCE, 0)` are rounding noise and count as zero
pub const NORM_TOLERANCE: f64 = 1e-10;

/// `‖u‖ = sqrt(⟨u, P u⟩)` for a symmetric positive semi-definite product `P`
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use mor_rs::operators::{IdentityOperator, InducedNorm};
/// use mor_rs::vectorarrays::{VectorArray, VectorSpace};
///
/// let space = VectorSpace::new(2);
/// let norm = InducedNorm::new("l2", Arc::new(IdentityOperator::new(space.clone())));
/// let u = VectorArray::from_vec(space, vec![3.0, 4.0])?;
///
/// assert_eq!(norm.evaluate(&u, None)?[0], 5.0);
/// # Ok::<(), mor_rs::MorError>(())
/// ```
#[derive(Debug, Clone)]
pub struct InducedNorm {
    name: String,
    product: Arc<dyn Operator>,
    tolerance: f64,
}

impl InducedNorm {
    pub fn new(name: impl Into<String>, product: Arc<dyn Operator>) -> Self {
        Self {
            name: name.into(),
            product,
            tolerance: NORM_TOLERANCE,
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn product(&self) -> &Arc<dyn Operator> {
        &self.product
    }

    /// Norm of every vector of `u`
    ///
    /// Fails when a squared norm is negative beyond the tolerance, which means
    /// the product is not positive semi-definite.
    pub fn evaluate(&self, u: &VectorArray, mu: Option<&Parameter>) -> MorResult<DVector<f64>> {
        let mut squares = self.product.pairwise_apply2(u, u, mu)?;
        for (i, s) in squares.iter_mut().enumerate() {
            if *s < 0.0 {
                if *s <= -self.tolerance {
                    return Err(MorError::NumericalSolve(format!(
                        "norm '{}' of vector {} has negative square {:e}",
                        self.name, i, s
                    )));
                }
                *s = 0.0;
            }
        }
        Ok(squares.map(f64::sqrt))
    }
}
