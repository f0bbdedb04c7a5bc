//! Error estimators

use nalgebra::DVector;

use super::interfaces::{Discretization, Estimator};
use crate::error::{MorError, MorResult};
use crate::parameters::{Parameter, TIME_PARAMETER};
use crate::vectorarrays::VectorArray;

/// Residual `‖L(u, μ) − F(μ)‖` of every vector of `u`
///
/// Uses the `operator` and `rhs` of the discretization; a missing `rhs`
/// counts as zero. The residual is measured in the norm induced by the named
/// product, or in the Euclidean norm if none is set.
///
/// For instationary problems the operators are evaluated at the time given
/// as `_t` in `mu`, or at `0`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResidualEstimator {
    product: Option<String>,
}

impl ResidualEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Measure the residual in the norm of product `name`
    pub fn with_product(mut self, name: impl Into<String>) -> Self {
        self.product = Some(name.into());
        self
    }

    pub fn product(&self) -> Option<&str> {
        self.product.as_deref()
    }
}

impl Estimator for ResidualEstimator {
    fn estimate(
        &self,
        u: &VectorArray,
        mu: Option<&Parameter>,
        discretization: &dyn Discretization,
    ) -> MorResult<DVector<f64>> {
        let time = match mu {
            Some(m) if m.contains(TIME_PARAMETER) => m.scalar(TIME_PARAMETER)?,
            _ => 0.0,
        };
        let mu = discretization
            .parameter_type()
            .parse(mu)?
            .with_scalar(TIME_PARAMETER, time);

        let operator = discretization
            .operator("operator")
            .ok_or_else(|| MorError::MissingOperator {
                name: "operator".to_string(),
            })?;
        let mut residual = operator.apply(u, Some(&mu))?;
        if let Some(rhs) = discretization.operator("rhs") {
            residual.axpy(-1.0, &rhs.as_source_array(Some(&mu))?)?;
        }

        match &self.product {
            Some(name) => {
                let norm = discretization.norm(name).ok_or_else(|| {
                    MorError::Configuration(format!(
                        "discretization '{}' has no product '{}'",
                        discretization.name(),
                        name
                    ))
                })?;
                norm.evaluate(&residual, Some(&mu))
            }
            None => Ok(residual.l2_norm()),
        }
    }
}
