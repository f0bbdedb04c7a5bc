//! Linear combinations of operators
//!
//! Affinely parameter-dependent operators `L(μ) = Σ θᵢ(μ)·Lᵢ` are the usual
//! input of reduced basis methods. [`LincombOperator`] represents such a sum
//! with constant or parameter-dependent coefficients θᵢ.

use nalgebra::DMatrix;
use std::sync::Arc;

use super::traits::{Operator, check_space};
use crate::error::{MorError, MorResult};
use crate::parameters::{Parameter, ParameterFunctional, ParameterType};
use crate::vectorarrays::{VectorArray, VectorSpace};

/// Coefficient of one term of a [`LincombOperator`]
#[derive(Debug, Clone)]
pub enum Coefficient {
    Constant(f64),
    Parametric(Arc<dyn ParameterFunctional>),
}

impl Coefficient {
    pub fn evaluate(&self, mu: Option<&Parameter>) -> MorResult<f64> {
        match self {
            Coefficient::Constant(c) => Ok(*c),
            Coefficient::Parametric(theta) => theta.evaluate(mu),
        }
    }

    pub fn parameter_type(&self) -> &ParameterType {
        match self {
            Coefficient::Constant(_) => ParameterType::empty(),
            Coefficient::Parametric(theta) => theta.parameter_type(),
        }
    }
}

impl From<f64> for Coefficient {
    fn from(value: f64) -> Self {
        Coefficient::Constant(value)
    }
}

/// `Σ θᵢ(μ)·Lᵢ` over operators sharing source and range
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use mor_rs::operators::{Coefficient, IdentityOperator, LincombOperator, Operator};
/// use mor_rs::parameters::{Parameter, ProjectionParameterFunctional};
/// use mor_rs::vectorarrays::{VectorArray, VectorSpace};
///
/// let space = VectorSpace::new(2);
/// let id: Arc<dyn Operator> = Arc::new(IdentityOperator::new(space.clone()));
/// let theta = Arc::new(ProjectionParameterFunctional::scalar("k"));
///
/// let op = LincombOperator::new(
///     vec![id.clone(), id],
///     vec![Coefficient::Constant(1.0), Coefficient::Parametric(theta)],
/// )?;
///
/// let mu = Parameter::from_scalars([("k", 3.0)]);
/// let u = VectorArray::from_vec(space, vec![1.0, 2.0])?;
/// assert_eq!(op.apply(&u, Some(&mu))?.to_vecs(), vec![vec![4.0, 8.0]]);
/// # Ok::<(), mor_rs::MorError>(())
/// ```
#[derive(Debug, Clone)]
pub struct LincombOperator {
    operators: Vec<Arc<dyn Operator>>,
    coefficients: Vec<Coefficient>,
    parameter_type: ParameterType,
    linear: bool,
    name: String,
}

impl LincombOperator {
    pub fn new(
        operators: Vec<Arc<dyn Operator>>,
        coefficients: Vec<Coefficient>,
    ) -> MorResult<Self> {
        let first = operators.first().ok_or_else(|| {
            MorError::Configuration("a linear combination needs at least one operator".to_string())
        })?;
        if operators.len() != coefficients.len() {
            return Err(MorError::Configuration(format!(
                "{} operators but {} coefficients",
                operators.len(),
                coefficients.len()
            )));
        }
        for op in &operators[1..] {
            if op.source() != first.source() || op.range() != first.range() {
                return Err(MorError::InvariantViolation(format!(
                    "operator '{}' maps {} to {}, expected {} to {}",
                    op.name(),
                    op.source(),
                    op.range(),
                    first.source(),
                    first.range()
                )));
            }
        }

        let mut parameter_type = ParameterType::new();
        for op in &operators {
            parameter_type.merge(op.parameter_type())?;
        }
        for c in &coefficients {
            parameter_type.merge(c.parameter_type())?;
        }
        let linear = operators.iter().all(|op| op.linear());

        Ok(Self {
            operators,
            coefficients,
            parameter_type,
            linear,
            name: "lincomb".to_string(),
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn operators(&self) -> &[Arc<dyn Operator>] {
        &self.operators
    }

    pub fn coefficients(&self) -> &[Coefficient] {
        &self.coefficients
    }

    /// Coefficient values for `mu`
    pub fn evaluate_coefficients(&self, mu: Option<&Parameter>) -> MorResult<Vec<f64>> {
        self.coefficients.iter().map(|c| c.evaluate(mu)).collect()
    }
}

impl Operator for LincombOperator {
    fn source(&self) -> &VectorSpace {
        // non-empty by construction
        self.operators[0].source()
    }

    fn range(&self) -> &VectorSpace {
        self.operators[0].range()
    }

    fn linear(&self) -> bool {
        self.linear
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn parameter_type(&self) -> &ParameterType {
        &self.parameter_type
    }

    fn apply(&self, u: &VectorArray, mu: Option<&Parameter>) -> MorResult<VectorArray> {
        check_space(self.source(), u, &self.name, "apply")?;
        let coefficients = self.evaluate_coefficients(mu)?;
        let mut result = VectorArray::zeros(self.range().clone(), u.len());
        for (op, c) in self.operators.iter().zip(coefficients) {
            if c != 0.0 {
                result.axpy(c, &op.apply(u, mu)?)?;
            }
        }
        Ok(result)
    }

    fn matrix(&self, mu: Option<&Parameter>) -> MorResult<DMatrix<f64>> {
        let coefficients = self.evaluate_coefficients(mu)?;
        let mut assembled = DMatrix::zeros(self.range().dim(), self.source().dim());
        for (op, c) in self.operators.iter().zip(coefficients) {
            if c != 0.0 {
                assembled += op.matrix(mu)? * c;
            }
        }
        Ok(assembled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operators::{IdentityOperator, MatrixOperator};
    use crate::parameters::GenericParameterFunctional;

    fn diag(values: &[f64]) -> Arc<dyn Operator> {
        Arc::new(MatrixOperator::new(DMatrix::from_diagonal(
            &nalgebra::DVector::from_column_slice(values),
        )))
    }

    #[test]
    fn test_assembled_matrix_matches_apply() {
        let op = LincombOperator::new(
            vec![diag(&[1.0, 2.0]), diag(&[3.0, 0.0])],
            vec![Coefficient::Constant(2.0), Coefficient::Constant(-1.0)],
        )
        .unwrap();
        let m = op.matrix(None).unwrap();
        assert_eq!(m[(0, 0)], -1.0);
        assert_eq!(m[(1, 1)], 4.0);

        let u = VectorArray::from_vec(VectorSpace::new(2), vec![1.0, 1.0]).unwrap();
        assert_eq!(op.apply(&u, None).unwrap().to_vecs(), vec![vec![-1.0, 4.0]]);
    }

    #[test]
    fn test_parametric_inverse() {
        let theta = Arc::new(GenericParameterFunctional::new(
            "1 + k",
            ParameterType::scalar("k"),
            |mu| 1.0 + mu.scalar("k").unwrap_or_default(),
        ));
        let id: Arc<dyn Operator> = Arc::new(IdentityOperator::new(VectorSpace::new(2)));
        let op = LincombOperator::new(vec![id], vec![Coefficient::Parametric(theta)]).unwrap();
        assert!(op.parametric());

        let mu = Parameter::from_scalars([("k", 1.0)]);
        let v = VectorArray::from_vec(VectorSpace::new(2), vec![2.0, 4.0]).unwrap();
        assert_eq!(
            op.apply_inverse(&v, Some(&mu)).unwrap().to_vecs(),
            vec![vec![1.0, 2.0]]
        );
        assert!(matches!(
            op.apply_inverse(&v, None),
            Err(MorError::ParameterMissing { .. })
        ));
    }

    #[test]
    fn test_rejects_mismatched_operators() {
        let mismatched = LincombOperator::new(
            vec![diag(&[1.0]), diag(&[1.0, 2.0])],
            vec![Coefficient::Constant(1.0), Coefficient::Constant(1.0)],
        );
        assert!(mismatched.is_err());
        assert!(LincombOperator::new(vec![diag(&[1.0])], vec![]).is_err());
        assert!(LincombOperator::new(vec![], vec![]).is_err());
    }
}
