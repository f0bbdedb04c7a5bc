//! Matrix-backed operators

use nalgebra::DMatrix;

use super::traits::{Operator, check_space};
use crate::error::{MorError, MorResult};
use crate::parameters::Parameter;
use crate::vectorarrays::{VectorArray, VectorSpace};

/// Linear operator given by a dense matrix
///
/// # Example
///
/// ```rust
/// use mor_rs::operators::{MatrixOperator, Operator};
/// use mor_rs::vectorarrays::{VectorArray, VectorSpace};
/// use nalgebra::DMatrix;
///
/// let op = MatrixOperator::new(DMatrix::from_diagonal_element(2, 2, 4.0));
/// let v = VectorArray::from_vec(VectorSpace::new(2), vec![8.0, 4.0])?;
///
/// let u = op.apply_inverse(&v, None)?;
/// assert_eq!(u.to_vecs(), vec![vec![2.0, 1.0]]);
/// # Ok::<(), mor_rs::MorError>(())
/// ```
#[derive(Debug, Clone)]
pub struct MatrixOperator {
    matrix: DMatrix<f64>,
    source: VectorSpace,
    range: VectorSpace,
    name: String,
}

impl MatrixOperator {
    /// Operator `R^ncols → R^nrows`
    pub fn new(matrix: DMatrix<f64>) -> Self {
        let source = VectorSpace::new(matrix.ncols());
        let range = VectorSpace::new(matrix.nrows());
        Self {
            matrix,
            source,
            range,
            name: "matrix".to_string(),
        }
    }

    /// Operator between explicitly given spaces
    pub fn with_spaces(
        matrix: DMatrix<f64>,
        source: VectorSpace,
        range: VectorSpace,
    ) -> MorResult<Self> {
        if matrix.ncols() != source.dim() || matrix.nrows() != range.dim() {
            return Err(MorError::InvariantViolation(format!(
                "{} x {} matrix cannot map {} to {}",
                matrix.nrows(),
                matrix.ncols(),
                source,
                range
            )));
        }
        Ok(Self {
            matrix,
            source,
            range,
            name: "matrix".to_string(),
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn data(&self) -> &DMatrix<f64> {
        &self.matrix
    }
}

impl Operator for MatrixOperator {
    fn source(&self) -> &VectorSpace {
        &self.source
    }

    fn range(&self) -> &VectorSpace {
        &self.range
    }

    fn linear(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, u: &VectorArray, _mu: Option<&Parameter>) -> MorResult<VectorArray> {
        check_space(&self.source, u, &self.name, "apply")?;
        VectorArray::from_data(self.range.clone(), &self.matrix * u.data())
    }

    fn matrix(&self, _mu: Option<&Parameter>) -> MorResult<DMatrix<f64>> {
        Ok(self.matrix.clone())
    }
}

/// Identity on a vector space
#[derive(Debug, Clone)]
pub struct IdentityOperator {
    space: VectorSpace,
    name: String,
}

impl IdentityOperator {
    pub fn new(space: VectorSpace) -> Self {
        Self {
            space,
            name: "identity".to_string(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl Operator for IdentityOperator {
    fn source(&self) -> &VectorSpace {
        &self.space
    }

    fn range(&self) -> &VectorSpace {
        &self.space
    }

    fn linear(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, u: &VectorArray, _mu: Option<&Parameter>) -> MorResult<VectorArray> {
        check_space(&self.space, u, &self.name, "apply")?;
        Ok(u.clone())
    }

    fn matrix(&self, _mu: Option<&Parameter>) -> MorResult<DMatrix<f64>> {
        let n = self.space.dim();
        Ok(DMatrix::identity(n, n))
    }

    fn apply_adjoint(&self, v: &VectorArray, mu: Option<&Parameter>) -> MorResult<VectorArray> {
        self.apply(v, mu)
    }

    fn apply_inverse(&self, v: &VectorArray, mu: Option<&Parameter>) -> MorResult<VectorArray> {
        self.apply(v, mu)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_apply_and_adjoint() {
        let m = DMatrix::from_row_slice(2, 3, &[1.0, 0.0, 2.0, 0.0, 1.0, -1.0]);
        let op = MatrixOperator::new(m).with_name("a");
        assert_eq!(op.source().dim(), 3);
        assert_eq!(op.range().dim(), 2);

        let u = VectorArray::from_vec(VectorSpace::new(3), vec![1.0, 1.0, 1.0]).unwrap();
        assert_eq!(op.apply(&u, None).unwrap().to_vecs(), vec![vec![3.0, 0.0]]);

        let v = VectorArray::from_vec(VectorSpace::new(2), vec![1.0, 1.0]).unwrap();
        assert_eq!(
            op.apply_adjoint(&v, None).unwrap().to_vecs(),
            vec![vec![1.0, 1.0, 1.0]]
        );
    }

    #[test]
    fn test_inverse_of_general_matrix() {
        let m = DMatrix::from_row_slice(2, 2, &[2.0, 1.0, 1.0, 3.0]);
        let op = MatrixOperator::new(m);
        let v = VectorArray::from_vec(VectorSpace::new(2), vec![3.0, 4.0]).unwrap();
        let u = op.apply_inverse(&v, None).unwrap();
        let back = op.apply(&u, None).unwrap();
        assert_relative_eq!(back.data()[(0, 0)], 3.0, epsilon = 1e-12);
        assert_relative_eq!(back.data()[(1, 0)], 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_singular_matrix_fails() {
        let op = MatrixOperator::new(DMatrix::zeros(2, 2));
        let v = VectorArray::from_vec(VectorSpace::new(2), vec![1.0, 1.0]).unwrap();
        let err = op.apply_inverse(&v, None).unwrap_err();
        assert!(matches!(err, MorError::NumericalSolve(_)));
    }

    #[test]
    fn test_spaces_must_match_matrix() {
        let result = MatrixOperator::with_spaces(
            DMatrix::zeros(2, 2),
            VectorSpace::new(3),
            VectorSpace::new(2),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_identity() {
        let space = VectorSpace::with_id(2, "STATE");
        let id = IdentityOperator::new(space.clone());
        let u = VectorArray::from_vec(space, vec![1.0, 2.0]).unwrap();
        assert_eq!(id.apply_inverse(&u, None).unwrap(), u);
        assert_eq!(id.matrix(None).unwrap(), DMatrix::identity(2, 2));

        let elsewhere = VectorArray::zeros(VectorSpace::new(2), 1);
        assert!(id.apply(&elsewhere, None).is_err());
    }
}
