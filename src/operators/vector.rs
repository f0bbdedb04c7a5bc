//! Vector-like operators and functionals
//!
//! - [`VectorOperator`]: `R^k → V`, maps coefficients onto a fixed array of
//!   `k` vectors (with `k = 1` it simply represents a vector)
//! - [`VectorFunctional`]: `V → R`, the inner product with a fixed vector

use nalgebra::DMatrix;

use super::traits::{Operator, check_space};
use crate::error::{MorError, MorResult};
use crate::parameters::Parameter;
use crate::vectorarrays::{VectorArray, VectorSpace};

/// Operator whose columns are the vectors of a fixed array
///
/// `as_range_array` returns the wrapped array unchanged.
///
/// # Example
///
/// ```rust
/// use mor_rs::operators::{Operator, VectorOperator};
/// use mor_rs::vectorarrays::{VectorArray, VectorSpace};
///
/// let u0 = VectorArray::from_vec(VectorSpace::new(3), vec![1.0, 0.0, 2.0])?;
/// let op = VectorOperator::new(u0.clone());
///
/// assert!(op.source().is_scalar());
/// assert_eq!(op.as_range_array(None)?, u0);
/// # Ok::<(), mor_rs::MorError>(())
/// ```
#[derive(Debug, Clone)]
pub struct VectorOperator {
    array: VectorArray,
    source: VectorSpace,
    name: String,
}

impl VectorOperator {
    pub fn new(array: VectorArray) -> Self {
        let source = VectorSpace::new(array.len());
        Self {
            array,
            source,
            name: "vector".to_string(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn array(&self) -> &VectorArray {
        &self.array
    }
}

impl Operator for VectorOperator {
    fn source(&self) -> &VectorSpace {
        &self.source
    }

    fn range(&self) -> &VectorSpace {
        self.array.space()
    }

    fn linear(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, u: &VectorArray, _mu: Option<&Parameter>) -> MorResult<VectorArray> {
        check_space(&self.source, u, &self.name, "apply")?;
        VectorArray::from_data(self.array.space().clone(), self.array.data() * u.data())
    }

    fn matrix(&self, _mu: Option<&Parameter>) -> MorResult<DMatrix<f64>> {
        Ok(self.array.data().clone())
    }

    fn as_range_array(&self, _mu: Option<&Parameter>) -> MorResult<VectorArray> {
        Ok(self.array.clone())
    }
}

/// Linear functional `u ↦ ⟨f, u⟩`
///
/// # Example
///
/// ```rust
/// use mor_rs::operators::{Operator, VectorFunctional};
/// use mor_rs::vectorarrays::{VectorArray, VectorSpace};
///
/// let f = VectorArray::from_vec(VectorSpace::new(2), vec![1.0, 2.0])?;
/// let functional = VectorFunctional::new(f.clone())?;
///
/// assert!(functional.range().is_scalar());
/// assert_eq!(functional.as_source_array(None)?, f);
/// # Ok::<(), mor_rs::MorError>(())
/// ```
#[derive(Debug, Clone)]
pub struct VectorFunctional {
    vector: VectorArray,
    range: VectorSpace,
    name: String,
}

impl VectorFunctional {
    /// Functional represented by a single vector
    pub fn new(vector: VectorArray) -> MorResult<Self> {
        if vector.len() != 1 {
            return Err(MorError::InvariantViolation(format!(
                "a functional is represented by exactly one vector, got {}",
                vector.len()
            )));
        }
        Ok(Self {
            vector,
            range: VectorSpace::scalar(),
            name: "functional".to_string(),
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl Operator for VectorFunctional {
    fn source(&self) -> &VectorSpace {
        self.vector.space()
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
        check_space(self.vector.space(), u, &self.name, "apply")?;
        VectorArray::from_data(self.range.clone(), self.vector.data().transpose() * u.data())
    }

    fn matrix(&self, _mu: Option<&Parameter>) -> MorResult<DMatrix<f64>> {
        Ok(self.vector.data().transpose())
    }

    fn as_source_array(&self, _mu: Option<&Parameter>) -> MorResult<VectorArray> {
        Ok(self.vector.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_operator_scales_columns() {
        let space = VectorSpace::new(2);
        let mut array = VectorArray::from_vec(space.clone(), vec![1.0, 0.0]).unwrap();
        array
            .append(&VectorArray::from_vec(space, vec![0.0, 1.0]).unwrap())
            .unwrap();
        let op = VectorOperator::new(array).with_name("basis");
        assert_eq!(op.source().dim(), 2);

        let coefficients = VectorArray::from_vec(VectorSpace::new(2), vec![3.0, 4.0]).unwrap();
        assert_eq!(
            op.apply(&coefficients, None).unwrap().to_vecs(),
            vec![vec![3.0, 4.0]]
        );
    }

    #[test]
    fn test_functional_applies_inner_product() {
        let f = VectorArray::from_vec(VectorSpace::new(3), vec![1.0, 1.0, 1.0]).unwrap();
        let functional = VectorFunctional::new(f).unwrap();
        let u = VectorArray::from_vec(VectorSpace::new(3), vec![1.0, 2.0, 3.0]).unwrap();
        let value = functional.apply(&u, None).unwrap();
        assert_eq!(value.to_vecs(), vec![vec![6.0]]);
        assert!(value.space().is_scalar());
    }

    #[test]
    fn test_functional_requires_single_vector() {
        let two = VectorArray::zeros(VectorSpace::new(3), 2);
        assert!(VectorFunctional::new(two).is_err());
    }
}
