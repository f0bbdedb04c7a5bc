//! Vector arrays
//!
//! A [`VectorArray`] is an ordered, fixed-space collection of vectors. It is
//! what operators consume and produce and what solvers return: a stationary
//! solution is an array of length one, a trajectory holds one vector per
//! sampled time.
//!
//! # Storage
//!
//! Vectors are stored as the columns of an `nalgebra::DMatrix` of shape
//! `dim × len`, so inner products between arrays are plain matrix products.

use nalgebra::{DMatrix, DVector};
use std::fmt;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::space::VectorSpace;
use crate::error::{MorError, MorResult};

/// Ordered collection of vectors from one [`VectorSpace`]
///
/// # Example
///
/// ```rust
/// use mor_rs::vectorarrays::{VectorArray, VectorSpace};
///
/// let space = VectorSpace::new(2);
/// let mut u = VectorArray::from_vec(space.clone(), vec![3.0, 4.0])?;
/// u.append(&VectorArray::zeros(space, 1))?;
///
/// assert_eq!(u.len(), 2);
/// assert_eq!(u.l2_norm()[0], 5.0);
/// # Ok::<(), mor_rs::MorError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct VectorArray {
    space: VectorSpace,
    data: DMatrix<f64>,
}

impl VectorArray {
    // ======================================= constructors =======================================

    /// Array of `count` zero vectors
    pub fn zeros(space: VectorSpace, count: usize) -> Self {
        let data = DMatrix::zeros(space.dim(), count);
        Self { space, data }
    }

    /// Array of length zero
    pub fn empty(space: VectorSpace) -> Self {
        Self::zeros(space, 0)
    }

    /// The canonical basis of `space`, one vector per dimension
    pub fn identity(space: VectorSpace) -> Self {
        let dim = space.dim();
        Self {
            space,
            data: DMatrix::identity(dim, dim),
        }
    }

    /// Array from a `dim × len` matrix whose columns are the vectors
    pub fn from_data(space: VectorSpace, data: DMatrix<f64>) -> MorResult<Self> {
        if data.nrows() != space.dim() {
            return Err(MorError::InvariantViolation(format!(
                "data with {} rows does not belong to {}",
                data.nrows(),
                space
            )));
        }
        Ok(Self { space, data })
    }

    /// Array holding a single vector
    pub fn from_vec(space: VectorSpace, values: Vec<f64>) -> MorResult<Self> {
        let n = values.len();
        Self::from_data(space, DMatrix::from_vec(n, 1, values))
    }

    /// Array from a list of vectors
    pub fn from_vectors(space: VectorSpace, vectors: &[DVector<f64>]) -> MorResult<Self> {
        let dim = space.dim();
        if let Some(bad) = vectors.iter().find(|v| v.len() != dim) {
            return Err(MorError::InvariantViolation(format!(
                "vector of length {} does not belong to {}",
                bad.len(),
                space
            )));
        }
        let data = DMatrix::from_fn(dim, vectors.len(), |r, c| vectors[c][r]);
        Ok(Self { space, data })
    }

    // ========================================== Queries ==========================================

    pub fn space(&self) -> &VectorSpace {
        &self.space
    }

    pub fn dim(&self) -> usize {
        self.space.dim()
    }

    /// Number of vectors
    pub fn len(&self) -> usize {
        self.data.ncols()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Underlying `dim × len` matrix
    pub fn data(&self) -> &DMatrix<f64> {
        &self.data
    }

    pub fn into_data(self) -> DMatrix<f64> {
        self.data
    }

    /// Copy of the `index`-th vector
    pub fn vector(&self, index: usize) -> Option<DVector<f64>> {
        (index < self.len()).then(|| self.data.column(index).into_owned())
    }

    /// Copy of the last vector
    pub fn last(&self) -> Option<DVector<f64>> {
        self.len().checked_sub(1).and_then(|i| self.vector(i))
    }

    /// Vectors as plain `Vec`s, in order
    pub fn to_vecs(&self) -> Vec<Vec<f64>> {
        self.data
            .column_iter()
            .map(|c| c.iter().copied().collect())
            .collect()
    }

    /// Check that no entry is NaN or infinite
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|x| x.is_finite())
    }

    // ======================================= Restructuring =======================================

    /// Append all vectors of `other`
    pub fn append(&mut self, other: &VectorArray) -> MorResult<()> {
        self.check_space(other, "append")?;
        let old_len = self.len();
        let data = std::mem::replace(&mut self.data, DMatrix::zeros(0, 0));
        self.data = data.resize_horizontally(old_len + other.len(), 0.0);
        self.data
            .columns_mut(old_len, other.len())
            .copy_from(&other.data);
        Ok(())
    }

    /// New array made of the vectors at `indices`
    pub fn select(&self, indices: &[usize]) -> MorResult<VectorArray> {
        if let Some(&bad) = indices.iter().find(|&&i| i >= self.len()) {
            return Err(MorError::InvariantViolation(format!(
                "index {} out of range for array of length {}",
                bad,
                self.len()
            )));
        }
        let data = DMatrix::from_fn(self.dim(), indices.len(), |r, c| self.data[(r, indices[c])]);
        Ok(Self {
            space: self.space.clone(),
            data,
        })
    }

    // ========================================= Algebra ==========================================

    /// In-place scaling `U ← α·U`
    pub fn scal(&mut self, alpha: f64) {
        self.data *= alpha;
    }

    /// In-place `U ← U + α·X`
    ///
    /// `x` must either have the same length as `self` or length one, in which
    /// case it is added to every vector.
    pub fn axpy(&mut self, alpha: f64, x: &VectorArray) -> MorResult<()> {
        self.check_space(x, "axpy")?;
        if x.len() == self.len() {
            self.data += &x.data * alpha;
            Ok(())
        } else if x.len() == 1 {
            let column = x.data.column(0) * alpha;
            for mut c in self.data.column_iter_mut() {
                c += &column;
            }
            Ok(())
        } else {
            Err(MorError::InvariantViolation(format!(
                "axpy with arrays of length {} and {}",
                self.len(),
                x.len()
            )))
        }
    }

    /// Linear combination `Σ cᵢ·uᵢ` as an array of length one
    pub fn lincomb(&self, coefficients: &[f64]) -> MorResult<VectorArray> {
        if coefficients.len() != self.len() {
            return Err(MorError::InvariantViolation(format!(
                "{} coefficients for array of length {}",
                coefficients.len(),
                self.len()
            )));
        }
        let c = DVector::from_column_slice(coefficients);
        let combined = &self.data * c;
        Ok(Self {
            space: self.space.clone(),
            data: DMatrix::from_column_slice(self.dim(), 1, combined.as_slice()),
        })
    }

    /// Matrix of all inner products `⟨uᵢ, vⱼ⟩`
    pub fn dot(&self, other: &VectorArray) -> MorResult<DMatrix<f64>> {
        self.check_space(other, "dot")?;
        Ok(self.data.transpose() * &other.data)
    }

    /// Inner products `⟨uᵢ, vᵢ⟩` of vectors with the same index
    pub fn pairwise_dot(&self, other: &VectorArray) -> MorResult<DVector<f64>> {
        self.check_space(other, "pairwise_dot")?;
        if self.len() != other.len() {
            return Err(MorError::InvariantViolation(format!(
                "pairwise_dot with arrays of length {} and {}",
                self.len(),
                other.len()
            )));
        }
        Ok(DVector::from_iterator(
            self.len(),
            self.data
                .column_iter()
                .zip(other.data.column_iter())
                .map(|(u, v)| u.dot(&v)),
        ))
    }

    /// Euclidean norm of each vector
    pub fn l2_norm(&self) -> DVector<f64> {
        DVector::from_iterator(self.len(), self.data.column_iter().map(|c| c.norm()))
    }

    /// Maximum absolute entry of each vector
    pub fn sup_norm(&self) -> DVector<f64> {
        DVector::from_iterator(self.len(), self.data.column_iter().map(|c| c.amax()))
    }

    /// Apply `f` to every entry
    ///
    /// With the `parallel` feature, arrays holding more entries than
    /// [`parallel_threshold()`](super::parallel_threshold) are processed with Rayon.
    pub fn map_in_place<F>(&mut self, f: F)
    where
        F: Fn(f64) -> f64 + Sync + Send,
    {
        if self.data.len() > super::parallel_threshold() {
            #[cfg(feature = "parallel")]
            self.data.as_mut_slice().par_iter_mut().for_each(|x| *x = f(*x));
            #[cfg(not(feature = "parallel"))]
            self.data.iter_mut().for_each(|x| *x = f(*x));
        } else {
            self.data.iter_mut().for_each(|x| *x = f(*x));
        }
    }

    /// Whether every vector agrees with its counterpart in `other` up to
    /// `atol + rtol·‖other‖`
    pub fn almost_equal(&self, other: &VectorArray, atol: f64, rtol: f64) -> bool {
        if self.space != other.space || self.len() != other.len() {
            return false;
        }
        self.data
            .column_iter()
            .zip(other.data.column_iter())
            .all(|(u, v)| (u - v).norm() <= atol + rtol * v.norm())
    }

    fn check_space(&self, other: &VectorArray, context: &str) -> MorResult<()> {
        if self.space != other.space {
            return Err(MorError::space_mismatch(context, &self.space, &other.space));
        }
        Ok(())
    }
}

// ================================== Simple arithmetic functions ==================================

impl std::ops::Add for VectorArray {
    type Output = VectorArray;
    fn add(mut self, rhs: Self) -> Self::Output {
        assert_eq!(self.space, rhs.space, "VectorArray spaces must match");
        assert_eq!(self.len(), rhs.len(), "VectorArray lengths must match");
        self.data += rhs.data;
        self
    }
}

impl std::ops::Sub for VectorArray {
    type Output = VectorArray;
    fn sub(mut self, rhs: Self) -> Self::Output {
        assert_eq!(self.space, rhs.space, "VectorArray spaces must match");
        assert_eq!(self.len(), rhs.len(), "VectorArray lengths must match");
        self.data -= rhs.data;
        self
    }
}

impl std::ops::Mul<f64> for VectorArray {
    type Output = VectorArray;
    fn mul(mut self, scalar: f64) -> Self::Output {
        self.data *= scalar;
        self
    }
}

impl std::ops::Mul<VectorArray> for f64 {
    type Output = VectorArray;
    fn mul(self, rhs: VectorArray) -> Self::Output {
        rhs * self
    }
}

impl std::ops::Neg for VectorArray {
    type Output = VectorArray;
    fn neg(self) -> Self::Output {
        self * -1.0
    }
}

impl fmt::Display for VectorArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VectorArray [{}] in {}", self.len(), self.space)
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vectorarrays::ThresholdGuard;

    fn space() -> VectorSpace {
        VectorSpace::new(3)
    }

    fn sample() -> VectorArray {
        VectorArray::from_vectors(
            space(),
            &[
                DVector::from_vec(vec![1.0, 2.0, 2.0]),
                DVector::from_vec(vec![0.0, -4.0, 3.0]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_constructors() {
        let zeros = VectorArray::zeros(space(), 4);
        assert_eq!(zeros.len(), 4);
        assert_eq!(zeros.dim(), 3);

        let empty = VectorArray::empty(space());
        assert!(empty.is_empty());

        let identity = VectorArray::identity(space());
        assert_eq!(identity.len(), 3);
        assert_eq!(identity.vector(1).unwrap(), DVector::from_vec(vec![0.0, 1.0, 0.0]));
    }

    #[test]
    fn test_from_vec_rejects_wrong_dimension() {
        let err = VectorArray::from_vec(space(), vec![1.0, 2.0]).unwrap_err();
        assert!(err.to_string().contains("does not belong to R^3"));
    }

    #[test]
    fn test_norms() {
        let u = sample();
        assert_eq!(u.l2_norm(), DVector::from_vec(vec![3.0, 5.0]));
        assert_eq!(u.sup_norm(), DVector::from_vec(vec![2.0, 4.0]));
    }

    #[test]
    fn test_dot_and_pairwise_dot() {
        let u = sample();
        let gram = u.dot(&u).unwrap();
        assert_eq!(gram[(0, 0)], 9.0);
        assert_eq!(gram[(0, 1)], -2.0);
        assert_eq!(gram[(1, 1)], 25.0);

        let pairwise = u.pairwise_dot(&u).unwrap();
        assert_eq!(pairwise, DVector::from_vec(vec![9.0, 25.0]));
    }

    #[test]
    fn test_space_mismatch() {
        let u = sample();
        let v = VectorArray::zeros(VectorSpace::with_id(3, "OTHER"), 2);
        assert!(u.dot(&v).is_err());
        let mut w = u.clone();
        assert!(w.append(&v).is_err());
    }

    #[test]
    fn test_append_and_select() {
        let mut u = sample();
        u.append(&VectorArray::from_vec(space(), vec![7.0, 8.0, 9.0]).unwrap())
            .unwrap();
        assert_eq!(u.len(), 3);
        assert_eq!(u.last().unwrap(), DVector::from_vec(vec![7.0, 8.0, 9.0]));

        let picked = u.select(&[2, 0]).unwrap();
        assert_eq!(picked.vector(0).unwrap()[0], 7.0);
        assert_eq!(picked.vector(1).unwrap()[0], 1.0);
        assert!(u.select(&[3]).is_err());
    }

    #[test]
    fn test_axpy_broadcast() {
        let mut u = sample();
        let one = VectorArray::from_vec(space(), vec![1.0, 1.0, 1.0]).unwrap();
        u.axpy(2.0, &one).unwrap();
        assert_eq!(u.vector(0).unwrap(), DVector::from_vec(vec![3.0, 4.0, 4.0]));
        assert_eq!(u.vector(1).unwrap(), DVector::from_vec(vec![2.0, -2.0, 5.0]));

        let bad = VectorArray::zeros(space(), 3);
        assert!(u.axpy(1.0, &bad).is_err());
    }

    #[test]
    fn test_lincomb() {
        let u = sample();
        let c = u.lincomb(&[2.0, 1.0]).unwrap();
        assert_eq!(c.len(), 1);
        assert_eq!(c.vector(0).unwrap(), DVector::from_vec(vec![2.0, 0.0, 7.0]));
    }

    #[test]
    fn test_arithmetic() {
        let u = sample();
        let doubled = u.clone() + u.clone();
        assert!(doubled.almost_equal(&(2.0 * u.clone()), 1e-14, 0.0));
        let zero = u.clone() - u.clone();
        assert_eq!(zero.l2_norm().max(), 0.0);
        assert_eq!((-u).vector(0).unwrap()[0], -1.0);
    }

    #[test]
    fn test_map_in_place_parallel_path() {
        let _guard = ThresholdGuard::save(2);
        let mut u = sample();
        u.map_in_place(|x| x * 10.0);
        assert_eq!(u.vector(1).unwrap(), DVector::from_vec(vec![0.0, -40.0, 30.0]));
    }

    #[test]
    fn test_finiteness() {
        let mut u = sample();
        assert!(u.is_finite());
        u.map_in_place(|x| x / 0.0);
        assert!(!u.is_finite());
    }
}
