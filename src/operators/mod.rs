//! Operators
//!
//! Operators map between vector spaces and may depend on a parameter. They
//! are shared between discretizations as `Arc<dyn Operator>` and never
//! copied.
//!
//! # Available operators
//!
//! - [`MatrixOperator`] / [`IdentityOperator`]: assembled linear maps
//! - [`VectorOperator`]: a fixed vector seen as a map from the scalar space
//! - [`VectorFunctional`]: inner product with a fixed vector
//! - [`LincombOperator`]: `Σ θᵢ(μ)·Lᵢ` with constant or parametric θᵢ
//!
//! [`InducedNorm`] turns an inner-product operator into a norm.

mod lincomb;
mod matrix;
mod norm;
mod traits;
mod vector;

pub use lincomb::{Coefficient, LincombOperator};
pub use matrix::{IdentityOperator, MatrixOperator};
pub use norm::{InducedNorm, NORM_TOLERANCE};
pub use traits::Operator;
pub(crate) use traits::check_space;
pub use vector::{VectorFunctional, VectorOperator};
