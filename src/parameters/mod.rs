//! Parameters
//!
//! Models depend on a parameter `μ`: a set of named numeric arrays. This
//! module provides the parameter container, the declaration of which names
//! and shapes an object expects, scalar functionals of parameters and
//! bounded parameter spaces for building training sets.
//!
//! # Core Concepts
//!
//! - **Parameter**: name → array (scalars are zero-dimensional arrays)
//! - **ParameterType**: name → shape, merged from the operators of a model
//! - **ParameterFunctional**: `μ ↦ θ(μ)`, coefficients of affine decompositions
//! - **CubicParameterSpace**: box constraints plus grid/random sampling
//!
//! # Example
//!
//! ```rust
//! use mor_rs::parameters::{Parameter, ParameterType};
//!
//! let ty = ParameterType::scalar("diffusion");
//! let mu = Parameter::from_scalars([("diffusion", 0.1), ("unused", 3.0)]);
//!
//! // validation drops undeclared entries
//! let parsed = ty.parse(Some(&mu))?;
//! assert_eq!(parsed.len(), 1);
//! # Ok::<(), mor_rs::MorError>(())
//! ```

mod base;
mod functionals;
mod space;

pub use base::{Parameter, ParameterType};
pub use functionals::{
    GenericParameterFunctional, ParameterFunctional, ProjectionParameterFunctional,
};
pub use space::CubicParameterSpace;

/// Name of the parameter component holding the current simulation time
pub const TIME_PARAMETER: &str = "_t";
