//! Discretizations
//!
//! A discretization binds operators into a solvable, parameter-dependent
//! problem. Two problem classes are provided:
//!
//! | Type                           | Problem                                   | `solve` returns |
//! |--------------------------------|-------------------------------------------|-----------------|
//! | [`StationaryDiscretization`]   | `L(u(μ), μ) = F(μ)`                       | one vector      |
//! | [`InstationaryDiscretization`] | `M ∂ₜu + L(u, t, μ) = F(t, μ)`, `u(0)=u₀` | a trajectory    |
//!
//! # Special operators
//!
//! Every problem class names the operators it needs (`operator`, `rhs`, ...).
//! They can be passed through dedicated builder setters or as entries of the
//! general operator map; either way they end up in both places. Optional
//! special operators that are absent stay in the map as `None`.
//!
//! # Reconfiguration
//!
//! Discretizations are immutable. `with_` takes a sparse override record and
//! returns a new, validated instance; fields that are not overridden are
//! shared with the original.
//!
//! # Collaborators
//!
//! - [`Estimator`]: error indicator, e.g. [`ResidualEstimator`]
//! - [`Visualizer`]: see [`crate::output`]
//! - [`CacheRegion`](crate::cache::CacheRegion): stores solutions per
//!   parameter

mod base;
mod estimators;
mod instationary;
mod interfaces;
mod stationary;

pub use base::{
    BaseConfig, BaseOverrides, DiscretizationBase, OperatorMap, ProductMap, RESERVED_NAMES,
    SpecialOperator,
};
pub use estimators::ResidualEstimator;
pub use instationary::{
    InitialData, InstationaryDiscretization, InstationaryDiscretizationBuilder,
    InstationaryOverrides,
};
pub use interfaces::{Discretization, Estimator, VisualizeOptions, Visualizer};
pub use stationary::{
    StationaryDiscretization, StationaryDiscretizationBuilder, StationaryOverrides,
};
