//! mor-rs: Discretizations for Parametric Model Order Reduction
//!
//! A discretization binds parameter-dependent operators into a solvable
//! problem: it validates their spaces at construction, solves for a
//! parameter `μ`, and forwards to optional error estimators, visualizers and
//! a result cache.
//!
//! # Architecture
//!
//! mor-rs is built on two core principles:
//!
//! 1. **Separation of Problem and Numerics**
//!    - Discretizations assemble the problem (what to solve)
//!    - Operators and time-steppers provide methods (how to solve)
//!
//! 2. **Immutability and Type Safety**
//!    - Instances are validated once and never mutated
//!    - Reconfiguration (`with_`) returns new, validated instances
//!    - Collaborators are trait objects (`Operator`, `TimeStepper`, ...)
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use mor_rs::prelude::*;
//!
//! // ∂ₜu + u = 0, u(0) = 1 on [0, 1]
//! let space = VectorSpace::new(1);
//! let u0 = VectorArray::from_vec(space.clone(), vec![1.0])?;
//!
//! let d = InstationaryDiscretization::builder(1.0)
//!     .operator(Arc::new(IdentityOperator::new(space)))
//!     .initial_data(u0)
//!     .time_stepper(Arc::new(ImplicitEulerTimeStepper::new(100)?))
//!     .cache_region(Arc::new(MemoryRegion::new()))
//!     .build()?;
//!
//! let trajectory = d.solve(None)?;
//! assert_eq!(trajectory.len(), 101);
//!
//! // a finer stepper, everything else shared
//! let fine = d.with_(InstationaryOverrides::new().time_stepper_nt(1000))?;
//! assert_eq!(fine.solve(None)?.len(), 1001);
//! # Ok::<(), mor_rs::MorError>(())
//! ```
//!
//! # Modules
//!
//! - [`vectorarrays`]: Vector spaces and arrays of vectors
//! - [`parameters`]: Parameters, parameter types and parameter spaces
//! - [`operators`]: Linear and affinely decomposed operators
//! - [`timestepping`]: Time integration schemes
//! - [`discretizations`]: Stationary and instationary problems
//! - [`cache`]: Result caching
//! - [`output`]: CSV and plot visualizers

pub mod error;

pub mod vectorarrays;

pub mod parameters;

pub mod operators;
pub mod timestepping;

pub mod cache;
pub mod discretizations;

pub mod output;

pub use error::{ErrorKind, MorError, MorResult};

pub mod prelude {
    //! Convenient imports for common usage
    //!
    //! ```rust
    //! use mor_rs::prelude::*;
    //! ```
    pub use crate::cache::{CacheRegion, MemoryRegion};
    pub use crate::discretizations::{
        Discretization, Estimator, InstationaryDiscretization, InstationaryOverrides,
        ResidualEstimator, StationaryDiscretization, StationaryOverrides, VisualizeOptions,
        Visualizer,
    };
    pub use crate::error::{ErrorKind, MorError, MorResult};
    pub use crate::operators::{
        Coefficient, IdentityOperator, LincombOperator, MatrixOperator, Operator,
        VectorFunctional, VectorOperator,
    };
    pub use crate::parameters::{CubicParameterSpace, Parameter, ParameterType};
    pub use crate::timestepping::{
        ExplicitEulerTimeStepper, ImplicitEulerTimeStepper, RungeKutta4TimeStepper, TimeStepper,
    };
    pub use crate::vectorarrays::{VectorArray, VectorSpace};
}
