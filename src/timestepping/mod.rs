//! Time-steppers
//!
//! Numerical integrators for `M ∂ₜu + L(u, t, μ) = F(t, μ)` on `[t0, t1]`.
//! Instationary discretizations hold one as `Arc<dyn TimeStepper>` and hand
//! it a [`TimeSteppingProblem`] on every solve.
//!
//! # Available schemes
//!
//! | Scheme                       | Order | Operators             |
//! |------------------------------|-------|-----------------------|
//! | [`ImplicitEulerTimeStepper`] | 1     | linear, assemblable   |
//! | [`ExplicitEulerTimeStepper`] | 1     | any                   |
//! | [`RungeKutta4TimeStepper`]   | 4     | any                   |
//!
//! All schemes use a fixed number of steps `nt`, so all of them support
//! `with_nt`. The time parameter `_t` is set to the current time before
//! every operator evaluation.

mod explicit_euler;
mod implicit_euler;
mod rk4;
mod traits;
mod trajectory;

pub use explicit_euler::ExplicitEulerTimeStepper;
pub use implicit_euler::ImplicitEulerTimeStepper;
pub use rk4::RungeKutta4TimeStepper;
pub use traits::{TimeStepper, TimeSteppingProblem};
