//! Visualizers
//!
//! [`Visualizer`](crate::discretizations::Visualizer) implementations that
//! write solutions to files:
//! - **Export**: CSV tables for external analysis
//! - **Visualization**: PNG/SVG plots using plotters
//!
//! # Architecture
//!
//! ```text
//! output/
//! ├── mod.rs
//! ├── visualization/      ← Plots
//! │   ├── config.rs
//! │   └── plot.rs
//! └── export/             ← Data export
//!     └── csv.rs
//! ```
//!
//! Both visualizers take the output path from the call's
//! [`VisualizeOptions`](crate::discretizations::VisualizeOptions) first and
//! fall back to their configuration.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use mor_rs::discretizations::{Discretization, StationaryDiscretization, VisualizeOptions};
//! use mor_rs::operators::{IdentityOperator, VectorFunctional};
//! use mor_rs::output::{CsvConfig, CsvVisualizer};
//! use mor_rs::vectorarrays::{VectorArray, VectorSpace};
//!
//! let space = VectorSpace::new(2);
//! let f = VectorArray::from_vec(space.clone(), vec![1.0, 2.0])?;
//! let d = StationaryDiscretization::builder()
//!     .operator(Arc::new(IdentityOperator::new(space)))
//!     .rhs(Arc::new(VectorFunctional::new(f)?))
//!     .visualizer(Arc::new(CsvVisualizer::new(CsvConfig::default().path("u.csv"))?))
//!     .build()?;
//!
//! d.visualize(&d.solve(None)?, &VisualizeOptions::new().legend(["u"]))?;
//! # Ok::<(), mor_rs::MorError>(())
//! ```

pub mod export;
pub mod visualization;

pub use export::{CsvConfig, CsvVisualizer};
pub use visualization::{PlotConfig, PlotVisualizer};
