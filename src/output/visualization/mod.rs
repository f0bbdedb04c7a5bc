//! Plots of solution arrays
//!
//! PNG and SVG line plots rendered with plotters. The backend is picked from
//! the file extension.

mod config;
mod plot;

pub use config::PlotConfig;
pub use plot::PlotVisualizer;
