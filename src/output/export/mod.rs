//! Data export of solution arrays

mod csv;

pub use csv::{CsvConfig, CsvVisualizer};
