//! Common utilities for integration tests

pub mod mock_operators;
pub mod test_helpers;

// Re-export commonly used items
pub use mock_operators::{CountingOperator, ExactStepper, RecordingEstimator, RecordingVisualizer};
pub use test_helpers::{
    assert_arrays_close, decay_discretization, functional, identity, scaled_identity, vector,
};
