//! Vector arrays and vector spaces
//!
//! Everything an operator consumes or produces is a [`VectorArray`]: an
//! ordered collection of vectors that all belong to one [`VectorSpace`].
//!
//! # Core Concepts
//!
//! - **VectorSpace**: dimension plus optional identifier; arrays from
//!   different spaces never mix
//! - **VectorArray**: fixed-length collection supporting `axpy`, `scal`,
//!   inner products and norms
//!
//! Length-one arrays stand in for single vectors: a stationary solution, the
//! initial data of a time-dependent problem, the vector behind a functional.

// module declaration
mod array;
mod space;

// re-export commonly used types for convenience
pub use array::VectorArray;
pub use space::VectorSpace;

// =================================================================================================
// Parallel Execution Threshold
// =================================================================================================
//
// The threshold is stored in an AtomicUsize so that it can be changed at
// runtime (useful in benchmarks and tests) without requiring a mutex on every
// `map_in_place()` call. Relaxed ordering is sufficient: the value is a
// performance hint, not a synchronisation point.
// =================================================================================================

use std::sync::atomic::{AtomicUsize, Ordering};

/// Default number of entries above which [`VectorArray::map_in_place()`]
/// switches to parallel iteration.
const DEFAULT_PARALLEL_THRESHOLD: usize = 999;

static PARALLEL_THRESHOLD: AtomicUsize = AtomicUsize::new(DEFAULT_PARALLEL_THRESHOLD);

/// Return the current parallel-execution threshold.
///
/// Only has an effect when the crate is compiled with the `parallel` feature.
///
/// ```rust
/// use mor_rs::vectorarrays::parallel_threshold;
///
/// assert!(parallel_threshold() > 0);
/// ```
pub fn parallel_threshold() -> usize {
    PARALLEL_THRESHOLD.load(Ordering::Relaxed)
}

/// Set the parallel-execution threshold to a new value.
///
/// # Panics
///
/// Panics when `threshold == 0`.
///
/// ```rust
/// use mor_rs::vectorarrays::{parallel_threshold, set_parallel_threshold};
///
/// let previous = parallel_threshold();
/// set_parallel_threshold(2048);
/// assert_eq!(parallel_threshold(), 2048);
/// set_parallel_threshold(previous);
/// ```
pub fn set_parallel_threshold(threshold: usize) {
    assert!(threshold > 0, "parallel threshold must be at least 1");
    PARALLEL_THRESHOLD.store(threshold, Ordering::Relaxed);
}

#[cfg(test)]
static THRESHOLD_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

/// RAII guard restoring the previous threshold on drop.
///
/// Holds a lock for its whole lifetime so tests touching the threshold run
/// one at a time.
#[cfg(test)]
pub(crate) struct ThresholdGuard {
    previous: usize,
    _lock: std::sync::MutexGuard<'static, ()>,
}

#[cfg(test)]
impl ThresholdGuard {
    pub(crate) fn save(new_value: usize) -> Self {
        let lock = THRESHOLD_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let previous = parallel_threshold();
        set_parallel_threshold(new_value);
        Self {
            previous,
            _lock: lock,
        }
    }
}

#[cfg(test)]
impl Drop for ThresholdGuard {
    fn drop(&mut self) {
        PARALLEL_THRESHOLD.store(self.previous, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_threshold_value() {
        assert_eq!(DEFAULT_PARALLEL_THRESHOLD, 999);
    }

    #[test]
    fn test_get_and_set_threshold() {
        let _guard = ThresholdGuard::save(500);
        assert_eq!(parallel_threshold(), 500);
    }

    #[test]
    #[should_panic(expected = "parallel threshold must be at least 1")]
    fn test_zero_threshold_panics() {
        set_parallel_threshold(0);
    }

    #[test]
    fn test_threshold_guard_remembers_previous_value() {
        let outer_previous = {
            let guard = ThresholdGuard::save(42);
            assert_eq!(parallel_threshold(), 42);
            guard.previous
        };
        assert!(outer_previous > 0);
    }
}
