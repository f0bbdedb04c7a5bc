//! Result caching
//!
//! Solving a discretization is expensive, so solutions can be stored in a
//! cache region and reused when the same discretization is solved again for
//! the same parameter. A region is an explicit service injected into
//! discretizations; several discretizations may share one region.
//!
//! # Keys
//!
//! A [`CacheKey`] combines the identity of the discretization (a process-wide
//! unique [`DiscretizationId`]), the cached method and a deterministic
//! fingerprint of the validated arguments. Reconfigured discretizations get
//! a fresh identity, so they never see results of their original.
//!
//! # Example
//!
//! ```rust
//! use mor_rs::cache::{CacheKey, CacheRegion, DiscretizationId, MemoryRegion};
//! use mor_rs::vectorarrays::{VectorArray, VectorSpace};
//!
//! let region = MemoryRegion::new();
//! let key = CacheKey::new(DiscretizationId::next(), "solve", "{}");
//!
//! let mut calls = 0;
//! for _ in 0..3 {
//!     region.get_or_compute(key.clone(), &mut || {
//!         calls += 1;
//!         Ok(VectorArray::zeros(VectorSpace::new(2), 1))
//!     })?;
//! }
//! assert_eq!(calls, 1);
//! # Ok::<(), mor_rs::MorError>(())
//! ```

mod memory;

pub use memory::MemoryRegion;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::MorResult;
use crate::vectorarrays::VectorArray;

/// Counter for unique [`DiscretizationId`] allocation
static DISCRETIZATION_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique per-instance identifier of a discretization
///
/// Cloning a discretization keeps its identifier; reconfiguring it with
/// `with_` allocates a new one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DiscretizationId(u64);

impl DiscretizationId {
    /// Allocate an identifier never returned before in this process
    pub fn next() -> Self {
        Self(DISCRETIZATION_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for DiscretizationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identity of one cached call
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    owner: DiscretizationId,
    method: &'static str,
    arguments: String,
}

impl CacheKey {
    pub fn new(
        owner: DiscretizationId,
        method: &'static str,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            owner,
            method,
            arguments: arguments.into(),
        }
    }

    pub fn owner(&self) -> DiscretizationId {
        self.owner
    }

    pub fn method(&self) -> &'static str {
        self.method
    }

    pub fn arguments(&self) -> &str {
        &self.arguments
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}({})", self.owner, self.method, self.arguments)
    }
}

/// Keyed store of computed results
///
/// # Contract
///
/// For a given key the computation runs at most once while its result is
/// stored: concurrent callers with the same key wait for the first one and
/// receive its result. Failed computations are not stored.
pub trait CacheRegion: Send + Sync + fmt::Debug {
    /// Return the stored result for `key`, computing and storing it first
    /// if necessary
    fn get_or_compute(
        &self,
        key: CacheKey,
        compute: &mut dyn FnMut() -> MorResult<VectorArray>,
    ) -> MorResult<VectorArray>;

    /// Number of stored results
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every stored result
    fn clear(&self);
}
