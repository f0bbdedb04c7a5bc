//! In-memory cache region

use indexmap::IndexMap;
use log::trace;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{CacheKey, CacheRegion};
use crate::error::{MorError, MorResult};
use crate::vectorarrays::VectorArray;

type Slot = Arc<Mutex<Option<VectorArray>>>;

/// Cache region keeping results in memory
///
/// Every key owns a slot with its own lock, so a computation for one key
/// never blocks lookups of other keys. With a capacity, the oldest entries
/// are evicted once it is exceeded.
#[derive(Debug, Default)]
pub struct MemoryRegion {
    entries: Mutex<IndexMap<CacheKey, Slot>>,
    capacity: Option<usize>,
}

impl MemoryRegion {
    /// Unbounded region
    pub fn new() -> Self {
        Self::default()
    }

    /// Region storing at most `capacity` results
    pub fn with_capacity(capacity: usize) -> MorResult<Self> {
        if capacity == 0 {
            return Err(MorError::Configuration(
                "cache capacity must be greater than 0".to_string(),
            ));
        }
        Ok(Self {
            entries: Mutex::default(),
            capacity: Some(capacity),
        })
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    fn entries(&self) -> MutexGuard<'_, IndexMap<CacheKey, Slot>> {
        // a panicking computation never leaves the map half-updated
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Drop the slot of a failed computation unless someone refilled it
    fn discard(&self, key: &CacheKey, slot: &Slot) {
        let mut entries = self.entries();
        let unused = entries
            .get(key)
            .is_some_and(|current| Arc::ptr_eq(current, slot))
            && slot.try_lock().is_ok_and(|value| value.is_none());
        if unused {
            entries.shift_remove(key);
        }
    }

    fn evict(&self) {
        let Some(capacity) = self.capacity else {
            return;
        };
        let mut entries = self.entries();
        while entries.len() > capacity {
            if let Some((key, _)) = entries.shift_remove_index(0) {
                trace!("cache evict {}", key);
            }
        }
    }
}

impl CacheRegion for MemoryRegion {
    fn get_or_compute(
        &self,
        key: CacheKey,
        compute: &mut dyn FnMut() -> MorResult<VectorArray>,
    ) -> MorResult<VectorArray> {
        let slot = self.entries().entry(key.clone()).or_default().clone();

        let mut value = slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(stored) = value.as_ref() {
            trace!("cache hit {}", key);
            return Ok(stored.clone());
        }

        trace!("cache miss {}", key);
        match compute() {
            Ok(result) => {
                *value = Some(result.clone());
                drop(value);
                self.evict();
                Ok(result)
            }
            Err(err) => {
                drop(value);
                self.discard(&key, &slot);
                Err(err)
            }
        }
    }

    fn len(&self) -> usize {
        self.entries()
            .values()
            .filter(|slot| slot.try_lock().is_ok_and(|value| value.is_some()))
            .count()
    }

    fn clear(&self) {
        self.entries().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::DiscretizationId;
    use crate::vectorarrays::VectorSpace;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    fn value(x: f64) -> VectorArray {
        VectorArray::from_vec(VectorSpace::new(1), vec![x]).unwrap()
    }

    #[test]
    fn test_computes_once_per_key() {
        let region = MemoryRegion::new();
        let owner = DiscretizationId::next();
        let mut calls = 0;

        for arguments in ["a", "b", "a", "b", "a"] {
            let key = CacheKey::new(owner, "solve", arguments);
            region
                .get_or_compute(key, &mut || {
                    calls += 1;
                    Ok(value(calls as f64))
                })
                .unwrap();
        }
        assert_eq!(calls, 2);
        assert_eq!(region.len(), 2);

        region.clear();
        assert!(region.is_empty());
    }

    #[test]
    fn test_failures_are_not_stored() {
        let region = MemoryRegion::new();
        let key = CacheKey::new(DiscretizationId::next(), "solve", "");

        let result = region.get_or_compute(key.clone(), &mut || {
            Err(MorError::NumericalSolve("singular".to_string()))
        });
        assert!(result.is_err());
        assert!(region.is_empty());

        let result = region.get_or_compute(key, &mut || Ok(value(1.0)));
        assert_eq!(result.unwrap(), value(1.0));
        assert_eq!(region.len(), 1);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let region = MemoryRegion::with_capacity(2).unwrap();
        let owner = DiscretizationId::next();
        for (i, arguments) in ["a", "b", "c"].iter().enumerate() {
            region
                .get_or_compute(CacheKey::new(owner, "solve", *arguments), &mut || {
                    Ok(value(i as f64))
                })
                .unwrap();
        }
        assert_eq!(region.len(), 2);

        // "a" was evicted and is computed again
        let mut recomputed = false;
        region
            .get_or_compute(CacheKey::new(owner, "solve", "a"), &mut || {
                recomputed = true;
                Ok(value(0.0))
            })
            .unwrap();
        assert!(recomputed);

        assert!(MemoryRegion::with_capacity(0).is_err());
    }

    #[test]
    fn test_concurrent_callers_share_one_computation() {
        let region = Arc::new(MemoryRegion::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let key = CacheKey::new(DiscretizationId::next(), "solve", "shared");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let region = Arc::clone(&region);
                let calls = Arc::clone(&calls);
                let key = key.clone();
                thread::spawn(move || {
                    region.get_or_compute(key, &mut || {
                        calls.fetch_add(1, Ordering::SeqCst);
                        thread::sleep(Duration::from_millis(20));
                        Ok(value(42.0))
                    })
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap().unwrap(), value(42.0));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
