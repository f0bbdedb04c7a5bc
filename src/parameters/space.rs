//! Parameter spaces
//!
//! A [`CubicParameterSpace`] bounds every component of every parameter by an
//! interval and can produce training sets for reduction, either on a tensor
//! grid or by seeded random sampling.

use ndarray::{ArrayD, IxDyn};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;

use super::base::{Parameter, ParameterType};
use crate::error::{MorError, MorResult};

/// Axis-aligned box of admissible parameters
///
/// # Example
///
/// ```rust
/// use mor_rs::parameters::{CubicParameterSpace, ParameterType};
///
/// let space = CubicParameterSpace::new(ParameterType::scalar("k"), 0.1, 1.0)?;
/// let grid = space.sample_uniformly(4)?;
///
/// assert_eq!(grid.len(), 4);
/// assert!(grid.iter().all(|mu| space.contains(mu)));
/// # Ok::<(), mor_rs::MorError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CubicParameterSpace {
    parameter_type: ParameterType,
    ranges: BTreeMap<String, (f64, f64)>,
}

impl CubicParameterSpace {
    /// Same interval `[minimum, maximum]` for every component
    pub fn new(parameter_type: ParameterType, minimum: f64, maximum: f64) -> MorResult<Self> {
        let ranges = parameter_type
            .names()
            .map(|name| (name.to_string(), (minimum, maximum)))
            .collect();
        Self::with_ranges(parameter_type, ranges)
    }

    /// One interval per parameter name
    pub fn with_ranges(
        parameter_type: ParameterType,
        ranges: BTreeMap<String, (f64, f64)>,
    ) -> MorResult<Self> {
        for name in parameter_type.names() {
            let (lo, hi) = ranges.get(name).ok_or_else(|| {
                MorError::Configuration(format!("no range given for parameter '{}'", name))
            })?;
            if !(lo.is_finite() && hi.is_finite()) || lo > hi {
                return Err(MorError::Configuration(format!(
                    "invalid range [{}, {}] for parameter '{}'",
                    lo, hi, name
                )));
            }
        }
        Ok(Self {
            parameter_type,
            ranges,
        })
    }

    pub fn parameter_type(&self) -> &ParameterType {
        &self.parameter_type
    }

    pub fn range(&self, name: &str) -> Option<(f64, f64)> {
        self.ranges.get(name).copied()
    }

    /// Whether `mu` has the right type and lies inside the box
    pub fn contains(&self, mu: &Parameter) -> bool {
        self.check(mu).is_ok()
    }

    /// Like [`contains`](Self::contains), reporting the offending entry
    pub fn check(&self, mu: &Parameter) -> MorResult<()> {
        let parsed = self.parameter_type.parse(Some(mu))?;
        for (name, value) in parsed.iter() {
            let (lo, hi) = self.ranges.get(name).copied().unwrap_or((f64::MIN, f64::MAX));
            if let Some(&bad) = value.iter().find(|&&x| x < lo || x > hi) {
                return Err(MorError::ParameterOutOfRange {
                    name: name.to_string(),
                    value: bad,
                });
            }
        }
        Ok(())
    }

    /// Tensor grid with `count` equidistant points per component
    pub fn sample_uniformly(&self, count: usize) -> MorResult<Vec<Parameter>> {
        if count == 0 {
            return Err(MorError::Configuration(
                "sample count must be greater than 0".to_string(),
            ));
        }
        let components = self.components();
        let axes: Vec<Vec<f64>> = components
            .iter()
            .map(|&(lo, hi)| linspace(lo, hi, count))
            .collect();

        let total = u32::try_from(components.len())
            .ok()
            .and_then(|n| count.checked_pow(n))
            .ok_or_else(|| {
                MorError::Configuration(format!(
                    "uniform grid of {}^{} samples is too large",
                    count,
                    components.len()
                ))
            })?;
        let mut samples = Vec::with_capacity(total);
        for flat in 0..total {
            let mut rest = flat;
            let mut values = Vec::with_capacity(components.len());
            for axis in &axes {
                values.push(axis[rest % count]);
                rest /= count;
            }
            samples.push(self.assemble(&values));
        }
        Ok(samples)
    }

    /// `count` parameters drawn uniformly from the box
    ///
    /// Equal seeds give equal samples.
    pub fn sample_randomly(&self, count: usize, seed: u64) -> Vec<Parameter> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let components = self.components();
        (0..count)
            .map(|_| {
                let values: Vec<f64> = components
                    .iter()
                    .map(|&(lo, hi)| if lo < hi { rng.gen_range(lo..=hi) } else { lo })
                    .collect();
                self.assemble(&values)
            })
            .collect()
    }

    /// Bounds of every scalar component, in assembly order
    fn components(&self) -> Vec<(f64, f64)> {
        let mut out = Vec::new();
        for (name, shape) in self.parameter_type.iter() {
            let size: usize = shape.iter().product();
            let bounds = self.ranges.get(name).copied().unwrap_or((0.0, 0.0));
            out.extend(std::iter::repeat_n(bounds, size));
        }
        out
    }

    fn assemble(&self, flat_values: &[f64]) -> Parameter {
        let mut mu = Parameter::new();
        let mut offset = 0;
        for (name, shape) in self.parameter_type.iter() {
            let size: usize = shape.iter().product();
            let chunk = flat_values[offset..offset + size].to_vec();
            offset += size;
            let value = ArrayD::from_shape_vec(IxDyn(shape), chunk).unwrap_or_default();
            mu.set(name, value);
        }
        mu
    }
}

fn linspace(lo: f64, hi: f64, count: usize) -> Vec<f64> {
    if count == 1 {
        return vec![lo];
    }
    let step = (hi - lo) / (count - 1) as f64;
    (0..count)
        .map(|i| if i + 1 == count { hi } else { lo + step * i as f64 })
        .collect()
}
