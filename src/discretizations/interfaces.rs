//! Discretization, estimator and visualizer traits
//!
//! This module defines the interfaces shared by all problem classes:
//! - `Discretization`: parameter-dependent solve with optional caching,
//!   error estimation and visualization
//! - `Estimator`: a-posteriori error indicator for computed solutions
//! - `Visualizer`: renders solutions (files, plots, ...)

use indexmap::IndexMap;
use nalgebra::DVector;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use super::base::{DiscretizationBase, OperatorMap};
use crate::cache::CacheKey;
use crate::error::{MorError, MorResult};
use crate::operators::{InducedNorm, Operator};
use crate::parameters::{CubicParameterSpace, Parameter, ParameterType};
use crate::vectorarrays::{VectorArray, VectorSpace};

// =================================================================================================
// Estimator & Visualizer
// =================================================================================================

/// Error indicator for solutions of a discretization
pub trait Estimator: Send + Sync + fmt::Debug {
    /// One indicator value per vector of `u`
    fn estimate(
        &self,
        u: &VectorArray,
        mu: Option<&Parameter>,
        discretization: &dyn Discretization,
    ) -> MorResult<DVector<f64>>;
}

/// Renders solution arrays
pub trait Visualizer: Send + Sync + fmt::Debug {
    fn visualize(
        &self,
        u: &VectorArray,
        discretization: &dyn Discretization,
        options: &VisualizeOptions,
    ) -> MorResult<()>;
}

/// Per-call options forwarded to a [`Visualizer`]
///
/// Every field is optional; visualizers fall back to their own
/// configuration for unset fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisualizeOptions {
    /// Title of the figure or header line
    pub title: Option<String>,

    /// One label per vector of the visualized array
    pub legend: Vec<String>,

    /// Output file, overriding the visualizer's default
    pub path: Option<PathBuf>,
}

impl VisualizeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn legend<S: Into<String>>(mut self, labels: impl IntoIterator<Item = S>) -> Self {
        self.legend = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Label of vector `index`, defaulting to its position
    pub fn label(&self, index: usize) -> String {
        self.legend
            .get(index)
            .cloned()
            .unwrap_or_else(|| format!("u[{}]", index))
    }
}

// =================================================================================================
// Discretization Trait
// =================================================================================================

/// A discretized, parameter-dependent problem
///
/// # Responsibility
///
/// Implementors provide the uncached solution algorithm
/// ([`compute_solution`]) and their shared state ([`base`]). Parameter
/// validation, caching, estimation, visualization and the operator, product
/// and norm lookups are provided.
///
/// [`compute_solution`]: Discretization::compute_solution
/// [`base`]: Discretization::base
pub trait Discretization: Send + Sync + fmt::Debug {
    /// Shared state (operators, products, estimator, ...)
    fn base(&self) -> &DiscretizationBase;

    /// This discretization as a trait object, handed to estimators and
    /// visualizers
    fn as_dyn(&self) -> &dyn Discretization;

    /// Space the solution lives in
    fn solution_space(&self) -> &VectorSpace;

    /// Parameters accepted by [`solve`](Discretization::solve)
    fn parameter_type(&self) -> &ParameterType;

    /// Solve for an already validated parameter, bypassing the cache
    fn compute_solution(&self, mu: &Parameter) -> MorResult<VectorArray>;

    // ====================================== provided ======================================

    fn name(&self) -> &str {
        self.base().name()
    }

    /// Conjunction of the `linear` flags of all operators, absent ones
    /// counting as linear
    fn linear(&self) -> bool {
        self.base().linear()
    }

    fn operators(&self) -> &OperatorMap {
        self.base().operators()
    }

    /// Operator registered under `name`, `None` if absent or unset
    fn operator(&self, name: &str) -> Option<&Arc<dyn Operator>> {
        self.base().operator(name)
    }

    fn products(&self) -> &IndexMap<String, Arc<dyn Operator>> {
        self.base().products()
    }

    fn product(&self, name: &str) -> Option<&Arc<dyn Operator>> {
        self.base().products().get(name)
    }

    /// Norm induced by a product, looked up as `"h1"` or `"h1_norm"`
    fn norm(&self, name: &str) -> Option<&InducedNorm> {
        self.base().norm(name)
    }

    fn parameter_space(&self) -> Option<&CubicParameterSpace> {
        self.base().parameter_space()
    }

    /// Solution for `mu`
    ///
    /// `mu` is validated first; with a cache region the result is computed
    /// at most once per parameter.
    fn solve(&self, mu: Option<&Parameter>) -> MorResult<VectorArray> {
        let mu = self.parameter_type().parse(mu)?;
        match self.base().cache_region() {
            Some(region) => {
                let key = CacheKey::new(self.base().uid(), "solve", mu.fingerprint());
                region.get_or_compute(key, &mut || self.compute_solution(&mu))
            }
            None => self.compute_solution(&mu),
        }
    }

    /// Error indicator of `u`, computed by the configured estimator
    fn estimate(&self, u: &VectorArray, mu: Option<&Parameter>) -> MorResult<DVector<f64>> {
        match self.base().estimator() {
            Some(estimator) => estimator.estimate(u, mu, self.as_dyn()),
            None => Err(MorError::Unsupported(format!(
                "discretization '{}' has no estimator",
                self.name()
            ))),
        }
    }

    /// Render `u` with the configured visualizer
    fn visualize(&self, u: &VectorArray, options: &VisualizeOptions) -> MorResult<()> {
        match self.base().visualizer() {
            Some(visualizer) => visualizer.visualize(u, self.as_dyn(), options),
            None => Err(MorError::Unsupported(format!(
                "discretization '{}' has no visualizer",
                self.name()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visualize_options_labels() {
        let options = VisualizeOptions::new()
            .title("solution")
            .legend(["first"])
            .path("out.csv");
        assert_eq!(options.title.as_deref(), Some("solution"));
        assert_eq!(options.label(0), "first");
        assert_eq!(options.label(3), "u[3]");
        assert_eq!(options.path, Some(PathBuf::from("out.csv")));
    }
}
