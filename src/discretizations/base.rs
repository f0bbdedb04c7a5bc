//! State shared by all discretizations
//!
//! [`DiscretizationBase`] owns the operator and product maps and the optional
//! collaborators (estimator, visualizer, cache region). It also implements
//! the two rules every problem class relies on:
//!
//! - **Special operators**: operators such as `operator` or `rhs` that a
//!   problem class exposes as fields are resolved once, from an explicit
//!   value or from the operator map, and then stored in the map. The field
//!   and the map entry are therefore always the same `Arc`.
//! - **Reconfiguration**: [`DiscretizationBase::reconfigure`] rebuilds the
//!   operator map from the current map merged with the overridden special
//!   operators, so replacing e.g. `rhs` never leaves a stale map entry.

use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

use super::interfaces::{Estimator, Visualizer};
use crate::cache::{CacheRegion, DiscretizationId};
use crate::error::{MorError, MorResult};
use crate::operators::{InducedNorm, Operator};
use crate::parameters::CubicParameterSpace;

/// Named operators of a discretization; `None` marks an absent optional
/// operator
pub type OperatorMap = IndexMap<String, Option<Arc<dyn Operator>>>;

/// Named inner-product operators
pub type ProductMap = IndexMap<String, Arc<dyn Operator>>;

/// Names of the fields every discretization has; special operators may not
/// use them
pub const RESERVED_NAMES: &[&str] = &[
    "name",
    "linear",
    "operators",
    "products",
    "estimator",
    "visualizer",
    "cache_region",
    "parameter_space",
    "parameter_type",
    "solution_space",
    "uid",
];

/// Explicit value (or absence) of one special operator
pub type SpecialOperator = (&'static str, Option<Arc<dyn Operator>>);

// =================================================================================================
// Construction inputs
// =================================================================================================

/// Everything a discretization is built from, apart from its special
/// operators and problem-specific fields
#[derive(Clone, Default)]
pub struct BaseConfig {
    pub operators: OperatorMap,
    pub products: ProductMap,
    pub estimator: Option<Arc<dyn Estimator>>,
    pub visualizer: Option<Arc<dyn Visualizer>>,
    pub cache_region: Option<Arc<dyn CacheRegion>>,
    pub parameter_space: Option<CubicParameterSpace>,
    pub name: Option<String>,
}

impl fmt::Debug for BaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseConfig")
            .field("operators", &self.operators.keys().collect::<Vec<_>>())
            .field("products", &self.products.keys().collect::<Vec<_>>())
            .field("estimator", &self.estimator.is_some())
            .field("visualizer", &self.visualizer.is_some())
            .field("cache_region", &self.cache_region.is_some())
            .field("name", &self.name)
            .finish()
    }
}

/// Sparse overrides of the fields in [`BaseConfig`]
///
/// Unset fields keep the value of the discretization being reconfigured.
/// The optional collaborators nest a second `Option`: `Some(None)` removes
/// the collaborator from the copy.
#[derive(Clone, Default)]
pub struct BaseOverrides {
    pub operators: Option<OperatorMap>,
    pub products: Option<ProductMap>,
    pub estimator: Option<Option<Arc<dyn Estimator>>>,
    pub visualizer: Option<Option<Arc<dyn Visualizer>>>,
    pub cache_region: Option<Option<Arc<dyn CacheRegion>>>,
    pub parameter_space: Option<Option<CubicParameterSpace>>,
    pub name: Option<String>,
}

impl fmt::Debug for BaseOverrides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseOverrides")
            .field("operators", &self.operators.as_ref().map(|m| m.len()))
            .field("products", &self.products.as_ref().map(|m| m.len()))
            .field("estimator", &self.estimator.as_ref().map(Option::is_some))
            .field("visualizer", &self.visualizer.as_ref().map(Option::is_some))
            .field(
                "cache_region",
                &self.cache_region.as_ref().map(Option::is_some),
            )
            .field(
                "parameter_space",
                &self.parameter_space.as_ref().map(Option::is_some),
            )
            .field("name", &self.name)
            .finish()
    }
}

// =================================================================================================
// DiscretizationBase
// =================================================================================================

/// Validated state shared by all problem classes
#[derive(Clone)]
pub struct DiscretizationBase {
    uid: DiscretizationId,
    operators: OperatorMap,
    products: ProductMap,
    norms: IndexMap<String, InducedNorm>,
    estimator: Option<Arc<dyn Estimator>>,
    visualizer: Option<Arc<dyn Visualizer>>,
    cache_region: Option<Arc<dyn CacheRegion>>,
    parameter_space: Option<CubicParameterSpace>,
    name: String,
    linear: bool,
}

impl DiscretizationBase {
    /// Validate `config` and resolve the special operators
    ///
    /// For every special operator the explicit value wins; otherwise the
    /// entry of the operator map is used. Both may be given only if they
    /// are the same operator. The resolved value is stored in the map.
    ///
    /// # Errors
    ///
    /// - `AttributeCollision` if a special name is reserved or declared twice
    /// - `DuplicateSpecialOperator` if explicit value and map entry differ
    pub fn new(
        config: BaseConfig,
        special_operators: &[SpecialOperator],
        default_name: &str,
    ) -> MorResult<Self> {
        let BaseConfig {
            mut operators,
            products,
            estimator,
            visualizer,
            cache_region,
            parameter_space,
            name,
        } = config;

        let mut seen: Vec<&str> = Vec::with_capacity(special_operators.len());
        for (special, explicit) in special_operators {
            if RESERVED_NAMES.contains(special) || seen.contains(special) {
                return Err(MorError::AttributeCollision {
                    name: special.to_string(),
                });
            }
            seen.push(*special);

            let resolved = match (explicit, operators.get(*special)) {
                (Some(op), Some(entry)) => {
                    let agrees = entry.as_ref().is_some_and(|e| Arc::ptr_eq(e, op));
                    if !agrees {
                        return Err(MorError::DuplicateSpecialOperator {
                            name: special.to_string(),
                        });
                    }
                    Some(op.clone())
                }
                (Some(op), None) => Some(op.clone()),
                (None, entry) => entry.cloned().flatten(),
            };
            operators.insert(special.to_string(), resolved);
        }

        let linear = operators
            .values()
            .all(|op| op.as_ref().is_none_or(|op| op.linear()));

        let norms = products
            .iter()
            .map(|(key, product)| {
                let norm_name = format!("{}_norm", key);
                let norm = InducedNorm::new(norm_name.clone(), product.clone());
                (norm_name, norm)
            })
            .collect();

        Ok(Self {
            uid: DiscretizationId::next(),
            operators,
            products,
            norms,
            estimator,
            visualizer,
            cache_region,
            parameter_space,
            name: name.unwrap_or_else(|| default_name.to_string()),
            linear,
        })
    }

    /// Construction inputs of a reconfigured copy
    ///
    /// Without an explicit operator map, the current map is taken and the
    /// overridden special operators are written into it. The special
    /// operators must then be passed to [`new`](Self::new) with their
    /// override values only, so that they are re-resolved from this map.
    pub fn reconfigure(
        &self,
        overrides: BaseOverrides,
        special_overrides: &[SpecialOperator],
    ) -> BaseConfig {
        let operators = overrides.operators.unwrap_or_else(|| {
            let mut operators = self.operators.clone();
            for (special, value) in special_overrides {
                if let Some(op) = value {
                    operators.insert(special.to_string(), Some(op.clone()));
                }
            }
            operators
        });

        BaseConfig {
            operators,
            products: overrides.products.unwrap_or_else(|| self.products.clone()),
            estimator: overrides
                .estimator
                .unwrap_or_else(|| self.estimator.clone()),
            visualizer: overrides
                .visualizer
                .unwrap_or_else(|| self.visualizer.clone()),
            cache_region: overrides
                .cache_region
                .unwrap_or_else(|| self.cache_region.clone()),
            parameter_space: overrides
                .parameter_space
                .unwrap_or_else(|| self.parameter_space.clone()),
            name: Some(overrides.name.unwrap_or_else(|| self.name.clone())),
        }
    }

    /// Resolved special operator that the problem class cannot do without
    pub fn required(&self, name: &str) -> MorResult<Arc<dyn Operator>> {
        self.operator(name)
            .cloned()
            .ok_or_else(|| MorError::MissingOperator {
                name: name.to_string(),
            })
    }

    pub fn uid(&self) -> DiscretizationId {
        self.uid
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn linear(&self) -> bool {
        self.linear
    }

    pub fn operators(&self) -> &OperatorMap {
        &self.operators
    }

    pub fn operator(&self, name: &str) -> Option<&Arc<dyn Operator>> {
        self.operators.get(name).and_then(Option::as_ref)
    }

    pub fn products(&self) -> &ProductMap {
        &self.products
    }

    pub fn norm(&self, name: &str) -> Option<&InducedNorm> {
        self.norms
            .get(name)
            .or_else(|| self.norms.get(&format!("{}_norm", name)))
    }

    /// Names of the registered norms (`"<product>_norm"`)
    pub fn norm_names(&self) -> impl Iterator<Item = &str> {
        self.norms.keys().map(String::as_str)
    }

    pub fn estimator(&self) -> Option<&Arc<dyn Estimator>> {
        self.estimator.as_ref()
    }

    pub fn visualizer(&self) -> Option<&Arc<dyn Visualizer>> {
        self.visualizer.as_ref()
    }

    pub fn cache_region(&self) -> Option<&Arc<dyn CacheRegion>> {
        self.cache_region.as_ref()
    }

    pub fn parameter_space(&self) -> Option<&CubicParameterSpace> {
        self.parameter_space.as_ref()
    }
}

impl fmt::Debug for DiscretizationBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscretizationBase")
            .field("uid", &self.uid)
            .field("name", &self.name)
            .field("operators", &self.operators.keys().collect::<Vec<_>>())
            .field("products", &self.products.keys().collect::<Vec<_>>())
            .field("linear", &self.linear)
            .field("estimator", &self.estimator)
            .field("visualizer", &self.visualizer)
            .field("cache_region", &self.cache_region.is_some())
            .finish()
    }
}
