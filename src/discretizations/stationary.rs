//! Stationary problems `L(u(μ), μ) = F(μ)`
//!
//! `L` is a (possibly nonlinear) operator on the solution space and `F` a
//! linear functional. Solving means inverting `L` on the vector
//! representation of `F`.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use mor_rs::discretizations::{Discretization, StationaryDiscretization};
//! use mor_rs::operators::{IdentityOperator, VectorFunctional};
//! use mor_rs::vectorarrays::{VectorArray, VectorSpace};
//!
//! let space = VectorSpace::new(1);
//! let f = VectorArray::from_vec(space.clone(), vec![2.5])?;
//!
//! let d = StationaryDiscretization::builder()
//!     .operator(Arc::new(IdentityOperator::new(space.clone())))
//!     .rhs(Arc::new(VectorFunctional::new(f.clone())?))
//!     .name("identity problem")
//!     .build()?;
//!
//! assert_eq!(d.solution_space(), &space);
//! assert_eq!(d.solve(None)?, f);
//! # Ok::<(), mor_rs::MorError>(())
//! ```

use log::{Level, info, log_enabled};
use std::sync::Arc;

use super::base::{
    BaseConfig, BaseOverrides, DiscretizationBase, OperatorMap, ProductMap, SpecialOperator,
};
use super::interfaces::{Discretization, Estimator, Visualizer};
use crate::cache::CacheRegion;
use crate::error::{MorError, MorResult};
use crate::operators::Operator;
use crate::parameters::{CubicParameterSpace, Parameter, ParameterType};
use crate::vectorarrays::{VectorArray, VectorSpace};

const DEFAULT_NAME: &str = "StationaryDiscretization";

// =================================================================================================
// Discretization
// =================================================================================================

/// Discretization of `L(u(μ), μ) = F(μ)`
#[derive(Debug, Clone)]
pub struct StationaryDiscretization {
    base: DiscretizationBase,
    operator: Arc<dyn Operator>,
    rhs: Arc<dyn Operator>,
    solution_space: VectorSpace,
    parameter_type: ParameterType,
}

impl StationaryDiscretization {
    pub fn builder() -> StationaryDiscretizationBuilder {
        StationaryDiscretizationBuilder::default()
    }

    /// Discretization with just an operator and a right-hand side
    pub fn new(operator: Arc<dyn Operator>, rhs: Arc<dyn Operator>) -> MorResult<Self> {
        Self::builder().operator(operator).rhs(rhs).build()
    }

    fn from_parts(
        config: BaseConfig,
        operator: Option<Arc<dyn Operator>>,
        rhs: Option<Arc<dyn Operator>>,
    ) -> MorResult<Self> {
        let specials: [SpecialOperator; 2] = [("operator", operator), ("rhs", rhs)];
        let base = DiscretizationBase::new(config, &specials, DEFAULT_NAME)?;
        let operator = base.required("operator")?;
        let rhs = base.required("rhs")?;

        validate(operator.as_ref(), rhs.as_ref())?;

        let parameter_type = ParameterType::build(
            [operator.parameter_type(), rhs.parameter_type()],
            &Parameter::new(),
        )?;

        Ok(Self {
            solution_space: operator.source().clone(),
            base,
            operator,
            rhs,
            parameter_type,
        })
    }

    /// The operator `L`, same as `operators()["operator"]`
    pub fn operator(&self) -> &Arc<dyn Operator> {
        &self.operator
    }

    /// The functional `F`, same as `operators()["rhs"]`
    pub fn rhs(&self) -> &Arc<dyn Operator> {
        &self.rhs
    }

    /// Copy with some fields replaced
    ///
    /// Unless an explicit operator map is given, the copy keeps all other
    /// operators and the overridden special operators replace their map
    /// entries. The copy is validated like a new discretization.
    pub fn with_(&self, overrides: StationaryOverrides) -> MorResult<Self> {
        let StationaryOverrides {
            operator,
            rhs,
            base,
        } = overrides;
        let specials: [SpecialOperator; 2] = [("operator", operator), ("rhs", rhs)];
        let config = self.base.reconfigure(base, &specials);
        let [(_, operator), (_, rhs)] = specials;
        Self::from_parts(config, operator, rhs)
    }
}

/// `operator.source == operator.range == rhs.source`, `rhs` a linear
/// functional
fn validate(operator: &dyn Operator, rhs: &dyn Operator) -> MorResult<()> {
    let space = operator.source();
    if operator.range() != space {
        return Err(MorError::space_mismatch("operator.range", space, operator.range()));
    }
    if rhs.source() != space {
        return Err(MorError::space_mismatch("rhs.source", space, rhs.source()));
    }
    if !rhs.range().is_scalar() {
        return Err(MorError::InvariantViolation(format!(
            "rhs '{}' must be a functional, its range is {}",
            rhs.name(),
            rhs.range()
        )));
    }
    if !rhs.linear() {
        return Err(MorError::InvariantViolation(format!(
            "rhs '{}' must be linear",
            rhs.name()
        )));
    }
    Ok(())
}

impl Discretization for StationaryDiscretization {
    fn base(&self) -> &DiscretizationBase {
        &self.base
    }

    fn as_dyn(&self) -> &dyn Discretization {
        self
    }

    fn solution_space(&self) -> &VectorSpace {
        &self.solution_space
    }

    fn parameter_type(&self) -> &ParameterType {
        &self.parameter_type
    }

    fn compute_solution(&self, mu: &Parameter) -> MorResult<VectorArray> {
        // skip formatting mu when the record would be dropped
        if log_enabled!(Level::Info) {
            info!("Solving {} for {} ...", self.base.name(), mu);
        }
        let f = self.rhs.as_source_array(Some(mu))?;
        self.operator.apply_inverse(&f, Some(mu))
    }
}

// =================================================================================================
// Builder & Overrides
// =================================================================================================

/// Builder for [`StationaryDiscretization`]
#[derive(Debug, Clone, Default)]
pub struct StationaryDiscretizationBuilder {
    operator: Option<Arc<dyn Operator>>,
    rhs: Option<Arc<dyn Operator>>,
    config: BaseConfig,
}

impl StationaryDiscretizationBuilder {
    pub fn operator(mut self, operator: Arc<dyn Operator>) -> Self {
        self.operator = Some(operator);
        self
    }

    pub fn rhs(mut self, rhs: Arc<dyn Operator>) -> Self {
        self.rhs = Some(rhs);
        self
    }

    /// Operator map; may also hold `operator` and `rhs`
    pub fn operators(mut self, operators: OperatorMap) -> Self {
        self.config.operators = operators;
        self
    }

    /// Register an additional named operator
    pub fn with_operator(mut self, name: impl Into<String>, operator: Arc<dyn Operator>) -> Self {
        self.config.operators.insert(name.into(), Some(operator));
        self
    }

    pub fn products(mut self, products: ProductMap) -> Self {
        self.config.products = products;
        self
    }

    /// Register an inner product; its norm becomes available as
    /// `"<name>_norm"`
    pub fn product(mut self, name: impl Into<String>, product: Arc<dyn Operator>) -> Self {
        self.config.products.insert(name.into(), product);
        self
    }

    pub fn estimator(mut self, estimator: Arc<dyn Estimator>) -> Self {
        self.config.estimator = Some(estimator);
        self
    }

    pub fn visualizer(mut self, visualizer: Arc<dyn Visualizer>) -> Self {
        self.config.visualizer = Some(visualizer);
        self
    }

    pub fn cache_region(mut self, region: Arc<dyn CacheRegion>) -> Self {
        self.config.cache_region = Some(region);
        self
    }

    pub fn parameter_space(mut self, space: CubicParameterSpace) -> Self {
        self.config.parameter_space = Some(space);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = Some(name.into());
        self
    }

    pub fn build(self) -> MorResult<StationaryDiscretization> {
        StationaryDiscretization::from_parts(self.config, self.operator, self.rhs)
    }
}

/// Fields of a [`StationaryDiscretization`] that `with_` can replace
#[derive(Debug, Clone, Default)]
pub struct StationaryOverrides {
    pub operator: Option<Arc<dyn Operator>>,
    pub rhs: Option<Arc<dyn Operator>>,
    pub base: BaseOverrides,
}

impl StationaryOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn operator(mut self, operator: Arc<dyn Operator>) -> Self {
        self.operator = Some(operator);
        self
    }

    pub fn rhs(mut self, rhs: Arc<dyn Operator>) -> Self {
        self.rhs = Some(rhs);
        self
    }

    pub fn operators(mut self, operators: OperatorMap) -> Self {
        self.base.operators = Some(operators);
        self
    }

    pub fn products(mut self, products: ProductMap) -> Self {
        self.base.products = Some(products);
        self
    }

    pub fn estimator(mut self, estimator: Option<Arc<dyn Estimator>>) -> Self {
        self.base.estimator = Some(estimator);
        self
    }

    pub fn visualizer(mut self, visualizer: Option<Arc<dyn Visualizer>>) -> Self {
        self.base.visualizer = Some(visualizer);
        self
    }

    pub fn cache_region(mut self, region: Option<Arc<dyn CacheRegion>>) -> Self {
        self.base.cache_region = Some(region);
        self
    }

    pub fn parameter_space(mut self, space: Option<CubicParameterSpace>) -> Self {
        self.base.parameter_space = Some(space);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.base.name = Some(name.into());
        self
    }
}

// =================================================================================================
// Tests
// =================================================================================================
