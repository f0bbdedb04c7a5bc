//! Instationary problems `M ∂ₜu + L(u, t, μ) = F(t, μ)` on `[0, T]`
//!
//! The discretization assembles the inputs of a time integration (operator,
//! load, mass, initial state, time interval, parameter) and hands them to
//! its [`TimeStepper`]. The stepping algorithm itself belongs to the stepper.
//!
//! Every operator is evaluated with the time parameter `_t` set. Callers
//! never pass it: it is declared as provided, with value `0` for the
//! evaluation of the initial data.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use mor_rs::discretizations::{Discretization, InstationaryDiscretization};
//! use mor_rs::operators::IdentityOperator;
//! use mor_rs::timestepping::ImplicitEulerTimeStepper;
//! use mor_rs::vectorarrays::{VectorArray, VectorSpace};
//!
//! let space = VectorSpace::new(1);
//! let u0 = VectorArray::from_vec(space.clone(), vec![1.0])?;
//!
//! let d = InstationaryDiscretization::builder(1.0)
//!     .operator(Arc::new(IdentityOperator::new(space)))
//!     .initial_data(u0)
//!     .time_stepper(Arc::new(ImplicitEulerTimeStepper::new(10)?))
//!     .num_values(3)
//!     .build()?;
//!
//! assert_eq!(d.solve(None)?.len(), 3);
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
use crate::operators::{Operator, VectorOperator};
use crate::parameters::{CubicParameterSpace, Parameter, ParameterType, TIME_PARAMETER};
use crate::timestepping::{TimeStepper, TimeSteppingProblem};
use crate::vectorarrays::{VectorArray, VectorSpace};

const DEFAULT_NAME: &str = "InstationaryDiscretization";

/// Initial state, either fixed or parameter dependent
#[derive(Debug, Clone)]
pub enum InitialData {
    /// A single state vector
    Vector(VectorArray),

    /// Operator `R → V` whose range array is the initial state
    Operator(Arc<dyn Operator>),
}

impl InitialData {
    fn into_operator(self) -> Arc<dyn Operator> {
        match self {
            InitialData::Vector(array) => {
                Arc::new(VectorOperator::new(array).with_name("initial_data"))
            }
            InitialData::Operator(op) => op,
        }
    }
}

impl From<VectorArray> for InitialData {
    fn from(array: VectorArray) -> Self {
        InitialData::Vector(array)
    }
}

impl From<Arc<dyn Operator>> for InitialData {
    fn from(op: Arc<dyn Operator>) -> Self {
        InitialData::Operator(op)
    }
}

// =================================================================================================
// Discretization
// =================================================================================================

/// Discretization of `M ∂ₜu + L(u, t, μ) = F(t, μ)`, `u(0) = u₀(μ)`
///
/// `solve` returns the trajectory computed by the time-stepper: `num_values`
/// equidistant states if set, otherwise one state per time step.
#[derive(Debug, Clone)]
pub struct InstationaryDiscretization {
    base: DiscretizationBase,
    t_end: f64,
    operator: Arc<dyn Operator>,
    rhs: Option<Arc<dyn Operator>>,
    mass: Option<Arc<dyn Operator>>,
    initial_data: Arc<dyn Operator>,
    time_stepper: Arc<dyn TimeStepper>,
    num_values: Option<usize>,
    solution_space: VectorSpace,
    parameter_type: ParameterType,
}

/// Resolved construction inputs of one instance
struct Parts {
    t_end: f64,
    operator: Option<Arc<dyn Operator>>,
    mass: Option<Arc<dyn Operator>>,
    rhs: Option<Arc<dyn Operator>>,
    initial_data: Option<Arc<dyn Operator>>,
    time_stepper: Option<Arc<dyn TimeStepper>>,
    num_values: Option<usize>,
}

impl Parts {
    fn specials(&self) -> [SpecialOperator; 4] {
        [
            ("operator", self.operator.clone()),
            ("mass", self.mass.clone()),
            ("rhs", self.rhs.clone()),
            ("initial_data", self.initial_data.clone()),
        ]
    }
}

impl InstationaryDiscretization {
    /// Builder for a problem on `[0, t_end]`
    pub fn builder(t_end: f64) -> InstationaryDiscretizationBuilder {
        InstationaryDiscretizationBuilder::new(t_end)
    }

    fn from_parts(config: BaseConfig, parts: Parts) -> MorResult<Self> {
        let base = DiscretizationBase::new(config, &parts.specials(), DEFAULT_NAME)?;

        if !(parts.t_end.is_finite() && parts.t_end > 0.0) {
            return Err(MorError::Configuration(format!(
                "final time must be positive and finite, got {}",
                parts.t_end
            )));
        }
        if parts.num_values == Some(0) {
            return Err(MorError::Configuration(
                "num_values must be greater than 0".to_string(),
            ));
        }
        let time_stepper = parts.time_stepper.ok_or_else(|| {
            MorError::Configuration(format!("'{}' needs a time-stepper", base.name()))
        })?;

        let operator = base.required("operator")?;
        let initial_data = base.required("initial_data")?;
        let rhs = base.operator("rhs").cloned();
        let mass = base.operator("mass").cloned();

        validate(
            operator.as_ref(),
            initial_data.as_ref(),
            rhs.as_deref(),
            mass.as_deref(),
        )?;

        let mut sources = vec![initial_data.parameter_type(), operator.parameter_type()];
        sources.extend(rhs.as_ref().map(|op| op.parameter_type()));
        sources.extend(mass.as_ref().map(|op| op.parameter_type()));
        let provides = Parameter::new().with_scalar(TIME_PARAMETER, 0.0);
        let parameter_type = ParameterType::build(sources, &provides)?;

        Ok(Self {
            solution_space: operator.source().clone(),
            base,
            t_end: parts.t_end,
            operator,
            rhs,
            mass,
            initial_data,
            time_stepper,
            num_values: parts.num_values,
            parameter_type,
        })
    }

    /// Final time `T`
    pub fn t_end(&self) -> f64 {
        self.t_end
    }

    pub fn operator(&self) -> &Arc<dyn Operator> {
        &self.operator
    }

    pub fn rhs(&self) -> Option<&Arc<dyn Operator>> {
        self.rhs.as_ref()
    }

    pub fn mass(&self) -> Option<&Arc<dyn Operator>> {
        self.mass.as_ref()
    }

    /// Initial data as an operator `R → V`, raw vectors already wrapped
    pub fn initial_data(&self) -> &Arc<dyn Operator> {
        &self.initial_data
    }

    pub fn time_stepper(&self) -> &Arc<dyn TimeStepper> {
        &self.time_stepper
    }

    /// Step count of the time-stepper, if it has a configurable one
    pub fn time_stepper_nt(&self) -> Option<usize> {
        self.time_stepper.nt()
    }

    pub fn num_values(&self) -> Option<usize> {
        self.num_values
    }

    /// Copy with some fields replaced
    ///
    /// `time_stepper_nt` replaces the stepper by a copy with a different
    /// step count and cannot be combined with `time_stepper`.
    pub fn with_(&self, overrides: InstationaryOverrides) -> MorResult<Self> {
        let InstationaryOverrides {
            t_end,
            operator,
            mass,
            rhs,
            initial_data,
            time_stepper,
            time_stepper_nt,
            num_values,
            base,
        } = overrides;

        let time_stepper = match (time_stepper, time_stepper_nt) {
            (Some(_), Some(_)) => {
                return Err(MorError::ConflictingOverrides {
                    first: "time_stepper",
                    second: "time_stepper_nt",
                });
            }
            (Some(stepper), None) => stepper,
            (None, Some(nt)) => {
                if self.time_stepper.nt().is_none() {
                    return Err(MorError::InvalidOverride {
                        field: "time_stepper_nt",
                        reason: format!(
                            "time-stepper '{}' has no step count",
                            self.time_stepper.name()
                        ),
                    });
                }
                self.time_stepper.with_nt(nt)?
            }
            (None, None) => self.time_stepper.clone(),
        };

        let parts = Parts {
            t_end: t_end.unwrap_or(self.t_end),
            operator,
            mass,
            rhs,
            initial_data: initial_data.map(InitialData::into_operator),
            time_stepper: Some(time_stepper),
            num_values: num_values.unwrap_or(self.num_values),
        };
        let config = self.base.reconfigure(base, &parts.specials());
        Self::from_parts(config, parts)
    }
}

/// Dimensional and linearity constraints between the operators
fn validate(
    operator: &dyn Operator,
    initial_data: &dyn Operator,
    rhs: Option<&dyn Operator>,
    mass: Option<&dyn Operator>,
) -> MorResult<()> {
    let space = operator.source();

    if !initial_data.source().is_scalar() {
        return Err(MorError::InvariantViolation(format!(
            "initial data '{}' must map from R^1, its source is {}",
            initial_data.name(),
            initial_data.source()
        )));
    }
    if operator.range() != space {
        return Err(MorError::space_mismatch("operator.range", space, operator.range()));
    }
    if initial_data.range() != space {
        return Err(MorError::space_mismatch(
            "initial_data.range",
            space,
            initial_data.range(),
        ));
    }

    if let Some(rhs) = rhs {
        if !rhs.linear() {
            return Err(MorError::InvariantViolation(format!(
                "rhs '{}' must be linear",
                rhs.name()
            )));
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
    }

    if let Some(mass) = mass {
        if !mass.linear() {
            return Err(MorError::InvariantViolation(format!(
                "mass '{}' must be linear",
                mass.name()
            )));
        }
        if mass.source() != space {
            return Err(MorError::space_mismatch("mass.source", space, mass.source()));
        }
        if mass.range() != space {
            return Err(MorError::space_mismatch("mass.range", space, mass.range()));
        }
    }
    Ok(())
}

impl Discretization for InstationaryDiscretization {
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
        if log_enabled!(Level::Info) {
            info!("Solving {} for {} ...", self.base.name(), mu);
        }

        let mu = mu.clone().with_scalar(TIME_PARAMETER, 0.0);
        let u0 = self.initial_data.as_range_array(Some(&mu))?;

        let problem = TimeSteppingProblem {
            operator: self.operator.as_ref(),
            rhs: self.rhs.as_deref(),
            initial_data: &u0,
            mass: self.mass.as_deref(),
            initial_time: 0.0,
            end_time: self.t_end,
            mu: Some(&mu),
            num_values: self.num_values,
        };
        self.time_stepper.solve(&problem)
    }
}

// =================================================================================================
// Builder & Overrides
// =================================================================================================

/// Builder for [`InstationaryDiscretization`]
#[derive(Debug, Clone)]
pub struct InstationaryDiscretizationBuilder {
    t_end: f64,
    operator: Option<Arc<dyn Operator>>,
    mass: Option<Arc<dyn Operator>>,
    rhs: Option<Arc<dyn Operator>>,
    initial_data: Option<InitialData>,
    time_stepper: Option<Arc<dyn TimeStepper>>,
    num_values: Option<usize>,
    config: BaseConfig,
}

impl InstationaryDiscretizationBuilder {
    pub fn new(t_end: f64) -> Self {
        Self {
            t_end,
            operator: None,
            mass: None,
            rhs: None,
            initial_data: None,
            time_stepper: None,
            num_values: None,
            config: BaseConfig::default(),
        }
    }

    pub fn operator(mut self, operator: Arc<dyn Operator>) -> Self {
        self.operator = Some(operator);
        self
    }

    pub fn mass(mut self, mass: Arc<dyn Operator>) -> Self {
        self.mass = Some(mass);
        self
    }

    pub fn rhs(mut self, rhs: Arc<dyn Operator>) -> Self {
        self.rhs = Some(rhs);
        self
    }

    /// A state vector or an operator `R → V`
    pub fn initial_data(mut self, initial_data: impl Into<InitialData>) -> Self {
        self.initial_data = Some(initial_data.into());
        self
    }

    pub fn time_stepper(mut self, time_stepper: Arc<dyn TimeStepper>) -> Self {
        self.time_stepper = Some(time_stepper);
        self
    }

    /// Number of equidistant states to return
    pub fn num_values(mut self, num_values: usize) -> Self {
        self.num_values = Some(num_values);
        self
    }

    pub fn operators(mut self, operators: OperatorMap) -> Self {
        self.config.operators = operators;
        self
    }

    pub fn with_operator(mut self, name: impl Into<String>, operator: Arc<dyn Operator>) -> Self {
        self.config.operators.insert(name.into(), Some(operator));
        self
    }

    pub fn products(mut self, products: ProductMap) -> Self {
        self.config.products = products;
        self
    }

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

    pub fn build(self) -> MorResult<InstationaryDiscretization> {
        let parts = Parts {
            t_end: self.t_end,
            operator: self.operator,
            mass: self.mass,
            rhs: self.rhs,
            initial_data: self.initial_data.map(InitialData::into_operator),
            time_stepper: self.time_stepper,
            num_values: self.num_values,
        };
        InstationaryDiscretization::from_parts(self.config, parts)
    }
}

/// Fields of an [`InstationaryDiscretization`] that `with_` can replace
///
/// `num_values` is doubly optional: `Some(None)` switches back to one state
/// per time step.
#[derive(Debug, Clone, Default)]
pub struct InstationaryOverrides {
    pub t_end: Option<f64>,
    pub operator: Option<Arc<dyn Operator>>,
    pub mass: Option<Arc<dyn Operator>>,
    pub rhs: Option<Arc<dyn Operator>>,
    pub initial_data: Option<InitialData>,
    pub time_stepper: Option<Arc<dyn TimeStepper>>,
    pub time_stepper_nt: Option<usize>,
    pub num_values: Option<Option<usize>>,
    pub base: BaseOverrides,
}

impl InstationaryOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn t_end(mut self, t_end: f64) -> Self {
        self.t_end = Some(t_end);
        self
    }

    pub fn operator(mut self, operator: Arc<dyn Operator>) -> Self {
        self.operator = Some(operator);
        self
    }

    pub fn mass(mut self, mass: Arc<dyn Operator>) -> Self {
        self.mass = Some(mass);
        self
    }

    pub fn rhs(mut self, rhs: Arc<dyn Operator>) -> Self {
        self.rhs = Some(rhs);
        self
    }

    pub fn initial_data(mut self, initial_data: impl Into<InitialData>) -> Self {
        self.initial_data = Some(initial_data.into());
        self
    }

    pub fn time_stepper(mut self, time_stepper: Arc<dyn TimeStepper>) -> Self {
        self.time_stepper = Some(time_stepper);
        self
    }

    pub fn time_stepper_nt(mut self, nt: usize) -> Self {
        self.time_stepper_nt = Some(nt);
        self
    }

    pub fn num_values(mut self, num_values: Option<usize>) -> Self {
        self.num_values = Some(num_values);
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
