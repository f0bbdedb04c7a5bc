//! Parameter functionals
//!
//! Scalar-valued maps of a [`Parameter`], used as coefficients of
//! parameter-dependent linear combinations of operators.

use ndarray::IxDyn;
use std::fmt;
use std::sync::Arc;

use super::base::{Parameter, ParameterType};
use crate::error::{MorError, MorResult};

/// Scalar function of a parameter
pub trait ParameterFunctional: Send + Sync + fmt::Debug {
    /// Evaluate for `mu`
    fn evaluate(&self, mu: Option<&Parameter>) -> MorResult<f64>;

    /// Names and shapes the functional reads
    fn parameter_type(&self) -> &ParameterType;
}

/// Selects one component of a named parameter
///
/// # Example
///
/// ```rust
/// use mor_rs::parameters::{Parameter, ParameterFunctional, ProjectionParameterFunctional};
///
/// let theta = ProjectionParameterFunctional::scalar("diffusion");
/// let mu = Parameter::from_scalars([("diffusion", 0.25)]);
/// assert_eq!(theta.evaluate(Some(&mu))?, 0.25);
/// # Ok::<(), mor_rs::MorError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ProjectionParameterFunctional {
    name: String,
    index: Vec<usize>,
    parameter_type: ParameterType,
}

impl ProjectionParameterFunctional {
    /// Component `index` of the parameter `name` with shape `shape`
    pub fn new(name: impl Into<String>, shape: Vec<usize>, index: Vec<usize>) -> MorResult<Self> {
        let name = name.into();
        let in_bounds =
            index.len() == shape.len() && index.iter().zip(&shape).all(|(i, n)| i < n);
        if !in_bounds {
            return Err(MorError::Configuration(format!(
                "index {:?} is not valid for parameter '{}' of shape {:?}",
                index, name, shape
            )));
        }
        let parameter_type = ParameterType::new().with(name.clone(), shape);
        Ok(Self {
            name,
            index,
            parameter_type,
        })
    }

    /// Projection onto a scalar parameter
    pub fn scalar(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            parameter_type: ParameterType::scalar(name.clone()),
            name,
            index: vec![],
        }
    }
}

impl ParameterFunctional for ProjectionParameterFunctional {
    fn evaluate(&self, mu: Option<&Parameter>) -> MorResult<f64> {
        let mu = self.parameter_type.parse(mu)?;
        let value = mu.get(&self.name).ok_or_else(|| MorError::ParameterMissing {
            name: self.name.clone(),
        })?;
        value
            .get(IxDyn(&self.index))
            .copied()
            .ok_or_else(|| MorError::ParameterShape {
                name: self.name.clone(),
                expected: self.parameter_type.get(&self.name).unwrap_or_default().to_vec(),
                found: value.shape().to_vec(),
            })
    }

    fn parameter_type(&self) -> &ParameterType {
        &self.parameter_type
    }
}

type Mapping = dyn Fn(&Parameter) -> f64 + Send + Sync;

/// Functional defined by an arbitrary closure
///
/// The closure only ever sees a parameter that has been validated against
/// the declared type.
///
/// # Example
///
/// ```rust
/// use mor_rs::parameters::{
///     GenericParameterFunctional, Parameter, ParameterFunctional, ParameterType,
/// };
///
/// let decay = GenericParameterFunctional::new(
///     "exp(-t)",
///     ParameterType::scalar("_t"),
///     |mu| (-mu.scalar("_t").unwrap_or_default()).exp(),
/// );
/// let mu = Parameter::from_scalars([("_t", 0.0)]);
/// assert_eq!(decay.evaluate(Some(&mu))?, 1.0);
/// # Ok::<(), mor_rs::MorError>(())
/// ```
#[derive(Clone)]
pub struct GenericParameterFunctional {
    name: String,
    mapping: Arc<Mapping>,
    parameter_type: ParameterType,
}

impl GenericParameterFunctional {
    pub fn new<F>(name: impl Into<String>, parameter_type: ParameterType, mapping: F) -> Self
    where
        F: Fn(&Parameter) -> f64 + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            mapping: Arc::new(mapping),
            parameter_type,
        }
    }
}

impl ParameterFunctional for GenericParameterFunctional {
    fn evaluate(&self, mu: Option<&Parameter>) -> MorResult<f64> {
        let mu = self.parameter_type.parse(mu)?;
        Ok((self.mapping)(&mu))
    }

    fn parameter_type(&self) -> &ParameterType {
        &self.parameter_type
    }
}

impl fmt::Debug for GenericParameterFunctional {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenericParameterFunctional")
            .field("name", &self.name)
            .field("parameter_type", &self.parameter_type)
            .finish()
    }
}
