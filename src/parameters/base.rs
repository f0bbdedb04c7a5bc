//! Parameters and parameter types
//!
//! A [`Parameter`] assigns a numeric array to each name a model depends on;
//! a [`ParameterType`] declares which names are expected and with which
//! shapes. Discretizations build their parameter type from the types of
//! their operators and validate every incoming `mu` against it before any
//! numerical work starts.

use ndarray::{ArrayD, IxDyn};
use std::collections::BTreeMap;
use std::fmt;
use std::fmt::Write;

use crate::error::{MorError, MorResult};

// =================================================================================================
// Parameter
// =================================================================================================

/// Named numeric arrays a model is evaluated for
///
/// Scalars are stored as zero-dimensional arrays.
///
/// # Example
///
/// ```rust
/// use mor_rs::parameters::Parameter;
///
/// let mu = Parameter::from_scalars([("diffusion", 0.5), ("reaction", 2.0)]);
/// assert_eq!(mu.scalar("diffusion")?, 0.5);
/// assert_eq!(mu.len(), 2);
/// # Ok::<(), mor_rs::MorError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Parameter {
    values: BTreeMap<String, ArrayD<f64>>,
}

impl Parameter {
    /// Empty parameter
    pub fn new() -> Self {
        Self::default()
    }

    /// Parameter made of scalar entries
    pub fn from_scalars<'a>(pairs: impl IntoIterator<Item = (&'a str, f64)>) -> Self {
        let mut mu = Self::new();
        for (name, value) in pairs {
            mu.set_scalar(name, value);
        }
        mu
    }

    /// Set an entry of arbitrary shape
    pub fn set(&mut self, name: impl Into<String>, value: ArrayD<f64>) {
        self.values.insert(name.into(), value);
    }

    /// Set a scalar entry
    pub fn set_scalar(&mut self, name: impl Into<String>, value: f64) {
        self.set(name, ArrayD::from_elem(IxDyn(&[]), value));
    }

    /// Set a one-dimensional entry
    pub fn set_vector(&mut self, name: impl Into<String>, values: Vec<f64>) {
        let n = values.len();
        self.set(name, ArrayD::from_shape_vec(IxDyn(&[n]), values).unwrap_or_default());
    }

    /// Builder-style [`set_scalar`](Self::set_scalar)
    pub fn with_scalar(mut self, name: impl Into<String>, value: f64) -> Self {
        self.set_scalar(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ArrayD<f64>> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<ArrayD<f64>> {
        self.values.remove(name)
    }

    /// Value of a single-element entry
    pub fn scalar(&self, name: &str) -> MorResult<f64> {
        let value = self.get(name).ok_or_else(|| MorError::ParameterMissing {
            name: name.to_string(),
        })?;
        if value.len() != 1 {
            return Err(MorError::ParameterShape {
                name: name.to_string(),
                expected: vec![],
                found: value.shape().to_vec(),
            });
        }
        Ok(value.iter().copied().next().unwrap_or_default())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArrayD<f64>)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Parameter type this parameter conforms to
    pub fn parameter_type(&self) -> ParameterType {
        let mut ty = ParameterType::new();
        for (name, value) in &self.values {
            ty.insert(name.clone(), value.shape().to_vec());
        }
        ty
    }

    /// Deterministic textual fingerprint
    ///
    /// Names are visited in sorted order and values are encoded by their bit
    /// patterns, so equal parameters always produce equal fingerprints.
    pub fn fingerprint(&self) -> String {
        let mut out = String::new();
        for (name, value) in &self.values {
            let _ = write!(out, "{}{:?}=", name, value.shape());
            for x in value.iter() {
                let _ = write!(out, "{:016x},", x.to_bits());
            }
            out.push(';');
        }
        out
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            if value.ndim() == 0 {
                write!(f, "{}: {}", name, value.iter().next().copied().unwrap_or_default())?;
            } else {
                let entries = value
                    .iter()
                    .map(|x| x.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{}: [{}]", name, entries)?;
            }
        }
        write!(f, "}}")
    }
}

// =================================================================================================
// Parameter Type
// =================================================================================================

/// Declared parameter names and their shapes
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParameterType {
    shapes: BTreeMap<String, Vec<usize>>,
}

static EMPTY_PARAMETER_TYPE: ParameterType = ParameterType {
    shapes: BTreeMap::new(),
};

impl ParameterType {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared empty type for parameter-independent objects
    pub fn empty() -> &'static ParameterType {
        &EMPTY_PARAMETER_TYPE
    }

    /// Builder-style [`insert`](Self::insert)
    pub fn with(mut self, name: impl Into<String>, shape: Vec<usize>) -> Self {
        self.insert(name, shape);
        self
    }

    /// Declare a scalar component
    pub fn scalar(name: impl Into<String>) -> Self {
        Self::new().with(name, vec![])
    }

    pub fn insert(&mut self, name: impl Into<String>, shape: Vec<usize>) {
        self.shapes.insert(name.into(), shape);
    }

    pub fn get(&self, name: &str) -> Option<&[usize]> {
        self.shapes.get(name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.shapes.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.shapes.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[usize])> {
        self.shapes.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Union with `other`; a name declared with two different shapes fails
    pub fn merge(&mut self, other: &ParameterType) -> MorResult<()> {
        for (name, shape) in &other.shapes {
            match self.shapes.get(name) {
                Some(existing) if existing != shape => {
                    return Err(MorError::ParameterTypeConflict {
                        name: name.clone(),
                        first: existing.clone(),
                        second: shape.clone(),
                    });
                }
                Some(_) => {}
                None => {
                    self.shapes.insert(name.clone(), shape.clone());
                }
            }
        }
        Ok(())
    }

    /// Merge the types of several parametric objects, then drop the names
    /// the caller provides itself
    pub fn build<'a>(
        sources: impl IntoIterator<Item = &'a ParameterType>,
        provides: &Parameter,
    ) -> MorResult<Self> {
        let mut ty = Self::new();
        for source in sources {
            ty.merge(source)?;
        }
        for (name, value) in provides.iter() {
            if let Some(shape) = ty.shapes.remove(name)
                && shape.as_slice() != value.shape()
            {
                return Err(MorError::ParameterTypeConflict {
                    name: name.to_string(),
                    first: shape,
                    second: value.shape().to_vec(),
                });
            }
        }
        Ok(ty)
    }

    /// Validate `mu` against this type
    ///
    /// Every declared name must be present with the declared shape. Entries
    /// that are not declared are dropped from the returned parameter.
    pub fn parse(&self, mu: Option<&Parameter>) -> MorResult<Parameter> {
        let mut parsed = Parameter::new();
        for (name, shape) in &self.shapes {
            let value = mu
                .and_then(|m| m.get(name))
                .ok_or_else(|| MorError::ParameterMissing { name: name.clone() })?;
            if value.shape() != shape.as_slice() {
                return Err(MorError::ParameterShape {
                    name: name.clone(),
                    expected: shape.clone(),
                    found: value.shape().to_vec(),
                });
            }
            parsed.set(name.clone(), value.clone());
        }
        Ok(parsed)
    }
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self
            .shapes
            .iter()
            .map(|(k, v)| format!("{}: {:?}", k, v))
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{{{}}}", entries)
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_access() {
        let mu = Parameter::from_scalars([("k", 2.5)]);
        assert_eq!(mu.scalar("k").unwrap(), 2.5);
        assert!(matches!(
            mu.scalar("missing"),
            Err(MorError::ParameterMissing { .. })
        ));

        let mut mu = Parameter::new();
        mu.set_vector("v", vec![1.0, 2.0]);
        assert!(matches!(mu.scalar("v"), Err(MorError::ParameterShape { .. })));
    }

    #[test]
    fn test_parameter_type_of_parameter() {
        let mut mu = Parameter::from_scalars([("k", 1.0)]);
        mu.set_vector("v", vec![1.0, 2.0, 3.0]);
        let ty = mu.parameter_type();
        assert_eq!(ty.get("k"), Some(&[][..]));
        assert_eq!(ty.get("v"), Some(&[3][..]));
    }

    #[test]
    fn test_parse_accepts_matching_parameter() {
        let ty = ParameterType::scalar("k").with("v", vec![2]);
        let mut mu = Parameter::from_scalars([("k", 1.0), ("extra", 9.0)]);
        mu.set_vector("v", vec![1.0, 2.0]);

        let parsed = ty.parse(Some(&mu)).unwrap();
        assert_eq!(parsed.len(), 2);
        assert!(!parsed.contains("extra"));
    }

    #[test]
    fn test_parse_rejects_missing_and_misshaped() {
        let ty = ParameterType::new().with("v", vec![2]);

        let err = ty.parse(None).unwrap_err();
        assert!(matches!(err, MorError::ParameterMissing { ref name } if name == "v"));

        let mut mu = Parameter::new();
        mu.set_vector("v", vec![1.0, 2.0, 3.0]);
        let err = ty.parse(Some(&mu)).unwrap_err();
        assert!(matches!(err, MorError::ParameterShape { .. }));
    }

    #[test]
    fn test_empty_type_accepts_none() {
        let parsed = ParameterType::empty().parse(None).unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_merge_conflict() {
        let mut a = ParameterType::scalar("k");
        let b = ParameterType::new().with("k", vec![2]);
        assert!(matches!(
            a.merge(&b),
            Err(MorError::ParameterTypeConflict { .. })
        ));

        let c = ParameterType::scalar("k").with("d", vec![3]);
        a.merge(&c).unwrap();
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn test_build_removes_provided_names() {
        let op_type = ParameterType::scalar("_t").with("k", vec![]);
        let provides = Parameter::from_scalars([("_t", 0.0)]);
        let ty = ParameterType::build([&op_type], &provides).unwrap();
        assert!(!ty.contains("_t"));
        assert!(ty.contains("k"));

        let bad = ParameterType::new().with("_t", vec![2]);
        assert!(ParameterType::build([&bad], &provides).is_err());
    }

    #[test]
    fn test_fingerprint_is_deterministic() {
        let a = Parameter::from_scalars([("a", 1.0), ("b", 2.0)]);
        let b = Parameter::from_scalars([("b", 2.0), ("a", 1.0)]);
        let c = Parameter::from_scalars([("a", 1.0), ("b", 2.000001)]);
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
    }

    #[test]
    fn test_display() {
        let mut mu = Parameter::from_scalars([("k", 1.5)]);
        mu.set_vector("v", vec![1.0, 2.0]);
        assert_eq!(mu.to_string(), "{k: 1.5, v: [1, 2]}");
    }
}
