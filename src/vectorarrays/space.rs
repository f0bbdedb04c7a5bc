//! Vector spaces
//!
//! A vector space is identified by its dimension and an optional identifier.
//! Two arrays can only be combined when their spaces compare equal, so the
//! identifier lets a discretization keep e.g. state and output spaces of the
//! same size apart.

use std::fmt;

/// Identity of a finite-dimensional real vector space
///
/// # Example
///
/// ```rust
/// use mor_rs::vectorarrays::VectorSpace;
///
/// let state = VectorSpace::new(100);
/// let scalar = VectorSpace::scalar();
///
/// assert_eq!(state.dim(), 100);
/// assert_eq!(scalar, VectorSpace::new(1));
/// assert_ne!(VectorSpace::with_id(100, "STATE"), state);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VectorSpace {
    dim: usize,
    id: Option<String>,
}

impl VectorSpace {
    /// Anonymous space of dimension `dim`
    pub fn new(dim: usize) -> Self {
        Self { dim, id: None }
    }

    /// Space of dimension `dim` tagged with an identifier
    pub fn with_id(dim: usize, id: impl Into<String>) -> Self {
        Self {
            dim,
            id: Some(id.into()),
        }
    }

    /// The one-dimensional space functionals map into
    pub fn scalar() -> Self {
        Self::new(1)
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// True for the anonymous one-dimensional space
    pub fn is_scalar(&self) -> bool {
        self.dim == 1 && self.id.is_none()
    }
}

impl fmt::Display for VectorSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.id {
            Some(id) => write!(f, "R^{} ({})", self.dim, id),
            None => write!(f, "R^{}", self.dim),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_uses_id() {
        assert_eq!(VectorSpace::new(3), VectorSpace::new(3));
        assert_ne!(VectorSpace::new(3), VectorSpace::new(4));
        assert_ne!(VectorSpace::new(3), VectorSpace::with_id(3, "STATE"));
        assert_eq!(VectorSpace::with_id(3, "STATE"), VectorSpace::with_id(3, "STATE"));
    }

    #[test]
    fn test_scalar_space() {
        assert!(VectorSpace::scalar().is_scalar());
        assert!(!VectorSpace::with_id(1, "OUT").is_scalar());
        assert!(!VectorSpace::new(2).is_scalar());
    }

    #[test]
    fn test_display() {
        assert_eq!(VectorSpace::new(5).to_string(), "R^5");
        assert_eq!(VectorSpace::with_id(5, "STATE").to_string(), "R^5 (STATE)");
    }
}
