//! Field-keyed validation errors.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};
use thiserror::Error;

/// A single reason why a field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Violation {
    /// The field was empty after sanitizing.
    #[error("empty")]
    Empty,
    /// The value is already taken by another entity.
    #[error("not unique")]
    NotUnique,
    /// The referenced entity does not exist.
    #[error("not found")]
    NotFound,
    /// The referenced comment was authenticated before.
    #[error("already authenticated")]
    AlreadyAuthenticated,
}

impl Serialize for Violation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Validation failure keyed by field name. Each field may carry several
/// violations at once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationError {
    fields: BTreeMap<&'static str, Vec<Violation>>,
}

impl ValidationError {
    /// Returns an empty error that can be filled with [`ValidationError::add`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a violation for `field`.
    pub fn add(&mut self, field: &'static str, violation: Violation) -> &mut Self {
        self.fields.entry(field).or_default().push(violation);
        self
    }

    /// Returns the first violation recorded for `field`.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<Violation> {
        self.fields.get(field).and_then(|v| v.first().copied())
    }

    /// Returns every violation recorded for `field`.
    #[must_use]
    pub fn violations(&self, field: &str) -> &[Violation] {
        self.fields.get(field).map_or(&[], Vec::as_slice)
    }

    /// Whether `field` carries `violation`.
    #[must_use]
    pub fn has(&self, field: &str, violation: Violation) -> bool {
        self.violations(field).contains(&violation)
    }

    /// Whether no field has been rejected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of rejected fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Iterates over rejected fields in name order.
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &[Violation])> {
        self.fields.iter().map(|(k, v)| (*k, v.as_slice()))
    }

    /// Returns `Ok(())` when nothing was recorded, `Err(self)` otherwise.
    ///
    /// # Errors
    ///
    /// Returns `self` if at least one violation was recorded.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation failed")?;
        let mut separator = ": ";
        for (field, violations) in &self.fields {
            let reasons: Vec<String> = violations.iter().map(ToString::to_string).collect();
            write!(f, "{separator}{field} [{}]", reasons.join(", "))?;
            separator = "; ";
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}
