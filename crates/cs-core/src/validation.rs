//! Uniform result contract for structural validators.

use serde::{Deserialize, Serialize};

/// Outcome of a structural validation: a validity flag plus ordered errors.
///
/// Every validator (MBQL grammar, visualization settings, parameter
/// processing) reports through this type. `valid` is false exactly when
/// `errors` is non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl Default for ValidationOutcome {
    fn default() -> Self {
        Self::ok()
    }
}

impl ValidationOutcome {
    /// A passing outcome with no errors
    pub fn ok() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    /// Build an outcome from collected errors
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// Record an error, marking the outcome invalid
    pub fn push(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
        self.valid = false;
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }
}
