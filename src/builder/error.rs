//! Build errors for controller construction.

use crate::error::ControllerError;
use std::fmt;
use thiserror::Error;

/// One problem found while validating a controller configuration.
///
/// States and lamps are carried by name.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigViolation {
    #[error("No lamps configured. Call .lights(..) before building")]
    NoLights,

    #[error("Lamp '{light}' is configured more than once")]
    DuplicateLight { light: String },

    #[error("No patterns configured. Add at least one with .pattern(..)")]
    NoPatterns,

    #[error("State '{state}' has more than one pattern")]
    DuplicatePattern { state: String },

    #[error("Pattern for '{state}' does not set lamp '{light}'")]
    IncompletePattern { state: String, light: String },

    #[error("Pattern for '{state}' names unknown lamp '{light}'")]
    UnknownLight { state: String, light: String },

    #[error("Transition rule {from} -> {to} names '{state}', which has no pattern")]
    RuleUnknownState {
        from: String,
        to: String,
        state: String,
    },

    #[error("Redirect {from} -> {to} leads to '{via}', which redirects again")]
    RedirectChain {
        from: String,
        to: String,
        via: String,
    },

    #[error("Transition rule {from} -> {to} targets transient state '{to}'")]
    RuleToTransient { from: String, to: String },

    #[error("Redirect {from} -> {to} leads to transient state '{via}'")]
    RedirectToTransient {
        from: String,
        to: String,
        via: String,
    },

    #[error("Approach to '{target}' names '{state}', which has no pattern")]
    ApproachUnknownState { target: String, state: String },

    #[error("Approach to '{target}' passes through '{state}', which is not transient")]
    ApproachNotTransient { target: String, state: String },

    #[error("Initial state '{state}' has no pattern")]
    UnknownInitial { state: String },

    #[error("Initial state '{state}' is transient")]
    TransientInitial { state: String },

    #[error("Controller would start in transient state '{state}'")]
    TransientStart { state: String },
}

/// Errors that can occur when building a controller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    #[error("Invalid controller configuration: {}", Violations(.violations))]
    Invalid { violations: Vec<ConfigViolation> },

    #[error(transparent)]
    Controller(#[from] ControllerError),
}

impl BuildError {
    /// Violations that caused the build to fail, if any.
    pub fn violations(&self) -> &[ConfigViolation] {
        match self {
            Self::Invalid { violations } => violations,
            Self::Controller(_) => &[],
        }
    }
}

struct Violations<'a>(&'a [ConfigViolation]);

impl fmt::Display for Violations<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, violation) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_lists_every_violation() {
        let err = BuildError::Invalid {
            violations: vec![
                ConfigViolation::NoLights,
                ConfigViolation::DuplicatePattern {
                    state: "Open".to_string(),
                },
            ],
        };

        assert_eq!(
            err.to_string(),
            "Invalid controller configuration: \
             No lamps configured. Call .lights(..) before building; \
             State 'Open' has more than one pattern"
        );
        assert_eq!(err.violations().len(), 2);
    }

    #[test]
    fn controller_errors_pass_through() {
        let err: BuildError = ControllerError::Stopped.into();
        assert_eq!(err.to_string(), "Controller has been stopped");
        assert!(err.violations().is_empty());
    }
}
