//! Builder API for controller construction.
//!
//! [`ControllerBuilder`] collects lamps, patterns, the transition table
//! and approach sequences, validates the whole configuration with
//! `stillwater` Validation, and starts a [`Controller`](crate::controller::Controller).
//! The [`state_enum!`](crate::state_enum) macro declares the state
//! vocabulary.

mod controller;
mod error;
pub mod macros;
mod validate;

pub use controller::ControllerBuilder;
pub use error::{BuildError, ConfigViolation};
