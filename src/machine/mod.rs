//! State Machine Core.
//!
//! Resolves requested moves against the transition table, expands them
//! into steps, and applies lamp patterns. Single-threaded and free of
//! timing; the controller serializes every call into it.

mod plan;
mod signal;

pub use plan::{Sequencing, Step, TransitionOutcome, TransitionPlan};
pub use signal::SignalMachine;
