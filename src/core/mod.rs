//! Core signal-controller types and logic.
//!
//! This module contains the pure part of the controller:
//! - Signal states via the `State` trait
//! - Lamps and the Light Pattern Model
//! - The Transition Table policy
//! - Bounded history of settled transitions
//!
//! Nothing here locks, sleeps or spawns; the scheduling shell lives in
//! [`crate::controller`].

mod history;
mod light;
mod pattern;
mod request;
mod state;
mod table;

pub use history::{TransitionHistory, TransitionRecord, DEFAULT_HISTORY_LIMIT};
pub use light::{Light, LightState};
pub use pattern::{Pattern, PatternSet};
pub use request::RequestId;
pub use state::State;
pub use table::{DefaultPolicy, TransitionDecision, TransitionRule, TransitionTable};
