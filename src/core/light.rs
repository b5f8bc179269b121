//! Physical lamps and their on/off/flashing state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// State of a single lamp.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub enum LightState {
    #[default]
    Off,
    SteadyOn,
    Flashing,
}

impl fmt::Display for LightState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Off => "Off",
            Self::SteadyOn => "On",
            Self::Flashing => "Flashing",
        };
        f.write_str(name)
    }
}

/// One named lamp owned by a controller.
///
/// Only the state machine core changes a lamp's state; everything outside
/// the crate sees lamps through read-only snapshots.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Light {
    name: String,
    state: LightState,
}

impl Light {
    /// Create a dark lamp.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: LightState::Off,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> LightState {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: LightState) {
        self.state = state;
    }
}

impl fmt::Display for Light {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.state)
    }
}
