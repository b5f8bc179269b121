//! Light Pattern Model.
//!
//! A [`Pattern`] is the complete lamp configuration for one signal state.
//! A [`PatternSet`] maps every state of a controller's vocabulary to its
//! pattern and is fixed once the controller is built.

use super::light::{Light, LightState};
use super::state::State;
use crate::error::{ControllerError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Lamp configuration: lamp name to lamp state, in lamp order.
///
/// # Example
///
/// ```rust
/// use signalbox::core::{LightState, Pattern};
///
/// let closed = Pattern::new()
///     .with("red", LightState::SteadyOn)
///     .with("amber", LightState::Off)
///     .with("green", LightState::Off);
///
/// assert_eq!(closed.state_of("red"), Some(LightState::SteadyOn));
/// assert_eq!(closed.state_of("blue"), None);
/// ```
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct Pattern {
    lamps: Vec<(String, LightState)>,
}

impl Pattern {
    pub fn new() -> Self {
        Self { lamps: Vec::new() }
    }

    /// Set the state of one lamp, replacing any earlier entry for it.
    pub fn with(mut self, name: impl Into<String>, state: LightState) -> Self {
        let name = name.into();
        match self.lamps.iter_mut().find(|(lamp, _)| *lamp == name) {
            Some(entry) => entry.1 = state,
            None => self.lamps.push((name, state)),
        }
        self
    }

    pub fn state_of(&self, name: &str) -> Option<LightState> {
        self.lamps
            .iter()
            .find(|(lamp, _)| lamp == name)
            .map(|(_, state)| *state)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, LightState)> {
        self.lamps.iter().map(|(name, state)| (name.as_str(), *state))
    }

    pub fn len(&self) -> usize {
        self.lamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lamps.is_empty()
    }

    /// True if every named lamp has an entry.
    pub fn covers<N: AsRef<str>>(&self, lights: &[N]) -> bool {
        lights
            .iter()
            .all(|name| self.state_of(name.as_ref()).is_some())
    }

    /// Check whether a set of lamps currently shows this pattern.
    pub fn matches(&self, lights: &[Light]) -> bool {
        lights.len() == self.lamps.len()
            && lights
                .iter()
                .all(|light| self.state_of(light.name()) == Some(light.state()))
    }

    /// Read the pattern currently shown by a set of lamps.
    pub(crate) fn from_lights(lights: &[Light]) -> Self {
        Self {
            lamps: lights
                .iter()
                .map(|light| (light.name().to_string(), light.state()))
                .collect(),
        }
    }

    /// Reorder entries to follow the given lamp order, dropping extras.
    pub(crate) fn ordered_by<N: AsRef<str>>(&self, lights: &[N]) -> Self {
        Self {
            lamps: lights
                .iter()
                .filter_map(|name| {
                    self.state_of(name.as_ref())
                        .map(|state| (name.as_ref().to_string(), state))
                })
                .collect(),
        }
    }
}

impl<N: Into<String>> FromIterator<(N, LightState)> for Pattern {
    fn from_iter<I: IntoIterator<Item = (N, LightState)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Pattern::new(), |pattern, (name, state)| {
                pattern.with(name, state)
            })
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (name, state)) in self.lamps.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}: {state}")?;
        }
        Ok(())
    }
}

/// Static mapping from every state of the vocabulary to its pattern.
#[derive(Clone, Debug)]
pub struct PatternSet<S: State> {
    lights: Vec<String>,
    vocabulary: Vec<S>,
    patterns: HashMap<S, Pattern>,
}

impl<S: State> PatternSet<S> {
    pub(crate) fn new(lights: Vec<String>) -> Self {
        Self {
            lights,
            vocabulary: Vec::new(),
            patterns: HashMap::new(),
        }
    }

    /// Register a pattern. Callers validate coverage beforehand.
    pub(crate) fn insert(&mut self, state: S, pattern: &Pattern) {
        let pattern = pattern.ordered_by(&self.lights);
        if self.patterns.insert(state, pattern).is_none() {
            self.vocabulary.push(state);
        }
    }

    /// Pattern for a state, or `UnknownState` if it is not in the vocabulary.
    pub fn pattern_for(&self, state: S) -> Result<&Pattern> {
        self.patterns
            .get(&state)
            .ok_or_else(|| ControllerError::UnknownState {
                state: state.name().to_string(),
            })
    }

    pub fn contains(&self, state: S) -> bool {
        self.patterns.contains_key(&state)
    }

    /// States in registration order.
    pub fn vocabulary(&self) -> &[S] {
        &self.vocabulary
    }

    pub fn light_names(&self) -> &[String] {
        &self.lights
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state_enum;

    state_enum! {
        enum Lamp {
            Dark,
            Lit,
            Blinking,
        }
    }

    fn names() -> Vec<String> {
        vec!["top".to_string(), "bottom".to_string()]
    }

    #[test]
    fn with_replaces_existing_entry() {
        let pattern = Pattern::new()
            .with("top", LightState::Off)
            .with("top", LightState::Flashing);

        assert_eq!(pattern.len(), 1);
        assert_eq!(pattern.state_of("top"), Some(LightState::Flashing));
    }

    #[test]
    fn covers_detects_missing_lamp() {
        let pattern = Pattern::new().with("top", LightState::SteadyOn);
        assert!(!pattern.covers(&names()));

        let full = pattern.with("bottom", LightState::Off);
        assert!(full.covers(&names()));
    }

    #[test]
    fn pattern_set_orders_entries_by_lamp_order() {
        let mut set = PatternSet::new(names());
        let pattern: Pattern = [("bottom", LightState::SteadyOn), ("top", LightState::Off)]
            .into_iter()
            .collect();
        set.insert(Lamp::Lit, &pattern);

        let stored = set.pattern_for(Lamp::Lit).unwrap();
        let order: Vec<&str> = stored.iter().map(|(name, _)| name).collect();
        assert_eq!(order, vec!["top", "bottom"]);
    }

    #[test]
    fn pattern_for_unknown_state_fails() {
        let mut set = PatternSet::new(names());
        set.insert(
            Lamp::Dark,
            &Pattern::new()
                .with("top", LightState::Off)
                .with("bottom", LightState::Off),
        );

        let err = set.pattern_for(Lamp::Blinking).unwrap_err();
        assert_eq!(
            err,
            ControllerError::UnknownState {
                state: "Blinking".to_string()
            }
        );
        assert_eq!(set.vocabulary(), &[Lamp::Dark]);
    }

    #[test]
    fn matches_compares_live_lamps() {
        let mut top = Light::new("top");
        top.set_state(LightState::SteadyOn);
        let lights = vec![top, Light::new("bottom")];

        let pattern = Pattern::from_lights(&lights);
        assert!(pattern.matches(&lights));
        assert_eq!(pattern.to_string(), "top: On, bottom: Off");
    }
}
