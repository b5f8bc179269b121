//! Builder for constructing signal controllers.

use super::error::BuildError;
use super::validate::validate_config;
use crate::config::ControllerOptions;
use crate::controller::Controller;
use crate::core::{LightState, Pattern, PatternSet, State, TransitionTable};
use crate::machine::{Sequencing, SignalMachine};
use crate::observer::{ErrorSink, TracingSink};
use std::time::Duration;
use stillwater::validation::Validation;

/// Fluent builder for a [`Controller`].
///
/// Collects lamps, one pattern per state, the transition table and the
/// approach sequences, validates them all at once, and starts the
/// controller. The first registered pattern's state is where the
/// controller starts.
///
/// # Example
///
/// ```rust
/// use signalbox::builder::ControllerBuilder;
/// use signalbox::core::LightState;
/// use signalbox::traffic::TrafficSignal;
///
/// let controller = ControllerBuilder::new()
///     .lights(["lamp"])
///     .pattern(TrafficSignal::Off, [("lamp", LightState::Off)])
///     .pattern(TrafficSignal::Warning, [("lamp", LightState::Flashing)])
///     .build_stepped()
///     .unwrap();
///
/// controller.move_to(TrafficSignal::Warning).unwrap();
/// controller.run_pending();
/// assert_eq!(controller.state(), TrafficSignal::Warning);
/// ```
pub struct ControllerBuilder<S: State> {
    pub(super) lights: Vec<String>,
    pub(super) patterns: Vec<(S, Pattern)>,
    pub(super) table: TransitionTable<S>,
    pub(super) sequencing: Sequencing<S>,
    pub(super) initial: Option<S>,
    options: ControllerOptions,
    sink: Option<Box<dyn ErrorSink>>,
}

impl<S: State> ControllerBuilder<S> {
    pub fn new() -> Self {
        Self {
            lights: Vec::new(),
            patterns: Vec::new(),
            table: TransitionTable::default(),
            sequencing: Sequencing::new(Duration::ZERO),
            initial: None,
            options: ControllerOptions::default(),
            sink: None,
        }
    }

    /// Add lamps, in display order.
    pub fn lights<I, N>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        self.lights.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn light(mut self, name: impl Into<String>) -> Self {
        self.lights.push(name.into());
        self
    }

    /// Register the pattern shown in `state`. It must set every lamp.
    pub fn pattern<I, N>(mut self, state: S, lamps: I) -> Self
    where
        I: IntoIterator<Item = (N, LightState)>,
        N: Into<String>,
    {
        self.patterns.push((state, lamps.into_iter().collect()));
        self
    }

    /// Replace the transition table.
    pub fn table(mut self, table: TransitionTable<S>) -> Self {
        self.table = table;
        self
    }

    pub fn allow(mut self, from: S, to: S) -> Self {
        self.table = self.table.allow(from, to);
        self
    }

    pub fn reject(mut self, from: S, to: S) -> Self {
        self.table = self.table.reject(from, to);
        self
    }

    /// Send requests for `from -> to` to `instead`.
    pub fn redirect(mut self, from: S, to: S, instead: S) -> Self {
        self.table = self.table.redirect(from, to, instead);
        self
    }

    /// Show the transient states `via` before settling in `target`.
    pub fn approach(mut self, target: S, via: impl IntoIterator<Item = S>) -> Self {
        self.sequencing = self.sequencing.approach(target, via.into_iter().collect());
        self
    }

    pub fn dwell(mut self, state: S, dwell: Duration) -> Self {
        self.sequencing = self.sequencing.dwell(state, dwell);
        self
    }

    pub fn default_dwell(mut self, dwell: Duration) -> Self {
        self.sequencing.set_default_dwell(dwell);
        self
    }

    /// Queue a move to `state` as soon as the controller starts.
    pub fn initial(mut self, state: S) -> Self {
        self.initial = Some(state);
        self
    }

    pub fn options(mut self, options: ControllerOptions) -> Self {
        self.options = options;
        self
    }

    /// Skip every dwell. Steps still run and notify in order.
    pub fn instant(mut self) -> Self {
        self.options.time_scale = 0.0;
        self
    }

    /// Where observer failures and dropped requests are reported.
    /// Defaults to [`TracingSink`].
    pub fn error_sink(mut self, sink: impl ErrorSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    pub(crate) fn has_pattern(&self, state: S) -> bool {
        self.patterns.iter().any(|(known, _)| *known == state)
    }

    /// Check the configuration, reporting every violation found.
    pub fn validate(&self) -> Result<(), BuildError> {
        match validate_config(self) {
            Validation::Success(_) => Ok(()),
            Validation::Failure(errors) => Err(BuildError::Invalid {
                violations: errors.iter().cloned().collect(),
            }),
        }
    }

    /// Build just the state machine, without a scheduler.
    pub fn build_machine(self) -> Result<SignalMachine<S>, BuildError> {
        self.into_parts().map(|parts| parts.machine)
    }

    /// Build a controller driven by [`Controller::tick`] on the caller's
    /// thread.
    pub fn build_stepped(self) -> Result<Controller<S>, BuildError> {
        let parts = self.into_parts()?;
        let controller = Controller::stepped(parts.machine, parts.sink, parts.options);
        if let Some(initial) = parts.initial {
            controller.move_to(initial)?;
        }
        Ok(controller)
    }

    /// Build a controller with its own transition worker thread.
    pub fn spawn(self) -> Result<Controller<S>, BuildError> {
        let parts = self.into_parts()?;
        let controller = Controller::spawn(parts.machine, parts.sink, parts.options)?;
        if let Some(initial) = parts.initial {
            controller.move_to(initial)?;
        }
        Ok(controller)
    }

    fn into_parts(mut self) -> Result<Parts<S>, BuildError> {
        self.validate()?;

        if let Some(policy) = self.options.default_policy {
            self.table.set_default_policy(policy);
        }
        if let Some(dwell) = self.options.default_dwell() {
            self.sequencing.set_default_dwell(dwell);
        }

        let mut patterns = PatternSet::new(self.lights);
        for (state, pattern) in &self.patterns {
            patterns.insert(*state, pattern);
        }
        // Validation guarantees at least one pattern.
        let start = self
            .patterns
            .first()
            .map(|(state, _)| *state)
            .ok_or_else(|| BuildError::Invalid {
                violations: vec![super::ConfigViolation::NoPatterns],
            })?;

        tracing::debug!(
            start = start.name(),
            states = patterns.vocabulary().len(),
            "building signal controller"
        );
        let machine = SignalMachine::new(start, patterns, self.table, self.sequencing)?;

        Ok(Parts {
            machine,
            sink: self.sink.unwrap_or_else(|| Box::new(TracingSink)),
            options: self.options,
            initial: self.initial,
        })
    }
}

impl<S: State> Default for ControllerBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}

struct Parts<S: State> {
    machine: SignalMachine<S>,
    sink: Box<dyn ErrorSink>,
    options: ControllerOptions,
    initial: Option<S>,
}
