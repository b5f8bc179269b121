//! State Machine Core: validates and executes moves against the table.

use super::plan::{Sequencing, TransitionOutcome, TransitionPlan};
use crate::core::{Light, Pattern, PatternSet, State, TransitionDecision, TransitionTable};
use crate::error::{ControllerError, Result};

/// Holds the current signal state and the lamps it owns.
///
/// The machine knows nothing about threads or time: callers (the
/// controller's transition worker) decide when each step runs and how
/// long it is held. It is the only place lamp states are changed.
#[derive(Clone, Debug)]
pub struct SignalMachine<S: State> {
    current: S,
    lights: Vec<Light>,
    patterns: PatternSet<S>,
    table: TransitionTable<S>,
    sequencing: Sequencing<S>,
}

impl<S: State> SignalMachine<S> {
    /// Create a machine resting in `initial`, with lamps showing its pattern.
    pub(crate) fn new(
        initial: S,
        patterns: PatternSet<S>,
        table: TransitionTable<S>,
        sequencing: Sequencing<S>,
    ) -> Result<Self> {
        let lights = patterns
            .light_names()
            .iter()
            .map(|name| Light::new(name.as_str()))
            .collect();
        let mut machine = Self {
            current: initial,
            lights,
            patterns,
            table,
            sequencing,
        };
        machine.apply_step(initial)?;
        Ok(machine)
    }

    pub fn current_state(&self) -> S {
        self.current
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    /// Pattern the lamps currently show.
    pub fn pattern(&self) -> Pattern {
        Pattern::from_lights(&self.lights)
    }

    pub fn patterns(&self) -> &PatternSet<S> {
        &self.patterns
    }

    pub fn table(&self) -> &TransitionTable<S> {
        &self.table
    }

    pub fn sequencing(&self) -> &Sequencing<S> {
        &self.sequencing
    }

    /// Check that a state may be requested as a move target.
    pub fn check_target(&self, target: S) -> Result<()> {
        if !self.patterns.contains(target) {
            return Err(ControllerError::unknown_state(&target));
        }
        if target.is_transient() {
            return Err(ControllerError::TransientTarget {
                state: target.name().to_string(),
            });
        }
        Ok(())
    }

    /// Resolve a requested move through the table, following at most one
    /// redirect.
    pub fn resolve_target(&self, from: S, target: S) -> Result<S> {
        self.check_target(target)?;
        match self.table.resolve(from, target) {
            TransitionDecision::Proceed(to) => Ok(to),
            TransitionDecision::Reject => Err(ControllerError::illegal(&from, &target)),
            TransitionDecision::Redirect(other) => {
                self.check_target(other)?;
                match self.table.resolve(from, other) {
                    TransitionDecision::Proceed(to) => Ok(to),
                    TransitionDecision::Reject => Err(ControllerError::illegal(&from, &other)),
                    TransitionDecision::Redirect(_) => Err(ControllerError::RedirectCycle {
                        from: from.name().to_string(),
                        to: target.name().to_string(),
                    }),
                }
            }
        }
    }

    /// Plan a move from an arbitrary origin without touching any lamp.
    pub fn plan_from(&self, from: S, target: S) -> Result<TransitionPlan<S>> {
        let resolved = self.resolve_target(from, target)?;
        let steps = if resolved == from {
            Vec::new()
        } else {
            self.sequencing.steps_to(resolved)
        };
        Ok(TransitionPlan {
            from,
            requested: target,
            target: resolved,
            steps,
        })
    }

    /// Plan a move from the current state.
    pub fn plan(&self, target: S) -> Result<TransitionPlan<S>> {
        self.plan_from(self.current, target)
    }

    /// Show one state: set every lamp from its pattern and make it current.
    pub(crate) fn apply_step(&mut self, state: S) -> Result<()> {
        let pattern = self.patterns.pattern_for(state)?;
        for light in &mut self.lights {
            if let Some(lamp) = pattern.state_of(light.name()) {
                light.set_state(lamp);
            }
        }
        self.current = state;
        Ok(())
    }

    /// Resolve and run a whole move at once.
    ///
    /// A rejected or unresolvable move leaves the machine untouched.
    pub fn apply(&mut self, target: S) -> Result<TransitionOutcome<S>> {
        let plan = self.plan(target)?;
        if plan.is_noop() {
            return Ok(TransitionOutcome::Unchanged(self.current));
        }
        for step in &plan.steps {
            self.apply_step(step.state)?;
        }
        Ok(TransitionOutcome::Settled {
            from: plan.from,
            to: plan.target,
            requested: plan.requested,
            steps: plan.steps.iter().map(|step| step.state).collect(),
        })
    }
}
