//! Transition plans: the resolved, step-by-step shape of one move.

use crate::core::State;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// One step of a transition: the state shown and how long it is held.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Step<S: State> {
    pub state: S,
    pub dwell: Duration,
}

/// A resolved move, ready to be executed.
///
/// `steps` is empty when the resolved target is the current state.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TransitionPlan<S: State> {
    pub from: S,
    pub requested: S,
    pub target: S,
    pub steps: Vec<Step<S>>,
}

impl<S: State> TransitionPlan<S> {
    pub fn is_noop(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn was_redirected(&self) -> bool {
        self.requested != self.target
    }

    /// Sum of every step's dwell.
    pub fn total_dwell(&self) -> Duration {
        self.steps.iter().map(|step| step.dwell).sum()
    }
}

/// What a completed `apply` did.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum TransitionOutcome<S: State> {
    /// Already resting in the resolved target; nothing changed.
    Unchanged(S),

    /// Lamps were reconfigured and the machine rests in `to`.
    Settled {
        from: S,
        to: S,
        requested: S,
        steps: Vec<S>,
    },
}

impl<S: State> TransitionOutcome<S> {
    /// The state the machine rests in afterwards.
    pub fn state(&self) -> S {
        match self {
            Self::Unchanged(state) => *state,
            Self::Settled { to, .. } => *to,
        }
    }
}

/// Approach sequences and dwell times per state.
///
/// An approach is the ordered list of transient states shown before a
/// target, e.g. amber before red.
#[derive(Clone, Debug)]
pub struct Sequencing<S: State> {
    approaches: HashMap<S, Vec<S>>,
    dwell: HashMap<S, Duration>,
    default_dwell: Duration,
}

impl<S: State> Sequencing<S> {
    pub fn new(default_dwell: Duration) -> Self {
        Self {
            approaches: HashMap::new(),
            dwell: HashMap::new(),
            default_dwell,
        }
    }

    pub fn approach(mut self, target: S, via: Vec<S>) -> Self {
        self.approaches.insert(target, via);
        self
    }

    pub fn dwell(mut self, state: S, dwell: Duration) -> Self {
        self.dwell.insert(state, dwell);
        self
    }

    pub(crate) fn set_default_dwell(&mut self, dwell: Duration) {
        self.default_dwell = dwell;
    }

    pub fn default_dwell(&self) -> Duration {
        self.default_dwell
    }

    pub fn dwell_for(&self, state: S) -> Duration {
        self.dwell.get(&state).copied().unwrap_or(self.default_dwell)
    }

    pub fn approach_to(&self, target: S) -> &[S] {
        self.approaches.get(&target).map(Vec::as_slice).unwrap_or(&[])
    }

    pub(crate) fn approaches(&self) -> impl Iterator<Item = (S, &[S])> + '_ {
        self.approaches
            .iter()
            .map(|(target, via)| (*target, via.as_slice()))
    }

    /// Steps that lead to `target`: its approach, then the target itself.
    pub fn steps_to(&self, target: S) -> Vec<Step<S>> {
        self.approach_to(target)
            .iter()
            .chain(std::iter::once(&target))
            .map(|state| Step {
                state: *state,
                dwell: self.dwell_for(*state),
            })
            .collect()
    }
}
