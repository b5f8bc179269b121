//! Transition Table.
//!
//! Declarative policy deciding, for each `(from, to)` pair, whether a move
//! may proceed, must be redirected to a safer target, or is rejected.
//! Resolution is pure and happens before any lamp changes.

use super::state::State;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How pairs without an explicit rule are treated.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultPolicy {
    /// Unlisted moves proceed directly.
    #[default]
    Permit,
    /// Unlisted moves are rejected.
    Deny,
}

/// A rule for one directed edge.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct TransitionRule<S: State> {
    pub allowed: bool,
    pub redirect_to: Option<S>,
}

impl<S: State> TransitionRule<S> {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            redirect_to: None,
        }
    }

    pub fn reject() -> Self {
        Self {
            allowed: false,
            redirect_to: None,
        }
    }

    pub fn redirect(to: S) -> Self {
        Self {
            allowed: true,
            redirect_to: Some(to),
        }
    }
}

/// Outcome of resolving one requested move.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TransitionDecision<S: State> {
    Proceed(S),
    Redirect(S),
    Reject,
}

/// Static move policy, keyed by `(from, to)`.
///
/// # Example
///
/// ```rust
/// use signalbox::core::{DefaultPolicy, TransitionDecision, TransitionTable};
/// use signalbox::traffic::TrafficSignal;
///
/// let table = TransitionTable::new(DefaultPolicy::Permit)
///     .redirect(TrafficSignal::Open, TrafficSignal::Off, TrafficSignal::Closed)
///     .reject(TrafficSignal::Off, TrafficSignal::Open);
///
/// assert_eq!(
///     table.resolve(TrafficSignal::Open, TrafficSignal::Off),
///     TransitionDecision::Redirect(TrafficSignal::Closed)
/// );
/// assert_eq!(
///     table.resolve(TrafficSignal::Off, TrafficSignal::Open),
///     TransitionDecision::Reject
/// );
/// assert_eq!(
///     table.resolve(TrafficSignal::Closed, TrafficSignal::Open),
///     TransitionDecision::Proceed(TrafficSignal::Open)
/// );
/// ```
#[derive(Clone, Debug)]
pub struct TransitionTable<S: State> {
    rules: HashMap<(S, S), TransitionRule<S>>,
    default_policy: DefaultPolicy,
}

impl<S: State> Default for TransitionTable<S> {
    fn default() -> Self {
        Self::new(DefaultPolicy::default())
    }
}

impl<S: State> TransitionTable<S> {
    pub fn new(default_policy: DefaultPolicy) -> Self {
        Self {
            rules: HashMap::new(),
            default_policy,
        }
    }

    /// Set or replace the rule for one edge.
    pub fn rule(mut self, from: S, to: S, rule: TransitionRule<S>) -> Self {
        self.rules.insert((from, to), rule);
        self
    }

    pub fn allow(self, from: S, to: S) -> Self {
        self.rule(from, to, TransitionRule::allow())
    }

    pub fn reject(self, from: S, to: S) -> Self {
        self.rule(from, to, TransitionRule::reject())
    }

    pub fn redirect(self, from: S, to: S, instead: S) -> Self {
        self.rule(from, to, TransitionRule::redirect(instead))
    }

    pub fn default_policy(&self) -> DefaultPolicy {
        self.default_policy
    }

    pub(crate) fn set_default_policy(&mut self, policy: DefaultPolicy) {
        self.default_policy = policy;
    }

    /// Explicit rules, in no particular order.
    pub fn rules(&self) -> impl Iterator<Item = ((S, S), TransitionRule<S>)> + '_ {
        self.rules.iter().map(|(edge, rule)| (*edge, *rule))
    }

    /// Decide what happens to a requested move (pure).
    pub fn resolve(&self, from: S, to: S) -> TransitionDecision<S> {
        match self.rules.get(&(from, to)) {
            Some(rule) if !rule.allowed => TransitionDecision::Reject,
            Some(TransitionRule {
                redirect_to: Some(other),
                ..
            }) => TransitionDecision::Redirect(*other),
            Some(_) => TransitionDecision::Proceed(to),
            None => match self.default_policy {
                DefaultPolicy::Permit => TransitionDecision::Proceed(to),
                DefaultPolicy::Deny => TransitionDecision::Reject,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state_enum;

    state_enum! {
        enum Gate {
            Shut,
            Ajar,
            Wide,
        }
    }

    #[test]
    fn unlisted_pairs_follow_permissive_default() {
        let table = TransitionTable::<Gate>::new(DefaultPolicy::Permit);
        assert_eq!(
            table.resolve(Gate::Shut, Gate::Wide),
            TransitionDecision::Proceed(Gate::Wide)
        );
    }

    #[test]
    fn unlisted_pairs_follow_strict_default() {
        let table = TransitionTable::new(DefaultPolicy::Deny).allow(Gate::Shut, Gate::Ajar);

        assert_eq!(table.resolve(Gate::Shut, Gate::Wide), TransitionDecision::Reject);
        assert_eq!(
            table.resolve(Gate::Shut, Gate::Ajar),
            TransitionDecision::Proceed(Gate::Ajar)
        );
    }

    #[test]
    fn explicit_rules_override_default() {
        let table = TransitionTable::new(DefaultPolicy::Permit)
            .reject(Gate::Shut, Gate::Wide)
            .redirect(Gate::Wide, Gate::Shut, Gate::Ajar);

        assert_eq!(table.resolve(Gate::Shut, Gate::Wide), TransitionDecision::Reject);
        assert_eq!(
            table.resolve(Gate::Wide, Gate::Shut),
            TransitionDecision::Redirect(Gate::Ajar)
        );
    }

    #[test]
    fn later_rule_replaces_earlier() {
        let table = TransitionTable::new(DefaultPolicy::Permit)
            .reject(Gate::Ajar, Gate::Wide)
            .allow(Gate::Ajar, Gate::Wide);

        assert_eq!(
            table.resolve(Gate::Ajar, Gate::Wide),
            TransitionDecision::Proceed(Gate::Wide)
        );
        assert_eq!(table.rules().count(), 1);
    }

    #[test]
    fn disallowed_rule_with_redirect_still_rejects() {
        let table = TransitionTable::new(DefaultPolicy::Permit).rule(
            Gate::Shut,
            Gate::Wide,
            TransitionRule {
                allowed: false,
                redirect_to: Some(Gate::Ajar),
            },
        );

        assert_eq!(table.resolve(Gate::Shut, Gate::Wide), TransitionDecision::Reject);
    }
}
