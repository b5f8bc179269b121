//! Settled-transition history.
//!
//! Keeps an ordered, bounded record of the moves a controller has
//! completed.

use super::request::RequestId;
use super::state::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// Records kept when no explicit limit is configured.
pub const DEFAULT_HISTORY_LIMIT: usize = 256;

/// Record of one settled transition.
///
/// `requested` is what the caller asked for; `to` is where the controller
/// ended up, which differs when the table redirected the move.
///
/// # Example
///
/// ```rust
/// use signalbox::core::TransitionRecord;
/// use signalbox::traffic::TrafficSignal;
/// use chrono::Utc;
///
/// let record = TransitionRecord {
///     request: None,
///     from: TrafficSignal::Open,
///     to: TrafficSignal::Closed,
///     requested: TrafficSignal::Off,
///     steps: vec![TrafficSignal::Closing, TrafficSignal::Closed],
///     timestamp: Utc::now(),
/// };
///
/// assert!(record.was_redirected());
/// ```
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct TransitionRecord<S: State> {
    /// The request that produced this transition, if it came from the queue
    pub request: Option<RequestId>,
    /// The state being transitioned from
    pub from: S,
    /// The state the controller settled in
    pub to: S,
    /// The state originally requested
    pub requested: S,
    /// Every state shown along the way, ending with `to`
    pub steps: Vec<S>,
    /// When the transition settled
    pub timestamp: DateTime<Utc>,
}

impl<S: State> TransitionRecord<S> {
    pub fn was_redirected(&self) -> bool {
        self.requested != self.to
    }
}

/// Ordered history of settled transitions, oldest first.
///
/// Holds at most `limit` records; recording past the limit drops the
/// oldest entry.
///
/// # Example
///
/// ```rust
/// use signalbox::core::{TransitionHistory, TransitionRecord};
/// use signalbox::traffic::TrafficSignal;
/// use chrono::Utc;
///
/// let mut history = TransitionHistory::with_limit(8);
/// history.record(TransitionRecord {
///     request: None,
///     from: TrafficSignal::Off,
///     to: TrafficSignal::Warning,
///     requested: TrafficSignal::Warning,
///     steps: vec![TrafficSignal::Warning],
///     timestamp: Utc::now(),
/// });
///
/// assert_eq!(history.path(), vec![TrafficSignal::Off, TrafficSignal::Warning]);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct TransitionHistory<S: State> {
    records: VecDeque<TransitionRecord<S>>,
    limit: usize,
}

impl<S: State> Default for TransitionHistory<S> {
    fn default() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }
}

impl<S: State> TransitionHistory<S> {
    /// Create an empty history keeping at most `limit` records.
    ///
    /// A limit of zero disables recording.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            records: VecDeque::new(),
            limit,
        }
    }

    pub fn record(&mut self, record: TransitionRecord<S>) {
        if self.limit == 0 {
            return;
        }
        while self.records.len() >= self.limit {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    /// Settled states in order: the first origin, then each destination.
    pub fn path(&self) -> Vec<S> {
        let mut path = Vec::with_capacity(self.records.len() + 1);
        if let Some(first) = self.records.front() {
            path.push(first.from);
        }
        path.extend(self.records.iter().map(|record| record.to));
        path
    }

    /// Time between the oldest and newest retained record.
    pub fn duration(&self) -> Option<Duration> {
        let (first, last) = (self.records.front()?, self.records.back()?);
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }

    pub fn records(&self) -> impl Iterator<Item = &TransitionRecord<S>> {
        self.records.iter()
    }

    pub fn last(&self) -> Option<&TransitionRecord<S>> {
        self.records.back()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}
