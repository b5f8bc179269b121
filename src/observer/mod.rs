//! Observer Registry and error reporting.
//!
//! Observers are told about every applied step of a transition, in
//! registration order, on the transition worker. Their failures are
//! isolated and routed to an [`ErrorSink`].

mod registry;
mod sink;

pub use registry::{Observer, ObserverId, ObserverRegistry};
pub use sink::{ErrorSink, TracingSink};

pub(crate) use sink::report_isolated;

use crate::core::{Pattern, RequestId, State};
use serde::{Deserialize, Serialize};

/// Whether a notified step ends its transition.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum StepPhase {
    /// An approach step; more steps follow.
    Intermediate,
    /// The final step; the controller rests in `state`.
    Settled,
}

/// Snapshot handed to observers after a step is applied.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Notification<S: State> {
    pub request: RequestId,
    /// State now shown
    pub state: S,
    /// State the request originally asked for
    pub requested: S,
    /// Lamp configuration now shown
    pub pattern: Pattern,
    pub phase: StepPhase,
}

impl<S: State> Notification<S> {
    pub fn is_settled(&self) -> bool {
        self.phase == StepPhase::Settled
    }
}
