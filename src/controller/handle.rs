//! Cloneable command and query surface of a controller.

use super::shared::{ExecutionMode, Shared};
use crate::core::{Light, Pattern, RequestId, State, TransitionHistory};
use crate::error::{ObserverError, Result};
use crate::observer::{Notification, Observer, ObserverId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Consistent view of a controller at one instant.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Snapshot<S: State> {
    pub state: S,
    pub lights: Vec<Light>,
    pub in_transition: bool,
    pub pending: usize,
}

impl<S: State> Snapshot<S> {
    pub fn pattern(&self) -> Pattern {
        self.lights
            .iter()
            .map(|light| (light.name(), light.state()))
            .collect()
    }
}

/// Handle to a running controller.
///
/// Handles are cheap to clone and are what observers receive. Every
/// command is non-blocking: `move_to` validates and queues, the
/// transition worker does the rest.
pub struct ControllerHandle<S: State> {
    pub(crate) shared: Arc<Shared<S>>,
}

impl<S: State> Clone for ControllerHandle<S> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<S: State> fmt::Debug for ControllerHandle<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.lock();
        f.debug_struct("ControllerHandle")
            .field("state", &state.machine().current_state())
            .field("pending", &state.pending())
            .field("in_transition", &state.is_busy())
            .finish()
    }
}

impl<S: State> ControllerHandle<S> {
    pub(crate) fn new(shared: Arc<Shared<S>>) -> Self {
        Self { shared }
    }

    /// Request a move to `target`.
    ///
    /// The move is resolved against the state the controller will be in
    /// once everything already queued has run; unknown, transient and
    /// rejected targets fail here and nothing is queued. Called from an
    /// observer, the request simply queues behind the running transition.
    pub fn move_to(&self, target: S) -> Result<RequestId> {
        self.shared.enqueue(target)
    }

    /// Withdraw a queued request that has not started yet.
    pub fn cancel(&self, request: RequestId) -> bool {
        self.shared.cancel(request)
    }

    /// True while a transition runs or requests are queued. Never blocks.
    pub fn is_in_transition(&self) -> bool {
        self.shared.is_busy()
    }

    pub fn state(&self) -> S {
        self.shared.lock().machine().current_state()
    }

    pub fn lights(&self) -> Vec<Light> {
        self.shared.lock().machine().lights().to_vec()
    }

    pub fn pattern(&self) -> Pattern {
        self.shared.lock().machine().pattern()
    }

    pub fn light_names(&self) -> Vec<String> {
        self.shared.lock().machine().patterns().light_names().to_vec()
    }

    /// Every state the controller has a pattern for, in registration order.
    pub fn vocabulary(&self) -> Vec<S> {
        self.shared.lock().machine().patterns().vocabulary().to_vec()
    }

    pub fn pending(&self) -> usize {
        self.shared.lock().pending()
    }

    pub fn snapshot(&self) -> Snapshot<S> {
        let state = self.shared.lock();
        Snapshot {
            state: state.machine().current_state(),
            lights: state.machine().lights().to_vec(),
            in_transition: state.is_busy(),
            pending: state.pending(),
        }
    }

    pub fn history(&self) -> TransitionHistory<S> {
        self.shared.lock().history().clone()
    }

    /// Register a callback, invoked after every applied step.
    pub fn add_callback<F>(&self, callback: F) -> ObserverId
    where
        F: Fn(&ControllerHandle<S>, &Notification<S>) -> std::result::Result<(), ObserverError>
            + Send
            + Sync
            + 'static,
    {
        self.shared.observers().add_fn(callback)
    }

    pub fn add_observer(&self, observer: impl Observer<S> + 'static) -> ObserverId {
        self.shared.observers().add(observer)
    }

    pub fn remove_callback(&self, id: ObserverId) -> bool {
        self.shared.observers().remove(id)
    }

    pub fn execution_mode(&self) -> ExecutionMode {
        self.shared.mode()
    }

    /// Block until nothing is running or queued.
    ///
    /// On a stepped controller the queue is drained on the calling thread.
    /// Fails with `WaitFromWorker` when called from inside a transition
    /// (for example from an observer), where waiting could never finish,
    /// and with `Stopped` once the controller has been dropped.
    pub fn wait_idle(&self) -> Result<()> {
        self.shared.wait_idle(self, None).map(|_| ())
    }

    /// Like [`wait_idle`](Self::wait_idle) but gives up after `timeout`,
    /// returning `Ok(false)`. `Duration::MAX` waits without a deadline.
    pub fn wait_idle_timeout(&self, timeout: Duration) -> Result<bool> {
        self.shared.wait_idle(self, Some(timeout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ControllerError;
    use crate::traffic::{self, TrafficSignal};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn snapshot_is_consistent_with_queries() {
        let controller = traffic::traffic_light().build_stepped().unwrap();
        let snapshot = controller.snapshot();

        assert_eq!(snapshot.state, controller.state());
        assert_eq!(snapshot.pattern(), controller.pattern());
        assert!(!snapshot.in_transition);
        assert_eq!(snapshot.pending, 0);
    }

    #[test]
    fn handles_share_one_controller() {
        let controller = traffic::traffic_light().build_stepped().unwrap();
        let other = controller.handle();

        other.move_to(TrafficSignal::Warning).unwrap();
        assert_eq!(controller.pending(), 1);
        controller.run_pending();
        assert_eq!(other.state(), TrafficSignal::Warning);
    }

    #[test]
    fn light_names_follow_lamp_order() {
        let controller = traffic::traffic_light().build_stepped().unwrap();
        assert_eq!(controller.light_names(), vec!["red", "amber", "green"]);
        assert_eq!(controller.vocabulary().first(), Some(&TrafficSignal::Off));
    }

    struct WarningCounter(Arc<AtomicUsize>);

    impl Observer<TrafficSignal> for WarningCounter {
        fn notify(
            &self,
            _: &ControllerHandle<TrafficSignal>,
            notification: &Notification<TrafficSignal>,
        ) -> std::result::Result<(), ObserverError> {
            if notification.state == TrafficSignal::Warning {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
            Ok(())
        }
    }

    #[test]
    fn add_observer_registers_trait_objects() {
        let controller = traffic::traffic_light().instant().build_stepped().unwrap();
        let count = Arc::new(AtomicUsize::new(0));
        let id = controller.add_observer(WarningCounter(Arc::clone(&count)));

        controller.warning().unwrap();
        controller.run_pending();
        assert!(controller.remove_callback(id));
        controller.off().unwrap();
        controller.warning().unwrap();
        controller.run_pending();

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unbounded_timeout_waits_until_idle() {
        let controller = traffic::traffic_light().instant().spawn().unwrap();
        controller.warning().unwrap();

        assert_eq!(controller.wait_idle_timeout(Duration::MAX), Ok(true));
        assert_eq!(controller.state(), TrafficSignal::Warning);
    }

    #[test]
    fn waiting_on_a_dropped_controller_reports_stopped() {
        let controller = traffic::traffic_light().instant().build_stepped().unwrap();
        let handle = controller.handle();
        drop(controller);

        assert_eq!(handle.wait_idle(), Err(ControllerError::Stopped));
        assert_eq!(
            handle.wait_idle_timeout(Duration::from_millis(10)),
            Err(ControllerError::Stopped)
        );
    }
}
