//! Observer Registry: ordered callbacks with isolated failures.

use super::sink::{panic_message, report_isolated, ErrorSink};
use super::Notification;
use crate::controller::ControllerHandle;
use crate::core::State;
use crate::error::{ControllerError, ObserverError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, PoisonError, RwLock};
use uuid::Uuid;

/// A listener invoked after every applied transition step.
///
/// Closures with the matching signature implement this trait. The handle
/// lets an observer query the controller or request a corrective move;
/// such requests are queued behind the running transition.
pub trait Observer<S: State>: Send + Sync {
    fn notify(
        &self,
        controller: &ControllerHandle<S>,
        notification: &Notification<S>,
    ) -> Result<(), ObserverError>;
}

impl<S, F> Observer<S> for F
where
    S: State,
    F: Fn(&ControllerHandle<S>, &Notification<S>) -> Result<(), ObserverError> + Send + Sync,
{
    fn notify(
        &self,
        controller: &ControllerHandle<S>,
        notification: &Notification<S>,
    ) -> Result<(), ObserverError> {
        self(controller, notification)
    }
}

/// Identifies a registered observer.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct ObserverId(Uuid);

impl ObserverId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

type Entry<S> = (ObserverId, Arc<dyn Observer<S>>);

/// Registered observers in registration order.
///
/// Notification works on a snapshot of the list, so registering or
/// removing an observer never waits for a running notification. An
/// observer added mid-notification first hears about the next step.
pub struct ObserverRegistry<S: State> {
    entries: RwLock<Vec<Entry<S>>>,
}

impl<S: State> Default for ObserverRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> ObserverRegistry<S> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    pub fn add(&self, observer: impl Observer<S> + 'static) -> ObserverId {
        let id = ObserverId::new();
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(observer)));
        id
    }

    /// Register a closure; its signature is inferred from this bound.
    pub fn add_fn<F>(&self, callback: F) -> ObserverId
    where
        F: Fn(&ControllerHandle<S>, &Notification<S>) -> Result<(), ObserverError>
            + Send
            + Sync
            + 'static,
    {
        self.add(callback)
    }

    pub fn remove(&self, id: ObserverId) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|(entry, _)| *entry != id);
        entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn snapshot(&self) -> Vec<Entry<S>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Invoke every observer in order; returns how many failed.
    ///
    /// A failing or panicking observer is reported to `sink` and the
    /// remaining observers still run.
    pub fn notify_all(
        &self,
        controller: &ControllerHandle<S>,
        notification: &Notification<S>,
        sink: &dyn ErrorSink,
    ) -> usize {
        let mut failures = 0;
        for (id, observer) in self.snapshot() {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                observer.notify(controller, notification)
            }));
            let failure = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(err)) => err,
                Err(payload) => ObserverError::Panicked(panic_message(payload.as_ref())),
            };
            failures += 1;
            tracing::debug!(observer = %id, error = %failure, "observer failed");
            report_isolated(
                sink,
                Some(notification.request),
                &ControllerError::Observer(failure),
            );
        }
        failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LightState, RequestId};
    use crate::observer::StepPhase;
    use crate::traffic::{self, TrafficSignal};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn notification() -> Notification<TrafficSignal> {
        Notification {
            request: RequestId::new(),
            state: TrafficSignal::Warning,
            requested: TrafficSignal::Warning,
            pattern: crate::core::Pattern::new().with("amber", LightState::Flashing),
            phase: StepPhase::Settled,
        }
    }

    fn handle() -> crate::controller::Controller<TrafficSignal> {
        traffic::traffic_light().build_stepped().unwrap()
    }

    #[test]
    fn observers_run_in_registration_order() {
        let registry = ObserverRegistry::<TrafficSignal>::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for label in ["first", "second", "third"] {
            let order = Arc::clone(&order);
            registry.add_fn(move |_, _| {
                order.lock().unwrap().push(label);
                Ok(())
            });
        }

        let controller = handle();
        let sink = |_: Option<RequestId>, _: &ControllerError| {};
        let failures = registry.notify_all(&controller, &notification(), &sink);

        assert_eq!(failures, 0);
        assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn failing_and_panicking_observers_are_isolated() {
        let registry = ObserverRegistry::<TrafficSignal>::new();
        let reached = Arc::new(AtomicUsize::new(0));

        registry.add_fn(|_, _| Err(ObserverError::failed("display offline")));
        registry.add_fn(|_, _| panic!("lamp driver crashed"));
        let counter = Arc::clone(&reached);
        registry.add_fn(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let reported = Arc::new(Mutex::new(Vec::new()));
        let sink_reports = Arc::clone(&reported);
        let sink = move |_: Option<RequestId>, err: &ControllerError| {
            sink_reports.lock().unwrap().push(err.clone());
        };

        let controller = handle();
        let failures = registry.notify_all(&controller, &notification(), &sink);

        assert_eq!(failures, 2);
        assert_eq!(reached.load(Ordering::SeqCst), 1);
        let reported = reported.lock().unwrap();
        assert_eq!(
            reported[0],
            ControllerError::Observer(ObserverError::Failed("display offline".to_string()))
        );
        assert_eq!(
            reported[1],
            ControllerError::Observer(ObserverError::Panicked("lamp driver crashed".to_string()))
        );
    }

    #[test]
    fn remove_unregisters_observer() {
        let registry = ObserverRegistry::<TrafficSignal>::new();
        let id = registry.add_fn(|_, _| Ok(()));

        assert_eq!(registry.len(), 1);
        assert!(registry.remove(id));
        assert!(!registry.remove(id));
        assert!(registry.is_empty());
    }
}
