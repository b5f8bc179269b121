//! Error sinks: where failures without a synchronous caller are reported.

use crate::core::RequestId;
use crate::error::ControllerError;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// Receives errors the controller cannot return to a caller.
///
/// That covers failing observers and queued requests that no longer
/// resolve by the time they run. Closures taking
/// `(Option<RequestId>, &ControllerError)` implement this trait.
pub trait ErrorSink: Send + Sync {
    fn report(&self, request: Option<RequestId>, error: &ControllerError);
}

impl<F> ErrorSink for F
where
    F: Fn(Option<RequestId>, &ControllerError) + Send + Sync,
{
    fn report(&self, request: Option<RequestId>, error: &ControllerError) {
        self(request, error)
    }
}

/// Default sink: logs through `tracing`.
///
/// Observer failures are warnings; anything else means a queued request
/// was dropped and is logged as an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ErrorSink for TracingSink {
    fn report(&self, request: Option<RequestId>, error: &ControllerError) {
        let request = request.map(|id| id.to_string()).unwrap_or_default();
        match error {
            ControllerError::Observer(_) => {
                tracing::warn!(request = %request, "{error}")
            }
            _ => tracing::error!(request = %request, "{error}"),
        }
    }
}

/// Report through `sink`, containing a panic inside the sink itself.
///
/// A panicking sink is logged and otherwise ignored so the caller can
/// go on releasing the controller.
pub(crate) fn report_isolated(
    sink: &dyn ErrorSink,
    request: Option<RequestId>,
    error: &ControllerError,
) {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| sink.report(request, error)));
    if let Err(payload) = outcome {
        let request = request.map(|id| id.to_string()).unwrap_or_default();
        tracing::error!(
            request = %request,
            panic = %panic_message(payload.as_ref()),
            "error sink panicked while reporting: {error}"
        );
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn closure_sink_receives_reports() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = Arc::clone(&seen);
        let sink = move |request: Option<RequestId>, error: &ControllerError| {
            recorder.lock().unwrap().push((request, error.clone()));
        };

        let error = ControllerError::UnknownState {
            state: "Amber".to_string(),
        };
        sink.report(None, &error);

        assert_eq!(*seen.lock().unwrap(), vec![(None, error)]);
    }

    #[test]
    fn tracing_sink_accepts_every_error_kind() {
        TracingSink.report(
            Some(RequestId::new()),
            &ControllerError::Observer(crate::error::ObserverError::failed("late")),
        );
        TracingSink.report(None, &ControllerError::WaitFromWorker);
    }

    #[test]
    fn panicking_sink_is_contained() {
        let sink = |_: Option<RequestId>, _: &ControllerError| panic!("sink down");
        report_isolated(&sink, None, &ControllerError::WaitFromWorker);
    }

    #[test]
    fn panic_message_reads_string_payloads() {
        let owned = panic::catch_unwind(|| panic!("{}", String::from("owned"))).unwrap_err();
        assert_eq!(panic_message(owned.as_ref()), "owned");

        let other = panic::catch_unwind(|| panic::panic_any(7u8)).unwrap_err();
        assert_eq!(panic_message(other.as_ref()), "non-string panic payload");
    }
}
