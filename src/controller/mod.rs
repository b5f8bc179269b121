//! Transition Scheduler.
//!
//! A [`Controller`] owns one [`SignalMachine`](crate::machine::SignalMachine)
//! and serializes every move request into a FIFO queue drained by a single
//! transition worker. Requests issued while a transition runs (including
//! from observers) wait their turn; a running transition is never
//! interrupted.

mod handle;
mod queue;
mod shared;

pub use handle::{ControllerHandle, Snapshot};
pub use shared::ExecutionMode;

use crate::config::ControllerOptions;
use crate::core::State;
use crate::error::{ControllerError, Result};
use crate::machine::SignalMachine;
use crate::observer::ErrorSink;
use shared::Shared;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Owner of a signal controller.
///
/// Dereferences to [`ControllerHandle`] for commands and queries.
/// Dropping the controller stops its worker: the running transition is
/// finished without further dwell and queued requests are discarded.
pub struct Controller<S: State> {
    handle: ControllerHandle<S>,
    worker: Option<JoinHandle<()>>,
}

impl<S: State> Controller<S> {
    /// Start a controller with a dedicated worker thread.
    pub(crate) fn spawn(
        machine: SignalMachine<S>,
        sink: Box<dyn ErrorSink>,
        options: ControllerOptions,
    ) -> Result<Self> {
        let worker_name = options.worker_name.clone();
        let shared = Arc::new(Shared::new(machine, sink, options, ExecutionMode::Threaded));
        let handle = ControllerHandle::new(shared);
        let worker_handle = handle.clone();
        let worker = thread::Builder::new()
            .name(worker_name)
            .spawn(move || run_worker(worker_handle))
            .map_err(|err| ControllerError::WorkerSpawn(err.to_string()))?;
        Ok(Self {
            handle,
            worker: Some(worker),
        })
    }

    /// Create a controller without a thread; the owner drives it.
    pub(crate) fn stepped(
        machine: SignalMachine<S>,
        sink: Box<dyn ErrorSink>,
        options: ControllerOptions,
    ) -> Self {
        let shared = Arc::new(Shared::new(machine, sink, options, ExecutionMode::Stepped));
        Self {
            handle: ControllerHandle::new(shared),
            worker: None,
        }
    }

    /// A cloneable handle sharing this controller.
    pub fn handle(&self) -> ControllerHandle<S> {
        self.handle.clone()
    }

    /// Run the next queued request to completion on this thread.
    ///
    /// Only stepped controllers can be ticked; returns false on a threaded
    /// controller, when nothing is queued, or when called re-entrantly
    /// from inside a running transition.
    pub fn tick(&self) -> bool {
        if self.execution_mode() != ExecutionMode::Stepped {
            return false;
        }
        let shared = &self.handle.shared;
        match shared.begin_next(false) {
            Some((id, plan)) => {
                shared.run(&self.handle, id, plan);
                true
            }
            None => false,
        }
    }

    /// Tick until the queue is empty; returns how many requests ran.
    pub fn run_pending(&self) -> usize {
        if self.execution_mode() != ExecutionMode::Stepped {
            return 0;
        }
        self.handle.shared.drain(&self.handle)
    }
}

fn run_worker<S: State>(handle: ControllerHandle<S>) {
    tracing::debug!("transition worker started");
    while let Some((id, plan)) = handle.shared.begin_next(true) {
        handle.shared.run(&handle, id, plan);
    }
    tracing::debug!("transition worker stopped");
}

impl<S: State> Deref for Controller<S> {
    type Target = ControllerHandle<S>;

    fn deref(&self) -> &Self::Target {
        &self.handle
    }
}

impl<S: State> fmt::Debug for Controller<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("handle", &self.handle)
            .field("threaded", &self.worker.is_some())
            .finish()
    }
}

impl<S: State> Drop for Controller<S> {
    fn drop(&mut self) {
        self.handle.shared.shutdown();
        if let Some(worker) = self.worker.take() {
            // Dropped from an observer on the worker itself: let it unwind.
            if worker.thread().id() != thread::current().id() && worker.join().is_err() {
                tracing::warn!("transition worker panicked");
            }
        }
    }
}
