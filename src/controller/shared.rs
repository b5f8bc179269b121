//! State shared between a controller's handles and its transition worker.
//!
//! `ControllerState` is only mutated under `Shared::state`, and lamp
//! changes happen only while a request is marked active, so at most one
//! transition runs at a time. Observers and the error sink are always
//! called with the lock released, so they may re-enter the controller.

use super::handle::ControllerHandle;
use super::queue::{PendingRequest, RequestQueue};
use crate::config::ControllerOptions;
use crate::core::{RequestId, State, TransitionHistory, TransitionRecord};
use crate::error::{ControllerError, Result};
use crate::machine::{SignalMachine, TransitionPlan};
use crate::observer::{report_isolated, ErrorSink, Notification, ObserverRegistry, StepPhase};
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

/// How queued requests get executed.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ExecutionMode {
    /// A dedicated worker thread drains the queue.
    Threaded,
    /// The owner drains the queue with `tick` / `run_pending`.
    Stepped,
}

#[derive(Clone, Copy, Debug)]
struct ActiveRequest<S: State> {
    id: RequestId,
    target: S,
}

pub(crate) struct ControllerState<S: State> {
    machine: SignalMachine<S>,
    queue: RequestQueue<S>,
    active: Option<ActiveRequest<S>>,
    /// Thread currently executing `active`.
    runner: Option<ThreadId>,
    /// Where the controller ends up once every accepted request has run.
    projected: S,
    history: TransitionHistory<S>,
    shutdown: bool,
}

impl<S: State> ControllerState<S> {
    pub fn machine(&self) -> &SignalMachine<S> {
        &self.machine
    }

    pub fn history(&self) -> &TransitionHistory<S> {
        &self.history
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_busy(&self) -> bool {
        self.active.is_some() || !self.queue.is_empty()
    }

    fn runs_on_current_thread(&self) -> bool {
        self.runner == Some(thread::current().id())
    }

    /// Fold the queue over the settled (or in-flight) target again.
    ///
    /// Requests that no longer resolve keep the projection where it is;
    /// they fail when dequeued.
    fn recompute_projection(&mut self) {
        let base = self
            .active
            .map(|active| active.target)
            .unwrap_or_else(|| self.machine.current_state());
        let machine = &self.machine;
        self.projected = self.queue.targets().fold(base, |from, target| {
            machine
                .plan_from(from, target)
                .map(|plan| plan.target)
                .unwrap_or(from)
        });
    }
}

pub(crate) struct Shared<S: State> {
    state: Mutex<ControllerState<S>>,
    /// Wakes the worker: new request, or shutdown.
    work: Condvar,
    /// Wakes idle waiters whenever busy-ness may have changed.
    progress: Condvar,
    busy: AtomicBool,
    observers: ObserverRegistry<S>,
    sink: Box<dyn ErrorSink>,
    options: ControllerOptions,
    mode: ExecutionMode,
}

impl<S: State> Shared<S> {
    pub fn new(
        machine: SignalMachine<S>,
        sink: Box<dyn ErrorSink>,
        options: ControllerOptions,
        mode: ExecutionMode,
    ) -> Self {
        let projected = machine.current_state();
        Self {
            state: Mutex::new(ControllerState {
                machine,
                queue: RequestQueue::new(),
                active: None,
                runner: None,
                projected,
                history: TransitionHistory::with_limit(options.history_limit),
                shutdown: false,
            }),
            work: Condvar::new(),
            progress: Condvar::new(),
            busy: AtomicBool::new(false),
            observers: ObserverRegistry::new(),
            sink,
            options,
            mode,
        }
    }

    pub fn lock(&self) -> MutexGuard<'_, ControllerState<S>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn observers(&self) -> &ObserverRegistry<S> {
        &self.observers
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Mirror busy-ness into the lock-free flag and wake waiters.
    fn publish(&self, state: &ControllerState<S>) {
        self.busy.store(state.is_busy(), Ordering::Release);
        self.progress.notify_all();
    }

    /// Validate a request against the projected state and queue it.
    pub fn enqueue(&self, target: S) -> Result<RequestId> {
        let mut state = self.lock();
        if state.shutdown {
            return Err(ControllerError::Stopped);
        }
        let plan = state.machine.plan_from(state.projected, target)?;
        let id = state.queue.push(target);
        state.projected = plan.target;
        tracing::debug!(
            request = %id,
            requested = target.name(),
            resolved = plan.target.name(),
            queued = state.queue.len(),
            "move request accepted"
        );
        self.publish(&state);
        self.work.notify_one();
        Ok(id)
    }

    pub fn cancel(&self, id: RequestId) -> bool {
        let mut state = self.lock();
        if !state.queue.cancel(id) {
            return false;
        }
        state.recompute_projection();
        tracing::debug!(request = %id, "queued move request cancelled");
        self.publish(&state);
        true
    }

    /// Take the next request and mark it active on this thread.
    ///
    /// Returns `None` when another request is already running, after
    /// shutdown, or (unless `blocking`) when the queue is empty.
    pub fn begin_next(&self, blocking: bool) -> Option<(RequestId, TransitionPlan<S>)> {
        loop {
            let mut state = self.lock();
            let request: PendingRequest<S> = loop {
                if state.shutdown || state.runner.is_some() {
                    return None;
                }
                if let Some(request) = state.queue.pop() {
                    break request;
                }
                if !blocking {
                    return None;
                }
                state = self.work.wait(state).unwrap_or_else(PoisonError::into_inner);
            };

            let planned = state.machine.plan(request.target);
            match planned {
                Ok(plan) => {
                    state.active = Some(ActiveRequest {
                        id: request.id,
                        target: plan.target,
                    });
                    state.runner = Some(thread::current().id());
                    self.publish(&state);
                    return Some((request.id, plan));
                }
                Err(err) => {
                    state.recompute_projection();
                    self.publish(&state);
                    drop(state);
                    report_isolated(self.sink.as_ref(), Some(request.id), &err);
                }
            }
        }
    }

    /// Execute a planned transition: apply each step, notify, dwell.
    pub fn run(&self, handle: &ControllerHandle<S>, id: RequestId, plan: TransitionPlan<S>) {
        if plan.is_noop() {
            tracing::debug!(request = %id, state = plan.target.name(), "already settled");
        }

        let last = plan.steps.len().saturating_sub(1);
        for (index, step) in plan.steps.iter().enumerate() {
            let phase = if index == last {
                StepPhase::Settled
            } else {
                StepPhase::Intermediate
            };

            let pattern = {
                let mut state = self.lock();
                let applied = state.machine.apply_step(step.state);
                if let Err(err) = applied {
                    drop(state);
                    report_isolated(self.sink.as_ref(), Some(id), &err);
                    break;
                }
                if phase == StepPhase::Settled {
                    state.history.record(TransitionRecord {
                        request: Some(id),
                        from: plan.from,
                        to: plan.target,
                        requested: plan.requested,
                        steps: plan.steps.iter().map(|step| step.state).collect(),
                        timestamp: Utc::now(),
                    });
                }
                state.machine.pattern()
            };

            tracing::debug!(request = %id, state = step.state.name(), %pattern, "step applied");
            let notification = Notification {
                request: id,
                state: step.state,
                requested: plan.requested,
                pattern,
                phase,
            };
            self.observers
                .notify_all(handle, &notification, self.sink.as_ref());
            self.dwell(step.dwell);
        }

        let mut state = self.lock();
        state.active = None;
        state.runner = None;
        if !plan.is_noop() {
            let settled = state.machine.current_state();
            tracing::info!(
                request = %id,
                from = plan.from.name(),
                to = settled.name(),
                "transition settled"
            );
        }
        self.publish(&state);
    }

    /// Hold the current step. Cut short by shutdown.
    fn dwell(&self, duration: Duration) {
        let scaled = duration.as_secs_f64() * self.options.time_scale.max(0.0);
        let duration = Duration::try_from_secs_f64(scaled).unwrap_or(Duration::MAX);
        if duration.is_zero() {
            return;
        }
        // An unrepresentable deadline dwells until shutdown.
        let deadline = Instant::now().checked_add(duration);
        let mut state = self.lock();
        while !state.shutdown {
            state = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        break;
                    }
                    self.work
                        .wait_timeout(state, deadline - now)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0
                }
                None => self.work.wait(state).unwrap_or_else(PoisonError::into_inner),
            };
        }
    }

    /// Run queued requests on the calling thread until none is left.
    pub fn drain(&self, handle: &ControllerHandle<S>) -> usize {
        let mut ran = 0;
        while let Some((id, plan)) = self.begin_next(false) {
            self.run(handle, id, plan);
            ran += 1;
        }
        ran
    }

    /// Block until the controller is idle; `None` waits forever, and so
    /// does a timeout too large to express as a deadline.
    ///
    /// Returns `Ok(false)` on timeout and `Stopped` once the controller
    /// has shut down.
    pub fn wait_idle(
        &self,
        handle: &ControllerHandle<S>,
        timeout: Option<Duration>,
    ) -> Result<bool> {
        let deadline = timeout.and_then(|timeout| Instant::now().checked_add(timeout));
        loop {
            if self.mode == ExecutionMode::Stepped {
                self.drain(handle);
            }
            let state = self.lock();
            if state.shutdown {
                return Err(ControllerError::Stopped);
            }
            if !state.is_busy() {
                return Ok(true);
            }
            if state.runs_on_current_thread() {
                return Err(ControllerError::WaitFromWorker);
            }
            match deadline {
                None => {
                    drop(self.progress.wait(state).unwrap_or_else(PoisonError::into_inner));
                }
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Ok(false);
                    }
                    drop(
                        self.progress
                            .wait_timeout(state, deadline - now)
                            .unwrap_or_else(PoisonError::into_inner),
                    );
                }
            }
        }
    }

    /// Stop accepting work: discard the queue and wake everyone.
    pub fn shutdown(&self) {
        let mut state = self.lock();
        state.shutdown = true;
        let dropped = state.queue.clear();
        if dropped > 0 {
            tracing::debug!(dropped, "discarding queued move requests on shutdown");
        }
        state.recompute_projection();
        self.publish(&state);
        self.work.notify_all();
    }
}
