//! FIFO of accepted move requests that have not started yet.

use crate::core::{RequestId, State};
use std::collections::VecDeque;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) struct PendingRequest<S: State> {
    pub id: RequestId,
    pub target: S,
}

#[derive(Debug)]
pub(crate) struct RequestQueue<S: State> {
    pending: VecDeque<PendingRequest<S>>,
}

impl<S: State> RequestQueue<S> {
    pub fn new() -> Self {
        Self {
            pending: VecDeque::new(),
        }
    }

    pub fn push(&mut self, target: S) -> RequestId {
        let id = RequestId::new();
        self.pending.push_back(PendingRequest { id, target });
        id
    }

    pub fn pop(&mut self) -> Option<PendingRequest<S>> {
        self.pending.pop_front()
    }

    /// Remove a request by identity; false if it is not queued.
    pub fn cancel(&mut self, id: RequestId) -> bool {
        match self.pending.iter().position(|request| request.id == id) {
            Some(index) => self.pending.remove(index).is_some(),
            None => false,
        }
    }

    pub fn clear(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        dropped
    }

    pub fn targets(&self) -> impl Iterator<Item = S> + '_ {
        self.pending.iter().map(|request| request.target)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
