use super::*;
use std::collections::VecDeque;

/// Rotates through connected sessions in connection order.
///
/// The head of the ring moves to the tail on every look, whether or not
/// that session had anything queued, so each session gets exactly one
/// opportunity per pass no matter how deep its backlog is.
#[derive(Debug, Default)]
pub struct RoundRobin {
    ring: VecDeque<SessionId>,
}

impl RoundRobin {
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }
}

impl Policy for RoundRobin {
    fn name(&self) -> &'static str {
        "round-robin"
    }

    fn admit(&mut self, session: SessionId, _connect_order: u64) {
        if !self.ring.contains(&session) {
            self.ring.push_back(session);
        }
    }

    fn withdraw(&mut self, session: SessionId) {
        self.ring.retain(|&s| s != session);
    }

    fn notify(&mut self, session: SessionId, _backlog: &dyn Backlog) {
        log::trace!("round-robin: session {session} has work");
    }

    fn next(&mut self, backlog: &mut dyn Backlog) -> Option<Request> {
        // at most one full pass per call
        for _ in 0..self.ring.len() {
            let session = self.ring.pop_front()?;
            self.ring.push_back(session);
            if let Some(request) = backlog.pop_front(session) {
                return Some(request);
            }
        }
        None
    }
}
