//! Arbitration between sessions competing for the dispatcher.
//!
//! A policy never owns requests. Each session keeps its own FIFO of pending
//! requests (the [`Backlog`]); the policy only decides whose oldest request is
//! served next. All calls happen on the dispatcher's thread, one at a time,
//! so every call is a single atomic transition of the policy state.

use crate::prelude::*;

mod fcfs;
mod round_robin;

pub use fcfs::Fcfs;
pub use round_robin::RoundRobin;

/// Per-session FIFOs of admitted requests.
pub trait Backlog {
    fn front(&self, session: SessionId) -> Option<&Request>;
    fn pop_front(&mut self, session: SessionId) -> Option<Request>;
}

pub trait Policy: std::fmt::Debug + Send {
    fn name(&self) -> &'static str;
    /// A session connected. `connect_order` grows with every accept.
    fn admit(&mut self, session: SessionId, connect_order: u64);
    /// A session is gone. Nothing it queued may be returned afterwards.
    fn withdraw(&mut self, session: SessionId);
    /// `session` has a servable head again: its backlog went from empty to
    /// non-empty, or a reply it was blocked on finished writing.
    fn notify(&mut self, session: SessionId, backlog: &dyn Backlog);
    /// Pops the request to serve next, or `None` when nothing is servable.
    /// The request's `owner` names the session to answer.
    fn next(&mut self, backlog: &mut dyn Backlog) -> Option<Request>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    #[default]
    Fcfs,
    #[serde(rename = "rr", alias = "round_robin")]
    #[value(name = "rr", alias = "round-robin")]
    RoundRobin,
}

impl PolicyKind {
    pub fn build(self) -> Box<dyn Policy> {
        match self {
            PolicyKind::Fcfs => Box::new(Fcfs::default()),
            PolicyKind::RoundRobin => Box::new(RoundRobin::default()),
        }
    }
}
