use super::*;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::time::Instant;

/// First come, first served across every session.
///
/// Each session's FIFO is already ordered by arrival, so the global arrival
/// order is a merge of the session heads. The heap holds one ticket per
/// session with work: the arrival of its oldest request.
#[derive(Debug, Default)]
pub struct Fcfs {
    sessions: HashMap<SessionId, Admitted>,
    heads: BinaryHeap<Reverse<Ticket>>,
}

#[derive(Debug)]
struct Admitted {
    connect_order: u64,
    ticketed: bool,
}

// field order is the ordering key: arrival, then connection order
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct Ticket {
    arrival: Instant,
    connect_order: u64,
    session: SessionId,
}

impl Fcfs {
    fn ticket(&mut self, session: SessionId, backlog: &dyn Backlog) {
        let Some(admitted) = self.sessions.get_mut(&session) else {
            return;
        };
        if admitted.ticketed {
            return;
        }
        if let Some(head) = backlog.front(session) {
            admitted.ticketed = true;
            self.heads.push(Reverse(Ticket {
                arrival: head.arrival,
                connect_order: admitted.connect_order,
                session,
            }));
        }
    }
}

impl Policy for Fcfs {
    fn name(&self) -> &'static str {
        "fcfs"
    }

    fn admit(&mut self, session: SessionId, connect_order: u64) {
        self.sessions.insert(session, Admitted { connect_order, ticketed: false });
    }

    fn withdraw(&mut self, session: SessionId) {
        if self.sessions.remove(&session).is_some_and(|s| s.ticketed) {
            self.heads.retain(|Reverse(t)| t.session != session);
        }
    }

    fn notify(&mut self, session: SessionId, backlog: &dyn Backlog) {
        self.ticket(session, backlog);
    }

    fn next(&mut self, backlog: &mut dyn Backlog) -> Option<Request> {
        while let Some(Reverse(ticket)) = self.heads.pop() {
            let Some(admitted) = self.sessions.get_mut(&ticket.session) else {
                continue;
            };
            admitted.ticketed = false;
            let Some(request) = backlog.pop_front(ticket.session) else {
                continue;
            };
            self.ticket(ticket.session, backlog);
            return Some(request);
        }
        None
    }
}
