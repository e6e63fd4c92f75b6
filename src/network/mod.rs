use crate::prelude::*;
use crate::policy::Policy;
use crate::WordStore;
use std::net::{SocketAddr, TcpListener, ToSocketAddrs};

pub mod session;
pub mod stats;

pub use session::{Disconnection, Session};
pub use stats::SessionStats;

/// Longest the dispatcher sleeps when no request is servable.
pub const POLL_INTERVAL: time::Duration = time::Duration::from_millis(10);

/// Accepts sessions and dispatches their requests, one decision at a time,
/// in the order the policy picks.
#[derive(Debug)]
pub struct Server {
    pub(super) listener: TcpListener,
    pub(super) scratch_buffer: Vec<u8>,

    pub(super) poller: polling::Poller,
    pub(super) events: Vec<polling::Event>,

    pub(super) sessions: SlotMap<Session>,
    pub(super) policy: Box<dyn Policy>,
    pub(super) store: WordStore,

    connections: u64,
    idle: bool,
    stats_interval: Option<time::Duration>,
    next_report: time::Instant,
}

const LISTENER: usize = usize::MAX - 1;
impl Server {
    pub fn bind(addr: impl ToSocketAddrs, store: WordStore, policy: Box<dyn Policy>) -> io::Result<Self> {
        let poller = polling::Poller::new()?;

        let listener = TcpListener::bind(addr)?;
        listener.set_nonblocking(true)?;
        poller.add(&listener, polling::Event::readable(LISTENER))?;
        Ok(Self {
            listener,
            scratch_buffer: vec![0; 64 * 1024],

            poller,
            events: vec![],

            sessions: SlotMap::new(),
            policy,
            store,

            connections: 0,
            idle: true,
            stats_interval: None,
            next_report: time::Instant::now(),
        })
    }

    /// Logs per-session statistics every `interval`.
    pub fn with_stats_interval(mut self, interval: Option<time::Duration>) -> Self {
        self.stats_interval = interval.filter(|i| !i.is_zero());
        if let Some(interval) = self.stats_interval {
            self.next_report = time::Instant::now() + interval;
        }
        self
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }
    pub fn policy(&self) -> &dyn Policy {
        &*self.policy
    }
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn run(&mut self) -> Result<()> {
        log::info!("serving {} words with {} scheduling", self.store.len(), self.policy.name());
        loop {
            self.turn()?;
        }
    }

    /// One scheduler tick: collect socket readiness, then make at most one
    /// dispatch decision. Waits up to [`POLL_INTERVAL`] when the previous
    /// tick found nothing to serve. Returns whether a request was answered.
    pub fn turn(&mut self) -> io::Result<bool> {
        let timeout = if self.idle { POLL_INTERVAL } else { time::Duration::ZERO };
        self.process_events(timeout)?;
        let dispatched = self.dispatch_next();
        self.idle = !dispatched;
        self.report_stats();
        Ok(dispatched)
    }

    fn process_events(&mut self, timeout: time::Duration) -> io::Result<()> {
        match self.poller.wait(&mut self.events, Some(timeout)) {
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::Interrupted => return Ok(()),
            Err(e) => return Err(e),
        }
        while let Some(event) = self.events.pop() {
            if event.key == LISTENER {
                self.poller.modify(&self.listener, polling::Event::readable(LISTENER))?;
                self.accept_sessions();
                continue;
            }

            let id = event.key;
            let Some(session) = self.sessions.get_mut(id) else {
                continue;
            };
            let was_servable = session.is_servable();
            if event.readable {
                if let Err(reason) = session.read(&mut self.scratch_buffer) {
                    self.disconnect(id, reason);
                    continue;
                }
            }
            if event.writable {
                if let Err(reason) = session.flush() {
                    self.disconnect(id, reason);
                    continue;
                }
            }
            // new requests, or the last reply finally drained
            if !was_servable && session.is_servable() {
                self.policy.notify(id, &self.sessions);
            }
            self.rearm(id);
        }
        Ok(())
    }

    /// Watches for input, or only for write readiness while a reply is stuck
    /// in the socket. A peer that stops reading stops being read from.
    fn rearm(&mut self, id: SessionId) {
        let Some(session) = self.sessions.get(id) else {
            return;
        };
        let interest = polling::Event {
            key: id,
            readable: !session.waiting_for_write,
            writable: session.waiting_for_write,
        };
        if let Err(e) = self.poller.modify(session.conn(), interest) {
            log::warn!("unable to watch session {id}: {e}");
            self.disconnect(id, Disconnection::from(e));
        }
    }

    fn accept_sessions(&mut self) {
        loop {
            match self.listener.accept() {
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    log::warn!("failed to accept a connection: {e}");
                    break;
                }
                Ok((conn, addr)) => {
                    let id = self.sessions.next_idx();
                    let order = self.connections;
                    let session = match Session::accept(conn, id, order) {
                        Ok(session) => session,
                        Err(e) => {
                            log::warn!("dropping connection from {addr}: {e}");
                            continue;
                        }
                    };
                    if let Err(e) = self.poller.add(session.conn(), polling::Event::readable(id)) {
                        log::warn!("dropping connection from {addr}: {e}");
                        continue;
                    }
                    self.connections += 1;
                    self.policy.admit(id, session.connect_order());
                    self.sessions.insert(session);
                    log::info!("session {id} connected from {addr} ({} active)", self.sessions.len());
                }
            }
        }
    }

    /// Removes a session from scheduling and drops whatever it still had
    /// queued.
    fn disconnect(&mut self, id: SessionId, reason: Disconnection) {
        self.policy.withdraw(id);
        let Some(session) = self.sessions.release(id) else {
            return;
        };
        if let Err(e) = self.poller.delete(session.conn()) {
            log::debug!("session {id} was not registered: {e}");
        }
        log::info!(
            "session {id} disconnected ({reason}): {}, {} discarded",
            session.stats,
            session.pending()
        );
    }

    fn dispatch_next(&mut self) -> bool {
        let Some(request) = self.policy.next(&mut self.sessions) else {
            return false;
        };
        let id = request.owner;
        let Some(session) = self.sessions.get_mut(id) else {
            log::debug!("dropping request for departed session {id}");
            return true;
        };
        let waited = request.arrival.elapsed();
        session.stats.record_dispatch(waited);
        log::debug!(
            "{}: serving session {id} {},{} after {waited:?}",
            self.policy.name(),
            request.offset,
            request.count,
        );
        match self.store.slice(request.offset, request.count) {
            Ok(chunk) => session.respond(&chunk),
            Err(e) => session.reply_error(&e),
        }
        match session.flush() {
            Err(reason) => {
                log::warn!("session {id} write failed: {reason}");
                self.disconnect(id, reason);
            }
            Ok(()) if session.waiting_for_write => self.rearm(id),
            Ok(()) => {}
        }
        true
    }

    fn report_stats(&mut self) {
        let Some(interval) = self.stats_interval else {
            return;
        };
        let now = time::Instant::now();
        if now < self.next_report {
            return;
        }
        self.next_report = now + interval;
        if self.sessions.is_empty() {
            return;
        }
        log::info!("{} statistics for {} sessions", self.policy.name(), self.sessions.len());
        for (id, session) in self.sessions.iter() {
            log::info!("  session {id}: {}, {} pending", session.stats, session.pending());
        }
    }
}
