use crate::prelude::*;
use crate::protocol::{self, LineBuffer};
use crate::store::Chunk;
use std::collections::VecDeque;
use std::io::{Read, Write};
use std::net::SocketAddr;

use super::stats::SessionStats;

/// Why a session has to be torn down.
#[derive(Debug)]
pub struct Disconnection(Option<io::Error>);
impl Disconnection {
    fn closed() -> Self {
        Self(None)
    }
}
impl From<io::Error> for Disconnection {
    fn from(e: io::Error) -> Self {
        Self(Some(e))
    }
}
impl std::fmt::Display for Disconnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            None => f.write_str("closed by peer"),
            Some(e) => write!(f, "{e}"),
        }
    }
}

/// Server side of one client connection.
pub struct Session {
    id: SessionId,
    conn: TcpStream,
    peer: Option<SocketAddr>,
    connect_order: u64,
    lines: LineBuffer,
    pending: VecDeque<Request>,
    outbound: Vec<u8>,
    outbound_cursor: usize,

    pub(super) waiting_for_write: bool,
    pub(super) stats: SessionStats,
}
impl Session {
    pub fn accept(conn: TcpStream, id: SessionId, connect_order: u64) -> io::Result<Self> {
        conn.set_nonblocking(true)?;
        conn.set_nodelay(true)?;
        Ok(Self {
            id,
            peer: conn.peer_addr().ok(),
            conn,
            connect_order,
            lines: LineBuffer::default(),
            pending: VecDeque::new(),
            outbound: vec![],
            outbound_cursor: 0,
            waiting_for_write: false,
            stats: SessionStats::new(time::Instant::now()),
        })
    }
    pub(super) fn conn(&self) -> &TcpStream {
        &self.conn
    }
    pub(super) fn connect_order(&self) -> u64 {
        self.connect_order
    }
    pub fn pending(&self) -> usize {
        self.pending.len()
    }
    /// Reply bytes accepted but not yet taken by the socket.
    pub fn unsent(&self) -> usize {
        self.outbound.len() - self.outbound_cursor
    }
    /// Has queued work and nothing left to write. A session still flushing
    /// an earlier reply is not offered to the policy.
    pub fn is_servable(&self) -> bool {
        !self.waiting_for_write && !self.pending.is_empty()
    }
    pub(super) fn front(&self) -> Option<&Request> {
        if self.waiting_for_write {
            return None;
        }
        self.pending.front()
    }
    pub(super) fn pop_front(&mut self) -> Option<Request> {
        if self.waiting_for_write {
            return None;
        }
        self.pending.pop_front()
    }

    /// Drains the socket, queueing every complete request line. Malformed
    /// lines are answered right away.
    pub fn read(&mut self, scratch: &mut [u8]) -> Result<(), Disconnection> {
        let res = loop {
            match self.conn.read(scratch) {
                Ok(0) => break Err(Disconnection::closed()),
                Ok(n) => {
                    log::trace!("session {} received {n} bytes", self.id);
                    self.take_input(&scratch[..n]);
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break Ok(()),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => break Err(Disconnection(Some(e))),
            }
        };
        res?;
        self.flush()
    }
    fn take_input(&mut self, bytes: &[u8]) {
        let Self { id, lines, pending, outbound, stats, .. } = self;
        lines.feed(bytes, |line| match line.and_then(protocol::parse_request) {
            Ok(None) => {}
            Ok(Some(range)) => {
                log::debug!("session {id} queued {},{}", range.offset, range.count);
                stats.queued += 1;
                pending.push_back(Request {
                    offset: range.offset,
                    count: range.count,
                    arrival: time::Instant::now(),
                    owner: *id,
                });
            }
            Err(e) => {
                log::debug!("session {id} sent a malformed request: {e}");
                stats.rejected += 1;
                protocol::encode_error(&e, outbound);
            }
        });
    }

    pub fn respond(&mut self, chunk: &Chunk) {
        protocol::encode_chunk(chunk, &mut self.outbound);
    }
    pub fn reply_error(&mut self, err: &Error) {
        self.stats.rejected += 1;
        protocol::encode_error(err, &mut self.outbound);
    }

    /// Writes as much of the outbound buffer as the socket takes. Leftovers
    /// stay queued with `waiting_for_write` set.
    pub fn flush(&mut self) -> Result<(), Disconnection> {
        while self.outbound_cursor < self.outbound.len() {
            match self.conn.write(&self.outbound[self.outbound_cursor..]) {
                Ok(0) => return Err(Disconnection(Some(io::ErrorKind::WriteZero.into()))),
                Ok(n) => {
                    log::trace!("session {} sent {n} bytes", self.id);
                    self.outbound_cursor += n;
                    self.stats.bytes_written += n as u64;
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    self.waiting_for_write = true;
                    return Ok(());
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(Disconnection(Some(e))),
            }
        }
        self.outbound.clear();
        self.outbound_cursor = 0;
        self.waiting_for_write = false;
        Ok(())
    }
}
impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut fields = f.debug_struct("Session");
        fields.field("id", &self.id);
        if let Some(addr) = self.peer {
            fields.field("conn", &addr);
        }
        fields.field("connect_order", &self.connect_order);
        fields.field("pending", &self.pending.len());
        fields.field("unsent", &self.unsent());
        fields.finish()
    }
}

impl Backlog for SlotMap<Session> {
    fn front(&self, session: SessionId) -> Option<&Request> {
        self.get(session)?.front()
    }
    fn pop_front(&mut self, session: SessionId) -> Option<Request> {
        self.get_mut(session)?.pop_front()
    }
}
