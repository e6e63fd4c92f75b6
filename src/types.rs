use std::time::Instant;

/// Slot index of a live session. Slots are reused once a session is gone.
pub type SessionId = usize;

/// One admitted chunk request, queued on its owning session until a policy
/// picks it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub offset: i64,
    pub count: i64,
    pub arrival: Instant,
    pub owner: SessionId,
}
