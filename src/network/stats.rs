use std::fmt;
use std::time::{Duration, Instant};

/// Service counters for one session.
#[derive(Debug, Clone)]
pub struct SessionStats {
    pub connected_at: Instant,
    pub queued: u64,
    pub served: u64,
    pub rejected: u64,
    pub total_wait: Duration,
    pub bytes_written: u64,
}

impl SessionStats {
    pub fn new(connected_at: Instant) -> Self {
        Self {
            connected_at,
            queued: 0,
            served: 0,
            rejected: 0,
            total_wait: Duration::ZERO,
            bytes_written: 0,
        }
    }

    /// Time between admission and dispatch, averaged over served requests.
    pub fn average_wait(&self) -> Duration {
        match u32::try_from(self.served) {
            Ok(0) => Duration::ZERO,
            Ok(n) => self.total_wait / n,
            Err(_) => Duration::from_secs_f64(self.total_wait.as_secs_f64() / self.served as f64),
        }
    }

    pub(super) fn record_dispatch(&mut self, waited: Duration) {
        self.served += 1;
        self.total_wait += waited;
    }
}

impl fmt::Display for SessionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} queued, {} served, {} rejected, avg wait {:.3}s, {}kb sent, up {:.1}s",
            self.queued,
            self.served,
            self.rejected,
            self.average_wait().as_secs_f64(),
            self.bytes_written as f64 / 1024.0,
            self.connected_at.elapsed().as_secs_f64(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn averages_wait_over_served_requests() {
        let mut stats = SessionStats::new(Instant::now());
        assert_eq!(stats.average_wait(), Duration::ZERO);
        stats.queued = 3;
        stats.record_dispatch(Duration::from_millis(10));
        stats.record_dispatch(Duration::from_millis(30));
        assert_eq!(stats.served, 2);
        assert_eq!(stats.average_wait(), Duration::from_millis(20));

        let line = stats.to_string();
        assert!(line.starts_with("3 queued, 2 served, 0 rejected, avg wait 0.020s"), "{line}");
    }
}
