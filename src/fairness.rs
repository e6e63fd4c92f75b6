//! Jain's fairness index over per-client completion times.

use std::time::Duration;

/// Jain's fairness index of the throughputs `1 / duration`.
///
/// Lies in `(1/n, 1]`, reaching 1 only when every duration is equal.
/// Non-positive durations carry no throughput and are ignored; with nothing
/// left the index is 0.
pub fn jfi(durations: &[Duration]) -> f64 {
    let throughputs: Vec<f64> = durations
        .iter()
        .map(Duration::as_secs_f64)
        .filter(|&d| d > 0.0)
        .map(|d| 1.0 / d)
        .collect();
    let n = throughputs.len() as f64;
    let sum: f64 = throughputs.iter().sum();
    let sum_squares: f64 = throughputs.iter().map(|t| t * t).sum();
    if n == 0.0 || sum_squares == 0.0 {
        return 0.0;
    }
    sum * sum / (n * sum_squares)
}

/// Completion-time figures reported after an experiment run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub clients: usize,
    pub jfi: f64,
    pub mean: Duration,
    pub min: Duration,
    pub max: Duration,
}

impl Summary {
    pub fn from_durations(durations: &[Duration]) -> Option<Self> {
        let min = *durations.iter().min()?;
        let max = *durations.iter().max()?;
        let total: Duration = durations.iter().sum();
        Some(Self {
            clients: durations.len(),
            jfi: jfi(durations),
            mean: total.div_f64(durations.len() as f64),
            min,
            max,
        })
    }
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Jain's Fairness Index: {:.4}", self.jfi)?;
        writeln!(f, "Average completion time: {:.3} seconds", self.mean.as_secs_f64())?;
        writeln!(f, "Min completion time: {:.3} seconds", self.min.as_secs_f64())?;
        write!(f, "Max completion time: {:.3} seconds", self.max.as_secs_f64())
    }
}
