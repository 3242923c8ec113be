use chrono::{DateTime, Duration, Utc};
use std::sync::atomic::{AtomicU32, Ordering};

use crate::component::Timeline;

/// Timeline measured in negotiation rounds. Host advances it after each round.
#[derive(Debug)]
pub struct RoundTimeline {
    total_rounds: u32,
    round: AtomicU32,
}

impl RoundTimeline {
    pub fn new(total_rounds: u32) -> RoundTimeline {
        RoundTimeline {
            total_rounds,
            round: AtomicU32::new(0),
        }
    }

    pub fn total_rounds(&self) -> u32 {
        self.total_rounds
    }

    pub fn round(&self) -> u32 {
        self.round.load(Ordering::SeqCst)
    }

    /// Returns number of the round that has just started.
    pub fn advance(&self) -> u32 {
        self.round.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn set_round(&self, round: u32) {
        self.round.store(round, Ordering::SeqCst);
    }
}

impl Timeline for RoundTimeline {
    fn current_time_fraction(&self) -> f64 {
        if self.total_rounds == 0 {
            return 1.0;
        }
        (self.round() as f64 / self.total_rounds as f64).min(1.0)
    }
}

/// Wall clock timeline with fixed deadline.
#[derive(Clone, Debug)]
pub struct DeadlineTimeline {
    started: DateTime<Utc>,
    duration: Duration,
}

impl DeadlineTimeline {
    pub fn new(duration: std::time::Duration) -> anyhow::Result<DeadlineTimeline> {
        DeadlineTimeline::starting_at(Utc::now(), duration)
    }

    pub fn starting_at(
        started: DateTime<Utc>,
        duration: std::time::Duration,
    ) -> anyhow::Result<DeadlineTimeline> {
        let duration = Duration::from_std(duration)?;
        if duration <= Duration::zero() {
            anyhow::bail!("Session duration must be positive.");
        }
        Ok(DeadlineTimeline { started, duration })
    }

    pub fn deadline(&self) -> DateTime<Utc> {
        self.started + self.duration
    }

    fn fraction_at(&self, now: DateTime<Utc>) -> f64 {
        let elapsed = (now - self.started).num_milliseconds() as f64;
        let total = self.duration.num_milliseconds() as f64;
        (elapsed / total).max(0.0).min(1.0)
    }
}

impl Timeline for DeadlineTimeline {
    fn current_time_fraction(&self) -> f64 {
        self.fraction_at(Utc::now())
    }
}
