use derive_more::Display;
use serde::{Deserialize, Serialize};

use ya_negotiator_component::NegotiationError;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ConcessionConfig {
    pub initial_utility: f64,
    pub minimum_utility: f64,
    /// Fraction of session time, when agent starts conceding.
    pub turning_point: f64,
}

impl Default for ConcessionConfig {
    fn default() -> Self {
        ConcessionConfig {
            initial_utility: 0.95,
            minimum_utility: 0.75,
            turning_point: 0.3,
        }
    }
}

#[derive(Clone, Copy, Debug, Display, PartialEq, Eq)]
pub enum Phase {
    /// Before turning point. Agent doesn't concede.
    Stall,
    /// After turning point. Aspiration level decreases linearly until deadline.
    Concede,
}

/// Stall-then-concede aspiration level. Pure function of elapsed time.
#[derive(Clone, Debug)]
pub struct ConcessionScheduler {
    initial_utility: f64,
    minimum_utility: f64,
    turning_point: f64,
}

impl ConcessionScheduler {
    pub fn new(config: &ConcessionConfig) -> Result<ConcessionScheduler, NegotiationError> {
        let unit = 0.0..=1.0;
        if !unit.contains(&config.initial_utility) || !unit.contains(&config.minimum_utility) {
            return Err(NegotiationError::InvalidConfig(format!(
                "Utilities must be in range [0, 1], got initial: {}, minimum: {}.",
                config.initial_utility, config.minimum_utility
            )));
        }
        if config.minimum_utility > config.initial_utility {
            return Err(NegotiationError::InvalidConfig(format!(
                "Minimum utility {} exceeds initial utility {}.",
                config.minimum_utility, config.initial_utility
            )));
        }
        if !(0.0..1.0).contains(&config.turning_point) {
            return Err(NegotiationError::InvalidConfig(format!(
                "Turning point must be in range [0, 1), got {}.",
                config.turning_point
            )));
        }

        Ok(ConcessionScheduler {
            initial_utility: config.initial_utility,
            minimum_utility: config.minimum_utility,
            turning_point: config.turning_point,
        })
    }

    pub fn initial_utility(&self) -> f64 {
        self.initial_utility
    }

    pub fn minimum_utility(&self) -> f64 {
        self.minimum_utility
    }

    pub fn phase(&self, time: f64) -> Phase {
        match time <= self.turning_point {
            true => Phase::Stall,
            false => Phase::Concede,
        }
    }

    /// Aspiration level at elapsed time fraction. Time after deadline
    /// is clamped to `minimum_utility`.
    pub fn threshold(&self, time: f64) -> f64 {
        if time <= self.turning_point {
            return self.initial_utility;
        }

        let slope =
            (self.initial_utility - self.minimum_utility) / (1.0 - self.turning_point);
        let threshold = self.initial_utility - (time.min(1.0) - self.turning_point) * slope;
        threshold.max(self.minimum_utility)
    }
}
