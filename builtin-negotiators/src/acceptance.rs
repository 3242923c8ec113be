use derive_more::Display;
use serde::{Deserialize, Serialize};

use ya_negotiator_component::NegotiationError;

use crate::concession::Phase;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AcceptanceConfig {
    /// Multiplier of received utility in ACnext rule. At least 1.
    pub alpha: f64,
    /// Bonus added to received utility in ACnext rule.
    pub beta: f64,
    /// Time fraction, after which any offer above `deadline_floor` is accepted.
    pub deadline_time: f64,
    pub deadline_floor: f64,
}

impl Default for AcceptanceConfig {
    fn default() -> Self {
        AcceptanceConfig {
            alpha: 1.02,
            beta: 0.02,
            deadline_time: 0.99,
            deadline_floor: 0.7,
        }
    }
}

#[derive(Clone, Copy, Debug, Display, PartialEq, Eq)]
pub enum AcceptReason {
    #[display(fmt = "deadline safety net")]
    DeadlineSafetyNet,
    #[display(fmt = "ACnext")]
    AcceptNext,
    #[display(fmt = "concession window")]
    ConcessionWindow,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Accept(AcceptReason),
    Counter,
}

/// Situation in which decision is made.
#[derive(Clone, Copy, Debug)]
pub struct RoundState {
    pub time: f64,
    pub phase: Phase,
    /// Lower bound of current concession window.
    pub threshold: f64,
}

/// Decides whether to accept the last received bid. Rules are checked
/// in order and the first satisfied one wins.
#[derive(Clone, Debug)]
pub struct AcceptanceStrategy {
    config: AcceptanceConfig,
}

impl AcceptanceStrategy {
    pub fn new(config: AcceptanceConfig) -> Result<AcceptanceStrategy, NegotiationError> {
        if config.alpha < 1.0 || config.beta < 0.0 {
            return Err(NegotiationError::InvalidConfig(format!(
                "ACnext requires alpha >= 1 and beta >= 0, got alpha: {}, beta: {}.",
                config.alpha, config.beta
            )));
        }
        Ok(AcceptanceStrategy { config })
    }

    pub fn decide(&self, round: &RoundState, received: f64, candidate: f64) -> Verdict {
        if round.time >= self.config.deadline_time && received >= self.config.deadline_floor {
            return Verdict::Accept(AcceptReason::DeadlineSafetyNet);
        }
        if self.config.alpha * received + self.config.beta >= candidate {
            return Verdict::Accept(AcceptReason::AcceptNext);
        }
        if round.phase == Phase::Concede && received >= round.threshold {
            return Verdict::Accept(AcceptReason::ConcessionWindow);
        }
        Verdict::Counter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strategy() -> AcceptanceStrategy {
        AcceptanceStrategy::new(AcceptanceConfig::default()).unwrap()
    }

    fn round(time: f64, phase: Phase, threshold: f64) -> RoundState {
        RoundState {
            time,
            phase,
            threshold,
        }
    }

    #[test]
    fn test_accept_next() {
        // 1.02 * 0.90 + 0.02 = 0.938 >= 0.92
        let verdict = strategy().decide(&round(0.5, Phase::Concede, 0.95), 0.90, 0.92);
        assert_eq!(verdict, Verdict::Accept(AcceptReason::AcceptNext));
    }

    #[test]
    fn test_counter_offer() {
        // 1.02 * 0.80 + 0.02 = 0.838 < 0.95
        let verdict = strategy().decide(&round(0.5, Phase::Concede, 0.9), 0.80, 0.95);
        assert_eq!(verdict, Verdict::Counter);
    }

    #[test]
    fn test_deadline_safety_net() {
        let strategy = strategy();
        let verdict = strategy.decide(&round(0.995, Phase::Concede, 0.76), 0.71, 0.95);
        assert_eq!(verdict, Verdict::Accept(AcceptReason::DeadlineSafetyNet));

        // Below the floor nothing is accepted even at deadline.
        let verdict = strategy.decide(&round(0.995, Phase::Concede, 0.76), 0.5, 0.95);
        assert_eq!(verdict, Verdict::Counter);
    }

    #[test]
    fn test_concession_window_only_after_turning_point() {
        let strategy = strategy();
        let verdict = strategy.decide(&round(0.6, Phase::Concede, 0.8), 0.82, 1.0);
        assert_eq!(verdict, Verdict::Accept(AcceptReason::ConcessionWindow));

        let verdict = strategy.decide(&round(0.2, Phase::Stall, 0.8), 0.82, 1.0);
        assert_eq!(verdict, Verdict::Counter);
    }

    #[test]
    fn test_invalid_config() {
        let config = AcceptanceConfig {
            alpha: 0.9,
            ..AcceptanceConfig::default()
        };
        assert!(AcceptanceStrategy::new(config).is_err());
    }
}
