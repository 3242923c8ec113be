use derive_more::Display;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Social welfare criterion used to choose between candidate bids.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Criterion {
    /// Utilitarian: sum of estimated opponents' utilities.
    #[display(fmt = "MAXSUM")]
    MaxSum,
    /// Rawlsian: utility of the least satisfied opponent.
    #[display(fmt = "MAXMIN")]
    MaxMin,
}

impl Criterion {
    pub fn score(self, estimates: impl Iterator<Item = f64>) -> f64 {
        match self {
            Criterion::MaxSum => estimates.sum(),
            Criterion::MaxMin => estimates
                .fold(None, |min: Option<f64>, estimate| {
                    Some(min.map_or(estimate, |min| min.min(estimate)))
                })
                .unwrap_or(0.0),
        }
    }
}

/// Decides which criterion is used in consecutive concession rounds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "lowercase")]
pub enum CriterionPolicy {
    Fixed { criterion: Criterion },
    /// MAXMIN in even concession rounds, MAXSUM in odd ones.
    Alternating,
    Random,
}

impl Default for CriterionPolicy {
    fn default() -> Self {
        CriterionPolicy::Alternating
    }
}

impl CriterionPolicy {
    /// `round` counts only rounds after the turning point, starting from 0.
    pub fn choose(&self, round: u64, rng: &mut impl Rng) -> Criterion {
        match self {
            CriterionPolicy::Fixed { criterion } => *criterion,
            CriterionPolicy::Alternating => match round % 2 {
                0 => Criterion::MaxMin,
                _ => Criterion::MaxSum,
            },
            CriterionPolicy::Random => match rng.gen_bool(0.5) {
                true => Criterion::MaxMin,
                false => Criterion::MaxSum,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_criterion_score() {
        let estimates = vec![0.3, 0.9, 0.5];
        assert!((Criterion::MaxSum.score(estimates.iter().cloned()) - 1.7).abs() < 1e-9);
        assert_eq!(Criterion::MaxMin.score(estimates.iter().cloned()), 0.3);
        assert_eq!(Criterion::MaxMin.score(std::iter::empty()), 0.0);
    }

    #[test]
    fn test_alternating_policy() {
        let mut rng = StdRng::seed_from_u64(0);
        let policy = CriterionPolicy::Alternating;

        let chosen = (0..4)
            .map(|round| policy.choose(round, &mut rng))
            .collect::<Vec<_>>();
        assert_eq!(
            chosen,
            vec![
                Criterion::MaxMin,
                Criterion::MaxSum,
                Criterion::MaxMin,
                Criterion::MaxSum
            ]
        );
    }

    #[test]
    fn test_random_policy_is_reproducible() {
        let policy = CriterionPolicy::Random;
        let draw = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..16)
                .map(|round| policy.choose(round, &mut rng))
                .collect::<Vec<_>>()
        };
        assert_eq!(draw(7), draw(7));
    }

    #[test]
    fn test_policy_from_yaml() {
        let fixed: CriterionPolicy =
            serde_yaml::from_str("policy: fixed\ncriterion: maxsum\n").unwrap();
        assert_eq!(
            fixed,
            CriterionPolicy::Fixed {
                criterion: Criterion::MaxSum
            }
        );

        let alternating: CriterionPolicy = serde_yaml::from_str("policy: alternating\n").unwrap();
        assert_eq!(alternating, CriterionPolicy::Alternating);
    }
}
