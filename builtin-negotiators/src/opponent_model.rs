use std::collections::{BTreeMap, HashMap};

use ya_domain_utils::{Bid, Domain, IssueId, Value};
use ya_negotiator_component::OpponentId;

use crate::criterion::Criterion;

/// Utility assumed for value, that was never offered by opponent.
pub const UNSEEN_VALUE_UTILITY: f64 = 0.5;

/// Scores closer than this are treated as equal while ranking bids.
const SCORE_TOLERANCE: f64 = 1e-9;

/// Frequency statistics of single issue for single opponent.
#[derive(Clone, Debug)]
struct IssueStats {
    weight: f64,
    /// Ordered by first observation. Order resolves ties between favorite values.
    frequencies: Vec<(Value, u32)>,
    utilities: HashMap<Value, f64>,
}

impl IssueStats {
    fn new(weight: f64) -> IssueStats {
        IssueStats {
            weight,
            frequencies: Vec::new(),
            utilities: HashMap::new(),
        }
    }

    fn observe(&mut self, value: &Value) {
        match self.frequencies.iter_mut().find(|(seen, _)| seen == value) {
            Some((_, count)) => *count += 1,
            None => self.frequencies.push((value.clone(), 1)),
        }
    }

    fn favorite(&self) -> Option<&Value> {
        let mut favorite: Option<&(Value, u32)> = None;
        for entry in &self.frequencies {
            if favorite.map_or(true, |(_, max)| entry.1 > *max) {
                favorite = Some(entry);
            }
        }
        favorite.map(|(value, _)| value)
    }

    fn normalize_utilities(&mut self) {
        let max = self
            .frequencies
            .iter()
            .map(|(_, count)| *count)
            .max()
            .unwrap_or(0);
        if max == 0 {
            return;
        }

        self.utilities = self
            .frequencies
            .iter()
            .map(|(value, count)| (value.clone(), *count as f64 / max as f64))
            .collect();
    }
}

/// Linear additive estimate of single opponent's preferences learned from
/// the bids it proposed.
#[derive(Clone, Debug)]
pub struct OpponentState {
    issues: BTreeMap<IssueId, IssueStats>,
}

impl OpponentState {
    fn new<'a>(issues: impl Iterator<Item = &'a IssueId>) -> OpponentState {
        let ids = issues.cloned().collect::<Vec<_>>();
        let initial = 1.0 / ids.len().max(1) as f64;
        OpponentState {
            issues: ids
                .into_iter()
                .map(|id| (id, IssueStats::new(initial)))
                .collect(),
        }
    }

    /// Issues that kept their value since previous bid gain weight.
    /// Offered values gain frequency.
    fn observe(&mut self, newest: &Bid, previous: Option<&Bid>, weight_increment: f64) {
        for (issue, value) in newest.iter() {
            let stats = match self.issues.get_mut(issue) {
                Some(stats) => stats,
                None => continue,
            };

            if let Some(previous) = previous {
                if previous.value(issue) == Some(value) {
                    stats.weight += weight_increment;
                }
            }
            stats.observe(value);
        }
        self.normalize();
    }

    /// Called only after all issues of the current bid were processed.
    fn normalize(&mut self) {
        let sum = self.weight_sum();
        if sum > 0.0 {
            for stats in self.issues.values_mut() {
                stats.weight /= sum;
            }
        }

        for stats in self.issues.values_mut() {
            stats.normalize_utilities();
        }
    }

    pub fn weight(&self, issue: &IssueId) -> Option<f64> {
        self.issues.get(issue).map(|stats| stats.weight)
    }

    pub fn weight_sum(&self) -> f64 {
        self.issues.values().map(|stats| stats.weight).sum()
    }

    /// Normalized value utility or `None`, if value was never observed.
    pub fn value_utility(&self, issue: &IssueId, value: &Value) -> Option<f64> {
        self.issues
            .get(issue)
            .and_then(|stats| stats.utilities.get(value).cloned())
    }

    pub fn frequency(&self, issue: &IssueId, value: &Value) -> u32 {
        self.issues
            .get(issue)
            .and_then(|stats| stats.frequencies.iter().find(|(seen, _)| seen == value))
            .map_or(0, |(_, count)| *count)
    }

    pub fn estimate(&self, bid: &Bid) -> f64 {
        self.issues
            .iter()
            .map(|(issue, stats)| {
                let utility = bid
                    .value(issue)
                    .and_then(|value| stats.utilities.get(value).cloned())
                    .unwrap_or(UNSEEN_VALUE_UTILITY);
                stats.weight * utility
            })
            .sum::<f64>()
            .max(0.0)
            .min(1.0)
    }

    pub fn favorite_value(&self, issue: &IssueId) -> Option<&Value> {
        self.issues.get(issue).and_then(IssueStats::favorite)
    }
}

/// Online estimator of opponents' preferences. Keeps separate state for every
/// opponent. State is created on first received bid and changed only by bids
/// of the same opponent.
#[derive(Clone, Debug)]
pub struct OpponentModel {
    opponents: BTreeMap<OpponentId, OpponentState>,
    weight_increment: f64,
}

impl OpponentModel {
    pub fn new(weight_increment: f64) -> OpponentModel {
        OpponentModel {
            opponents: BTreeMap::new(),
            weight_increment,
        }
    }

    /// Consumes opponent's full bid history, but learns only from the newest bid
    /// (compared with the previous one). Must be called exactly once for every
    /// newly received bid, since it accumulates frequencies.
    pub fn update(&mut self, opponent: &OpponentId, history: &[Bid]) {
        let (newest, previous) = match history {
            [] => return,
            [newest] => (newest, None),
            [.., previous, newest] => (newest, Some(previous)),
        };

        let weight_increment = self.weight_increment;
        let state = self.opponents.entry(opponent.clone()).or_insert_with(|| {
            log::debug!("Opponent model: started modeling opponent [{}].", opponent);
            OpponentState::new(newest.issues())
        });
        state.observe(newest, previous, weight_increment);

        log::debug!(
            "Opponent model: updated [{}] after {} bid(s).",
            opponent,
            history.len()
        );
    }

    pub fn opponent(&self, opponent: &OpponentId) -> Option<&OpponentState> {
        self.opponents.get(opponent)
    }

    pub fn opponents(&self) -> impl Iterator<Item = &OpponentId> {
        self.opponents.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.opponents.is_empty()
    }

    pub fn clear(&mut self) {
        self.opponents.clear();
    }

    /// Estimated opponent's utility of the bid or `None`, if we know nothing
    /// about the opponent.
    pub fn estimate_utility(&self, opponent: &OpponentId, bid: &Bid) -> Option<f64> {
        self.opponents.get(opponent).map(|state| state.estimate(bid))
    }

    pub fn favorite_value(&self, opponent: &OpponentId, issue: &IssueId) -> Option<&Value> {
        self.opponents
            .get(opponent)
            .and_then(|state| state.favorite_value(issue))
    }

    /// Bid composed from opponent's favorite values. `None` if any issue
    /// of the domain has no favorite yet.
    pub fn best_guess_bid(&self, opponent: &OpponentId, domain: &Domain) -> Option<Bid> {
        let state = self.opponents.get(opponent)?;
        let values = domain
            .issue_ids()
            .map(|issue| {
                state
                    .favorite_value(issue)
                    .map(|value| (issue.clone(), value.clone()))
            })
            .collect::<Option<Vec<_>>>()?;
        Bid::new(domain, values).ok()
    }

    /// Chooses candidate maximizing social welfare of modeled opponents.
    /// Ties are resolved in favor of the earlier candidate.
    pub fn rank_bids<'a>(&self, candidates: &'a [Bid], criterion: Criterion) -> Option<&'a Bid> {
        if self.opponents.is_empty() {
            return None;
        }

        select_best(candidates, |bid| {
            criterion.score(self.opponents.values().map(|state| state.estimate(bid)))
        })
    }
}

/// Returns the first item with the highest score.
pub(crate) fn select_best<T>(items: &[T], score: impl Fn(&T) -> f64) -> Option<&T> {
    let mut best: Option<(&T, f64)> = None;
    for item in items {
        let item_score = score(item);
        match best {
            Some((_, best_score)) if item_score <= best_score + SCORE_TOLERANCE => {}
            _ => best = Some((item, item_score)),
        }
    }
    best.map(|(item, _)| item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ya_domain_utils::Issue;

    const TOLERANCE: f64 = 1e-9;

    fn domain() -> Domain {
        Domain::new(
            "holiday",
            vec![
                Issue::discrete("location", vec!["beach", "city", "mountains"]),
                Issue::discrete("duration", vec!["1w", "2w", "3w"]),
                Issue::discrete("food", vec!["catering", "hotel", "self"]),
            ],
        )
        .unwrap()
    }

    fn bid(location: &str, duration: &str, food: &str) -> Bid {
        Bid::new(
            &domain(),
            vec![
                ("location", location),
                ("duration", duration),
                ("food", food),
            ],
        )
        .unwrap()
    }

    fn model_with(opponent: &OpponentId, bids: &[Bid]) -> OpponentModel {
        let mut model = OpponentModel::new(0.1);
        for i in 1..=bids.len() {
            model.update(opponent, &bids[..i]);
        }
        model
    }

    fn issue(id: &str) -> IssueId {
        IssueId::from(id)
    }

    #[test]
    fn test_initial_weights_uniform() {
        let opponent = OpponentId::from("alice");
        let model = model_with(&opponent, &[bid("beach", "1w", "self")]);
        let state = model.opponent(&opponent).unwrap();

        for id in domain().issue_ids() {
            assert!((state.weight(id).unwrap() - 1.0 / 3.0).abs() < TOLERANCE);
        }
    }

    #[test]
    fn test_weights_sum_to_one_after_every_update() {
        let opponent = OpponentId::from("alice");
        let bids = vec![
            bid("beach", "1w", "self"),
            bid("beach", "2w", "self"),
            bid("beach", "2w", "hotel"),
            bid("city", "2w", "hotel"),
            bid("city", "2w", "hotel"),
            bid("mountains", "3w", "catering"),
        ];

        let mut model = OpponentModel::new(0.1);
        for i in 1..=bids.len() {
            model.update(&opponent, &bids[..i]);
            let sum = model.opponent(&opponent).unwrap().weight_sum();
            assert!((sum - 1.0).abs() < TOLERANCE, "Weights sum: {}", sum);
        }
    }

    #[test]
    fn test_unchanged_issue_gains_weight() {
        let opponent = OpponentId::from("alice");
        let mut model = OpponentModel::new(0.1);

        let bids = vec![bid("beach", "1w", "self"), bid("beach", "2w", "hotel")];
        model.update(&opponent, &bids[..1]);
        let before = model.opponent(&opponent).unwrap().weight(&issue("location")).unwrap();

        model.update(&opponent, &bids);
        let state = model.opponent(&opponent).unwrap();
        let after = state.weight(&issue("location")).unwrap();

        assert!(after > before);
        assert!((after - 0.4333333333 / 1.1).abs() < 1e-6);
        assert!(state.weight(&issue("duration")).unwrap() < before);
    }

    #[test]
    fn test_most_frequent_value_has_utility_one() {
        let opponent = OpponentId::from("bob");
        let model = model_with(
            &opponent,
            &[
                bid("beach", "1w", "self"),
                bid("city", "1w", "self"),
                bid("beach", "2w", "self"),
                bid("beach", "3w", "hotel"),
            ],
        );
        let state = model.opponent(&opponent).unwrap();

        let location = issue("location");
        assert_eq!(state.frequency(&location, &Value::from("beach")), 3);
        assert_eq!(state.value_utility(&location, &Value::from("beach")), Some(1.0));
        assert!(
            (state.value_utility(&location, &Value::from("city")).unwrap() - 1.0 / 3.0).abs()
                < TOLERANCE
        );
        assert_eq!(state.value_utility(&location, &Value::from("mountains")), None);
        assert_eq!(state.value_utility(&issue("food"), &Value::from("self")), Some(1.0));
    }

    #[test]
    fn test_estimate_utility() {
        let opponent = OpponentId::from("carol");
        let model = model_with(&opponent, &[bid("beach", "1w", "self")]);

        let offered = model.estimate_utility(&opponent, &bid("beach", "1w", "self"));
        assert!((offered.unwrap() - 1.0).abs() < TOLERANCE);

        // Unseen values contribute neutral 0.5 instead of 0.
        let unseen = model.estimate_utility(&opponent, &bid("city", "2w", "hotel"));
        assert!((unseen.unwrap() - UNSEEN_VALUE_UTILITY).abs() < TOLERANCE);

        let mixed = model.estimate_utility(&opponent, &bid("beach", "2w", "hotel"));
        assert!((mixed.unwrap() - 2.0 / 3.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_estimate_in_unit_range() {
        let opponent = OpponentId::from("dave");
        let model = model_with(
            &opponent,
            &[
                bid("beach", "1w", "self"),
                bid("beach", "1w", "hotel"),
                bid("city", "1w", "hotel"),
                bid("city", "3w", "hotel"),
            ],
        );

        for candidate in domain().bid_space() {
            let estimate = model.estimate_utility(&opponent, &candidate).unwrap();
            assert!((0.0..=1.0).contains(&estimate), "Estimate {}", estimate);
        }
    }

    #[test]
    fn test_unknown_opponent() {
        let model = model_with(&OpponentId::from("erin"), &[bid("beach", "1w", "self")]);
        let unknown = OpponentId::from("frank");

        assert_eq!(model.estimate_utility(&unknown, &bid("beach", "1w", "self")), None);
        assert_eq!(model.favorite_value(&unknown, &issue("location")), None);
        assert_eq!(model.best_guess_bid(&unknown, &domain()), None);
    }

    #[test]
    fn test_favorite_value_first_observed_wins_ties() {
        let opponent = OpponentId::from("alice");
        let model = model_with(
            &opponent,
            &[
                bid("city", "1w", "self"),
                bid("beach", "2w", "self"),
                bid("beach", "1w", "hotel"),
                bid("city", "2w", "hotel"),
            ],
        );

        assert_eq!(
            model.favorite_value(&opponent, &issue("location")),
            Some(&Value::from("city"))
        );
        assert_eq!(
            model.favorite_value(&opponent, &issue("duration")),
            Some(&Value::from("1w"))
        );
        assert_eq!(
            model.best_guess_bid(&opponent, &domain()),
            Some(bid("city", "1w", "self"))
        );
    }

    #[test]
    fn test_rank_bids_without_opponents() {
        let model = OpponentModel::new(0.1);
        let candidates = vec![bid("beach", "1w", "self")];

        assert!(model.rank_bids(&candidates, Criterion::MaxSum).is_none());
        assert!(model.rank_bids(&[], Criterion::MaxMin).is_none());
    }

    #[test]
    fn test_select_best_by_criterion() {
        // Estimated utilities of two opponents for two candidate bids.
        let candidates = vec![vec![0.3, 0.9], vec![0.6, 0.6]];

        let maxmin = select_best(&candidates, |scores| {
            Criterion::MaxMin.score(scores.iter().cloned())
        });
        assert_eq!(maxmin, Some(&candidates[1]));

        // Sums are equal. The first candidate wins the tie.
        let maxsum = select_best(&candidates, |scores| {
            Criterion::MaxSum.score(scores.iter().cloned())
        });
        assert_eq!(maxsum, Some(&candidates[0]));
    }

    #[test]
    fn test_rank_bids_multilateral() {
        let alice = OpponentId::from("alice");
        let bob = OpponentId::from("bob");

        let mut model = OpponentModel::new(0.1);
        let alice_bids = vec![bid("beach", "1w", "self"), bid("beach", "1w", "self")];
        let bob_bids = vec![bid("city", "3w", "hotel"), bid("city", "3w", "hotel")];
        for i in 1..=2 {
            model.update(&alice, &alice_bids[..i]);
            model.update(&bob, &bob_bids[..i]);
        }

        let alice_favorite = bid("beach", "1w", "self");
        let compromise = bid("beach", "3w", "hotel");
        let candidates = vec![alice_favorite.clone(), compromise.clone()];

        // Alice: 1.0 vs 2/3, Bob: 0.5 vs 5/6.
        assert_eq!(model.rank_bids(&candidates, Criterion::MaxMin), Some(&compromise));
        // Both sum up to 1.5, so the earlier candidate wins.
        assert_eq!(
            model.rank_bids(&candidates, Criterion::MaxSum),
            Some(&alice_favorite)
        );
    }
}
