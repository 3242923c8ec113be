use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use ya_domain_utils::Bid;
use ya_negotiator_component::{
    Action, NegotiationError, NegotiationParty, OpponentId, SessionEnv,
};

use crate::acceptance::{AcceptanceConfig, AcceptanceStrategy, RoundState, Verdict};
use crate::bid_selector::BidSelector;
use crate::concession::{ConcessionConfig, ConcessionScheduler, Phase};
use crate::criterion::CriterionPolicy;
use crate::opponent_model::OpponentModel;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub concession: ConcessionConfig,
    pub acceptance: AcceptanceConfig,
    /// Added to weight of every issue, that didn't change between consecutive
    /// opponent's bids.
    pub weight_increment: f64,
    pub criterion: CriterionPolicy,
    /// Width of own utility window above the aspiration level, from which
    /// counter offers are chosen.
    pub window_width: f64,
    /// Domains with more bids are sampled instead of enumerated.
    pub catalog_limit: usize,
    pub seed: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            concession: ConcessionConfig::default(),
            acceptance: AcceptanceConfig::default(),
            weight_increment: 0.1,
            criterion: CriterionPolicy::default(),
            window_width: 0.1,
            catalog_limit: 100_000,
            seed: 0,
        }
    }
}

/// Time dependent conceding agent. Stalls until turning point, then concedes linearly
/// and biases counter offers towards bids estimated as good for opponents.
pub struct ConcedingAgent {
    env: SessionEnv,
    scheduler: ConcessionScheduler,
    acceptance: AcceptanceStrategy,
    selector: BidSelector,
    model: OpponentModel,
    criterion: CriterionPolicy,
    window_width: f64,

    histories: HashMap<OpponentId, Vec<Bid>>,
    /// The most recent offer received from any opponent.
    last_received: Option<(OpponentId, Bid)>,
    concession_rounds: u64,
    rng: StdRng,
}

impl ConcedingAgent {
    pub fn new(config: serde_yaml::Value, env: SessionEnv) -> anyhow::Result<ConcedingAgent> {
        let config: Config = match config {
            serde_yaml::Value::Null => Config::default(),
            config => serde_yaml::from_value(config)?,
        };
        Ok(ConcedingAgent::with_config(config, env)?)
    }

    pub fn with_config(config: Config, env: SessionEnv) -> Result<ConcedingAgent, NegotiationError> {
        if !(config.weight_increment > 0.0) {
            return Err(NegotiationError::InvalidConfig(format!(
                "Weight increment must be positive, got {}.",
                config.weight_increment
            )));
        }
        if !(config.window_width >= 0.0) {
            return Err(NegotiationError::InvalidConfig(format!(
                "Window width can't be negative, got {}.",
                config.window_width
            )));
        }

        let scheduler = ConcessionScheduler::new(&config.concession)?;
        let acceptance = AcceptanceStrategy::new(config.acceptance)?;

        let mut rng = StdRng::seed_from_u64(config.seed);
        let selector = BidSelector::build(
            &env.domain,
            env.oracle.as_ref(),
            config.catalog_limit,
            &mut rng,
        )?;
        log::debug!(
            "ConcedingAgent: catalog of {} bid(s) for domain '{}'.",
            selector.len(),
            env.domain.name
        );

        Ok(ConcedingAgent {
            env,
            scheduler,
            acceptance,
            selector,
            model: OpponentModel::new(config.weight_increment),
            criterion: config.criterion,
            window_width: config.window_width,
            histories: HashMap::new(),
            last_received: None,
            concession_rounds: 0,
            rng,
        })
    }

    pub fn model(&self) -> &OpponentModel {
        &self.model
    }

    pub fn history(&self, opponent: &OpponentId) -> &[Bid] {
        self.histories
            .get(opponent)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn own_utility(&self, bid: &Bid) -> Result<f64, NegotiationError> {
        self.env
            .oracle
            .own_utility(bid)
            .map_err(NegotiationError::Oracle)
    }

    /// Random bid above initial utility. Opponent model isn't consulted.
    fn stall_bid(&mut self) -> Result<Bid, NegotiationError> {
        let oracle = self.env.oracle.clone();
        let initial = self.scheduler.initial_utility();
        let candidates = self.selector.select(initial, 1.0, oracle.as_ref())?;
        self.pick_random(candidates)
    }

    fn concession_bid(&mut self, threshold: f64) -> Result<Bid, NegotiationError> {
        let oracle = self.env.oracle.clone();
        let upper = (threshold + self.window_width).min(1.0);
        let mut candidates = self.selector.select(threshold, upper, oracle.as_ref())?;

        for opponent in self.model.opponents() {
            let guess = match self.model.best_guess_bid(opponent, &self.env.domain) {
                Some(guess) if !candidates.contains(&guess) => guess,
                _ => continue,
            };
            let utility = oracle.own_utility(&guess).map_err(NegotiationError::Oracle)?;
            if utility >= threshold && utility <= upper {
                log::debug!(
                    "ConcedingAgent: best guess of [{}] {} is a candidate.",
                    opponent,
                    guess
                );
                candidates.push(guess);
            }
        }

        let criterion = self.criterion.choose(self.concession_rounds, &mut self.rng);
        self.concession_rounds += 1;

        let ranked = self.model.rank_bids(&candidates, criterion).cloned();
        match ranked {
            Some(bid) => {
                log::debug!(
                    "ConcedingAgent: chose {} among {} candidate(s) using {}.",
                    bid,
                    candidates.len(),
                    criterion
                );
                Ok(bid)
            }
            None => self.pick_random(candidates),
        }
    }

    fn pick_random(&mut self, candidates: Vec<Bid>) -> Result<Bid, NegotiationError> {
        match candidates.choose(&mut self.rng) {
            Some(bid) => Ok(bid.clone()),
            None => self.selector.max_utility_bid(self.env.oracle.as_ref()),
        }
    }
}

impl NegotiationParty for ConcedingAgent {
    fn receive_offer(&mut self, sender: &OpponentId, bid: &Bid) -> anyhow::Result<()> {
        bid.validate(&self.env.domain)
            .map_err(NegotiationError::from)?;

        let history = self.histories.entry(sender.clone()).or_insert_with(Vec::new);
        history.push(bid.clone());
        self.model.update(sender, history);

        self.last_received = Some((sender.clone(), bid.clone()));
        Ok(())
    }

    fn choose_action(&mut self) -> anyhow::Result<Action> {
        let time = self.env.timeline.current_time_fraction();
        let phase = self.scheduler.phase(time);
        let threshold = self.scheduler.threshold(time);

        let candidate = match phase {
            Phase::Stall => self.stall_bid()?,
            Phase::Concede => self.concession_bid(threshold)?,
        };
        let candidate_utility = self.own_utility(&candidate)?;

        let (sender, received) = match &self.last_received {
            Some((sender, received)) => (sender.clone(), received.clone()),
            None => {
                log::debug!("ConcedingAgent: no pending offer, proposing {}.", candidate);
                return Ok(Action::Offer(candidate));
            }
        };
        let received_utility = self.own_utility(&received)?;

        let round = RoundState {
            time,
            phase,
            threshold,
        };
        Ok(
            match self
                .acceptance
                .decide(&round, received_utility, candidate_utility)
            {
                Verdict::Accept(reason) => {
                    log::info!(
                        "ConcedingAgent: accepting bid {} from [{}] with utility {:.3} ({}) at time {:.3}.",
                        received,
                        sender,
                        received_utility,
                        reason,
                        time
                    );
                    Action::Accept(received)
                }
                Verdict::Counter => {
                    log::debug!(
                        "ConcedingAgent: countering with {} (utility {:.3}, aspiration {:.3}, {} phase).",
                        candidate,
                        candidate_utility,
                        threshold,
                        phase
                    );
                    // Our offer replaces the received one as the current offer.
                    self.last_received = None;
                    Action::Offer(candidate)
                }
            },
        )
    }

    fn on_session_finished(&mut self, agreement: Option<&Bid>) -> anyhow::Result<()> {
        let utility = agreement.map(|bid| self.own_utility(bid));

        self.model.clear();
        self.histories.clear();
        self.last_received = None;
        self.concession_rounds = 0;

        match (agreement, utility) {
            (Some(bid), Some(Ok(utility))) => log::info!(
                "ConcedingAgent: session finished with agreement {} (utility {:.3}).",
                bid,
                utility
            ),
            (Some(bid), Some(Err(e))) => {
                log::warn!(
                    "ConcedingAgent: session finished with agreement {}, but it can't be evaluated. {}",
                    bid,
                    e
                );
                return Err(e.into());
            }
            _ => log::info!("ConcedingAgent: session finished without agreement."),
        }
        Ok(())
    }
}
