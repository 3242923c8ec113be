use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use ya_domain_utils::{Bid, Domain};
use ya_negotiation_core::factory::{create_negotiator, NegotiatorConfig};
use ya_negotiation_core::NegotiatorAddr;
use ya_negotiator_component::{
    Action, OpponentId, RoundTimeline, SessionEnv, UtilityOracle,
};

use crate::error::SessionError;
use crate::negotiation_record::{NegotiationRecord, NegotiationStage};
use crate::test_directory::{load_domain, load_preferences};

#[derive(thiserror::Error)]
#[error("{error}\nNegotiation traceback:\n\n{negotiation_traceback}")]
pub struct FrameworkError {
    error: anyhow::Error,
    negotiation_traceback: NegotiationRecord,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionConfig {
    pub total_rounds: u32,
    #[serde(with = "humantime_serde")]
    pub test_timeout: Duration,
}

pub struct Party {
    pub id: OpponentId,
    pub negotiator: NegotiatorAddr,
    pub oracle: Arc<dyn UtilityOracle>,
}

/// Emulates negotiation session using stacked alternating offers protocol.
/// Parties act in the order they were added. Offer is broadcast to all other
/// parties, and agreement is reached when every other party accepts it.
pub struct Framework {
    pub domain: Arc<Domain>,
    pub parties: Vec<Party>,
    pub timeline: Arc<RoundTimeline>,
    pub config: SessionConfig,
}

impl Framework {
    pub fn new(domain: Domain, config: SessionConfig) -> Framework {
        let _ = env_logger::builder().is_test(true).try_init();

        Framework {
            domain: Arc::new(domain),
            parties: vec![],
            timeline: Arc::new(RoundTimeline::new(config.total_rounds)),
            config,
        }
    }

    /// Loads domain from test assets directory.
    pub fn from_assets(domain_file: &str, config: SessionConfig) -> anyhow::Result<Framework> {
        Ok(Self::new(load_domain(domain_file)?, config))
    }

    pub fn test_timeout(mut self, timeout: Duration) -> Self {
        self.config.test_timeout = timeout;
        self
    }

    pub fn add_party(
        mut self,
        id: &str,
        config: NegotiatorConfig,
        oracle: Arc<dyn UtilityOracle>,
    ) -> anyhow::Result<Self> {
        let id = OpponentId::from(id);
        if self.parties.iter().any(|party| party.id == id) {
            return Err(SessionError::DuplicateParty(id).into());
        }

        let env = SessionEnv {
            domain: self.domain.clone(),
            oracle: oracle.clone(),
            timeline: self.timeline.clone(),
        };
        let negotiator = create_negotiator(config, env)?;

        self.parties.push(Party {
            id,
            negotiator,
            oracle,
        });
        Ok(self)
    }

    /// Adds party with linear preferences loaded from test assets directory.
    pub fn add_party_with_preferences(
        self,
        id: &str,
        config: NegotiatorConfig,
        preferences_file: &str,
    ) -> anyhow::Result<Self> {
        let preferences = load_preferences(&self.domain, preferences_file)?;
        self.add_party(id, config, Arc::new(preferences))
    }

    pub fn party(&self, id: &str) -> anyhow::Result<&Party> {
        let id = OpponentId::from(id);
        self.parties
            .iter()
            .find(|party| party.id == id)
            .ok_or_else(|| anyhow!(SessionError::PartyNotFound(id)))
    }

    pub async fn run(&self) -> Result<NegotiationRecord, FrameworkError> {
        if self.parties.len() < 2 {
            return Err(FrameworkError::from(
                SessionError::NotEnoughParties(self.parties.len()),
                &NegotiationRecord::new(),
            ));
        }

        let test_timeout = self.config.test_timeout;
        timeout(test_timeout, self.run_session())
            .await
            .map_err(|_| {
                FrameworkError::from(
                    anyhow!("Session didn't finish in {:?}", test_timeout),
                    &NegotiationRecord::new(),
                )
            })
    }

    async fn run_session(&self) -> NegotiationRecord {
        let mut record = NegotiationRecord::new();
        let mut current: Option<(OpponentId, Bid)> = None;
        let mut accepted = HashSet::<OpponentId>::new();

        'session: for round in 0..self.config.total_rounds {
            self.timeline.set_round(round);
            record.rounds = round + 1;

            for party in &self.parties {
                let action = match party.negotiator.choose_action().await {
                    Ok(action) => action,
                    Err(e) => {
                        record.push(NegotiationStage::Forfeit {
                            round,
                            party: party.id.clone(),
                            error: e.to_string(),
                        });
                        continue;
                    }
                };

                match action {
                    Action::Offer(bid) => {
                        record.push(NegotiationStage::Offer {
                            round,
                            party: party.id.clone(),
                            bid: bid.clone(),
                        });
                        self.broadcast(&party.id, &bid, round, &mut record).await;

                        accepted.clear();
                        current = Some((party.id.clone(), bid));
                    }
                    Action::Accept(bid) => {
                        let valid = match &current {
                            Some((proposer, offered)) => proposer != &party.id && offered == &bid,
                            None => false,
                        };

                        if !valid {
                            let error = SessionError::InvalidAccept {
                                party: party.id.clone(),
                                bid: bid.to_string(),
                            };
                            record.push(NegotiationStage::Forfeit {
                                round,
                                party: party.id.clone(),
                                error: error.to_string(),
                            });
                            continue;
                        }

                        record.push(NegotiationStage::Accept {
                            round,
                            party: party.id.clone(),
                            bid: bid.clone(),
                        });
                        accepted.insert(party.id.clone());

                        if accepted.len() + 1 == self.parties.len() {
                            record.push(NegotiationStage::Agreement {
                                round,
                                bid: bid.clone(),
                            });
                            record.agreement = Some(bid);
                            break 'session;
                        }
                    }
                }
            }
        }

        if record.agreement.is_none() {
            record.push(NegotiationStage::Deadline {
                rounds: record.rounds,
            });
        }

        self.finish(&mut record).await;
        record
    }

    async fn broadcast(&self, sender: &OpponentId, bid: &Bid, round: u32, record: &mut NegotiationRecord) {
        for other in self.parties.iter().filter(|other| &other.id != sender) {
            if let Err(e) = other.negotiator.receive_offer(sender, bid).await {
                log::warn!("Party {} failed to process offer. {}", other.id, e);
                record.push(NegotiationStage::Forfeit {
                    round,
                    party: other.id.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    async fn finish(&self, record: &mut NegotiationRecord) {
        for party in &self.parties {
            if let Err(e) = party
                .negotiator
                .session_finished(record.agreement.as_ref())
                .await
            {
                log::warn!("Party {} failed to finish session. {}", party.id, e);
            }

            if let Some(agreement) = &record.agreement {
                match party.oracle.own_utility(agreement) {
                    Ok(utility) => {
                        record.utilities.insert(party.id.clone(), utility);
                    }
                    Err(e) => log::warn!("Can't evaluate agreement for {}. {}", party.id, e),
                }
            }
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            total_rounds: 200,
            test_timeout: Duration::from_secs(10),
        }
    }
}

impl FrameworkError {
    pub fn from(error: impl Into<anyhow::Error>, record: &NegotiationRecord) -> FrameworkError {
        FrameworkError {
            error: error.into(),
            negotiation_traceback: record.clone(),
        }
    }
}

impl fmt::Debug for FrameworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}
