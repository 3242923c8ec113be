use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use ya_domain_utils::Bid;
use ya_negotiator_component::OpponentId;

#[derive(Clone, Debug, Serialize, Deserialize, derive_more::Display)]
pub enum NegotiationStage {
    #[display(fmt = "[{}] {} offers {}", round, party, bid)]
    Offer {
        round: u32,
        party: OpponentId,
        bid: Bid,
    },
    #[display(fmt = "[{}] {} accepts {}", round, party, bid)]
    Accept {
        round: u32,
        party: OpponentId,
        bid: Bid,
    },
    /// Party failed to act in its turn. Session goes on without its action.
    #[display(fmt = "[{}] {} forfeits turn: {}", round, party, error)]
    Forfeit {
        round: u32,
        party: OpponentId,
        error: String,
    },
    #[display(fmt = "[{}] Agreement on {}", round, bid)]
    Agreement { round: u32, bid: Bid },
    #[display(fmt = "No agreement after {} rounds", rounds)]
    Deadline { rounds: u32 },
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NegotiationRecord {
    pub stages: Vec<NegotiationStage>,
    pub agreement: Option<Bid>,
    /// Utility of agreement from perspective of each party.
    pub utilities: BTreeMap<OpponentId, f64>,
    pub rounds: u32,
}

impl NegotiationRecord {
    pub fn new() -> NegotiationRecord {
        NegotiationRecord::default()
    }

    pub fn push(&mut self, stage: NegotiationStage) {
        log::debug!("{}", stage);
        self.stages.push(stage);
    }

    pub fn offers_by<'a>(&'a self, party: &'a OpponentId) -> impl Iterator<Item = &'a Bid> + 'a {
        self.stages.iter().filter_map(move |stage| match stage {
            NegotiationStage::Offer { party: offerer, bid, .. } if offerer == party => Some(bid),
            _ => None,
        })
    }

    pub fn forfeits(&self) -> Vec<&NegotiationStage> {
        self.stages
            .iter()
            .filter(|stage| matches!(stage, NegotiationStage::Forfeit { .. }))
            .collect()
    }

    pub fn utility(&self, party: &OpponentId) -> Option<f64> {
        self.utilities.get(party).cloned()
    }
}

impl fmt::Display for NegotiationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let content = serde_json::to_string_pretty(&self).map_err(|_| fmt::Error)?;
        write!(f, "{}", content)
    }
}
