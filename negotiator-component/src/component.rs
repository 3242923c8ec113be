use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use ya_domain_utils::{Bid, Domain};

/// Stable, caller supplied identifier of negotiating counterpart.
#[derive(Clone, Debug, Display, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OpponentId(pub String);

impl From<&str> for OpponentId {
    fn from(id: &str) -> Self {
        OpponentId(id.to_string())
    }
}

/// Outbound action produced by party, when it's its turn.
#[derive(Clone, Debug, Display, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Accept the last received bid.
    #[display(fmt = "Accept{}", _0)]
    Accept(Bid),
    /// Counter offer.
    #[display(fmt = "Offer{}", _0)]
    Offer(Bid),
}

impl Action {
    pub fn bid(&self) -> &Bid {
        match self {
            Action::Accept(bid) | Action::Offer(bid) => bid,
        }
    }
}

/// Private preferences of the party. Supplied by the domain.
pub trait UtilityOracle {
    /// Own utility of bid in range [0, 1].
    fn own_utility(&self, bid: &Bid) -> anyhow::Result<f64>;

    /// Bid with the highest own utility. It can be expensive, so callers
    /// should cache result.
    fn max_utility_bid(&self) -> anyhow::Result<Bid>;
}

/// Negotiation session clock.
pub trait Timeline {
    /// Elapsed time as fraction of session duration: 0 at start and 1 at deadline.
    /// Non-decreasing during the session.
    fn current_time_fraction(&self) -> f64;
}

/// Party negotiating on behalf of the agent. Host delivers at most one stimulus
/// at a time and waits for the response before delivering the next one.
pub trait NegotiationParty {
    /// Notification about offer made by other party. Nothing is sent in response.
    fn receive_offer(&mut self, sender: &OpponentId, bid: &Bid) -> anyhow::Result<()>;

    /// Called when it is our turn. Party must return exactly one action.
    /// Error means, that the round is forfeited.
    fn choose_action(&mut self) -> anyhow::Result<Action>;

    /// Called when session ended, with agreed bid if agreement was reached.
    /// State gathered during the session should be discarded.
    fn on_session_finished(&mut self, _agreement: Option<&Bid>) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Collaborators provided to party by the hosting session.
#[derive(Clone)]
pub struct SessionEnv {
    pub domain: Arc<Domain>,
    pub oracle: Arc<dyn UtilityOracle>,
    pub timeline: Arc<dyn Timeline>,
}
