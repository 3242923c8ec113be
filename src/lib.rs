pub mod factory;
mod negotiators;
mod party;

pub use negotiators::{
    ChooseAction, Negotiator, NegotiatorAddr, ReceiveOffer, SessionFinished,
};
pub use party::PartyActor;

pub use ya_negotiator_component::{
    Action, NegotiationError, NegotiationParty, OpponentId, SessionEnv, Timeline, UtilityOracle,
};

pub mod builtin {
    pub use ya_builtin_negotiators::{ConcedingAgent, Criterion, CriterionPolicy};
}

pub mod component {
    pub use ya_domain_utils::{Bid, BidSpace, Domain, Issue, IssueId, IssueKind, Value};
    pub use ya_negotiator_component::{
        DeadlineTimeline, LinearUtilitySpace, RoundTimeline, UtilitySpaceDefinition,
    };
}
