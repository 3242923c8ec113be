pub mod component;
pub mod error;
pub mod timeline;
pub mod utility_space;

pub use component::{
    Action, NegotiationParty, OpponentId, SessionEnv, Timeline, UtilityOracle,
};
pub use error::NegotiationError;
pub use timeline::{DeadlineTimeline, RoundTimeline};
pub use utility_space::{LinearUtilitySpace, UtilitySpaceDefinition};

pub use ya_domain_utils::{Bid, Domain, Issue, IssueId, Value};
