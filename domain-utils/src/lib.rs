pub mod bid;
pub mod domain;
mod error;
pub mod issue;
mod space;

pub use bid::Bid;
pub use domain::Domain;
pub use error::Error;
pub use issue::{Issue, IssueId, IssueKind, Value};
pub use space::BidSpace;
