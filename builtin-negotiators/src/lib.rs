pub mod acceptance;
pub mod bid_selector;
pub mod conceding;
pub mod concession;
pub mod criterion;
pub mod opponent_model;

pub use acceptance::{AcceptReason, AcceptanceConfig, AcceptanceStrategy, Verdict};
pub use bid_selector::BidSelector;
pub use conceding::ConcedingAgent;
pub use concession::{ConcessionConfig, ConcessionScheduler, Phase};
pub use criterion::{Criterion, CriterionPolicy};
pub use opponent_model::{OpponentModel, OpponentState};
