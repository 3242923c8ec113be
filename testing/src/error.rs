use ya_negotiator_component::OpponentId;

#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    #[error("Party {0} not found")]
    PartyNotFound(OpponentId),
    #[error("Party {0} already takes part in session")]
    DuplicateParty(OpponentId),
    #[error("Session needs at least two parties, got {0}")]
    NotEnoughParties(usize),
    #[error("Party {party} accepted bid {bid}, which isn't the current offer")]
    InvalidAccept { party: OpponentId, bid: String },
}
