use actix::prelude::*;
use anyhow::Result;

use ya_domain_utils::Bid;
use ya_negotiator_component::{Action, OpponentId};

// =========================================== //
// Negotiator interface
// =========================================== //

/// Offer made by other party. Negotiator only updates its state
/// and doesn't respond with any action.
#[derive(Message)]
#[rtype(result = "Result<()>")]
pub struct ReceiveOffer {
    pub sender: OpponentId,
    pub bid: Bid,
}

/// It is our turn. Negotiator must respond with exactly one action.
/// Error means that the round was forfeited.
#[derive(Message)]
#[rtype(result = "Result<Action>")]
pub struct ChooseAction;

/// Session ended. Negotiator can discard session state.
#[derive(Message)]
#[rtype(result = "Result<()>")]
pub struct SessionFinished {
    pub agreement: Option<Bid>,
}

/// Actor implementing negotiation logic. Mailbox guarantees that negotiator
/// handles one stimulus at a time, so implementations don't need any
/// synchronization of their state.
pub trait Negotiator:
    Actor
    + Handler<ReceiveOffer, Result = <ReceiveOffer as Message>::Result>
    + Handler<ChooseAction, Result = <ChooseAction as Message>::Result>
    + Handler<SessionFinished, Result = <SessionFinished as Message>::Result>
{
}

#[derive(Clone)]
pub struct NegotiatorAddr {
    pub on_offer: Recipient<ReceiveOffer>,
    pub on_turn: Recipient<ChooseAction>,
    pub on_finished: Recipient<SessionFinished>,
}

impl NegotiatorAddr {
    pub async fn receive_offer(&self, sender: &OpponentId, bid: &Bid) -> Result<()> {
        self.on_offer
            .send(ReceiveOffer {
                sender: sender.clone(),
                bid: bid.clone(),
            })
            .await?
    }

    pub async fn choose_action(&self) -> Result<Action> {
        self.on_turn.send(ChooseAction).await?
    }

    pub async fn session_finished(&self, agreement: Option<&Bid>) -> Result<()> {
        self.on_finished
            .send(SessionFinished {
                agreement: agreement.cloned(),
            })
            .await?
    }

    pub fn from<T: Negotiator + Actor<Context = Context<T>>>(negotiator: T) -> NegotiatorAddr {
        let addr = negotiator.start();
        NegotiatorAddr {
            on_offer: addr.clone().recipient(),
            on_turn: addr.clone().recipient(),
            on_finished: addr.recipient(),
        }
    }
}
