use actix::{Actor, Context, Handler};

use ya_negotiator_component::{Action, NegotiationParty};

use crate::negotiators::{ChooseAction, Negotiator, ReceiveOffer, SessionFinished};

/// Actor wrapping single `NegotiationParty`.
pub struct PartyActor {
    name: String,
    party: Box<dyn NegotiationParty>,
}

impl PartyActor {
    pub fn new(name: &str, party: Box<dyn NegotiationParty>) -> PartyActor {
        PartyActor {
            name: name.to_string(),
            party,
        }
    }
}

impl Handler<ReceiveOffer> for PartyActor {
    type Result = anyhow::Result<()>;

    fn handle(&mut self, msg: ReceiveOffer, _: &mut Context<Self>) -> Self::Result {
        log::debug!(
            "Negotiator '{}' received offer {} from [{}].",
            self.name,
            msg.bid,
            msg.sender
        );
        self.party.receive_offer(&msg.sender, &msg.bid)
    }
}

impl Handler<ChooseAction> for PartyActor {
    type Result = anyhow::Result<Action>;

    fn handle(&mut self, _: ChooseAction, _: &mut Context<Self>) -> Self::Result {
        self.party.choose_action().map_err(|e| {
            log::warn!("Negotiator '{}' forfeits round. {}", self.name, e);
            e
        })
    }
}

impl Handler<SessionFinished> for PartyActor {
    type Result = anyhow::Result<()>;

    fn handle(&mut self, msg: SessionFinished, _: &mut Context<Self>) -> Self::Result {
        self.party.on_session_finished(msg.agreement.as_ref())
    }
}

impl Negotiator for PartyActor {}
impl Actor for PartyActor {
    type Context = Context<Self>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NegotiatorAddr;
    use ya_domain_utils::{Bid, Domain, Issue};
    use ya_negotiator_component::OpponentId;

    /// Offers the last bid it received, or refuses to act if it got nothing.
    #[derive(Default)]
    struct Echo {
        last: Option<Bid>,
    }

    impl NegotiationParty for Echo {
        fn receive_offer(&mut self, _sender: &OpponentId, bid: &Bid) -> anyhow::Result<()> {
            self.last = Some(bid.clone());
            Ok(())
        }

        fn choose_action(&mut self) -> anyhow::Result<Action> {
            match &self.last {
                Some(bid) => Ok(Action::Offer(bid.clone())),
                None => anyhow::bail!("Nothing to echo."),
            }
        }

        fn on_session_finished(&mut self, _agreement: Option<&Bid>) -> anyhow::Result<()> {
            self.last = None;
            Ok(())
        }
    }

    #[actix_rt::test]
    async fn test_party_actor() {
        let domain = Domain::new("echo", vec![Issue::discrete("word", vec!["hello"])]).unwrap();
        let bid = Bid::new(&domain, vec![("word", "hello")]).unwrap();

        let negotiator = NegotiatorAddr::from(PartyActor::new("Echo", Box::new(Echo::default())));
        assert!(negotiator.choose_action().await.is_err());

        negotiator
            .receive_offer(&OpponentId::from("other"), &bid)
            .await
            .unwrap();
        assert_eq!(
            negotiator.choose_action().await.unwrap(),
            Action::Offer(bid.clone())
        );

        negotiator.session_finished(Some(&bid)).await.unwrap();
        assert!(negotiator.choose_action().await.is_err());
    }
}
