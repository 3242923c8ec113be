use anyhow::bail;
use serde::{Deserialize, Serialize};

use ya_builtin_negotiators::ConcedingAgent;
use ya_negotiator_component::{NegotiationParty, SessionEnv};

use crate::negotiators::NegotiatorAddr;
use crate::party::PartyActor;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NegotiatorConfig {
    pub name: String,
    #[serde(default)]
    pub params: serde_yaml::Value,
}

pub fn create_negotiator(config: NegotiatorConfig, env: SessionEnv) -> anyhow::Result<NegotiatorAddr> {
    let party = create_builtin(&config.name, config.params, env)?;
    Ok(NegotiatorAddr::from(PartyActor::new(&config.name, party)))
}

pub fn create_builtin(
    name: &str,
    config: serde_yaml::Value,
    env: SessionEnv,
) -> anyhow::Result<Box<dyn NegotiationParty>> {
    let negotiator = match name {
        "ConcedingAgent" => {
            Box::new(ConcedingAgent::new(config, env)?) as Box<dyn NegotiationParty>
        }
        _ => bail!("BuiltIn negotiator {} doesn't exists.", name),
    };
    Ok(negotiator)
}
