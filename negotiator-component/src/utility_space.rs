use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use ya_domain_utils::{Bid, Domain, IssueId, Value};

use crate::component::UtilityOracle;
use crate::error::NegotiationError;

/// Serialized form of linear additive preferences.
/// Weights and evaluations don't need to be normalized.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UtilitySpaceDefinition {
    pub weights: BTreeMap<IssueId, f64>,
    pub evaluations: BTreeMap<IssueId, BTreeMap<Value, f64>>,
}

/// Linear additive utility function: weighted sum of per issue value evaluations.
#[derive(Clone, Debug)]
pub struct LinearUtilitySpace {
    domain: Domain,
    issues: Vec<IssueEvaluation>,
}

#[derive(Clone, Debug)]
struct IssueEvaluation {
    id: IssueId,
    weight: f64,
    evaluations: HashMap<Value, f64>,
    best: Value,
}

impl LinearUtilitySpace {
    pub fn new(
        domain: Domain,
        definition: UtilitySpaceDefinition,
    ) -> Result<LinearUtilitySpace, NegotiationError> {
        let mut weights = Vec::new();
        for id in domain.issue_ids() {
            let weight = definition.weights.get(id).cloned().unwrap_or(0.0);
            if !(weight >= 0.0) {
                return Err(NegotiationError::InvalidConfig(format!(
                    "Weight of issue '{}' must be non-negative, got {}.",
                    id, weight
                )));
            }
            weights.push(weight);
        }

        let weight_sum: f64 = weights.iter().sum();
        if weight_sum <= 0.0 {
            return Err(NegotiationError::InvalidConfig(
                "At least one issue must have positive weight.".to_string(),
            ));
        }

        let mut issues = Vec::new();
        for (issue, weight) in domain.issues().iter().zip(weights) {
            let empty = BTreeMap::new();
            let definitions = definition.evaluations.get(&issue.id).unwrap_or(&empty);

            if let Some(unknown) = definitions.keys().find(|value| !issue.is_admissible(value)) {
                return Err(ya_domain_utils::Error::InadmissibleValue {
                    issue: issue.id.clone(),
                    value: unknown.clone(),
                }
                .into());
            }

            let raw = issue
                .values()
                .iter()
                .map(|value| (value.clone(), definitions.get(value).cloned().unwrap_or(0.0)))
                .collect::<Vec<_>>();

            if let Some((value, eval)) = raw.iter().find(|(_, eval)| !(*eval >= 0.0)) {
                return Err(NegotiationError::InvalidConfig(format!(
                    "Evaluation of '{}' for issue '{}' must be non-negative, got {}.",
                    value, issue.id, eval
                )));
            }

            // Values are non-empty, since domain was validated.
            let (best, max) = raw
                .iter()
                .fold((raw[0].0.clone(), raw[0].1), |(best, max), (value, eval)| {
                    if *eval > max {
                        (value.clone(), *eval)
                    } else {
                        (best, max)
                    }
                });

            issues.push(IssueEvaluation {
                id: issue.id.clone(),
                weight: weight / weight_sum,
                evaluations: raw
                    .into_iter()
                    .map(|(value, eval)| (value, if max > 0.0 { eval / max } else { 0.0 }))
                    .collect(),
                best,
            });
        }

        Ok(LinearUtilitySpace { domain, issues })
    }

    pub fn from_yaml(domain: Domain, content: &str) -> Result<LinearUtilitySpace, NegotiationError> {
        let definition: UtilitySpaceDefinition =
            serde_yaml::from_str(content).map_err(ya_domain_utils::Error::from)?;
        LinearUtilitySpace::new(domain, definition)
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }
}

impl UtilityOracle for LinearUtilitySpace {
    fn own_utility(&self, bid: &Bid) -> anyhow::Result<f64> {
        let mut utility = 0.0;
        for issue in &self.issues {
            let value = bid
                .value(&issue.id)
                .ok_or_else(|| anyhow!("Bid {} doesn't assign issue '{}'.", bid, issue.id))?;
            let eval = issue.evaluations.get(value).ok_or_else(|| {
                anyhow!("Value '{}' isn't admissible for issue '{}'.", value, issue.id)
            })?;
            utility += issue.weight * eval;
        }
        Ok(utility.min(1.0))
    }

    fn max_utility_bid(&self) -> anyhow::Result<Bid> {
        Ok(Bid::new(
            &self.domain,
            self.issues
                .iter()
                .map(|issue| (issue.id.clone(), issue.best.clone())),
        )?)
    }
}
