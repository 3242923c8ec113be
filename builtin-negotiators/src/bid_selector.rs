use rand::Rng;
use std::cmp::Ordering;
use std::collections::HashSet;

use ya_domain_utils::{Bid, Domain};
use ya_negotiator_component::{NegotiationError, UtilityOracle};

/// Sampling gives up after this many draws per requested bid.
const SAMPLING_ATTEMPTS: usize = 10;

#[derive(Clone, Debug)]
pub struct RankedBid {
    pub bid: Bid,
    pub utility: f64,
}

/// Catalog of candidate bids sorted by own utility. Read-only after creation,
/// except for the lazily cached maximum utility bid.
#[derive(Clone, Debug)]
pub struct BidSelector {
    catalog: Vec<RankedBid>,
    max_bid: Option<Bid>,
}

impl BidSelector {
    /// Enumerates the whole domain, unless it has more than `limit` bids.
    /// In this case catalog is built from random sample of distinct bids.
    pub fn build(
        domain: &Domain,
        oracle: &dyn UtilityOracle,
        limit: usize,
        rng: &mut impl Rng,
    ) -> Result<BidSelector, NegotiationError> {
        let bids = match domain.size() {
            Some(size) if size <= limit => domain.bid_space().collect::<Vec<_>>(),
            size => {
                log::info!(
                    "Domain '{}' has {} bids. Sampling {} of them.",
                    domain.name,
                    size.map(|size| size.to_string())
                        .unwrap_or_else(|| "too many".to_string()),
                    limit
                );
                sample_bids(domain, limit, rng)?
            }
        };
        BidSelector::from_bids(bids, oracle)
    }

    pub fn from_bids(
        bids: impl IntoIterator<Item = Bid>,
        oracle: &dyn UtilityOracle,
    ) -> Result<BidSelector, NegotiationError> {
        let mut catalog = bids
            .into_iter()
            .map(|bid| {
                let utility = oracle.own_utility(&bid).map_err(NegotiationError::Oracle)?;
                Ok(RankedBid { bid, utility })
            })
            .collect::<Result<Vec<_>, NegotiationError>>()?;

        catalog.sort_by(|a, b| {
            b.utility
                .partial_cmp(&a.utility)
                .unwrap_or(Ordering::Equal)
        });

        Ok(BidSelector {
            catalog,
            max_bid: None,
        })
    }

    pub fn len(&self) -> usize {
        self.catalog.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty()
    }

    /// Bids with own utility in range [lower, upper], best first.
    pub fn in_range(&self, lower: f64, upper: f64) -> &[RankedBid] {
        let start = self.catalog.partition_point(|ranked| ranked.utility > upper);
        let end = self.catalog.partition_point(|ranked| ranked.utility >= lower);
        if start >= end {
            return &[];
        }
        &self.catalog[start..end]
    }

    /// Never returns empty set. If nothing lies in the range, the range is widened
    /// to [lower, 1.0] and if it's still empty, the maximum utility bid is used.
    pub fn select(
        &mut self,
        lower: f64,
        upper: f64,
        oracle: &dyn UtilityOracle,
    ) -> Result<Vec<Bid>, NegotiationError> {
        let found = self.in_range(lower, upper);
        if !found.is_empty() {
            return Ok(to_bids(found));
        }

        let widened = self.in_range(lower, 1.0);
        if !widened.is_empty() {
            log::debug!(
                "No bids in range [{:.3}, {:.3}]. Widened to [{:.3}, 1.0].",
                lower,
                upper,
                lower
            );
            return Ok(to_bids(widened));
        }

        log::debug!(
            "No bids with utility above {:.3}. Falling back to maximum utility bid.",
            lower
        );
        Ok(vec![self.max_utility_bid(oracle)?])
    }

    /// Computed by oracle on first use and cached afterwards.
    pub fn max_utility_bid(&mut self, oracle: &dyn UtilityOracle) -> Result<Bid, NegotiationError> {
        if let Some(bid) = &self.max_bid {
            return Ok(bid.clone());
        }

        let bid = oracle.max_utility_bid().map_err(NegotiationError::Oracle)?;
        self.max_bid = Some(bid.clone());
        Ok(bid)
    }
}

fn to_bids(ranked: &[RankedBid]) -> Vec<Bid> {
    ranked.iter().map(|ranked| ranked.bid.clone()).collect()
}

pub fn random_bid(domain: &Domain, rng: &mut impl Rng) -> Result<Bid, NegotiationError> {
    let values = domain
        .issues()
        .iter()
        .map(|issue| {
            let values = issue.values();
            (issue.id.clone(), values[rng.gen_range(0..values.len())].clone())
        })
        .collect::<Vec<_>>();
    Ok(Bid::new(domain, values)?)
}

fn sample_bids(
    domain: &Domain,
    count: usize,
    rng: &mut impl Rng,
) -> Result<Vec<Bid>, NegotiationError> {
    let mut sampled = HashSet::new();
    let mut bids = Vec::new();

    for _ in 0..count.saturating_mul(SAMPLING_ATTEMPTS) {
        if bids.len() >= count {
            break;
        }

        let bid = random_bid(domain, rng)?;
        if sampled.insert(bid.clone()) {
            bids.push(bid);
        }
    }
    Ok(bids)
}
