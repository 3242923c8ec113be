use std::collections::BTreeMap;

use crate::{Bid, Issue};

/// Iterative Cartesian product over issue values. The last issue changes fastest.
#[derive(Clone, Debug)]
pub struct BidSpace<'a> {
    issues: &'a [Issue],
    indices: Vec<usize>,
    exhausted: bool,
}

impl<'a> BidSpace<'a> {
    pub(crate) fn new(issues: &'a [Issue]) -> BidSpace<'a> {
        BidSpace {
            issues,
            indices: vec![0; issues.len()],
            exhausted: issues.is_empty() || issues.iter().any(|issue| issue.values().is_empty()),
        }
    }

    /// Starts enumeration from the first bid again.
    pub fn restart(&mut self) {
        *self = BidSpace::new(self.issues);
    }

    fn current(&self) -> Bid {
        Bid::from_validated(
            self.issues
                .iter()
                .zip(&self.indices)
                .map(|(issue, idx)| (issue.id.clone(), issue.values()[*idx].clone()))
                .collect::<BTreeMap<_, _>>(),
        )
    }

    fn advance(&mut self) {
        for position in (0..self.indices.len()).rev() {
            self.indices[position] += 1;
            if self.indices[position] < self.issues[position].values().len() {
                return;
            }
            self.indices[position] = 0;
        }
        self.exhausted = true;
    }
}

impl<'a> Iterator for BidSpace<'a> {
    type Item = Bid;

    fn next(&mut self) -> Option<Bid> {
        if self.exhausted {
            return None;
        }

        let bid = self.current();
        self.advance();
        Some(bid)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use crate::{Domain, Issue, Value};

    fn domain() -> Domain {
        Domain::new(
            "space",
            vec![
                Issue::discrete("a", vec!["1", "2"]),
                Issue::discrete("b", vec!["x", "y", "z"]),
                Issue::discrete("c", vec!["only"]),
                Issue::discrete("d", vec!["p", "q"]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_enumerates_all_distinct_bids() {
        let domain = domain();
        let bids = domain.bid_space().collect::<Vec<_>>();
        let unique = bids.iter().cloned().collect::<HashSet<_>>();

        assert_eq!(bids.len(), 12);
        assert_eq!(unique.len(), 12);
        assert!(bids.iter().all(|bid| bid.len() == 4));
    }

    #[test]
    fn test_last_issue_changes_fastest() {
        let domain = domain();
        let mut space = domain.bid_space();

        let first = space.next().unwrap();
        let second = space.next().unwrap();
        assert_eq!(first.value(&"d".into()), Some(&Value::from("p")));
        assert_eq!(second.value(&"d".into()), Some(&Value::from("q")));
        assert_eq!(first.value(&"a".into()), second.value(&"a".into()));
    }

    #[test]
    fn test_restart() {
        let domain = domain();
        let mut space = domain.bid_space();
        let first = space.next().unwrap();

        assert_eq!(space.by_ref().count(), 11);
        assert!(space.next().is_none());

        space.restart();
        assert_eq!(space.next(), Some(first));
    }
}
