use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::{Domain, Error, IssueId, Value};

/// Complete assignment of one admissible value to every issue of a domain.
/// Equality is defined by assigned values.
///
/// Deserialized bids aren't checked against any domain. Call [`Bid::validate`]
/// before using a bid that came from outside.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bid {
    values: BTreeMap<IssueId, Value>,
}

impl Bid {
    /// Validates assignments against domain. Bid must assign every issue exactly once.
    pub fn new<K, V>(domain: &Domain, assignments: impl IntoIterator<Item = (K, V)>) -> Result<Bid, Error>
    where
        K: Into<IssueId>,
        V: Into<Value>,
    {
        let mut values = BTreeMap::new();
        for (issue_id, value) in assignments {
            let issue_id: IssueId = issue_id.into();
            let value: Value = value.into();
            let issue = domain
                .issue(&issue_id)
                .ok_or_else(|| Error::UnknownIssue(issue_id.clone()))?;

            if !issue.is_admissible(&value) {
                return Err(Error::InadmissibleValue {
                    issue: issue_id,
                    value,
                });
            }
            if values.insert(issue_id.clone(), value).is_some() {
                return Err(Error::DuplicateIssue(issue_id));
            }
        }

        if let Some(missing) = domain.issue_ids().find(|id| !values.contains_key(*id)) {
            return Err(Error::MissingIssue(missing.clone()));
        }
        Ok(Bid { values })
    }

    /// Checks that bid assigns admissible value to every issue of the domain
    /// and to nothing else.
    pub fn validate(&self, domain: &Domain) -> Result<(), Error> {
        for (issue_id, value) in &self.values {
            let issue = domain
                .issue(issue_id)
                .ok_or_else(|| Error::UnknownIssue(issue_id.clone()))?;
            if !issue.is_admissible(value) {
                return Err(Error::InadmissibleValue {
                    issue: issue_id.clone(),
                    value: value.clone(),
                });
            }
        }

        match domain.issue_ids().find(|id| !self.values.contains_key(*id)) {
            Some(missing) => Err(Error::MissingIssue(missing.clone())),
            None => Ok(()),
        }
    }

    pub(crate) fn from_validated(values: BTreeMap<IssueId, Value>) -> Bid {
        Bid { values }
    }

    pub fn value(&self, issue: &IssueId) -> Option<&Value> {
        self.values.get(issue)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&IssueId, &Value)> {
        self.values.iter()
    }

    pub fn issues(&self) -> impl Iterator<Item = &IssueId> {
        self.values.keys()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Display for Bid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let assignments = self
            .values
            .iter()
            .map(|(issue, value)| format!("{}: {}", issue, value))
            .collect::<Vec<_>>();
        write!(f, "{{{}}}", assignments.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Issue;
    use test_case::test_case;

    fn domain() -> Domain {
        Domain::new(
            "test",
            vec![
                Issue::discrete("color", vec!["red", "blue"]),
                Issue::discrete("size", vec!["s", "m", "l"]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_bid_equality_by_value() {
        let bid1 = Bid::new(&domain(), vec![("color", "red"), ("size", "m")]).unwrap();
        let bid2 = Bid::new(&domain(), vec![("size", "m"), ("color", "red")]).unwrap();

        assert_eq!(bid1, bid2);
        assert_eq!(bid1.value(&"size".into()), Some(&Value::from("m")));
        assert_eq!(bid1.to_string(), "{color: red, size: m}");
    }

    #[test_case(&[("color", "red")]; "Missing issue")]
    #[test_case(&[("color", "red"), ("size", "xl")]; "Inadmissible value")]
    #[test_case(&[("color", "red"), ("size", "s"), ("weight", "1")]; "Unknown issue")]
    #[test_case(&[("color", "red"), ("size", "s"), ("color", "blue")]; "Issue assigned twice")]
    fn test_invalid_bid(assignments: &[(&str, &str)]) {
        assert!(Bid::new(&domain(), assignments.iter().cloned()).is_err());
    }

    #[test_case("{color: red}" => matches Err(Error::MissingIssue(_)); "Missing issue")]
    #[test_case("{color: red, size: xl}" => matches Err(Error::InadmissibleValue { .. }); "Inadmissible value")]
    #[test_case("{color: red, size: s, weight: '1'}" => matches Err(Error::UnknownIssue(_)); "Unknown issue")]
    #[test_case("{color: blue, size: l}" => matches Ok(()); "Complete bid")]
    fn test_validate_deserialized_bid(yaml: &str) -> Result<(), Error> {
        let bid: Bid = serde_yaml::from_str(yaml).unwrap();
        bid.validate(&domain())
    }

    #[test]
    fn test_missing_issue_error() {
        match Bid::new(&domain(), vec![("color", "red")]) {
            Err(Error::MissingIssue(issue)) => assert_eq!(issue, IssueId::from("size")),
            other => panic!("Expected MissingIssue error, got: {:?}", other),
        }
    }
}
