use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::convert::TryFrom;
use std::fs;
use std::path::Path;

use crate::{BidSpace, Error, Issue, IssueId};

/// Negotiation domain: ordered list of issues with their admissible values.
/// Created once at session start and never mutated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DomainDefinition")]
pub struct Domain {
    pub name: String,
    issues: Vec<Issue>,
}

#[derive(Deserialize)]
struct DomainDefinition {
    name: String,
    issues: Vec<Issue>,
}

impl Domain {
    pub fn new(name: impl ToString, issues: Vec<Issue>) -> Result<Domain, Error> {
        let name = name.to_string();
        if issues.is_empty() {
            return Err(Error::EmptyDomain(name));
        }

        let mut ids = HashSet::new();
        for issue in &issues {
            if !ids.insert(&issue.id) {
                return Err(Error::DuplicateIssue(issue.id.clone()));
            }
            if issue.values().is_empty() {
                return Err(Error::EmptyIssue(issue.id.clone()));
            }
        }

        Ok(Domain { name, issues })
    }

    pub fn from_yaml(content: &str) -> Result<Domain, Error> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn issue(&self, id: &IssueId) -> Option<&Issue> {
        self.issues.iter().find(|issue| &issue.id == id)
    }

    pub fn issue_ids(&self) -> impl Iterator<Item = &IssueId> {
        self.issues.iter().map(|issue| &issue.id)
    }

    /// Number of distinct bids in the domain or `None`, if it doesn't fit in `usize`.
    pub fn size(&self) -> Option<usize> {
        self.issues
            .iter()
            .try_fold(1usize, |size, issue| size.checked_mul(issue.values().len()))
    }

    /// Lazy enumeration of all bids. Every call starts from the beginning.
    pub fn bid_space(&self) -> BidSpace<'_> {
        BidSpace::new(&self.issues)
    }
}

impl TryFrom<DomainDefinition> for Domain {
    type Error = Error;

    fn try_from(definition: DomainDefinition) -> Result<Self, Self::Error> {
        Domain::new(definition.name, definition.issues)
    }
}

impl TryFrom<&Path> for Domain {
    type Error = Error;

    fn try_from(path: &Path) -> Result<Self, Self::Error> {
        Domain::from_yaml(&fs::read_to_string(path)?)
    }
}
