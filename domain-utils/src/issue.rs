use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Identifier of negotiable dimension of the agreement.
#[derive(Clone, Debug, Display, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IssueId(pub String);

/// Single admissible value of an issue.
#[derive(Clone, Debug, Display, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Value(pub String);

/// Negotiable dimension together with its admissible values.
/// Immutable for whole negotiation session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub id: IssueId,
    #[serde(flatten)]
    pub kind: IssueKind,
}

/// Only discrete issues are supported now. Opponent modeling relies only
/// on the ability to enumerate admissible values, so new variants can be added
/// without changing it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IssueKind {
    Discrete { values: Vec<Value> },
}

impl Issue {
    pub fn discrete(id: impl Into<IssueId>, values: impl IntoIterator<Item = impl Into<Value>>) -> Issue {
        Issue {
            id: id.into(),
            kind: IssueKind::Discrete {
                values: values.into_iter().map(Into::into).collect(),
            },
        }
    }

    pub fn values(&self) -> &[Value] {
        match &self.kind {
            IssueKind::Discrete { values } => values,
        }
    }

    pub fn is_admissible(&self, value: &Value) -> bool {
        self.values().contains(value)
    }
}

impl From<&str> for IssueId {
    fn from(id: &str) -> Self {
        IssueId(id.to_string())
    }
}

impl From<String> for IssueId {
    fn from(id: String) -> Self {
        IssueId(id)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value(value)
    }
}
