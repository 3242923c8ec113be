use crate::{IssueId, Value};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Issue '{0}' doesn't exist in domain")]
    UnknownIssue(IssueId),
    #[error("Bid doesn't assign value to issue '{0}'")]
    MissingIssue(IssueId),
    #[error("Issue '{0}' assigned more than once")]
    DuplicateIssue(IssueId),
    #[error("Value '{value}' is not admissible for issue '{issue}'")]
    InadmissibleValue { issue: IssueId, value: Value },
    #[error("Issue '{0}' has no admissible values")]
    EmptyIssue(IssueId),
    #[error("Domain '{0}' has no issues")]
    EmptyDomain(String),
    #[error("Can't parse yaml. {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Can't read file. {0}")]
    Io(#[from] std::io::Error),
}
