/// Errors that prevent negotiating party from acting.
#[derive(thiserror::Error, Debug)]
pub enum NegotiationError {
    /// Own utility can't be computed. Party can't act without it, so the whole
    /// session should be considered broken. Retrying won't help, because utility
    /// computation is deterministic.
    #[error("Utility oracle failure. {0}")]
    Oracle(anyhow::Error),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Domain(#[from] ya_domain_utils::Error),
}
