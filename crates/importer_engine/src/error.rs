use std::time::Duration;

use thiserror::Error;

use crate::{PageError, PersistError};

/// Failures that end an album and, with it, the batch.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("timed out after {timeout:?} waiting for {what}")]
    Timeout { what: String, timeout: Duration },
    #[error("aborted by operator: {0}")]
    Aborted(String),
    #[error("no valid images found")]
    NoValidImages,
    #[error("login required but no credentials are configured")]
    CredentialsMissing,
    #[error("expected element missing: {0}")]
    MissingElement(String),
    #[error("tab bookkeeping failed: {0}")]
    Tab(String),
    #[error("album stopped in state {state} after {msg}")]
    UnexpectedTransition { state: String, msg: String },
    #[error(transparent)]
    Page(#[from] PageError),
    #[error(transparent)]
    Persist(#[from] PersistError),
}

impl ImportError {
    /// True when the operator asked to stop the run.
    pub fn is_abort(&self) -> bool {
        matches!(self, ImportError::Aborted(_))
    }
}
