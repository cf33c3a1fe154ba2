use std::fmt;

use importer_logging::importer_warn;
use thiserror::Error;

use crate::ImportError;

/// Answer of the operator to an escalation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Retry,
    Proceed,
    Abort,
}

/// Situations the pipeline cannot resolve on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Escalation {
    WaitTimeout { what: String },
    ReleaseAlreadyLinked { link: String },
    InteractiveLogin,
    DuplicateReleases,
    MultipleErrors { count: usize },
    UnclassifiedError,
    LabelMismatch {
        widget: usize,
        expected: String,
        found: String,
    },
    ManualReview,
}

impl Escalation {
    /// Whether `Retry` is meaningful; everywhere else it counts as `Proceed`.
    pub fn allows_retry(&self) -> bool {
        matches!(self, Escalation::WaitTimeout { .. })
    }
}

impl fmt::Display for Escalation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Escalation::WaitTimeout { what } => write!(f, "Timed out waiting for {what}"),
            Escalation::ReleaseAlreadyLinked { link } => {
                write!(f, "Album is already linked to {link}")
            }
            Escalation::InteractiveLogin => write!(
                f,
                "Log in to MusicBrainz in the browser and tick 'Keep me logged in'"
            ),
            Escalation::DuplicateReleases => {
                write!(f, "Possible duplicate releases found, review them in the browser")
            }
            Escalation::MultipleErrors { count } => {
                write!(f, "{count} errors detected, fix them in the browser")
            }
            Escalation::UnclassifiedError => {
                write!(f, "An error was detected that cannot be fixed automatically")
            }
            Escalation::LabelMismatch {
                widget,
                expected,
                found,
            } => write!(
                f,
                "Label {} expected '{expected}' but the first search result is '{found}', pick it manually",
                widget + 1
            ),
            Escalation::ManualReview => write!(f, "Review the edit before it is published"),
        }
    }
}

/// Human escalation port. Blocks until the operator answers; there is no timeout.
#[async_trait::async_trait]
pub trait Operator: Send + Sync {
    async fn decide(&self, escalation: &Escalation) -> Decision;
}

/// Escalates and maps `Abort` to an error; any other answer continues.
pub(crate) async fn confirm(
    operator: &dyn Operator,
    escalation: Escalation,
) -> Result<(), ImportError> {
    match operator.decide(&escalation).await {
        Decision::Abort => {
            importer_warn!("Operator aborted at: {}", escalation);
            Err(ImportError::Aborted(escalation.to_string()))
        }
        Decision::Retry | Decision::Proceed => Ok(()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("clipboard unavailable: {0}")]
pub struct ClipboardError(pub String);

/// System clipboard port.
pub trait Clipboard: Send + Sync {
    fn set_text(&self, text: &str) -> Result<(), ClipboardError>;
}
