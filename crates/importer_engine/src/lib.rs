//! Importer engine: drives a browser through the import pipeline and executes
//! the effects requested by `importer_core`.
mod cover_art;
mod error;
mod fetch;
mod filename;
mod login;
mod operator;
mod orchestrator;
mod page;
mod persist;
mod recovery;
pub mod selectors;
mod session;
mod subtasks;
mod tabs;
mod types;
mod wait;

pub use cover_art::CoverUpload;
pub use error::ImportError;
pub use fetch::{FetchSettings, ImageFetcher, ReqwestFetcher};
pub use filename::cover_filename;
pub use operator::{Clipboard, ClipboardError, Decision, Escalation, Operator};
pub use orchestrator::BatchSummary;
pub use page::{Page, PageError, TabHandle};
pub use persist::{
    ensure_output_dir, AtomicFileWriter, PersistError, ProfileStore, PROFILE_LOCK_FILES,
};
pub use session::{ImportSession, Ports, SessionSettings, Timings};
pub use tabs::{BrowserSession, TabManager};
pub use types::{FailureKind, FetchError, FetchOutput};
pub use wait::Waiter;
