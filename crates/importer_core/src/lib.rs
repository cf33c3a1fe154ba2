//! Importer core: pure album state machine, configuration and the decision
//! rules of the import pipeline. Nothing in here touches a browser or the disk.
mod classify;
mod config;
mod cover;
mod effect;
mod msg;
mod query;
mod state;
mod update;

pub use classify::{
    classify_errors, decide_label, normalize_label, ErrorClassification, LabelAction,
    LABEL_MISSING_MARKERS,
};
pub use config::{Credentials, ImportConfig, TargetServer, TEST_SERVER_PASSWORD};
pub use cover::{
    candidate_urls, parse_existing_cover_count, BestCandidate, CoverArtCandidate,
};
pub use effect::Effect;
pub use msg::Msg;
pub use query::{ElementQuery, Locator, WaitCondition};
pub use state::{AlbumJob, AlbumState};
pub use update::update;
