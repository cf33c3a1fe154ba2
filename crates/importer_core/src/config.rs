use std::fmt;

use serde::{Deserialize, Serialize};

/// Every account on the MusicBrainz test server shares this password.
pub const TEST_SERVER_PASSWORD: &str = "mb";

/// Run-wide switches. Supplied once and never mutated while a batch runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Block on the operator when an album is already linked to a release.
    pub pause_on_found_release: bool,
    /// Block on the operator right before the edit is entered.
    pub manual_review_before_publish: bool,
    pub close_processing_tab_after_processing: bool,
    pub copy_release_id_to_clipboard: bool,
    /// Escalate label mismatches instead of removing the label entry.
    pub manual_label_selection: bool,
    pub use_test_server: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            pause_on_found_release: false,
            manual_review_before_publish: true,
            close_processing_tab_after_processing: false,
            copy_release_id_to_clipboard: false,
            manual_label_selection: false,
            use_test_server: false,
        }
    }
}

impl ImportConfig {
    pub fn target_server(&self) -> TargetServer {
        if self.use_test_server {
            TargetServer::Test
        } else {
            TargetServer::Production
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetServer {
    Production,
    Test,
}

impl TargetServer {
    pub fn host(self) -> &'static str {
        match self {
            TargetServer::Production => "musicbrainz.org",
            TargetServer::Test => "test.musicbrainz.org",
        }
    }
}

/// Target database login.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Builds credentials from the optional environment values.
    ///
    /// The test server only needs a username: its password is always
    /// [`TEST_SERVER_PASSWORD`].
    pub fn resolve(
        username: Option<String>,
        password: Option<String>,
        server: TargetServer,
    ) -> Option<Self> {
        let username = username.filter(|u| !u.trim().is_empty())?;
        let password = match server {
            TargetServer::Test => TEST_SERVER_PASSWORD.to_string(),
            TargetServer::Production => password.filter(|p| !p.is_empty())?,
        };
        Some(Self { username, password })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
