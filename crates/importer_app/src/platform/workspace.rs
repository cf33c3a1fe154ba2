use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use importer_engine::{ensure_output_dir, ProfileStore};
use importer_logging::{importer_info, importer_warn};
use tempfile::TempDir;

const COVERS_DIR: &str = "covers";
const PROFILE_DIR: &str = "profile";

/// Directories owned by one running importer.
///
/// `profile/` is the saved, authenticated browser profile. The browser never
/// runs on it directly: it gets a throwaway working copy that the pipeline
/// saves back after a fresh login.
pub struct Workspace {
    root: PathBuf,
    browser: TempDir,
}

impl Workspace {
    pub fn init(root: &Path) -> Result<Self> {
        ensure_output_dir(&root.join(COVERS_DIR))
            .with_context(|| format!("preparing workspace {}", root.display()))?;
        let browser = tempfile::Builder::new()
            .prefix("importer-browser-")
            .tempdir()
            .context("creating the browser working directory")?;

        let restored = ProfileStore::new(root.join(PROFILE_DIR))
            .restore_into(browser.path())
            .context("restoring the saved browser profile")?;
        importer_info!(
            "Workspace {:?} ready, {} profile files restored into {:?}",
            root,
            restored,
            browser.path()
        );

        Ok(Self {
            root: root.to_path_buf(),
            browser,
        })
    }

    pub fn covers_dir(&self) -> PathBuf {
        self.root.join(COVERS_DIR)
    }

    pub fn profile_dir(&self) -> PathBuf {
        self.root.join(PROFILE_DIR)
    }

    /// Live profile directory handed to the browser.
    pub fn browser_dir(&self) -> &Path {
        self.browser.path()
    }

    /// Removes the working copy. Call after the browser has exited.
    pub fn teardown(self) {
        let path = self.browser.path().to_path_buf();
        if let Err(err) = self.browser.close() {
            importer_warn!("Could not remove browser working copy {:?}: {}", path, err);
        }
    }
}
