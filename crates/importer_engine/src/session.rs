use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use importer_core::{Credentials, ElementQuery, ImportConfig, Locator};
use importer_logging::importer_warn;

use crate::operator::{confirm, Clipboard, Escalation, Operator};
use crate::{AtomicFileWriter, ImageFetcher, ImportError, Page, ProfileStore, TabManager, Waiter};

/// Wait budgets and settle delays of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    pub poll_interval: Duration,
    /// Ordinary page-ready checks.
    pub default_wait: Duration,
    /// Edit forms opened in a sub-task tab.
    pub edit_wait: Duration,
    /// Server-side processing: publishing, edit banners, cover uploads.
    pub long_wait: Duration,
    /// After submitting the album URL; the result page has no discrete event.
    pub submit_settle: Duration,
    /// After switching editor tabs or finishing an OAuth redirect.
    pub tab_settle: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(250),
            default_wait: Duration::from_secs(10),
            edit_wait: Duration::from_secs(30),
            long_wait: Duration::from_secs(120),
            submit_settle: Duration::from_millis(1500),
            tab_settle: Duration::from_millis(500),
        }
    }
}

/// Collaborators the pipeline talks to besides the browser.
#[derive(Clone)]
pub struct Ports {
    pub operator: Arc<dyn Operator>,
    pub clipboard: Arc<dyn Clipboard>,
    pub fetcher: Arc<dyn ImageFetcher>,
}

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub config: ImportConfig,
    pub credentials: Option<Credentials>,
    pub timings: Timings,
    pub covers_dir: PathBuf,
    pub profile_dir: PathBuf,
}

/// Everything one batch run needs: the browser, the ports, and run settings.
pub struct ImportSession<P: Page> {
    pub(crate) page: P,
    pub(crate) waiter: Waiter,
    pub(crate) tabs: TabManager,
    pub(crate) operator: Arc<dyn Operator>,
    pub(crate) clipboard: Arc<dyn Clipboard>,
    pub(crate) fetcher: Arc<dyn ImageFetcher>,
    pub(crate) config: ImportConfig,
    pub(crate) credentials: Option<Credentials>,
    pub(crate) timings: Timings,
    pub(crate) covers: AtomicFileWriter,
}

impl<P: Page> ImportSession<P> {
    pub fn new(page: P, ports: Ports, settings: SessionSettings) -> Self {
        Self {
            waiter: Waiter::new(ports.operator.clone(), settings.timings.poll_interval),
            tabs: TabManager::new(ProfileStore::new(settings.profile_dir)),
            page,
            operator: ports.operator,
            clipboard: ports.clipboard,
            fetcher: ports.fetcher,
            config: settings.config,
            credentials: settings.credentials,
            timings: settings.timings,
            covers: AtomicFileWriter::new(settings.covers_dir),
        }
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn tabs(&self) -> &TabManager {
        &self.tabs
    }

    pub fn tabs_mut(&mut self) -> &mut TabManager {
        &mut self.tabs
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    /// Hands the browser back, e.g. to shut it down.
    pub fn into_page(self) -> P {
        self.page
    }

    pub(crate) async fn wait_for(
        &self,
        locator: Locator,
        timeout: Duration,
    ) -> Result<P::Element, ImportError> {
        self.waiter
            .wait_for(&self.page, &ElementQuery::present(locator, timeout))
            .await
    }

    pub(crate) async fn wait_for_clickable(
        &self,
        locator: Locator,
        timeout: Duration,
    ) -> Result<P::Element, ImportError> {
        self.waiter
            .wait_for(&self.page, &ElementQuery::clickable(locator, timeout))
            .await
    }

    pub(crate) async fn wait_for_all(
        &self,
        locator: Locator,
        timeout: Duration,
    ) -> Result<Vec<P::Element>, ImportError> {
        self.waiter
            .wait_for_all(&self.page, &ElementQuery::all(locator, timeout))
            .await
    }

    pub(crate) async fn escalate(&self, escalation: Escalation) -> Result<(), ImportError> {
        confirm(self.operator.as_ref(), escalation).await
    }

    pub(crate) fn copy_to_clipboard(&self, text: &str) {
        if let Err(err) = self.clipboard.set_text(text) {
            importer_warn!("Could not copy '{}' to the clipboard: {}", text, err);
        }
    }

    pub(crate) async fn settle(&self, delay: Duration) {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}
