use std::collections::HashSet;
use std::time::Duration;

use importer_logging::{importer_info, importer_warn};

use crate::{ImportError, Page, PageError, ProfileStore, TabHandle, Waiter};

/// Logical tab roles of the batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrowserSession {
    main: Option<TabHandle>,
    processing: Option<TabHandle>,
    active: Option<TabHandle>,
}

impl BrowserSession {
    /// The aggregator tab every album starts from.
    pub fn main(&self) -> Option<&str> {
        self.main.as_deref()
    }

    /// The tab opened by the import action of the current album.
    pub fn processing(&self) -> Option<&str> {
        self.processing.as_deref()
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }
}

/// Owns the [`BrowserSession`] and keeps it in step with the live browser.
#[derive(Debug)]
pub struct TabManager {
    session: BrowserSession,
    profile: ProfileStore,
}

impl TabManager {
    pub fn new(profile: ProfileStore) -> Self {
        Self {
            session: BrowserSession::default(),
            profile,
        }
    }

    pub fn session(&self) -> &BrowserSession {
        &self.session
    }

    /// Registers the current tab as the source tab.
    pub async fn register_main<P: Page>(&mut self, page: &P) -> Result<TabHandle, ImportError> {
        let handle = page.current_handle().await?;
        self.session.main = Some(handle.clone());
        self.session.active = Some(handle.clone());
        Ok(handle)
    }

    /// Focuses the source tab, if one was registered by an earlier album.
    pub async fn switch_to_main<P: Page>(&mut self, page: &P) -> Result<(), ImportError> {
        if let Some(main) = self.session.main.clone() {
            page.switch_to(&main).await?;
            self.session.active = Some(main);
        }
        Ok(())
    }

    pub fn register_processing(&mut self, handle: TabHandle) {
        self.session.processing = Some(handle);
    }

    /// Opens `element` in a new tab and focuses it. Returns `(origin, new)`.
    pub async fn open_in_new_tab<P: Page>(
        &mut self,
        page: &P,
        waiter: &Waiter,
        element: &P::Element,
        timeout: Duration,
    ) -> Result<(TabHandle, TabHandle), ImportError> {
        let origin = page.current_handle().await?;
        let before: HashSet<TabHandle> = page.window_handles().await?.into_iter().collect();

        waiter
            .wait_until("element to become clickable", timeout, move || async move {
                Ok::<_, PageError>(page.is_clickable(element).await?.then_some(()))
            })
            .await?;
        importer_info!("Opening link in new tab");
        page.open_in_new_tab(element).await?;

        let before = &before;
        let new_handle = waiter
            .wait_until("a new tab to open", timeout, move || async move {
                let fresh: Vec<TabHandle> = page
                    .window_handles()
                    .await?
                    .into_iter()
                    .filter(|handle| !before.contains(handle))
                    .collect();
                Ok::<_, PageError>(match fresh.as_slice() {
                    [only] => Some(only.clone()),
                    _ => None,
                })
            })
            .await?;

        page.switch_to(&new_handle).await?;
        self.session.active = Some(new_handle.clone());
        Ok((origin, new_handle))
    }

    /// Closes the active sub-task tab and focuses the processing tab again.
    ///
    /// The processing tab is focused even if closing fails; the close error is
    /// reported afterwards.
    pub async fn close_and_return_to_processing<P: Page>(
        &mut self,
        page: &P,
    ) -> Result<(), ImportError> {
        let processing = self
            .session
            .processing
            .clone()
            .ok_or_else(|| ImportError::Tab("no processing tab registered".into()))?;

        let closed = if self.session.active.as_deref() == Some(processing.as_str()) {
            importer_warn!("Active tab is the processing tab, not closing it");
            Ok(())
        } else {
            page.close_current().await
        };

        page.switch_to(&processing).await?;
        self.session.active = Some(processing);
        closed.map_err(ImportError::from)
    }

    /// Closes the processing tab at the end of an album.
    pub async fn close_processing<P: Page>(&mut self, page: &P) -> Result<(), ImportError> {
        let Some(processing) = self.session.processing.take() else {
            return Ok(());
        };
        if self.session.active.as_deref() != Some(processing.as_str()) {
            page.switch_to(&processing).await?;
        }
        page.close_current().await?;
        self.session.active = None;
        Ok(())
    }

    /// Persists the live browser profile after a fresh login.
    pub async fn save_authenticated_profile<P: Page>(&self, page: &P) -> Result<(), ImportError> {
        match page.profile_dir().await? {
            Some(live) => {
                importer_info!("Saving browser profile {:?} to {:?}", live, self.profile.dir());
                self.profile.save_from(&live)?;
            }
            None => importer_warn!("Browser does not expose its profile, login is not persisted"),
        }
        Ok(())
    }
}
