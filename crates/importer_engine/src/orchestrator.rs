use std::collections::VecDeque;

use importer_core::{update, AlbumJob, AlbumState, Effect, Msg};
use importer_logging::{importer_debug, importer_error, importer_info};

use crate::operator::Escalation;
use crate::selectors::{
    existing_release_link, import_button, provider_toggle, release_id_link, url_input,
    AGGREGATOR_URL, ALREADY_LINKED_MARKER,
};
use crate::{ImportError, ImportSession, Page};

/// Outcome counts of a completed batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub imported: usize,
    pub already_linked: usize,
}

impl<P: Page> ImportSession<P> {
    /// Imports every album in order. The first failing album ends the batch.
    pub async fn run_batch(&mut self, urls: &[String]) -> Result<BatchSummary, ImportError> {
        importer_info!("Starting import of {} albums", urls.len());
        let mut summary = BatchSummary::default();

        for (index, url) in urls.iter().enumerate() {
            importer_logging::set_album_context(index + 1, urls.len());
            importer_info!("Album URL: {}", url);
            let job = match self.import_album(url).await {
                Ok(job) => job,
                Err(err) => {
                    importer_error!("Import of {} failed: {}", url, err);
                    importer_logging::clear_album_context();
                    return Err(err);
                }
            };
            match job.state() {
                AlbumState::AlreadyLinked => summary.already_linked += 1,
                _ => summary.imported += 1,
            }
            importer_info!("Finished album {} ({})", url, job.state());
        }

        importer_logging::clear_album_context();
        importer_info!(
            "Done: {} imported, {} already linked",
            summary.imported,
            summary.already_linked
        );
        Ok(summary)
    }

    /// Drives one album from the aggregator landing page to a terminal state.
    pub async fn import_album(&mut self, url: &str) -> Result<AlbumJob, ImportError> {
        let mut job = AlbumJob::new(url);
        while !job.is_finished() {
            let before = job.state();
            let msg = self.run_stage(&job).await?;
            let (next, effects) = update(job, msg.clone(), &self.config);
            if next.state() == before {
                return Err(ImportError::UnexpectedTransition {
                    state: before.to_string(),
                    msg: format!("{msg:?}"),
                });
            }
            importer_debug!("{} -> {}", before, next.state());
            job = self.run_effects(next, effects).await?;
        }
        Ok(job)
    }

    async fn run_stage(&mut self, job: &AlbumJob) -> Result<Msg, ImportError> {
        let timeout = self.timings.default_wait;
        match job.state() {
            AlbumState::OpenSource => {
                self.tabs.switch_to_main(&self.page).await?;
                importer_info!("Opening Harmony");
                self.page.navigate(AGGREGATOR_URL).await?;
                self.tabs.register_main(&self.page).await?;
                let toggle = self.wait_for(provider_toggle(), timeout).await?;
                self.page.click(&toggle).await?;
                Ok(Msg::SourceOpened)
            }
            AlbumState::SubmitUrl => {
                importer_info!("Submitting album URL {}", job.source_url());
                let input = self.wait_for(url_input(), timeout).await?;
                self.page.clear(&input).await?;
                self.page.type_text(&input, job.source_url()).await?;
                self.page.submit(&input).await?;
                self.settle(self.timings.submit_settle).await;
                Ok(Msg::UrlSubmitted)
            }
            AlbumState::CheckExisting => {
                // The import action shows for linked and unlinked albums alike.
                self.wait_for(import_button(), timeout).await?;
                let body = self.page.body_text().await?;
                if !body.contains(ALREADY_LINKED_MARKER) {
                    importer_info!("Album not yet linked, proceeding with import");
                    return Ok(Msg::NotLinked);
                }
                let link = self
                    .page
                    .find(&existing_release_link())
                    .await?
                    .ok_or_else(|| ImportError::MissingElement("existing release link".into()))?;
                let link = self.page.text(&link).await?.trim().to_string();
                importer_info!("Album already linked to {}", link);
                Ok(Msg::AlreadyLinked { link })
            }
            AlbumState::Import => {
                importer_info!("Opening processing page in new tab");
                let button = self.wait_for_clickable(import_button(), timeout).await?;
                let (_, processing) = self
                    .tabs
                    .open_in_new_tab(&self.page, &self.waiter, &button, timeout)
                    .await?;
                self.tabs.register_processing(processing);
                Ok(Msg::ImportOpened)
            }
            AlbumState::MbSubmit => {
                self.submit_release().await?;
                Ok(Msg::Published)
            }
            AlbumState::IsrcSubmit => {
                if self.config.use_test_server {
                    importer_info!("Skipping ISRC submission on the test server");
                    self.rewrite_target_links().await?;
                } else {
                    self.submit_isrcs().await?;
                }
                Ok(Msg::IsrcFinished)
            }
            AlbumState::ExternalLinks => {
                self.link_external_ids().await?;
                Ok(Msg::LinksFinished)
            }
            AlbumState::CoverArt => {
                self.attach_cover_art().await?;
                Ok(Msg::CoverArtFinished)
            }
            state @ (AlbumState::AlreadyLinked | AlbumState::Done) => {
                Err(ImportError::UnexpectedTransition {
                    state: state.to_string(),
                    msg: "stage requested for a finished album".into(),
                })
            }
        }
    }

    async fn run_effects(
        &mut self,
        mut job: AlbumJob,
        effects: Vec<Effect>,
    ) -> Result<AlbumJob, ImportError> {
        let mut queue = VecDeque::from(effects);
        while let Some(effect) = queue.pop_front() {
            importer_debug!("Running effect {:?}", effect);
            match effect {
                Effect::CopyToClipboard(text) => {
                    importer_info!("Copying '{}' to the clipboard", text);
                    self.copy_to_clipboard(&text);
                }
                Effect::PauseForOperator => {
                    let link = job.release_id().unwrap_or_default().to_string();
                    self.escalate(Escalation::ReleaseAlreadyLinked { link })
                        .await?;
                }
                Effect::EnableTestServer => self.rewrite_target_links().await?,
                Effect::ReadReleaseId => {
                    let element = self
                        .wait_for(release_id_link(), self.timings.default_wait)
                        .await?;
                    let id = self.page.text(&element).await?.trim().to_string();
                    importer_info!("MusicBrainz release ID: {}", id);
                    let (next, follow_up) = update(job, Msg::ReleaseIdRead { id }, &self.config);
                    job = next;
                    // Follow-ups run before whatever was queued behind the read.
                    for effect in follow_up.into_iter().rev() {
                        queue.push_front(effect);
                    }
                }
                Effect::CloseProcessingTab => {
                    importer_info!("Closing processing tab");
                    self.tabs.close_processing(&self.page).await?;
                }
                Effect::ReturnToSource => self.tabs.switch_to_main(&self.page).await?,
            }
        }
        Ok(job)
    }
}
