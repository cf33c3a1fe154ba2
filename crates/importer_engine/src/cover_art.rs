use std::path::{Path, PathBuf};

use importer_core::{
    candidate_urls, parse_existing_cover_count, BestCandidate, CoverArtCandidate, Locator,
};
use importer_logging::{importer_debug, importer_info};

use crate::filename::cover_filename;
use crate::selectors::{
    add_cover_art_link, cover_count_label, cover_figures, cover_image, cover_link,
    cover_thanks, enter_edit_button, file_input, front_type,
};
use crate::{ImportError, ImportSession, Page};

/// What happened to the chosen cover on the upload page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoverUpload {
    Uploaded(PathBuf),
    /// The release already had `existing` covers; nothing was sent.
    Skipped { existing: u32 },
}

impl<P: Page> ImportSession<P> {
    /// Picks the largest cover, saves it and attaches it to the release.
    pub async fn attach_cover_art(&mut self) -> Result<CoverUpload, ImportError> {
        let best = self.select_cover().await?;
        let path = self.covers.write(&cover_filename(&best.source_url), &best.bytes)?;
        importer_info!(
            "Selected cover art from {} with size {}x{}, saved to {:?}",
            best.source_url,
            best.width,
            best.height,
            path
        );

        let add = self
            .wait_for(add_cover_art_link(), self.timings.default_wait)
            .await?;
        self.tabs
            .open_in_new_tab(&self.page, &self.waiter, &add, self.timings.default_wait)
            .await?;
        let uploaded = self.upload_cover(&path).await;
        let restored = self.tabs.close_and_return_to_processing(&self.page).await;
        let outcome = uploaded?;
        restored?;
        Ok(outcome)
    }

    /// Scans every cover element and keeps the candidate with the largest area.
    pub async fn select_cover(&self) -> Result<CoverArtCandidate, ImportError> {
        importer_info!("Finding cover art candidates");
        let figures = self
            .wait_for_all(cover_figures(), self.timings.default_wait)
            .await?;
        importer_info!("Found {} cover art candidates", figures.len());

        let mut best = BestCandidate::new();
        for figure in &figures {
            let href = self.attribute_of_child(figure, cover_link(), "href").await?;
            let src = self.attribute_of_child(figure, cover_image(), "src").await?;
            for url in candidate_urls(href.as_deref(), src.as_deref()) {
                match self.measure(&url).await {
                    Ok(candidate) => {
                        if best.offer(candidate) {
                            importer_debug!("New best cover candidate {}", url);
                        }
                    }
                    Err(reason) => {
                        importer_debug!("Skipping cover candidate {}: {}", url, reason)
                    }
                }
            }
        }
        best.into_best().ok_or(ImportError::NoValidImages)
    }

    async fn attribute_of_child(
        &self,
        parent: &P::Element,
        locator: Locator,
        name: &str,
    ) -> Result<Option<String>, ImportError> {
        match self.page.find_in(parent, &locator).await? {
            Some(child) => Ok(self.page.attribute(&child, name).await?),
            None => Ok(None),
        }
    }

    async fn measure(&self, url: &str) -> Result<CoverArtCandidate, String> {
        let output = self.fetcher.fetch(url).await.map_err(|e| e.to_string())?;
        let image = image::load_from_memory(&output.bytes).map_err(|e| e.to_string())?;
        Ok(CoverArtCandidate {
            source_url: url.to_string(),
            width: image.width(),
            height: image.height(),
            bytes: output.bytes,
        })
    }

    async fn upload_cover(&self, path: &Path) -> Result<CoverUpload, ImportError> {
        let timeout = self.timings.default_wait;
        let input = self.wait_for(file_input(), timeout).await?;

        let count_label = self.wait_for(cover_count_label(), timeout).await?;
        let count_text = self.page.text(&count_label).await?;
        if let Some(existing) = parse_existing_cover_count(&count_text).filter(|n| *n > 0) {
            importer_info!("Cover art already exists ({} images), skipping upload", existing);
            return Ok(CoverUpload::Skipped { existing });
        }

        self.page.set_file(&input, path).await?;
        let front = self.wait_for(front_type(), timeout).await?;
        self.page.click(&front).await?;

        importer_info!("Uploading cover art");
        let submit = self.wait_for(enter_edit_button(), timeout).await?;
        self.page.click(&submit).await?;
        self.wait_for(cover_thanks(), self.timings.long_wait).await?;
        importer_info!("Cover art submission complete");
        Ok(CoverUpload::Uploaded(path.to_path_buf()))
    }
}
