use importer_logging::{importer_info, importer_warn};

use crate::selectors::{
    edit_banner, enter_edit_button, external_id_links, isrc_check_button, isrc_submit,
    isrc_success, magic_isrc_link, rewrite_target_links_script,
};
use crate::{ImportError, ImportSession, Page};

impl<P: Page> ImportSession<P> {
    /// Registers the album's ISRCs through MagicISRC.
    ///
    /// Best effort: failures inside the tool are logged and dropped. Only a
    /// failure to get back to the processing tab is returned.
    pub async fn submit_isrcs(&mut self) -> Result<(), ImportError> {
        importer_info!("Processing ISRC submission");
        let link = match self
            .wait_for(magic_isrc_link(), self.timings.default_wait)
            .await
        {
            Ok(link) => link,
            Err(err) => {
                importer_warn!("MagicISRC link unavailable, skipping ISRCs: {}", err);
                return Ok(());
            }
        };
        if let Err(err) = self
            .tabs
            .open_in_new_tab(&self.page, &self.waiter, &link, self.timings.default_wait)
            .await
        {
            importer_warn!("Could not open MagicISRC, skipping ISRCs: {}", err);
            return Ok(());
        }

        if let Err(err) = self.submit_isrcs_in_open_tab().await {
            importer_warn!("ISRC submission failed, continuing without it: {}", err);
        }
        importer_info!("Closing MagicISRC tab");
        self.tabs.close_and_return_to_processing(&self.page).await
    }

    async fn submit_isrcs_in_open_tab(&self) -> Result<(), ImportError> {
        let timeout = self.timings.default_wait;
        // The check button shows once the tool has loaded the release.
        self.wait_for(isrc_check_button(), timeout).await?;
        let fresh_login = self.authorize_isrc_tool().await?;

        let submit = self.wait_for(isrc_submit(), timeout).await?;
        if fresh_login {
            self.tabs.save_authenticated_profile(&self.page).await?;
        }
        self.page.click(&submit).await?;
        self.wait_for(isrc_success(), timeout).await?;
        importer_info!("ISRCs submitted");
        Ok(())
    }

    /// Enters the external-ID edit of every track link on the processing page.
    pub async fn link_external_ids(&mut self) -> Result<usize, ImportError> {
        let links = self.page.find_all(&external_id_links()).await?;
        importer_info!("Found {} track external ID links to process", links.len());

        for (index, link) in links.iter().enumerate() {
            importer_info!("Linking external IDs {}/{}", index + 1, links.len());
            self.tabs
                .open_in_new_tab(&self.page, &self.waiter, link, self.timings.default_wait)
                .await?;
            let submitted = self.submit_external_ids().await;
            let restored = self.tabs.close_and_return_to_processing(&self.page).await;
            submitted?;
            restored?;
        }
        Ok(links.len())
    }

    async fn submit_external_ids(&self) -> Result<(), ImportError> {
        let submit = self
            .wait_for(enter_edit_button(), self.timings.edit_wait)
            .await?;
        self.page.click(&submit).await?;
        self.wait_for(edit_banner(), self.timings.long_wait).await?;
        Ok(())
    }

    /// Points database links and forms of the active page at the configured server.
    pub(crate) async fn rewrite_target_links(&self) -> Result<(), ImportError> {
        let host = self.config.target_server().host();
        let changed = self
            .page
            .evaluate(&rewrite_target_links_script(host))
            .await?;
        importer_info!(
            "Rewrote {} MusicBrainz links to {}",
            changed.as_u64().unwrap_or_default(),
            host
        );
        Ok(())
    }
}
