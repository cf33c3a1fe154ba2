use importer_logging::{importer_info, importer_warn};

use crate::operator::Escalation;
use crate::selectors::{
    allow_access_button, isrc_login_button, password_input, remember_me, username_input,
    ISRC_LOGIN_MARKER, LOGIN_TITLE_PREFIX,
};
use crate::{ImportError, ImportSession, Page};

impl<P: Page> ImportSession<P> {
    /// Logs in to the database when the active tab shows its login form.
    /// Returns `true` for a fresh login, `false` when the session was already
    /// authenticated.
    pub(crate) async fn log_in_if_required(&self) -> Result<bool, ImportError> {
        let title = self.page.title().await?;
        if !title.starts_with(LOGIN_TITLE_PREFIX) {
            importer_info!("Already logged in to MusicBrainz");
            return Ok(false);
        }

        importer_info!("Login to MusicBrainz required");
        match &self.credentials {
            Some(credentials) => {
                let timeout = self.timings.default_wait;
                let username = self.wait_for(username_input(), timeout).await?;
                self.page.type_text(&username, &credentials.username).await?;
                let password = self.wait_for(password_input(), timeout).await?;
                self.page.type_text(&password, &credentials.password).await?;
                let remember = self.wait_for(remember_me(), timeout).await?;
                self.page.click(&remember).await?;
                self.page.submit(&remember).await?;
                importer_info!("Submitted login for {}", credentials.username);
            }
            None => {
                importer_warn!("No credentials configured, asking for an interactive login");
                self.escalate(Escalation::InteractiveLogin)
                    .await
                    .map_err(|_| ImportError::CredentialsMissing)?;
            }
        }
        Ok(true)
    }

    /// Authorizes the ISRC tool against the database when it asks for it.
    /// Returns `true` for a fresh authorization.
    pub(crate) async fn authorize_isrc_tool(&self) -> Result<bool, ImportError> {
        let body = self.page.body_text().await?;
        if !body.contains(ISRC_LOGIN_MARKER) {
            importer_info!("MagicISRC is already authorized");
            return Ok(false);
        }

        importer_info!("Authorizing MagicISRC");
        let timeout = self.timings.default_wait;
        let login = self.wait_for(isrc_login_button(), timeout).await?;
        self.page.click(&login).await?;
        let allow = self.wait_for(allow_access_button(), timeout).await?;
        self.page.click(&allow).await?;

        self.settle(self.timings.tab_settle).await;
        self.page.refresh().await?;
        Ok(true)
    }
}
