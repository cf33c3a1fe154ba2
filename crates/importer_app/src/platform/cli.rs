//! Command-line surface of the importer.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use importer_core::{Credentials, ImportConfig};

/// Imports streaming-service albums into MusicBrainz through Harmony.
///
/// The browser profile under the workspace directory holds the MusicBrainz
/// login. Running two importers against the same workspace is not supported.
#[derive(Parser, Debug)]
#[command(name = "importer")]
#[command(version)]
pub struct Cli {
    /// Album URLs to import, in order
    #[arg(value_name = "URL")]
    pub urls: Vec<String>,

    /// File with one album URL per line; blank lines and `#` comments are ignored
    #[arg(long, value_name = "FILE")]
    pub url_file: Option<PathBuf>,

    /// RON file with the run switches
    #[arg(long, value_name = "FILE", default_value = "importer.ron")]
    pub config: PathBuf,

    /// Directory holding the saved browser profile and downloaded cover art
    #[arg(long, value_name = "DIR", default_value = "workspace")]
    pub workspace: PathBuf,

    /// Chromium or Chrome executable; auto-detected when omitted
    #[arg(long, value_name = "FILE", env = "CHROME_PATH")]
    pub chrome: Option<PathBuf>,

    /// Wait for confirmation when an album is already linked to a release
    #[arg(long)]
    pub pause_on_found_release: bool,

    /// Publish edits without a final review prompt
    #[arg(long)]
    pub no_manual_review: bool,

    /// Close the MusicBrainz tab once an album is done
    #[arg(long)]
    pub close_processing_tab: bool,

    /// Copy the release MBID to the clipboard
    #[arg(long)]
    pub copy_release_id: bool,

    /// Ask before dropping a label that does not match its search result
    #[arg(long)]
    pub manual_label_selection: bool,

    /// Target test.musicbrainz.org instead of musicbrainz.org
    #[arg(long)]
    pub test_server: bool,

    /// MusicBrainz username
    #[arg(long, env = "MB_USER", hide_env_values = true)]
    pub username: Option<String>,

    /// MusicBrainz password (ignored on the test server)
    #[arg(long, env = "MB_PASS", hide_env_values = true)]
    pub password: Option<String>,

    /// Log debug output to the terminal
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Layers the command-line switches over the file configuration.
    /// A flag can only turn its switch on, except `--no-manual-review`.
    pub fn apply_overrides(&self, mut config: ImportConfig) -> ImportConfig {
        config.pause_on_found_release |= self.pause_on_found_release;
        config.close_processing_tab_after_processing |= self.close_processing_tab;
        config.copy_release_id_to_clipboard |= self.copy_release_id;
        config.manual_label_selection |= self.manual_label_selection;
        config.use_test_server |= self.test_server;
        if self.no_manual_review {
            config.manual_review_before_publish = false;
        }
        config
    }

    pub fn credentials(&self, config: &ImportConfig) -> Option<Credentials> {
        Credentials::resolve(
            self.username.clone(),
            self.password.clone(),
            config.target_server(),
        )
    }

    /// Positional URLs first, then the URL file in file order.
    pub fn album_urls(&self) -> Result<Vec<String>> {
        let mut urls: Vec<String> = self
            .urls
            .iter()
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .collect();
        if let Some(path) = &self.url_file {
            let content = fs::read_to_string(path)
                .with_context(|| format!("reading URL file {}", path.display()))?;
            urls.extend(parse_url_list(&content));
        }
        if urls.is_empty() {
            bail!("no album URLs given; pass them as arguments or with --url-file");
        }
        Ok(urls)
    }
}

pub fn parse_url_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}
