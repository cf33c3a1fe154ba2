use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;
use importer_engine::{
    FetchSettings, ImportSession, Ports, ReqwestFetcher, SessionSettings, Timings,
};
use importer_logging::{importer_info, importer_warn};

use super::browser::{ChromiumPage, LaunchOptions};
use super::cli::Cli;
use super::clipboard::SystemClipboard;
use super::config::load_config;
use super::terminal::TerminalOperator;
use super::workspace::Workspace;

pub async fn run(cli: Cli) -> Result<()> {
    let config = cli.apply_overrides(load_config(&cli.config)?);
    let urls = cli.album_urls()?;
    let credentials = cli.credentials(&config);
    match &credentials {
        Some(credentials) => importer_info!("Logging in as {}", credentials.username),
        None => importer_warn!("MB_USER/MB_PASS not set, login will be interactive"),
    }
    importer_info!(
        "Importing {} album(s) into {} with {:?}",
        urls.len(),
        config.target_server().host(),
        config
    );

    let fetcher =
        ReqwestFetcher::new(FetchSettings::default()).context("building the image fetcher")?;
    let workspace = Workspace::init(&cli.workspace)?;
    let page = ChromiumPage::launch(LaunchOptions {
        profile_dir: workspace.browser_dir().to_path_buf(),
        executable: cli.chrome.clone(),
    })
    .await
    .context("launching the browser")?;

    let ports = Ports {
        operator: Arc::new(TerminalOperator),
        clipboard: Arc::new(SystemClipboard),
        fetcher: Arc::new(fetcher),
    };
    let settings = SessionSettings {
        config,
        credentials,
        timings: Timings::default(),
        covers_dir: workspace.covers_dir(),
        profile_dir: workspace.profile_dir(),
    };
    let mut session = ImportSession::new(page, ports, settings);

    let started = Local::now();
    let outcome = session.run_batch(&urls).await;
    let elapsed = Local::now() - started;

    session.into_page().shutdown().await;
    workspace.teardown();

    let summary = outcome.context("import stopped")?;
    importer_info!(
        "Finished {} album(s) in {}s: {} imported, {} already linked",
        urls.len(),
        elapsed.num_seconds(),
        summary.imported,
        summary.already_linked
    );
    Ok(())
}
