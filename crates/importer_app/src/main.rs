mod platform;

use clap::Parser;
use importer_logging::importer_error;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = platform::Cli::parse();
    platform::initialize_logging(cli.verbose);

    if let Err(err) = platform::run(cli).await {
        importer_error!("{:#}", err);
        return Err(err);
    }
    Ok(())
}
