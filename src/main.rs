use cinescrape::cli::Cli;
use clap::Parser;
use tracing::{debug, Level};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    debug!("Starting cinescrape v{}", env!("CARGO_PKG_VERSION"));

    cli.run().await?;

    Ok(())
}
