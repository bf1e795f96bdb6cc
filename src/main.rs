//! dirlist - print a directory listing from a listing service
//!
//! # Usage
//! ```bash
//! dirlist /browse/photos --origin http://127.0.0.1:8080
//! dirlist /browse --config dirlist.json --thumbnails
//! ```

use std::io;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dirlist_client::{
    ClientConfig, HttpListingSource, ListingClient, LoadOutcome, Navigator, TextRenderer,
};

/// Browse a JSON directory-listing service from the terminal
#[derive(Parser)]
#[command(name = "dirlist")]
#[command(about = "Print a directory listing from a listing service", long_about = None)]
struct Cli {
    /// Location to browse, under the mount prefix
    #[arg(value_name = "LOCATION")]
    location: Option<String>,

    /// Base URL of the listing service
    #[arg(long)]
    origin: Option<String>,

    /// Base URL thumbnails are resolved against
    #[arg(long)]
    thumb_origin: Option<String>,

    /// Mount prefix every location must start with
    #[arg(long)]
    mount: Option<String>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    /// Print a thumbnail URL for each entry
    #[arg(long)]
    thumbnails: bool,
}

/// Terminal navigation: redirects are reported and then followed by `main`
struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn replace(&self, location: &str) {
        eprintln!("→ redirecting to {}", location);
    }
}

async fn build_config(cli: &Cli) -> anyhow::Result<ClientConfig> {
    let mut config = match (&cli.config, &cli.origin) {
        (Some(path), _) => ClientConfig::from_file(path).await?,
        (None, Some(origin)) => ClientConfig::new(origin.clone()),
        (None, None) => anyhow::bail!("either --origin or --config is required"),
    };

    if let Some(origin) = &cli.origin {
        config.listing_origin = origin.clone();
    }
    if let Some(origin) = &cli.thumb_origin {
        config.thumbnail_origin = Some(origin.clone());
    }
    if let Some(mount) = &cli.mount {
        config.mount_prefix = mount.clone();
    }
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = build_config(&cli).await?;

    let mut renderer = TextRenderer::new(io::stdout()).with_formatter(config.relative_time());
    if cli.thumbnails {
        renderer = renderer.with_thumbnails(config.thumbnail_origin().to_string());
    }

    let source = Arc::new(HttpListingSource::new(
        config.listing_origin.clone(),
        config.request_timeout(),
    ));
    let location = cli
        .location
        .clone()
        .unwrap_or_else(|| config.mount_prefix.clone());
    let client = ListingClient::new(source, config);

    let mut outcome = client.load(&location, &TerminalNavigator, &renderer).await;
    if let LoadOutcome::Redirected { to } = &outcome {
        let to = to.clone();
        outcome = client.load(&to, &TerminalNavigator, &renderer).await;
    }

    match outcome {
        LoadOutcome::Rendered(_) => Ok(()),
        LoadOutcome::Failed { error, .. } => Err(error.into()),
        LoadOutcome::Redirected { to } => anyhow::bail!("redirect loop at {}", to),
        LoadOutcome::Discarded { logical_path } => {
            anyhow::bail!("listing for {} was superseded", logical_path)
        }
    }
}
