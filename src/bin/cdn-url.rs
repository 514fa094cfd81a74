use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use asset_cdn::{CdnConfig, CdnFacade, StaticRoot};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "cdn-url")]
#[command(about = "Print the CDN URL for local asset paths", long_about = None)]
struct Cli {
  /// Configuration file; defaults to cdn.config.json in the current directory.
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Directory holding mix-manifest.json and build/rev-manifest.json.
  #[arg(short, long, default_value = "public")]
  public_dir: PathBuf,

  /// Request root used when the CDN is bypassed.
  #[arg(short, long, default_value = "http://localhost")]
  root: String,

  /// Override the configured bypass flag.
  #[arg(long, env = "CDN_BYPASS", num_args = 0..=1, default_missing_value = "true")]
  bypass: Option<bool>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Files under the public directory
  Asset { paths: Vec<String> },
  /// Paths relative to the project root
  Path { paths: Vec<String> },
  /// Webpack mix assets
  Mix { paths: Vec<String> },
  /// Elixir versioned assets
  Elixir { paths: Vec<String> },
}

impl Commands {
  fn paths(&self) -> &[String] {
    match self {
      Self::Asset { paths } | Self::Path { paths } | Self::Mix { paths } | Self::Elixir { paths } => {
        paths
      }
    }
  }
}

/// Read the configuration named on the command line and apply the bypass override.
fn load_config(cli: &Cli) -> Result<CdnConfig> {
  let mut config = match &cli.config {
    Some(path) => CdnConfig::from_path(path)?,
    None => CdnConfig::discover(Path::new("."))?,
  };
  if let Some(bypass) = cli.bypass {
    config.bypass = bypass;
  }
  Ok(config)
}

fn main() -> Result<()> {
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
    )
    .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
    .init();

  let cli = Cli::parse();

  let config = load_config(&cli)?;
  let cdn = CdnFacade::new(config, &cli.public_dir, Arc::new(StaticRoot::new(cli.root)))
    .context("failed to initialise CDN provider")?;

  for path in cli.command.paths() {
    let url = match &cli.command {
      Commands::Asset { .. } => cdn.asset(path.as_str(), None),
      Commands::Path { .. } => cdn.path(path.as_str()),
      Commands::Mix { .. } => cdn.mix(path),
      Commands::Elixir { .. } => cdn.elixir(path),
    }
    .with_context(|| format!("failed to resolve {path}"))?;
    println!("{url}");
  }

  Ok(())
}
