mod check;
mod prompt;
mod sync;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use check::CheckArgs;
use sync::SyncArgs;

#[derive(Debug, Parser)]
#[command(name = "catsync")]
#[command(about = "Sync a product master sheet into a Shopify catalog")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Create or update one product per series and one variant per row (default)
    Sync(SyncArgs),
    /// Register the variant metafield definitions only
    Definitions,
    /// Print the metafields stored on variants
    Check(CheckArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = catsync_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let command = cli.command.unwrap_or_else(|| Commands::Sync(SyncArgs::default()));
    if let Commands::Sync(SyncArgs { csv: Some(path), .. }) = &command {
        config.csv_path.clone_from(path);
    }

    let client = catsync_shopify::AdminClient::from_app_config(&config)?;
    tracing::debug!(?config, "configuration loaded");

    match command {
        Commands::Sync(args) => sync::run_sync(&client, &config, &args).await?,
        Commands::Definitions => {
            let totals = sync::definitions::register_definitions(&client, &config).await;
            println!(
                "{} created, {} already present, {} failed",
                totals.created, totals.existing, totals.failed
            );
        }
        Commands::Check(args) => check::run_check(&client, &config, &args).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests;
