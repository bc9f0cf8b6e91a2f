mod searches;

use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "gridrank-cli")]
#[command(about = "Inspect stored grid rank searches")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List the most recent grid searches
    Recent {
        /// Maximum number of searches to show
        #[arg(long, default_value = "10")]
        limit: i64,
    },
    /// Print the aggregated grid of a search as JSON
    Show {
        #[command(flatten)]
        search: SearchSelector,
    },
    /// Print a visibility report for one business in a search
    Report {
        #[command(flatten)]
        search: SearchSelector,
        /// Business to report on (defaults to the search's target business)
        #[arg(long)]
        business: Option<String>,
    },
    /// Show lattice geometry for a radius and grid size
    Grid {
        #[arg(long, default_value = "5")]
        radius_miles: f64,
        #[arg(long, default_value = "13")]
        grid_size: u32,
    },
}

/// Which stored search to operate on; the latest one when nothing is given.
#[derive(Debug, Clone, Default, Args)]
struct SearchSelector {
    /// Search id; takes precedence over the filters
    #[arg(long)]
    id: Option<Uuid>,
    /// Case-insensitive city filter
    #[arg(long)]
    city: Option<String>,
    /// Case-insensitive search term filter
    #[arg(long)]
    search_term: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("warn"))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("gridrank-cli ready; run with --help for commands");
        return Ok(());
    };

    if let Commands::Grid {
        radius_miles,
        grid_size,
    } = command
    {
        return searches::run_grid(radius_miles, grid_size);
    }

    let config = gridrank_core::load_app_config_from_env()?;
    let pool_config = gridrank_db::PoolConfig::from_app_config(&config);
    let pool = gridrank_db::connect_pool(&config.database_url, pool_config).await?;
    let timeout = Duration::from_secs(config.request_timeout_secs);

    let work = async {
        match command {
            Commands::Recent { limit } => searches::run_recent(&pool, limit).await,
            Commands::Show { search } => {
                searches::run_show(&pool, &search, config.target_match).await
            }
            Commands::Report { search, business } => {
                searches::run_report(&pool, &search, business.as_deref(), config.target_match)
                    .await
            }
            // handled before connecting
            Commands::Grid { .. } => Ok(()),
        }
    };

    tokio::time::timeout(timeout, work)
        .await
        .map_err(|_| anyhow::anyhow!("timed out after {}s", timeout.as_secs()))?
}
