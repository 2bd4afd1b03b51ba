mod commands;

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use shopdesk_core::{ApiClient, ClientConfig, DEFAULT_BASE_URL};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// shopdesk - shop inventory, sales and dues from the terminal
///
/// Reads fall back to empty data when the backend is unreachable; mutations
/// fail with the server's reason.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// API origin
    #[arg(
        long = "api-base",
        env = "SHOPDESK_API_BASE",
        value_name = "URL",
        default_value = DEFAULT_BASE_URL,
        global = true
    )]
    api_base: String,

    /// Seconds to wait for the server before giving up
    #[arg(long, value_name = "SECS", default_value_t = 15, global = true)]
    timeout: u64,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// List products
    Products {
        /// Only products at or below their reorder point
        #[arg(long)]
        low_stock: bool,
    },

    /// List recorded sales, newest first
    Sales,

    /// List customer dues
    Dues {
        /// Only unsettled dues
        #[arg(long)]
        pending: bool,
    },

    /// Show dashboard KPIs
    Summary,

    /// Best-selling products and revenue share per category
    Top {
        /// How many products to rank (1-20)
        #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u32).range(1..=20))]
        limit: u32,
    },

    /// Latest sales and dues, newest first
    Activity {
        /// How many entries to show (1-50)
        #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..=50))]
        limit: u32,
    },

    /// Project a product's daily demand
    Forecast {
        #[arg(value_name = "ID")]
        id: i64,
        /// Days ahead to project (1-60)
        #[arg(long, default_value_t = 7, value_parser = clap::value_parser!(u32).range(1..=60))]
        days: u32,
    },

    /// Mark a due as settled
    Settle {
        #[arg(value_name = "ID")]
        id: i64,
    },

    /// Move a product's stock up or down (never below zero)
    Adjust {
        #[arg(value_name = "ID")]
        id: i64,
        #[arg(value_name = "DELTA", allow_negative_numbers = true)]
        delta: i64,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = ClientConfig::new(&cli.api_base).with_timeout(Duration::from_secs(cli.timeout));
    let client = ApiClient::with_reqwest(config);

    let output = match cli.command {
        Commands::Products { low_stock } => commands::products(&client, low_stock).await,
        Commands::Sales => commands::sales(&client).await,
        Commands::Dues { pending } => commands::dues(&client, pending).await,
        Commands::Summary => commands::summary(&client).await,
        Commands::Top { limit } => commands::top(&client, limit).await,
        Commands::Activity { limit } => commands::activity(&client, limit).await,
        Commands::Forecast { id, days } => commands::forecast(&client, id, days).await?,
        Commands::Settle { id } => commands::settle(&client, id).await?,
        Commands::Adjust { id, delta } => commands::adjust(&client, id, delta).await?,
    };
    print!("{output}");
    Ok(())
}
