mod commands;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use farmstand_lib::{load_directory, Settings};

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "farmstand")]
#[command(about = "Browse farmers markets, vendors, seasonal produce and community events")]
struct Cli {
    /// Output format: table, json, csv, or markdown
    #[arg(long, default_value = "table", global = true)]
    output: String,

    /// Settings file (defaults to ./farmstand.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List and filter markets
    Markets(commands::markets::MarketsArgs),
    /// Show one market with its hours, vendors and events
    Market(commands::markets::MarketArgs),
    /// List and filter vendors
    Vendors(commands::vendors::VendorsArgs),
    /// Show one vendor with its products and markets
    Vendor(commands::vendors::VendorArgs),
    /// Products in season for a month
    Seasonal(commands::seasonal::SeasonalArgs),
    /// Community events, upcoming or past
    Events(commands::events::EventsArgs),
    /// Community reviews, newest first
    Reviews(commands::reviews::ReviewsArgs),
    /// Export an event to a calendar
    Calendar(commands::calendar::CalendarArgs),
    /// Print the map viewport and markers
    Map(commands::map::MapArgs),
    /// Report references to missing records
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("farmstand=info".parse().unwrap()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let format = match cli.output.as_str() {
        "json" => OutputFormat::Json,
        "csv" => OutputFormat::Csv,
        "markdown" | "md" => OutputFormat::Markdown,
        _ => OutputFormat::Table,
    };

    let settings = Settings::load(cli.config.as_deref())?;
    let directory = load_directory(&settings)?;

    match &cli.command {
        Commands::Markets(args) => commands::markets::run(args, &directory, &settings, &format)?,
        Commands::Market(args) => commands::markets::run_detail(args, &directory, &format)?,
        Commands::Vendors(args) => commands::vendors::run(args, &directory, &settings, &format)?,
        Commands::Vendor(args) => commands::vendors::run_detail(args, &directory, &format)?,
        Commands::Seasonal(args) => commands::seasonal::run(args, &directory, &format)?,
        Commands::Events(args) => commands::events::run(args, &directory, &format)?,
        Commands::Reviews(args) => commands::reviews::run(args, &directory, &format)?,
        Commands::Calendar(args) => {
            commands::calendar::run(args, &directory, &settings, &format).await?
        }
        Commands::Map(args) => commands::map::run(args, &directory, &settings, &format).await?,
        Commands::Check => commands::check::run(&directory, &format)?,
    }

    Ok(())
}
