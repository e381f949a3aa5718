use anyhow::{anyhow, Result};
use chrono::Utc;
use clap::Args;
use farmstand_lib::validation;
use farmstand_lib::{Directory, EventQuery, Query};

use crate::output::{build_event_rows, print_json, print_rows, OutputFormat};

#[derive(Args)]
pub struct EventsArgs {
    /// Which events: all, upcoming, past (defaults to all)
    #[arg(long, default_value = "all")]
    pub filter: String,

    /// Only events at this market ID
    #[arg(long)]
    pub market: Option<String>,

    /// Earliest event date (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<String>,

    /// Latest event date (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<String>,

    /// Search by title or description
    #[arg(long)]
    pub search: Option<String>,

    /// Maximum number of results
    #[arg(long)]
    pub limit: Option<usize>,

    /// Treat this date (YYYY-MM-DD) as today when splitting upcoming from past
    #[arg(long)]
    pub now: Option<String>,
}

pub fn run(args: &EventsArgs, directory: &Directory, format: &OutputFormat) -> Result<()> {
    let now = match &args.now {
        Some(d) => validation::validate_date(d)?
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc())
            .ok_or_else(|| anyhow!("invalid --now date {}", d))?,
        None => Utc::now(),
    };

    let filter = validation::validate_event_filter(&args.filter)?;
    let mut query = EventQuery::at(now).with_filter(filter);

    if let Some(market) = &args.market {
        let market = market.trim();
        if directory.market(market).is_none() {
            return Err(anyhow!("No market with ID {}", market));
        }
        query = query.with_market(market);
    }

    let from = args.from.as_deref().map(validation::validate_date).transpose()?;
    let to = args.to.as_deref().map(validation::validate_date).transpose()?;
    if let (Some(from), Some(to)) = (from, to) {
        if from > to {
            return Err(anyhow!("--from {} is after --to {}", from, to));
        }
    }
    query = query.with_date_range(from, to);

    if let Some(search) = &args.search {
        let validated = validation::validate_search(search)?;
        query = query.with_search(&validated);
    }
    if let Some(limit) = args.limit {
        query = query.with_limit(validation::validate_limit(limit)?);
    }

    let events = directory.search(&query);
    eprintln!("{} events", events.len());

    match format {
        OutputFormat::Json => print_json(&events),
        _ => print_rows(&build_event_rows(directory, &events), format)?,
    }

    Ok(())
}
