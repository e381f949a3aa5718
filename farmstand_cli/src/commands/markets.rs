use anyhow::{anyhow, Result};
use clap::Args;
use farmstand_lib::community::{average_rating, featured_markets};
use farmstand_lib::types::{Coordinates, Market};
use farmstand_lib::validation;
use farmstand_lib::{Directory, MarketQuery, Query, Settings, SortDirection};
use serde::Serialize;

use super::today;
use crate::output::{
    build_event_rows, build_hours_rows, build_market_rows, build_vendor_rows, hours_lines,
    print_json, print_rows, OutputFormat,
};

#[derive(Args)]
pub struct MarketsArgs {
    /// Search by name, city, or state
    #[arg(long)]
    pub search: Option<String>,

    /// Only markets near a point, as LAT,LNG (e.g. 45.522,-122.677)
    #[arg(long)]
    pub near: Option<String>,

    /// Radius for --near, in kilometres
    #[arg(long, default_value = "10")]
    pub radius: f64,

    /// Require a feature tag, e.g. "Pet Friendly" (repeatable)
    #[arg(long)]
    pub feature: Vec<String>,

    /// Sort field: listing, name, distance
    #[arg(long, default_value = "listing")]
    pub sort_by: String,

    /// Sort descending instead of ascending
    #[arg(long)]
    pub desc: bool,

    /// Maximum number of results
    #[arg(long)]
    pub limit: Option<usize>,

    /// Only the featured markets
    #[arg(long)]
    pub featured: bool,
}

#[derive(Args)]
pub struct MarketArgs {
    /// Market ID
    pub id: String,
}

/// Markets matching `args`, with the origin used for distances. The limit
/// applies after the featured filter.
fn select_markets<'d>(
    args: &MarketsArgs,
    directory: &'d Directory,
    settings: &Settings,
) -> Result<(Vec<&'d Market>, Option<Coordinates>)> {
    let mut query = MarketQuery::default();

    if let Some(search) = &args.search {
        let validated = validation::validate_search(search)?;
        query = query.with_search(&validated);
    }

    let mut origin = settings.geolocation.home;
    if let Some(near) = &args.near {
        let center = validation::validate_coordinates(near)?;
        let radius = validation::validate_radius(args.radius)?;
        query = query.with_near(center, radius);
        origin = Some(center);
    } else if let Some(home) = origin {
        query = query.with_origin(home);
    }

    for feature in &args.feature {
        let validated = validation::validate_search(feature)?;
        query = query.with_feature(&validated);
    }

    query = query.with_sort_by(validation::validate_market_sort(&args.sort_by)?);
    if args.desc {
        query = query.with_sort_direction(SortDirection::Desc);
    }

    let limit = args.limit.map(validation::validate_limit).transpose()?;

    let mut markets = directory.search(&query);
    if args.featured {
        let featured = featured_markets(directory, settings.featured_markets);
        markets.retain(|m| featured.iter().any(|f| f.id == m.id));
    }
    if let Some(limit) = limit {
        markets.truncate(limit);
    }

    Ok((markets, origin))
}

pub fn run(
    args: &MarketsArgs,
    directory: &Directory,
    settings: &Settings,
    format: &OutputFormat,
) -> Result<()> {
    let (markets, origin) = select_markets(args, directory, settings)?;

    eprintln!("{} markets", markets.len());

    match format {
        OutputFormat::Json => print_json(&markets),
        _ => print_rows(&build_market_rows(&markets, today(), origin), format)?,
    }

    Ok(())
}

#[derive(Serialize)]
struct MarketDetail<'a> {
    #[serde(flatten)]
    market: &'a Market,
    #[serde(rename = "averageRating")]
    average_rating: Option<f64>,
    today: Vec<String>,
}

pub fn run_detail(args: &MarketArgs, directory: &Directory, format: &OutputFormat) -> Result<()> {
    let market = directory
        .market(args.id.trim())
        .ok_or_else(|| anyhow!("No market with ID {}", args.id))?;
    let day = today();

    if let OutputFormat::Json = format {
        print_json(&MarketDetail {
            market,
            average_rating: average_rating(market),
            today: hours_lines(market, day),
        });
        return Ok(());
    }

    print_rows(&build_market_rows(&[market], day, None), format)?;
    for line in hours_lines(market, day) {
        eprintln!("{}", line);
    }

    eprintln!("\nHours");
    print_rows(&build_hours_rows(market), format)?;

    let vendors = directory.vendors_at(market);
    eprintln!("\nVendors ({})", vendors.len());
    print_rows(&build_vendor_rows(directory, &vendors), format)?;

    let events = directory.events_at(market);
    eprintln!("\nEvents ({})", events.len());
    print_rows(&build_event_rows(directory, &events), format)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> MarketsArgs {
        MarketsArgs {
            search: None,
            near: None,
            radius: 10.0,
            feature: Vec::new(),
            sort_by: "listing".to_string(),
            desc: false,
            limit: None,
            featured: false,
        }
    }

    fn ids(markets: &[&Market]) -> Vec<String> {
        markets.iter().map(|m| m.id.clone()).collect()
    }

    #[test]
    fn test_limit_applies_after_featured_filter() {
        let dir = Directory::from_seed().unwrap();
        let settings = Settings {
            featured_markets: 2,
            ..Settings::default()
        };
        let args = MarketsArgs {
            sort_by: "name".to_string(),
            limit: Some(2),
            featured: true,
            ..args()
        };
        let (markets, _) = select_markets(&args, &dir, &settings).unwrap();
        // Name order is Downtown, Hillside, Riverside; only 1 and 2 are featured.
        assert_eq!(ids(&markets), vec!["1", "2"]);
    }

    #[test]
    fn test_limit_without_featured() {
        let dir = Directory::from_seed().unwrap();
        let args = MarketsArgs {
            limit: Some(1),
            ..args()
        };
        let (markets, origin) = select_markets(&args, &dir, &Settings::default()).unwrap();
        assert_eq!(ids(&markets), vec!["1"]);
        assert!(origin.is_none());
    }

    #[test]
    fn test_zero_limit_is_rejected() {
        let dir = Directory::from_seed().unwrap();
        let args = MarketsArgs {
            limit: Some(0),
            ..args()
        };
        assert!(select_markets(&args, &dir, &Settings::default()).is_err());
    }
}
