use anyhow::{anyhow, Result};
use clap::Args;
use farmstand_lib::community::vendor_spotlight;
use farmstand_lib::types::{Product, Vendor};
use farmstand_lib::validation;
use farmstand_lib::{Directory, Query, Settings, VendorQuery};
use serde::Serialize;

use super::today;
use crate::output::{
    build_market_rows, build_product_rows, build_vendor_rows, print_json, print_rows,
    OutputFormat,
};

#[derive(Args)]
pub struct VendorsArgs {
    /// Search by vendor name or description
    #[arg(long)]
    pub search: Option<String>,

    /// Filter by product category: vegetable, fruit, dairy, meat, bakery, specialty
    #[arg(long)]
    pub category: Option<String>,

    /// Only vendors attending this market ID
    #[arg(long)]
    pub market: Option<String>,

    /// Only featured vendors (the spotlight)
    #[arg(long)]
    pub featured: bool,

    /// Maximum number of results
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Args)]
pub struct VendorArgs {
    /// Vendor ID
    pub id: String,
}

/// Vendors matching `args`. The limit applies after the spotlight filter.
fn select_vendors<'d>(
    args: &VendorsArgs,
    directory: &'d Directory,
    settings: &Settings,
) -> Result<Vec<&'d Vendor>> {
    let mut query = VendorQuery::default();

    if let Some(search) = &args.search {
        let validated = validation::validate_search(search)?;
        query = query.with_search(&validated);
    }
    if let Some(category) = &args.category {
        query = query.with_category(validation::validate_category(category)?);
    }
    if let Some(market) = &args.market {
        let market = market.trim();
        if directory.market(market).is_none() {
            return Err(anyhow!("No market with ID {}", market));
        }
        query = query.with_market(market);
    }
    if args.featured {
        query = query.featured_only();
    }
    let limit = args.limit.map(validation::validate_limit).transpose()?;

    let mut vendors = directory.search(&query);
    if args.featured {
        let spotlight = vendor_spotlight(directory, settings.spotlight_vendors);
        vendors.retain(|v| spotlight.iter().any(|s| s.id == v.id));
    }
    if let Some(limit) = limit {
        vendors.truncate(limit);
    }
    Ok(vendors)
}

pub fn run(
    args: &VendorsArgs,
    directory: &Directory,
    settings: &Settings,
    format: &OutputFormat,
) -> Result<()> {
    let vendors = select_vendors(args, directory, settings)?;

    eprintln!("{} vendors", vendors.len());

    match format {
        OutputFormat::Json => print_json(&vendors),
        _ => print_rows(&build_vendor_rows(directory, &vendors), format)?,
    }

    Ok(())
}

#[derive(Serialize)]
struct VendorDetail<'a> {
    #[serde(flatten)]
    vendor: &'a Vendor,
    /// Full records for the ids under `products`.
    #[serde(rename = "productDetails")]
    product_details: Vec<&'a Product>,
}

pub fn run_detail(args: &VendorArgs, directory: &Directory, format: &OutputFormat) -> Result<()> {
    let vendor = directory
        .vendor(args.id.trim())
        .ok_or_else(|| anyhow!("No vendor with ID {}", args.id))?;
    let products = directory.products_of(vendor);

    if let OutputFormat::Json = format {
        print_json(&VendorDetail {
            vendor,
            product_details: products,
        });
        return Ok(());
    }

    print_rows(&build_vendor_rows(directory, &[vendor]), format)?;
    if let Some(contact) = &vendor.contact {
        for (label, value) in contact.channels() {
            eprintln!("{}: {}", label, value);
        }
    }

    eprintln!("\nProducts ({})", products.len());
    print_rows(&build_product_rows(directory, &products), format)?;

    let markets = directory.markets_for(vendor);
    eprintln!("\nMarkets ({})", markets.len());
    print_rows(&build_market_rows(&markets, today(), None), format)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> VendorsArgs {
        VendorsArgs {
            search: None,
            category: None,
            market: None,
            featured: false,
            limit: None,
        }
    }

    fn ids(vendors: &[&Vendor]) -> Vec<String> {
        vendors.iter().map(|v| v.id.clone()).collect()
    }

    #[test]
    fn test_featured_vendors_then_limit() {
        let dir = Directory::from_seed().unwrap();
        let featured = VendorsArgs {
            featured: true,
            ..args()
        };
        let all = select_vendors(&featured, &dir, &Settings::default()).unwrap();
        assert_eq!(ids(&all), vec!["1", "4"]);

        let limited = VendorsArgs {
            limit: Some(1),
            ..featured
        };
        let one = select_vendors(&limited, &dir, &Settings::default()).unwrap();
        assert_eq!(ids(&one), vec!["1"]);
    }

    #[test]
    fn test_unknown_market_is_an_error() {
        let dir = Directory::from_seed().unwrap();
        let args = VendorsArgs {
            market: Some("99".to_string()),
            ..args()
        };
        let err = select_vendors(&args, &dir, &Settings::default()).unwrap_err();
        assert_eq!(err.to_string(), "No market with ID 99");
    }

    #[test]
    fn test_vendor_detail_json_keys_are_unique() {
        let dir = Directory::from_seed().unwrap();
        let vendor = dir.vendor("1").unwrap();
        let detail = VendorDetail {
            vendor,
            product_details: dir.products_of(vendor),
        };
        let json = serde_json::to_string(&detail).unwrap();
        assert_eq!(json.matches("\"products\":").count(), 1);
        assert_eq!(json.matches("\"productDetails\":").count(), 1);

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["products"], serde_json::json!(["1", "2", "3"]));
        assert_eq!(value["productDetails"].as_array().unwrap().len(), 3);
        assert_eq!(value["productDetails"][0]["id"], "1");
    }
}
