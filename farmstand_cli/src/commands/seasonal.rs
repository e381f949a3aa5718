use anyhow::Result;
use clap::Args;
use farmstand_lib::seasonal::current_month;
use farmstand_lib::validation;
use farmstand_lib::{category_summary, Directory, SeasonalIndex};

use crate::output::{
    build_product_rows, build_season_rows, format_summary, print_json, print_rows, OutputFormat,
};

#[derive(Args)]
pub struct SeasonalArgs {
    /// Month name, abbreviation, or number (defaults to the current month)
    #[arg(long)]
    pub month: Option<String>,

    /// Show every month instead of one
    #[arg(long, conflicts_with = "month")]
    pub all: bool,
}

pub fn run(args: &SeasonalArgs, directory: &Directory, format: &OutputFormat) -> Result<()> {
    let index = SeasonalIndex::build(directory.products());

    if args.all {
        let rows = build_season_rows(&index);
        match format {
            OutputFormat::Json => print_json(&rows),
            _ => print_rows(&rows, format)?,
        }
        return Ok(());
    }

    let month = match &args.month {
        Some(m) => validation::validate_month(m)?,
        None => current_month(&chrono::Local::now()),
    };
    let products = index.products_in(month);

    if products.is_empty() {
        eprintln!("No products in season for {}", month.name());
    } else {
        eprintln!(
            "{} products in season for {}: {}",
            products.len(),
            month.name(),
            format_summary(&category_summary(products))
        );
    }

    match format {
        OutputFormat::Json => print_json(&products),
        _ => print_rows(&build_product_rows(directory, products), format)?,
    }

    Ok(())
}
