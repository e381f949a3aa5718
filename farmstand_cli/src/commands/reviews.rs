use anyhow::{anyhow, Result};
use clap::Args;
use farmstand_lib::community::{average_rating, review_feed};
use farmstand_lib::Directory;

use crate::output::{build_review_rows, print_json, print_rows, OutputFormat};

#[derive(Args)]
pub struct ReviewsArgs {
    /// Only reviews for this market ID
    #[arg(long)]
    pub market: Option<String>,
}

pub fn run(args: &ReviewsArgs, directory: &Directory, format: &OutputFormat) -> Result<()> {
    let reviews = match &args.market {
        Some(id) => {
            let market = directory
                .market(id.trim())
                .ok_or_else(|| anyhow!("No market with ID {}", id))?;
            match average_rating(market) {
                Some(avg) => eprintln!(
                    "{}: {:.1} average from {} reviews",
                    market.name,
                    avg,
                    market.reviews.len()
                ),
                None => eprintln!("{}: no reviews yet", market.name),
            }
            review_feed(directory)
                .into_iter()
                .filter(|r| r.market_id == market.id)
                .collect()
        }
        None => review_feed(directory),
    };

    eprintln!("{} reviews", reviews.len());

    match format {
        OutputFormat::Json => print_json(&reviews),
        _ => print_rows(&build_review_rows(&reviews), format)?,
    }

    Ok(())
}
