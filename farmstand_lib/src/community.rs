//! Community feed: reviews across all markets, ratings, and spotlights.

use farmstand_data::types::{Market, Review, Vendor};
use farmstand_data::Directory;

/// Every market's reviews in one list, newest first. Reviews from the same
/// day keep directory order.
pub fn review_feed(directory: &Directory) -> Vec<&Review> {
    let mut reviews: Vec<&Review> = directory
        .markets()
        .iter()
        .flat_map(|m| m.reviews.iter())
        .collect();
    reviews.sort_by(|a, b| b.date.cmp(&a.date));
    reviews
}

/// Mean star rating for a market, or `None` when it has no reviews.
pub fn average_rating(market: &Market) -> Option<f64> {
    if market.reviews.is_empty() {
        return None;
    }
    let total: u32 = market
        .reviews
        .iter()
        .map(|r| u32::from(r.rating.value()))
        .sum();
    Some(f64::from(total) / market.reviews.len() as f64)
}

/// Five-glyph star string, e.g. "★★★★☆".
pub fn star_glyphs(review: &Review) -> String {
    review
        .rating
        .stars()
        .iter()
        .map(|filled| if *filled { '★' } else { '☆' })
        .collect()
}

/// The first `limit` markets in listing order.
pub fn featured_markets(directory: &Directory, limit: usize) -> &[Market] {
    let markets = directory.markets();
    &markets[..limit.min(markets.len())]
}

/// Up to `limit` vendors flagged as featured.
pub fn vendor_spotlight(directory: &Directory, limit: usize) -> Vec<&Vendor> {
    let mut featured = directory.featured_vendors();
    featured.truncate(limit);
    featured
}
