//! Seasonality index and per-month category summaries.
//!
//! Pure functions over slices of [`Product`]; nothing here touches I/O.

use chrono::{DateTime, TimeZone};
use farmstand_data::types::{Category, Month, Product};

/// Products grouped by the months they are in season.
///
/// All twelve months are always present. Within a month, products keep the
/// order of the source collection.
#[derive(Debug, Clone)]
pub struct SeasonalIndex<'a> {
    months: [Vec<&'a Product>; 12],
}

impl<'a> SeasonalIndex<'a> {
    /// Builds the index. A product listed in N distinct months appears in N
    /// lists; a month repeated in one product's seasonality counts once.
    pub fn build(products: &'a [Product]) -> Self {
        let mut months: [Vec<&'a Product>; 12] = Default::default();
        for product in products {
            let mut seen = [false; 12];
            for month in &product.seasonality {
                let i = month.index();
                if !seen[i] {
                    seen[i] = true;
                    months[i].push(product);
                }
            }
        }
        Self { months }
    }

    pub fn products_in(&self, month: Month) -> &[&'a Product] {
        &self.months[month.index()]
    }

    /// Months in calendar order with their products.
    pub fn iter(&self) -> impl Iterator<Item = (Month, &[&'a Product])> + '_ {
        Month::ALL
            .into_iter()
            .map(move |m| (m, self.months[m.index()].as_slice()))
    }

    /// True when no month has any product.
    pub fn is_empty(&self) -> bool {
        self.months.iter().all(Vec::is_empty)
    }
}

/// Counts products per category, in order of first appearance. Categories
/// with no products are omitted.
pub fn category_summary(products: &[&Product]) -> Vec<(Category, usize)> {
    let mut counts: Vec<(Category, usize)> = Vec::new();
    for product in products {
        match counts.iter_mut().find(|(c, _)| *c == product.category) {
            Some((_, n)) => *n += 1,
            None => counts.push((product.category, 1)),
        }
    }
    counts
}

/// The month `now` falls in, in the timezone `now` carries.
pub fn current_month<Tz: TimeZone>(now: &DateTime<Tz>) -> Month {
    Month::of(&now.date_naive())
}
