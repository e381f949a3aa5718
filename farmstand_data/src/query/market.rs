use std::cmp::Ordering;
use std::str::FromStr;

use crate::types::{Coordinates, Market};
use crate::Directory;

use super::{
    common::{QueryCommon, SortDirection},
    Query,
};

/// Selects markets by name/city/state search, proximity and feature tags.
#[derive(Clone, Debug, Default)]
pub struct MarketQuery {
    pub common: QueryCommon,
    /// Center and radius in kilometres.
    pub near: Option<(Coordinates, f64)>,
    /// Reference point for distance ordering.
    pub origin: Option<Coordinates>,
    /// All listed tags must be present.
    pub features: Vec<String>,
    pub sort_by: MarketSortBy,
    pub sort_direction: SortDirection,
}

impl Query for MarketQuery {
    type Item = Market;

    fn get_common(&mut self) -> &mut QueryCommon {
        &mut self.common
    }

    fn common(&self) -> &QueryCommon {
        &self.common
    }

    fn collection<'d>(&self, directory: &'d Directory) -> &'d [Market] {
        directory.markets()
    }

    fn matches(&self, _directory: &Directory, market: &Market) -> bool {
        if !self.common.matches_text(market) {
            return false;
        }
        if let Some((center, radius_km)) = self.near {
            if center.distance_km(&market.coordinates) > radius_km {
                return false;
            }
        }
        self.features.iter().all(|f| market.has_feature(f))
    }

    fn order<'d>(&self, items: &mut [&'d Market]) {
        match self.sort_by {
            MarketSortBy::Listing => {}
            MarketSortBy::Name => items.sort_by(|a, b| {
                let ord = a.name.to_lowercase().cmp(&b.name.to_lowercase());
                self.directed(ord)
            }),
            MarketSortBy::Distance => {
                let Some(origin) = self.origin else {
                    return;
                };
                items.sort_by(|a, b| {
                    let da = origin.distance_km(&a.coordinates);
                    let db = origin.distance_km(&b.coordinates);
                    self.directed(da.partial_cmp(&db).unwrap_or(Ordering::Equal))
                });
            }
        }
    }
}

impl MarketQuery {
    /// Keeps markets within `radius_km` of `center`, and makes `center` the
    /// origin for distance ordering.
    pub fn with_near(mut self, center: Coordinates, radius_km: f64) -> Self {
        self.near = Some((center, radius_km));
        self.origin = Some(center);
        self
    }

    /// Sets the reference point for [`MarketSortBy::Distance`] without
    /// filtering by radius.
    pub fn with_origin(mut self, origin: Coordinates) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn with_feature(mut self, feature: &str) -> Self {
        self.features.push(feature.to_string());
        self
    }

    pub fn with_sort_by(mut self, sort_by: MarketSortBy) -> Self {
        self.sort_by = sort_by;
        self
    }

    pub fn with_sort_direction(mut self, sort_direction: SortDirection) -> Self {
        self.sort_direction = sort_direction;
        self
    }

    fn directed(&self, ord: Ordering) -> Ordering {
        match self.sort_direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    }
}

/// Market ordering. Listing order is the directory's own order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MarketSortBy {
    #[default]
    Listing,
    Name,
    Distance,
}

impl std::fmt::Display for MarketSortBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                MarketSortBy::Listing => "listing",
                MarketSortBy::Name => "name",
                MarketSortBy::Distance => "distance",
            }
        )
    }
}

impl FromStr for MarketSortBy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "listing" => Ok(MarketSortBy::Listing),
            "name" => Ok(MarketSortBy::Name),
            "distance" => Ok(MarketSortBy::Distance),
            _ => Err(()),
        }
    }
}
