//! Market-related types: markets, their weekly hours, and embedded reviews.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Coordinates, DayOfWeek, EventID, VendorID};

/// Unique identifier for a market (e.g. "1").
pub type MarketID = String;

/// A farmers market listing.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Market {
    pub id: MarketID,

    pub name: String,

    pub description: String,

    /// Street address, without city or state.
    pub address: String,

    pub city: String,

    /// Two-letter US state code.
    pub state: String,

    pub zip: String,

    pub coordinates: Coordinates,

    /// Weekly schedule. A day with no entry is a closed day.
    #[serde(default)]
    pub hours: Vec<OperatingHours>,

    #[serde(default)]
    pub images: Vec<String>,

    /// Vendors that sell here. May reference vendors missing from the directory.
    #[serde(default)]
    pub vendor_ids: Vec<VendorID>,

    /// Free-text amenity labels, e.g. "Pet Friendly".
    #[serde(default)]
    pub features: Vec<String>,

    #[serde(rename = "upcoming_events", default)]
    pub upcoming_event_ids: Vec<EventID>,

    #[serde(default)]
    pub reviews: Vec<Review>,
}

impl Market {
    /// The hours entry for `day`, if the market lists one.
    pub fn hours_on(&self, day: DayOfWeek) -> Option<&OperatingHours> {
        self.hours.iter().find(|h| h.day == day)
    }

    /// "123 Main Street, Portland, OR"
    pub fn address_line(&self) -> String {
        format!("{}, {}, {}", self.address, self.city, self.state)
    }

    /// Case-insensitive feature tag lookup.
    pub fn has_feature(&self, feature: &str) -> bool {
        self.features
            .iter()
            .any(|f| f.eq_ignore_ascii_case(feature.trim()))
    }
}

/// Opening hours for one day of the week.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OperatingHours {
    pub day: DayOfWeek,

    /// Opening time, "HH:MM".
    pub open: String,

    /// Closing time, "HH:MM".
    pub close: String,

    #[serde(default)]
    pub is_closed: bool,
}

impl OperatingHours {
    pub fn is_open(&self) -> bool {
        !self.is_closed
    }
}

/// A customer review embedded in a market record.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,

    pub market_id: MarketID,

    /// Denormalized market name. Filled from the owning market on load
    /// when the seed data leaves it out.
    #[serde(default)]
    pub market_name: Option<String>,

    pub user_name: String,

    pub rating: Rating,

    pub comment: String,

    pub date: NaiveDate,
}

/// A star rating, always within 1..=5.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[serde(from = "i64", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MAX: u8 = 5;

    /// Clamps out-of-range values into 1..=5.
    pub fn new(value: i64) -> Self {
        Rating(value.clamp(1, i64::from(Self::MAX)) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Exactly five glyphs; `true` for a filled star.
    pub fn stars(self) -> [bool; 5] {
        std::array::from_fn(|i| i < usize::from(self.0))
    }
}

impl From<i64> for Rating {
    fn from(value: i64) -> Self {
        Rating::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
