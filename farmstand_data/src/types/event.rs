use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::MarketID;

/// Unique identifier for an event (e.g. "3").
pub type EventID = String;

/// A community event hosted by a market.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EventID,

    pub title: String,

    pub description: String,

    pub market_id: MarketID,

    pub date: NaiveDate,

    /// Human-readable range, e.g. "10:00 AM - 2:00 PM".
    pub time: String,

    pub image: Option<String>,
}

impl Event {
    /// The instant the event's date is compared at: midnight UTC.
    pub fn date_instant(&self) -> DateTime<Utc> {
        self.date.and_time(chrono::NaiveTime::MIN).and_utc()
    }

    /// Splits `time` into its start and end text around `" - "`.
    pub fn time_bounds(&self) -> Option<(&str, &str)> {
        self.time
            .split_once(" - ")
            .map(|(start, end)| (start.trim(), end.trim()))
    }
}
