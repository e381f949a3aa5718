//! Opening-hours status lines for a market on a given day.

use farmstand_data::types::{DayOfWeek, Market, OperatingHours};
use serde::Serialize;

/// Whether a market is open on one particular day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DayStatus<'a> {
    Open(&'a OperatingHours),
    /// No hours entry for the day, or the entry is flagged closed.
    Closed,
}

impl DayStatus<'_> {
    pub fn is_open(&self) -> bool {
        matches!(self, DayStatus::Open(_))
    }
}

impl std::fmt::Display for DayStatus<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DayStatus::Open(h) => write!(f, "Open today: {} - {}", h.open, h.close),
            DayStatus::Closed => write!(f, "Closed today"),
        }
    }
}

pub fn day_status(market: &Market, day: DayOfWeek) -> DayStatus<'_> {
    match market.hours_on(day) {
        Some(hours) if hours.is_open() => DayStatus::Open(hours),
        _ => DayStatus::Closed,
    }
}

/// First open day strictly after `today`, looking up to a week ahead.
pub fn next_open(market: &Market, today: DayOfWeek) -> Option<(DayOfWeek, &OperatingHours)> {
    let mut day = today;
    for _ in 0..7 {
        day = day.succ();
        if let DayStatus::Open(hours) = day_status(market, day) {
            return Some((day, hours));
        }
    }
    None
}

/// Text lines shown for a market's hours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HoursSummary {
    pub today: String,
    /// Absent when the market is open today.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

pub fn hours_summary(market: &Market, today: DayOfWeek) -> HoursSummary {
    let status = day_status(market, today);
    let next = if status.is_open() {
        None
    } else {
        Some(match next_open(market, today) {
            Some((day, h)) => format!("Next open: {} {} - {}", day, h.open, h.close),
            None => "No upcoming hours found".to_string(),
        })
    };
    HoursSummary {
        today: status.to_string(),
        next,
    }
}
