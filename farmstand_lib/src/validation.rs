use chrono::NaiveDate;
use farmstand_data::types::{Category, Coordinates, Month};
use farmstand_data::{EventFilter, MarketSortBy};

use crate::calendar::CalendarProvider;
use crate::error::FarmstandError;

pub const MAX_SEARCH_LENGTH: usize = 100;
pub const MAX_RADIUS_KM: f64 = 500.0;
pub const MAX_LIMIT: usize = 100;

/// Minimum Jaro-Winkler score for a "did you mean" suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.8;

/// Strip ASCII control characters (0x00-0x1F except space 0x20), trim whitespace,
/// and enforce a byte-length limit.
pub fn sanitize_text(input: &str, max_len: usize) -> Result<String, FarmstandError> {
    if input.len() > max_len {
        return Err(FarmstandError::InvalidInput(format!(
            "input exceeds maximum length of {} bytes",
            max_len
        )));
    }
    let sanitized: String = input
        .chars()
        .filter(|c| !c.is_ascii_control() || *c == ' ')
        .collect::<String>()
        .trim()
        .to_string();
    if sanitized.is_empty() {
        return Err(FarmstandError::InvalidInput(
            "input is empty after sanitization".to_string(),
        ));
    }
    Ok(sanitized)
}

/// Validate a search string: enforce length, strip control chars, trim.
pub fn validate_search(input: &str) -> Result<String, FarmstandError> {
    sanitize_text(input, MAX_SEARCH_LENGTH)
}

/// Closest candidate to `input` by Jaro-Winkler similarity, if any is close enough.
fn suggest<'a>(input: &str, candidates: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    let lower = input.trim().to_lowercase();
    candidates
        .into_iter()
        .map(|c| (strsim::jaro_winkler(&lower, &c.to_lowercase()), c))
        .filter(|(score, _)| *score >= SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, c)| c)
}

fn did_you_mean(hint: Option<&str>) -> String {
    hint.map(|h| format!(" Did you mean '{}'?", h))
        .unwrap_or_default()
}

/// Validate a month: full name, three-letter abbreviation, or number 1-12.
pub fn validate_month(input: &str) -> Result<Month, FarmstandError> {
    let trimmed = input.trim();
    if let Ok(n) = trimmed.parse::<u32>() {
        return Month::from_number(n).ok_or_else(|| {
            FarmstandError::InvalidInput(format!("month number must be 1-12, got {}", n))
        });
    }
    trimmed.parse::<Month>().map_err(|_| {
        let hint = suggest(trimmed, Month::ALL.iter().map(|m| m.name()));
        FarmstandError::InvalidInput(format!(
            "unknown month '{}'.{}",
            trimmed,
            did_you_mean(hint)
        ))
    })
}

/// Validate a product category (case-insensitive).
pub fn validate_category(input: &str) -> Result<Category, FarmstandError> {
    let trimmed = input.trim();
    trimmed.parse::<Category>().map_err(|_| {
        let names: Vec<String> = Category::ALL.iter().map(|c| c.to_string()).collect();
        let hint = suggest(trimmed, names.iter().map(String::as_str));
        FarmstandError::InvalidInput(format!(
            "unknown category '{}'.{} Valid values: {}",
            trimmed,
            did_you_mean(hint),
            names.join(", ")
        ))
    })
}

/// Validate an event filter mode: all, upcoming, past.
pub fn validate_event_filter(input: &str) -> Result<EventFilter, FarmstandError> {
    input.parse::<EventFilter>().map_err(|_| {
        FarmstandError::InvalidInput(format!(
            "unknown event filter '{}'. Valid values: all, upcoming, past",
            input.trim()
        ))
    })
}

/// Validate a market sort field: listing, name, distance.
pub fn validate_market_sort(input: &str) -> Result<MarketSortBy, FarmstandError> {
    input.trim().to_lowercase().parse::<MarketSortBy>().map_err(|_| {
        FarmstandError::InvalidInput(format!(
            "unknown sort field '{}'. Valid values: listing, name, distance",
            input.trim()
        ))
    })
}

/// Validate a calendar provider name, e.g. "Google" or "Outlook.com".
pub fn validate_provider(input: &str) -> Result<CalendarProvider, FarmstandError> {
    let trimmed = input.trim();
    trimmed.parse::<CalendarProvider>().map_err(|_| {
        let names: Vec<&str> = CalendarProvider::ALL.iter().map(|p| p.name()).collect();
        let hint = suggest(trimmed, names.iter().copied());
        FarmstandError::InvalidInput(format!(
            "unknown calendar provider '{}'.{} Valid values: {}",
            trimmed,
            did_you_mean(hint),
            names.join(", ")
        ))
    })
}

/// Validate a "lat,lng" pair in decimal degrees.
pub fn validate_coordinates(input: &str) -> Result<Coordinates, FarmstandError> {
    let invalid = || {
        FarmstandError::InvalidInput(format!(
            "invalid coordinates '{}'. Expected format: LAT,LNG (e.g., 45.522,-122.677)",
            input.trim()
        ))
    };
    let (lat, lng) = input.split_once(',').ok_or_else(invalid)?;
    let lat: f64 = lat.trim().parse().map_err(|_| invalid())?;
    let lng: f64 = lng.trim().parse().map_err(|_| invalid())?;
    if !(-90.0..=90.0).contains(&lat) {
        return Err(FarmstandError::InvalidInput(format!(
            "latitude must be between -90 and 90, got {}",
            lat
        )));
    }
    if !(-180.0..=180.0).contains(&lng) {
        return Err(FarmstandError::InvalidInput(format!(
            "longitude must be between -180 and 180, got {}",
            lng
        )));
    }
    Ok(Coordinates::new(lat, lng))
}

/// Validate a search radius in kilometres: positive and at most [`MAX_RADIUS_KM`].
pub fn validate_radius(km: f64) -> Result<f64, FarmstandError> {
    if !(km > 0.0 && km <= MAX_RADIUS_KM) {
        return Err(FarmstandError::InvalidInput(format!(
            "radius must be greater than 0 and at most {} km, got {}",
            MAX_RADIUS_KM, km
        )));
    }
    Ok(km)
}

/// Validate a result limit (must be 1..=100).
pub fn validate_limit(limit: usize) -> Result<usize, FarmstandError> {
    if !(1..=MAX_LIMIT).contains(&limit) {
        return Err(FarmstandError::InvalidInput(format!(
            "limit must be between 1 and {}, got {}",
            MAX_LIMIT, limit
        )));
    }
    Ok(limit)
}

/// Validate a YYYY-MM-DD date string.
pub fn validate_date(input: &str) -> Result<NaiveDate, FarmstandError> {
    let trimmed = input.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|_| {
        FarmstandError::InvalidInput(format!(
            "invalid date '{}'. Expected format: YYYY-MM-DD (e.g., 2025-04-20)",
            trimmed
        ))
    })
}
