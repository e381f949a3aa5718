//! Calendar export for market events.
//!
//! Turns an [`Event`] and its market into a [`CalendarExport`] payload, then
//! hands it to a [`CalendarSink`]. Event times are free text like
//! `"10:00 AM - 2:00 PM"`; both bounds must parse as 12-hour clock times or
//! the export is abandoned and logged.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::LazyLock;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use farmstand_data::types::Event;
use farmstand_data::Directory;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::request::RequestGate;

/// Error types for calendar export.
#[derive(Error, Debug)]
pub enum CalendarError {
    #[error("Market {market_id} not found for event {event_id}")]
    MarketNotFound { event_id: String, market_id: String },
    #[error("Invalid time format for event {event_id}: {time:?}")]
    InvalidTime { event_id: String, time: String },
    #[error("Failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

static CLOCK_TIME: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)^(\d{1,2}):(\d{2})\s+(AM|PM)$").ok());

/// Parses `"h:mm AM"` / `"h:mm PM"` (marker case-insensitive, whitespace
/// required before it) into a time of day.
pub fn parse_clock_time(input: &str) -> Option<NaiveTime> {
    let caps = CLOCK_TIME.as_ref()?.captures(input.trim())?;
    let hour: u32 = caps[1].parse().ok()?;
    let minute: u32 = caps[2].parse().ok()?;
    if !(1..=12).contains(&hour) {
        return None;
    }
    let hour = match (caps[3].eq_ignore_ascii_case("pm"), hour) {
        (false, 12) => 0,
        (true, h) if h < 12 => h + 12,
        (_, h) => h,
    };
    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// `"2:30 PM"` -> `"14:30"`. `None` when the input is not a 12-hour time.
pub fn to_24_hour(input: &str) -> Option<String> {
    parse_clock_time(input).map(|t| t.format("%H:%M").to_string())
}

/// Start and end of an event on its day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeRange {
    /// Parses `"<start> - <end>"`; both bounds must be valid.
    pub fn parse(text: &str) -> Option<Self> {
        let (start, end) = text.split_once(" - ")?;
        Some(Self {
            start: parse_clock_time(start)?,
            end: parse_clock_time(end)?,
        })
    }
}

/// Calendar applications an export can target.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CalendarProvider {
    Apple,
    Google,
    #[serde(rename = "iCal")]
    ICal,
    Microsoft365,
    #[serde(rename = "Outlook.com")]
    OutlookCom,
    Yahoo,
}

impl CalendarProvider {
    pub const ALL: [CalendarProvider; 6] = [
        CalendarProvider::Apple,
        CalendarProvider::Google,
        CalendarProvider::ICal,
        CalendarProvider::Microsoft365,
        CalendarProvider::OutlookCom,
        CalendarProvider::Yahoo,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CalendarProvider::Apple => "Apple",
            CalendarProvider::Google => "Google",
            CalendarProvider::ICal => "iCal",
            CalendarProvider::Microsoft365 => "Microsoft365",
            CalendarProvider::OutlookCom => "Outlook.com",
            CalendarProvider::Yahoo => "Yahoo",
        }
    }

    /// Providers reached through a web link rather than an `.ics` file.
    pub fn is_web(self) -> bool {
        !matches!(self, CalendarProvider::Apple | CalendarProvider::ICal)
    }
}

impl std::fmt::Display for CalendarProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for CalendarProvider {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        CalendarProvider::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(trimmed))
            .ok_or(())
    }
}

/// Everything a calendar needs to add one event.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CalendarExport {
    pub name: String,
    pub description: String,
    /// "Market, 123 Main Street, Portland, OR"
    pub location: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// "HH:MM"
    pub start_time: String,
    pub end_time: String,
    pub options: Vec<CalendarProvider>,
    pub time_zone: String,
    #[serde(rename = "iCalFileName")]
    pub ical_file_name: String,
}

/// Lower-cased title with each whitespace run replaced by `-`. Path
/// separators become `-` too, so the name stays a single file name.
pub fn ical_file_name(title: &str) -> String {
    title
        .replace(['/', '\\'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}

/// Builds the export payload for `event`.
pub fn build_export(
    directory: &Directory,
    event: &Event,
    time_zone: &str,
    providers: &[CalendarProvider],
) -> Result<CalendarExport, CalendarError> {
    let market = directory
        .market_of(event)
        .ok_or_else(|| CalendarError::MarketNotFound {
            event_id: event.id.clone(),
            market_id: event.market_id.clone(),
        })?;
    let range = TimeRange::parse(&event.time).ok_or_else(|| CalendarError::InvalidTime {
        event_id: event.id.clone(),
        time: event.time.clone(),
    })?;
    Ok(CalendarExport {
        name: event.title.clone(),
        description: event.description.clone(),
        location: format!("{}, {}", market.name, market.address_line()),
        start_date: event.date,
        end_date: event.date,
        start_time: range.start.format("%H:%M").to_string(),
        end_time: range.end.format("%H:%M").to_string(),
        options: providers.to_vec(),
        time_zone: time_zone.to_string(),
        ical_file_name: ical_file_name(&event.title),
    })
}

impl CalendarExport {
    fn stamp(date: NaiveDate, time: &str) -> String {
        format!("{}T{}00", date.format("%Y%m%d"), time.replace(':', ""))
    }

    /// Start as a local `YYYYMMDDTHHMMSS` stamp.
    pub fn start_stamp(&self) -> String {
        Self::stamp(self.start_date, &self.start_time)
    }

    pub fn end_stamp(&self) -> String {
        Self::stamp(self.end_date, &self.end_time)
    }

    fn local_iso(date: NaiveDate, time: &str) -> String {
        format!("{}T{}:00", date.format("%Y-%m-%d"), time)
    }

    /// Template link for a web calendar. `None` for file-based providers.
    pub fn provider_link(&self, provider: CalendarProvider) -> Option<Url> {
        let (start, end) = (self.start_stamp(), self.end_stamp());
        let dates = format!("{}/{}", start, end);
        let start_iso = Self::local_iso(self.start_date, &self.start_time);
        let end_iso = Self::local_iso(self.end_date, &self.end_time);
        let outlook = |base: &str| {
            Url::parse_with_params(
                base,
                &[
                    ("path", "/calendar/action/compose"),
                    ("rru", "addevent"),
                    ("subject", self.name.as_str()),
                    ("startdt", start_iso.as_str()),
                    ("enddt", end_iso.as_str()),
                    ("body", self.description.as_str()),
                    ("location", self.location.as_str()),
                ],
            )
            .ok()
        };
        match provider {
            CalendarProvider::Apple | CalendarProvider::ICal => None,
            CalendarProvider::Google => Url::parse_with_params(
                "https://calendar.google.com/calendar/render",
                &[
                    ("action", "TEMPLATE"),
                    ("text", self.name.as_str()),
                    ("dates", dates.as_str()),
                    ("details", self.description.as_str()),
                    ("location", self.location.as_str()),
                    ("ctz", self.time_zone.as_str()),
                ],
            )
            .ok(),
            CalendarProvider::Yahoo => Url::parse_with_params(
                "https://calendar.yahoo.com/",
                &[
                    ("v", "60"),
                    ("title", self.name.as_str()),
                    ("st", start.as_str()),
                    ("et", end.as_str()),
                    ("desc", self.description.as_str()),
                    ("in_loc", self.location.as_str()),
                ],
            )
            .ok(),
            CalendarProvider::OutlookCom => {
                outlook("https://outlook.live.com/calendar/0/deeplink/compose")
            }
            CalendarProvider::Microsoft365 => {
                outlook("https://outlook.office.com/calendar/0/deeplink/compose")
            }
        }
    }

    /// Links for every selected web provider.
    pub fn web_links(&self) -> Vec<(CalendarProvider, Url)> {
        self.options
            .iter()
            .filter_map(|p| self.provider_link(*p).map(|url| (*p, url)))
            .collect()
    }

    /// Renders an RFC 5545 calendar with one event. `dtstamp` is the
    /// creation time written into the file.
    pub fn to_ics(&self, dtstamp: DateTime<Utc>) -> String {
        let lines = [
            "BEGIN:VCALENDAR".to_string(),
            "VERSION:2.0".to_string(),
            "PRODID:-//farmstand//calendar export//EN".to_string(),
            "CALSCALE:GREGORIAN".to_string(),
            "BEGIN:VEVENT".to_string(),
            format!(
                "UID:{}-{}@farmstand",
                self.ical_file_name,
                self.start_date.format("%Y%m%d")
            ),
            format!("DTSTAMP:{}", dtstamp.format("%Y%m%dT%H%M%SZ")),
            format!("DTSTART;TZID={}:{}", self.time_zone, self.start_stamp()),
            format!("DTEND;TZID={}:{}", self.time_zone, self.end_stamp()),
            format!("SUMMARY:{}", escape_text(&self.name)),
            format!("DESCRIPTION:{}", escape_text(&self.description)),
            format!("LOCATION:{}", escape_text(&self.location)),
            "END:VEVENT".to_string(),
            "END:VCALENDAR".to_string(),
        ];
        lines.iter().map(|l| fold_line(l) + "\r\n").collect()
    }
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            _ => out.push(c),
        }
    }
    out
}

/// Content lines are limited to 75 octets; longer ones continue on lines
/// starting with a space.
fn fold_line(line: &str) -> String {
    const LIMIT: usize = 75;
    let mut out = String::with_capacity(line.len() + line.len() / LIMIT * 3);
    let mut width = 0;
    for c in line.chars() {
        let len = c.len_utf8();
        if width + len > LIMIT {
            out.push_str("\r\n ");
            width = 1;
        }
        out.push(c);
        width += len;
    }
    out
}

/// What a sink produced for an export.
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    /// An `.ics` file was written.
    File(PathBuf),
    /// Template links for web calendars.
    Links(Vec<(CalendarProvider, Url)>),
}

/// Receives finished calendar exports.
#[async_trait]
pub trait CalendarSink: Send + Sync {
    async fn deliver(&self, export: &CalendarExport) -> Result<Delivery, CalendarError>;
}

/// Writes `<dir>/<iCalFileName>.ics`.
#[derive(Debug, Clone)]
pub struct IcsFileSink {
    dir: PathBuf,
}

impl IcsFileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl CalendarSink for IcsFileSink {
    async fn deliver(&self, export: &CalendarExport) -> Result<Delivery, CalendarError> {
        let path = self.dir.join(format!("{}.ics", export.ical_file_name));
        tokio::fs::write(&path, export.to_ics(Utc::now()))
            .await
            .map_err(|source| CalendarError::Io {
                path: path.clone(),
                source,
            })?;
        tracing::info!("wrote {}", path.display());
        Ok(Delivery::File(path))
    }
}

/// Produces web calendar links without touching the filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkSink;

#[async_trait]
impl CalendarSink for LinkSink {
    async fn deliver(&self, export: &CalendarExport) -> Result<Delivery, CalendarError> {
        Ok(Delivery::Links(export.web_links()))
    }
}

/// Sends events to a calendar sink, one export at a time.
pub struct CalendarExporter<S> {
    sink: S,
    gate: RequestGate,
    time_zone: String,
    providers: Vec<CalendarProvider>,
}

impl<S: CalendarSink> CalendarExporter<S> {
    pub fn new(sink: S, time_zone: impl Into<String>, providers: Vec<CalendarProvider>) -> Self {
        Self {
            sink,
            gate: RequestGate::new(),
            time_zone: time_zone.into(),
            providers,
        }
    }

    /// Adds `event` to a calendar. Failures are logged and yield `None`;
    /// so does an export superseded by a newer one.
    pub async fn add_to_calendar(&self, directory: &Directory, event: &Event) -> Option<Delivery> {
        let export = match build_export(directory, event, &self.time_zone, &self.providers) {
            Ok(export) => export,
            Err(e) => {
                tracing::error!("Calendar export aborted: {}", e);
                return None;
            }
        };
        match self.gate.run(self.sink.deliver(&export)).await {
            Some(Ok(delivery)) => Some(delivery),
            Some(Err(e)) => {
                tracing::error!("Error adding event to calendar: {}", e);
                None
            }
            None => {
                tracing::debug!("calendar export for event {} was superseded", event.id);
                None
            }
        }
    }
}
