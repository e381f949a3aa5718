use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};

use crate::types::Event;
use crate::Directory;

use super::{common::QueryCommon, Query};

/// Temporal filter mode for events.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EventFilter {
    /// Every event, earliest first.
    #[default]
    All,
    /// Events dated at or after now, earliest first.
    Upcoming,
    /// Events dated before now, most recent first.
    Past,
}

impl EventFilter {
    /// Whether an event passes this filter at `now`. An event dated exactly
    /// at `now` is upcoming.
    pub fn admits(self, event: &Event, now: DateTime<Utc>) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::Upcoming => event.date_instant() >= now,
            EventFilter::Past => event.date_instant() < now,
        }
    }

    /// Sorts events for display: descending for `Past`, ascending otherwise.
    /// Events sharing a date keep their relative order.
    pub fn sort(self, events: &mut [&Event]) {
        match self {
            EventFilter::All | EventFilter::Upcoming => events.sort_by_key(|e| e.date),
            EventFilter::Past => events.sort_by(|a, b| b.date.cmp(&a.date)),
        }
    }
}

impl std::fmt::Display for EventFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                EventFilter::All => "all",
                EventFilter::Upcoming => "upcoming",
                EventFilter::Past => "past",
            }
        )
    }
}

impl FromStr for EventFilter {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(EventFilter::All),
            "upcoming" => Ok(EventFilter::Upcoming),
            "past" => Ok(EventFilter::Past),
            _ => Err(()),
        }
    }
}

/// Partitions `events` against `now` and sorts the survivors for display.
pub fn filter_events(events: &[Event], now: DateTime<Utc>, filter: EventFilter) -> Vec<&Event> {
    let mut kept: Vec<&Event> = events.iter().filter(|e| filter.admits(e, now)).collect();
    filter.sort(&mut kept);
    kept
}

/// Selects events by temporal filter, market, inclusive date range and
/// title/description search.
#[derive(Clone, Debug)]
pub struct EventQuery {
    pub common: QueryCommon,
    pub now: DateTime<Utc>,
    pub filter: EventFilter,
    pub market_id: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl Query for EventQuery {
    type Item = Event;

    fn get_common(&mut self) -> &mut QueryCommon {
        &mut self.common
    }

    fn common(&self) -> &QueryCommon {
        &self.common
    }

    fn collection<'d>(&self, directory: &'d Directory) -> &'d [Event] {
        directory.events()
    }

    fn matches(&self, _directory: &Directory, event: &Event) -> bool {
        if !self.filter.admits(event, self.now) {
            return false;
        }
        if let Some(market_id) = &self.market_id {
            if &event.market_id != market_id {
                return false;
            }
        }
        if self.from.is_some_and(|from| event.date < from) {
            return false;
        }
        if self.to.is_some_and(|to| event.date > to) {
            return false;
        }
        self.common.matches_text(event)
    }

    fn order<'d>(&self, items: &mut [&'d Event]) {
        self.filter.sort(items);
    }
}

impl EventQuery {
    /// A query evaluated against the reference instant `now`.
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            common: QueryCommon::default(),
            now,
            filter: EventFilter::All,
            market_id: None,
            from: None,
            to: None,
        }
    }

    pub fn with_filter(mut self, filter: EventFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_market(mut self, market_id: &str) -> Self {
        self.market_id = Some(market_id.to_string());
        self
    }

    /// Keeps events dated within `from..=to`. Either bound may be open.
    pub fn with_date_range(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.from = from;
        self.to = to;
        self
    }
}
