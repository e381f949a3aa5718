//! CLI subcommand implementations.

pub mod calendar;
pub mod check;
pub mod events;
pub mod map;
pub mod markets;
pub mod reviews;
pub mod seasonal;
pub mod vendors;

use farmstand_lib::types::DayOfWeek;

/// Weekday in the local timezone, used for "open today" lines.
pub fn today() -> DayOfWeek {
    DayOfWeek::of(&chrono::Local::now().date_naive())
}
