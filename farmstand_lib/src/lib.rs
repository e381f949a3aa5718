//! Library layer for Farmstand: seasonal produce, opening hours, calendar
//! export, map state and market selection.
//!
//! Builds on the `farmstand_data` directory with the pieces the CLI and any
//! other front end share: validation, configuration, and the async
//! boundaries for geolocation and calendar delivery.

pub mod calendar;
pub mod community;
pub mod config;
pub mod error;
pub mod geolocation;
pub mod hours;
pub mod map;
pub mod request;
pub mod seasonal;
pub mod selection;
pub mod validation;

pub use farmstand_data;
pub use farmstand_data::types;
pub use farmstand_data::{
    filter_events, Directory, EventFilter, EventQuery, MarketQuery, MarketSortBy, Query,
    SortDirection, VendorQuery,
};

pub use calendar::{
    build_export, to_24_hour, CalendarError, CalendarExport, CalendarExporter, CalendarProvider,
    CalendarSink, Delivery, IcsFileSink, LinkSink,
};
pub use config::{ConfigError, Settings};
pub use error::FarmstandError;
pub use geolocation::{FixedLocator, Geolocation, GeolocationError, GeolocationState, Locator};
pub use map::{MapState, Viewport};
pub use request::{AbortSignal, RequestGate, RequestId};
pub use seasonal::{category_summary, SeasonalIndex};
pub use selection::{SelectionChange, SelectionCoordinator, Surface};

/// Loads the directory named by `settings`: YAML files from `data_dir` when
/// set, the embedded seed data otherwise.
pub fn load_directory(settings: &Settings) -> Result<Directory, FarmstandError> {
    let directory = match &settings.data_dir {
        Some(dir) => Directory::from_yaml_dir(dir)?,
        None => Directory::from_seed()?,
    };
    let dangling = directory.dangling_references();
    if !dangling.is_empty() {
        tracing::warn!(
            "directory has {} dangling references; run `farmstand check` for details",
            dangling.len()
        );
    }
    Ok(directory)
}
