mod common;
pub use self::common::{filter_by_search, Query, QueryCommon, Searchable, SortDirection};
mod market;
pub use self::market::{MarketQuery, MarketSortBy};

mod vendor;
pub use self::vendor::VendorQuery;

mod event;
pub use self::event::{filter_events, EventFilter, EventQuery};
