mod directory;
mod errors;
mod query;
pub mod types;
pub use self::directory::{DanglingReference, Directory, SeedFiles};
pub use self::errors::Error;
pub use self::query::{
    filter_by_search, filter_events, EventFilter, EventQuery, MarketQuery, MarketSortBy, Query,
    QueryCommon, Searchable, SortDirection, VendorQuery,
};
