mod calendar;
pub use self::calendar::{DayOfWeek, Month};

mod geo;
pub use self::geo::Coordinates;

mod market;
pub use self::market::{Market, MarketID, OperatingHours, Rating, Review};

mod vendor;
pub use self::vendor::{Contact, Vendor, VendorID};

mod product;
pub use self::product::{Category, Product, ProductID};

mod event;
pub use self::event::{Event, EventID};
