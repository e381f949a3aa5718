use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use farmstand_data::types::{Category, Coordinates};
use farmstand_data::{
    filter_events, Directory, EventFilter, EventQuery, MarketQuery, MarketSortBy, Query,
    SortDirection, VendorQuery,
};

fn seed() -> Directory {
    Directory::from_seed().unwrap()
}

fn fixtures() -> Directory {
    let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
    Directory::from_yaml_dir(&dir).unwrap()
}

fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

fn ids<T>(items: Vec<&T>, id: impl Fn(&T) -> &str) -> Vec<String> {
    items.into_iter().map(|i| id(i).to_string()).collect()
}

#[test]
fn market_query_defaults_return_listing_order() {
    let dir = seed();
    let hits = dir.search(&MarketQuery::default());
    assert_eq!(ids(hits, |m| m.id.as_str()), vec!["1", "2", "3"]);
}

#[test]
fn market_query_search_matches_name_city_state() {
    let dir = seed();
    let portland = dir.search(&MarketQuery::default().with_search("portland"));
    assert_eq!(ids(portland, |m| m.id.as_str()), vec!["1", "2"]);

    let by_state = dir.search(&MarketQuery::default().with_search("or"));
    assert_eq!(by_state.len(), 3);

    let none = dir.search(&MarketQuery::default().with_search("Seattle"));
    assert!(none.is_empty());
}

#[test]
fn market_query_near_filters_by_radius() {
    let dir = seed();
    let downtown = Coordinates::new(45.522, -122.677);

    let close = dir.search(&MarketQuery::default().with_near(downtown, 5.0));
    assert_eq!(ids(close, |m| m.id.as_str()), vec!["1", "2"]);

    let wide = dir.search(&MarketQuery::default().with_near(downtown, 50.0));
    assert_eq!(wide.len(), 3);
}

#[test]
fn market_query_composes_search_and_feature() {
    let dir = seed();
    let hits = dir.search(
        &MarketQuery::default()
            .with_search("market")
            .with_feature("free parking"),
    );
    assert_eq!(ids(hits, |m| m.id.as_str()), vec!["3"]);
}

#[test]
fn market_query_sort_variants() {
    let dir = seed();
    let by_name = dir.search(&MarketQuery::default().with_sort_by(MarketSortBy::Name));
    assert_eq!(ids(by_name, |m| m.id.as_str()), vec!["1", "3", "2"]);

    let by_name_desc = dir.search(
        &MarketQuery::default()
            .with_sort_by(MarketSortBy::Name)
            .with_sort_direction(SortDirection::Desc),
    );
    assert_eq!(ids(by_name_desc, |m| m.id.as_str()), vec!["2", "3", "1"]);

    let lake_oswego = Coordinates::new(45.42, -122.67);
    let nearest = dir.search(
        &MarketQuery::default()
            .with_origin(lake_oswego)
            .with_sort_by(MarketSortBy::Distance),
    );
    assert_eq!(ids(nearest, |m| m.id.as_str()), vec!["3", "1", "2"]);

    // Distance ordering without an origin keeps listing order.
    let unanchored = dir.search(&MarketQuery::default().with_sort_by(MarketSortBy::Distance));
    assert_eq!(ids(unanchored, |m| m.id.as_str()), vec!["1", "2", "3"]);
}

#[test]
fn market_query_limit() {
    let dir = seed();
    let hits = dir.search(&MarketQuery::default().with_limit(2));
    assert_eq!(hits.len(), 2);
}

#[test]
fn vendor_query_by_category() {
    let dir = seed();
    let bakers = dir.search(&VendorQuery::default().with_category(Category::Bakery));
    assert_eq!(ids(bakers, |v| v.id.as_str()), vec!["2"]);

    let veg = dir.search(&VendorQuery::default().with_category(Category::Vegetable));
    assert_eq!(ids(veg, |v| v.id.as_str()), vec!["1", "5"]);

    let meat = dir.search(&VendorQuery::default().with_category(Category::Meat));
    assert!(meat.is_empty());
}

#[test]
fn vendor_query_and_composes_search_with_category() {
    let dir = seed();
    let hits = dir.search(
        &VendorQuery::default()
            .with_search("mushroom")
            .with_category(Category::Vegetable),
    );
    assert_eq!(ids(hits, |v| v.id.as_str()), vec!["5"]);

    let clash = dir.search(
        &VendorQuery::default()
            .with_search("honey")
            .with_category(Category::Vegetable),
    );
    assert!(clash.is_empty());
}

#[test]
fn vendor_query_market_and_featured() {
    let dir = seed();
    let at_hillside = dir.search(&VendorQuery::default().with_market("3"));
    assert_eq!(ids(at_hillside, |v| v.id.as_str()), vec!["3"]);

    let featured = dir.search(&VendorQuery::default().featured_only());
    assert_eq!(ids(featured, |v| v.id.as_str()), vec!["1", "4"]);
}

#[test]
fn event_filter_partitions_around_now() {
    let dir = fixtures();
    // e3 is dated exactly at `now`.
    let now = at(2025, 3, 15);

    let upcoming = filter_events(dir.events(), now, EventFilter::Upcoming);
    assert_eq!(ids(upcoming, |e| e.id.as_str()), vec!["e3", "e2"]);

    let past = filter_events(dir.events(), now, EventFilter::Past);
    assert_eq!(ids(past, |e| e.id.as_str()), vec!["e1"]);
}

#[test]
fn event_filter_sort_direction_depends_on_mode() {
    let dir = fixtures();
    let now = at(2025, 12, 31);

    let all = filter_events(dir.events(), now, EventFilter::All);
    assert_eq!(ids(all, |e| e.id.as_str()), vec!["e1", "e3", "e2"]);

    let past = filter_events(dir.events(), now, EventFilter::Past);
    assert_eq!(ids(past, |e| e.id.as_str()), vec!["e2", "e3", "e1"]);
}

#[test]
fn event_filter_just_after_midnight_is_past() {
    let dir = fixtures();
    let now = Utc.with_ymd_and_hms(2025, 3, 15, 0, 0, 1).unwrap();
    let past = filter_events(dir.events(), now, EventFilter::Past);
    assert_eq!(ids(past, |e| e.id.as_str()), vec!["e3", "e1"]);
}

#[test]
fn event_query_composes_market_and_range() {
    let dir = fixtures();
    let now = at(2025, 2, 1);

    let at_elm = dir.search(&EventQuery::at(now).with_market("m1"));
    assert_eq!(ids(at_elm, |e| e.id.as_str()), vec!["e1", "e3"]);

    let spring = dir.search(&EventQuery::at(now).with_date_range(
        NaiveDate::from_ymd_opt(2025, 3, 1),
        NaiveDate::from_ymd_opt(2025, 6, 1),
    ));
    assert_eq!(ids(spring, |e| e.id.as_str()), vec!["e3", "e2"]);

    let upcoming_elm = dir.search(
        &EventQuery::at(now)
            .with_filter(EventFilter::Upcoming)
            .with_market("m1"),
    );
    assert_eq!(ids(upcoming_elm, |e| e.id.as_str()), vec!["e3"]);

    let soup = dir.search(&EventQuery::at(now).with_search("SOUP"));
    assert_eq!(ids(soup, |e| e.id.as_str()), vec!["e1"]);
}

#[test]
fn event_filter_parses() {
    assert_eq!("Upcoming".parse::<EventFilter>(), Ok(EventFilter::Upcoming));
    assert_eq!("past".parse::<EventFilter>(), Ok(EventFilter::Past));
    assert!("soon".parse::<EventFilter>().is_err());
    assert_eq!(EventFilter::default().to_string(), "all");
}
