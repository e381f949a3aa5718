use std::path::PathBuf;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use farmstand_lib::types::{Category, Coordinates, DayOfWeek, Market, Month};
use farmstand_lib::{
    category_summary, load_directory, CalendarExporter, CalendarProvider, Delivery, EventFilter,
    EventQuery, FixedLocator, Geolocation, LinkSink, MarketQuery, Query, SeasonalIndex,
    SelectionChange, SelectionCoordinator, Settings, Surface, VendorQuery, Viewport,
};

fn fixture_settings() -> Settings {
    Settings {
        data_dir: Some(PathBuf::from(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/../farmstand_data/tests/fixtures"
        ))),
        ..Settings::default()
    }
}

#[test]
fn load_directory_defaults_to_seed() {
    let dir = load_directory(&Settings::default()).unwrap();
    assert_eq!(dir.markets().len(), 3);
    assert_eq!(dir.events().len(), 4);
}

#[test]
fn load_directory_from_data_dir() {
    let dir = load_directory(&fixture_settings()).unwrap();
    assert_eq!(dir.markets().len(), 2);
    assert_eq!(dir.dangling_references().len(), 1);
}

#[test]
fn load_directory_reports_missing_dir() {
    let settings = Settings {
        data_dir: Some(PathBuf::from("/nonexistent/farmstand")),
        ..Settings::default()
    };
    let err = load_directory(&settings).unwrap_err();
    assert!(err.to_string().starts_with("Data error:"), "{err}");
}

#[test]
fn seasonal_view_for_fixture_month() {
    let dir = load_directory(&fixture_settings()).unwrap();
    let index = SeasonalIndex::build(dir.products());
    let june = index.products_in(Month::June);
    assert_eq!(june.len(), 1);
    assert_eq!(june[0].name, "Kale");
    assert_eq!(category_summary(june), vec![(Category::Vegetable, 1)]);
    assert!(index.products_in(Month::December).is_empty());
}

#[test]
fn list_and_map_share_selection() {
    let dir = load_directory(&Settings::default()).unwrap();
    let settings = Settings::default();
    let visible = dir.search(&MarketQuery::default().with_search("portland"));
    let mut selection = SelectionCoordinator::new(&dir, &settings.map);

    // Pick from the list, then from the map.
    assert_eq!(
        selection.select(&visible[0].id, Surface::List),
        SelectionChange::Selected("1".into())
    );
    selection.select(&visible[1].id, Surface::Map);

    let state = selection.map_state(&visible, None, DayOfWeek::Sunday);
    let selected: Vec<&str> = state
        .markers
        .iter()
        .filter(|m| m.selected)
        .map(|m| m.market_id.as_str())
        .collect();
    assert_eq!(selected, vec!["2"]);
    assert_eq!(
        state.viewport,
        Viewport::Center {
            center: dir.market("2").unwrap().coordinates,
            zoom: 11
        }
    );
}

#[test]
fn vendor_filters_compose_with_search() {
    let dir = load_directory(&Settings::default()).unwrap();
    let hits = dir.search(
        &VendorQuery::default()
            .with_category(Category::Vegetable)
            .with_market("1")
            .with_limit(1),
    );
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "1");
}

#[tokio::test]
async fn upcoming_events_export_to_calendar() {
    let dir = load_directory(&Settings::default()).unwrap();
    let now = Utc.with_ymd_and_hms(2025, 4, 21, 0, 0, 0).unwrap();
    let upcoming = dir.search(&EventQuery::at(now).with_filter(EventFilter::Upcoming));
    let ids: Vec<&str> = upcoming.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["2", "3"]);

    let exporter = CalendarExporter::new(
        LinkSink,
        "America/Sao_Paulo",
        vec![CalendarProvider::Google, CalendarProvider::Yahoo],
    );
    let delivery = exporter.add_to_calendar(&dir, upcoming[0]).await.unwrap();
    let Delivery::Links(links) = delivery else {
        panic!("expected links");
    };
    assert_eq!(links.len(), 2);
    assert!(links[0].1.as_str().contains("20250427T110000"));
}

#[tokio::test]
async fn geolocation_feeds_map_center() {
    let dir = load_directory(&Settings::default()).unwrap();
    let home = Coordinates::new(45.42, -122.67);
    let geo = Geolocation::new(Some(Box::new(FixedLocator(home))), Duration::from_secs(10));
    let state = geo.get_location().await;

    let selection = SelectionCoordinator::new(&dir, &Settings::default().map);
    let visible: Vec<&Market> = dir.markets().iter().collect();
    assert_eq!(
        selection.viewport(state.location, &visible),
        Viewport::Center {
            center: home,
            zoom: 11
        }
    );
}
