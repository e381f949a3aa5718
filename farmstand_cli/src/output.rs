use anyhow::Result;
use farmstand_lib::calendar::CalendarProvider;
use farmstand_lib::community::{average_rating, star_glyphs};
use farmstand_lib::farmstand_data::DanglingReference;
use farmstand_lib::hours::{day_status, hours_summary};
use farmstand_lib::map::MarketMarker;
use farmstand_lib::seasonal::{category_summary, SeasonalIndex};
use farmstand_lib::types::{Category, Coordinates, DayOfWeek, Event, Market, Product, Review, Vendor};
use farmstand_lib::Directory;
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Clone, Debug)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
    Markdown,
}

#[derive(Tabled, Serialize)]
pub struct MarketRow {
    #[tabled(rename = "ID")]
    #[serde(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    #[serde(rename = "Name")]
    name: String,
    #[tabled(rename = "Location")]
    #[serde(rename = "Location")]
    location: String,
    #[tabled(rename = "Today")]
    #[serde(rename = "Today")]
    today: String,
    #[tabled(rename = "Vendors")]
    #[serde(rename = "Vendors")]
    vendors: usize,
    #[tabled(rename = "Rating")]
    #[serde(rename = "Rating")]
    rating: String,
    #[tabled(rename = "Distance")]
    #[serde(rename = "Distance")]
    distance: String,
}

#[derive(Tabled, Serialize)]
pub struct HoursRow {
    #[tabled(rename = "Day")]
    #[serde(rename = "Day")]
    day: String,
    #[tabled(rename = "Hours")]
    #[serde(rename = "Hours")]
    hours: String,
}

#[derive(Tabled, Serialize)]
pub struct VendorRow {
    #[tabled(rename = "ID")]
    #[serde(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    #[serde(rename = "Name")]
    name: String,
    #[tabled(rename = "Categories")]
    #[serde(rename = "Categories")]
    categories: String,
    #[tabled(rename = "Markets")]
    #[serde(rename = "Markets")]
    markets: usize,
    #[tabled(rename = "Featured")]
    #[serde(rename = "Featured")]
    featured: String,
}

#[derive(Tabled, Serialize)]
pub struct ProductRow {
    #[tabled(rename = "Product")]
    #[serde(rename = "Product")]
    name: String,
    #[tabled(rename = "Category")]
    #[serde(rename = "Category")]
    category: String,
    #[tabled(rename = "Vendor")]
    #[serde(rename = "Vendor")]
    vendor: String,
    #[tabled(rename = "Price")]
    #[serde(rename = "Price")]
    price: String,
    #[tabled(rename = "Organic")]
    #[serde(rename = "Organic")]
    organic: String,
}

#[derive(Tabled, Serialize)]
pub struct SeasonRow {
    #[tabled(rename = "Month")]
    #[serde(rename = "Month")]
    month: String,
    #[tabled(rename = "Products")]
    #[serde(rename = "Products")]
    products: usize,
    #[tabled(rename = "Categories")]
    #[serde(rename = "Categories")]
    categories: String,
}

#[derive(Tabled, Serialize)]
pub struct EventRow {
    #[tabled(rename = "Date")]
    #[serde(rename = "Date")]
    date: String,
    #[tabled(rename = "Title")]
    #[serde(rename = "Title")]
    title: String,
    #[tabled(rename = "Market")]
    #[serde(rename = "Market")]
    market: String,
    #[tabled(rename = "Time")]
    #[serde(rename = "Time")]
    time: String,
}

#[derive(Tabled, Serialize)]
pub struct ReviewRow {
    #[tabled(rename = "Date")]
    #[serde(rename = "Date")]
    date: String,
    #[tabled(rename = "Market")]
    #[serde(rename = "Market")]
    market: String,
    #[tabled(rename = "Author")]
    #[serde(rename = "Author")]
    author: String,
    #[tabled(rename = "Rating")]
    #[serde(rename = "Rating")]
    rating: String,
    #[tabled(rename = "Comment")]
    #[serde(rename = "Comment")]
    comment: String,
}

#[derive(Tabled, Serialize)]
pub struct LinkRow {
    #[tabled(rename = "Provider")]
    #[serde(rename = "Provider")]
    provider: String,
    #[tabled(rename = "Link")]
    #[serde(rename = "Link")]
    link: String,
}

#[derive(Tabled, Serialize)]
pub struct MarkerRow {
    #[tabled(rename = "ID")]
    #[serde(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    #[serde(rename = "Name")]
    name: String,
    #[tabled(rename = "Position")]
    #[serde(rename = "Position")]
    position: String,
    #[tabled(rename = "Selected")]
    #[serde(rename = "Selected")]
    selected: String,
    #[tabled(rename = "Hours")]
    #[serde(rename = "Hours")]
    hours: String,
}

#[derive(Tabled, Serialize)]
pub struct DanglingRow {
    #[tabled(rename = "Owner")]
    #[serde(rename = "Owner")]
    owner: String,
    #[tabled(rename = "ID")]
    #[serde(rename = "ID")]
    owner_id: String,
    #[tabled(rename = "Field")]
    #[serde(rename = "Field")]
    field: String,
    #[tabled(rename = "Missing")]
    #[serde(rename = "Missing")]
    missing: String,
}

// -- Row builders --

fn yes_or_blank(flag: bool) -> String {
    let text = if flag { "yes" } else { "" };
    text.to_string()
}

pub fn build_market_rows(
    markets: &[&Market],
    today: DayOfWeek,
    origin: Option<Coordinates>,
) -> Vec<MarketRow> {
    markets
        .iter()
        .map(|m| MarketRow {
            id: m.id.clone(),
            name: m.name.clone(),
            location: format!("{}, {}", m.city, m.state),
            today: day_status(m, today).to_string(),
            vendors: m.vendor_ids.len(),
            rating: average_rating(m)
                .map(|r| format!("{:.1}", r))
                .unwrap_or_else(|| "-".to_string()),
            distance: origin
                .map(|o| format!("{:.1} km", o.distance_km(&m.coordinates)))
                .unwrap_or_default(),
        })
        .collect()
}

pub fn build_hours_rows(market: &Market) -> Vec<HoursRow> {
    DayOfWeek::ALL
        .iter()
        .map(|day| HoursRow {
            day: day.to_string(),
            hours: match market.hours_on(*day) {
                Some(h) if h.is_open() => format!("{} - {}", h.open, h.close),
                _ => "Closed".to_string(),
            },
        })
        .collect()
}

/// Categories a vendor sells, in first-appearance order of its products.
fn vendor_categories(directory: &Directory, vendor: &Vendor) -> String {
    let products = directory.products_of(vendor);
    category_summary(&products)
        .into_iter()
        .map(|(c, _)| c.display_name())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn build_vendor_rows(directory: &Directory, vendors: &[&Vendor]) -> Vec<VendorRow> {
    vendors
        .iter()
        .map(|v| VendorRow {
            id: v.id.clone(),
            name: v.name.clone(),
            categories: vendor_categories(directory, v),
            markets: directory.markets_for(v).len(),
            featured: yes_or_blank(v.featured),
        })
        .collect()
}

pub fn build_product_rows(directory: &Directory, products: &[&Product]) -> Vec<ProductRow> {
    products
        .iter()
        .map(|p| ProductRow {
            name: p.name.clone(),
            category: p.category.display_name().to_string(),
            vendor: directory
                .vendor_of(p)
                .map(|v| v.name.clone())
                .unwrap_or_default(),
            price: p.price.clone().unwrap_or_default(),
            organic: yes_or_blank(p.organic),
        })
        .collect()
}

pub fn format_summary(summary: &[(Category, usize)]) -> String {
    summary
        .iter()
        .map(|(c, n)| format!("{} {}", c.display_name(), n))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn build_season_rows(index: &SeasonalIndex<'_>) -> Vec<SeasonRow> {
    index
        .iter()
        .map(|(month, products)| SeasonRow {
            month: month.to_string(),
            products: products.len(),
            categories: format_summary(&category_summary(products)),
        })
        .collect()
}

pub fn build_event_rows(directory: &Directory, events: &[&Event]) -> Vec<EventRow> {
    events
        .iter()
        .map(|e| EventRow {
            date: e.date.to_string(),
            title: e.title.clone(),
            market: directory
                .market_of(e)
                .map(|m| m.name.clone())
                .unwrap_or_default(),
            time: e.time.clone(),
        })
        .collect()
}

pub fn build_review_rows(reviews: &[&Review]) -> Vec<ReviewRow> {
    reviews
        .iter()
        .map(|r| ReviewRow {
            date: r.date.to_string(),
            market: r.market_name.clone().unwrap_or_default(),
            author: r.user_name.clone(),
            rating: star_glyphs(r),
            comment: r.comment.clone(),
        })
        .collect()
}

pub fn build_link_rows(links: &[(CalendarProvider, String)]) -> Vec<LinkRow> {
    links
        .iter()
        .map(|(provider, link)| LinkRow {
            provider: provider.to_string(),
            link: link.clone(),
        })
        .collect()
}

pub fn build_marker_rows(markers: &[MarketMarker]) -> Vec<MarkerRow> {
    markers
        .iter()
        .map(|m| MarkerRow {
            id: m.market_id.clone(),
            name: m.popup.name.clone(),
            position: m.position.to_string(),
            selected: yes_or_blank(m.selected),
            hours: match &m.popup.hours.next {
                Some(next) => format!("{}; {}", m.popup.hours.today, next),
                None => m.popup.hours.today.clone(),
            },
        })
        .collect()
}

pub fn build_dangling_rows(dangling: &[DanglingReference]) -> Vec<DanglingRow> {
    dangling
        .iter()
        .map(|d| DanglingRow {
            owner: d.owner.to_string(),
            owner_id: d.owner_id.clone(),
            field: d.field.to_string(),
            missing: d.missing_id.clone(),
        })
        .collect()
}

/// Today/next-open lines for a market, for detail views.
pub fn hours_lines(market: &Market, today: DayOfWeek) -> Vec<String> {
    let summary = hours_summary(market, today);
    std::iter::once(summary.today).chain(summary.next).collect()
}

// -- Output --

pub fn print_table<R: Tabled>(rows: &[R]) {
    println!("{}", Table::new(rows));
}

pub fn print_markdown<R: Tabled>(rows: &[R]) {
    let mut table = Table::new(rows);
    table.with(Style::markdown());
    println!("{}", table);
}

pub fn print_csv<R: Serialize>(rows: &[R]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(std::io::stdout());
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Prints rows in any format. JSON prints the rows themselves.
pub fn print_rows<R: Tabled + Serialize>(rows: &[R], format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => print_table(rows),
        OutputFormat::Markdown => print_markdown(rows),
        OutputFormat::Csv => print_csv(rows)?,
        OutputFormat::Json => print_json(&rows),
    }
    Ok(())
}

pub fn print_json<T: serde::Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize to JSON: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use farmstand_lib::types::Month;

    use super::*;

    fn seed() -> Directory {
        Directory::from_seed().unwrap()
    }

    #[test]
    fn test_build_market_rows_mapping() {
        let dir = seed();
        let markets: Vec<&Market> = dir.markets().iter().collect();
        let rows = build_market_rows(&markets, DayOfWeek::Saturday, None);
        assert_eq!(rows.len(), 3);

        let row = &rows[0];
        assert_eq!(row.id, "1");
        assert_eq!(row.name, "Downtown Farmers Market");
        assert_eq!(row.location, "Portland, OR");
        assert_eq!(row.today, "Open today: 09:00 - 14:00");
        assert_eq!(row.rating, "4.5");
        assert_eq!(row.distance, "");
    }

    #[test]
    fn test_build_market_rows_distance() {
        let dir = seed();
        let markets: Vec<&Market> = dir.markets().iter().take(1).collect();
        let origin = Coordinates::new(45.522, -122.677);
        let rows = build_market_rows(&markets, DayOfWeek::Monday, Some(origin));
        assert_eq!(rows[0].distance, "0.0 km");
        assert_eq!(rows[0].today, "Closed today");
    }

    #[test]
    fn test_build_hours_rows_covers_week() {
        let dir = seed();
        let rows = build_hours_rows(dir.market("1").unwrap());
        assert_eq!(rows.len(), 7);
        assert_eq!(rows[0].day, "Monday");
        assert_eq!(rows[0].hours, "Closed");
        assert_eq!(rows[2].hours, "16:00 - 20:00");
    }

    #[test]
    fn test_build_vendor_rows_categories() {
        let dir = seed();
        let vendors: Vec<&Vendor> = dir.vendors().iter().collect();
        let rows = build_vendor_rows(&dir, &vendors);
        assert_eq!(rows[0].categories, "Vegetable");
        assert_eq!(rows[0].featured, "yes");
        assert_eq!(rows[1].categories, "Bakery");
        assert_eq!(rows[1].featured, "");
    }

    #[test]
    fn test_build_season_rows() {
        let dir = seed();
        let index = SeasonalIndex::build(dir.products());
        let rows = build_season_rows(&index);
        assert_eq!(rows.len(), 12);
        assert_eq!(rows[0].month, "January");
        assert_eq!(rows[0].products, 2);
        assert_eq!(rows[0].categories, "Bakery 1, Dairy 1");
        assert_eq!(rows[Month::June.index()].categories, "Vegetable 3, Bakery 2, Dairy 1, Specialty 1");
    }

    #[test]
    fn test_build_product_rows() {
        let dir = seed();
        let index = SeasonalIndex::build(dir.products());
        let rows = build_product_rows(&dir, index.products_in(Month::January));
        assert_eq!(rows[0].name, "Sourdough Bread");
        assert_eq!(rows[0].category, "Bakery");
        assert_eq!(rows[0].price, "$7/loaf");
        assert_eq!(rows[0].organic, "yes");
    }

    #[test]
    fn test_build_review_rows_use_stars() {
        let dir = seed();
        let reviews: Vec<&Review> = dir.markets()[0].reviews.iter().collect();
        let rows = build_review_rows(&reviews);
        assert_eq!(rows[0].rating, "★★★★★");
        assert_eq!(rows[0].market, "Downtown Farmers Market");
    }

    #[test]
    fn test_hours_lines() {
        let dir = seed();
        let riverside = dir.market("2").unwrap();
        assert_eq!(hours_lines(riverside, DayOfWeek::Sunday), vec!["Open today: 10:00 - 15:00"]);
        assert_eq!(
            hours_lines(riverside, DayOfWeek::Monday),
            vec!["Closed today", "Next open: Sunday 10:00 - 15:00"]
        );
    }

    #[test]
    fn test_markdown_table_has_headers() {
        let dir = seed();
        let events: Vec<&Event> = dir.events().iter().collect();
        let rows = build_event_rows(&dir, &events);
        let mut table = Table::new(&rows);
        table.with(Style::markdown());
        let md = table.to_string();
        let header = md.lines().next().unwrap();
        assert!(header.contains("Date"));
        assert!(header.contains("Market"));
        assert_eq!(md.lines().count(), 2 + events.len());
    }

    #[test]
    fn test_csv_serializes_renamed_headers() {
        let rows = build_dangling_rows(&seed().dangling_references());
        let mut wtr = csv::Writer::from_writer(Vec::new());
        for row in &rows {
            wtr.serialize(row).unwrap();
        }
        let out = String::from_utf8(wtr.into_inner().unwrap()).unwrap();
        assert!(out.starts_with("Owner,ID,Field,Missing\n"));
        assert!(out.contains("market,2,vendorIds,6\n"));
    }
}
