//! Map state: what the map shows and the markers on it.

use farmstand_data::types::{Coordinates, DayOfWeek, Market};
use serde::Serialize;

use crate::config::MapSettings;
use crate::hours::{hours_summary, HoursSummary};

/// Popup shows at most this many feature tags.
pub const POPUP_FEATURES: usize = 3;
pub const DEFAULT_MARKET_IMAGE: &str = "/images/markets/default.jpg";
/// Radius of the circle drawn around the user's position, in metres.
pub const USER_ACCURACY_RADIUS_M: u32 = 1000;

/// Smallest box containing a set of points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub south_west: Coordinates,
    pub north_east: Coordinates,
}

impl Bounds {
    /// `None` for an empty set.
    pub fn around<I>(points: I) -> Option<Bounds>
    where
        I: IntoIterator<Item = Coordinates>,
    {
        points.into_iter().fold(None, |acc, p| {
            Some(match acc {
                None => Bounds {
                    south_west: p,
                    north_east: p,
                },
                Some(b) => Bounds {
                    south_west: Coordinates::new(b.south_west.lat.min(p.lat), b.south_west.lng.min(p.lng)),
                    north_east: Coordinates::new(b.north_east.lat.max(p.lat), b.north_east.lng.max(p.lng)),
                },
            })
        })
    }

    pub fn center(&self) -> Coordinates {
        Coordinates::new(
            (self.south_west.lat + self.north_east.lat) / 2.0,
            (self.south_west.lng + self.north_east.lng) / 2.0,
        )
    }

    pub fn contains(&self, point: Coordinates) -> bool {
        (self.south_west.lat..=self.north_east.lat).contains(&point.lat)
            && (self.south_west.lng..=self.north_east.lng).contains(&point.lng)
    }
}

/// Where the map should look.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Viewport {
    Center { center: Coordinates, zoom: u8 },
    FitBounds { bounds: Bounds, padding: u32 },
}

/// Picks the viewport: the selected market, else the user's position, else
/// bounds around the visible markets, else the configured default. Centering
/// keeps `zoom`.
pub fn resolve_viewport(
    selected: Option<&Market>,
    user_location: Option<Coordinates>,
    visible: &[&Market],
    zoom: u8,
    settings: &MapSettings,
) -> Viewport {
    if let Some(market) = selected {
        return Viewport::Center {
            center: market.coordinates,
            zoom,
        };
    }
    if let Some(center) = user_location {
        return Viewport::Center { center, zoom };
    }
    match Bounds::around(visible.iter().map(|m| m.coordinates)) {
        Some(bounds) => Viewport::FitBounds {
            bounds,
            padding: settings.fit_padding,
        },
        None => Viewport::Center {
            center: settings.default_center,
            zoom,
        },
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopupContent {
    pub name: String,
    pub image: String,
    pub address: String,
    pub hours: HoursSummary,
    pub features: Vec<String>,
    /// Feature tags left out of `features`.
    pub more_features: usize,
    pub vendor_count: usize,
}

impl PopupContent {
    pub fn for_market(market: &Market, today: DayOfWeek) -> Self {
        Self {
            name: market.name.clone(),
            image: market
                .images
                .first()
                .cloned()
                .unwrap_or_else(|| DEFAULT_MARKET_IMAGE.to_string()),
            address: market.address_line(),
            hours: hours_summary(market, today),
            features: market.features.iter().take(POPUP_FEATURES).cloned().collect(),
            more_features: market.features.len().saturating_sub(POPUP_FEATURES),
            vendor_count: market.vendor_ids.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketMarker {
    pub market_id: String,
    pub position: Coordinates,
    pub selected: bool,
    pub popup: PopupContent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserMarker {
    pub position: Coordinates,
    pub label: &'static str,
    pub radius_m: u32,
}

/// Everything a map surface needs to draw.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapState {
    pub viewport: Viewport,
    pub markers: Vec<MarketMarker>,
    pub user: Option<UserMarker>,
}

pub fn build_markers(
    visible: &[&Market],
    selected_id: Option<&str>,
    today: DayOfWeek,
) -> Vec<MarketMarker> {
    visible
        .iter()
        .map(|m| MarketMarker {
            market_id: m.id.clone(),
            position: m.coordinates,
            selected: selected_id == Some(m.id.as_str()),
            popup: PopupContent::for_market(m, today),
        })
        .collect()
}

pub fn user_marker(location: Coordinates) -> UserMarker {
    UserMarker {
        position: location,
        label: "Your Location",
        radius_m: USER_ACCURACY_RADIUS_M,
    }
}

#[cfg(test)]
mod tests {
    use farmstand_data::Directory;

    use super::*;

    fn visible(dir: &Directory) -> Vec<&Market> {
        dir.markets().iter().collect()
    }

    #[test]
    fn selected_market_wins() {
        let dir = Directory::from_seed().unwrap();
        let riverside = dir.market("2").unwrap();
        let home = Coordinates::new(45.0, -122.0);
        let vp = resolve_viewport(Some(riverside), Some(home), &visible(&dir), 13, &MapSettings::default());
        assert_eq!(
            vp,
            Viewport::Center {
                center: riverside.coordinates,
                zoom: 13
            }
        );
    }

    #[test]
    fn user_location_before_bounds() {
        let dir = Directory::from_seed().unwrap();
        let home = Coordinates::new(45.0, -122.0);
        let vp = resolve_viewport(None, Some(home), &visible(&dir), 11, &MapSettings::default());
        assert_eq!(vp, Viewport::Center { center: home, zoom: 11 });
    }

    #[test]
    fn bounds_fit_all_visible_markets() {
        let dir = Directory::from_seed().unwrap();
        let markets = visible(&dir);
        let vp = resolve_viewport(None, None, &markets, 11, &MapSettings::default());
        let Viewport::FitBounds { bounds, padding } = vp else {
            panic!("expected bounds, got {vp:?}");
        };
        assert_eq!(padding, 50);
        assert!(markets.iter().all(|m| bounds.contains(m.coordinates)));
    }

    #[test]
    fn default_center_when_nothing_visible() {
        let vp = resolve_viewport(None, None, &[], 11, &MapSettings::default());
        assert_eq!(
            vp,
            Viewport::Center {
                center: Coordinates::new(45.522, -122.677),
                zoom: 11
            }
        );
    }

    #[test]
    fn bounds_of_points() {
        assert_eq!(Bounds::around(Vec::new()), None);
        let b = Bounds::around([Coordinates::new(1.0, 5.0), Coordinates::new(3.0, -1.0)]).unwrap();
        assert_eq!(b.south_west, Coordinates::new(1.0, -1.0));
        assert_eq!(b.north_east, Coordinates::new(3.0, 5.0));
        assert_eq!(b.center(), Coordinates::new(2.0, 2.0));
    }

    #[test]
    fn markers_flag_selection_and_trim_features() {
        let dir = Directory::from_seed().unwrap();
        let markers = build_markers(&visible(&dir), Some("1"), DayOfWeek::Saturday);
        assert_eq!(markers.len(), 3);
        assert!(markers[0].selected);
        assert!(!markers[1].selected);

        let popup = &markers[0].popup;
        assert_eq!(
            popup.features,
            vec!["Parking Available", "EBT Accepted", "Pet Friendly"]
        );
        assert_eq!(popup.more_features, 1);
        assert_eq!(popup.address, "123 Main Street, Portland, OR");
        assert_eq!(popup.hours.today, "Open today: 09:00 - 14:00");
        assert_eq!(popup.image, "/images/markets/downtown-1.jpg");
    }

    #[test]
    fn viewport_serializes_with_kind_tag() {
        let vp = Viewport::Center {
            center: Coordinates::new(1.0, 2.0),
            zoom: 11,
        };
        let json = serde_json::to_value(&vp).unwrap();
        assert_eq!(json["kind"], "center");
        assert_eq!(json["zoom"], 11);
        assert_eq!(json["center"]["lat"], 1.0);
    }
}
