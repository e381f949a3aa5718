//! The selected market, shared by the list and map surfaces.

use farmstand_data::types::{Coordinates, DayOfWeek, Market, MarketID};
use farmstand_data::Directory;

use crate::config::MapSettings;
use crate::map::{build_markers, resolve_viewport, user_marker, MapState, Viewport};

/// Where a selection came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    List,
    Map,
}

impl std::fmt::Display for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Surface::List => write!(f, "list"),
            Surface::Map => write!(f, "map"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionChange {
    /// Nothing was selected before.
    Selected(MarketID),
    Replaced { previous: MarketID, current: MarketID },
    /// Already selected, or cleared while empty.
    Unchanged,
    Cleared(MarketID),
    /// No market with that id; the selection is untouched.
    NotFound(String),
}

/// Holds at most one selected market. Both surfaces read and write the same
/// selection, so the map and list always agree.
#[derive(Debug, Clone)]
pub struct SelectionCoordinator<'d> {
    directory: &'d Directory,
    selected: Option<&'d Market>,
    zoom: u8,
    settings: MapSettings,
}

impl<'d> SelectionCoordinator<'d> {
    pub fn new(directory: &'d Directory, settings: &MapSettings) -> Self {
        Self {
            directory,
            selected: None,
            zoom: settings.default_zoom,
            settings: settings.clone(),
        }
    }

    pub fn selected(&self) -> Option<&'d Market> {
        self.selected
    }

    pub fn select(&mut self, id: &str, surface: Surface) -> SelectionChange {
        let Some(market) = self.directory.market(id) else {
            tracing::debug!("{} selected unknown market {}", surface, id);
            return SelectionChange::NotFound(id.to_string());
        };
        let change = match self.selected {
            Some(current) if current.id == market.id => return SelectionChange::Unchanged,
            Some(previous) => SelectionChange::Replaced {
                previous: previous.id.clone(),
                current: market.id.clone(),
            },
            None => SelectionChange::Selected(market.id.clone()),
        };
        tracing::debug!("{} selected market {}", surface, market.id);
        self.selected = Some(market);
        change
    }

    pub fn clear(&mut self) -> SelectionChange {
        match self.selected.take() {
            Some(previous) => {
                tracing::debug!("cleared selection of market {}", previous.id);
                SelectionChange::Cleared(previous.id.clone())
            }
            None => SelectionChange::Unchanged,
        }
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    /// Records the zoom level the map surface is at.
    pub fn set_zoom(&mut self, zoom: u8) {
        self.zoom = zoom;
    }

    pub fn viewport(&self, user_location: Option<Coordinates>, visible: &[&Market]) -> Viewport {
        resolve_viewport(self.selected, user_location, visible, self.zoom, &self.settings)
    }

    pub fn map_state(
        &self,
        visible: &[&Market],
        user_location: Option<Coordinates>,
        today: DayOfWeek,
    ) -> MapState {
        MapState {
            viewport: self.viewport(user_location, visible),
            markers: build_markers(visible, self.selected.map(|m| m.id.as_str()), today),
            user: user_location.map(user_marker),
        }
    }
}
