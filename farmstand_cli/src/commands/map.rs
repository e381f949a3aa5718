use std::time::Duration;

use anyhow::{anyhow, Result};
use clap::Args;
use farmstand_lib::types::Market;
use farmstand_lib::validation;
use farmstand_lib::{
    Directory, FixedLocator, Geolocation, Locator, MarketQuery, Query, SelectionChange,
    SelectionCoordinator, Settings, Surface, Viewport,
};

use super::today;
use crate::output::{build_marker_rows, print_json, print_rows, OutputFormat};

#[derive(Args)]
pub struct MapArgs {
    /// Select a market by ID
    #[arg(long)]
    pub select: Option<String>,

    /// Only show markets matching a search
    #[arg(long)]
    pub search: Option<String>,

    /// Current map zoom level
    #[arg(long)]
    pub zoom: Option<u8>,

    /// Center on the configured home location
    #[arg(long)]
    pub locate: bool,
}

fn describe(viewport: &Viewport) -> String {
    match viewport {
        Viewport::Center { center, zoom } => format!("Center on {} at zoom {}", center, zoom),
        Viewport::FitBounds { bounds, padding } => format!(
            "Fit {} to {} with {}px padding",
            bounds.south_west, bounds.north_east, padding
        ),
    }
}

pub async fn run(
    args: &MapArgs,
    directory: &Directory,
    settings: &Settings,
    format: &OutputFormat,
) -> Result<()> {
    let visible: Vec<&Market> = match &args.search {
        Some(search) => {
            let validated = validation::validate_search(search)?;
            directory.search(&MarketQuery::default().with_search(&validated))
        }
        None => directory.markets().iter().collect(),
    };

    let mut selection = SelectionCoordinator::new(directory, &settings.map);
    if let Some(zoom) = args.zoom {
        selection.set_zoom(zoom);
    }
    if let Some(id) = &args.select {
        if let SelectionChange::NotFound(id) = selection.select(id.trim(), Surface::List) {
            return Err(anyhow!("No market with ID {}", id));
        }
    }

    let user_location = if args.locate {
        let locator = settings
            .geolocation
            .home
            .map(|home| Box::new(FixedLocator(home)) as Box<dyn Locator>);
        let geolocation = Geolocation::new(
            locator,
            Duration::from_millis(settings.geolocation.timeout_ms),
        );
        let state = geolocation.get_location().await;
        if let Some(error) = &state.error {
            eprintln!("{}", error);
        }
        state.location
    } else {
        None
    };

    let state = selection.map_state(&visible, user_location, today());

    match format {
        OutputFormat::Json => print_json(&state),
        _ => {
            eprintln!("{}", describe(&state.viewport));
            if let Some(user) = &state.user {
                eprintln!("{} at {}", user.label, user.position);
            }
            print_rows(&build_marker_rows(&state.markers), format)?;
        }
    }

    Ok(())
}
