use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Args;
use farmstand_lib::validation;
use farmstand_lib::{
    CalendarExporter, CalendarProvider, Delivery, Directory, IcsFileSink, LinkSink, Settings,
};

use crate::output::{build_link_rows, print_rows, OutputFormat};

#[derive(Args)]
pub struct CalendarArgs {
    /// Event ID
    pub id: String,

    /// Calendar provider, e.g. Google or iCal (repeatable; defaults to the configured list)
    #[arg(long)]
    pub provider: Vec<String>,

    /// Directory for .ics files (defaults to the configured calendar_dir)
    #[arg(long)]
    pub dir: Option<PathBuf>,
}

pub async fn run(
    args: &CalendarArgs,
    directory: &Directory,
    settings: &Settings,
    format: &OutputFormat,
) -> Result<()> {
    let event = directory
        .event(args.id.trim())
        .ok_or_else(|| anyhow!("No event with ID {}", args.id))?;

    let providers: Vec<CalendarProvider> = if args.provider.is_empty() {
        settings.calendar_providers.clone()
    } else {
        args.provider
            .iter()
            .map(|p| validation::validate_provider(p))
            .collect::<Result<_, _>>()?
    };

    let web: Vec<CalendarProvider> = providers.iter().copied().filter(|p| p.is_web()).collect();
    let wants_file = providers.iter().any(|p| !p.is_web());

    if !web.is_empty() {
        let exporter = CalendarExporter::new(LinkSink, settings.timezone.clone(), web);
        match exporter.add_to_calendar(directory, event).await {
            Some(Delivery::Links(links)) => {
                let links: Vec<(CalendarProvider, String)> = links
                    .into_iter()
                    .map(|(provider, url)| (provider, url.to_string()))
                    .collect();
                print_rows(&build_link_rows(&links), format)?;
            }
            Some(Delivery::File(path)) => eprintln!("Wrote {}", path.display()),
            None => eprintln!("calendar export aborted"),
        }
    }

    if wants_file {
        let dir = args.dir.clone().unwrap_or_else(|| settings.calendar_dir.clone());
        let exporter =
            CalendarExporter::new(IcsFileSink::new(dir), settings.timezone.clone(), providers);
        match exporter.add_to_calendar(directory, event).await {
            Some(Delivery::File(path)) => eprintln!("Wrote {}", path.display()),
            Some(Delivery::Links(_)) => {}
            None => eprintln!("calendar export aborted"),
        }
    }

    Ok(())
}
