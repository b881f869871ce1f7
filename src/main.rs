mod app;
mod color;
mod data;
mod forecast;
mod state;
mod ui;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use app::RustyRidesApp;
use clap::Parser;
use eframe::egui;

use data::filter::{Choice, HourRange};
use data::loader::load_file;
use data::model::BookingStatus;
use forecast::TrendPredictor;
use state::{ArtifactBoard, Dashboard};

#[derive(Parser, Debug)]
#[command(name = "rusty-rides")]
#[command(about = "Interactive dashboard over a ride-booking CSV", long_about = None)]
struct Cli {
    /// Ride bookings CSV to load at startup
    #[arg(short, long, default_value = "./data/csv/ncr_ride_bookings.csv")]
    data: PathBuf,

    /// Rows per page in the rides table
    #[arg(long, default_value_t = 15)]
    page_size: usize,

    /// Print the dashboard artifacts as JSON instead of opening a window
    #[arg(long, default_value_t = false)]
    headless: bool,

    /// Booking status to filter on in headless mode ("All" for no filter)
    #[arg(long, default_value = "All")]
    status: String,

    /// Vehicle type to filter on in headless mode ("All" for no filter)
    #[arg(long, default_value = "All")]
    vehicle: String,

    /// Inclusive pickup hour range in headless mode, e.g. 6-18
    #[arg(long, default_value = "0-23", value_parser = parse_hours)]
    hours: HourRange,
}

fn parse_hours(s: &str) -> Result<HourRange, String> {
    let (start, end) = s
        .split_once('-')
        .ok_or_else(|| format!("expected START-END, got '{s}'"))?;
    let start: u8 = start.trim().parse().map_err(|e| format!("start hour: {e}"))?;
    let end: u8 = end.trim().parse().map_err(|e| format!("end hour: {e}"))?;
    HourRange::new(start, end).map_err(|e| e.to_string())
}

fn choice<'s, T>(value: &'s str, wrap: impl FnOnce(&'s str) -> T) -> Choice<T> {
    if value.eq_ignore_ascii_case("all") {
        Choice::All
    } else {
        Choice::Only(wrap(value))
    }
}

fn run_headless(dataset: Arc<data::model::Dataset>, cli: &Cli) -> Result<()> {
    let mut dashboard = Dashboard::new(dataset, Box::new(TrendPredictor::default()));
    let mut board = ArtifactBoard::default();

    dashboard.set_status(choice(&cli.status, BookingStatus::from), &mut board);
    dashboard.set_vehicle(choice(&cli.vehicle, str::to_string), &mut board);
    dashboard.set_hours(cli.hours, &mut board);

    let out = serde_json::json!({
        "selection": dashboard.selection(),
        "generation": board.generation(),
        "artifacts": board.artifacts(),
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&out).context("serialising artifacts")?
    );
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    // The dashboard cannot render anything without a dataset.
    let dataset = load_file(&cli.data)
        .with_context(|| format!("loading bookings from {}", cli.data.display()))?;
    log::info!(
        "Loaded {} rides with vehicle types {:?}",
        dataset.len(),
        dataset.vehicle_types()
    );
    let dataset = Arc::new(dataset);

    if cli.headless {
        return run_headless(dataset, &cli);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([700.0, 450.0]),
        ..Default::default()
    };

    let page_size = cli.page_size.max(1);
    eframe::run_native(
        "Rusty Rides – Ride Bookings Dashboard",
        options,
        Box::new(move |_cc| Ok(Box::new(RustyRidesApp::new(dataset, page_size)))),
    )
    .map_err(|e| anyhow::anyhow!("running the dashboard window: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hours_argument_parses() {
        let h = parse_hours("6-18").unwrap();
        assert_eq!((h.start(), h.end()), (6, 18));
        assert!(parse_hours("18-6").is_err());
        assert!(parse_hours("6").is_err());
    }

    #[test]
    fn all_disables_the_choice() {
        assert_eq!(choice("All", str::to_string), Choice::<String>::All);
        assert_eq!(
            choice("Complete", BookingStatus::from),
            Choice::Only(BookingStatus::Complete)
        );
        assert_eq!(choice("SUV", str::to_string), Choice::Only("SUV".to_string()));
    }

    #[test]
    fn cli_defaults() {
        let cli = Cli::parse_from(["rusty-rides"]);
        assert_eq!(cli.page_size, 15);
        assert!(!cli.headless);
        assert_eq!(cli.hours, HourRange::FULL_DAY);
    }
}
