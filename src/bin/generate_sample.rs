use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, NaiveTime};
use clap::Parser;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;

/// Writes a synthetic ride-bookings CSV in the same layout as the real export.
#[derive(Parser)]
#[command(name = "generate_sample")]
struct Args {
    /// Output CSV path
    #[arg(short, long, default_value = "sample_bookings.csv")]
    output: PathBuf,

    /// Number of bookings to generate
    #[arg(short, long, default_value_t = 5000)]
    rows: usize,

    /// Number of consecutive days the bookings span
    #[arg(short, long, default_value_t = 60)]
    days: i64,

    /// RNG seed, for reproducible files
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

#[derive(Serialize)]
struct Row {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Time")]
    time: String,
    #[serde(rename = "Booking ID")]
    booking_id: String,
    #[serde(rename = "Booking Status")]
    status: &'static str,
    #[serde(rename = "Customer ID")]
    customer_id: String,
    #[serde(rename = "Vehicle Type")]
    vehicle_type: &'static str,
    #[serde(rename = "Pickup Location")]
    pickup: &'static str,
    #[serde(rename = "Drop Location")]
    drop: &'static str,
    #[serde(rename = "Ride Distance")]
    distance: String,
    #[serde(rename = "Driver Ratings")]
    driver_rating: String,
    #[serde(rename = "Customer Rating")]
    customer_rating: String,
    #[serde(rename = "Payment Method")]
    payment: String,
}

/// (status, weight) – roughly the mix seen in the real export.
const STATUSES: [(&str, u32); 5] = [
    ("Complete", 62),
    ("Cancelled by Driver", 18),
    ("Cancelled by Customer", 7),
    ("No Driver Found", 7),
    ("Incomplete", 6),
];

const VEHICLES: [&str; 7] = [
    "Auto", "Go Mini", "Go Sedan", "Bike", "Premier Sedan", "eBike", "Uber XL",
];

const LOCATIONS: [&str; 12] = [
    "Palam Vihar",
    "Shastri Nagar",
    "Khandsa",
    "Central Secretariat",
    "Ghitorni Village",
    "AIIMS",
    "Vaishali",
    "Mayur Vihar",
    "Noida Sector 62",
    "Rajouri Garden",
    "Saket",
    "Gurgaon Sector 56",
];

const PAYMENTS: [&str; 5] = ["UPI", "Cash", "Uber Wallet", "Credit Card", "Debit Card"];

fn pick_status(rng: &mut StdRng) -> &'static str {
    let total: u32 = STATUSES.iter().map(|(_, w)| w).sum();
    let mut roll = rng.gen_range(0..total);
    for (status, weight) in STATUSES {
        if roll < weight {
            return status;
        }
        roll -= weight;
    }
    STATUSES[0].0
}

/// Busier mornings and evenings.
fn pick_hour(rng: &mut StdRng) -> u32 {
    if rng.gen_bool(0.6) {
        *[8u32, 9, 10, 17, 18, 19, 20]
            .choose(rng)
            .unwrap_or(&9)
    } else {
        rng.gen_range(0..24)
    }
}

fn rating(rng: &mut StdRng) -> String {
    format!("{:.1}", rng.gen_range(3.0..5.0))
}

fn make_row(rng: &mut StdRng, i: usize, start: NaiveDate, days: i64) -> Row {
    let date = start + Duration::days(rng.gen_range(0..days.max(1)));
    let time = NaiveTime::from_hms_opt(pick_hour(rng), rng.gen_range(0..60), rng.gen_range(0..60))
        .unwrap_or_default();
    let status = pick_status(rng);
    let ride_happened = matches!(status, "Complete" | "Incomplete");
    let null = || "null".to_string();

    Row {
        date: date.format("%Y-%m-%d").to_string(),
        time: time.format("%H:%M:%S").to_string(),
        booking_id: format!("\"CNR{:07}\"", 1_000_000 + i),
        status,
        customer_id: format!("\"CID{:07}\"", rng.gen_range(1_000_000..9_999_999)),
        vehicle_type: VEHICLES.choose(rng).copied().unwrap_or("Auto"),
        pickup: LOCATIONS.choose(rng).copied().unwrap_or("Saket"),
        drop: LOCATIONS.choose(rng).copied().unwrap_or("AIIMS"),
        distance: if ride_happened {
            format!("{:.2}", rng.gen_range(1.0..50.0))
        } else {
            null()
        },
        driver_rating: if status == "Complete" { rating(rng) } else { null() },
        customer_rating: if status == "Complete" { rating(rng) } else { null() },
        payment: if ride_happened {
            PAYMENTS.choose(rng).copied().unwrap_or("UPI").to_string()
        } else {
            null()
        },
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let mut rng = StdRng::seed_from_u64(args.seed);
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).context("start date")?;

    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    for i in 0..args.rows {
        writer.serialize(make_row(&mut rng, i, start, args.days))?;
    }
    writer.flush()?;

    log::info!("wrote {} bookings to {}", args.rows, args.output.display());
    println!(
        "Wrote {} bookings over {} days to {}",
        args.rows,
        args.days,
        args.output.display()
    );
    Ok(())
}
