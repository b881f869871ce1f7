use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::Serialize;

// ---------------------------------------------------------------------------
// BookingStatus – the "Booking Status" column
// ---------------------------------------------------------------------------

/// Outcome of a booking.
///
/// The five known values cover the source export; anything else is kept
/// verbatim in `Other` so the observed-values list stays faithful to the file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "String")]
pub enum BookingStatus {
    Complete,
    CancelledByDriver,
    CancelledByCustomer,
    NoDriverFound,
    Incomplete,
    Other(String),
}

impl BookingStatus {
    /// The known statuses in the order the summary row reports them.
    pub const KNOWN: [BookingStatus; 5] = [
        BookingStatus::Complete,
        BookingStatus::CancelledByDriver,
        BookingStatus::CancelledByCustomer,
        BookingStatus::NoDriverFound,
        BookingStatus::Incomplete,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            BookingStatus::Complete => "Complete",
            BookingStatus::CancelledByDriver => "Cancelled by Driver",
            BookingStatus::CancelledByCustomer => "Cancelled by Customer",
            BookingStatus::NoDriverFound => "No Driver Found",
            BookingStatus::Incomplete => "Incomplete",
            BookingStatus::Other(s) => s,
        }
    }
}

impl From<&str> for BookingStatus {
    fn from(s: &str) -> Self {
        match s {
            "Complete" => BookingStatus::Complete,
            "Cancelled by Driver" => BookingStatus::CancelledByDriver,
            "Cancelled by Customer" => BookingStatus::CancelledByCustomer,
            "No Driver Found" => BookingStatus::NoDriverFound,
            "Incomplete" => BookingStatus::Incomplete,
            other => BookingStatus::Other(other.to_string()),
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<BookingStatus> for String {
    fn from(status: BookingStatus) -> Self {
        status.as_str().to_string()
    }
}

// ---------------------------------------------------------------------------
// Booking – one row of the CSV
// ---------------------------------------------------------------------------

/// A single ride booking with its derived pickup timestamp.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Booking {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub booking_id: String,
    pub status: BookingStatus,
    pub customer_id: String,
    pub vehicle_type: String,
    pub pickup_location: String,
    pub drop_location: String,
    /// Kilometres; absent for rides that never started.
    pub ride_distance: Option<f64>,
    pub driver_rating: Option<f64>,
    pub customer_rating: Option<f64>,
    pub payment_method: Option<String>,
    /// `date` + `time`.
    pub pickup: NaiveDateTime,
}

impl Booking {
    /// Hour of day of the pickup, always in `0..=23`.
    pub fn hour(&self) -> u8 {
        // NaiveTime::hour() is < 24 by construction.
        self.pickup.hour() as u8
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The loaded bookings plus the option lists for the selection controls.
///
/// Built once by the loader and only ever shared read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    bookings: Vec<Booking>,
    statuses: Vec<BookingStatus>,
    vehicle_types: Vec<String>,
}

impl Dataset {
    /// Build the observed-value lists (first-seen order) from the rows.
    pub fn from_bookings(bookings: Vec<Booking>) -> Self {
        let mut statuses: Vec<BookingStatus> = Vec::new();
        let mut vehicle_types: Vec<String> = Vec::new();

        for b in &bookings {
            if !statuses.contains(&b.status) {
                statuses.push(b.status.clone());
            }
            if !vehicle_types.contains(&b.vehicle_type) {
                vehicle_types.push(b.vehicle_type.clone());
            }
        }

        Dataset {
            bookings,
            statuses,
            vehicle_types,
        }
    }

    pub fn bookings(&self) -> &[Booking] {
        &self.bookings
    }

    /// Distinct statuses in the order they first appear in the file.
    pub fn statuses(&self) -> &[BookingStatus] {
        &self.statuses
    }

    /// Distinct vehicle types in the order they first appear in the file.
    pub fn vehicle_types(&self) -> &[String] {
        &self.vehicle_types
    }

    /// Number of bookings.
    pub fn len(&self) -> usize {
        self.bookings.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.bookings.is_empty()
    }
}

/// Test fixture helpers shared by the inline test modules.
#[cfg(test)]
pub mod fixtures {
    use super::*;

    /// A booking with sensible defaults; tweak fields with struct update syntax.
    pub fn booking(status: BookingStatus, vehicle: &str, date: &str, hour: u32) -> Booking {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
        let time = NaiveTime::from_hms_opt(hour, 15, 0).unwrap();
        Booking {
            date,
            time,
            booking_id: format!("CNR{hour:02}"),
            status,
            customer_id: "CID1".to_string(),
            vehicle_type: vehicle.to_string(),
            pickup_location: "Palam Vihar".to_string(),
            drop_location: "Jhilmil".to_string(),
            ride_distance: Some(10.0),
            driver_rating: Some(4.5),
            customer_rating: Some(4.0),
            payment_method: Some("UPI".to_string()),
            pickup: date.and_time(time),
        }
    }

    /// The three-row example: Complete/Sedan/8h, Incomplete/Sedan/14h, Complete/SUV/20h.
    pub fn three_rows() -> Dataset {
        Dataset::from_bookings(vec![
            Booking {
                ride_distance: Some(12.0),
                ..booking(BookingStatus::Complete, "Sedan", "2024-03-01", 8)
            },
            Booking {
                ride_distance: Some(5.0),
                ..booking(BookingStatus::Incomplete, "Sedan", "2024-03-01", 14)
            },
            Booking {
                ride_distance: Some(20.0),
                ..booking(BookingStatus::Complete, "SUV", "2024-03-02", 20)
            },
        ])
    }
}
