//! Pure summaries of a [`FilteredView`], one per dashboard surface.
//!
//! Nothing here fails: an empty view produces zeros and empty series.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use chrono::NaiveDate;
use serde::Serialize;

use super::filter::FilteredView;
use super::model::BookingStatus;

/// Number of bins in the ride-distance histogram.
pub const HISTOGRAM_BINS: usize = 20;

/// How many pickup locations the "Top 10" chart shows.
pub const TOP_PICKUPS: usize = 10;

/// How many pickup and drop locations the side-by-side chart shows of each.
pub const TOP_PICKUP_DROP: usize = 5;

// ---------------------------------------------------------------------------
// Frequency counting
// ---------------------------------------------------------------------------

/// Count occurrences, descending by count, ties in first-encountered order.
pub fn value_counts<K, I>(values: I) -> Vec<(K, usize)>
where
    K: Eq + Hash + Clone,
    I: IntoIterator<Item = K>,
{
    let mut slots: HashMap<K, usize> = HashMap::new();
    let mut counts: Vec<(K, usize)> = Vec::new();

    for v in values {
        match slots.get(&v) {
            Some(&slot) => counts[slot].1 += 1,
            None => {
                slots.insert(v.clone(), counts.len());
                counts.push((v, 1));
            }
        }
    }

    // Stable sort keeps first-seen order among equal counts.
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

/// Round to two decimals the way the indicators display it.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

// ---------------------------------------------------------------------------
// Status summary (indicator row)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSummary {
    pub total: usize,
    pub completed: usize,
    pub cancelled_by_driver: usize,
    pub cancelled_by_customer: usize,
    pub no_driver_found: usize,
    pub incomplete: usize,
    /// Rows whose status is none of the known five.
    pub other: usize,
    /// Mean of the present ride distances, 0 if there are none.
    pub avg_distance: f64,
    /// Mean of the present driver ratings, 0 if there are none.
    pub avg_driver_rating: f64,
}

impl StatusSummary {
    /// `(label, value)` pairs in indicator order. "Other" only appears when
    /// the file has statuses outside the known five.
    pub fn indicators(&self) -> Vec<(&'static str, String)> {
        let mut out = vec![
            ("Total Rides", self.total.to_string()),
            ("Completed", self.completed.to_string()),
            ("Cancelled by Driver", self.cancelled_by_driver.to_string()),
            ("Cancelled by Customer", self.cancelled_by_customer.to_string()),
            ("No Driver Found", self.no_driver_found.to_string()),
            ("Incomplete", self.incomplete.to_string()),
        ];
        if self.other > 0 {
            out.push(("Other", self.other.to_string()));
        }
        out.push(("Avg Ride Distance", format!("{:.2}", self.avg_distance)));
        out.push(("Avg Driver Rating", format!("{:.2}", self.avg_driver_rating)));
        out
    }
}

pub fn status_summary(view: &FilteredView<'_>) -> StatusSummary {
    let count = |status: BookingStatus| view.iter().filter(|b| b.status == status).count();

    StatusSummary {
        total: view.len(),
        completed: count(BookingStatus::Complete),
        cancelled_by_driver: count(BookingStatus::CancelledByDriver),
        cancelled_by_customer: count(BookingStatus::CancelledByCustomer),
        no_driver_found: count(BookingStatus::NoDriverFound),
        incomplete: count(BookingStatus::Incomplete),
        other: view
            .iter()
            .filter(|b| !BookingStatus::KNOWN.contains(&b.status))
            .count(),
        avg_distance: round2(mean(view.iter().filter_map(|b| b.ride_distance))),
        avg_driver_rating: round2(mean(view.iter().filter_map(|b| b.driver_rating))),
    }
}

/// Rides per status ("Ride Status" bar chart).
///
/// Every status observed in the dataset is listed, with 0 when the view has
/// none of it. Descending by count, ties in the dataset's first-seen order.
pub fn status_breakdown(view: &FilteredView<'_>) -> Vec<(String, usize)> {
    let mut counts: Vec<(&BookingStatus, usize)> = view
        .dataset()
        .statuses()
        .iter()
        .map(|s| (s, 0))
        .collect();
    for b in view.iter() {
        if let Some(slot) = counts.iter_mut().find(|(s, _)| **s == b.status) {
            slot.1 += 1;
        }
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .map(|(s, n)| (s.as_str().to_string(), n))
        .collect()
}

// ---------------------------------------------------------------------------
// Time-based counts
// ---------------------------------------------------------------------------

/// `(hour, rides)` for every hour that has rides, ascending by hour.
pub fn hourly_counts(view: &FilteredView<'_>) -> Vec<(u8, usize)> {
    let mut by_hour = [0usize; 24];
    for b in view.iter() {
        by_hour[b.hour() as usize] += 1;
    }
    (0u8..24)
        .zip(by_hour)
        .filter(|&(_, n)| n > 0)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub rides: usize,
}

/// Rides per calendar date, ascending by date.
pub fn daily_counts(view: &FilteredView<'_>) -> Vec<DailyCount> {
    let mut by_date: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for b in view.iter() {
        *by_date.entry(b.date).or_default() += 1;
    }
    by_date
        .into_iter()
        .map(|(date, rides)| DailyCount { date, rides })
        .collect()
}

// ---------------------------------------------------------------------------
// Ride distance histogram
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Equal-width histogram of the present ride distances.
///
/// Bins are half-open except the last, which also takes the maximum. When
/// every value is equal the range is widened to `value ± 0.5`.
pub fn distance_histogram(view: &FilteredView<'_>, bins: usize) -> Vec<HistogramBin> {
    let values: Vec<f64> = view.iter().filter_map(|b| b.ride_distance).collect();
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }

    let mut lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if (hi - lo).abs() < f64::EPSILON {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / bins as f64;

    let mut counts = vec![0usize; bins];
    for v in values {
        let slot = (((v - lo) / width) as usize).min(bins - 1);
        counts[slot] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lower: lo + width * i as f64,
            upper: lo + width * (i + 1) as f64,
            count,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Scatter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub distance: f64,
    pub driver_rating: f64,
    /// Colour channel; may be absent.
    pub customer_rating: Option<f64>,
}

/// Ride distance against driver rating, one point per plottable row.
pub fn distance_vs_rating(view: &FilteredView<'_>) -> Vec<ScatterPoint> {
    view.iter()
        .filter_map(|b| {
            Some(ScatterPoint {
                distance: b.ride_distance?,
                driver_rating: b.driver_rating?,
                customer_rating: b.customer_rating,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Locations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationCount {
    pub location: String,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LocationKind {
    Pickup,
    Drop,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabeledLocation {
    pub kind: LocationKind,
    pub location: String,
    pub count: usize,
}

fn top_n<'a>(locations: impl Iterator<Item = &'a str>, n: usize) -> Vec<LocationCount> {
    value_counts(locations)
        .into_iter()
        .take(n)
        .map(|(location, count)| LocationCount {
            location: location.to_string(),
            count,
        })
        .collect()
}

/// The `n` most frequent pickup locations.
pub fn top_pickup_locations(view: &FilteredView<'_>, n: usize) -> Vec<LocationCount> {
    top_n(view.iter().map(|b| b.pickup_location.as_str()), n)
}

/// Top `n` pickups followed by top `n` drops, as one labelled series.
pub fn top_pickup_and_drop(view: &FilteredView<'_>, n: usize) -> Vec<LabeledLocation> {
    let pickups = top_pickup_locations(view, n)
        .into_iter()
        .map(|lc| (LocationKind::Pickup, lc));
    let drops = top_n(view.iter().map(|b| b.drop_location.as_str()), n)
        .into_iter()
        .map(|lc| (LocationKind::Drop, lc));

    pickups
        .chain(drops)
        .map(|(kind, lc)| LabeledLocation {
            kind,
            location: lc.location,
            count: lc.count,
        })
        .collect()
}
