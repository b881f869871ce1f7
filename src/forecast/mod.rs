//! Daily booking forecast.
//!
//! ```text
//!   FilteredView
//!        │  daily_counts
//!        ▼
//!   Vec<DailyCount> ── fewer than MIN_HISTORY_DAYS dates ──▶ InsufficientData
//!        │
//!        ▼
//!   ┌───────────┐
//!   │ Predictor │  history + HORIZON_DAYS future dates
//!   └───────────┘
//!        │
//!        ▼
//!   ForecastArtifact::Series { actual, predicted }
//! ```

pub mod trend;

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use crate::data::aggregate::{daily_counts, DailyCount};
use crate::data::filter::FilteredView;

pub use trend::TrendPredictor;

/// Fewest distinct dates the predictor is ever asked to fit.
pub const MIN_HISTORY_DAYS: usize = 5;

/// Days predicted past the last observed date.
pub const HORIZON_DAYS: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub predicted: f64,
}

#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("need at least {needed} days of history, got {got}")]
    TooFewPoints { needed: usize, got: usize },

    #[error("history is not strictly increasing by date at {0}")]
    Unordered(NaiveDate),
}

/// A time-series model: fit on daily counts, predict history + `horizon` days.
///
/// The returned series must contain every history date, in order, followed
/// by `horizon` consecutive days after the last history date.
pub trait Predictor {
    fn predict(
        &self,
        history: &[DailyCount],
        horizon: usize,
    ) -> Result<Vec<ForecastPoint>, ForecastError>;
}

/// What the forecast surface shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ForecastArtifact {
    /// Not enough distinct dates; the predictor was not called.
    InsufficientData { dates: usize },
    Series {
        actual: Vec<DailyCount>,
        predicted: Vec<ForecastPoint>,
    },
}

impl ForecastArtifact {
    pub const INSUFFICIENT_MESSAGE: &'static str = "Not enough data to forecast.";
}

/// Build the forecast for a view, calling `predictor` only with enough history.
pub fn forecast(
    view: &FilteredView<'_>,
    predictor: &dyn Predictor,
) -> Result<ForecastArtifact, ForecastError> {
    let actual = daily_counts(view);
    if actual.len() < MIN_HISTORY_DAYS {
        return Ok(ForecastArtifact::InsufficientData {
            dates: actual.len(),
        });
    }

    let predicted = predictor.predict(&actual, HORIZON_DAYS)?;
    Ok(ForecastArtifact::Series { actual, predicted })
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use chrono::Days;

    use super::*;
    use crate::data::model::fixtures::booking;
    use crate::data::model::{BookingStatus, Dataset};

    /// Predicts a flat line and remembers whether it was called.
    struct Flat {
        called: Cell<bool>,
    }

    impl Predictor for Flat {
        fn predict(
            &self,
            history: &[DailyCount],
            horizon: usize,
        ) -> Result<Vec<ForecastPoint>, ForecastError> {
            self.called.set(true);
            let last = history.last().map(|d| d.date).unwrap();
            let future = (1..=horizon as u64).map(|i| last + Days::new(i));
            Ok(history
                .iter()
                .map(|d| d.date)
                .chain(future)
                .map(|date| ForecastPoint { date, predicted: 1.0 })
                .collect())
        }
    }

    fn dataset_with_days(days: u32) -> Dataset {
        Dataset::from_bookings(
            (1..=days)
                .map(|d| {
                    booking(
                        BookingStatus::Complete,
                        "Auto",
                        &format!("2024-04-{d:02}"),
                        10,
                    )
                })
                .collect(),
        )
    }

    #[test]
    fn four_dates_is_the_sentinel() {
        let ds = dataset_with_days(4);
        let flat = Flat { called: Cell::new(false) };

        let artifact = forecast(&FilteredView::all(&ds), &flat).unwrap();

        assert_eq!(artifact, ForecastArtifact::InsufficientData { dates: 4 });
        assert!(!flat.called.get());
    }

    #[test]
    fn five_dates_calls_the_predictor() {
        let ds = dataset_with_days(5);
        let flat = Flat { called: Cell::new(false) };

        let artifact = forecast(&FilteredView::all(&ds), &flat).unwrap();

        assert!(flat.called.get());
        match artifact {
            ForecastArtifact::Series { actual, predicted } => {
                assert_eq!(actual.len(), 5);
                assert_eq!(predicted.len(), 5 + HORIZON_DAYS);
                let history_dates: Vec<_> = predicted[..5].iter().map(|p| p.date).collect();
                let actual_dates: Vec<_> = actual.iter().map(|d| d.date).collect();
                assert_eq!(history_dates, actual_dates);
            }
            other => panic!("expected a series, got {other:?}"),
        }
    }

    #[test]
    fn empty_view_is_insufficient() {
        let ds = Dataset::default();
        let artifact = forecast(&FilteredView::all(&ds), &TrendPredictor::default()).unwrap();
        assert_eq!(artifact, ForecastArtifact::InsufficientData { dates: 0 });
    }
}
