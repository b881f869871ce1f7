use chrono::{Datelike, Days, NaiveDate};

use super::{ForecastError, ForecastPoint, Predictor};
use crate::data::aggregate::DailyCount;

/// Linear trend plus additive day-of-week seasonality, fitted by least squares.
///
/// Weekly effects are only estimated once the history spans
/// `min_seasonal_span` days; shorter series get a plain trend line.
#[derive(Debug, Clone)]
pub struct TrendPredictor {
    pub min_seasonal_span: i64,
}

impl Default for TrendPredictor {
    fn default() -> Self {
        TrendPredictor {
            min_seasonal_span: 14,
        }
    }
}

/// Least-squares line `y = intercept + slope * t`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Line {
    intercept: f64,
    slope: f64,
}

impl Line {
    fn fit(points: &[(f64, f64)]) -> Line {
        let n = points.len() as f64;
        let mean_t = points.iter().map(|p| p.0).sum::<f64>() / n;
        let mean_y = points.iter().map(|p| p.1).sum::<f64>() / n;

        let (cov, var) = points.iter().fold((0.0, 0.0), |(cov, var), &(t, y)| {
            (cov + (t - mean_t) * (y - mean_y), var + (t - mean_t).powi(2))
        });
        let slope = if var > 0.0 { cov / var } else { 0.0 };

        Line {
            intercept: mean_y - slope * mean_t,
            slope,
        }
    }

    fn at(&self, t: f64) -> f64 {
        self.intercept + self.slope * t
    }
}

impl TrendPredictor {
    fn weekly_effects(&self, points: &[(f64, f64)], dates: &[NaiveDate], line: Line) -> [f64; 7] {
        let mut effects = [0.0; 7];
        let span = points.last().map(|p| p.0).unwrap_or_default() as i64;
        if span < self.min_seasonal_span {
            return effects;
        }

        let mut sums = [0.0; 7];
        let mut counts = [0usize; 7];
        for (&(t, y), date) in points.iter().zip(dates) {
            let day = date.weekday().num_days_from_monday() as usize;
            sums[day] += y - line.at(t);
            counts[day] += 1;
        }
        for day in 0..7 {
            if counts[day] > 0 {
                effects[day] = sums[day] / counts[day] as f64;
            }
        }

        // Centre the effects so they don't shift the trend level.
        let observed = counts.iter().filter(|&&c| c > 0).count().max(1) as f64;
        let centre = effects.iter().sum::<f64>() / observed;
        for (effect, &count) in effects.iter_mut().zip(&counts) {
            if count > 0 {
                *effect -= centre;
            }
        }
        effects
    }
}

impl Predictor for TrendPredictor {
    fn predict(
        &self,
        history: &[DailyCount],
        horizon: usize,
    ) -> Result<Vec<ForecastPoint>, ForecastError> {
        let Some(first) = history.first().map(|d| d.date) else {
            return Err(ForecastError::TooFewPoints { needed: 2, got: 0 });
        };
        if history.len() < 2 {
            return Err(ForecastError::TooFewPoints {
                needed: 2,
                got: history.len(),
            });
        }
        if let Some(w) = history.windows(2).find(|w| w[1].date <= w[0].date) {
            return Err(ForecastError::Unordered(w[1].date));
        }

        let offset = |date: NaiveDate| (date - first).num_days() as f64;
        let points: Vec<(f64, f64)> = history
            .iter()
            .map(|d| (offset(d.date), d.rides as f64))
            .collect();
        let dates: Vec<NaiveDate> = history.iter().map(|d| d.date).collect();

        let line = Line::fit(&points);
        let weekly = self.weekly_effects(&points, &dates, line);

        let last = dates[dates.len() - 1];
        let future = (1..=horizon as u64).filter_map(|i| last.checked_add_days(Days::new(i)));

        let predicted = dates
            .iter()
            .copied()
            .chain(future)
            .map(|date| {
                let day = date.weekday().num_days_from_monday() as usize;
                let y = line.at(offset(date)) + weekly[day];
                ForecastPoint {
                    date,
                    predicted: y.max(0.0),
                }
            })
            .collect();

        Ok(predicted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(start: NaiveDate, rides: &[usize]) -> Vec<DailyCount> {
        rides
            .iter()
            .enumerate()
            .map(|(i, &rides)| DailyCount {
                date: start + Days::new(i as u64),
                rides,
            })
            .collect()
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[test]
    fn follows_a_linear_trend() {
        let history = series(monday(), &[2, 4, 6, 8, 10]);
        let out = TrendPredictor::default().predict(&history, 3).unwrap();

        assert_eq!(out.len(), 8);
        assert!((out[0].predicted - 2.0).abs() < 1e-9);
        assert!((out[7].predicted - 16.0).abs() < 1e-9);
        assert_eq!(out[7].date, monday() + Days::new(7));
    }

    #[test]
    fn predictions_never_go_negative() {
        let history = series(monday(), &[10, 8, 6, 4, 2]);
        let out = TrendPredictor::default().predict(&history, 30).unwrap();
        assert!(out.iter().all(|p| p.predicted >= 0.0));
        assert_eq!(out.last().unwrap().predicted, 0.0);
    }

    #[test]
    fn learns_a_weekly_pattern() {
        // Three flat weeks with a spike every Saturday.
        let rides: Vec<usize> = (0..21).map(|i| if i % 7 == 5 { 20 } else { 5 }).collect();
        let history = series(monday(), &rides);
        let out = TrendPredictor::default().predict(&history, 7).unwrap();

        let next_saturday = &out[21 + 5];
        let next_tuesday = &out[21 + 1];
        assert_eq!(next_saturday.date.weekday(), chrono::Weekday::Sat);
        assert!(next_saturday.predicted > next_tuesday.predicted + 10.0);
    }

    #[test]
    fn gaps_keep_history_dates() {
        let history = vec![
            DailyCount { date: monday(), rides: 3 },
            DailyCount { date: monday() + Days::new(3), rides: 4 },
            DailyCount { date: monday() + Days::new(4), rides: 5 },
        ];
        let out = TrendPredictor::default().predict(&history, 2).unwrap();
        let dates: Vec<_> = out.iter().map(|p| p.date).collect();
        assert_eq!(dates[..3], [monday(), monday() + Days::new(3), monday() + Days::new(4)]);
        assert_eq!(dates[3], monday() + Days::new(5));
    }

    #[test]
    fn rejects_unordered_history() {
        let mut history = series(monday(), &[1, 2, 3]);
        history.swap(0, 2);
        assert!(matches!(
            TrendPredictor::default().predict(&history, 1),
            Err(ForecastError::Unordered(_))
        ));
    }
}
