use chrono::{Datelike, NaiveDate};
use eframe::egui::{self, Color32, RichText, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, Points};

use crate::color::{generate_palette, RatingScale};
use crate::data::aggregate::{
    HistogramBin, LabeledLocation, LocationCount, LocationKind, ScatterPoint, StatusSummary,
};
use crate::forecast::ForecastArtifact;
use crate::state::{Artifact, ArtifactBoard, SurfaceId};

const CHART_HEIGHT: f32 = 250.0;
const ACTUAL_COLOR: Color32 = Color32::from_rgb(66, 133, 244);
const FORECAST_COLOR: Color32 = Color32::from_rgb(255, 165, 0);

/// Scatter colours are bucketed so each bucket is one `Points` series.
const RATING_BUCKETS: usize = 8;

// ---------------------------------------------------------------------------
// Dashboard page (central panel)
// ---------------------------------------------------------------------------

/// Render every dashboard surface from the latest published artifacts.
pub fn dashboard_page(ui: &mut Ui, board: &ArtifactBoard) {
    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            if let Some(Artifact::Summary(s)) = board.get(SurfaceId::Summary) {
                indicators(ui, s);
            }
            ui.separator();

            ui.columns(2, |cols| {
                surface(&mut cols[0], board, SurfaceId::StatusChart, "Ride Status");
                surface(&mut cols[1], board, SurfaceId::HourlyChart, "Rides by Hour");
            });
            ui.columns(2, |cols| {
                surface(
                    &mut cols[0],
                    board,
                    SurfaceId::DistanceHistogram,
                    "Ride Distance Distribution",
                );
                surface(&mut cols[1], board, SurfaceId::Scatter, "Distance vs Driver Ratings");
            });
            surface(ui, board, SurfaceId::TopPickups, "Top 10 Pickup Locations");
            surface(ui, board, SurfaceId::Forecast, "Future Client Bookings Forecast");
            surface(ui, board, SurfaceId::TopPickupDrop, "Top 5 Pickup & Drop Locations");
        });
}

fn surface(ui: &mut Ui, board: &ArtifactBoard, id: SurfaceId, title: &str) {
    ui.strong(title);
    let plot_id = format!("{id:?}");
    match board.get(id) {
        Some(Artifact::GroupedCounts(counts)) => category_bars(ui, &plot_id, counts),
        Some(Artifact::HourlyCounts(counts)) => hourly_line(ui, &plot_id, counts),
        Some(Artifact::Histogram(bins)) => histogram(ui, &plot_id, bins),
        Some(Artifact::Scatter(points)) => scatter(ui, &plot_id, points),
        Some(Artifact::TopLocations(top)) => top_locations(ui, &plot_id, top),
        Some(Artifact::LabeledLocations(series)) => pickup_drop_bars(ui, &plot_id, series),
        Some(Artifact::Forecast(f)) => forecast(ui, &plot_id, f),
        Some(Artifact::Message(msg)) => {
            ui.label(RichText::new(msg).color(Color32::YELLOW));
        }
        Some(Artifact::Summary(s)) => indicators(ui, s),
        None => {
            ui.weak("No data.");
        }
    }
    ui.add_space(8.0);
}

// ---------------------------------------------------------------------------
// Indicators
// ---------------------------------------------------------------------------

fn indicators(ui: &mut Ui, summary: &StatusSummary) {
    ui.horizontal_wrapped(|ui: &mut Ui| {
        for (name, value) in summary.indicators() {
            ui.group(|ui: &mut Ui| {
                ui.vertical(|ui: &mut Ui| {
                    ui.small(name);
                    ui.label(RichText::new(value).size(18.0).strong());
                });
            });
        }
    });
}

// ---------------------------------------------------------------------------
// Charts
// ---------------------------------------------------------------------------

fn base_plot<'a>(id: &str) -> Plot<'a> {
    Plot::new(id)
        .height(CHART_HEIGHT)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .allow_boxed_zoom(false)
}

/// Bar chart with one bar per label, labels on the x axis.
fn labelled_bars(ui: &mut Ui, id: &str, labels: Vec<String>, bars: Vec<Bar>) {
    base_plot(id)
        .y_axis_label("Count")
        .x_axis_formatter(move |mark, _range| {
            let i = mark.value.round();
            if (mark.value - i).abs() > f64::EPSILON || i < 0.0 {
                return String::new();
            }
            labels.get(i as usize).cloned().unwrap_or_default()
        })
        .show(ui, move |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });
}

fn category_bars(ui: &mut Ui, id: &str, counts: &[(String, usize)]) {
    let palette = generate_palette(counts.len());
    let bars = counts
        .iter()
        .zip(palette)
        .enumerate()
        .map(|(i, ((label, n), color))| {
            Bar::new(i as f64, *n as f64).name(label).width(0.8).fill(color)
        })
        .collect();
    let labels = counts.iter().map(|(l, _)| l.clone()).collect();
    labelled_bars(ui, id, labels, bars);
}

fn hourly_line(ui: &mut Ui, id: &str, counts: &[(u8, usize)]) {
    let points: PlotPoints = counts
        .iter()
        .map(|&(h, n)| [h as f64, n as f64])
        .collect();
    base_plot(id)
        .x_axis_label("Hour")
        .y_axis_label("Number of Rides")
        .show(ui, move |plot_ui| {
            plot_ui.line(Line::new(points).color(ACTUAL_COLOR).width(2.0));
        });
}

fn histogram(ui: &mut Ui, id: &str, bins: &[HistogramBin]) {
    let bars = bins
        .iter()
        .map(|b| {
            Bar::new((b.lower + b.upper) / 2.0, b.count as f64)
                .width(b.upper - b.lower)
                .name(format!("{:.1}–{:.1}", b.lower, b.upper))
        })
        .collect();
    base_plot(id)
        .x_axis_label("Ride Distance")
        .y_axis_label("Count")
        .show(ui, move |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(ACTUAL_COLOR));
        });
}

fn scatter(ui: &mut Ui, id: &str, points: &[ScatterPoint]) {
    let scale = RatingScale::spanning(points.iter().filter_map(|p| p.customer_rating));

    // One series per colour bucket, plus one for rows without a customer rating.
    let mut buckets: Vec<Vec<[f64; 2]>> = vec![Vec::new(); RATING_BUCKETS + 1];
    for p in points {
        let slot = match (scale, p.customer_rating) {
            (Some(scale), Some(r)) => {
                ((scale.fraction(r) * RATING_BUCKETS as f64) as usize).min(RATING_BUCKETS - 1)
            }
            _ => RATING_BUCKETS,
        };
        buckets[slot].push([p.distance, p.driver_rating]);
    }

    base_plot(id)
        .x_axis_label("Ride Distance")
        .y_axis_label("Driver Ratings")
        .show(ui, move |plot_ui| {
            for (slot, pts) in buckets.into_iter().enumerate() {
                if pts.is_empty() {
                    continue;
                }
                let color = match scale {
                    Some(scale) if slot < RATING_BUCKETS => {
                        let mid = (slot as f64 + 0.5) / RATING_BUCKETS as f64;
                        scale.color_for(Some(scale.min() + mid * (scale.max() - scale.min())))
                    }
                    _ => RatingScale::MISSING,
                };
                plot_ui.points(Points::new(pts).radius(2.5).color(color));
            }
        });
}

fn top_locations(ui: &mut Ui, id: &str, top: &[LocationCount]) {
    let bars = top
        .iter()
        .enumerate()
        .map(|(i, lc)| {
            Bar::new(i as f64, lc.count as f64)
                .name(&lc.location)
                .width(0.8)
                .fill(ACTUAL_COLOR)
        })
        .collect();
    let labels = top.iter().map(|lc| lc.location.clone()).collect();
    labelled_bars(ui, id, labels, bars);
}

fn pickup_drop_bars(ui: &mut Ui, id: &str, series: &[LabeledLocation]) {
    let labels: Vec<String> = series.iter().map(|l| l.location.clone()).collect();
    let chart = |kind: LocationKind, name: &str, color: Color32| {
        let bars = series
            .iter()
            .enumerate()
            .filter(|(_, l)| l.kind == kind)
            .map(|(i, l)| {
                Bar::new(i as f64, l.count as f64)
                    .name(&l.location)
                    .width(0.8)
                    .fill(color)
            })
            .collect();
        BarChart::new(bars).name(name).color(color)
    };
    let pickups = chart(LocationKind::Pickup, "Pickup", ACTUAL_COLOR);
    let drops = chart(LocationKind::Drop, "Drop", FORECAST_COLOR);

    base_plot(id)
        .height(CHART_HEIGHT + 50.0)
        .legend(Legend::default())
        .y_axis_label("Count")
        .x_axis_formatter(move |mark, _range| {
            let i = mark.value.round();
            if (mark.value - i).abs() > f64::EPSILON || i < 0.0 {
                return String::new();
            }
            labels.get(i as usize).cloned().unwrap_or_default()
        })
        .show(ui, move |plot_ui| {
            plot_ui.bar_chart(pickups);
            plot_ui.bar_chart(drops);
        });
}

// ---------------------------------------------------------------------------
// Forecast
// ---------------------------------------------------------------------------

fn day_number(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

fn format_day(value: f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(value.round() as i32)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn forecast(ui: &mut Ui, id: &str, artifact: &ForecastArtifact) {
    let (actual, predicted) = match artifact {
        ForecastArtifact::InsufficientData { .. } => {
            ui.label(
                RichText::new(format!("⚠ {}", ForecastArtifact::INSUFFICIENT_MESSAGE))
                    .color(Color32::YELLOW),
            );
            return;
        }
        ForecastArtifact::Series { actual, predicted } => (actual, predicted),
    };

    let actual: PlotPoints = actual
        .iter()
        .map(|d| [day_number(d.date), d.rides as f64])
        .collect();
    let predicted: PlotPoints = predicted
        .iter()
        .map(|p| [day_number(p.date), p.predicted])
        .collect();

    base_plot(id)
        .height(CHART_HEIGHT + 50.0)
        .legend(Legend::default())
        .y_axis_label("Bookings per day")
        .x_axis_formatter(|mark, _range| format_day(mark.value))
        .label_formatter(|name, value| {
            format!("{name}\n{}: {:.1}", format_day(value.x), value.y)
        })
        .show(ui, move |plot_ui| {
            plot_ui.line(Line::new(predicted).name("Forecast").color(FORECAST_COLOR).width(2.0));
            plot_ui.line(Line::new(actual).name("Actual").color(ACTUAL_COLOR).width(2.0));
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_numbers_round_trip_through_the_axis_formatter() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 23).unwrap();
        assert_eq!(format_day(day_number(date)), "2024-03-23");
        assert_eq!(format_day(day_number(date) + 0.2), "2024-03-23");
    }
}
