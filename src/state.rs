use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::data::aggregate::{
    distance_histogram, distance_vs_rating, hourly_counts, status_breakdown, status_summary,
    top_pickup_and_drop, top_pickup_locations, HistogramBin, LabeledLocation, LocationCount,
    ScatterPoint, StatusSummary, HISTOGRAM_BINS, TOP_PICKUPS, TOP_PICKUP_DROP,
};
use crate::data::filter::{filter, Choice, FilteredView, HourRange, Selection};
use crate::data::model::{BookingStatus, Dataset};
use crate::forecast::{forecast, ForecastArtifact, Predictor};

// ---------------------------------------------------------------------------
// Controls, surfaces and artifacts
// ---------------------------------------------------------------------------

/// A filter control the user can change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Status,
    Vehicle,
    Hours,
}

const ALL_CONTROLS: &[Control] = &[Control::Status, Control::Vehicle, Control::Hours];

/// A place on the dashboard that displays one artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceId {
    Summary,
    StatusChart,
    HourlyChart,
    DistanceHistogram,
    Scatter,
    TopPickups,
    Forecast,
    TopPickupDrop,
}

/// Display-ready output of one aggregator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Artifact {
    Summary(StatusSummary),
    GroupedCounts(Vec<(String, usize)>),
    HourlyCounts(Vec<(u8, usize)>),
    Histogram(Vec<HistogramBin>),
    Scatter(Vec<ScatterPoint>),
    TopLocations(Vec<LocationCount>),
    LabeledLocations(Vec<LabeledLocation>),
    Forecast(ForecastArtifact),
    Message(String),
}

/// Receives freshly computed artifacts.
///
/// `generation` increases with every recompute; a sink may drop anything
/// older than what it already shows.
pub trait ArtifactSink {
    fn publish(&mut self, generation: u64, surface: SurfaceId, artifact: Artifact);
}

/// Latest artifact per surface, read by the panels when drawing.
#[derive(Debug, Default)]
pub struct ArtifactBoard {
    generation: u64,
    artifacts: BTreeMap<SurfaceId, Artifact>,
}

impl ArtifactBoard {
    pub fn get(&self, surface: SurfaceId) -> Option<&Artifact> {
        self.artifacts.get(&surface)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn artifacts(&self) -> &BTreeMap<SurfaceId, Artifact> {
        &self.artifacts
    }
}

impl ArtifactSink for ArtifactBoard {
    fn publish(&mut self, generation: u64, surface: SurfaceId, artifact: Artifact) {
        if generation < self.generation {
            log::debug!("dropping stale {surface:?} from generation {generation}");
            return;
        }
        self.generation = generation;
        self.artifacts.insert(surface, artifact);
    }
}

// ---------------------------------------------------------------------------
// Subscriptions
// ---------------------------------------------------------------------------

type Compute = fn(&FilteredView<'_>, &dyn Predictor) -> Artifact;

/// One surface, the controls it depends on, and how to compute its artifact.
pub struct Subscription {
    pub surface: SurfaceId,
    pub controls: &'static [Control],
    compute: Compute,
}

impl Subscription {
    pub fn new(surface: SurfaceId, controls: &'static [Control], compute: Compute) -> Self {
        Subscription {
            surface,
            controls,
            compute,
        }
    }

    pub fn depends_on(&self, control: Control) -> bool {
        self.controls.contains(&control)
    }
}

fn forecast_artifact(view: &FilteredView<'_>, predictor: &dyn Predictor) -> Artifact {
    match forecast(view, predictor) {
        Ok(f) => Artifact::Forecast(f),
        Err(e) => {
            log::warn!("forecast failed: {e}");
            Artifact::Message(format!("Forecast unavailable: {e}"))
        }
    }
}

/// Every dashboard surface, each depending on all three controls.
pub fn default_subscriptions() -> Vec<Subscription> {
    vec![
        Subscription::new(SurfaceId::Summary, ALL_CONTROLS, |v, _| {
            Artifact::Summary(status_summary(v))
        }),
        Subscription::new(SurfaceId::StatusChart, ALL_CONTROLS, |v, _| {
            Artifact::GroupedCounts(status_breakdown(v))
        }),
        Subscription::new(SurfaceId::HourlyChart, ALL_CONTROLS, |v, _| {
            Artifact::HourlyCounts(hourly_counts(v))
        }),
        Subscription::new(SurfaceId::DistanceHistogram, ALL_CONTROLS, |v, _| {
            Artifact::Histogram(distance_histogram(v, HISTOGRAM_BINS))
        }),
        Subscription::new(SurfaceId::Scatter, ALL_CONTROLS, |v, _| {
            Artifact::Scatter(distance_vs_rating(v))
        }),
        Subscription::new(SurfaceId::TopPickups, ALL_CONTROLS, |v, _| {
            Artifact::TopLocations(top_pickup_locations(v, TOP_PICKUPS))
        }),
        Subscription::new(SurfaceId::Forecast, ALL_CONTROLS, forecast_artifact),
        Subscription::new(SurfaceId::TopPickupDrop, ALL_CONTROLS, |v, _| {
            Artifact::LabeledLocations(top_pickup_and_drop(v, TOP_PICKUP_DROP))
        }),
    ]
}

// ---------------------------------------------------------------------------
// Dashboard: selection state + recompute
// ---------------------------------------------------------------------------

/// The reactive core: current selection, the dataset it filters, and the
/// subscriptions to recompute when a control changes.
pub struct Dashboard {
    dataset: Arc<Dataset>,
    selection: Selection,
    predictor: Box<dyn Predictor>,
    subscriptions: Vec<Subscription>,
    generation: u64,
    /// Selection the last publish was computed for.
    published: Option<Selection>,
}

impl Dashboard {
    pub fn new(dataset: Arc<Dataset>, predictor: Box<dyn Predictor>) -> Self {
        Dashboard {
            dataset,
            selection: Selection::default(),
            predictor,
            subscriptions: default_subscriptions(),
            generation: 0,
            published: None,
        }
    }

    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    #[cfg(test)]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The filtered view for the current selection.
    pub fn view(&self) -> FilteredView<'_> {
        filter(&self.dataset, &self.selection)
    }

    /// Swap in a newly loaded dataset, reset the controls and republish.
    pub fn replace_dataset(&mut self, dataset: Arc<Dataset>, sink: &mut dyn ArtifactSink) {
        self.dataset = dataset;
        self.selection = Selection::default();
        self.refresh(sink);
    }

    pub fn set_status(&mut self, status: Choice<BookingStatus>, sink: &mut dyn ArtifactSink) {
        self.selection.status = status;
        self.changed(Control::Status, sink);
    }

    pub fn set_vehicle(&mut self, vehicle: Choice<String>, sink: &mut dyn ArtifactSink) {
        self.selection.vehicle = vehicle;
        self.changed(Control::Vehicle, sink);
    }

    pub fn set_hours(&mut self, hours: HourRange, sink: &mut dyn ArtifactSink) {
        self.selection.hours = hours;
        self.changed(Control::Hours, sink);
    }

    /// Recompute and publish every subscription unconditionally.
    pub fn refresh(&mut self, sink: &mut dyn ArtifactSink) {
        self.recompute(sink);
    }

    /// Every aggregator reads the whole selection, so any change republishes
    /// every surface, not just the ones bound to `control`.
    fn changed(&mut self, control: Control, sink: &mut dyn ArtifactSink) {
        if self.published.as_ref() == Some(&self.selection) {
            return;
        }
        log::debug!(
            "{control:?} changed; bound surfaces: {:?}",
            self.subscriptions
                .iter()
                .filter(|sub| sub.depends_on(control))
                .map(|sub| sub.surface)
                .collect::<Vec<_>>()
        );
        self.recompute(sink);
    }

    fn recompute(&mut self, sink: &mut dyn ArtifactSink) {
        self.generation += 1;
        let view = filter(&self.dataset, &self.selection);
        log::debug!(
            "recompute #{} [{}]: {} of {} rides",
            self.generation,
            self.selection,
            view.len(),
            self.dataset.len()
        );

        for sub in &self.subscriptions {
            let artifact = (sub.compute)(&view, self.predictor.as_ref());
            sink.publish(self.generation, sub.surface, artifact);
        }
        self.published = Some(self.selection.clone());
    }
}
