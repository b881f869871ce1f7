use std::fmt;

use serde::Serialize;
use thiserror::Error;

use super::model::{Booking, BookingStatus, Dataset};

// ---------------------------------------------------------------------------
// Selection: the current value of each filter control
// ---------------------------------------------------------------------------

/// A control value that is either "All" (no constraint) or one exact value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Choice<T> {
    All,
    Only(T),
}

impl<T> Default for Choice<T> {
    fn default() -> Self {
        Choice::All
    }
}

impl<T: PartialEq> Choice<T> {
    /// `All` accepts everything; `Only(v)` accepts exactly `v`.
    pub fn accepts(&self, value: &T) -> bool {
        match self {
            Choice::All => true,
            Choice::Only(v) => v == value,
        }
    }
}

impl<T: fmt::Display> fmt::Display for Choice<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Choice::All => f.write_str("All"),
            Choice::Only(v) => write!(f, "{v}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("hour range {start}-{end} is not within 0-23 with start <= end")]
    InvalidHourRange { start: u8, end: u8 },
}

/// Inclusive pickup-hour bounds, `0 <= start <= end <= 23`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct HourRange {
    start: u8,
    end: u8,
}

impl HourRange {
    pub const FULL_DAY: HourRange = HourRange { start: 0, end: 23 };

    pub fn new(start: u8, end: u8) -> Result<Self, SelectionError> {
        if start > end || end > 23 {
            return Err(SelectionError::InvalidHourRange { start, end });
        }
        Ok(HourRange { start, end })
    }

    pub fn start(&self) -> u8 {
        self.start
    }

    pub fn end(&self) -> u8 {
        self.end
    }

    pub fn contains(&self, hour: u8) -> bool {
        (self.start..=self.end).contains(&hour)
    }
}

impl Default for HourRange {
    fn default() -> Self {
        HourRange::FULL_DAY
    }
}

impl fmt::Display for HourRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02}", self.start, self.end)
    }
}

/// Everything the filter engine needs to know about the controls.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Selection {
    pub status: Choice<BookingStatus>,
    pub vehicle: Choice<String>,
    pub hours: HourRange,
}

impl Selection {
    /// Conjunction of the three predicates.
    pub fn matches(&self, booking: &Booking) -> bool {
        self.status.accepts(&booking.status)
            && self.vehicle.accepts(&booking.vehicle_type)
            && self.hours.contains(booking.hour())
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "status={} vehicle={} hours={}",
            self.status, self.vehicle, self.hours
        )
    }
}

// ---------------------------------------------------------------------------
// FilteredView: read-only subset of the dataset
// ---------------------------------------------------------------------------

/// Row indices of the bookings that pass a selection, in dataset order.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    dataset: &'a Dataset,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    /// The unfiltered view over every booking.
    pub fn all(dataset: &'a Dataset) -> Self {
        FilteredView {
            dataset,
            indices: (0..dataset.len()).collect(),
        }
    }

    /// Apply `selection` again on top of this view.
    pub fn refine(&self, selection: &Selection) -> FilteredView<'a> {
        let indices = self
            .indices
            .iter()
            .copied()
            .filter(|&i| selection.matches(&self.dataset.bookings()[i]))
            .collect();
        FilteredView {
            dataset: self.dataset,
            indices,
        }
    }

    /// The dataset this view selects from.
    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    #[cfg(test)]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Booking> + '_ {
        let bookings = self.dataset.bookings();
        self.indices.iter().map(move |&i| &bookings[i])
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Return the bookings of `dataset` that pass `selection`.
///
/// Pure: the same inputs always give the same view, and an empty result is
/// just an empty view.
pub fn filter<'a>(dataset: &'a Dataset, selection: &Selection) -> FilteredView<'a> {
    FilteredView::all(dataset).refine(selection)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::data::model::fixtures::{booking, three_rows};

    #[test]
    fn three_row_example() {
        let ds = three_rows();
        let sel = Selection {
            status: Choice::Only(BookingStatus::Complete),
            ..Selection::default()
        };
        let view = filter(&ds, &sel);
        assert_eq!(view.indices(), &[0, 2]);
    }

    #[test]
    fn hour_bounds_are_inclusive() {
        let ds = three_rows();
        let sel = Selection {
            hours: HourRange::new(8, 14).unwrap(),
            ..Selection::default()
        };
        assert_eq!(filter(&ds, &sel).indices(), &[0, 1]);

        let sel = Selection {
            hours: HourRange::new(20, 20).unwrap(),
            ..Selection::default()
        };
        assert_eq!(filter(&ds, &sel).indices(), &[2]);
    }

    #[test]
    fn no_match_gives_empty_view() {
        let ds = three_rows();
        let sel = Selection {
            vehicle: Choice::Only("Bike".to_string()),
            ..Selection::default()
        };
        let view = filter(&ds, &sel);
        assert!(view.is_empty());
        assert_eq!(view.iter().count(), 0);
    }

    #[test]
    fn invalid_hour_ranges_are_rejected() {
        assert!(HourRange::new(10, 9).is_err());
        assert!(HourRange::new(0, 24).is_err());
        assert!(HourRange::new(23, 23).is_ok());
    }

    // -- property tests --

    const VEHICLES: [&str; 3] = ["Auto", "Go Mini", "Bike"];

    fn arbitrary_dataset() -> impl Strategy<Value = Dataset> {
        prop::collection::vec((0usize..5, 0usize..3, 0u32..24), 0..60).prop_map(|rows| {
            Dataset::from_bookings(
                rows.into_iter()
                    .map(|(s, v, h)| {
                        booking(BookingStatus::KNOWN[s].clone(), VEHICLES[v], "2024-05-01", h)
                    })
                    .collect(),
            )
        })
    }

    fn arbitrary_selection() -> impl Strategy<Value = Selection> {
        let status = prop_oneof![
            Just(Choice::All),
            (0usize..5).prop_map(|i| Choice::Only(BookingStatus::KNOWN[i].clone())),
        ];
        let vehicle = prop_oneof![
            Just(Choice::All),
            (0usize..3).prop_map(|i| Choice::Only(VEHICLES[i].to_string())),
        ];
        let hours = (0u8..24, 0u8..24).prop_map(|(a, b)| {
            HourRange::new(a.min(b), a.max(b)).expect("ordered bounds")
        });
        (status, vehicle, hours).prop_map(|(status, vehicle, hours)| Selection {
            status,
            vehicle,
            hours,
        })
    }

    proptest! {
        #[test]
        fn every_row_satisfies_the_selection(ds in arbitrary_dataset(), sel in arbitrary_selection()) {
            let view = filter(&ds, &sel);
            for b in view.iter() {
                prop_assert!(sel.status.accepts(&b.status));
                prop_assert!(sel.vehicle.accepts(&b.vehicle_type));
                prop_assert!(sel.hours.start() <= b.hour() && b.hour() <= sel.hours.end());
            }
            // And nothing that matches was left out.
            let expected = ds.bookings().iter().filter(|b| sel.matches(b)).count();
            prop_assert_eq!(view.len(), expected);
        }

        #[test]
        fn filtering_is_idempotent(ds in arbitrary_dataset(), sel in arbitrary_selection()) {
            let once = filter(&ds, &sel);
            let twice = once.refine(&sel);
            prop_assert_eq!(once.indices(), twice.indices());
        }
    }
}
