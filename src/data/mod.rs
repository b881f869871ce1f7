/// Data layer: bookings, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///   bookings .csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse rows, derive pickup hour → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ Dataset  │  Vec<Booking>, observed statuses / vehicle types
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  Selection → FilteredView (row indices)
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate │  FilteredView → counts, histogram, top-N, scatter
///   └───────────┘
/// ```

pub mod aggregate;
pub mod filter;
pub mod loader;
pub mod model;
