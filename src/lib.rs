//! Analytics aggregation for the tourism operations dashboard.
//!
//! Raw trip, place and district records go in; one [`AnalyticsSnapshot`]
//! comes out, holding period-over-period KPIs, trend buckets, categorical
//! breakdowns, a budget histogram, top places and a recent-activity feed.

pub mod breakdown;
pub mod config;
pub mod error;
pub mod loader;
pub mod output;
pub mod overview;
pub mod period;
pub mod ranking;
pub mod snapshot;
pub mod trends;
pub mod types;
pub mod util;

pub use config::AnalyticsConfig;
pub use error::{AnalyticsError, Result};
pub use loader::{CsvSource, RecordSource};
pub use snapshot::{build_snapshot, build_snapshot_now, fetch_and_build, fetch_dataset, SnapshotRequest};
pub use types::{
    AnalyticsSnapshot, Dataset, DateRange, DistrictRecord, PercentChange, PlaceRecord,
    TripRecord, TripStatus,
};
