//! Orchestration: one dataset and one window in, one `AnalyticsSnapshot` out.

use crate::breakdown::{budget_histogram, by_district, by_interest, by_segment, by_status};
use crate::config::AnalyticsConfig;
use crate::error::Result;
use crate::loader::RecordSource;
use crate::overview::{compare_overviews, compute_overview};
use crate::period::{resolve_periods, trips_in_window};
use crate::ranking::{discovery_stats, recent_activity, top_places};
use crate::trends::bucketize;
use crate::types::{AnalyticsSnapshot, Dataset, DateRange};
use chrono::{Local, NaiveDate};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SnapshotRequest {
    pub window: Option<DateRange>,
    /// Overrides the configured top-places limit.
    pub top_n: Option<usize>,
}

/// Run every calculator over `data`. Pure; performs no I/O.
///
/// Window-scoped figures use the current window. Top places and recent
/// activity always use the full trip set.
pub fn build_snapshot(
    data: &Dataset,
    request: &SnapshotRequest,
    config: &AnalyticsConfig,
    today: NaiveDate,
) -> AnalyticsSnapshot {
    let period = resolve_periods(request.window, today, config.lookback_months);
    let current = trips_in_window(&data.trips, &period.current);
    let previous = trips_in_window(&data.trips, &period.previous);
    tracing::debug!(
        current_window = %period.current,
        previous_window = %period.previous,
        current_trips = current.len(),
        previous_trips = previous.len(),
        "resolved periods"
    );

    let overview = compute_overview(&current);
    let comparison = compare_overviews(&overview, &compute_overview(&previous));
    let top_n = request.top_n.unwrap_or(config.top_places);

    AnalyticsSnapshot {
        period,
        overview,
        comparison,
        trend: bucketize(&current, &period.current, config.month_bucket_threshold_days),
        districts: by_district(&current, &data.districts),
        segments: by_segment(&current),
        statuses: by_status(&current),
        interests: by_interest(&current),
        budget_histogram: budget_histogram(&current, &config.budget_boundaries),
        top_places: top_places(&data.trips, &data.places, &data.districts, top_n),
        recent_activity: recent_activity(&data.trips, &data.districts, config.recent_activity),
        discovery: discovery_stats(&current, &data.places),
    }
}

/// Fetch all three collections concurrently. The first failure aborts the
/// whole fetch.
pub async fn fetch_dataset<S>(source: &S) -> Result<Dataset>
where
    S: RecordSource + ?Sized,
{
    let (trips, places, districts) = tokio::try_join!(
        source.fetch_trips(),
        source.fetch_places(),
        source.fetch_districts(),
    )?;
    tracing::info!(
        trips = trips.len(),
        places = places.len(),
        districts = districts.len(),
        "dataset ready"
    );
    Ok(Dataset {
        trips,
        places,
        districts,
    })
}

/// Fetch from `source`, then build a snapshot dated `today`.
pub async fn fetch_and_build<S>(
    source: &S,
    request: &SnapshotRequest,
    config: &AnalyticsConfig,
    today: NaiveDate,
) -> Result<AnalyticsSnapshot>
where
    S: RecordSource + ?Sized,
{
    let data = fetch_dataset(source).await?;
    Ok(build_snapshot(&data, request, config, today))
}

/// `build_snapshot` against the local calendar date.
pub fn build_snapshot_now(
    data: &Dataset,
    request: &SnapshotRequest,
    config: &AnalyticsConfig,
) -> AnalyticsSnapshot {
    build_snapshot(data, request, config, Local::now().date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PercentChange, TripRecord, TripStatus};

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn empty_dataset_builds_a_zeroed_snapshot() {
        let snap = build_snapshot(
            &Dataset::default(),
            &SnapshotRequest::default(),
            &AnalyticsConfig::default(),
            d("2024-07-01"),
        );
        assert_eq!(snap.overview.total_trips, 0);
        assert_eq!(snap.comparison.trips, PercentChange::Percent(0.0));
        assert_eq!(snap.statuses.len(), 4);
        assert!(snap.districts.is_empty());
        assert_eq!(snap.budget_histogram.len(), 5);
        assert!(snap.top_places.is_empty());
        assert!(snap.recent_activity.is_empty());
        assert_eq!(snap.trend.buckets.len(), 7);
    }

    #[test]
    fn window_scoped_and_all_time_figures_differ() {
        let mut data = Dataset::default();
        let mut old = TripRecord::new("old", TripStatus::Completed, d("2020-01-01"), d("2020-01-03"));
        old.place_ids = vec!["p1".into()];
        let fresh = TripRecord::new("new", TripStatus::Active, d("2024-06-10"), d("2024-06-12"));
        data.trips = vec![old, fresh];
        data.places = vec![crate::types::PlaceRecord {
            id: "p1".into(),
            name: "Menara Alor Setar".into(),
            district_id: None,
            hidden_gem: false,
            rating: None,
        }];

        let request = SnapshotRequest {
            window: Some(DateRange::new(d("2024-06-01"), d("2024-06-30"))),
            top_n: Some(3),
        };
        let snap = build_snapshot(&data, &request, &AnalyticsConfig::default(), d("2024-07-01"));

        assert_eq!(snap.overview.total_trips, 1);
        assert_eq!(snap.comparison.trips, PercentChange::Unbounded);
        assert_eq!(snap.top_places.len(), 1);
        assert_eq!(snap.recent_activity.len(), 2);
        assert_eq!(snap.recent_activity[0].id, "new");
        assert_eq!(snap.trend.buckets.len(), 30);
    }
}
