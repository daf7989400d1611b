//! Scalar KPIs for one window and percent deltas between two windows.

use crate::types::{Comparison, Overview, PercentChange, TripRecord, TripStatus};
use crate::util::{average, days_diff, round_to};

/// KPIs over an already window-filtered trip set. Empty input yields zeros.
pub fn compute_overview(trips: &[&TripRecord]) -> Overview {
    let total_trips = trips.len();
    if total_trips == 0 {
        return Overview::default();
    }

    let total_travelers: u64 = trips.iter().map(|t| u64::from(t.travelers)).sum();
    let total_budget: f64 = trips.iter().map(|t| t.planned_budget.max(0.0)).sum();
    let completed = trips
        .iter()
        .filter(|t| t.status == TripStatus::Completed)
        .count();
    // A trip ending before it starts contributes zero days, never negative.
    let durations: Vec<f64> = trips
        .iter()
        .map(|t| days_diff(t.start_date, t.end_date).max(0.0))
        .collect();

    Overview {
        total_trips,
        total_travelers,
        total_budget: round_to(total_budget, 2),
        average_budget: round_to(total_budget / total_trips as f64, 2),
        completion_rate: round_to(completed as f64 / total_trips as f64 * 100.0, 1),
        average_duration_days: round_to(average(&durations), 1),
    }
}

/// `(current - previous) / previous * 100`, one decimal.
///
/// Zero against zero is no change; growth from a zero baseline is
/// `Unbounded` rather than an infinite number.
pub fn percent_change(current: f64, previous: f64) -> PercentChange {
    if previous == 0.0 {
        return if current == 0.0 {
            PercentChange::Percent(0.0)
        } else {
            PercentChange::Unbounded
        };
    }
    PercentChange::Percent(round_to((current - previous) / previous * 100.0, 1))
}

pub fn compare_overviews(current: &Overview, previous: &Overview) -> Comparison {
    Comparison {
        trips: percent_change(current.total_trips as f64, previous.total_trips as f64),
        travelers: percent_change(
            current.total_travelers as f64,
            previous.total_travelers as f64,
        ),
        budget: percent_change(current.total_budget, previous.total_budget),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn trip(id: &str, status: TripStatus, start: &str, days: i64, budget: f64) -> TripRecord {
        let start = d(start);
        let mut t = TripRecord::new(id, status, start, start + chrono::Duration::days(days));
        t.planned_budget = budget;
        t
    }

    #[test]
    fn overview_of_two_trips() {
        let trips = vec![
            trip("t1", TripStatus::Completed, "2024-01-05", 3, 100.0),
            trip("t2", TripStatus::Active, "2024-02-10", 5, 300.0),
        ];
        let refs: Vec<&TripRecord> = trips.iter().collect();
        let o = compute_overview(&refs);
        assert_eq!(o.total_trips, 2);
        assert_eq!(o.total_travelers, 2);
        assert_eq!(o.total_budget, 400.0);
        assert_eq!(o.average_budget, 200.0);
        assert_eq!(o.completion_rate, 50.0);
        assert_eq!(o.average_duration_days, 4.0);
    }

    #[test]
    fn overview_of_nothing_is_all_zero() {
        let o = compute_overview(&[]);
        assert_eq!(o, Overview::default());
        assert!(o.average_budget.is_finite());
    }

    #[test]
    fn reversed_dates_do_not_go_negative() {
        let mut t = trip("t1", TripStatus::Draft, "2024-03-10", 0, 50.0);
        t.end_date = d("2024-03-01");
        let o = compute_overview(&[&t]);
        assert_eq!(o.average_duration_days, 0.0);
    }

    #[test]
    fn percent_change_edge_cases() {
        assert_eq!(percent_change(0.0, 0.0), PercentChange::Percent(0.0));
        assert_eq!(percent_change(5.0, 0.0), PercentChange::Unbounded);
        assert_eq!(percent_change(15.0, 10.0), PercentChange::Percent(50.0));
        assert_eq!(percent_change(0.0, 4.0), PercentChange::Percent(-100.0));
        assert_eq!(percent_change(10.0, 3.0), PercentChange::Percent(233.3));
    }

    #[test]
    fn comparison_covers_three_metrics() {
        let current = Overview {
            total_trips: 4,
            total_travelers: 10,
            total_budget: 1000.0,
            ..Overview::default()
        };
        let previous = Overview {
            total_trips: 2,
            total_travelers: 0,
            total_budget: 1000.0,
            ..Overview::default()
        };
        let c = compare_overviews(&current, &previous);
        assert_eq!(c.trips, PercentChange::Percent(100.0));
        assert_eq!(c.travelers, PercentChange::Unbounded);
        assert_eq!(c.budget, PercentChange::Percent(0.0));
    }
}
