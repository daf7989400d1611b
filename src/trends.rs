//! Time-bucketed trend series over a window.
//!
//! Every calendar unit touching the window gets a bucket, including units with
//! no trips, and buckets are always in ascending order.

use crate::types::{DateRange, Granularity, TrendBucket, TrendSeries, TripRecord};
use crate::util::round_to;
use chrono::{Datelike, Duration, Months, NaiveDate};

/// Month buckets once the window spans more than `threshold_days`, day
/// buckets otherwise.
pub fn granularity_for(range: &DateRange, threshold_days: i64) -> Granularity {
    if range.span_days() > threshold_days {
        Granularity::Month
    } else {
        Granularity::Day
    }
}

pub fn bucketize(trips: &[&TripRecord], range: &DateRange, threshold_days: i64) -> TrendSeries {
    let granularity = granularity_for(range, threshold_days);
    let mut buckets = empty_buckets(range, granularity);

    for trip in trips {
        if !range.contains(trip.start_date) {
            continue;
        }
        let idx = bucket_index(range.from, trip.start_date, granularity);
        if let Some(bucket) = buckets.get_mut(idx) {
            bucket.trips += 1;
            bucket.travelers += u64::from(trip.travelers);
            bucket.budget += trip.planned_budget.max(0.0);
        }
    }
    for bucket in &mut buckets {
        bucket.budget = round_to(bucket.budget, 2);
    }

    tracing::debug!(
        granularity = ?granularity,
        buckets = buckets.len(),
        "trend series built"
    );
    TrendSeries {
        granularity,
        buckets,
    }
}

fn month_ordinal(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 12 + i64::from(date.month0())
}

fn bucket_index(origin: NaiveDate, date: NaiveDate, granularity: Granularity) -> usize {
    let idx = match granularity {
        Granularity::Day => (date - origin).num_days(),
        Granularity::Month => month_ordinal(date) - month_ordinal(origin),
    };
    usize::try_from(idx).unwrap_or(usize::MAX)
}

fn empty_buckets(range: &DateRange, granularity: Granularity) -> Vec<TrendBucket> {
    let mut buckets = Vec::new();
    match granularity {
        Granularity::Day => {
            let mut day = range.from;
            while day <= range.to {
                buckets.push(zero_bucket(day.format("%Y-%m-%d").to_string(), day));
                match day.checked_add_signed(Duration::days(1)) {
                    Some(next) => day = next,
                    None => break,
                }
            }
        }
        Granularity::Month => {
            let last = month_ordinal(range.to);
            let mut month = range.from.with_day(1).unwrap_or(range.from);
            while month_ordinal(month) <= last {
                buckets.push(zero_bucket(month.format("%Y-%m").to_string(), month));
                match month.checked_add_months(Months::new(1)) {
                    Some(next) => month = next,
                    None => break,
                }
            }
        }
    }
    buckets
}

fn zero_bucket(label: String, start: NaiveDate) -> TrendBucket {
    TrendBucket {
        label,
        start,
        trips: 0,
        travelers: 0,
        budget: 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TripStatus;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn trip(id: &str, start: &str, travelers: u32) -> TripRecord {
        let mut t = TripRecord::new(id, TripStatus::Active, d(start), d(start));
        t.travelers = travelers;
        t.planned_budget = 100.0;
        t
    }

    #[test]
    fn short_window_uses_day_buckets_with_gaps_filled() {
        let trips = vec![trip("a", "2024-03-01", 2), trip("b", "2024-03-03", 4), trip("c", "2024-03-03", 1)];
        let refs: Vec<&TripRecord> = trips.iter().collect();
        let range = DateRange::new(d("2024-03-01"), d("2024-03-05"));
        let series = bucketize(&refs, &range, 60);

        assert_eq!(series.granularity, Granularity::Day);
        assert_eq!(series.buckets.len(), 5);
        let counts: Vec<usize> = series.buckets.iter().map(|b| b.trips).collect();
        assert_eq!(counts, vec![1, 0, 2, 0, 0]);
        assert_eq!(series.buckets[2].travelers, 5);
        assert_eq!(series.buckets[2].budget, 200.0);
        assert_eq!(series.buckets[0].label, "2024-03-01");
    }

    #[test]
    fn long_window_uses_month_buckets() {
        let trips = vec![trip("a", "2024-01-20", 1), trip("b", "2024-04-02", 3), trip("x", "2024-05-01", 9)];
        let refs: Vec<&TripRecord> = trips.iter().collect();
        let range = DateRange::new(d("2024-01-15"), d("2024-04-15"));
        let series = bucketize(&refs, &range, 60);

        assert_eq!(series.granularity, Granularity::Month);
        let labels: Vec<&str> = series.buckets.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["2024-01", "2024-02", "2024-03", "2024-04"]);
        let counts: Vec<usize> = series.buckets.iter().map(|b| b.trips).collect();
        assert_eq!(counts, vec![1, 0, 0, 1]);
    }

    #[test]
    fn bucket_starts_strictly_increase() {
        let range = DateRange::new(d("2023-11-30"), d("2025-02-01"));
        let series = bucketize(&[], &range, 60);
        assert_eq!(series.buckets.len(), 16);
        assert!(series.buckets.windows(2).all(|w| w[0].start < w[1].start));
        assert!(series.buckets.iter().all(|b| b.trips == 0));
    }

    #[test]
    fn threshold_boundary_stays_daily() {
        let range = DateRange::new(d("2024-01-01"), d("2024-03-01"));
        assert_eq!(range.span_days(), 60);
        assert_eq!(granularity_for(&range, 60), Granularity::Day);
        assert_eq!(bucketize(&[], &range, 60).buckets.len(), 61);
    }

    #[test]
    fn zero_length_window_has_one_bucket() {
        let trips = vec![trip("a", "2024-06-01", 2)];
        let refs: Vec<&TripRecord> = trips.iter().collect();
        let range = DateRange::new(d("2024-06-01"), d("2024-06-01"));
        let series = bucketize(&refs, &range, 60);
        assert_eq!(series.buckets.len(), 1);
        assert_eq!(series.buckets[0].trips, 1);
    }
}
