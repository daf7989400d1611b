//! Categorical breakdowns: district, segment, status, interest, budget range.

use crate::types::{BreakdownRow, DistrictRecord, HistogramRow, TripRecord, TripStatus};
use crate::util::{apportion_percentages, format_number, percentage};
use std::collections::HashMap;

pub const UNKNOWN_DISTRICT: &str = "Unknown";
pub const UNSPECIFIED_SEGMENT: &str = "Unspecified";

/// Count trips per derived key. Rows come back ordered by count descending,
/// then key ascending. Every trip lands in exactly one row, so the
/// percentages are apportioned to total 100.
pub fn group_by_key<F>(trips: &[&TripRecord], key_of: F) -> Vec<BreakdownRow>
where
    F: Fn(&TripRecord) -> String,
{
    let mut counts: HashMap<String, usize> = HashMap::new();
    for trip in trips {
        *counts.entry(key_of(trip)).or_default() += 1;
    }
    let mut rows = rows_from_counts(counts, trips.len());
    apportion_rows(&mut rows);
    rows
}

fn apportion_rows(rows: &mut [BreakdownRow]) {
    let counts: Vec<usize> = rows.iter().map(|r| r.count).collect();
    for (row, pct) in rows.iter_mut().zip(apportion_percentages(&counts)) {
        row.percentage = pct;
    }
}

fn rows_from_counts(counts: HashMap<String, usize>, total: usize) -> Vec<BreakdownRow> {
    let mut rows: Vec<BreakdownRow> = counts
        .into_iter()
        .map(|(key, count)| BreakdownRow {
            percentage: percentage(count, total),
            key,
            count,
        })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
    rows
}

/// Trips per district name, keyed by each trip's primary district. Trips with
/// no district, or one missing from `districts`, land in `Unknown`.
pub fn by_district(trips: &[&TripRecord], districts: &[DistrictRecord]) -> Vec<BreakdownRow> {
    let names: HashMap<&str, &str> = districts
        .iter()
        .map(|d| (d.id.as_str(), d.name.as_str()))
        .collect();
    group_by_key(trips, |t| {
        t.primary_district()
            .and_then(|id| names.get(id))
            .map(|name| name.to_string())
            .unwrap_or_else(|| UNKNOWN_DISTRICT.to_string())
    })
}

pub fn by_segment(trips: &[&TripRecord]) -> Vec<BreakdownRow> {
    group_by_key(trips, |t| {
        t.segment
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(UNSPECIFIED_SEGMENT)
            .to_string()
    })
}

/// All four statuses, always, in legend order.
pub fn by_status(trips: &[&TripRecord]) -> Vec<BreakdownRow> {
    let mut rows: Vec<BreakdownRow> = TripStatus::ALL
        .iter()
        .map(|status| BreakdownRow {
            key: status.as_str().to_string(),
            count: trips.iter().filter(|t| t.status == *status).count(),
            percentage: 0.0,
        })
        .collect();
    apportion_rows(&mut rows);
    rows
}

/// Trips carrying each interest tag. A trip counts once per distinct tag, and
/// the percentage is of all trips, so rows need not sum to 100.
pub fn by_interest(trips: &[&TripRecord]) -> Vec<BreakdownRow> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for trip in trips {
        let mut seen: Vec<&str> = Vec::new();
        for tag in &trip.interests {
            let tag = tag.trim();
            if tag.is_empty() || seen.contains(&tag) {
                continue;
            }
            seen.push(tag);
            *counts.entry(tag.to_string()).or_default() += 1;
        }
    }
    rows_from_counts(counts, trips.len())
}

/// Half-open `[low, high)` budget ranges over planned budget; the last range
/// is open-ended. Negative budgets count as 0, and the configured boundaries
/// start at or below 0, so every trip has a range.
pub fn budget_histogram(trips: &[&TripRecord], boundaries: &[f64]) -> Vec<HistogramRow> {
    if boundaries.is_empty() {
        return Vec::new();
    }
    let mut counts = vec![0usize; boundaries.len()];
    for trip in trips {
        let budget = trip.planned_budget.max(0.0);
        // Index of the last boundary <= budget.
        let idx = boundaries
            .iter()
            .rposition(|low| budget >= *low)
            .unwrap_or(0);
        counts[idx] += 1;
    }

    let shares = apportion_percentages(&counts);
    counts
        .into_iter()
        .zip(shares)
        .enumerate()
        .map(|(i, (count, percentage))| HistogramRow {
            range: range_label(boundaries, i),
            count,
            percentage,
        })
        .collect()
}

fn range_label(boundaries: &[f64], i: usize) -> String {
    let low = format_number(boundaries[i], 0);
    match boundaries.get(i + 1) {
        Some(high) => format!("{}-{}", low, format_number(*high, 0)),
        None => format!("{}+", low),
    }
}
