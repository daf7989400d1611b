use crate::breakdown::UNKNOWN_DISTRICT;
use crate::types::{
    ActivityEntry, DiscoveryStats, DistrictRecord, PlaceRecord, TopPlace, TripRecord, TripStatus,
};
use crate::util::{percentage, round_to};
use std::collections::HashMap;

pub const DEFAULT_TOP_N: usize = 5;

#[derive(Default)]
struct VisitAcc {
    visits: usize,
    rating_sum: f64,
    rated: usize,
}

/// Most visited places across `trips`.
///
/// Every reference counts, including repeats within one trip. References to
/// ids missing from `places` are skipped. Ties on visits are broken by place
/// name, then id, using plain ordinal comparison.
pub fn top_places(
    trips: &[TripRecord],
    places: &[PlaceRecord],
    districts: &[DistrictRecord],
    limit: usize,
) -> Vec<TopPlace> {
    let place_by_id: HashMap<&str, &PlaceRecord> =
        places.iter().map(|p| (p.id.as_str(), p)).collect();
    let district_names: HashMap<&str, &str> = districts
        .iter()
        .map(|d| (d.id.as_str(), d.name.as_str()))
        .collect();

    let mut acc: HashMap<&str, VisitAcc> = HashMap::new();
    for trip in trips {
        for place_id in &trip.place_ids {
            let Some(place) = place_by_id.get(place_id.as_str()) else {
                continue;
            };
            let e = acc.entry(place.id.as_str()).or_default();
            e.visits += 1;
            if let Some(r) = trip.rating.filter(|r| r.is_finite()) {
                e.rating_sum += r;
                e.rated += 1;
            }
        }
    }

    let mut ranked: Vec<TopPlace> = acc
        .into_iter()
        .filter_map(|(id, v)| {
            let place = place_by_id.get(id)?;
            // Trip ratings first, the place's own rating when no trip rated it.
            let rating = if v.rated > 0 {
                Some(round_to(v.rating_sum / v.rated as f64, 1))
            } else {
                place.rating.filter(|r| r.is_finite())
            };
            let district = place
                .district_id
                .as_deref()
                .and_then(|d| district_names.get(d))
                .map(|n| n.to_string())
                .unwrap_or_else(|| UNKNOWN_DISTRICT.to_string());
            Some(TopPlace {
                id: place.id.clone(),
                name: place.name.clone(),
                district,
                visits: v.visits,
                rating,
            })
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.visits
            .cmp(&a.visits)
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.id.cmp(&b.id))
    });
    ranked.truncate(limit);
    ranked
}

/// The `limit` most recent trips by start date, newest first.
pub fn recent_activity(
    trips: &[TripRecord],
    districts: &[DistrictRecord],
    limit: usize,
) -> Vec<ActivityEntry> {
    let district_names: HashMap<&str, &str> = districts
        .iter()
        .map(|d| (d.id.as_str(), d.name.as_str()))
        .collect();

    let mut sorted: Vec<&TripRecord> = trips.iter().collect();
    sorted.sort_by(|a, b| b.start_date.cmp(&a.start_date).then_with(|| a.id.cmp(&b.id)));

    sorted
        .into_iter()
        .take(limit)
        .map(|t| ActivityEntry {
            id: t.id.clone(),
            kind: activity_kind(t.status).to_string(),
            title: activity_title(t, &district_names),
            date: t.start_date,
        })
        .collect()
}

fn activity_kind(status: TripStatus) -> &'static str {
    match status {
        TripStatus::Draft => "trip_drafted",
        TripStatus::Active => "trip_started",
        TripStatus::Completed => "trip_completed",
        TripStatus::Cancelled => "trip_cancelled",
    }
}

fn activity_title(trip: &TripRecord, district_names: &HashMap<&str, &str>) -> String {
    if let Some(title) = trip.title.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        return title.to_string();
    }
    match trip.primary_district().and_then(|id| district_names.get(id)) {
        Some(name) => format!("Trip to {}", name),
        None => format!("Trip {}", trip.id),
    }
}

/// Hidden-gem share of resolved place visits, and how many trips carry
/// assistant suggestions.
pub fn discovery_stats(trips: &[&TripRecord], places: &[PlaceRecord]) -> DiscoveryStats {
    let hidden: HashMap<&str, bool> = places
        .iter()
        .map(|p| (p.id.as_str(), p.hidden_gem))
        .collect();

    let mut total_visits = 0usize;
    let mut hidden_gem_visits = 0usize;
    for trip in trips {
        for place_id in &trip.place_ids {
            if let Some(is_gem) = hidden.get(place_id.as_str()) {
                total_visits += 1;
                if *is_gem {
                    hidden_gem_visits += 1;
                }
            }
        }
    }
    let ai_assisted_trips = trips
        .iter()
        .filter(|t| !t.suggested_place_ids.is_empty())
        .count();

    DiscoveryStats {
        hidden_gem_visits,
        total_visits,
        hidden_gem_rate: percentage(hidden_gem_visits, total_visits),
        ai_assisted_trips,
        ai_assisted_rate: percentage(ai_assisted_trips, trips.len()),
    }
}
