use crate::config::DataPaths;
use crate::error::Result;
use crate::types::{
    AiSuggestions, DayPlan, DistrictRecord, PlaceRecord, RawDistrictRow, RawPlaceRow,
    RawTripRow, TripRecord, TripStatus,
};
use crate::util::{
    clean_text, parse_bool_safe, parse_date_safe, parse_f64_safe, parse_json_or, parse_u32_safe,
};
use async_trait::async_trait;
use csv::ReaderBuilder;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub kept_rows: usize,
    pub parse_errors: usize,
}

/// Read access to the three record collections.
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn fetch_trips(&self) -> Result<Vec<TripRecord>>;
    async fn fetch_places(&self) -> Result<Vec<PlaceRecord>>;
    async fn fetch_districts(&self) -> Result<Vec<DistrictRecord>>;
}

/// Record source backed by three CSV exports.
#[derive(Debug, Clone)]
pub struct CsvSource {
    trips: PathBuf,
    places: PathBuf,
    districts: PathBuf,
}

impl CsvSource {
    pub fn new(paths: &DataPaths) -> Self {
        CsvSource {
            trips: paths.trips.clone(),
            places: paths.places.clone(),
            districts: paths.districts.clone(),
        }
    }
}

#[async_trait]
impl RecordSource for CsvSource {
    async fn fetch_trips(&self) -> Result<Vec<TripRecord>> {
        let path = self.trips.clone();
        let (trips, report) = tokio::task::spawn_blocking(move || load_trips(&path)).await??;
        log_report("trips", &self.trips, &report);
        Ok(trips)
    }

    async fn fetch_places(&self) -> Result<Vec<PlaceRecord>> {
        let path = self.places.clone();
        let (places, report) = tokio::task::spawn_blocking(move || load_places(&path)).await??;
        log_report("places", &self.places, &report);
        Ok(places)
    }

    async fn fetch_districts(&self) -> Result<Vec<DistrictRecord>> {
        let path = self.districts.clone();
        let (districts, report) =
            tokio::task::spawn_blocking(move || load_districts(&path)).await??;
        log_report("districts", &self.districts, &report);
        Ok(districts)
    }
}

fn log_report(collection: &str, path: &Path, report: &LoadReport) {
    tracing::info!(
        collection,
        path = %path.display(),
        total = report.total_rows,
        kept = report.kept_rows,
        "loaded records"
    );
    if report.parse_errors > 0 {
        tracing::warn!(
            collection,
            skipped = report.parse_errors,
            "rows skipped due to parse/validation errors"
        );
    }
}

pub fn load_trips(path: &Path) -> Result<(Vec<TripRecord>, LoadReport)> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_path(path)?;
    let mut report = LoadReport::default();
    let mut trips = Vec::new();

    for result in rdr.deserialize::<RawTripRow>() {
        report.total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!(error = %e, "unreadable trip row");
                report.parse_errors += 1;
                continue;
            }
        };
        match clean_trip(row) {
            Some(trip) => trips.push(trip),
            None => report.parse_errors += 1,
        }
    }

    report.kept_rows = trips.len();
    Ok((trips, report))
}

/// Turn a raw row into a trip. Rows without an id or a usable start date are
/// rejected; everything else falls back to a default.
pub fn clean_trip(row: RawTripRow) -> Option<TripRecord> {
    let id = clean_text(row.id)?;
    let start_date = parse_date_safe(row.start_date.as_deref())?;
    let end_date = parse_date_safe(row.end_date.as_deref()).unwrap_or(start_date);

    let status = match row.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        None => TripStatus::Draft,
        Some(raw) => TripStatus::parse(raw).unwrap_or_else(|| {
            tracing::warn!(trip = %id, status = raw, "unknown trip status, treating as draft");
            TripStatus::Draft
        }),
    };

    let district_ids: Vec<String> = row
        .district_ids
        .as_deref()
        .unwrap_or("")
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect();

    let mut place_ids: Vec<String> = parse_json_or(row.attractions.as_deref(), Vec::new());
    if place_ids.is_empty() {
        let itinerary: Vec<DayPlan> = parse_json_or(row.itinerary.as_deref(), Vec::new());
        place_ids = itinerary.into_iter().flat_map(|day| day.places).collect();
    }
    let interests: Vec<String> = parse_json_or(row.interests.as_deref(), Vec::new());
    let suggestions: AiSuggestions =
        parse_json_or(row.ai_suggestions.as_deref(), AiSuggestions::default());

    Some(TripRecord {
        id,
        title: clean_text(row.title),
        status,
        travelers: parse_u32_safe(row.travelers.as_deref()).unwrap_or(1),
        planned_budget: parse_f64_safe(row.planned_budget.as_deref())
            .unwrap_or(0.0)
            .max(0.0),
        actual_budget: parse_f64_safe(row.actual_budget.as_deref()),
        start_date,
        end_date,
        district_ids,
        segment: clean_text(row.segment),
        place_ids,
        interests,
        suggested_place_ids: suggestions.places,
        rating: parse_f64_safe(row.rating.as_deref()),
    })
}

pub fn load_places(path: &Path) -> Result<(Vec<PlaceRecord>, LoadReport)> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_path(path)?;
    let mut report = LoadReport::default();
    let mut places = Vec::new();

    for result in rdr.deserialize::<RawPlaceRow>() {
        report.total_rows += 1;
        let Ok(row) = result else {
            report.parse_errors += 1;
            continue;
        };
        let Some(id) = clean_text(row.id) else {
            report.parse_errors += 1;
            continue;
        };
        let name = clean_text(row.name).unwrap_or_else(|| id.clone());
        places.push(PlaceRecord {
            id,
            name,
            district_id: clean_text(row.district_id),
            hidden_gem: parse_bool_safe(row.hidden_gem.as_deref()).unwrap_or(false),
            rating: parse_f64_safe(row.rating.as_deref()),
        });
    }

    report.kept_rows = places.len();
    Ok((places, report))
}

pub fn load_districts(path: &Path) -> Result<(Vec<DistrictRecord>, LoadReport)> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_path(path)?;
    let mut report = LoadReport::default();
    let mut districts = Vec::new();

    for result in rdr.deserialize::<RawDistrictRow>() {
        report.total_rows += 1;
        let Ok(row) = result else {
            report.parse_errors += 1;
            continue;
        };
        match (clean_text(row.id), clean_text(row.name)) {
            (Some(id), Some(name)) => districts.push(DistrictRecord { id, name }),
            _ => report.parse_errors += 1,
        }
    }

    report.kept_rows = districts.len();
    Ok((districts, report))
}
