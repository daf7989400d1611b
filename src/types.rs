use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use tabled::Tabled;

// ---------------------------------------------------------------------------
// Raw CSV rows. Every column is optional text; cleaning happens in the loader.
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct RawTripRow {
    pub id: Option<String>,
    pub title: Option<String>,
    pub status: Option<String>,
    pub travelers: Option<String>,
    pub planned_budget: Option<String>,
    pub actual_budget: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub district_ids: Option<String>,
    pub segment: Option<String>,
    pub attractions: Option<String>,
    pub itinerary: Option<String>,
    pub interests: Option<String>,
    pub ai_suggestions: Option<String>,
    pub rating: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawPlaceRow {
    pub id: Option<String>,
    pub name: Option<String>,
    pub district_id: Option<String>,
    pub hidden_gem: Option<String>,
    pub rating: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawDistrictRow {
    pub id: Option<String>,
    pub name: Option<String>,
}

// ---------------------------------------------------------------------------
// Embedded JSON blobs carried inside trip rows.
// ---------------------------------------------------------------------------

/// One day of a planned itinerary.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DayPlan {
    #[serde(default)]
    pub day: u32,
    #[serde(default)]
    pub places: Vec<String>,
}

/// Assistant-generated suggestions attached to a trip.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AiSuggestions {
    #[serde(default)]
    pub places: Vec<String>,
}

// ---------------------------------------------------------------------------
// Clean input records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TripStatus {
    Draft,
    Active,
    Completed,
    Cancelled,
}

impl TripStatus {
    /// Every status in legend order.
    pub const ALL: [TripStatus; 4] = [
        TripStatus::Draft,
        TripStatus::Active,
        TripStatus::Completed,
        TripStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TripStatus::Draft => "draft",
            TripStatus::Active => "active",
            TripStatus::Completed => "completed",
            TripStatus::Cancelled => "cancelled",
        }
    }

    /// Case-insensitive parse. `canceled` is accepted as an alias.
    pub fn parse(s: &str) -> Option<TripStatus> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Some(TripStatus::Draft),
            "active" => Some(TripStatus::Active),
            "completed" => Some(TripStatus::Completed),
            "cancelled" | "canceled" => Some(TripStatus::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for TripStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive calendar window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    /// Builds a range, swapping the ends if they arrive reversed.
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        if from <= to {
            DateRange { from, to }
        } else {
            DateRange { from: to, to: from }
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }

    /// Whole days between `from` and `to`; zero for a single-day range.
    pub fn span_days(&self) -> i64 {
        (self.to - self.from).num_days()
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.from, self.to)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TripRecord {
    pub id: String,
    pub title: Option<String>,
    pub status: TripStatus,
    pub travelers: u32,
    pub planned_budget: f64,
    pub actual_budget: Option<f64>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub district_ids: Vec<String>,
    pub segment: Option<String>,
    pub place_ids: Vec<String>,
    pub interests: Vec<String>,
    pub suggested_place_ids: Vec<String>,
    pub rating: Option<f64>,
}

impl TripRecord {
    /// Minimal trip used by tests and fixtures; every optional field is empty.
    pub fn new(id: &str, status: TripStatus, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        TripRecord {
            id: id.to_string(),
            title: None,
            status,
            travelers: 1,
            planned_budget: 0.0,
            actual_budget: None,
            start_date,
            end_date,
            district_ids: Vec::new(),
            segment: None,
            place_ids: Vec::new(),
            interests: Vec::new(),
            suggested_place_ids: Vec::new(),
            rating: None,
        }
    }

    pub fn primary_district(&self) -> Option<&str> {
        self.district_ids.first().map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlaceRecord {
    pub id: String,
    pub name: String,
    pub district_id: Option<String>,
    pub hidden_gem: bool,
    pub rating: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DistrictRecord {
    pub id: String,
    pub name: String,
}

/// The three collections one aggregation call runs over.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub trips: Vec<TripRecord>,
    pub places: Vec<PlaceRecord>,
    pub districts: Vec<DistrictRecord>,
}

// ---------------------------------------------------------------------------
// Snapshot pieces
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Periods {
    pub current: DateRange,
    pub previous: DateRange,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Overview {
    pub total_trips: usize,
    pub total_travelers: u64,
    pub total_budget: f64,
    pub average_budget: f64,
    pub completion_rate: f64,
    pub average_duration_days: f64,
}

/// Percent change against a baseline. A zero baseline with a positive
/// current value has no finite percentage and is reported as `Unbounded`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PercentChange {
    Percent(f64),
    Unbounded,
}

impl fmt::Display for PercentChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PercentChange::Percent(p) => write!(f, "{:+.1}%", p),
            PercentChange::Unbounded => f.write_str("new"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Comparison {
    pub trips: PercentChange,
    pub travelers: PercentChange,
    pub budget: PercentChange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,
    Month,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct TrendBucket {
    #[tabled(rename = "Period")]
    pub label: String,
    #[tabled(rename = "Start")]
    pub start: NaiveDate,
    #[tabled(rename = "Trips")]
    pub trips: usize,
    #[tabled(rename = "Travelers")]
    pub travelers: u64,
    #[tabled(rename = "Budget")]
    pub budget: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSeries {
    pub granularity: Granularity,
    pub buckets: Vec<TrendBucket>,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct BreakdownRow {
    #[tabled(rename = "Key")]
    pub key: String,
    #[tabled(rename = "Count")]
    pub count: usize,
    #[tabled(rename = "Percentage")]
    pub percentage: f64,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct HistogramRow {
    #[tabled(rename = "Range")]
    pub range: String,
    #[tabled(rename = "Count")]
    pub count: usize,
    #[tabled(rename = "Percentage")]
    pub percentage: f64,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct TopPlace {
    #[tabled(rename = "Id")]
    pub id: String,
    #[tabled(rename = "Place")]
    pub name: String,
    #[tabled(rename = "District")]
    pub district: String,
    #[tabled(rename = "Visits")]
    pub visits: usize,
    #[tabled(rename = "Rating", display_with = "display_rating")]
    pub rating: Option<f64>,
}

fn display_rating(rating: &Option<f64>) -> String {
    match rating {
        Some(r) => format!("{:.1}", r),
        None => "-".to_string(),
    }
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct ActivityEntry {
    #[tabled(rename = "Id")]
    pub id: String,
    #[serde(rename = "type")]
    #[tabled(rename = "Type")]
    pub kind: String,
    #[tabled(rename = "Title")]
    pub title: String,
    #[tabled(rename = "Date")]
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DiscoveryStats {
    pub hidden_gem_visits: usize,
    pub total_visits: usize,
    pub hidden_gem_rate: f64,
    pub ai_assisted_trips: usize,
    pub ai_assisted_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsSnapshot {
    pub period: Periods,
    pub overview: Overview,
    pub comparison: Comparison,
    pub trend: TrendSeries,
    pub districts: Vec<BreakdownRow>,
    pub segments: Vec<BreakdownRow>,
    pub statuses: Vec<BreakdownRow>,
    pub interests: Vec<BreakdownRow>,
    pub budget_histogram: Vec<HistogramRow>,
    pub top_places: Vec<TopPlace>,
    pub recent_activity: Vec<ActivityEntry>,
    pub discovery: DiscoveryStats,
}
