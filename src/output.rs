use crate::error::Result;
use crate::types::{AnalyticsSnapshot, Comparison, Overview, PercentChange};
use crate::util::{format_int, format_number};
use serde::Serialize;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// Write the breakdown tables into `dir` as individual CSV files and
/// return the file names written.
pub fn write_breakdowns(dir: &Path, snapshot: &AnalyticsSnapshot) -> Result<Vec<String>> {
    let files = [
        "districts.breakdown.csv",
        "segments.breakdown.csv",
        "statuses.breakdown.csv",
        "interests.breakdown.csv",
    ];
    let tables = [
        &snapshot.districts,
        &snapshot.segments,
        &snapshot.statuses,
        &snapshot.interests,
    ];
    for (file, rows) in files.iter().zip(tables) {
        write_csv(&dir.join(file), rows)?;
    }
    write_csv(&dir.join("budget_histogram.csv"), &snapshot.budget_histogram)?;
    write_csv(&dir.join("top_places.csv"), &snapshot.top_places)?;

    let mut written: Vec<String> = files.iter().map(|f| f.to_string()).collect();
    written.push("budget_histogram.csv".to_string());
    written.push("top_places.csv".to_string());
    Ok(written)
}

#[derive(Debug, Clone, Tabled)]
pub struct KpiRow {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Change")]
    pub change: String,
}

/// Overview KPIs as display rows, with deltas beside the metrics that have one.
pub fn kpi_rows(overview: &Overview, comparison: &Comparison) -> Vec<KpiRow> {
    let row = |metric: &str, value: String, change: Option<PercentChange>| KpiRow {
        metric: metric.to_string(),
        value,
        change: change.map(|c| c.to_string()).unwrap_or_default(),
    };
    vec![
        row("Total trips", format_int(overview.total_trips), Some(comparison.trips)),
        row("Total travelers", format_int(overview.total_travelers), Some(comparison.travelers)),
        row("Total budget", format_number(overview.total_budget, 2), Some(comparison.budget)),
        row("Average budget", format_number(overview.average_budget, 2), None),
        row("Completion rate", format!("{}%", format_number(overview.completion_rate, 1)), None),
        row("Average duration (days)", format_number(overview.average_duration_days, 1), None),
    ]
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

/// Console preview of every snapshot section.
pub fn print_snapshot(snapshot: &AnalyticsSnapshot, max_rows: usize) {
    println!(
        "Current window: {} (previous: {})\n",
        snapshot.period.current, snapshot.period.previous
    );
    println!("Overview");
    preview_table_rows(&kpi_rows(&snapshot.overview, &snapshot.comparison), 6);
    println!("Trend ({:?} buckets)", snapshot.trend.granularity);
    preview_table_rows(&snapshot.trend.buckets, max_rows);
    println!("Trips by District");
    preview_table_rows(&snapshot.districts, max_rows);
    println!("Trips by Segment");
    preview_table_rows(&snapshot.segments, max_rows);
    println!("Trips by Status");
    preview_table_rows(&snapshot.statuses, 4);
    println!("Top Interests");
    preview_table_rows(&snapshot.interests, max_rows);
    println!("Budget Distribution");
    preview_table_rows(&snapshot.budget_histogram, snapshot.budget_histogram.len());
    println!("Top Places");
    preview_table_rows(&snapshot.top_places, snapshot.top_places.len());
    println!("Recent Activity");
    preview_table_rows(&snapshot.recent_activity, snapshot.recent_activity.len());
    println!(
        "Hidden gems: {} of {} visits ({}%), AI-assisted trips: {} ({}%)\n",
        format_int(snapshot.discovery.hidden_gem_visits),
        format_int(snapshot.discovery.total_visits),
        format_number(snapshot.discovery.hidden_gem_rate, 1),
        format_int(snapshot.discovery.ai_assisted_trips),
        format_number(snapshot.discovery.ai_assisted_rate, 1),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kpi_rows_show_sentinel_and_signed_change() {
        let overview = Overview {
            total_trips: 1200,
            total_budget: 2500.5,
            ..Overview::default()
        };
        let comparison = Comparison {
            trips: PercentChange::Percent(12.5),
            travelers: PercentChange::Unbounded,
            budget: PercentChange::Percent(-3.0),
        };
        let rows = kpi_rows(&overview, &comparison);
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[0].value, "1,200");
        assert_eq!(rows[0].change, "+12.5%");
        assert_eq!(rows[1].change, "new");
        assert_eq!(rows[2].value, "2,500.50");
        assert_eq!(rows[2].change, "-3.0%");
        assert_eq!(rows[3].change, "");
    }
}
