use crate::error::{AnalyticsError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "analytics.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub top_places: usize,
    pub recent_activity: usize,
    pub lookback_months: u32,
    pub month_bucket_threshold_days: i64,
    /// Lower edges of the budget ranges; the last range is open-ended.
    pub budget_boundaries: Vec<f64>,
    pub data: DataPaths,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DataPaths {
    pub trips: PathBuf,
    pub places: PathBuf,
    pub districts: PathBuf,
    pub output: PathBuf,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        AnalyticsConfig {
            top_places: 5,
            recent_activity: 5,
            lookback_months: 6,
            month_bucket_threshold_days: 60,
            budget_boundaries: vec![0.0, 500.0, 1000.0, 2500.0, 5000.0],
            data: DataPaths::default(),
        }
    }
}

impl Default for DataPaths {
    fn default() -> Self {
        DataPaths {
            trips: PathBuf::from("trips.csv"),
            places: PathBuf::from("places.csv"),
            districts: PathBuf::from("districts.csv"),
            output: PathBuf::from("snapshot.json"),
        }
    }
}

impl AnalyticsConfig {
    /// Read `path` if it exists; a missing file means defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&text)?;
        tracing::info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: AnalyticsConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.budget_boundaries.is_empty() {
            return Err(AnalyticsError::InvalidConfig(
                "budget_boundaries must not be empty".to_string(),
            ));
        }
        if self.budget_boundaries.iter().any(|b| !b.is_finite()) {
            return Err(AnalyticsError::InvalidConfig(
                "budget_boundaries must be finite".to_string(),
            ));
        }
        if self.budget_boundaries[0] > 0.0 {
            return Err(AnalyticsError::InvalidConfig(
                "budget_boundaries must start at or below 0 so every budget has a range"
                    .to_string(),
            ));
        }
        if self.budget_boundaries.windows(2).any(|w| w[0] >= w[1]) {
            return Err(AnalyticsError::InvalidConfig(
                "budget_boundaries must be strictly ascending".to_string(),
            ));
        }
        if self.month_bucket_threshold_days < 0 {
            return Err(AnalyticsError::InvalidConfig(
                "month_bucket_threshold_days must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(AnalyticsConfig::from_toml("").unwrap(), AnalyticsConfig::default());
    }

    #[test]
    fn partial_file_overrides_only_named_fields() {
        let config = AnalyticsConfig::from_toml(
            r#"
            top_places = 10
            [data]
            trips = "exports/trips.csv"
            "#,
        )
        .unwrap();
        assert_eq!(config.top_places, 10);
        assert_eq!(config.recent_activity, 5);
        assert_eq!(config.data.trips, PathBuf::from("exports/trips.csv"));
        assert_eq!(config.data.places, PathBuf::from("places.csv"));
    }

    #[test]
    fn rejects_unordered_boundaries() {
        let err = AnalyticsConfig::from_toml("budget_boundaries = [0.0, 500.0, 500.0]").unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidConfig(_)));
        let err = AnalyticsConfig::from_toml("budget_boundaries = []").unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_boundaries_that_leave_small_budgets_uncovered() {
        let err = AnalyticsConfig::from_toml("budget_boundaries = [100.0, 500.0]").unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidConfig(_)));
        let config = AnalyticsConfig::from_toml("budget_boundaries = [0.0, 250.0]").unwrap();
        assert_eq!(config.budget_boundaries, vec![0.0, 250.0]);
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = AnalyticsConfig::load(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config, AnalyticsConfig::default());
    }
}
