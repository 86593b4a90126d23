use serde::{Deserialize, Serialize};
use std::path::Path;
use anyhow::{Result, anyhow};

use crate::error::{TableError, TableResult};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableConfig {
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub processing: ProcessingConfig,
}

/// Thresholds for the grid pipeline. Passed explicitly to every stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Max deviation for a segment to still count as horizontal/vertical
    pub line_tolerance: f64,

    /// Allowed spacing between consecutive horizontal rulings (inclusive)
    pub min_row_gap: f64,
    pub max_row_gap: f64,

    /// Allowed spacing between consecutive vertical rulings (inclusive)
    pub min_col_gap: f64,
    pub max_col_gap: f64,

    /// Minimum ruling lines per axis for a grid to count as a table
    pub min_rows: usize,
    pub min_cols: usize,

    /// Only grow grids within clusters of rulings that touch each other
    pub split_connected_rulings: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Process pages on the rayon pool
    pub parallel_pages: bool,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            line_tolerance: 1.0,
            min_row_gap: 10.0,
            max_row_gap: 100.0,
            min_col_gap: 20.0,
            max_col_gap: 200.0,
            min_rows: 2,
            min_cols: 2,
            split_connected_rulings: true,
        }
    }
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self { parallel_pages: true }
    }
}

impl DetectionConfig {
    pub fn validate(&self) -> TableResult<()> {
        if !(self.line_tolerance > 0.0) {
            return Err(TableError::configuration(format!(
                "line_tolerance must be positive, got {}",
                self.line_tolerance
            )));
        }
        if self.min_row_gap < 0.0 || self.min_row_gap > self.max_row_gap {
            return Err(TableError::configuration(format!(
                "invalid row gap window [{}, {}]",
                self.min_row_gap, self.max_row_gap
            )));
        }
        if self.min_col_gap < 0.0 || self.min_col_gap > self.max_col_gap {
            return Err(TableError::configuration(format!(
                "invalid column gap window [{}, {}]",
                self.min_col_gap, self.max_col_gap
            )));
        }
        if self.min_rows < 2 || self.min_cols < 2 {
            return Err(TableError::configuration(
                "a grid needs at least 2 rulings per axis (min_rows/min_cols >= 2)",
            ));
        }
        Ok(())
    }
}

impl TableConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| anyhow!("Failed to read config file: {}", e))?;

        let config: TableConfig = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file: {}", e))?;

        config.detection.validate()?;
        Ok(config)
    }

    pub fn load_from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    /// Override individual fields from `CHONKER_TABLES_*` environment variables
    pub fn apply_env_overrides(&mut self) {
        let detection = &mut self.detection;
        override_f64("CHONKER_TABLES_LINE_TOLERANCE", &mut detection.line_tolerance);
        override_f64("CHONKER_TABLES_MIN_ROW_GAP", &mut detection.min_row_gap);
        override_f64("CHONKER_TABLES_MAX_ROW_GAP", &mut detection.max_row_gap);
        override_f64("CHONKER_TABLES_MIN_COL_GAP", &mut detection.min_col_gap);
        override_f64("CHONKER_TABLES_MAX_COL_GAP", &mut detection.max_col_gap);

        if let Ok(parallel) = std::env::var("CHONKER_TABLES_PARALLEL") {
            self.processing.parallel_pages = parallel.to_lowercase() == "true";
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| anyhow!("Failed to serialize config: {}", e))?;

        std::fs::write(path.as_ref(), content)
            .map_err(|e| anyhow!("Failed to write config file: {}", e))?;

        Ok(())
    }
}

fn override_f64(var: &str, target: &mut f64) {
    if let Ok(raw) = std::env::var(var) {
        if let Ok(value) = raw.parse::<f64>() {
            *target = value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use std::fs;

    #[test]
    fn test_default_config() {
        let config = TableConfig::default();
        assert_eq!(config.detection.line_tolerance, 1.0);
        assert_eq!(config.detection.min_row_gap, 10.0);
        assert_eq!(config.detection.max_col_gap, 200.0);
        assert_eq!(config.detection.min_rows, 2);
        assert!(config.processing.parallel_pages);
        assert!(config.detection.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let mut config = TableConfig::default();
        config.detection.max_row_gap = 80.0;
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("tables.toml");

        config.save_to_file(&config_path).unwrap();

        let loaded_config = TableConfig::load_from_file(&config_path).unwrap();
        assert_eq!(loaded_config.detection, config.detection);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("tables.toml");
        fs::write(&config_path, "[detection]\nmin_col_gap = 15.0\n").unwrap();

        let loaded = TableConfig::load_from_file(&config_path).unwrap();
        assert_eq!(loaded.detection.min_col_gap, 15.0);
        assert_eq!(loaded.detection.max_col_gap, 200.0);
        assert!(loaded.processing.parallel_pages);
    }

    #[test]
    fn test_inverted_gap_window_rejected() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("tables.toml");
        fs::write(&config_path, "[detection]\nmin_row_gap = 50.0\nmax_row_gap = 5.0\n").unwrap();

        assert!(TableConfig::load_from_file(&config_path).is_err());
    }

    #[test]
    fn test_min_counts_below_two_rejected() {
        let detection = DetectionConfig { min_cols: 1, ..DetectionConfig::default() };
        assert!(detection.validate().is_err());

        let detection = DetectionConfig { line_tolerance: 0.0, ..DetectionConfig::default() };
        assert!(detection.validate().is_err());
    }
}
