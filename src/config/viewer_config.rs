use super::{GridConfig, MAX_COLS};
use crate::errors::{YardError, YardResult};
use crate::snapshot::PARK_CELL;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Complete configuration for the yard viewer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub grid: GridConfig,
    pub server: ServerConfig,
    pub display: DisplayConfig,
    pub logging: LoggingConfig,
}

/// Backend connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL of the yard backend, e.g. http://127.0.0.1:5000
    pub base_url: String,
    /// Per-request timeout (ms). None waits indefinitely.
    pub request_timeout_ms: Option<u64>,
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            request_timeout_ms: None,
        }
    }
}

/// Display and refresh configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// UI loop tick (ms)
    pub tick_ms: u64,
    /// Periodic refetch of the current grid (ms). None disables polling.
    pub refresh_interval_ms: Option<u64>,
    /// Where downloaded manifests and log files are written
    pub download_dir: PathBuf,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            tick_ms: 50,
            refresh_interval_ms: None,
            download_dir: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// File that receives log output while the terminal UI owns the screen
    pub log_file: PathBuf,
    /// Default filter when RUST_LOG is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_file: PathBuf::from("yard_grid.log"),
            level: "info".to_string(),
        }
    }
}

impl ViewerConfig {
    /// Load configuration from a JSON file
    pub fn load_from_file(path: impl AsRef<Path>) -> YardResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        serde_json::from_str(&contents)
            .map_err(|e| YardError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> YardResult<()> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| YardError::Config(e.to_string()))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Apply environment variable overrides on top of the current values
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    pub(crate) fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("YARD_SERVER_URL") {
            self.server.base_url = url;
        }
        if let Some(refresh) = lookup("YARD_REFRESH_MS") {
            match refresh.parse::<u64>() {
                Ok(0) => self.display.refresh_interval_ms = None,
                Ok(ms) => self.display.refresh_interval_ms = Some(ms),
                Err(_) => log::warn!("Ignoring YARD_REFRESH_MS={:?}: not a number", refresh),
            }
        }
        if let Some(dir) = lookup("YARD_DOWNLOAD_DIR") {
            self.display.download_dir = PathBuf::from(dir);
        }
        if let Some(file) = lookup("YARD_LOG_FILE") {
            self.logging.log_file = PathBuf::from(file);
        }
    }

    /// Tick of the UI loop as Duration
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.display.tick_ms)
    }

    pub fn refresh_interval(&self) -> Option<Duration> {
        self.display.refresh_interval_ms.map(Duration::from_millis)
    }

    /// Validate configuration values
    pub fn validate(&self) -> YardResult<()> {
        if self.server.base_url.trim().is_empty() {
            return Err(YardError::Config("Server base URL must not be empty".into()));
        }

        if self.grid.rows == 0 || self.grid.cols == 0 {
            return Err(YardError::Config("Grid dimensions must be positive".into()));
        }

        if self.grid.rows as i64 >= PARK_CELL.y {
            return Err(YardError::Config(format!(
                "Grid with {} rows would overlap the park row {}",
                self.grid.rows, PARK_CELL.y
            )));
        }

        if self.grid.cols > MAX_COLS {
            return Err(YardError::Config(format!(
                "Grid with {} columns is wider than the {} column limit",
                self.grid.cols, MAX_COLS
            )));
        }

        if self.display.tick_ms == 0 {
            return Err(YardError::Config("UI tick must be positive".into()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_validate() {
        let config = ViewerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.grid, GridConfig::new(8, 12));
        assert_eq!(config.refresh_interval(), None);
        assert_eq!(config.server.request_timeout(), None);
    }

    #[test]
    fn test_validate_rejects_park_overlap() {
        let mut config = ViewerConfig::default();
        config.grid.rows = 9;
        assert!(matches!(config.validate(), Err(YardError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_huge_cols() {
        let mut config = ViewerConfig::default();
        config.grid.cols = MAX_COLS;
        assert!(config.validate().is_ok());
        config.grid.cols = usize::MAX;
        assert!(matches!(config.validate(), Err(YardError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_empty_url() {
        let mut config = ViewerConfig::default();
        config.server.base_url = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("YARD_SERVER_URL", "http://yard:8080"),
            ("YARD_REFRESH_MS", "750"),
            ("YARD_DOWNLOAD_DIR", "/tmp/out"),
        ]
        .into_iter()
        .collect();

        let mut config = ViewerConfig::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.server.base_url, "http://yard:8080");
        assert_eq!(config.refresh_interval(), Some(Duration::from_millis(750)));
        assert_eq!(config.display.download_dir, PathBuf::from("/tmp/out"));
        assert_eq!(config.logging.log_file, PathBuf::from("yard_grid.log"));
    }

    #[test]
    fn test_bad_refresh_override_is_ignored() {
        let mut config = ViewerConfig::default();
        config.display.refresh_interval_ms = Some(200);
        config.apply_overrides(|key| (key == "YARD_REFRESH_MS").then(|| "soon".to_string()));
        assert_eq!(config.display.refresh_interval_ms, Some(200));
    }

    #[test]
    fn test_file_roundtrip_and_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("viewer.json");

        let mut config = ViewerConfig::default();
        config.server.request_timeout_ms = Some(3000);
        config.save_to_file(&path).unwrap();
        assert_eq!(ViewerConfig::load_from_file(&path).unwrap(), config);

        std::fs::write(&path, r#"{"server": {"base_url": "http://other:1"}}"#).unwrap();
        let partial = ViewerConfig::load_from_file(&path).unwrap();
        assert_eq!(partial.server.base_url, "http://other:1");
        assert_eq!(partial.display.tick_ms, 50);
    }

    #[test]
    fn test_load_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("viewer.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            ViewerConfig::load_from_file(&path),
            Err(YardError::Config(_))
        ));
    }
}
