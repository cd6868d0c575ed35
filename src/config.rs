use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::recorder::{BITRATE_RANGE_KBPS, DEFAULT_BITRATE_KBPS, DEFAULT_STOP_TIMEOUT};

/// Persisted recorder preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where new recordings go. `None` means the user's video directory.
    pub output_dir: Option<PathBuf>,
    pub bitrate_kbps: u32,
    pub show_cursor: bool,
    /// How long to wait for the pipeline to finalize the file after Stop.
    pub stop_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: None,
            bitrate_kbps: DEFAULT_BITRATE_KBPS,
            show_cursor: true,
            stop_timeout_secs: DEFAULT_STOP_TIMEOUT.as_secs(),
        }
    }
}

impl Config {
    /// Directory: ~/.config/screen-recorder/
    fn dir() -> PathBuf {
        let mut p = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        p.push("screen-recorder");
        p
    }

    fn path() -> PathBuf {
        Self::dir().join("config.json")
    }

    /// Load from disk, returning defaults if file doesn't exist or is invalid.
    pub fn load() -> Self {
        Self::load_from(&Self::path())
    }

    pub fn load_from(path: &Path) -> Self {
        let config: Self = match fs::read_to_string(path) {
            Ok(data) => serde_json::from_str(&data).unwrap_or_else(|e| {
                log::warn!("Ignoring invalid config {}: {e}", path.display());
                Self::default()
            }),
            Err(_) => Self::default(),
        };
        config.sanitized()
    }

    /// Persist to disk.
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.save_to(&Self::path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)?;
        Ok(())
    }

    /// Directory used for the default output file name.
    pub fn effective_output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .or_else(dirs::video_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn stop_timeout(&self) -> Duration {
        Duration::from_secs(self.stop_timeout_secs)
    }

    fn sanitized(mut self) -> Self {
        self.bitrate_kbps = self
            .bitrate_kbps
            .clamp(*BITRATE_RANGE_KBPS.start(), *BITRATE_RANGE_KBPS.end());
        self.stop_timeout_secs = self.stop_timeout_secs.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json"));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            output_dir: Some(PathBuf::from("/srv/videos")),
            bitrate_kbps: 4000,
            show_cursor: false,
            stop_timeout_secs: 30,
        };

        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path), config);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "bitrate_kbps": 3500 }"#).unwrap();

        let config = Config::load_from(&path);
        assert_eq!(config.bitrate_kbps, 3500);
        assert!(config.show_cursor);
        assert_eq!(config.stop_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn garbage_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();
        assert_eq!(Config::load_from(&path), Config::default());
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "bitrate_kbps": 50000, "stop_timeout_secs": 0 }"#).unwrap();

        let config = Config::load_from(&path);
        assert_eq!(config.bitrate_kbps, 10_000);
        assert_eq!(config.stop_timeout_secs, 1);
    }

    #[test]
    fn explicit_output_dir_wins() {
        let config = Config {
            output_dir: Some(PathBuf::from("/data/rec")),
            ..Config::default()
        };
        assert_eq!(config.effective_output_dir(), PathBuf::from("/data/rec"));
    }
}
