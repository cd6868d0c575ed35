use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use chrono::Local;

use super::error::RecorderError;

/// Encoder bitrates accepted by the recorder, in kbit/s.
pub const BITRATE_RANGE_KBPS: RangeInclusive<u32> = 500..=10_000;

pub const DEFAULT_BITRATE_KBPS: u32 = 2000;

/// Parameters for one recording attempt. Handed to the controller by value
/// and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingSettings {
    pub output_path: PathBuf,
    pub bitrate_kbps: u32,
    pub show_cursor: bool,
}

impl RecordingSettings {
    pub fn new(output_path: impl Into<PathBuf>, bitrate_kbps: u32, show_cursor: bool) -> Self {
        Self {
            output_path: output_path.into(),
            bitrate_kbps,
            show_cursor,
        }
    }

    /// Check the settings before any pipeline work happens.
    pub fn validate(&self) -> Result<(), RecorderError> {
        if self.output_path.as_os_str().is_empty() {
            return Err(RecorderError::InvalidSettings(
                "output path is empty".into(),
            ));
        }

        if let Some(parent) = self.output_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.is_dir() {
                return Err(RecorderError::InvalidSettings(format!(
                    "output directory {} does not exist",
                    parent.display()
                )));
            }
        }

        if !BITRATE_RANGE_KBPS.contains(&self.bitrate_kbps) {
            return Err(RecorderError::InvalidSettings(format!(
                "bitrate {} kbps is outside {}..={} kbps",
                self.bitrate_kbps,
                BITRATE_RANGE_KBPS.start(),
                BITRATE_RANGE_KBPS.end()
            )));
        }

        Ok(())
    }
}

/// `screen_recording_YYYYmmdd_HHMMSS.mp4`, local time.
pub fn default_filename() -> String {
    Local::now()
        .format("screen_recording_%Y%m%d_%H%M%S.mp4")
        .to_string()
}

/// Default output path inside `dir`.
pub fn default_output_path(dir: &Path) -> PathBuf {
    dir.join(default_filename())
}
