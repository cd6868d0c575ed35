mod controller;
mod error;
mod gst_backend;
pub mod pipeline;
mod settings;
mod state;

pub use controller::{RecordingController, DEFAULT_STOP_TIMEOUT};
pub use error::RecorderError;
pub use gst_backend::{missing_elements, GstBackend};
pub use settings::{default_output_path, RecordingSettings, BITRATE_RANGE_KBPS, DEFAULT_BITRATE_KBPS};
pub use state::{RecorderEvent, RecordingState};
