use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::recorder::{RecorderEvent, RecordingState};

/// What the control panel should show after a recorder notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceUpdate {
    Preparing,
    Recording,
    Finalizing,
    Saved(PathBuf),
    Failed(String),
}

/// The panel's own view of the recorder. The flag only ever changes in
/// response to controller notifications.
#[derive(Debug, Default)]
pub struct SurfaceMirror {
    is_recording: bool,
}

impl SurfaceMirror {
    pub fn is_recording(&self) -> bool {
        self.is_recording
    }

    /// Translate one notification. `output` is the path of the current attempt.
    pub fn apply(&mut self, event: &RecorderEvent, output: Option<&Path>) -> Option<SurfaceUpdate> {
        match event {
            RecorderEvent::StateChanged(RecordingState::Initializing) => Some(SurfaceUpdate::Preparing),
            RecorderEvent::StateChanged(RecordingState::Recording) => {
                self.is_recording = true;
                Some(SurfaceUpdate::Recording)
            }
            RecorderEvent::StateChanged(RecordingState::Stopping) => Some(SurfaceUpdate::Finalizing),
            RecorderEvent::StateChanged(RecordingState::Idle) => {
                if !self.is_recording {
                    return None;
                }
                self.is_recording = false;
                Some(SurfaceUpdate::Saved(
                    output.map(Path::to_path_buf).unwrap_or_default(),
                ))
            }
            RecorderEvent::StateChanged(RecordingState::Error) => {
                self.is_recording = false;
                None
            }
            RecorderEvent::Error(message) => {
                self.is_recording = false;
                Some(SurfaceUpdate::Failed(message.clone()))
            }
        }
    }
}

/// `Recording: HH:MM:SS`
pub fn elapsed_text(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("Recording: {hours:02}:{minutes:02}:{seconds:02}")
}
