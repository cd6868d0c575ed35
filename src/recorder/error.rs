use std::time::Duration;

use thiserror::Error;

use super::state::RecordingState;

/// Everything that can go wrong while driving a recording.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecorderError {
    #[error("cannot {operation} while {state}")]
    InvalidState {
        operation: &'static str,
        state: RecordingState,
    },

    #[error("no pipeline has been initialized")]
    NotInitialized,

    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    #[error("failed to create the capture pipeline")]
    PipelineCreation,

    #[error("required element '{element}' is not available (install {plugin})")]
    MissingElement {
        element: &'static str,
        plugin: &'static str,
    },

    #[error("failed to create element '{element}': {reason}")]
    ElementCreation {
        element: &'static str,
        reason: String,
    },

    #[error("failed to link pipeline elements: {0}")]
    Link(String),

    #[error("failed to watch the pipeline bus: {0}")]
    Bus(String),

    #[error("failed to start recording pipeline: {0}")]
    Start(String),

    #[error("failed to request end-of-stream: {0}")]
    EndOfStream(String),

    #[error(
        "timed out after {}s waiting for the pipeline to finalize the output file",
        .0.as_secs()
    )]
    StopTimeout(Duration),
}

impl RecorderError {
    /// Caller errors: rejected up front, never notified, never change state.
    pub fn is_misuse(&self) -> bool {
        matches!(
            self,
            RecorderError::InvalidState { .. }
                | RecorderError::NotInitialized
                | RecorderError::InvalidSettings(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn misuse_classification() {
        let wrong_state = RecorderError::InvalidState {
            operation: "start",
            state: RecordingState::Recording,
        };
        assert!(wrong_state.is_misuse());
        assert!(RecorderError::NotInitialized.is_misuse());
        assert!(RecorderError::InvalidSettings("empty path".into()).is_misuse());
        assert!(!RecorderError::Link("x".into()).is_misuse());
        assert!(!RecorderError::StopTimeout(Duration::from_secs(1)).is_misuse());
    }

    #[test]
    fn messages_name_the_cause() {
        let missing = RecorderError::MissingElement {
            element: "x264enc",
            plugin: "gstreamer1.0-plugins-ugly",
        };
        assert_eq!(
            missing.to_string(),
            "required element 'x264enc' is not available (install gstreamer1.0-plugins-ugly)"
        );

        let wrong_state = RecorderError::InvalidState {
            operation: "start",
            state: RecordingState::Stopping,
        };
        assert_eq!(wrong_state.to_string(), "cannot start while stopping");

        let timeout = RecorderError::StopTimeout(Duration::from_secs(10));
        assert!(timeout.to_string().starts_with("timed out after 10s"));
    }
}
