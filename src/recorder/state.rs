use std::fmt;

/// Lifecycle of the recording controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordingState {
    /// No pipeline running. A prepared pipeline may be waiting for `start`.
    #[default]
    Idle,
    /// Pipeline is being assembled.
    Initializing,
    /// Pipeline is playing and writing to the output file.
    Recording,
    /// End-of-stream requested, waiting for the pipeline to flush.
    Stopping,
    /// Last attempt failed. Pipeline resources are already released.
    Error,
}

impl RecordingState {
    /// True while a pipeline is running or being assembled.
    pub fn is_busy(self) -> bool {
        matches!(
            self,
            RecordingState::Initializing | RecordingState::Recording | RecordingState::Stopping
        )
    }
}

impl fmt::Display for RecordingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RecordingState::Idle => "idle",
            RecordingState::Initializing => "initializing",
            RecordingState::Recording => "recording",
            RecordingState::Stopping => "stopping",
            RecordingState::Error => "error",
        };
        f.write_str(label)
    }
}

/// Notifications delivered to controller subscribers, in the order they happen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecorderEvent {
    StateChanged(RecordingState),
    Error(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_idle() {
        assert_eq!(RecordingState::default(), RecordingState::Idle);
    }

    #[test]
    fn busy_states() {
        assert!(!RecordingState::Idle.is_busy());
        assert!(RecordingState::Initializing.is_busy());
        assert!(RecordingState::Recording.is_busy());
        assert!(RecordingState::Stopping.is_busy());
        assert!(!RecordingState::Error.is_busy());
    }

    #[test]
    fn display_is_lowercase() {
        assert_eq!(RecordingState::Stopping.to_string(), "stopping");
    }
}
