//! Boundary between the controller and the media framework.
//!
//! The controller only sees [`PipelineBackend`] and [`ActivePipeline`]. A
//! backend assembles the five stages described by [`StagePlan`] and forwards
//! whatever its bus reports through the [`BusSender`] it was given.

use super::error::RecorderError;
use super::settings::RecordingSettings;

/// Events the pipeline reports asynchronously.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    /// Fatal error. The message is passed on to observers unchanged.
    Error(String),
    /// All data flushed and the output file closed.
    EndOfStream,
    /// Pipeline-level state change, informational only.
    StateChanged { old: String, current: String },
}

/// A [`PipelineEvent`] tagged with the session of the pipeline that sent it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusMessage {
    pub session: u64,
    pub event: PipelineEvent,
}

/// Owned forwarding end of the bus, handed to a backend on assembly.
#[derive(Debug, Clone)]
pub struct BusSender {
    session: u64,
    tx: async_channel::Sender<BusMessage>,
}

impl BusSender {
    pub fn new(session: u64, tx: async_channel::Sender<BusMessage>) -> Self {
        Self { session, tx }
    }

    pub fn session(&self) -> u64 {
        self.session
    }

    /// Forward an event. Events posted after the controller is gone are dropped.
    pub fn post(&self, event: PipelineEvent) {
        let message = BusMessage {
            session: self.session,
            event,
        };
        if self.tx.try_send(message).is_err() {
            log::trace!("Bus receiver closed, dropping event for session {}", self.session);
        }
    }
}

/// Builds pipelines for recording attempts.
pub trait PipelineBackend {
    type Pipeline: ActivePipeline;

    /// Create, configure and link all five stages and start watching the bus.
    /// On failure nothing may stay allocated.
    fn assemble(
        &self,
        settings: &RecordingSettings,
        bus: BusSender,
    ) -> Result<Self::Pipeline, RecorderError>;
}

/// An assembled pipeline, exclusively owned by the controller.
/// Dropping it must release every resource it holds.
pub trait ActivePipeline {
    /// Ask the pipeline to enter the playing state.
    fn play(&mut self) -> Result<(), RecorderError>;

    /// Inject end-of-stream so the muxer can finalize the file.
    fn request_eos(&mut self) -> Result<(), RecorderError>;

    /// Bring the pipeline down to its null state.
    fn shutdown(&mut self);
}

/// Position of a stage in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Capture,
    Convert,
    Encode,
    Mux,
    Sink,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    Bool(bool),
    UInt(u32),
    /// Enum or flags property set by its nick, e.g. `"zerolatency"`.
    Nick(&'static str),
    Str(String),
}

/// Configuration for one stage: which element to build and how to set it up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagePlan {
    pub stage: Stage,
    pub factory: &'static str,
    pub name: &'static str,
    pub properties: Vec<(&'static str, PropertyValue)>,
}

impl StagePlan {
    /// The five stages in link order: capture, convert, encode, mux, sink.
    pub fn for_settings(settings: &RecordingSettings) -> [StagePlan; 5] {
        [
            StagePlan {
                stage: Stage::Capture,
                factory: "ximagesrc",
                name: "screen-source",
                properties: vec![
                    ("use-damage", PropertyValue::Bool(false)),
                    ("show-pointer", PropertyValue::Bool(settings.show_cursor)),
                ],
            },
            StagePlan {
                stage: Stage::Convert,
                factory: "videoconvert",
                name: "video-convert",
                properties: Vec::new(),
            },
            StagePlan {
                stage: Stage::Encode,
                factory: "x264enc",
                name: "video-encoder",
                properties: vec![
                    ("bitrate", PropertyValue::UInt(settings.bitrate_kbps)),
                    ("speed-preset", PropertyValue::Nick("medium")),
                    ("tune", PropertyValue::Nick("zerolatency")),
                ],
            },
            StagePlan {
                stage: Stage::Mux,
                factory: "mp4mux",
                name: "muxer",
                properties: Vec::new(),
            },
            StagePlan {
                stage: Stage::Sink,
                factory: "filesink",
                name: "file-sink",
                properties: vec![(
                    "location",
                    PropertyValue::Str(settings.output_path.to_string_lossy().into_owned()),
                )],
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    impl StagePlan {
        fn property(&self, name: &str) -> Option<&PropertyValue> {
            self.properties
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value)
        }
    }

    #[test]
    fn stages_in_link_order() {
        let settings = RecordingSettings::new("out.mp4", 2000, true);
        let plan = StagePlan::for_settings(&settings);
        let stages: Vec<Stage> = plan.iter().map(|p| p.stage).collect();
        assert_eq!(
            stages,
            vec![Stage::Capture, Stage::Convert, Stage::Encode, Stage::Mux, Stage::Sink]
        );
        let factories: Vec<&str> = plan.iter().map(|p| p.factory).collect();
        assert_eq!(
            factories,
            vec!["ximagesrc", "videoconvert", "x264enc", "mp4mux", "filesink"]
        );
    }

    #[test]
    fn settings_flow_into_stage_properties() {
        let settings = RecordingSettings::new("/tmp/clip.mp4", 4500, false);
        let [capture, _, encode, _, sink] = StagePlan::for_settings(&settings);

        assert_eq!(capture.property("show-pointer"), Some(&PropertyValue::Bool(false)));
        assert_eq!(capture.property("use-damage"), Some(&PropertyValue::Bool(false)));
        assert_eq!(encode.property("bitrate"), Some(&PropertyValue::UInt(4500)));
        assert_eq!(encode.property("speed-preset"), Some(&PropertyValue::Nick("medium")));
        assert_eq!(encode.property("tune"), Some(&PropertyValue::Nick("zerolatency")));
        assert_eq!(
            sink.property("location"),
            Some(&PropertyValue::Str("/tmp/clip.mp4".into()))
        );
    }

    #[test]
    fn bus_sender_tags_session() {
        let (tx, rx) = async_channel::unbounded();
        let sender = BusSender::new(7, tx);
        sender.post(PipelineEvent::EndOfStream);
        assert_eq!(
            rx.try_recv().unwrap(),
            BusMessage {
                session: 7,
                event: PipelineEvent::EndOfStream
            }
        );
    }

    #[test]
    fn posting_after_receiver_dropped_is_silent() {
        let (tx, rx) = async_channel::unbounded();
        drop(rx);
        BusSender::new(1, tx).post(PipelineEvent::Error("late".into()));
    }
}
