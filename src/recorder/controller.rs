use std::time::{Duration, Instant};

use super::error::RecorderError;
use super::pipeline::{ActivePipeline, BusMessage, BusSender, PipelineBackend, PipelineEvent};
use super::settings::RecordingSettings;
use super::state::{RecorderEvent, RecordingState};

pub const DEFAULT_STOP_TIMEOUT: Duration = Duration::from_secs(10);

/// An assembled pipeline and the attempt it belongs to.
struct Session<P> {
    id: u64,
    pipeline: P,
    started_at: Option<Instant>,
    stopping_since: Option<Instant>,
}

/// Owns the recording state machine and the one pipeline it drives.
///
/// Not thread-safe: every call, including [`handle_bus_message`], must come
/// from the thread running the UI main loop.
///
/// [`handle_bus_message`]: RecordingController::handle_bus_message
pub struct RecordingController<B: PipelineBackend> {
    backend: B,
    state: RecordingState,
    session: Option<Session<B::Pipeline>>,
    settings: Option<RecordingSettings>,
    next_session: u64,
    stop_timeout: Duration,
    bus_tx: async_channel::Sender<BusMessage>,
    bus_rx: async_channel::Receiver<BusMessage>,
    listeners: Vec<async_channel::Sender<RecorderEvent>>,
}

impl<B: PipelineBackend> RecordingController<B> {
    pub fn new(backend: B, stop_timeout: Duration) -> Self {
        let (bus_tx, bus_rx) = async_channel::unbounded();
        Self {
            backend,
            state: RecordingState::Idle,
            session: None,
            settings: None,
            next_session: 1,
            stop_timeout,
            bus_tx,
            bus_rx,
            listeners: Vec::new(),
        }
    }

    /// Register for state-change and error notifications.
    pub fn subscribe(&mut self) -> async_channel::Receiver<RecorderEvent> {
        let (tx, rx) = async_channel::unbounded();
        self.listeners.push(tx);
        rx
    }

    /// Receiving end of the pipeline bus. Drain it on the control thread and
    /// feed each message to [`RecordingController::handle_bus_message`].
    pub fn bus(&self) -> async_channel::Receiver<BusMessage> {
        self.bus_rx.clone()
    }

    pub fn state(&self) -> RecordingState {
        self.state
    }

    /// Settings of the most recent `initialize` attempt.
    pub fn settings(&self) -> Option<&RecordingSettings> {
        self.settings.as_ref()
    }

    pub fn started_at(&self) -> Option<Instant> {
        self.session.as_ref().and_then(|s| s.started_at)
    }

    pub fn recording_duration(&self) -> Duration {
        self.recording_duration_at(Instant::now())
    }

    /// Time spent recording as of `now`; zero unless state is `Recording`.
    pub fn recording_duration_at(&self, now: Instant) -> Duration {
        if self.state != RecordingState::Recording {
            return Duration::ZERO;
        }
        self.started_at()
            .map(|start| now.saturating_duration_since(start))
            .unwrap_or_default()
    }

    /// Assemble a pipeline for `settings`. Allowed from `Idle` and `Error`.
    pub fn initialize(&mut self, settings: RecordingSettings) -> Result<(), RecorderError> {
        if !matches!(self.state, RecordingState::Idle | RecordingState::Error) {
            return Err(RecorderError::InvalidState {
                operation: "initialize",
                state: self.state,
            });
        }
        settings.validate()?;

        // A prepared pipeline that was never started is replaced.
        self.release_pipeline();
        self.set_state(RecordingState::Initializing);

        let id = self.next_session;
        self.next_session += 1;
        let bus = BusSender::new(id, self.bus_tx.clone());
        let result = self.backend.assemble(&settings, bus);
        self.settings = Some(settings);

        match result {
            Ok(pipeline) => {
                self.session = Some(Session {
                    id,
                    pipeline,
                    started_at: None,
                    stopping_since: None,
                });
                self.set_state(RecordingState::Idle);
                Ok(())
            }
            Err(e) => {
                self.fail(e.to_string());
                Err(e)
            }
        }
    }

    /// Set the prepared pipeline playing.
    pub fn start(&mut self) -> Result<(), RecorderError> {
        if self.state != RecordingState::Idle {
            return Err(RecorderError::InvalidState {
                operation: "start",
                state: self.state,
            });
        }
        let Some(session) = self.session.as_mut() else {
            return Err(RecorderError::NotInitialized);
        };

        match session.pipeline.play() {
            Ok(()) => {
                session.started_at = Some(Instant::now());
                self.set_state(RecordingState::Recording);
                Ok(())
            }
            Err(e) => {
                self.fail(e.to_string());
                Err(e)
            }
        }
    }

    /// Request a cooperative stop. Returns true if end-of-stream was sent.
    /// The file is final only once the state reaches `Idle` again.
    pub fn stop(&mut self) -> bool {
        if self.state != RecordingState::Recording {
            log::debug!("Ignoring stop while {}", self.state);
            return false;
        }
        match self.session.as_mut() {
            Some(session) => session.stopping_since = Some(Instant::now()),
            None => return false,
        }
        self.set_state(RecordingState::Stopping);

        match self.session.as_mut().map(|s| s.pipeline.request_eos()) {
            Some(Ok(())) => true,
            Some(Err(e)) => {
                self.fail(e.to_string());
                false
            }
            None => false,
        }
    }

    /// Apply one event from the pipeline bus.
    pub fn handle_bus_message(&mut self, message: BusMessage) {
        let current = self.session.as_ref().map(|s| s.id);
        if current != Some(message.session) {
            log::debug!(
                "Dropping stale bus event from session {}: {:?}",
                message.session,
                message.event
            );
            return;
        }

        match message.event {
            PipelineEvent::Error(msg) => {
                log::error!("Pipeline error while {}: {msg}", self.state);
                self.fail(msg);
            }
            PipelineEvent::EndOfStream => {
                if matches!(self.state, RecordingState::Recording | RecordingState::Stopping) {
                    self.release_pipeline();
                    if let Some(settings) = &self.settings {
                        log::info!("Output finalized: {}", settings.output_path.display());
                    }
                    self.set_state(RecordingState::Idle);
                } else {
                    log::debug!("Ignoring end-of-stream while {}", self.state);
                }
            }
            PipelineEvent::StateChanged { old, current } => {
                log::trace!("Pipeline state {old} -> {current}");
            }
        }
    }

    /// Tear the pipeline down if end-of-stream has not arrived within the
    /// stop timeout. Returns true if it fired.
    pub fn enforce_stop_deadline(&mut self, now: Instant) -> bool {
        if self.state != RecordingState::Stopping {
            return false;
        }
        let Some(since) = self.session.as_ref().and_then(|s| s.stopping_since) else {
            return false;
        };
        if now.saturating_duration_since(since) < self.stop_timeout {
            return false;
        }

        let err = RecorderError::StopTimeout(self.stop_timeout);
        log::error!("{err}");
        self.fail(err.to_string());
        true
    }

    /// Release the pipeline, report `message`, then enter `Error`.
    fn fail(&mut self, message: String) {
        self.release_pipeline();
        self.notify(RecorderEvent::Error(message));
        self.set_state(RecordingState::Error);
    }

    fn release_pipeline(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.pipeline.shutdown();
            log::debug!("Released pipeline for session {}", session.id);
        }
    }

    fn set_state(&mut self, new_state: RecordingState) {
        if self.state == new_state {
            return;
        }
        log::debug!("Recorder state {} -> {}", self.state, new_state);
        self.state = new_state;
        self.notify(RecorderEvent::StateChanged(new_state));
    }

    fn notify(&mut self, event: RecorderEvent) {
        self.listeners.retain(|tx| tx.try_send(event.clone()).is_ok());
    }
}

impl<B: PipelineBackend> Drop for RecordingController<B> {
    fn drop(&mut self) {
        self.release_pipeline();
    }
}

#[cfg(test)]
#[path = "controller_test.rs"]
mod tests;
