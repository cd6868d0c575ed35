use gtk4::glib;

use super::feedback::SurfaceMirror;
use crate::config::Config;
use crate::recorder::{GstBackend, RecorderEvent, RecordingController};
use crate::ui::control_panel::ControlPanelWidgets;

/// Events delivered to the GTK main thread.
#[derive(Debug, Clone)]
pub enum AppEvent {
    StartRequested {
        filename: String,
        bitrate_kbps: u32,
        show_cursor: bool,
    },
    StopRequested,
    Recorder(RecorderEvent),
    TimerTick,
}

/// Central application state. Lives on the GTK main thread inside Rc<RefCell<>>.
pub struct AppState {
    pub config: Config,
    pub controller: RecordingController<GstBackend>,
    pub mirror: SurfaceMirror,
    pub sender: async_channel::Sender<AppEvent>,

    // Elapsed-time tick, running while recording or finalizing
    pub timer_source: Option<glib::SourceId>,
    /// Window close was deferred until the current recording is finalized.
    pub close_pending: bool,

    // UI handles
    pub panel: Option<ControlPanelWidgets>,
}

impl AppState {
    pub fn new(sender: async_channel::Sender<AppEvent>) -> Self {
        let config = Config::load();
        let controller = RecordingController::new(GstBackend, config.stop_timeout());

        Self {
            config,
            controller,
            mirror: SurfaceMirror::default(),
            sender,
            timer_source: None,
            close_pending: false,
            panel: None,
        }
    }
}

/// Helper to update the status label.
pub fn update_status(state: &std::rc::Rc<std::cell::RefCell<AppState>>, text: &str) {
    let s = state.borrow();
    if let Some(ref panel) = s.panel {
        panel.status_label.set_text(text);
    }
}
