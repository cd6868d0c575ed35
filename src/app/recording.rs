use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use gtk4::glib;

use super::state::{AppEvent, AppState, update_status};
use crate::recorder::{RecorderError, RecordingSettings};

/// Initialize and start a recording from the panel's current values.
pub fn start_recording(
    state: &Rc<RefCell<AppState>>,
    filename: &str,
    bitrate_kbps: u32,
    show_cursor: bool,
) {
    let filename = filename.trim();
    if filename.is_empty() {
        update_status(state, "Please enter a filename");
        return;
    }

    let settings = RecordingSettings::new(filename, bitrate_kbps, show_cursor);
    let result: Result<(), RecorderError> = {
        let mut s = state.borrow_mut();
        s.controller
            .initialize(settings.clone())
            .and_then(|()| s.controller.start())
    };

    match result {
        Ok(()) => {
            log::info!(
                "Recording started: {} (bitrate: {} kbps)",
                settings.output_path.display(),
                bitrate_kbps
            );
            remember_choices(state, &settings);
            start_timer(state);
        }
        Err(e) if e.is_misuse() => {
            log::warn!("Start rejected: {e}");
            update_status(state, &format!("Failed to start recording: {e}"));
        }
        // Pipeline failures already reached the panel through the error notification
        Err(e) => log::error!("Failed to start recording: {e}"),
    }
}

/// Ask the pipeline to finish the file. Completion arrives as a notification.
pub fn stop_recording(state: &Rc<RefCell<AppState>>) {
    if state.borrow_mut().controller.stop() {
        log::info!("Stopping recording...");
    }
}

fn remember_choices(state: &Rc<RefCell<AppState>>, settings: &RecordingSettings) {
    let mut s = state.borrow_mut();
    let dir = settings
        .output_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(PathBuf::from);
    s.config.bitrate_kbps = settings.bitrate_kbps;
    s.config.show_cursor = settings.show_cursor;
    if dir.is_some() {
        s.config.output_dir = dir;
    }
    if let Err(e) = s.config.save() {
        log::warn!("Failed to save config: {e}");
    }
}

/// One-second tick for the elapsed-time label and the stop deadline.
fn start_timer(state: &Rc<RefCell<AppState>>) {
    stop_timer(state);

    let sender = state.borrow().sender.clone();
    let source = glib::timeout_add_local(std::time::Duration::from_secs(1), move || {
        let _ = sender.try_send(AppEvent::TimerTick);
        glib::ControlFlow::Continue
    });
    state.borrow_mut().timer_source = Some(source);
}

pub fn stop_timer(state: &Rc<RefCell<AppState>>) {
    if let Some(source) = state.borrow_mut().timer_source.take() {
        source.remove();
    }
}
