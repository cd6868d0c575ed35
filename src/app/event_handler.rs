use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

use gtk4::prelude::*;

use super::feedback::{elapsed_text, SurfaceUpdate};
use super::recording::{start_recording, stop_recording, stop_timer};
use super::state::{AppEvent, AppState};
use crate::recorder::{default_output_path, RecorderEvent, RecordingState};
use crate::ui::control_panel::apply_update;

/// Handle an event on the GTK main thread.
pub fn handle_app_event(state: &Rc<RefCell<AppState>>, event: AppEvent) {
    match event {
        AppEvent::StartRequested {
            filename,
            bitrate_kbps,
            show_cursor,
        } => start_recording(state, &filename, bitrate_kbps, show_cursor),
        AppEvent::StopRequested => stop_recording(state),
        AppEvent::Recorder(event) => on_recorder_event(state, event),
        AppEvent::TimerTick => on_timer_tick(state),
    }
}

fn on_recorder_event(state: &Rc<RefCell<AppState>>, event: RecorderEvent) {
    if let RecorderEvent::Error(ref message) = event {
        log::error!("Recorder error: {message}");
    }

    let update = {
        let mut s = state.borrow_mut();
        let output = s.controller.settings().map(|st| st.output_path.clone());
        s.mirror.apply(&event, output.as_deref())
    };

    if let Some(ref update) = update {
        let s = state.borrow();
        if let Some(ref panel) = s.panel {
            apply_update(panel, update);
            if let SurfaceUpdate::Saved(_) = update {
                // Fresh default name so the next take doesn't overwrite this one
                let next = default_output_path(&s.config.effective_output_dir());
                panel.filename_entry.set_text(&next.to_string_lossy());
            }
        }
    }

    if let Some(SurfaceUpdate::Saved(path)) = &update {
        log::info!("Recording completed: {}", path.display());
    }

    // The notification may lag the controller; its current state decides.
    if state.borrow().controller.state().is_busy() {
        return;
    }
    stop_timer(state);

    let window = {
        let mut s = state.borrow_mut();
        if s.close_pending {
            s.close_pending = false;
            s.panel.as_ref().map(|p| p.window.clone())
        } else {
            None
        }
    };
    if let Some(window) = window {
        log::info!("Recording settled, closing window");
        window.close();
    }
}

fn on_timer_tick(state: &Rc<RefCell<AppState>>) {
    if state
        .borrow_mut()
        .controller
        .enforce_stop_deadline(Instant::now())
    {
        // The resulting Error notification is already queued
        return;
    }

    let s = state.borrow();
    let Some(ref panel) = s.panel else {
        return;
    };
    match s.controller.state() {
        RecordingState::Recording => {
            panel
                .time_label
                .set_text(&elapsed_text(s.controller.recording_duration()));
        }
        RecordingState::Stopping => panel.progress_bar.pulse(),
        _ => {}
    }
}
