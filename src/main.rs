mod app;
mod config;
mod recorder;
mod ui;

use std::cell::RefCell;
use std::rc::Rc;

use gstreamer as gst;
use gtk4::glib;
use gtk4::prelude::*;

use app::{AppEvent, AppState};

fn main() -> glib::ExitCode {
    env_logger::init();
    log::info!("Screen Recorder starting");

    if let Err(e) = gst::init() {
        log::error!("Failed to initialize GStreamer: {e}");
        return glib::ExitCode::FAILURE;
    }

    let missing = recorder::missing_elements();
    if !missing.is_empty() {
        log::error!("Required GStreamer elements are not available:");
        for (element, plugin) in &missing {
            log::error!("  {element} (install {plugin})");
        }
        return glib::ExitCode::FAILURE;
    }

    let application = libadwaita::Application::builder()
        .application_id("com.github.screen-recorder")
        .build();

    application.connect_activate(on_activate);
    application.run()
}

fn on_activate(app: &libadwaita::Application) {
    let (event_tx, event_rx) = async_channel::unbounded::<AppEvent>();

    let state = Rc::new(RefCell::new(AppState::new(event_tx.clone())));

    let panel = ui::control_panel::build_control_panel(app, &state.borrow().config, event_tx.clone());

    // Closing mid-recording waits for the file to be finalized
    {
        let state_clone = state.clone();
        let sender = event_tx.clone();
        panel.window.connect_close_request(move |_| {
            let Ok(mut s) = state_clone.try_borrow_mut() else {
                return glib::Propagation::Stop;
            };
            if !s.controller.state().is_busy() {
                return glib::Propagation::Proceed;
            }
            log::info!("Window closing during recording, stopping first");
            s.close_pending = true;
            drop(s);
            let _ = sender.try_send(AppEvent::StopRequested);
            glib::Propagation::Stop
        });
    }

    state.borrow_mut().panel = Some(panel);

    // Forward recorder notifications to the main event channel
    {
        let notifications = state.borrow_mut().controller.subscribe();
        let sender = event_tx;
        glib::spawn_future_local(async move {
            while let Ok(event) = notifications.recv().await {
                let _ = sender.send(AppEvent::Recorder(event)).await;
            }
        });
    }

    // Drain the pipeline bus on this thread
    {
        let bus = state.borrow().controller.bus();
        let state_clone = state.clone();
        glib::spawn_future_local(async move {
            while let Ok(message) = bus.recv().await {
                state_clone.borrow_mut().controller.handle_bus_message(message);
            }
        });
    }

    // Attach event handler
    {
        let state_clone = state.clone();
        glib::spawn_future_local(async move {
            while let Ok(event) = event_rx.recv().await {
                app::handle_app_event(&state_clone, event);
            }
        });
    }

    if let Some(ref panel) = state.borrow().panel {
        panel.window.present();
    };
}
