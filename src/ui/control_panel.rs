use gtk4::prelude::*;
use libadwaita::prelude::*;

use crate::app::{AppEvent, SurfaceUpdate};
use crate::config::Config;
use crate::recorder::{default_output_path, BITRATE_RANGE_KBPS};

/// Handles returned from building the control panel window.
pub struct ControlPanelWidgets {
    pub window: libadwaita::ApplicationWindow,
    pub filename_entry: libadwaita::EntryRow,
    pub bitrate_row: libadwaita::SpinRow,
    pub cursor_row: libadwaita::SwitchRow,
    pub start_button: gtk4::Button,
    pub stop_button: gtk4::Button,
    pub time_label: gtk4::Label,
    pub progress_bar: gtk4::ProgressBar,
    pub status_label: gtk4::Label,
}

/// Reflect a recorder notification in the panel.
pub fn apply_update(panel: &ControlPanelWidgets, update: &SurfaceUpdate) {
    match update {
        SurfaceUpdate::Preparing => {
            panel.status_label.set_text("Preparing pipeline\u{2026}");
        }
        SurfaceUpdate::Recording => {
            set_recording_controls(panel, true);
            panel.time_label.set_text("Recording: 00:00:00");
            panel.status_label.set_text("Recording in progress...");
        }
        SurfaceUpdate::Finalizing => {
            panel.stop_button.set_sensitive(false);
            panel.progress_bar.set_visible(true);
            panel.progress_bar.pulse();
            panel.status_label.set_text("Finalizing recording...");
        }
        SurfaceUpdate::Saved(path) => {
            set_recording_controls(panel, false);
            panel.progress_bar.set_visible(false);
            panel.time_label.set_text("Recording completed");
            panel
                .status_label
                .set_text(&format!("Saved: {}", path.display()));
        }
        SurfaceUpdate::Failed(message) => {
            set_recording_controls(panel, false);
            panel.progress_bar.set_visible(false);
            panel.time_label.set_text("Recording failed");
            panel.status_label.set_text(&format!("Error: {message}"));
        }
    }
}

fn set_recording_controls(panel: &ControlPanelWidgets, recording: bool) {
    panel.start_button.set_sensitive(!recording);
    panel.stop_button.set_sensitive(recording);
    panel.filename_entry.set_sensitive(!recording);
    panel.bitrate_row.set_sensitive(!recording);
    panel.cursor_row.set_sensitive(!recording);
}

/// Build the main window.
pub fn build_control_panel(
    app: &libadwaita::Application,
    config: &Config,
    sender: async_channel::Sender<AppEvent>,
) -> ControlPanelWidgets {
    let window = libadwaita::ApplicationWindow::builder()
        .application(app)
        .title("Screen Recorder")
        .default_width(450)
        .default_height(350)
        .resizable(false)
        .build();

    let toolbar_view = libadwaita::ToolbarView::new();
    let header = libadwaita::HeaderBar::new();
    toolbar_view.add_top_bar(&header);

    let content = gtk4::Box::new(gtk4::Orientation::Vertical, 15);
    content.set_margin_start(25);
    content.set_margin_end(25);
    content.set_margin_top(12);
    content.set_margin_bottom(25);

    // --- Settings group ---
    let settings_group = libadwaita::PreferencesGroup::new();
    settings_group.set_title("Recording Settings");

    let filename_entry = libadwaita::EntryRow::builder()
        .title("Output File")
        .build();
    let default_path = default_output_path(&config.effective_output_dir());
    filename_entry.set_text(&default_path.to_string_lossy());
    settings_group.add(&filename_entry);

    let bitrate_row = libadwaita::SpinRow::with_range(
        f64::from(*BITRATE_RANGE_KBPS.start()),
        f64::from(*BITRATE_RANGE_KBPS.end()),
        100.0,
    );
    bitrate_row.set_title("Bitrate (kbps)");
    bitrate_row.set_subtitle("Higher bitrate = better quality, larger file size");
    bitrate_row.set_value(f64::from(config.bitrate_kbps));
    settings_group.add(&bitrate_row);

    let cursor_row = libadwaita::SwitchRow::builder()
        .title("Show Cursor")
        .active(config.show_cursor)
        .build();
    settings_group.add(&cursor_row);

    content.append(&settings_group);

    // --- Controls ---
    let button_box = gtk4::Box::new(gtk4::Orientation::Horizontal, 15);
    button_box.set_halign(gtk4::Align::Center);

    let start_button = gtk4::Button::builder()
        .label("Start Recording")
        .width_request(140)
        .height_request(40)
        .build();
    start_button.add_css_class("suggested-action");

    let stop_button = gtk4::Button::builder()
        .label("Stop Recording")
        .width_request(140)
        .height_request(40)
        .sensitive(false)
        .build();
    stop_button.add_css_class("destructive-action");

    button_box.append(&start_button);
    button_box.append(&stop_button);
    content.append(&button_box);

    let time_label = gtk4::Label::new(Some("Ready to record"));
    time_label.add_css_class("title-3");
    time_label.add_css_class("numeric");
    content.append(&time_label);

    // --- Status ---
    let progress_bar = gtk4::ProgressBar::new();
    progress_bar.set_visible(false);
    content.append(&progress_bar);

    let status_label = gtk4::Label::new(Some("Ready"));
    status_label.add_css_class("dim-label");
    status_label.set_wrap(true);
    content.append(&status_label);

    // Intents go to the main loop verbatim
    {
        let sender = sender.clone();
        let filename_entry = filename_entry.clone();
        let bitrate_row = bitrate_row.clone();
        let cursor_row = cursor_row.clone();
        start_button.connect_clicked(move |_| {
            let _ = sender.try_send(AppEvent::StartRequested {
                filename: filename_entry.text().to_string(),
                bitrate_kbps: bitrate_row.value().round() as u32,
                show_cursor: cursor_row.is_active(),
            });
        });
    }
    stop_button.connect_clicked(move |_| {
        let _ = sender.try_send(AppEvent::StopRequested);
    });

    toolbar_view.set_content(Some(&content));
    window.set_content(Some(&toolbar_view));

    ControlPanelWidgets {
        window,
        filename_entry,
        bitrate_row,
        cursor_row,
        start_button,
        stop_button,
        time_label,
        progress_bar,
        status_label,
    }
}
