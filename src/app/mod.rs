mod event_handler;
mod feedback;
mod recording;
mod state;

pub use event_handler::handle_app_event;
pub use feedback::SurfaceUpdate;
pub use state::{AppEvent, AppState};
