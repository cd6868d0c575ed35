pub mod control_panel;
