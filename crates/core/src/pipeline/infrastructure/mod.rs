pub mod channel_console;
pub mod snapshot_display;
