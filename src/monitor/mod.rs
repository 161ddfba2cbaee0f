pub mod controller;
pub mod loop_worker;
pub mod state;

pub use controller::{focus_channel, FocusReceiver, FocusSender, MonitorController};
pub use state::{MonitorState, MonitorStatus};
