pub mod blocked_app;
pub mod focus;
pub mod task;

pub use blocked_app::BlockedApp;
pub use focus::{EventKind, FocusEvent};
pub use task::{GateSnapshot, Task, TaskId};
