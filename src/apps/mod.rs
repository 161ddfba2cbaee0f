pub mod registry;

pub use registry::{default_blocked_apps, BlockedAppRegistry};
