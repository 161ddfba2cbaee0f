pub mod blocked_apps;
pub mod tasks;
