pub mod store;

pub use store::{parse_minutes, TaskStore};
