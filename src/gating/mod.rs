pub mod gate;
pub mod policy;
pub mod restore;

pub use gate::Gate;
pub use policy::{decide, Decision};
pub use restore::restore_gate;
