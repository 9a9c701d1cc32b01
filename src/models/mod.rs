pub mod target;

pub use target::{SelectionTarget, TargetState};
