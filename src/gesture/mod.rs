pub mod adapter;
pub mod label;

pub use adapter::{Category, ClassifierAdapter, ClassifierFrame, GestureObservation};
pub use label::{GestureLabel, TargetId};
