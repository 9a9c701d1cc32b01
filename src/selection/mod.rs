pub mod config;
pub mod controller;
pub mod events;
pub mod state;
pub mod stats;

pub use config::SelectionConfig;
pub use controller::{SelectionController, SelectionSnapshot};
pub use events::{InputMode, SelectionEvent};
pub use state::{Commit, CommitSource, ObservationOutcome, SelectionSession, SessionPhase};
pub use stats::SelectionStats;
