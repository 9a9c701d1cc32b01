pub mod controller;
pub mod loop_worker;
pub mod record;

pub use controller::ReplayController;
pub use loop_worker::{replay_loop, ReplayReport};
pub use record::{parse_line, ReplayRecord};
