pub mod board;

pub use board::{BoardSnapshot, TargetBoard};

use anyhow::Result;
use std::time::Duration;

use crate::gesture::TargetId;

/// Presentation side of the selection controller. Every call must be
/// idempotent; the controller never inspects what the sink renders.
pub trait FeedbackSink: Send + Sync {
    /// Pre-commit highlight on `target`.
    fn set_active(&self, target: TargetId);
    fn clear_all_active(&self);
    fn set_selected(&self, target: TargetId);
    fn clear_selected(&self, target: TargetId);
    fn show_status(&self, text: &str);
    fn hide_status(&self);
    /// Live "Hand Pose / Confidence" line.
    fn show_readout(&self, text: &str);
    /// Audio cue plus haptic pulse of `haptic` length. Failures are reported,
    /// never retried.
    fn play_confirmation(&self, haptic: Duration) -> Result<()>;
}
