use std::collections::BTreeMap;
use std::time::Duration;

use crate::gesture::{GestureLabel, TargetId};

pub const DEFAULT_DWELL_MS: u64 = 2500;
pub const DEFAULT_COOLDOWN_MS: u64 = 2000;
pub const DEFAULT_HAPTIC_MS: u64 = 100;

/// Timing and labelling used by the selection controller.
#[derive(Debug, Clone)]
pub struct SelectionConfig {
    /// How long a gesture must be held before it commits.
    pub dwell: Duration,

    /// Lockout after a commit, during which every input is inert.
    pub cooldown: Duration,

    /// Length of the haptic pulse sent with the confirmation cue.
    pub haptic: Duration,

    /// Display label per target; missing entries fall back to the gesture name.
    pub labels: BTreeMap<TargetId, String>,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            dwell: Duration::from_millis(DEFAULT_DWELL_MS),
            cooldown: Duration::from_millis(DEFAULT_COOLDOWN_MS),
            haptic: Duration::from_millis(DEFAULT_HAPTIC_MS),
            labels: BTreeMap::new(),
        }
    }
}

impl SelectionConfig {
    pub fn label_for(&self, target: TargetId) -> String {
        self.labels
            .get(&target)
            .cloned()
            .unwrap_or_else(|| GestureLabel::for_target(target).display_name().to_string())
    }
}
