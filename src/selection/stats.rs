use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::gesture::TargetId;

use super::CommitSource;

/// Running tally for one activation of the selection feature.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SelectionStats {
    pub observations: u64,
    pub ignored_while_locked: u64,
    pub arms: u64,
    pub cancellations: u64,
    pub gesture_commits: u64,
    pub touch_commits: u64,
    pub touches_ignored: u64,
    pub commits_by_target: BTreeMap<TargetId, u64>,
}

impl SelectionStats {
    pub fn record_commit(&mut self, target: TargetId, source: CommitSource) {
        match source {
            CommitSource::Gesture => self.gesture_commits += 1,
            CommitSource::Touch => self.touch_commits += 1,
        }
        *self.commits_by_target.entry(target).or_insert(0) += 1;
    }

    pub fn total_commits(&self) -> u64 {
        self.gesture_commits + self.touch_commits
    }
}
