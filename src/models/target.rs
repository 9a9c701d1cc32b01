use serde::{Deserialize, Serialize};

use crate::gesture::TargetId;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TargetState {
    Idle,
    /// Pre-commit highlight while a gesture dwells on the target.
    Armed,
    Selected,
}

impl Default for TargetState {
    fn default() -> Self {
        TargetState::Idle
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SelectionTarget {
    pub id: TargetId,
    pub label: String,
    pub state: TargetState,
}

impl SelectionTarget {
    pub fn new(id: TargetId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            state: TargetState::Idle,
        }
    }
}
