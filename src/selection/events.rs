use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::gesture::{GestureLabel, TargetId};

use super::CommitSource;

/// Which input path is live. Switching resets the session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum InputMode {
    Gesture,
    Touch,
}

impl Default for InputMode {
    fn default() -> Self {
        InputMode::Gesture
    }
}

/// Published on the controller's broadcast channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum SelectionEvent {
    Armed {
        target_id: TargetId,
        gesture: GestureLabel,
        dwell_ms: u64,
    },
    Cancelled {
        target_id: TargetId,
    },
    Committed {
        target_id: TargetId,
        label: String,
        source: CommitSource,
        at: DateTime<Utc>,
    },
    Unlocked {
        target_id: TargetId,
    },
    ModeChanged {
        mode: InputMode,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_kind_tag() {
        let event = SelectionEvent::Armed {
            target_id: TargetId::new(2).unwrap(),
            gesture: GestureLabel::ClosedFist,
            dwell_ms: 2500,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "armed");
        assert_eq!(json["targetId"], "target2");
        assert_eq!(json["gesture"], "closedFist");
        assert_eq!(json["dwellMs"], 2500);

        let mode = serde_json::to_value(SelectionEvent::ModeChanged {
            mode: InputMode::Touch,
        })
        .unwrap();
        assert_eq!(mode["kind"], "modeChanged");
        assert_eq!(mode["mode"], "touch");
    }
}
