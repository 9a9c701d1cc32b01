use anyhow::{anyhow, Error};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Hand poses the classifier can report. `None` covers both "no hand" and
/// any category outside the recognized vocabulary.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum GestureLabel {
    OpenPalm,
    ClosedFist,
    PointingUp,
    ThumbUp,
    Victory,
    None,
}

impl Default for GestureLabel {
    fn default() -> Self {
        GestureLabel::None
    }
}

impl GestureLabel {
    pub const RECOGNIZED: [GestureLabel; 5] = [
        GestureLabel::OpenPalm,
        GestureLabel::ClosedFist,
        GestureLabel::PointingUp,
        GestureLabel::ThumbUp,
        GestureLabel::Victory,
    ];

    /// Maps a classifier category name (`Thumb_Up`, `Open_Palm`, ...) onto a label.
    pub fn from_category(name: &str) -> Self {
        match name.trim() {
            "Open_Palm" => GestureLabel::OpenPalm,
            "Closed_Fist" => GestureLabel::ClosedFist,
            "Pointing_Up" => GestureLabel::PointingUp,
            "Thumb_Up" => GestureLabel::ThumbUp,
            "Victory" => GestureLabel::Victory,
            _ => GestureLabel::None,
        }
    }

    pub fn category_name(&self) -> &'static str {
        match self {
            GestureLabel::OpenPalm => "Open_Palm",
            GestureLabel::ClosedFist => "Closed_Fist",
            GestureLabel::PointingUp => "Pointing_Up",
            GestureLabel::ThumbUp => "Thumb_Up",
            GestureLabel::Victory => "Victory",
            GestureLabel::None => "None",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            GestureLabel::OpenPalm => "Open Palm 🤚",
            GestureLabel::ClosedFist => "Closed Fist ✊",
            GestureLabel::PointingUp => "Pointing Up ☝️",
            GestureLabel::ThumbUp => "Thumb Up 👍",
            GestureLabel::Victory => "Peace ✌️",
            GestureLabel::None => "None",
        }
    }

    /// The fixed label→target table. Total over the enum: `None` is the only
    /// label without a target.
    pub fn target(&self) -> Option<TargetId> {
        match self {
            GestureLabel::OpenPalm => Some(TargetId(1)),
            GestureLabel::ClosedFist => Some(TargetId(2)),
            GestureLabel::PointingUp => Some(TargetId(3)),
            GestureLabel::ThumbUp => Some(TargetId(4)),
            GestureLabel::Victory => Some(TargetId(5)),
            GestureLabel::None => None,
        }
    }

    /// Reverse of [`GestureLabel::target`].
    pub fn for_target(target: TargetId) -> Self {
        Self::RECOGNIZED
            .into_iter()
            .find(|label| label.target() == Some(target))
            .unwrap_or(GestureLabel::None)
    }
}

impl fmt::Display for GestureLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.category_name())
    }
}

/// Stable identifier of a selectable control, rendered as `target1`..`target5`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub struct TargetId(u8);

impl TargetId {
    pub const COUNT: u8 = 5;

    pub fn new(index: u8) -> Option<Self> {
        (1..=Self::COUNT).contains(&index).then_some(TargetId(index))
    }

    pub fn index(&self) -> u8 {
        self.0
    }

    pub fn all() -> impl Iterator<Item = TargetId> {
        (1..=Self::COUNT).map(TargetId)
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "target{}", self.0)
    }
}

impl FromStr for TargetId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let index = s
            .trim()
            .strip_prefix("target")
            .and_then(|digits| digits.parse::<u8>().ok())
            .ok_or_else(|| anyhow!("malformed target id {s:?}"))?;
        TargetId::new(index).ok_or_else(|| anyhow!("unknown target id {s:?}"))
    }
}

impl TryFrom<String> for TargetId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TargetId> for String {
    fn from(value: TargetId) -> Self {
        value.to_string()
    }
}
