use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use super::GestureLabel;

/// One ranked entry of the classifier output.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(default)]
    pub category_name: String,
    #[serde(default)]
    pub score: f32,
}

/// Raw per-frame classifier result: categories ordered best first, plus the
/// detector's hand-presence flag.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClassifierFrame {
    #[serde(default)]
    pub gestures: Vec<Category>,
    /// When absent, presence is inferred from a non-empty `gestures` list.
    #[serde(default)]
    pub hand_present: Option<bool>,
}

impl ClassifierFrame {
    pub fn hand_present(&self) -> bool {
        self.hand_present.unwrap_or(!self.gestures.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureObservation {
    pub label: GestureLabel,
    /// Always within `[0, 1]`.
    pub confidence: f32,
    pub timestamp: Instant,
}

impl GestureObservation {
    pub fn new(label: GestureLabel, confidence: f32, timestamp: Instant) -> Self {
        let confidence = if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            label,
            confidence,
            timestamp,
        }
    }

    pub fn none(timestamp: Instant) -> Self {
        Self::new(GestureLabel::None, 0.0, timestamp)
    }

    pub fn confidence_percent(&self) -> u32 {
        (self.confidence * 100.0).round() as u32
    }

    /// Text for the live gesture readout.
    pub fn readout(&self) -> String {
        match self.label {
            GestureLabel::None => "Hand Pose: None, Confidence: N/A".to_string(),
            label => format!(
                "Hand Pose: {}, Confidence: {}%",
                label.display_name(),
                self.confidence_percent()
            ),
        }
    }
}

/// Reduces a raw classifier frame to the single best observation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassifierAdapter {
    min_confidence: f32,
}

impl ClassifierAdapter {
    pub fn new(min_confidence: f32) -> Self {
        let min_confidence = if min_confidence.is_finite() {
            min_confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self { min_confidence }
    }

    pub fn normalize(&self, frame: &ClassifierFrame, timestamp: Instant) -> GestureObservation {
        if !frame.hand_present() {
            return GestureObservation::none(timestamp);
        }
        let Some(top) = frame.gestures.first() else {
            return GestureObservation::none(timestamp);
        };

        let observation =
            GestureObservation::new(GestureLabel::from_category(&top.category_name), top.score, timestamp);
        if observation.label == GestureLabel::None || observation.confidence < self.min_confidence {
            return GestureObservation::none(timestamp);
        }
        observation
    }
}
