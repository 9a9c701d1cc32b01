use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{
    gesture::{Category, ClassifierFrame},
    selection::InputMode,
};

/// One line of a replay stream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ReplayRecord {
    Frame {
        at_ms: u64,
        #[serde(default)]
        gestures: Vec<Category>,
        #[serde(default)]
        hand_present: Option<bool>,
    },
    Touch {
        at_ms: u64,
        /// Kept raw so an unknown id is a logged no-op rather than a parse error.
        target: String,
    },
    Mode {
        at_ms: u64,
        mode: InputMode,
    },
}

impl ReplayRecord {
    /// A frame with no hand in view.
    pub fn dropout(at_ms: u64) -> Self {
        ReplayRecord::Frame {
            at_ms,
            gestures: Vec::new(),
            hand_present: Some(false),
        }
    }

    pub fn at_ms(&self) -> u64 {
        match self {
            ReplayRecord::Frame { at_ms, .. }
            | ReplayRecord::Touch { at_ms, .. }
            | ReplayRecord::Mode { at_ms, .. } => *at_ms,
        }
    }
}

/// Frame payload of a `frame` record, in the shape the adapter consumes.
pub fn classifier_frame(gestures: Vec<Category>, hand_present: Option<bool>) -> ClassifierFrame {
    ClassifierFrame {
        gestures,
        hand_present,
    }
}

/// Parses one line. Blank lines and `#` comments yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<ReplayRecord>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    serde_json::from_str(trimmed)
        .map(Some)
        .with_context(|| format!("malformed replay record: {trimmed}"))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordHeader {
    kind: String,
    at_ms: u64,
}

/// Offset of a `frame` line whose classifier payload does not parse.
/// Returns `None` for anything that is not recognisably a frame.
pub fn malformed_frame_at(line: &str) -> Option<u64> {
    let header: RecordHeader = serde_json::from_str(line.trim()).ok()?;
    (header.kind == "frame").then_some(header.at_ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_frame_records() {
        let record = parse_line(
            r#"{"kind":"frame","atMs":120,"handPresent":true,"gestures":[{"categoryName":"Thumb_Up","score":0.93}]}"#,
        )
        .unwrap()
        .unwrap();
        match record {
            ReplayRecord::Frame {
                at_ms,
                gestures,
                hand_present,
            } => {
                assert_eq!(at_ms, 120);
                assert_eq!(hand_present, Some(true));
                assert_eq!(gestures[0].category_name, "Thumb_Up");
            }
            other => panic!("unexpected record {other:?}"),
        }
    }

    #[test]
    fn frame_without_gestures_means_no_hand() {
        let record = parse_line(r#"{"kind":"frame","atMs":5}"#).unwrap().unwrap();
        let ReplayRecord::Frame {
            gestures,
            hand_present,
            ..
        } = record
        else {
            panic!("expected frame");
        };
        assert!(!classifier_frame(gestures, hand_present).hand_present());
    }

    #[test]
    fn parses_touch_and_mode_records() {
        assert_eq!(
            parse_line(r#"{"kind":"touch","atMs":900,"target":"target3"}"#).unwrap(),
            Some(ReplayRecord::Touch {
                at_ms: 900,
                target: "target3".into()
            })
        );
        assert_eq!(
            parse_line(r#"{"kind":"mode","atMs":1500,"mode":"touch"}"#).unwrap(),
            Some(ReplayRecord::Mode {
                at_ms: 1500,
                mode: InputMode::Touch
            })
        );
    }

    #[test]
    fn skips_blank_and_comment_lines() {
        assert_eq!(parse_line("   ").unwrap(), None);
        assert_eq!(parse_line("# warm-up").unwrap(), None);
    }

    #[test]
    fn rejects_malformed_lines() {
        assert!(parse_line("{not json").is_err());
        assert!(parse_line(r#"{"kind":"wave","atMs":1}"#).is_err());
        assert!(parse_line(r#"{"kind":"touch","target":"target1"}"#).is_err());
    }

    #[test]
    fn recovers_offset_of_broken_frames() {
        let null_score = r#"{"kind":"frame","atMs":1000,"gestures":[{"categoryName":"Thumb_Up","score":null}]}"#;
        assert!(parse_line(null_score).is_err());
        assert_eq!(malformed_frame_at(null_score), Some(1000));
        assert_eq!(
            malformed_frame_at(r#"{"kind":"frame","atMs":1100,"gestures":"garbage"}"#),
            Some(1100)
        );

        assert_eq!(malformed_frame_at(r#"{"kind":"touch","atMs":5,"target":7}"#), None);
        assert_eq!(malformed_frame_at(r#"{"kind":"frame","atMs":"soon"}"#), None);
        assert_eq!(malformed_frame_at("this line is garbage"), None);
    }
}
