use anyhow::{anyhow, Result};
use serde::Serialize;
use std::sync::{PoisonError, RwLock, RwLockWriteGuard};
use std::time::Duration;

use crate::{
    audio::AudioEngineHandle,
    gesture::TargetId,
    models::{SelectionTarget, TargetState},
    selection::SelectionConfig,
};

use super::FeedbackSink;

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BoardSnapshot {
    pub targets: Vec<SelectionTarget>,
    pub status: Option<String>,
    pub readout: Option<String>,
}

#[derive(Debug)]
struct BoardState {
    targets: Vec<SelectionTarget>,
    status: Option<String>,
    readout: Option<String>,
}

/// In-memory stand-in for the button panel. Renders every change to the log
/// and keeps the current picture for inspection.
pub struct TargetBoard {
    inner: RwLock<BoardState>,
    audio: Option<AudioEngineHandle>,
    volume: f32,
}

impl TargetBoard {
    pub fn new(config: &SelectionConfig) -> Self {
        let targets = TargetId::all()
            .map(|id| SelectionTarget::new(id, config.label_for(id)))
            .collect();
        Self {
            inner: RwLock::new(BoardState {
                targets,
                status: None,
                readout: None,
            }),
            audio: None,
            volume: 1.0,
        }
    }

    /// Routes the confirmation cue to the audio thread.
    pub fn with_audio(mut self, audio: AudioEngineHandle, volume: f32) -> Self {
        self.audio = Some(audio);
        self.volume = volume.clamp(0.0, 1.0);
        self
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        BoardSnapshot {
            targets: guard.targets.clone(),
            status: guard.status.clone(),
            readout: guard.readout.clone(),
        }
    }

    pub fn state_of(&self, target: TargetId) -> Option<TargetState> {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        guard
            .targets
            .iter()
            .find(|t| t.id == target)
            .map(|t| t.state)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BoardState> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn update(&self, target: TargetId, apply: impl FnOnce(&mut SelectionTarget)) {
        let mut guard = self.write();
        if let Some(entry) = guard.targets.iter_mut().find(|t| t.id == target) {
            apply(entry);
        }
    }
}

impl FeedbackSink for TargetBoard {
    fn set_active(&self, target: TargetId) {
        self.update(target, |entry| {
            if entry.state == TargetState::Idle {
                entry.state = TargetState::Armed;
                log_debug!("[{}] {} active", entry.id, entry.label);
            }
        });
    }

    fn clear_all_active(&self) {
        let mut guard = self.write();
        for entry in guard
            .targets
            .iter_mut()
            .filter(|t| t.state == TargetState::Armed)
        {
            entry.state = TargetState::Idle;
        }
    }

    fn set_selected(&self, target: TargetId) {
        self.update(target, |entry| {
            if entry.state != TargetState::Selected {
                entry.state = TargetState::Selected;
                log_info!("[{}] {} selected", entry.id, entry.label);
            }
        });
    }

    fn clear_selected(&self, target: TargetId) {
        self.update(target, |entry| {
            if entry.state == TargetState::Selected {
                entry.state = TargetState::Idle;
            }
        });
    }

    fn show_status(&self, text: &str) {
        let mut guard = self.write();
        if guard.status.as_deref() != Some(text) {
            log_info!("status: {}", text);
            guard.status = Some(text.to_string());
        }
    }

    fn hide_status(&self) {
        self.write().status = None;
    }

    fn show_readout(&self, text: &str) {
        let mut guard = self.write();
        if guard.readout.as_deref() != Some(text) {
            log_debug!("{}", text);
            guard.readout = Some(text.to_string());
        }
    }

    fn play_confirmation(&self, haptic: Duration) -> Result<()> {
        log_info!("haptic pulse {}ms", haptic.as_millis());
        match &self.audio {
            Some(audio) => audio.play_ping(self.volume).map_err(|e| anyhow!(e)),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(index: u8) -> TargetId {
        TargetId::new(index).unwrap()
    }

    #[test]
    fn board_starts_idle_with_gesture_labels() {
        let board = TargetBoard::new(&SelectionConfig::default());
        let snapshot = board.snapshot();
        assert_eq!(snapshot.targets.len(), 5);
        assert!(snapshot
            .targets
            .iter()
            .all(|t| t.state == TargetState::Idle));
        assert_eq!(snapshot.targets[4].label, "Peace ✌️");
        assert_eq!(snapshot.status, None);
    }

    #[test]
    fn configured_labels_override_defaults() {
        let mut config = SelectionConfig::default();
        config.labels.insert(target(2), "Call nurse".to_string());
        let board = TargetBoard::new(&config);
        assert_eq!(board.snapshot().targets[1].label, "Call nurse");
    }

    #[test]
    fn active_and_selected_are_distinct() {
        let board = TargetBoard::new(&SelectionConfig::default());
        board.set_active(target(1));
        board.set_active(target(1));
        assert_eq!(board.state_of(target(1)), Some(TargetState::Armed));

        board.set_selected(target(1));
        board.clear_all_active();
        assert_eq!(board.state_of(target(1)), Some(TargetState::Selected));

        board.set_active(target(1));
        assert_eq!(board.state_of(target(1)), Some(TargetState::Selected));

        board.clear_selected(target(1));
        assert_eq!(board.state_of(target(1)), Some(TargetState::Idle));
    }

    #[test]
    fn clear_all_active_only_touches_armed_targets() {
        let board = TargetBoard::new(&SelectionConfig::default());
        board.set_active(target(2));
        board.set_active(target(3));
        board.set_selected(target(4));
        board.clear_all_active();

        assert_eq!(board.state_of(target(2)), Some(TargetState::Idle));
        assert_eq!(board.state_of(target(3)), Some(TargetState::Idle));
        assert_eq!(board.state_of(target(4)), Some(TargetState::Selected));
    }

    #[test]
    fn status_and_readout_are_tracked() {
        let board = TargetBoard::new(&SelectionConfig::default());
        board.show_status("Button Selected: Thumb Up 👍");
        board.show_readout("Hand Pose: None, Confidence: N/A");
        let snapshot = board.snapshot();
        assert_eq!(snapshot.status.as_deref(), Some("Button Selected: Thumb Up 👍"));
        assert_eq!(
            snapshot.readout.as_deref(),
            Some("Hand Pose: None, Confidence: N/A")
        );

        board.hide_status();
        assert_eq!(board.snapshot().status, None);
    }

    #[test]
    fn confirmation_without_audio_succeeds() {
        let board = TargetBoard::new(&SelectionConfig::default());
        assert!(board.play_confirmation(Duration::from_millis(100)).is_ok());
    }
}
