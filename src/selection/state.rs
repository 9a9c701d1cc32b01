use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;

use crate::gesture::{GestureLabel, TargetId};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SessionPhase {
    Idle,
    Armed,
    Locked,
}

/// Which input path produced a commit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum CommitSource {
    Gesture,
    Touch,
}

/// Result of feeding one observation into the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObservationOutcome {
    /// Session is locked; nothing changed.
    Ignored,
    /// No target matched; `previous` is the arm that was dropped, if any.
    Cancelled { previous: Option<TargetId> },
    /// Same gesture as the current arm; the dwell deadline is untouched.
    Held { target: TargetId },
    /// A fresh arm started and needs a dwell timer for `generation`.
    Armed {
        target: TargetId,
        previous: Option<TargetId>,
        deadline: Instant,
        generation: u64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Commit {
    pub target: TargetId,
    pub source: CommitSource,
    pub lockout_deadline: Instant,
    /// Generation the unlock timer must present.
    pub generation: u64,
}

/// Live selection state. Timers are not owned here: every transition that
/// needs one reports the generation it belongs to, and stale generations are
/// rejected when the timer fires.
#[derive(Debug, Clone, Default)]
pub struct SelectionSession {
    pub armed_gesture: Option<GestureLabel>,
    pub armed_target: Option<TargetId>,
    pub dwell_deadline: Option<Instant>,
    pub locked: bool,
    pub lockout_deadline: Option<Instant>,
    pub generation: u64,
}

impl SelectionSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SessionPhase {
        if self.locked {
            SessionPhase::Locked
        } else if self.armed_target.is_some() {
            SessionPhase::Armed
        } else {
            SessionPhase::Idle
        }
    }

    pub fn observe(&mut self, label: GestureLabel, now: Instant, dwell: Duration) -> ObservationOutcome {
        if self.locked {
            return ObservationOutcome::Ignored;
        }

        let Some(target) = label.target() else {
            return ObservationOutcome::Cancelled {
                previous: self.disarm(),
            };
        };

        if self.armed_gesture == Some(label) {
            return ObservationOutcome::Held { target };
        }

        let previous = self.armed_target;
        let deadline = now + dwell;
        self.generation = self.generation.wrapping_add(1);
        self.armed_gesture = Some(label);
        self.armed_target = Some(target);
        self.dwell_deadline = Some(deadline);

        ObservationOutcome::Armed {
            target,
            previous,
            deadline,
            generation: self.generation,
        }
    }

    /// Dwell timer callback. Commits only if the arm that scheduled the timer
    /// is still the current one.
    pub fn dwell_elapsed(&mut self, generation: u64, now: Instant, cooldown: Duration) -> Option<Commit> {
        if self.locked || generation != self.generation || self.dwell_deadline.is_none() {
            return None;
        }
        let target = self.armed_target?;
        Some(self.lock(target, CommitSource::Gesture, now, cooldown))
    }

    /// Touch path: commits immediately unless locked. Any pending arm is dropped.
    pub fn direct_trigger(&mut self, target: TargetId, now: Instant, cooldown: Duration) -> Option<Commit> {
        if self.locked {
            return None;
        }
        self.armed_gesture = None;
        Some(self.lock(target, CommitSource::Touch, now, cooldown))
    }

    /// Unlock timer callback. Returns the target whose selection ends.
    pub fn unlock(&mut self, generation: u64) -> Option<TargetId> {
        if !self.locked || generation != self.generation {
            return None;
        }
        let target = self.armed_target;
        self.clear();
        target
    }

    /// Back to Idle from any phase; returns whatever target was armed or selected.
    pub fn reset(&mut self) -> Option<TargetId> {
        let target = self.armed_target;
        self.clear();
        target
    }

    fn lock(&mut self, target: TargetId, source: CommitSource, now: Instant, cooldown: Duration) -> Commit {
        let lockout_deadline = now + cooldown;
        self.generation = self.generation.wrapping_add(1);
        self.armed_target = Some(target);
        self.dwell_deadline = None;
        self.locked = true;
        self.lockout_deadline = Some(lockout_deadline);

        Commit {
            target,
            source,
            lockout_deadline,
            generation: self.generation,
        }
    }

    fn disarm(&mut self) -> Option<TargetId> {
        let previous = self.armed_target.take();
        self.armed_gesture = None;
        if self.dwell_deadline.take().is_some() {
            self.generation = self.generation.wrapping_add(1);
        }
        previous
    }

    fn clear(&mut self) {
        *self = Self {
            generation: self.generation.wrapping_add(1),
            ..Self::default()
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DWELL: Duration = Duration::from_millis(2500);
    const COOLDOWN: Duration = Duration::from_millis(2000);

    fn armed_generation(outcome: ObservationOutcome) -> u64 {
        match outcome {
            ObservationOutcome::Armed { generation, .. } => generation,
            other => panic!("expected Armed, got {other:?}"),
        }
    }

    #[test]
    fn first_recognized_gesture_arms_its_target() {
        let mut session = SelectionSession::new();
        let now = Instant::now();
        let outcome = session.observe(GestureLabel::ThumbUp, now, DWELL);
        match outcome {
            ObservationOutcome::Armed {
                target,
                previous,
                deadline,
                ..
            } => {
                assert_eq!(target.to_string(), "target4");
                assert_eq!(previous, None);
                assert_eq!(deadline, now + DWELL);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(session.phase(), SessionPhase::Armed);
    }

    #[test]
    fn repeated_gesture_keeps_original_deadline() {
        let mut session = SelectionSession::new();
        let start = Instant::now();
        let generation = armed_generation(session.observe(GestureLabel::Victory, start, DWELL));

        let later = start + Duration::from_millis(1800);
        let outcome = session.observe(GestureLabel::Victory, later, DWELL);
        assert!(matches!(outcome, ObservationOutcome::Held { .. }));
        assert_eq!(session.dwell_deadline, Some(start + DWELL));
        assert_eq!(session.generation, generation);
    }

    #[test]
    fn gesture_change_rearms_and_invalidates_old_timer() {
        let mut session = SelectionSession::new();
        let start = Instant::now();
        let first = armed_generation(session.observe(GestureLabel::OpenPalm, start, DWELL));

        let switch_at = start + Duration::from_millis(1000);
        let outcome = session.observe(GestureLabel::ClosedFist, switch_at, DWELL);
        let second = match outcome {
            ObservationOutcome::Armed {
                previous,
                deadline,
                generation,
                ..
            } => {
                assert_eq!(previous, GestureLabel::OpenPalm.target());
                assert_eq!(deadline, switch_at + DWELL);
                generation
            }
            other => panic!("unexpected outcome {other:?}"),
        };

        assert_eq!(session.dwell_elapsed(first, start + DWELL, COOLDOWN), None);
        let commit = session
            .dwell_elapsed(second, switch_at + DWELL, COOLDOWN)
            .expect("second arm commits");
        assert_eq!(commit.target, GestureLabel::ClosedFist.target().unwrap());
    }

    #[test]
    fn no_match_cancels_arm() {
        let mut session = SelectionSession::new();
        let start = Instant::now();
        let generation = armed_generation(session.observe(GestureLabel::PointingUp, start, DWELL));

        let outcome = session.observe(GestureLabel::None, start + Duration::from_millis(2499), DWELL);
        assert_eq!(
            outcome,
            ObservationOutcome::Cancelled {
                previous: GestureLabel::PointingUp.target()
            }
        );
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert_eq!(session.dwell_elapsed(generation, start + DWELL, COOLDOWN), None);
    }

    #[test]
    fn no_match_while_idle_is_harmless() {
        let mut session = SelectionSession::new();
        let outcome = session.observe(GestureLabel::None, Instant::now(), DWELL);
        assert_eq!(outcome, ObservationOutcome::Cancelled { previous: None });
        assert_eq!(session.generation, 0);
    }

    #[test]
    fn lock_ignores_every_input_until_unlock() {
        let mut session = SelectionSession::new();
        let start = Instant::now();
        let generation = armed_generation(session.observe(GestureLabel::ThumbUp, start, DWELL));
        let commit = session
            .dwell_elapsed(generation, start + DWELL, COOLDOWN)
            .unwrap();
        assert_eq!(commit.source, CommitSource::Gesture);
        assert_eq!(commit.lockout_deadline, start + DWELL + COOLDOWN);
        assert_eq!(session.phase(), SessionPhase::Locked);

        let before = session.clone();
        let mid = start + DWELL + Duration::from_millis(500);
        assert_eq!(session.observe(GestureLabel::Victory, mid, DWELL), ObservationOutcome::Ignored);
        assert_eq!(session.observe(GestureLabel::None, mid, DWELL), ObservationOutcome::Ignored);
        assert_eq!(session.direct_trigger(TargetId::new(2).unwrap(), mid, COOLDOWN), None);
        assert_eq!(session.generation, before.generation);
        assert_eq!(session.armed_target, before.armed_target);

        assert_eq!(session.unlock(commit.generation), GestureLabel::ThumbUp.target());
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert_eq!(session.armed_gesture, None);
    }

    #[test]
    fn direct_trigger_skips_dwell_and_supersedes_arm() {
        let mut session = SelectionSession::new();
        let start = Instant::now();
        let generation = armed_generation(session.observe(GestureLabel::OpenPalm, start, DWELL));

        let target = TargetId::new(3).unwrap();
        let commit = session.direct_trigger(target, start, COOLDOWN).unwrap();
        assert_eq!(commit.target, target);
        assert_eq!(commit.source, CommitSource::Touch);
        assert_eq!(session.dwell_elapsed(generation, start + DWELL, COOLDOWN), None);
        assert_eq!(session.unlock(commit.generation), Some(target));
    }

    #[test]
    fn stale_unlock_is_rejected_after_reset() {
        let mut session = SelectionSession::new();
        let now = Instant::now();
        let commit = session
            .direct_trigger(TargetId::new(1).unwrap(), now, COOLDOWN)
            .unwrap();
        assert_eq!(session.reset(), TargetId::new(1));
        assert_eq!(session.unlock(commit.generation), None);
        assert_eq!(session.phase(), SessionPhase::Idle);
    }
}
