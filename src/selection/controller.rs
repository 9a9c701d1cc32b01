use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
    time::{self, Instant},
};

use crate::{
    feedback::FeedbackSink,
    gesture::{GestureLabel, GestureObservation, TargetId},
};

use super::{
    Commit, InputMode, ObservationOutcome, SelectionConfig, SelectionEvent, SelectionSession,
    SelectionStats, SessionPhase,
};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_info};

const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionSnapshot {
    pub phase: SessionPhase,
    pub mode: InputMode,
    pub armed_gesture: Option<GestureLabel>,
    pub armed_target: Option<TargetId>,
    pub dwell_remaining_ms: Option<u64>,
    pub lockout_remaining_ms: Option<u64>,
    pub stats: SelectionStats,
}

struct ControllerState {
    session: SelectionSession,
    mode: InputMode,
    stats: SelectionStats,
    dwell_timer: Option<JoinHandle<()>>,
    unlock_timer: Option<JoinHandle<()>>,
}

/// Drives a [`SelectionSession`] from observations, touches and its own
/// dwell/unlock timers. Every transition runs under one lock, so the gesture
/// and touch paths never interleave.
#[derive(Clone)]
pub struct SelectionController {
    state: Arc<Mutex<ControllerState>>,
    sink: Arc<dyn FeedbackSink>,
    config: Arc<SelectionConfig>,
    events: broadcast::Sender<SelectionEvent>,
}

impl SelectionController {
    pub fn new(config: SelectionConfig, sink: Arc<dyn FeedbackSink>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            state: Arc::new(Mutex::new(ControllerState {
                session: SelectionSession::new(),
                mode: InputMode::default(),
                stats: SelectionStats::default(),
                dwell_timer: None,
                unlock_timer: None,
            })),
            sink,
            config: Arc::new(config),
            events,
        }
    }

    pub fn config(&self) -> &SelectionConfig {
        &self.config
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SelectionEvent> {
        self.events.subscribe()
    }

    pub async fn mode(&self) -> InputMode {
        self.state.lock().await.mode
    }

    pub async fn stats(&self) -> SelectionStats {
        self.state.lock().await.stats.clone()
    }

    pub async fn snapshot(&self) -> SelectionSnapshot {
        let state = self.state.lock().await;
        let now = Instant::now();
        let remaining = |deadline: Option<Instant>| {
            deadline.map(|d| d.saturating_duration_since(now).as_millis() as u64)
        };
        SelectionSnapshot {
            phase: state.session.phase(),
            mode: state.mode,
            armed_gesture: state.session.armed_gesture,
            armed_target: state.session.armed_target,
            dwell_remaining_ms: remaining(state.session.dwell_deadline),
            lockout_remaining_ms: remaining(state.session.lockout_deadline),
            stats: state.stats.clone(),
        }
    }

    /// Feeds one per-frame observation through the dwell protocol.
    pub async fn on_observation(&self, obs: GestureObservation) {
        let mut state = self.state.lock().await;
        state.stats.observations += 1;

        match state
            .session
            .observe(obs.label, Instant::now(), self.config.dwell)
        {
            ObservationOutcome::Ignored => {
                state.stats.ignored_while_locked += 1;
            }
            ObservationOutcome::Cancelled { previous } => {
                abort_timer(&mut state.dwell_timer);
                self.sink.clear_all_active();
                self.sink.show_readout(&obs.readout());
                if let Some(target) = previous {
                    state.stats.cancellations += 1;
                    log_info!("arm on {} cancelled: no gesture", target);
                    self.emit(SelectionEvent::Cancelled { target_id: target });
                }
            }
            ObservationOutcome::Held { target } => {
                // Redraw only; the dwell deadline stays where it was.
                self.sink.set_active(target);
                self.sink.show_readout(&obs.readout());
            }
            ObservationOutcome::Armed {
                target,
                previous,
                deadline,
                generation,
            } => {
                state.stats.arms += 1;
                if let Some(previous) = previous {
                    state.stats.cancellations += 1;
                    self.emit(SelectionEvent::Cancelled {
                        target_id: previous,
                    });
                }
                self.sink.clear_all_active();
                self.sink.set_active(target);
                self.sink.show_readout(&obs.readout());
                self.schedule_dwell(&mut state, generation, deadline);

                log_info!(
                    "armed {} on {} ({}% confidence)",
                    target,
                    obs.label,
                    obs.confidence_percent()
                );
                self.emit(SelectionEvent::Armed {
                    target_id: target,
                    gesture: obs.label,
                    dwell_ms: self.config.dwell.as_millis() as u64,
                });
            }
        }
    }

    /// Touch path. Commits `target` at once unless a cooldown is running.
    /// Returns whether a commit happened.
    pub async fn on_direct_trigger(&self, target: TargetId) -> bool {
        let mut state = self.state.lock().await;
        let pending = state
            .session
            .armed_target
            .filter(|armed| !state.session.locked && *armed != target);

        let Some(commit) =
            state
                .session
                .direct_trigger(target, Instant::now(), self.config.cooldown)
        else {
            state.stats.touches_ignored += 1;
            log_info!("touch on {} ignored: selection locked", target);
            return false;
        };

        abort_timer(&mut state.dwell_timer);
        if let Some(previous) = pending {
            state.stats.cancellations += 1;
            self.emit(SelectionEvent::Cancelled {
                target_id: previous,
            });
        }
        self.apply_commit(&mut state, commit);
        true
    }

    pub async fn set_mode(&self, mode: InputMode) {
        let mut state = self.state.lock().await;
        if state.mode == mode {
            return;
        }
        self.reset_session(&mut state);
        state.mode = mode;
        log_info!("input mode switched to {:?}", mode);
        self.emit(SelectionEvent::ModeChanged { mode });
    }

    /// Tears down pending timers and returns the session to Idle.
    pub async fn disable(&self) {
        let mut state = self.state.lock().await;
        self.reset_session(&mut state);
    }

    fn reset_session(&self, state: &mut ControllerState) {
        abort_timer(&mut state.dwell_timer);
        abort_timer(&mut state.unlock_timer);
        if let Some(target) = state.session.reset() {
            self.sink.clear_selected(target);
        }
        self.sink.clear_all_active();
        self.sink.hide_status();
    }

    fn apply_commit(&self, state: &mut ControllerState, commit: Commit) {
        let label = self.config.label_for(commit.target);

        self.sink.set_selected(commit.target);
        if let Err(err) = self.sink.play_confirmation(self.config.haptic) {
            log_error!("confirmation cue failed for {}: {:#}", commit.target, err);
        }
        self.sink.clear_all_active();
        self.sink.show_status(&format!("Button Selected: {label}"));

        state.stats.record_commit(commit.target, commit.source);
        self.schedule_unlock(state, commit.generation, commit.lockout_deadline);

        log_info!(
            "committed {} ({}) via {:?}; locked for {}ms",
            commit.target,
            label,
            commit.source,
            self.config.cooldown.as_millis()
        );
        self.emit(SelectionEvent::Committed {
            target_id: commit.target,
            label,
            source: commit.source,
            at: Utc::now(),
        });
    }

    fn schedule_dwell(&self, state: &mut ControllerState, generation: u64, deadline: Instant) {
        abort_timer(&mut state.dwell_timer);
        let controller = self.clone();
        state.dwell_timer = Some(tokio::spawn(async move {
            time::sleep_until(deadline).await;
            controller.fire_dwell(generation).await;
        }));
    }

    fn schedule_unlock(&self, state: &mut ControllerState, generation: u64, deadline: Instant) {
        abort_timer(&mut state.unlock_timer);
        let controller = self.clone();
        state.unlock_timer = Some(tokio::spawn(async move {
            time::sleep_until(deadline).await;
            controller.fire_unlock(generation).await;
        }));
    }

    async fn fire_dwell(&self, generation: u64) {
        let mut state = self.state.lock().await;
        let Some(commit) =
            state
                .session
                .dwell_elapsed(generation, Instant::now(), self.config.cooldown)
        else {
            log_debug!("stale dwell timer (generation {}) ignored", generation);
            return;
        };
        // The pending handle is this task; release it without aborting.
        state.dwell_timer.take();
        self.apply_commit(&mut state, commit);
    }

    async fn fire_unlock(&self, generation: u64) {
        let mut state = self.state.lock().await;
        let Some(target) = state.session.unlock(generation) else {
            log_debug!("stale unlock timer (generation {}) ignored", generation);
            return;
        };
        state.unlock_timer.take();
        self.sink.clear_selected(target);
        self.sink.hide_status();
        log_info!("{} unlocked; selection re-armable", target);
        self.emit(SelectionEvent::Unlocked { target_id: target });
    }

    fn emit(&self, event: SelectionEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

fn abort_timer(slot: &mut Option<JoinHandle<()>>) {
    if let Some(handle) = slot.take() {
        handle.abort();
    }
}
