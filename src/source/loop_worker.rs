use anyhow::{Context, Result};
use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::time::{self, Duration, Instant};
use tokio_util::sync::CancellationToken;

use crate::{
    gesture::{ClassifierAdapter, TargetId},
    selection::{InputMode, SelectionController},
};

use super::record::{classifier_frame, malformed_frame_at, parse_line, ReplayRecord};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info, log_warn};

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReplayReport {
    pub frames: u64,
    pub touches: u64,
    pub mode_changes: u64,
    /// Frames delivered while touch mode was active.
    pub dropped_frames: u64,
    /// Touches delivered while gesture mode was active.
    pub dropped_touches: u64,
    pub unknown_targets: u64,
    pub malformed_lines: u64,
    pub cancelled: bool,
}

/// Delivers each record at its `atMs` offset from the start of the replay,
/// then waits `linger` so a trailing dwell and cooldown can finish.
/// Records whose offset already passed are delivered at once, in file order.
/// A `frame` line with an unreadable classifier payload is delivered as a
/// no-hand frame so it cancels any arm in progress.
pub async fn replay_loop<R>(
    reader: R,
    controller: SelectionController,
    adapter: ClassifierAdapter,
    linger: Duration,
    cancel_token: CancellationToken,
) -> Result<ReplayReport>
where
    R: AsyncBufRead + Unpin,
{
    let start = Instant::now();
    let mut lines = reader.lines();
    let mut report = ReplayReport::default();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("failed to read replay input")?,
            _ = cancel_token.cancelled() => {
                log_info!("replay cancelled while reading");
                report.cancelled = true;
                return Ok(report);
            }
        };
        let Some(line) = line else {
            break;
        };

        let record = match parse_line(&line) {
            Ok(Some(record)) => record,
            Ok(None) => continue,
            Err(err) => {
                report.malformed_lines += 1;
                log_warn!("{:#}", err);
                // A frame that arrived but can't be read still means no pose.
                match malformed_frame_at(&line) {
                    Some(at_ms) => ReplayRecord::dropout(at_ms),
                    None => continue,
                }
            }
        };

        let due = start + Duration::from_millis(record.at_ms());
        tokio::select! {
            _ = time::sleep_until(due) => {
                dispatch(record, &controller, &adapter, &mut report).await;
                // Overdue records never suspend; let event subscribers drain.
                tokio::task::yield_now().await;
            }
            _ = cancel_token.cancelled() => {
                log_info!("replay cancelled at {}ms", start.elapsed().as_millis());
                report.cancelled = true;
                return Ok(report);
            }
        }
    }

    log_debug!("replay input exhausted; lingering {}ms", linger.as_millis());
    tokio::select! {
        _ = time::sleep(linger) => {}
        _ = cancel_token.cancelled() => {
            report.cancelled = true;
        }
    }
    Ok(report)
}

async fn dispatch(
    record: ReplayRecord,
    controller: &SelectionController,
    adapter: &ClassifierAdapter,
    report: &mut ReplayReport,
) {
    match record {
        ReplayRecord::Frame {
            gestures,
            hand_present,
            ..
        } => {
            report.frames += 1;
            if controller.mode().await != InputMode::Gesture {
                report.dropped_frames += 1;
                return;
            }
            let frame = classifier_frame(gestures, hand_present);
            let observation = adapter.normalize(&frame, Instant::now());
            controller.on_observation(observation).await;
        }
        ReplayRecord::Touch { target, .. } => {
            report.touches += 1;
            let target = match target.parse::<TargetId>() {
                Ok(target) => target,
                Err(err) => {
                    report.unknown_targets += 1;
                    log_warn!("touch ignored: {}", err);
                    return;
                }
            };
            if controller.mode().await != InputMode::Touch {
                report.dropped_touches += 1;
                log_debug!("touch on {} ignored outside touch mode", target);
                return;
            }
            controller.on_direct_trigger(target).await;
        }
        ReplayRecord::Mode { mode, .. } => {
            report.mode_changes += 1;
            controller.set_mode(mode).await;
        }
    }
}
