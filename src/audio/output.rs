use std::sync::mpsc::Receiver;

use super::AudioCommand;

const ENABLE_LOGS: bool = true;

#[allow(unused_imports)]
use crate::{log_debug, log_warn};

/// Body of the `audio-cue` thread. Owns the non-Send rodio objects.
#[cfg(feature = "sound")]
pub(super) fn run(rx: Receiver<AudioCommand>) {
    use super::ping::PingTone;
    use rodio::{OutputStream, Sink};

    let mut _stream: Option<OutputStream> = None;
    let mut sink: Option<Sink> = None;

    fn ensure_sink(stream: &mut Option<OutputStream>, sink: &mut Option<Sink>) -> Result<(), String> {
        if sink.is_none() {
            let (s, handle) = OutputStream::try_default()
                .map_err(|e| format!("Failed to create audio output stream: {}", e))?;
            let new_sink =
                Sink::try_new(&handle).map_err(|e| format!("Failed to create audio sink: {}", e))?;
            *stream = Some(s);
            *sink = Some(new_sink);
        }
        Ok(())
    }

    while let Ok(cmd) = rx.recv() {
        match cmd {
            AudioCommand::Ping { volume } => {
                if let Err(err) = ensure_sink(&mut _stream, &mut sink) {
                    log_warn!("confirmation ping dropped: {}", err);
                    continue;
                }
                if let Some(ref s) = sink {
                    s.append(PingTone::new(volume));
                }
            }
            AudioCommand::Stop => {
                if let Some(s_old) = sink.take() {
                    s_old.stop();
                }
                _stream = None;
            }
        }
    }
}

/// Without the `sound` feature the thread only acknowledges commands.
#[cfg(not(feature = "sound"))]
pub(super) fn run(rx: Receiver<AudioCommand>) {
    while let Ok(cmd) = rx.recv() {
        match cmd {
            AudioCommand::Ping { volume } => {
                log_debug!("ping (volume {:.2}) skipped: built without `sound`", volume);
            }
            AudioCommand::Stop => {}
        }
    }
}
