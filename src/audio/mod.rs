mod output;
#[cfg(feature = "sound")]
pub mod ping;

use std::sync::{
    mpsc::{self, Sender},
    Arc, Mutex,
};
use std::thread;

enum AudioCommand {
    Ping { volume: f32 },
    Stop,
}

/// Handle to the lazily spawned `audio-cue` thread. Cheap to clone; all
/// clones feed the same thread.
#[derive(Clone)]
pub struct AudioEngineHandle {
    tx: Arc<Mutex<Option<Sender<AudioCommand>>>>,
}

impl Default for AudioEngineHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioEngineHandle {
    pub fn new() -> Self {
        Self {
            tx: Arc::new(Mutex::new(None)),
        }
    }

    fn ensure_thread(&self) -> Result<Sender<AudioCommand>, String> {
        if let Some(tx) = self.tx.lock().map_err(|e| e.to_string())?.as_ref() {
            return Ok(tx.clone());
        }

        let (tx, rx) = mpsc::channel::<AudioCommand>();

        // Dedicated thread holding the non-Send audio objects
        thread::Builder::new()
            .name("audio-cue".to_string())
            .spawn(move || output::run(rx))
            .map_err(|e| e.to_string())?;

        let tx_clone = tx.clone();
        *self.tx.lock().map_err(|e| e.to_string())? = Some(tx);
        Ok(tx_clone)
    }

    /// Queues the confirmation ping. Returns once the command is handed to
    /// the audio thread, not when playback ends.
    pub fn play_ping(&self, volume: f32) -> Result<(), String> {
        let tx = self.ensure_thread()?;
        tx.send(AudioCommand::Ping { volume })
            .map_err(|e| format!("audio thread gone: {e}"))
    }

    /// Asks the audio thread to wind down. A handle that never played is a
    /// no-op; a thread that already exited is reported.
    pub fn stop(&self) -> Result<(), String> {
        let tx = self.tx.lock().map_err(|e| e.to_string())?.take();
        match tx {
            Some(tx) => tx
                .send(AudioCommand::Stop)
                .map_err(|e| format!("audio thread gone: {e}")),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ping_reaches_the_audio_thread() {
        let audio = AudioEngineHandle::new();
        assert!(audio.play_ping(0.5).is_ok());
        // The second call reuses the running thread.
        assert!(audio.clone().play_ping(0.5).is_ok());
        assert!(audio.stop().is_ok());
    }

    #[test]
    fn stop_without_playback_is_a_noop() {
        let audio = AudioEngineHandle::new();
        assert!(audio.stop().is_ok());
        assert!(audio.stop().is_ok());
    }
}
