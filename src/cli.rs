//! Command-line options for the replay binary.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::selection::InputMode;
use crate::settings::SelectionSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Gesture,
    Touch,
}

impl From<ModeArg> for InputMode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::Gesture => InputMode::Gesture,
            ModeArg::Touch => InputMode::Touch,
        }
    }
}

/// Replays a recorded classifier stream through the dwell-to-select controller.
#[derive(Debug, Parser, Clone)]
#[command(name = "gesture-select", about, version)]
pub struct Cli {
    /// JSON settings file (created by --save-settings if missing)
    #[arg(long, env = "GESTURE_SELECT_SETTINGS", value_name = "PATH")]
    pub settings: Option<PathBuf>,

    /// JSON-lines replay input; stdin when omitted
    #[arg(long, env = "GESTURE_SELECT_INPUT", value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Input path active at startup
    #[arg(long, value_enum, default_value_t = ModeArg::Gesture)]
    pub mode: ModeArg,

    /// Override the dwell time before a held gesture commits (milliseconds)
    #[arg(long = "dwell-ms")]
    pub dwell_ms: Option<u64>,

    /// Override the post-commit lockout (milliseconds)
    #[arg(long = "cooldown-ms")]
    pub cooldown_ms: Option<u64>,

    /// Disable the audio confirmation cue
    #[arg(long, default_value_t = false)]
    pub mute: bool,

    /// Write the effective settings back to --settings before replaying
    #[arg(long = "save-settings", default_value_t = false, requires = "settings")]
    pub save_settings: bool,

    /// Log per-frame readouts and timer details
    #[arg(long, short, default_value_t = false)]
    pub verbose: bool,
}

impl Cli {
    /// Folds command-line overrides into `settings`.
    pub fn apply_overrides(&self, settings: &mut SelectionSettings) {
        if let Some(dwell_ms) = self.dwell_ms {
            settings.dwell_ms = dwell_ms;
        }
        if let Some(cooldown_ms) = self.cooldown_ms {
            settings.cooldown_ms = cooldown_ms;
        }
        if self.mute {
            settings.sound.enabled = false;
        }
    }
}
