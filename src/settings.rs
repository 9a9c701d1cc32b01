use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs,
    path::PathBuf,
    sync::{PoisonError, RwLock},
    time::Duration,
};

use crate::{
    gesture::TargetId,
    selection::{
        config::{DEFAULT_COOLDOWN_MS, DEFAULT_DWELL_MS, DEFAULT_HAPTIC_MS},
        SelectionConfig,
    },
};

const ENABLE_LOGS: bool = true;

use crate::log_warn;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SoundSettings {
    pub enabled: bool,
    pub volume: f32,
}

impl Default for SoundSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            volume: 0.8,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SelectionSettings {
    pub dwell_ms: u64,
    pub cooldown_ms: u64,
    pub haptic_ms: u64,
    /// Top classifier entries below this score count as "no gesture".
    pub min_confidence: f32,
    pub sound: SoundSettings,
    pub labels: BTreeMap<TargetId, String>,
}

impl Default for SelectionSettings {
    fn default() -> Self {
        Self {
            dwell_ms: DEFAULT_DWELL_MS,
            cooldown_ms: DEFAULT_COOLDOWN_MS,
            haptic_ms: DEFAULT_HAPTIC_MS,
            min_confidence: 0.0,
            sound: SoundSettings::default(),
            labels: BTreeMap::new(),
        }
    }
}

impl SelectionSettings {
    pub fn validate(&self) -> Result<()> {
        if self.dwell_ms == 0 {
            bail!("dwellMs must be greater than zero");
        }
        if self.cooldown_ms == 0 {
            bail!("cooldownMs must be greater than zero");
        }
        if !(0.0..=1.0).contains(&self.min_confidence) {
            bail!("minConfidence must be within 0..=1, got {}", self.min_confidence);
        }
        if !(0.0..=1.0).contains(&self.sound.volume) {
            bail!("sound.volume must be within 0..=1, got {}", self.sound.volume);
        }
        Ok(())
    }

    pub fn selection_config(&self) -> SelectionConfig {
        SelectionConfig {
            dwell: Duration::from_millis(self.dwell_ms),
            cooldown: Duration::from_millis(self.cooldown_ms),
            haptic: Duration::from_millis(self.haptic_ms),
            labels: self.labels.clone(),
        }
    }
}

/// JSON-backed settings. A store without a path lives in memory only.
pub struct SettingsStore {
    path: Option<PathBuf>,
    data: RwLock<SelectionSettings>,
}

impl SettingsStore {
    pub fn new(path: Option<PathBuf>) -> Result<Self> {
        let data = match &path {
            Some(path) if path.exists() => {
                let contents = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read settings from {}", path.display()))?;
                serde_json::from_str(&contents).unwrap_or_else(|err| {
                    log_warn!(
                        "settings at {} are not valid JSON ({}); using defaults",
                        path.display(),
                        err
                    );
                    SelectionSettings::default()
                })
            }
            _ => SelectionSettings::default(),
        };

        data.validate()
            .context("invalid selection settings")?;

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn get(&self) -> SelectionSettings {
        self.data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Applies `change` and validates the result in memory. Call
    /// [`SettingsStore::persist`] to write it out. The stored value is left
    /// untouched when validation fails.
    pub fn update(&self, change: impl FnOnce(&mut SelectionSettings)) -> Result<SelectionSettings> {
        let mut guard = self.data.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = guard.clone();
        change(&mut next);
        next.validate().context("rejected settings update")?;
        *guard = next.clone();
        Ok(next)
    }

    pub fn persist(&self) -> Result<()> {
        let Some(path) = &self.path else {
            bail!("no settings path configured");
        };
        let serialized = serde_json::to_string_pretty(&self.get())?;
        fs::write(path, serialized)
            .with_context(|| format!("Failed to write settings to {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_path() -> PathBuf {
        std::env::temp_dir().join(format!("gesture-select-{}.json", Uuid::new_v4()))
    }

    #[test]
    fn missing_file_yields_defaults() {
        let store = SettingsStore::new(Some(temp_path())).unwrap();
        let settings = store.get();
        assert_eq!(settings.dwell_ms, 2500);
        assert_eq!(settings.cooldown_ms, 2000);
        assert_eq!(settings.haptic_ms, 100);
        assert!(settings.sound.enabled);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let path = temp_path();
        fs::write(
            &path,
            r#"{"dwellMs": 1200, "labels": {"target2": "Water"}, "sound": {"volume": 0.3}}"#,
        )
        .unwrap();

        let settings = SettingsStore::new(Some(path.clone())).unwrap().get();
        assert_eq!(settings.dwell_ms, 1200);
        assert_eq!(settings.cooldown_ms, 2000);
        assert!(settings.sound.enabled);
        assert!((settings.sound.volume - 0.3).abs() < f32::EPSILON);

        let config = settings.selection_config();
        assert_eq!(config.dwell, Duration::from_millis(1200));
        assert_eq!(config.label_for(TargetId::new(2).unwrap()), "Water");
        assert_eq!(config.label_for(TargetId::new(4).unwrap()), "Thumb Up 👍");

        fs::remove_file(path).ok();
    }

    #[test]
    fn garbage_file_falls_back_to_defaults() {
        let path = temp_path();
        fs::write(&path, "not json at all").unwrap();
        let settings = SettingsStore::new(Some(path.clone())).unwrap().get();
        assert_eq!(settings, SelectionSettings::default());
        fs::remove_file(path).ok();
    }

    #[test]
    fn zero_dwell_is_rejected() {
        let path = temp_path();
        fs::write(&path, r#"{"dwellMs": 0}"#).unwrap();
        assert!(SettingsStore::new(Some(path.clone())).is_err());
        fs::remove_file(path).ok();
    }

    #[test]
    fn update_validates_and_persists() {
        let path = temp_path();
        let store = SettingsStore::new(Some(path.clone())).unwrap();

        assert!(store.update(|s| s.cooldown_ms = 0).is_err());
        assert_eq!(store.get().cooldown_ms, 2000);

        store.update(|s| s.cooldown_ms = 1500).unwrap();
        assert!(!path.exists());
        store.persist().unwrap();

        let reloaded = SettingsStore::new(Some(path.clone())).unwrap().get();
        assert_eq!(reloaded.cooldown_ms, 1500);
        fs::remove_file(path).ok();
    }

    #[test]
    fn in_memory_store_cannot_persist() {
        let store = SettingsStore::new(None).unwrap();
        assert!(store.persist().is_err());
    }
}
