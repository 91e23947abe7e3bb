//! Observable viewer settings
//!
//! [`Settings`] is a cloneable handle to one shared settings store. Values
//! can be read and written by key, loaded from and saved to JSON, and
//! observed through [`Settings::subscribe`]. A subscription stays registered
//! until its [`Subscription`] is dropped.

use crate::{ReplaySyncError, Result};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Weak};

/// Settings keys the playback core reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    /// Music volume (0.0 to 1.0)
    AudioVolume,
    /// Audio offset (milliseconds)
    AudioOffset,
    /// Drift correction on/off
    AudioAutoSyncEnabled,
    /// Drift tolerated before resync (milliseconds)
    AudioAutoSyncThresholdMs,
    /// Correction loop detection on/off
    AudioAutoSyncDetectIssue,
}

impl SettingKey {
    /// Name of the key in settings documents
    pub fn name(self) -> &'static str {
        match self {
            SettingKey::AudioVolume => "AudioVolume",
            SettingKey::AudioOffset => "AudioOffset",
            SettingKey::AudioAutoSyncEnabled => "AudioAutoSyncEnabled",
            SettingKey::AudioAutoSyncThresholdMs => "AudioAutoSyncThresholdMS",
            SettingKey::AudioAutoSyncDetectIssue => "AudioAutoSyncDetectIssue",
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single setting value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SettingValue {
    /// Numeric setting
    Number(f64),
    /// On/off setting
    Flag(bool),
}

impl SettingValue {
    /// Numeric payload, if any
    pub fn as_number(self) -> Option<f64> {
        match self {
            SettingValue::Number(value) => Some(value),
            SettingValue::Flag(_) => None,
        }
    }

    /// Boolean payload, if any
    pub fn as_flag(self) -> Option<bool> {
        match self {
            SettingValue::Flag(value) => Some(value),
            SettingValue::Number(_) => None,
        }
    }
}

impl From<f64> for SettingValue {
    fn from(value: f64) -> Self {
        SettingValue::Number(value)
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        SettingValue::Flag(value)
    }
}

/// Snapshot of all settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SettingsValues {
    /// Music volume (0.0 to 1.0)
    pub audio_volume: f64,
    /// Audio offset (milliseconds)
    pub audio_offset: f64,
    /// Drift correction on/off
    pub audio_auto_sync_enabled: bool,
    /// Drift tolerated before resync (milliseconds)
    #[serde(rename = "AudioAutoSyncThresholdMS")]
    pub audio_auto_sync_threshold_ms: f64,
    /// Correction loop detection on/off
    pub audio_auto_sync_detect_issue: bool,
}

impl Default for SettingsValues {
    fn default() -> Self {
        SettingsValues {
            audio_volume: 0.5,
            audio_offset: 0.0,
            audio_auto_sync_enabled: true,
            audio_auto_sync_threshold_ms: 50.0,
            audio_auto_sync_detect_issue: true,
        }
    }
}

impl SettingsValues {
    /// Read one value by key
    pub fn get(&self, key: SettingKey) -> SettingValue {
        match key {
            SettingKey::AudioVolume => self.audio_volume.into(),
            SettingKey::AudioOffset => self.audio_offset.into(),
            SettingKey::AudioAutoSyncEnabled => self.audio_auto_sync_enabled.into(),
            SettingKey::AudioAutoSyncThresholdMs => self.audio_auto_sync_threshold_ms.into(),
            SettingKey::AudioAutoSyncDetectIssue => self.audio_auto_sync_detect_issue.into(),
        }
    }

    /// Write one value by key, checking its kind
    pub fn set(&mut self, key: SettingKey, value: SettingValue) -> Result<()> {
        let number = || {
            value.as_number().ok_or(ReplaySyncError::SettingType {
                key,
                expected: "number",
            })
        };
        let flag = || {
            value.as_flag().ok_or(ReplaySyncError::SettingType {
                key,
                expected: "flag",
            })
        };

        match key {
            SettingKey::AudioVolume => self.audio_volume = number()?,
            SettingKey::AudioOffset => self.audio_offset = number()?,
            SettingKey::AudioAutoSyncEnabled => self.audio_auto_sync_enabled = flag()?,
            SettingKey::AudioAutoSyncThresholdMs => {
                self.audio_auto_sync_threshold_ms = number()?
            }
            SettingKey::AudioAutoSyncDetectIssue => self.audio_auto_sync_detect_issue = flag()?,
        }
        Ok(())
    }
}

type Listener = Arc<dyn Fn(SettingKey, SettingValue) + Send + Sync>;

struct Registration {
    id: u64,
    key: SettingKey,
    listener: Listener,
}

#[derive(Default)]
struct SettingsInner {
    values: SettingsValues,
    listeners: Vec<Registration>,
    next_id: u64,
}

/// Shared, observable settings store
#[derive(Clone, Default)]
pub struct Settings {
    inner: Arc<Mutex<SettingsInner>>,
}

impl Settings {
    /// Create a store holding `values`
    pub fn new(values: SettingsValues) -> Self {
        Settings {
            inner: Arc::new(Mutex::new(SettingsInner {
                values,
                ..SettingsInner::default()
            })),
        }
    }

    /// Load from a JSON document; missing keys take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let values: SettingsValues = serde_json::from_str(json)?;
        Ok(Self::new(values))
    }

    /// Save to a JSON document
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.values())?)
    }

    /// Snapshot of all values
    pub fn values(&self) -> SettingsValues {
        self.inner.lock().values
    }

    /// Read one value
    pub fn get(&self, key: SettingKey) -> SettingValue {
        self.inner.lock().values.get(key)
    }

    /// Write one value and notify the key's listeners.
    ///
    /// Listeners run after the store is unlocked and may read it.
    pub fn set(&self, key: SettingKey, value: impl Into<SettingValue>) -> Result<()> {
        let value = value.into();
        let listeners: Vec<Listener> = {
            let mut inner = self.inner.lock();
            inner.values.set(key, value)?;
            inner
                .listeners
                .iter()
                .filter(|registration| registration.key == key)
                .map(|registration| Arc::clone(&registration.listener))
                .collect()
        };

        for listener in listeners {
            listener(key, value);
        }
        Ok(())
    }

    /// Observe writes to `key` until the returned subscription is dropped
    pub fn subscribe<F>(&self, key: SettingKey, listener: F) -> Subscription
    where
        F: Fn(SettingKey, SettingValue) + Send + Sync + 'static,
    {
        let mut inner = self.inner.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.listeners.push(Registration {
            id,
            key,
            listener: Arc::new(listener),
        });

        Subscription {
            id,
            store: Arc::downgrade(&self.inner),
        }
    }

    /// Number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.inner.lock().listeners.len()
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("Settings")
            .field("values", &inner.values)
            .field("listeners", &inner.listeners.len())
            .finish()
    }
}

/// Registered settings listener; unregisters on drop
#[must_use = "dropping a Subscription unregisters its listener"]
pub struct Subscription {
    id: u64,
    store: Weak<Mutex<SettingsInner>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(store) = self.store.upgrade() {
            store
                .lock()
                .listeners
                .retain(|registration| registration.id != self.id);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
