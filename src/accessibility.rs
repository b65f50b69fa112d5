use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::observers::{ObserverId, Observers};
use crate::storage::{truthy, KeyValueStore, StorageError, ACCESSIBILITY_KEY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessibilitySettings {
    pub screen_reader_mode: bool,
    pub high_contrast: bool,
    pub large_text: bool,
    pub reduce_motion: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKey {
    ScreenReaderMode,
    HighContrast,
    LargeText,
    ReduceMotion,
}

impl SettingKey {
    pub const ALL: [SettingKey; 4] = [
        SettingKey::ScreenReaderMode,
        SettingKey::HighContrast,
        SettingKey::LargeText,
        SettingKey::ReduceMotion,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SettingKey::ScreenReaderMode => "Screen Reader Mode",
            SettingKey::HighContrast => "High Contrast",
            SettingKey::LargeText => "Large Text",
            SettingKey::ReduceMotion => "Reduce Motion",
        }
    }

    /// Field name in the persisted record.
    fn record_key(&self) -> &'static str {
        match self {
            SettingKey::ScreenReaderMode => "screenReaderMode",
            SettingKey::HighContrast => "highContrast",
            SettingKey::LargeText => "largeText",
            SettingKey::ReduceMotion => "reduceMotion",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SettingKey::ScreenReaderMode => "Adds text descriptions to charts and disables animation",
            SettingKey::HighContrast => "Black, white and yellow palette",
            SettingKey::LargeText => "Scales all text by 125%",
            SettingKey::ReduceMotion => "Shows final values without transitions",
        }
    }
}

impl AccessibilitySettings {
    pub fn get(&self, key: SettingKey) -> bool {
        match key {
            SettingKey::ScreenReaderMode => self.screen_reader_mode,
            SettingKey::HighContrast => self.high_contrast,
            SettingKey::LargeText => self.large_text,
            SettingKey::ReduceMotion => self.reduce_motion,
        }
    }

    fn set(&mut self, key: SettingKey, value: bool) {
        match key {
            SettingKey::ScreenReaderMode => self.screen_reader_mode = value,
            SettingKey::HighContrast => self.high_contrast = value,
            SettingKey::LargeText => self.large_text = value,
            SettingKey::ReduceMotion => self.reduce_motion = value,
        }
    }
}

/// What the shell actually applies. Screen-reader mode implies reduced motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PresentationFlags {
    pub high_contrast: bool,
    pub large_text: bool,
    pub screen_reader: bool,
    pub reduce_motion: bool,
}

impl PresentationFlags {
    pub fn class_names(&self) -> Vec<&'static str> {
        [
            (self.high_contrast, "a11y-high-contrast"),
            (self.large_text, "a11y-large-text"),
            (self.screen_reader, "a11y-screen-reader"),
            (self.reduce_motion, "a11y-reduce-motion"),
        ]
        .into_iter()
        .filter_map(|(on, name)| on.then_some(name))
        .collect()
    }

    /// Multiplier applied to every text size.
    pub fn text_scale(&self) -> f32 {
        if self.large_text {
            1.25
        } else {
            1.0
        }
    }
}

pub fn presentation_flags(settings: &AccessibilitySettings) -> PresentationFlags {
    PresentationFlags {
        high_contrast: settings.high_contrast,
        large_text: settings.large_text,
        screen_reader: settings.screen_reader_mode,
        reduce_motion: settings.reduce_motion || settings.screen_reader_mode,
    }
}

pub struct AccessibilityStore {
    settings: AccessibilitySettings,
    storage: Arc<dyn KeyValueStore>,
    observers: Observers<AccessibilitySettings>,
}

impl std::fmt::Debug for AccessibilityStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessibilityStore")
            .field("settings", &self.settings)
            .field("observers", &self.observers)
            .finish()
    }
}

impl AccessibilityStore {
    /// Load persisted settings. Any failure leaves the defaults in place.
    pub fn load(storage: Arc<dyn KeyValueStore>) -> Self {
        let settings = match read_settings(storage.as_ref()) {
            Ok(Some(settings)) => settings,
            Ok(None) => AccessibilitySettings::default(),
            Err(e) => {
                tracing::warn!("Failed to load accessibility settings: {e}");
                AccessibilitySettings::default()
            }
        };
        Self {
            settings,
            storage,
            observers: Observers::default(),
        }
    }

    pub fn settings(&self) -> AccessibilitySettings {
        self.settings
    }

    pub fn flags(&self) -> PresentationFlags {
        presentation_flags(&self.settings)
    }

    /// Animated views render their final state when this is set.
    pub fn disable_motion(&self) -> bool {
        self.flags().reduce_motion
    }

    pub fn update_setting(&mut self, key: SettingKey, value: bool) {
        self.settings.set(key, value);
        self.commit();
    }

    pub fn reset_settings(&mut self) {
        self.settings = AccessibilitySettings::default();
        self.commit();
    }

    pub fn subscribe(&mut self, callback: impl Fn(&AccessibilitySettings) + Send + 'static) -> ObserverId {
        self.observers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.observers.unsubscribe(id)
    }

    fn commit(&self) {
        if let Err(e) = write_settings(self.storage.as_ref(), &self.settings) {
            tracing::warn!("Failed to save accessibility settings: {e}");
        }
        self.observers.notify(&self.settings);
    }
}

/// Shallow merge over the defaults. A present key takes the truthiness of its
/// value; a missing key keeps the default. A non-object record merges nothing.
fn read_settings(storage: &dyn KeyValueStore) -> Result<Option<AccessibilitySettings>, StorageError> {
    let Some(raw) = storage.get(ACCESSIBILITY_KEY)? else {
        return Ok(None);
    };
    let value: Value =
        serde_json::from_str(&raw).map_err(|e| StorageError::Read(format!("invalid accessibility record: {e}")))?;
    let mut settings = AccessibilitySettings::default();
    if let Some(record) = value.as_object() {
        for key in SettingKey::ALL {
            if let Some(v) = record.get(key.record_key()) {
                settings.set(key, truthy(Some(v)));
            }
        }
    }
    Ok(Some(settings))
}

fn write_settings(storage: &dyn KeyValueStore, settings: &AccessibilitySettings) -> Result<(), StorageError> {
    let json = serde_json::to_string(settings).map_err(|e| StorageError::Serialize(e.to_string()))?;
    storage.set(ACCESSIBILITY_KEY, &json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_defaults_all_false() {
        let store = AccessibilityStore::load(Arc::new(MemoryStorage::new()));
        assert_eq!(store.settings(), AccessibilitySettings::default());
        assert!(store.flags().class_names().is_empty());
        assert!(!store.disable_motion());
    }

    #[test]
    fn test_partial_record_fills_defaults() {
        let storage = MemoryStorage::new().with_entry(ACCESSIBILITY_KEY, r#"{"largeText":true}"#);
        let store = AccessibilityStore::load(Arc::new(storage));
        assert!(store.settings().large_text);
        assert!(!store.settings().high_contrast);
    }

    #[test]
    fn test_loose_values_merge_by_truthiness() {
        let storage =
            MemoryStorage::new().with_entry(ACCESSIBILITY_KEY, r#"{"largeText":true,"highContrast":null}"#);
        let settings = AccessibilityStore::load(Arc::new(storage)).settings();
        assert!(settings.large_text);
        assert!(!settings.high_contrast);

        let storage = MemoryStorage::new().with_entry(
            ACCESSIBILITY_KEY,
            r#"{"largeText":true,"reduceMotion":1,"screenReaderMode":"yes","highContrast":0,"extra":[]}"#,
        );
        let store = AccessibilityStore::load(Arc::new(storage));
        let settings = store.settings();
        assert!(settings.large_text);
        assert!(settings.reduce_motion);
        assert!(settings.screen_reader_mode);
        assert!(!settings.high_contrast);
        assert_eq!(store.flags().text_scale(), 1.25);
    }

    #[test]
    fn test_non_object_record_keeps_defaults() {
        for raw in ["[true]", "42", "null"] {
            let storage = MemoryStorage::new().with_entry(ACCESSIBILITY_KEY, raw);
            assert_eq!(
                AccessibilityStore::load(Arc::new(storage)).settings(),
                AccessibilitySettings::default()
            );
        }
    }

    #[test]
    fn test_corrupt_record_and_broken_storage_use_defaults() {
        let corrupt = MemoryStorage::new().with_entry(ACCESSIBILITY_KEY, "{not json");
        assert_eq!(
            AccessibilityStore::load(Arc::new(corrupt)).settings(),
            AccessibilitySettings::default()
        );
        let mut store = AccessibilityStore::load(Arc::new(MemoryStorage::disabled()));
        // Writes fail silently; in-memory state still changes.
        store.update_setting(SettingKey::HighContrast, true);
        assert!(store.settings().high_contrast);
    }

    #[test]
    fn test_update_persists_full_record() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = AccessibilityStore::load(storage.clone());
        store.update_setting(SettingKey::ReduceMotion, true);
        let raw = storage.get(ACCESSIBILITY_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["reduceMotion"], true);
        assert_eq!(value["screenReaderMode"], false);
        assert_eq!(value.as_object().unwrap().len(), 4);

        let reloaded = AccessibilityStore::load(storage.clone());
        assert!(reloaded.settings().reduce_motion);

        store.reset_settings();
        assert_eq!(
            AccessibilityStore::load(storage).settings(),
            AccessibilitySettings::default()
        );
    }

    #[test]
    fn test_screen_reader_implies_reduced_motion() {
        let settings = AccessibilitySettings {
            screen_reader_mode: true,
            ..Default::default()
        };
        let flags = presentation_flags(&settings);
        assert!(flags.reduce_motion);
        assert_eq!(flags.class_names(), vec!["a11y-screen-reader", "a11y-reduce-motion"]);
    }

    #[test]
    fn test_observers_notified_on_change() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut store = AccessibilityStore::load(Arc::new(MemoryStorage::new()));
        let h = hits.clone();
        let id = store.subscribe(move |s| {
            if s.large_text {
                h.fetch_add(1, Ordering::SeqCst);
            }
        });
        store.update_setting(SettingKey::LargeText, true);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(store.unsubscribe(id));
        store.update_setting(SettingKey::LargeText, true);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(store.flags().text_scale(), 1.25);
    }
}
