//! Research instrumentation: a capped in-memory event log plus the two
//! persisted switches that control observation annotations and passive
//! interaction capture.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::observers::{ObserverId, Observers};
use crate::ringbuf::RingBuffer;
use crate::storage::{truthy, KeyValueStore, StorageError, RESEARCH_KEY};

pub const EVENT_LOG_CAPACITY: usize = 50;
pub const OBSERVATION_CLASS: &str = "observation-mode";

const MAX_LABEL_CHARS: usize = 40;
const TRUNCATED_LABEL_CHARS: usize = 37;

pub type Metadata = Map<String, Value>;

// ─── EVENTS ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Interaction,
    Feedback,
    System,
}

impl EventKind {
    pub fn label(&self) -> &'static str {
        match self {
            EventKind::Interaction => "interaction",
            EventKind::Feedback => "feedback",
            EventKind::System => "system",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResearchEvent {
    pub id: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    #[serde(rename = "type")]
    pub kind: EventKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

/// An event before the store stamps it with an id and timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub kind: EventKind,
    pub scope: Option<String>,
    pub action: Option<String>,
    pub metadata: Option<Metadata>,
}

impl NewEvent {
    pub fn new(kind: EventKind, scope: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            kind,
            scope: Some(scope.into()),
            action: Some(action.into()),
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

fn object(value: Value) -> Metadata {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

// ─── ELEMENT LABELS ─────────────────────────────────────────────

/// Description of the widget an interaction landed on.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ElementInfo {
    pub observation_label: Option<String>,
    pub aria_label: Option<String>,
    pub aria_labelledby: Option<String>,
    pub text: Option<String>,
    pub tag_name: String,
}

impl ElementInfo {
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            ..Default::default()
        }
    }

    pub fn observation_label(mut self, label: impl Into<String>) -> Self {
        self.observation_label = Some(label.into());
        self
    }

    pub fn aria_label(mut self, label: impl Into<String>) -> Self {
        self.aria_label = Some(label.into());
        self
    }

    pub fn aria_labelledby(mut self, id: impl Into<String>) -> Self {
        self.aria_labelledby = Some(id.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Human-readable label for an interaction target.
pub fn element_label(target: Option<&ElementInfo>) -> String {
    let Some(target) = target else {
        return "unknown".to_string();
    };

    if let Some(label) = non_empty(&target.observation_label)
        .or_else(|| non_empty(&target.aria_label))
        .or_else(|| non_empty(&target.aria_labelledby))
    {
        return label.to_string();
    }

    if let Some(text) = target.text.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        return if text.chars().count() > MAX_LABEL_CHARS {
            let head: String = text.chars().take(TRUNCATED_LABEL_CHARS).collect();
            format!("{head}...")
        } else {
            text.to_string()
        };
    }

    if !target.tag_name.is_empty() {
        return target.tag_name.to_lowercase();
    }
    "unknown".to_string()
}

/// Interactions observed while passive logging is on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GlobalEvent {
    Click(Option<ElementInfo>),
    Focus(Option<ElementInfo>),
    KeyDown(String),
}

// ─── PREFERENCES ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchPrefs {
    pub observation_mode: bool,
    pub event_logging_enabled: bool,
}

impl ResearchPrefs {
    /// Lenient parse: any truthy JSON value turns a flag on.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(raw)?;
        Ok(Self {
            observation_mode: truthy(value.get("observationMode")),
            event_logging_enabled: truthy(value.get("eventLoggingEnabled")),
        })
    }
}

// ─── STORE ──────────────────────────────────────────────────────

pub struct ResearchStore {
    prefs: ResearchPrefs,
    log: RingBuffer<ResearchEvent>,
    storage: Arc<dyn KeyValueStore>,
    observers: Observers<ResearchPrefs>,
}

impl std::fmt::Debug for ResearchStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResearchStore")
            .field("prefs", &self.prefs)
            .field("events", &self.log.len())
            .finish()
    }
}

impl ResearchStore {
    pub fn load(storage: Arc<dyn KeyValueStore>) -> Self {
        let prefs = match read_prefs(storage.as_ref()) {
            Ok(prefs) => prefs.unwrap_or_default(),
            Err(e) => {
                tracing::warn!("Failed to load research preferences: {e}");
                ResearchPrefs::default()
            }
        };
        Self {
            prefs,
            log: RingBuffer::new(EVENT_LOG_CAPACITY),
            storage,
            observers: Observers::default(),
        }
    }

    #[cfg(test)]
    pub fn prefs(&self) -> ResearchPrefs {
        self.prefs
    }

    pub fn observation_mode(&self) -> bool {
        self.prefs.observation_mode
    }

    pub fn event_logging_enabled(&self) -> bool {
        self.prefs.event_logging_enabled
    }

    /// Newest first.
    pub fn events(&self) -> impl Iterator<Item = &ResearchEvent> {
        self.log.iter()
    }

    pub fn event_count(&self) -> usize {
        self.log.len()
    }

    /// Global listeners must be attached exactly while this holds.
    pub fn listening(&self) -> bool {
        self.prefs.event_logging_enabled
    }

    pub fn presentation_class(&self) -> Option<&'static str> {
        self.prefs.observation_mode.then_some(OBSERVATION_CLASS)
    }

    pub fn log_event(&mut self, event: NewEvent) {
        let event = ResearchEvent {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: chrono::Utc::now().timestamp_millis(),
            kind: event.kind,
            scope: event.scope,
            action: event.action,
            metadata: event.metadata,
        };

        if self.prefs.event_logging_enabled {
            match serde_json::to_string(&event) {
                Ok(json) => tracing::debug!(target: "chargesense::research", "{json}"),
                Err(e) => tracing::debug!(target: "chargesense::research", "unserializable event: {e}"),
            }
        }

        self.log.push(event);
    }

    /// Flip the flag, or force it when `value` is given.
    pub fn toggle_observation_mode(&mut self, value: Option<bool>) {
        let next = value.unwrap_or(!self.prefs.observation_mode);
        self.log_event(system_event(
            if next { "observation_mode_enabled" } else { "observation_mode_disabled" },
            next,
        ));
        self.prefs.observation_mode = next;
        self.commit();
    }

    pub fn set_event_logging_enabled(&mut self, value: bool) {
        self.log_event(system_event(
            if value { "event_logging_enabled" } else { "event_logging_disabled" },
            value,
        ));
        self.prefs.event_logging_enabled = value;
        self.commit();
    }

    pub fn clear_event_log(&mut self) {
        self.log.clear();
    }

    /// Record a passive interaction. No-op unless logging is enabled.
    pub fn handle_global_event(&mut self, event: GlobalEvent) {
        if !self.prefs.event_logging_enabled {
            return;
        }
        let (action, metadata) = match event {
            GlobalEvent::Click(target) => ("click", target_metadata(target.as_ref())),
            GlobalEvent::Focus(target) => ("focus", target_metadata(target.as_ref())),
            GlobalEvent::KeyDown(key) => {
                if key == "Shift" || key == "Tab" {
                    return;
                }
                ("key_down", object(json!({ "key": key })))
            }
        };
        self.log_event(NewEvent::new(EventKind::Interaction, "global", action).with_metadata(metadata));
    }

    pub fn log_interaction(&mut self, scope: &str, action: &str, metadata: Option<Metadata>) {
        self.log_event(NewEvent {
            kind: EventKind::Interaction,
            scope: Some(scope.to_string()),
            action: Some(action.to_string()),
            metadata,
        });
    }

    /// A `feedback` event; `value` is merged ahead of the extra metadata.
    pub fn record_feedback(&mut self, scope: &str, value: &str, metadata: Metadata) {
        let mut merged = Map::new();
        merged.insert("value".to_string(), Value::String(value.to_string()));
        merged.extend(metadata);
        self.log_event(NewEvent::new(EventKind::Feedback, scope, "inline-feedback").with_metadata(merged));
    }

    pub fn subscribe(&mut self, callback: impl Fn(&ResearchPrefs) + Send + 'static) -> ObserverId {
        self.observers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.observers.unsubscribe(id)
    }

    fn commit(&self) {
        if let Err(e) = write_prefs(self.storage.as_ref(), &self.prefs) {
            tracing::warn!("Failed to store research preferences: {e}");
        }
        self.observers.notify(&self.prefs);
    }
}

fn system_event(action: &str, next_value: bool) -> NewEvent {
    NewEvent::new(EventKind::System, "research", action).with_metadata(object(json!({ "nextValue": next_value })))
}

fn target_metadata(target: Option<&ElementInfo>) -> Metadata {
    let mut metadata = Map::new();
    metadata.insert("label".to_string(), Value::String(element_label(target)));
    if let Some(t) = target {
        metadata.insert("tagName".to_string(), Value::String(t.tag_name.to_lowercase()));
    }
    metadata
}

fn read_prefs(storage: &dyn KeyValueStore) -> Result<Option<ResearchPrefs>, StorageError> {
    match storage.get(RESEARCH_KEY)? {
        Some(raw) if !raw.is_empty() => ResearchPrefs::from_json(&raw)
            .map(Some)
            .map_err(|e| StorageError::Read(format!("invalid research record: {e}"))),
        _ => Ok(None),
    }
}

fn write_prefs(storage: &dyn KeyValueStore, prefs: &ResearchPrefs) -> Result<(), StorageError> {
    let json = serde_json::to_string(prefs).map_err(|e| StorageError::Serialize(e.to_string()))?;
    storage.set(RESEARCH_KEY, &json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn store() -> ResearchStore {
        ResearchStore::load(Arc::new(MemoryStorage::new()))
    }

    #[test]
    fn test_log_keeps_fifty_newest_first() {
        let mut s = store();
        for i in 0..55 {
            s.log_event(NewEvent::new(EventKind::Interaction, "test", format!("e{i}")));
        }
        assert_eq!(s.event_count(), 50);
        let actions: Vec<_> = s.events().map(|e| e.action.clone().unwrap()).collect();
        assert_eq!(actions.first().map(String::as_str), Some("e54"));
        assert_eq!(actions.last().map(String::as_str), Some("e5"));
    }

    #[test]
    fn test_ids_are_unique() {
        let mut s = store();
        s.log_event(NewEvent::new(EventKind::System, "x", "a"));
        s.log_event(NewEvent::new(EventKind::System, "x", "b"));
        let ids: Vec<_> = s.events().map(|e| e.id.clone()).collect();
        assert_ne!(ids[0], ids[1]);
        assert!(s.events().all(|e| e.timestamp > 0));
    }

    #[test]
    fn test_clear_records_nothing() {
        let mut s = store();
        s.log_event(NewEvent::new(EventKind::System, "x", "a"));
        s.clear_event_log();
        assert_eq!(s.event_count(), 0);
    }

    #[test]
    fn test_toggle_observation_records_transition() {
        let mut s = store();
        s.toggle_observation_mode(None);
        assert!(s.observation_mode());
        assert_eq!(s.presentation_class(), Some("observation-mode"));
        let e = s.events().next().unwrap();
        assert_eq!(e.kind, EventKind::System);
        assert_eq!(e.scope.as_deref(), Some("research"));
        assert_eq!(e.action.as_deref(), Some("observation_mode_enabled"));
        assert_eq!(e.metadata.as_ref().unwrap()["nextValue"], true);

        s.toggle_observation_mode(Some(false));
        assert_eq!(s.event_count(), 2);
        assert_eq!(s.events().next().unwrap().metadata.as_ref().unwrap()["nextValue"], false);
        assert_eq!(s.presentation_class(), None);
    }

    #[test]
    fn test_global_events_need_logging_enabled() {
        let mut s = store();
        s.handle_global_event(GlobalEvent::Click(None));
        assert_eq!(s.event_count(), 0);
        assert!(!s.listening());

        s.set_event_logging_enabled(true);
        assert!(s.listening());
        assert_eq!(s.event_count(), 1);
        s.handle_global_event(GlobalEvent::KeyDown("Shift".into()));
        s.handle_global_event(GlobalEvent::KeyDown("Tab".into()));
        assert_eq!(s.event_count(), 1);
        s.handle_global_event(GlobalEvent::KeyDown("a".into()));
        let e = s.events().next().unwrap();
        assert_eq!(e.action.as_deref(), Some("key_down"));
        assert_eq!(e.metadata.as_ref().unwrap()["key"], "a");
    }

    #[test]
    fn test_click_with_observation_label() {
        let mut s = store();
        s.set_event_logging_enabled(true);
        let before = s.event_count();
        s.handle_global_event(GlobalEvent::Click(Some(
            ElementInfo::new("BUTTON").observation_label("feedback-useful-abc").text("Yes"),
        )));
        assert_eq!(s.event_count(), before + 1);
        let e = s.events().next().unwrap();
        assert_eq!(e.kind, EventKind::Interaction);
        assert_eq!(e.scope.as_deref(), Some("global"));
        assert_eq!(e.action.as_deref(), Some("click"));
        let meta = e.metadata.as_ref().unwrap();
        assert_eq!(meta["label"], "feedback-useful-abc");
        assert_eq!(meta["tagName"], "button");
    }

    #[test]
    fn test_element_label_priority() {
        assert_eq!(element_label(None), "unknown");
        let el = ElementInfo::new("DIV").aria_label("Close").text("x");
        assert_eq!(element_label(Some(&el)), "Close");
        let el = ElementInfo::new("DIV").observation_label("").aria_labelledby("title-id");
        assert_eq!(element_label(Some(&el)), "title-id");
        let el = ElementInfo::new("SPAN").text("   ");
        assert_eq!(element_label(Some(&el)), "span");
        assert_eq!(element_label(Some(&ElementInfo::new(""))), "unknown");
    }

    #[test]
    fn test_element_label_truncation() {
        let exact = "a".repeat(40);
        assert_eq!(element_label(Some(&ElementInfo::new("p").text(exact.clone()))), exact);
        let long = format!("  {}  ", "b".repeat(41));
        let label = element_label(Some(&ElementInfo::new("p").text(long)));
        assert_eq!(label, format!("{}...", "b".repeat(37)));
        assert_eq!(label.chars().count(), 40);
    }

    #[test]
    fn test_feedback_merges_value() {
        let mut s = store();
        s.record_feedback("rec:1", "useful", object(json!({ "entityId": "1", "type": "quick-response" })));
        let e = s.events().next().unwrap();
        assert_eq!(e.kind, EventKind::Feedback);
        assert_eq!(e.action.as_deref(), Some("inline-feedback"));
        let meta = e.metadata.as_ref().unwrap();
        assert_eq!(meta["value"], "useful");
        assert_eq!(meta["entityId"], "1");

        s.log_interaction("share", "open", None);
        assert_eq!(s.events().next().unwrap().kind, EventKind::Interaction);
    }

    #[test]
    fn test_prefs_truthiness() {
        let p = ResearchPrefs::from_json(r#"{"observationMode":1,"eventLoggingEnabled":""}"#).unwrap();
        assert!(p.observation_mode);
        assert!(!p.event_logging_enabled);
        let p = ResearchPrefs::from_json(r#"{"observationMode":"yes","eventLoggingEnabled":{}}"#).unwrap();
        assert!(p.observation_mode && p.event_logging_enabled);
        assert_eq!(ResearchPrefs::from_json("42").unwrap(), ResearchPrefs::default());
        assert!(ResearchPrefs::from_json("{oops").is_err());
    }

    #[test]
    fn test_prefs_persist_and_reload() {
        let storage = Arc::new(MemoryStorage::new());
        let mut s = ResearchStore::load(storage.clone());
        s.set_event_logging_enabled(true);
        s.toggle_observation_mode(Some(true));
        let reloaded = ResearchStore::load(storage);
        assert!(reloaded.observation_mode());
        assert!(reloaded.event_logging_enabled());
        // The log itself is not persisted.
        assert_eq!(reloaded.event_count(), 0);
    }

    #[test]
    fn test_corrupt_prefs_use_defaults() {
        let storage = MemoryStorage::new().with_entry(RESEARCH_KEY, "not json");
        assert_eq!(ResearchStore::load(Arc::new(storage)).prefs(), ResearchPrefs::default());
        let mut s = ResearchStore::load(Arc::new(MemoryStorage::disabled()));
        s.toggle_observation_mode(None);
        assert!(s.observation_mode());
    }
}
