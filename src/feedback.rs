use serde_json::{Map, Value};

use crate::research::ResearchStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackValue {
    Useful,
    NotUseful,
}

impl FeedbackValue {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackValue::Useful => "useful",
            FeedbackValue::NotUseful => "not_useful",
        }
    }

    pub fn acknowledgement(&self) -> &'static str {
        match self {
            FeedbackValue::Useful => "Glad this helped!",
            FeedbackValue::NotUseful => "We’ll improve this insight.",
        }
    }
}

pub const DEFAULT_QUESTION: &str = "Was this recommendation useful?";

/// Inline "was this useful?" widget attached to one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackWidget {
    entity_id: String,
    scope: String,
    question: String,
    selection: Option<FeedbackValue>,
    note: String,
    note_saved: bool,
}

impl FeedbackWidget {
    pub fn new(entity_id: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            scope: "global".to_string(),
            question: DEFAULT_QUESTION.to_string(),
            selection: None,
            note: String::new(),
            note_saved: false,
        }
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn selection(&self) -> Option<FeedbackValue> {
        self.selection
    }

    pub fn note(&self) -> &str {
        &self.note
    }

    pub fn note_saved(&self) -> bool {
        self.note_saved
    }

    /// Events from this widget are scoped `"{scope}:{entityId}"`.
    pub fn event_scope(&self) -> String {
        format!("{}:{}", self.scope, self.entity_id)
    }

    pub fn container_label(&self) -> String {
        format!("feedback-{}", self.entity_id)
    }

    pub fn button_label(&self, value: FeedbackValue) -> String {
        match value {
            FeedbackValue::Useful => format!("feedback-useful-{}", self.entity_id),
            FeedbackValue::NotUseful => format!("feedback-not-useful-{}", self.entity_id),
        }
    }

    pub fn can_submit(&self) -> bool {
        self.selection.is_some() && !self.note.trim().is_empty()
    }

    pub fn select(&mut self, value: FeedbackValue, research: &mut ResearchStore) {
        self.selection = Some(value);
        self.note.clear();
        self.note_saved = false;
        let metadata = self.metadata("quick-response", None);
        research.record_feedback(&self.event_scope(), value.as_str(), metadata);
    }

    pub fn set_note(&mut self, note: String) {
        self.note = note;
    }

    /// Returns false when there is nothing to submit.
    pub fn submit_note(&mut self, research: &mut ResearchStore) -> bool {
        let Some(selection) = self.selection else {
            return false;
        };
        let note = self.note.trim().to_string();
        if note.is_empty() {
            return false;
        }
        let metadata = self.metadata("qualitative-note", Some(note));
        research.record_feedback(&self.event_scope(), selection.as_str(), metadata);
        self.note.clear();
        self.note_saved = true;
        true
    }

    fn metadata(&self, kind: &str, note: Option<String>) -> Map<String, Value> {
        let mut metadata = Map::new();
        metadata.insert("entityId".to_string(), Value::String(self.entity_id.clone()));
        if let Some(note) = note {
            metadata.insert("note".to_string(), Value::String(note));
        }
        metadata.insert("type".to_string(), Value::String(kind.to_string()));
        metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::research::EventKind;
    use crate::storage::MemoryStorage;
    use std::sync::Arc;

    fn research() -> ResearchStore {
        ResearchStore::load(Arc::new(MemoryStorage::new()))
    }

    #[test]
    fn test_labels_and_scope() {
        let w = FeedbackWidget::new("abc").with_scope("recommendations");
        assert_eq!(w.event_scope(), "recommendations:abc");
        assert_eq!(w.container_label(), "feedback-abc");
        assert_eq!(w.button_label(FeedbackValue::Useful), "feedback-useful-abc");
        assert_eq!(w.button_label(FeedbackValue::NotUseful), "feedback-not-useful-abc");
        assert_eq!(FeedbackWidget::new("x").event_scope(), "global:x");
    }

    #[test]
    fn test_select_records_quick_response() {
        let mut r = research();
        let mut w = FeedbackWidget::new("abc");
        w.set_note("draft".into());
        w.select(FeedbackValue::NotUseful, &mut r);
        assert_eq!(w.note(), "");
        let e = r.events().next().unwrap();
        assert_eq!(e.kind, EventKind::Feedback);
        assert_eq!(e.scope.as_deref(), Some("global:abc"));
        let meta = e.metadata.as_ref().unwrap();
        assert_eq!(meta["value"], "not_useful");
        assert_eq!(meta["type"], "quick-response");
        assert_eq!(meta["entityId"], "abc");
    }

    #[test]
    fn test_submit_note_requires_selection_and_text() {
        let mut r = research();
        let mut w = FeedbackWidget::new("abc");
        w.set_note("hello".into());
        assert!(!w.submit_note(&mut r));
        assert_eq!(r.event_count(), 0);

        w.select(FeedbackValue::Useful, &mut r);
        w.set_note("   ".into());
        assert!(!w.can_submit());
        assert!(!w.submit_note(&mut r));

        w.set_note("  very clear  ".into());
        assert!(w.submit_note(&mut r));
        assert!(w.note_saved());
        assert_eq!(w.note(), "");
        let meta = r.events().next().unwrap().metadata.clone().unwrap();
        assert_eq!(meta["note"], "very clear");
        assert_eq!(meta["type"], "qualitative-note");
        assert_eq!(r.event_count(), 2);
    }
}
