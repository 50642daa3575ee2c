//! UI-agnostic application state types
//!
//! This module contains data structures that are shared between different UIs
//! and don't depend on any specific UI framework.

use chrono::{Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Format a millisecond timestamp as a short local date, e.g. `3/14/2025`.
pub fn format_date(timestamp: i64) -> String {
    match Local.timestamp_millis_opt(timestamp).single() {
        Some(dt) => dt.format("%-m/%-d/%Y").to_string(),
        None => "unknown date".to_string(),
    }
}

/// A chat message in the companion conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: ChatRole,
    pub text: String,
    pub timestamp: i64,
}

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatMessage {
    pub fn new(role: ChatRole, text: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            role,
            text: text.into(),
            timestamp: now_millis(),
        }
    }
}

/// The messages of one chat screen, oldest first.
///
/// Assistant replies are opened empty with [`Transcript::begin_reply`] and grow
/// as streamed deltas arrive.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_greeting(text: &str) -> Self {
        let mut transcript = Self::new();
        transcript.push(ChatRole::Assistant, text);
        transcript
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn push(&mut self, role: ChatRole, text: &str) -> &ChatMessage {
        self.messages.push(ChatMessage::new(role, text));
        &self.messages[self.messages.len() - 1]
    }

    /// Open an empty assistant message and return its id.
    pub fn begin_reply(&mut self) -> String {
        let message = ChatMessage::new(ChatRole::Assistant, String::new());
        let id = message.id.clone();
        self.messages.push(message);
        id
    }

    /// Append a streamed fragment to the reply with the given id.
    ///
    /// Returns false if no message has that id.
    pub fn append_delta(&mut self, id: &str, delta: &str) -> bool {
        match self.messages.iter_mut().rev().find(|m| m.id == id) {
            Some(message) => {
                message.text.push_str(delta);
                true
            }
            None => false,
        }
    }

    /// Drop the reply with the given id if nothing was streamed into it.
    pub fn discard_if_empty(&mut self, id: &str) {
        if let Some(pos) = self.messages.iter().position(|m| m.id == id) {
            if self.messages[pos].text.is_empty() {
                self.messages.remove(pos);
            }
        }
    }

    pub fn text_of(&self, id: &str) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.id == id)
            .map(|m| m.text.as_str())
    }
}

/// The fixed mood taxonomy offered by the tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mood {
    Happy,
    Calm,
    Neutral,
    Sad,
    Anxious,
    Angry,
}

impl Mood {
    pub fn all() -> [Mood; 6] {
        [
            Mood::Happy,
            Mood::Calm,
            Mood::Neutral,
            Mood::Sad,
            Mood::Anxious,
            Mood::Angry,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Happy => "Happy",
            Mood::Calm => "Calm",
            Mood::Neutral => "Neutral",
            Mood::Sad => "Sad",
            Mood::Anxious => "Anxious",
            Mood::Angry => "Angry",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Mood::Happy => "😊",
            Mood::Calm => "😌",
            Mood::Neutral => "😐",
            Mood::Sad => "😔",
            Mood::Anxious => "😰",
            Mood::Angry => "😠",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::all()
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(label))
    }
}

pub const MIN_INTENSITY: u8 = 1;
pub const MAX_INTENSITY: u8 = 10;

/// A logged mood. Stored with the field names the history files have always used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodEntry {
    pub id: String,
    pub mood: String,
    pub intensity: u8,
    #[serde(default)]
    pub note: String,
    pub timestamp: i64,
}

impl MoodEntry {
    pub fn new(mood: &str, intensity: u8, note: &str) -> Self {
        Self::at(mood, intensity, note, now_millis())
    }

    pub fn at(mood: &str, intensity: u8, note: &str, timestamp: i64) -> Self {
        Self {
            id: new_id(),
            mood: mood.to_string(),
            intensity: intensity.clamp(MIN_INTENSITY, MAX_INTENSITY),
            note: note.trim().to_string(),
            timestamp,
        }
    }

    pub fn emoji(&self) -> &'static str {
        Mood::from_label(&self.mood).map(|m| m.emoji()).unwrap_or("•")
    }
}

/// A journal entry written against a prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: String,
    pub prompt: String,
    pub content: String,
    pub timestamp: i64,
}

impl JournalEntry {
    pub fn new(prompt: &str, content: &str) -> Self {
        Self::at(prompt, content, now_millis())
    }

    pub fn at(prompt: &str, content: &str, timestamp: i64) -> Self {
        Self {
            id: new_id(),
            prompt: prompt.to_string(),
            content: content.to_string(),
            timestamp,
        }
    }
}

/// Colour scheme persisted between runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "dark" => Some(Theme::Dark),
            "light" => Some(Theme::Light),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_streamed_deltas_form_one_message() {
        let mut transcript = Transcript::with_greeting("hi");
        transcript.push(ChatRole::User, "how are you?");
        let id = transcript.begin_reply();

        for delta in ["Hel", "lo", " there"] {
            assert!(transcript.append_delta(&id, delta));
        }

        assert_eq!(transcript.len(), 3);
        let last = transcript.last().unwrap();
        assert_eq!(last.role, ChatRole::Assistant);
        assert_eq!(last.text, "Hello there");
    }

    #[test]
    fn test_append_delta_unknown_id() {
        let mut transcript = Transcript::new();
        assert!(!transcript.append_delta("missing", "x"));
        assert!(transcript.is_empty());
    }

    #[test]
    fn test_discard_if_empty_keeps_partial_reply() {
        let mut transcript = Transcript::new();
        let empty = transcript.begin_reply();
        transcript.discard_if_empty(&empty);
        assert!(transcript.is_empty());

        let partial = transcript.begin_reply();
        transcript.append_delta(&partial, "I hear");
        transcript.discard_if_empty(&partial);
        assert_eq!(transcript.text_of(&partial), Some("I hear"));
    }

    #[test]
    fn test_mood_entry_clamps_intensity() {
        assert_eq!(MoodEntry::new("Happy", 0, "").intensity, 1);
        assert_eq!(MoodEntry::new("Happy", 42, "").intensity, 10);
        assert_eq!(MoodEntry::new("Happy", 7, "").intensity, 7);
    }

    #[test]
    fn test_mood_entry_json_layout() {
        let entry = MoodEntry::at("Sad", 3, "tired", 1_700_000_000_000);
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["mood"], "Sad");
        assert_eq!(value["intensity"], 3);
        assert_eq!(value["note"], "tired");
        assert_eq!(value["timestamp"], 1_700_000_000_000i64);
        assert!(value["id"].is_string());
    }

    #[test]
    fn test_mood_from_label() {
        assert_eq!(Mood::from_label("anxious"), Some(Mood::Anxious));
        assert_eq!(Mood::from_label("Elated"), None);
        assert_eq!(MoodEntry::new("Calm", 5, "").emoji(), "😌");
    }

    #[test]
    fn test_theme_round_trip_and_toggle() {
        assert_eq!(Theme::from_str("dark"), Some(Theme::Dark));
        assert_eq!(Theme::from_str(" Light\n"), Some(Theme::Light));
        assert_eq!(Theme::from_str("sepia"), None);
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
    }
}
