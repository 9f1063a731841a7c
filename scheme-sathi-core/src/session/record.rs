//! Session data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whose details a session carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionType {
    /// Details belong to the signed-in user
    #[default]
    Personal,
    /// Details were entered on behalf of someone else
    Proxy,
}

impl std::fmt::Display for SessionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionType::Personal => f.pad("personal"),
            SessionType::Proxy => f.pad("proxy"),
        }
    }
}

/// Profile fields captured by the upload form. Free text, never validated here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserDetails {
    pub full_name: String,
    pub age: String,
    pub national_id_number: String,
    pub annual_income: String,
    pub occupation: String,
    pub state: String,
    pub district: String,
}

impl UserDetails {
    /// True when every field is blank
    pub fn is_empty(&self) -> bool {
        [
            &self.full_name,
            &self.age,
            &self.national_id_number,
            &self.annual_income,
            &self.occupation,
            &self.state,
            &self.district,
        ]
        .iter()
        .all(|field| field.trim().is_empty())
    }
}

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// A chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a message with a fresh id, stamped now
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            text: text.into(),
            sender,
            timestamp: Utc::now(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, text)
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(Sender::Bot, text)
    }
}

/// One interaction episode: profile entry, chat and voice.
///
/// The same shape serves as the mutable current session and as a persisted
/// history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: String,
    /// Creation time, replaced by the save time on every save
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub session_type: SessionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_details: Option<UserDetails>,
    #[serde(default)]
    pub chat_history: Vec<Message>,
    #[serde(default)]
    pub voice_interactions: Vec<String>,
    /// Stored for readers of the raw slot. Kept equal to
    /// `chat_history.len() + voice_interactions.len()` by [`SessionRecord::refresh_counters`].
    #[serde(default)]
    pub total_interactions: usize,
    #[serde(default)]
    pub is_saved: bool,
    pub last_modified: DateTime<Utc>,
}

impl SessionRecord {
    /// Create an empty session with a fresh id
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: now,
            session_type: SessionType::Personal,
            user_details: None,
            chat_history: Vec::new(),
            voice_interactions: Vec::new(),
            total_interactions: 0,
            is_saved: false,
            last_modified: now,
        }
    }

    /// Create an empty session opened by a bot greeting
    pub fn with_greeting(greeting: impl Into<String>) -> Self {
        let mut record = Self::new();
        record.chat_history.push(Message::bot(greeting));
        record.refresh_counters();
        record
    }

    /// Interaction count derived from the content
    pub fn interaction_count(&self) -> usize {
        self.chat_history.len() + self.voice_interactions.len()
    }

    /// Recompute the stored counter from the content
    pub fn refresh_counters(&mut self) {
        self.total_interactions = self.interaction_count();
    }

    pub(crate) fn touch(&mut self) {
        self.last_modified = Utc::now();
    }

    /// First message the user typed, if any
    pub fn first_user_message(&self) -> Option<&Message> {
        self.chat_history.iter().find(|m| m.sender == Sender::User)
    }

    /// Whether the session holds anything worth keeping.
    ///
    /// `seeded` is the number of leading messages the application put there
    /// itself (the greeting), which do not count as content.
    pub fn has_meaningful_content(&self, seeded: usize) -> bool {
        self.chat_history.len() > seeded
            || !self.voice_interactions.is_empty()
            || self.user_details.as_ref().is_some_and(|d| !d.is_empty())
    }
}

impl Default for SessionRecord {
    fn default() -> Self {
        Self::new()
    }
}

/// Listing entry for the history view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub session_type: SessionType,
    pub full_name: Option<String>,
    pub preview: Option<String>,
    pub total_interactions: usize,
    pub voice_count: usize,
}

impl SessionSummary {
    /// Summarize a record, cutting the preview to `preview_chars`
    pub fn from_record(record: &SessionRecord, preview_chars: usize) -> Self {
        let full_name = record
            .user_details
            .as_ref()
            .map(|d| d.full_name.trim())
            .filter(|name| !name.is_empty())
            .map(ToString::to_string);

        Self {
            id: record.id.clone(),
            timestamp: record.timestamp,
            session_type: record.session_type,
            full_name,
            preview: record
                .first_user_message()
                .map(|m| crate::utils::truncate(m.text.trim(), preview_chars)),
            total_interactions: record.interaction_count(),
            voice_count: record.voice_interactions.len(),
        }
    }
}
