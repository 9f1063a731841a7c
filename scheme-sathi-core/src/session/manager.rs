//! Session manager: the current session plus saved history

use super::record::{Message, SessionRecord, SessionSummary, SessionType, UserDetails};
use crate::config::SessionConfig;
use crate::storage::SessionStore;
use chrono::Utc;
use tracing::{debug, info};

/// Owns one current session and the list of saved sessions.
///
/// The saved list is kept newest first and written through to the store on
/// every change. Saving keeps the current session open for further edits.
pub struct SessionManager {
    store: Box<dyn SessionStore>,
    saved: Vec<SessionRecord>,
    current: SessionRecord,
    modified: bool,
    max_sessions: usize,
    greeting: Option<String>,
    preview_chars: usize,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("store", &self.store.name())
            .field("saved", &self.saved.len())
            .field("current", &self.current.id)
            .field("modified", &self.modified)
            .finish()
    }
}

impl SessionManager {
    /// Create a manager over `store`, reading the saved list from it
    pub fn new(store: Box<dyn SessionStore>, max_sessions: usize, config: &SessionConfig) -> Self {
        let max_sessions = max_sessions.max(1);
        let mut saved = store.load_all();
        saved.truncate(max_sessions);
        info!(
            "Session manager ready with {} saved sessions ({} store)",
            saved.len(),
            store.name()
        );

        let greeting = config.greeting().map(ToString::to_string);
        let current = fresh_session(greeting.as_deref());

        Self {
            store,
            saved,
            current,
            modified: false,
            max_sessions,
            greeting,
            preview_chars: config.preview_chars.max(1),
        }
    }

    /// Create a manager from the full configuration
    pub fn from_config(store: Box<dyn SessionStore>, config: &crate::config::Config) -> Self {
        Self::new(store, config.storage.max_sessions, &config.session)
    }

    /// The session being edited
    pub fn current_session(&self) -> &SessionRecord {
        &self.current
    }

    /// Whether the current session changed since it was last saved or loaded
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Saved sessions, newest first
    pub fn saved_sessions(&self) -> &[SessionRecord] {
        &self.saved
    }

    /// Number of saved sessions
    pub fn session_count(&self) -> usize {
        self.saved.len()
    }

    /// Look up a saved session
    pub fn get_session(&self, id: &str) -> Option<&SessionRecord> {
        self.saved.iter().find(|s| s.id == id)
    }

    /// History listing, newest first
    pub fn list_sessions(&self) -> Vec<SessionSummary> {
        self.saved
            .iter()
            .map(|s| SessionSummary::from_record(s, self.preview_chars))
            .collect()
    }

    /// Replace the profile fields with the user's own details
    pub fn update_profile_fields(&mut self, details: UserDetails) {
        self.set_details(details, SessionType::Personal);
    }

    /// Replace the profile fields with details entered for someone else
    pub fn update_proxy_details(&mut self, details: UserDetails) {
        self.set_details(details, SessionType::Proxy);
    }

    fn set_details(&mut self, details: UserDetails, session_type: SessionType) {
        debug!(
            "Updating {} details on session {}",
            session_type, self.current.id
        );
        self.current.user_details = Some(details);
        self.current.session_type = session_type;
        self.mark_modified();
    }

    /// Append a chat message from either side of the conversation
    pub fn append_chat_message(&mut self, message: Message) {
        debug!(
            "Appending {:?} message {} to session {}",
            message.sender, message.id, self.current.id
        );
        self.current.chat_history.push(message);
        self.mark_modified();
    }

    /// Append a transcribed voice utterance or summary
    pub fn append_voice_interaction(&mut self, text: impl Into<String>) {
        self.current.voice_interactions.push(text.into());
        debug!(
            "Appended voice interaction to session {}",
            self.current.id
        );
        self.mark_modified();
    }

    fn mark_modified(&mut self) {
        self.current.refresh_counters();
        self.current.touch();
        self.modified = true;
    }

    /// Persist the current session and keep editing it.
    ///
    /// A record with the same id is replaced, not duplicated, and the saved
    /// copy moves to the front. The oldest records beyond the capacity are
    /// dropped. The in-memory list is updated even when the store write fails,
    /// but the session then stays modified so it is still offered for saving.
    pub fn save_current_session(&mut self) -> crate::Result<SessionRecord> {
        if self.current.id.is_empty() {
            self.current.id = uuid::Uuid::new_v4().to_string();
        }
        self.current.timestamp = Utc::now();
        self.current.is_saved = true;
        self.current.refresh_counters();

        let record = self.current.clone();
        self.saved.retain(|s| s.id != record.id);
        self.saved.insert(0, record.clone());

        if self.saved.len() > self.max_sessions {
            let evicted = self.saved.split_off(self.max_sessions);
            for old in &evicted {
                info!("Evicting oldest saved session {}", old.id);
            }
        }

        self.persist()?;
        self.modified = false;
        info!(
            "Saved session {} ({} interactions)",
            record.id, record.total_interactions
        );
        Ok(record)
    }

    /// Make a saved session the current one, keeping its id.
    ///
    /// Returns `false` and changes nothing when `id` is unknown.
    pub fn load_session(&mut self, id: &str) -> bool {
        let Some(record) = self.get_session(id) else {
            debug!("Load ignored, no saved session {}", id);
            return false;
        };

        let mut record = record.clone();
        record.is_saved = true;
        record.refresh_counters();
        self.current = record;
        self.modified = false;
        info!("Loaded session {}", id);
        true
    }

    /// Remove a saved session. The current session is left alone even if it
    /// was loaded from `id`.
    ///
    /// Returns `Ok(false)` and changes nothing when `id` is unknown.
    pub fn delete_session(&mut self, id: &str) -> crate::Result<bool> {
        let Some(index) = self.saved.iter().position(|s| s.id == id) else {
            debug!("Delete ignored, no saved session {}", id);
            return Ok(false);
        };

        self.saved.remove(index);
        self.persist()?;
        info!("Deleted session {}", id);
        Ok(true)
    }

    /// Discard the current session and start a fresh one
    pub fn clear_current_session(&mut self) {
        debug!("Clearing current session {}", self.current.id);
        self.current = fresh_session(self.greeting.as_deref());
        self.modified = false;
    }

    /// Start a new session, saving the current one first if it holds unsaved
    /// content. Returns the id of the auto-saved session, if any.
    pub fn create_new_session(&mut self) -> crate::Result<Option<String>> {
        let auto_saved = if self.has_unsaved_content() {
            let record = self.save_current_session()?;
            info!("Auto-saved session {} before starting a new one", record.id);
            Some(record.id)
        } else {
            None
        };

        self.clear_current_session();
        Ok(auto_saved)
    }

    /// Whether starting over now would lose something the user entered
    pub fn has_unsaved_content(&self) -> bool {
        let seeded = usize::from(self.greeting.is_some());
        self.current.has_meaningful_content(seeded) && (!self.current.is_saved || self.modified)
    }

    fn persist(&self) -> crate::Result<()> {
        self.store.save_all(&self.saved)
    }
}

fn fresh_session(greeting: Option<&str>) -> SessionRecord {
    match greeting {
        Some(text) => SessionRecord::with_greeting(text),
        None => SessionRecord::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Sender;
    use crate::storage::MemoryStore;

    /// Store whose slot reads empty and rejects every write
    struct ReadOnlyStore;

    impl SessionStore for ReadOnlyStore {
        fn load_all(&self) -> Vec<SessionRecord> {
            Vec::new()
        }

        fn save_all(&self, _records: &[SessionRecord]) -> crate::Result<()> {
            Err(crate::Error::Storage("slot is read-only".to_string()))
        }

        fn name(&self) -> &str {
            "read-only"
        }
    }

    fn config() -> SessionConfig {
        SessionConfig {
            greeting: "Namaste".to_string(),
            preview_chars: 40,
        }
    }

    fn manager_with(store: &MemoryStore, max: usize) -> SessionManager {
        SessionManager::new(Box::new(store.clone()), max, &config())
    }

    fn asha() -> UserDetails {
        UserDetails {
            full_name: "Asha".to_string(),
            age: "34".to_string(),
            national_id_number: "1234 5678 9012".to_string(),
            annual_income: "120000".to_string(),
            occupation: "Farmer".to_string(),
            state: "Maharashtra".to_string(),
            district: "Pune".to_string(),
        }
    }

    #[test]
    fn test_new_manager_starts_with_greeting() {
        let store = MemoryStore::new();
        let manager = manager_with(&store, 50);

        let current = manager.current_session();
        assert_eq!(current.chat_history.len(), 1);
        assert_eq!(current.chat_history[0].sender, Sender::Bot);
        assert_eq!(current.total_interactions, 1);
        assert!(!manager.is_modified());
        assert_eq!(manager.session_count(), 0);
    }

    #[test]
    fn test_counter_tracks_appends() {
        let store = MemoryStore::new();
        let mut manager = manager_with(&store, 50);

        for i in 0..5 {
            manager.append_chat_message(Message::user(format!("q{}", i)));
            manager.append_voice_interaction(format!("v{}", i));
            let current = manager.current_session();
            assert_eq!(
                current.total_interactions,
                current.chat_history.len() + current.voice_interactions.len()
            );
        }
        assert_eq!(manager.current_session().total_interactions, 11);
        assert!(manager.is_modified());
    }

    #[test]
    fn test_profile_update_sets_session_type() {
        let store = MemoryStore::new();
        let mut manager = manager_with(&store, 50);

        manager.update_proxy_details(asha());
        assert_eq!(manager.current_session().session_type, SessionType::Proxy);

        manager.update_profile_fields(asha());
        assert_eq!(
            manager.current_session().session_type,
            SessionType::Personal
        );
        assert!(manager.is_modified());
    }

    #[test]
    fn test_save_writes_through_and_keeps_session_open() {
        let store = MemoryStore::new();
        let mut manager = manager_with(&store, 50);

        manager.update_profile_fields(asha());
        manager.append_chat_message(Message::user("Hi"));
        let record = manager.save_current_session().unwrap();

        assert!(record.is_saved);
        assert!(!manager.is_modified());
        assert_eq!(manager.current_session().id, record.id);
        assert_eq!(store.snapshot(), vec![record]);
    }

    #[test]
    fn test_double_save_is_idempotent() {
        let store = MemoryStore::new();
        let mut manager = manager_with(&store, 50);

        manager.append_chat_message(Message::user("Hi"));
        manager.save_current_session().unwrap();
        manager.save_current_session().unwrap();

        assert_eq!(manager.session_count(), 1);
        assert_eq!(store.snapshot().len(), 1);
    }

    #[test]
    fn test_resave_moves_to_front() {
        let store = MemoryStore::new();
        let mut manager = manager_with(&store, 50);

        manager.append_chat_message(Message::user("first"));
        let first = manager.save_current_session().unwrap().id;
        manager.create_new_session().unwrap();
        manager.append_chat_message(Message::user("second"));
        let second = manager.save_current_session().unwrap().id;

        assert!(manager.load_session(&first));
        manager.append_voice_interaction("more");
        manager.save_current_session().unwrap();

        let ids: Vec<_> = manager.saved_sessions().iter().map(|s| s.id.clone()).collect();
        assert_eq!(ids, vec![first, second]);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let store = MemoryStore::new();
        let mut manager = manager_with(&store, 3);

        let mut ids = Vec::new();
        for i in 0..4 {
            manager.append_chat_message(Message::user(format!("session {}", i)));
            ids.push(manager.save_current_session().unwrap().id);
            manager.clear_current_session();
        }

        let kept: Vec<_> = manager.saved_sessions().iter().map(|s| s.id.clone()).collect();
        assert_eq!(kept, vec![ids[3].clone(), ids[2].clone(), ids[1].clone()]);
        assert!(manager.get_session(&ids[0]).is_none());
        assert_eq!(store.snapshot().len(), 3);
    }

    #[test]
    fn test_load_unknown_is_noop() {
        let store = MemoryStore::new();
        let mut manager = manager_with(&store, 50);
        manager.append_chat_message(Message::user("draft"));
        let before = manager.current_session().clone();

        assert!(!manager.load_session("missing"));
        assert_eq!(manager.current_session(), &before);
        assert!(manager.is_modified());
    }

    #[test]
    fn test_load_replaces_current_with_saved_copy() {
        let store = MemoryStore::new();
        let mut manager = manager_with(&store, 50);

        manager.update_profile_fields(asha());
        manager.append_chat_message(Message::user("Hi"));
        let saved = manager.save_current_session().unwrap();
        manager.clear_current_session();

        assert!(manager.load_session(&saved.id));
        assert_eq!(manager.current_session(), &saved);
        assert!(!manager.is_modified());
    }

    #[test]
    fn test_delete_leaves_current_session() {
        let store = MemoryStore::new();
        let mut manager = manager_with(&store, 50);

        manager.append_chat_message(Message::user("Hi"));
        let saved = manager.save_current_session().unwrap();

        assert!(manager.delete_session(&saved.id).unwrap());
        assert_eq!(manager.session_count(), 0);
        assert!(store.snapshot().is_empty());
        assert_eq!(manager.current_session().id, saved.id);

        assert!(!manager.delete_session(&saved.id).unwrap());
    }

    #[test]
    fn test_clear_assigns_fresh_id() {
        let store = MemoryStore::new();
        let mut manager = manager_with(&store, 50);
        let old_id = manager.current_session().id.clone();

        manager.append_voice_interaction("hello");
        manager.clear_current_session();

        assert_ne!(manager.current_session().id, old_id);
        assert!(manager.current_session().voice_interactions.is_empty());
        assert!(!manager.is_modified());
        assert_eq!(manager.session_count(), 0);
    }

    #[test]
    fn test_new_session_skips_greeting_only_session() {
        let store = MemoryStore::new();
        let mut manager = manager_with(&store, 50);

        assert_eq!(manager.create_new_session().unwrap(), None);
        assert_eq!(manager.session_count(), 0);
    }

    #[test]
    fn test_new_session_autosaves_unsaved_content() {
        let store = MemoryStore::new();
        let mut manager = manager_with(&store, 50);

        manager.append_voice_interaction("PM Kisan eligibility");
        let old_id = manager.current_session().id.clone();

        assert_eq!(manager.create_new_session().unwrap(), Some(old_id.clone()));
        assert_eq!(manager.session_count(), 1);
        assert_ne!(manager.current_session().id, old_id);
    }

    #[test]
    fn test_new_session_skips_already_saved_session() {
        let store = MemoryStore::new();
        let mut manager = manager_with(&store, 50);

        manager.update_profile_fields(asha());
        let saved = manager.save_current_session().unwrap();
        let saved_at = saved.timestamp;

        assert_eq!(manager.create_new_session().unwrap(), None);
        assert_eq!(manager.get_session(&saved.id).unwrap().timestamp, saved_at);
    }

    #[test]
    fn test_new_session_saves_edits_after_save() {
        let store = MemoryStore::new();
        let mut manager = manager_with(&store, 50);

        manager.append_chat_message(Message::user("Hi"));
        let saved = manager.save_current_session().unwrap();
        manager.append_chat_message(Message::bot("Hello Asha"));

        assert_eq!(manager.create_new_session().unwrap(), Some(saved.id.clone()));
        assert_eq!(manager.get_session(&saved.id).unwrap().chat_history.len(), 3);
    }

    #[test]
    fn test_manager_reads_existing_slot() {
        let mut record = SessionRecord::new();
        record.voice_interactions.push("ration card".to_string());
        record.is_saved = true;
        record.refresh_counters();
        let store = MemoryStore::with_records(vec![record.clone()]);

        let mut manager = manager_with(&store, 50);
        assert_eq!(manager.session_count(), 1);
        assert!(manager.load_session(&record.id));
        assert_eq!(manager.current_session().voice_interactions, vec!["ration card"]);
    }

    #[test]
    fn test_list_sessions_summarizes_newest_first() {
        let store = MemoryStore::new();
        let mut manager = manager_with(&store, 50);

        manager.update_profile_fields(asha());
        manager.append_chat_message(Message::user("Schemes for farmers"));
        manager.save_current_session().unwrap();
        manager.clear_current_session();
        manager.append_chat_message(Message::user("Scholarships"));
        manager.save_current_session().unwrap();

        let summaries = manager.list_sessions();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].preview.as_deref(), Some("Scholarships"));
        assert_eq!(summaries[1].full_name.as_deref(), Some("Asha"));
        assert_eq!(summaries[1].total_interactions, 2);
    }

    #[test]
    fn test_without_greeting_sessions_start_empty() {
        let store = MemoryStore::new();
        let config = SessionConfig {
            greeting: String::new(),
            preview_chars: 40,
        };
        let mut manager = SessionManager::new(Box::new(store), 50, &config);

        assert!(manager.current_session().chat_history.is_empty());
        manager.append_chat_message(Message::bot("unprompted"));
        assert!(manager.has_unsaved_content());
    }

    #[test]
    fn test_failed_save_keeps_work_unsaved() {
        let mut manager = SessionManager::new(Box::new(ReadOnlyStore), 50, &config());

        manager.append_voice_interaction("widow pension");
        let err = manager.save_current_session().unwrap_err();
        assert!(matches!(err, crate::Error::Storage(_)));
        assert!(manager.is_modified());
        assert!(manager.has_unsaved_content());

        let current_id = manager.current_session().id.clone();
        assert!(manager.create_new_session().is_err());
        assert_eq!(manager.current_session().id, current_id);
        assert_eq!(manager.current_session().voice_interactions, vec!["widow pension"]);
    }
}
