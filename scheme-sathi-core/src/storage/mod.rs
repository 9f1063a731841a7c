//! Persistent slot for the saved-sessions list
//!
//! A store reads and writes the whole list at once. The manager calls
//! [`SessionStore::save_all`] after every change to the list.

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

use crate::session::SessionRecord;

/// Whole-list persistence for saved sessions
pub trait SessionStore: Send {
    /// Read every saved session, newest first.
    ///
    /// A missing or unreadable slot yields an empty list.
    fn load_all(&self) -> Vec<SessionRecord>;

    /// Replace the slot with `records`
    fn save_all(&self, records: &[SessionRecord]) -> crate::Result<()>;

    /// Short name for logs
    fn name(&self) -> &str;
}
