//! Session management for citizen interactions
//!
//! A session collects the profile fields, chat messages and voice
//! interactions of one episode. The manager keeps one current session and a
//! bounded, persisted history of saved ones.

pub mod actor;
pub mod manager;
pub mod record;

pub use actor::{SessionActor, SessionCommand, SessionHandle};
pub use manager::SessionManager;
pub use record::{Message, Sender, SessionRecord, SessionSummary, SessionType, UserDetails};
