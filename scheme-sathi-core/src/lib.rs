//! Core types for scheme-sathi
//!
//! This crate owns the session records a citizen builds up while talking to
//! the scheme assistant, the manager that moves them between the current
//! session and saved history, and the persistence, configuration and logging
//! plumbing around it.

pub mod config;
pub mod error;
pub mod logging;
pub mod session;
pub mod storage;
pub mod utils;

pub use error::{Error, Result};
pub use session::{
    Message, Sender, SessionActor, SessionHandle, SessionManager, SessionRecord, SessionSummary,
    SessionType, UserDetails,
};
pub use storage::{JsonFileStore, MemoryStore, SessionStore};
