//! Single-task owner of a [`SessionManager`]
//!
//! Hosts with several tasks (a UI loop, network callbacks) talk to the
//! manager through a cloneable [`SessionHandle`]. Every request is a
//! [`SessionCommand`] processed in arrival order by the one task that owns
//! the manager, so no operation ever observes another half done.

use super::manager::SessionManager;
use super::record::{Message, SessionRecord, SessionSummary, UserDetails};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

const COMMAND_BUFFER: usize = 64;

/// Requests understood by the session actor
pub enum SessionCommand {
    UpdateProfile(UserDetails),
    UpdateProxy(UserDetails),
    AppendChat(Message),
    AppendVoice(String),
    Save(oneshot::Sender<crate::Result<SessionRecord>>),
    Load(String, oneshot::Sender<bool>),
    Delete(String, oneshot::Sender<crate::Result<bool>>),
    Clear,
    CreateNew(oneshot::Sender<crate::Result<Option<String>>>),
    Current(oneshot::Sender<(SessionRecord, bool)>),
    HasUnsaved(oneshot::Sender<bool>),
    Get(String, oneshot::Sender<Option<SessionRecord>>),
    List(oneshot::Sender<Vec<SessionSummary>>),
}

/// Runs the command loop for one manager
pub struct SessionActor {
    manager: SessionManager,
    rx: mpsc::Receiver<SessionCommand>,
}

impl SessionActor {
    /// Wrap `manager`, returning the actor and the first handle to it
    pub fn new(manager: SessionManager) -> (Self, SessionHandle) {
        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
        (Self { manager, rx }, SessionHandle { tx })
    }

    /// Spawn the actor on the current runtime
    pub fn spawn(manager: SessionManager) -> (SessionHandle, tokio::task::JoinHandle<SessionManager>) {
        let (actor, handle) = Self::new(manager);
        (handle, tokio::spawn(actor.run()))
    }

    /// Process commands until every handle is dropped, then hand the manager back
    pub async fn run(mut self) -> SessionManager {
        info!("Session actor started");
        while let Some(cmd) = self.rx.recv().await {
            self.handle(cmd);
        }
        info!("All session handles dropped, stopping actor");
        self.manager
    }

    fn handle(&mut self, cmd: SessionCommand) {
        // A dropped reply receiver only means the caller stopped waiting
        match cmd {
            SessionCommand::UpdateProfile(details) => self.manager.update_profile_fields(details),
            SessionCommand::UpdateProxy(details) => self.manager.update_proxy_details(details),
            SessionCommand::AppendChat(message) => self.manager.append_chat_message(message),
            SessionCommand::AppendVoice(text) => self.manager.append_voice_interaction(text),
            SessionCommand::Save(reply) => {
                let _ = reply.send(self.manager.save_current_session());
            }
            SessionCommand::Load(id, reply) => {
                let _ = reply.send(self.manager.load_session(&id));
            }
            SessionCommand::Delete(id, reply) => {
                let _ = reply.send(self.manager.delete_session(&id));
            }
            SessionCommand::Clear => self.manager.clear_current_session(),
            SessionCommand::CreateNew(reply) => {
                let _ = reply.send(self.manager.create_new_session());
            }
            SessionCommand::Current(reply) => {
                let snapshot = (
                    self.manager.current_session().clone(),
                    self.manager.is_modified(),
                );
                let _ = reply.send(snapshot);
            }
            SessionCommand::HasUnsaved(reply) => {
                let _ = reply.send(self.manager.has_unsaved_content());
            }
            SessionCommand::Get(id, reply) => {
                let _ = reply.send(self.manager.get_session(&id).cloned());
            }
            SessionCommand::List(reply) => {
                let _ = reply.send(self.manager.list_sessions());
            }
        }
        debug!("Processed session command");
    }
}

/// Cloneable async front for a running [`SessionActor`]
#[derive(Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<SessionCommand>,
}

impl SessionHandle {
    async fn send(&self, cmd: SessionCommand) -> crate::Result<()> {
        self.tx
            .send(cmd)
            .await
            .map_err(|_| crate::Error::Internal("session actor stopped".to_string()))
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> SessionCommand,
    ) -> crate::Result<T> {
        let (tx, rx) = oneshot::channel();
        self.send(make(tx)).await?;
        rx.await
            .map_err(|_| crate::Error::Internal("session actor dropped reply".to_string()))
    }

    pub async fn update_profile_fields(&self, details: UserDetails) -> crate::Result<()> {
        self.send(SessionCommand::UpdateProfile(details)).await
    }

    pub async fn update_proxy_details(&self, details: UserDetails) -> crate::Result<()> {
        self.send(SessionCommand::UpdateProxy(details)).await
    }

    pub async fn append_chat_message(&self, message: Message) -> crate::Result<()> {
        self.send(SessionCommand::AppendChat(message)).await
    }

    pub async fn append_voice_interaction(&self, text: impl Into<String>) -> crate::Result<()> {
        self.send(SessionCommand::AppendVoice(text.into())).await
    }

    pub async fn save_current_session(&self) -> crate::Result<SessionRecord> {
        self.request(SessionCommand::Save).await?
    }

    pub async fn load_session(&self, id: impl Into<String>) -> crate::Result<bool> {
        let id = id.into();
        self.request(|reply| SessionCommand::Load(id, reply)).await
    }

    pub async fn delete_session(&self, id: impl Into<String>) -> crate::Result<bool> {
        let id = id.into();
        self.request(|reply| SessionCommand::Delete(id, reply)).await?
    }

    pub async fn clear_current_session(&self) -> crate::Result<()> {
        self.send(SessionCommand::Clear).await
    }

    pub async fn create_new_session(&self) -> crate::Result<Option<String>> {
        self.request(SessionCommand::CreateNew).await?
    }

    /// Snapshot of the current session and its modified flag
    pub async fn current_session(&self) -> crate::Result<(SessionRecord, bool)> {
        self.request(SessionCommand::Current).await
    }

    pub async fn has_unsaved_content(&self) -> crate::Result<bool> {
        self.request(SessionCommand::HasUnsaved).await
    }

    pub async fn get_session(&self, id: impl Into<String>) -> crate::Result<Option<SessionRecord>> {
        let id = id.into();
        self.request(|reply| SessionCommand::Get(id, reply)).await
    }

    pub async fn list_sessions(&self) -> crate::Result<Vec<SessionSummary>> {
        self.request(SessionCommand::List).await
    }
}
