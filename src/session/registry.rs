use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{mpsc, oneshot};

use crate::error::SyncError;
use crate::pipeline::runtime::SyncEngine;
use crate::session::Session;
use crate::types::{RoundOutcome, Script};

enum Command {
    Utterance {
        heard_text: String,
        reply: oneshot::Sender<Result<RoundOutcome, SyncError>>,
    },
    Preview {
        partial_text: String,
        reply: oneshot::Sender<Option<usize>>,
    },
    Reset {
        reply: oneshot::Sender<()>,
    },
    Position {
        reply: oneshot::Sender<usize>,
    },
    Close,
}

/// Cheap, cloneable handle to a running session worker.
///
/// Every request goes through the worker's queue, so rounds for one session
/// run strictly one after another in submission order.
#[derive(Clone)]
pub struct SessionHandle {
    id: String,
    tx: mpsc::Sender<Command>,
}

impl SessionHandle {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Queues one finalized speech segment and waits for its round.
    pub async fn submit(&self, heard_text: impl Into<String>) -> Result<RoundOutcome, SyncError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Utterance {
            heard_text: heard_text.into(),
            reply,
        })
        .await?;
        rx.await.map_err(|_| self.closed())?
    }

    pub async fn preview(&self, partial_text: impl Into<String>) -> Result<Option<usize>, SyncError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Preview {
            partial_text: partial_text.into(),
            reply,
        })
        .await?;
        rx.await.map_err(|_| self.closed())
    }

    pub async fn reset(&self) -> Result<(), SyncError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Reset { reply }).await?;
        rx.await.map_err(|_| self.closed())
    }

    pub async fn position(&self) -> Result<usize, SyncError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Position { reply }).await?;
        rx.await.map_err(|_| self.closed())
    }

    async fn send(&self, command: Command) -> Result<(), SyncError> {
        self.tx.send(command).await.map_err(|_| self.closed())
    }

    fn closed(&self) -> SyncError {
        SyncError::SessionClosed {
            id: self.id.clone(),
        }
    }
}

/// Owns the set of active sessions, keyed by session id.
pub struct SessionRegistry {
    engine: Arc<SyncEngine>,
    sessions: Mutex<HashMap<String, SessionHandle>>,
}

impl SessionRegistry {
    pub fn new(engine: Arc<SyncEngine>) -> Self {
        Self {
            engine,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Starts a session at position 0 and spawns its worker on the current
    /// Tokio runtime.
    pub fn open(
        &self,
        id: impl Into<String>,
        script: Arc<Script>,
    ) -> Result<SessionHandle, SyncError> {
        let id = id.into();
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            return Err(SyncError::RuntimeUnavailable { id });
        };
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        if sessions.contains_key(&id) {
            return Err(SyncError::SessionExists { id });
        }

        let (tx, rx) = mpsc::channel(self.engine.config().session_queue_capacity);
        let session = Session::new(id.clone(), script);
        tracing::info!(
            session_id = %id,
            script_id = %session.script().id,
            tokens = session.script().token_count(),
            "session opened"
        );
        runtime.spawn(run_session(Arc::clone(&self.engine), session, rx));

        let handle = SessionHandle { id: id.clone(), tx };
        sessions.insert(id, handle.clone());
        Ok(handle)
    }

    pub fn get(&self, id: &str) -> Result<SessionHandle, SyncError> {
        self.sessions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(id)
            .cloned()
            .ok_or_else(|| SyncError::SessionNotFound { id: id.to_string() })
    }

    /// Removes the session. Rounds already queued still complete; anything
    /// submitted afterwards fails with `SessionClosed`.
    pub async fn close(&self, id: &str) -> Result<(), SyncError> {
        let handle = self
            .sessions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(id)
            .ok_or_else(|| SyncError::SessionNotFound { id: id.to_string() })?;
        // Worker may already be gone; either way the session is closed.
        let _ = handle.tx.send(Command::Close).await;
        Ok(())
    }

    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .sessions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

async fn run_session(engine: Arc<SyncEngine>, mut session: Session, mut rx: mpsc::Receiver<Command>) {
    while let Some(command) = rx.recv().await {
        match command {
            Command::Utterance { heard_text, reply } => {
                let outcome = engine.process_utterance(&mut session, &heard_text).await;
                if reply.send(outcome).is_err() {
                    tracing::debug!(session_id = %session.id(), "round finished after caller left");
                }
            }
            Command::Preview {
                partial_text,
                reply,
            } => {
                let _ = reply.send(engine.preview(&session, &partial_text));
            }
            Command::Reset { reply } => {
                engine.reset(&mut session);
                let _ = reply.send(());
            }
            Command::Position { reply } => {
                let _ = reply.send(session.position());
            }
            Command::Close => break,
        }
    }
    tracing::info!(
        session_id = %session.id(),
        position = session.position(),
        "session closed"
    );
}
