//! Session manager: the collaborator owning sessions and the option store
//!
//! The console core never owns session lifetime. It records the local id of
//! the session it is attached to and drives everything else through the
//! operations exposed here. Transport concerns (how sessions come into
//! being, how bytes reach the remote end) live behind `register_session`
//! and the per-session input queue.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

/// Local numeric session handle, assigned at registration time
pub type SessionId = u32;

/// One live remote session, as seen by the console
#[derive(Debug, Clone)]
pub struct Session {
    pub local_id: SessionId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    /// Lines forwarded while attached, queued for the transport to drain
    inbox: Vec<String>,
}

impl Session {
    fn new(local_id: SessionId, name: String) -> Self {
        Self {
            local_id,
            name,
            created_at: Utc::now(),
            inbox: Vec::new(),
        }
    }

    /// Input queued for this session and not yet consumed by the transport
    pub fn pending_input(&self) -> &[String] {
        &self.inbox
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "session {} :: {} (since {})",
            self.local_id,
            self.name,
            self.created_at.format("%Y-%m-%d %H:%M:%S UTC")
        )
    }
}

/// Owner of the session collection and the option store
#[derive(Debug, Default)]
pub struct SessionManager {
    sessions: BTreeMap<SessionId, Session>,
    options: BTreeMap<String, String>,
    attached: Option<SessionId>,
    next_id: SessionId,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new session, returning its local id.
    ///
    /// Called by the transport layer when a remote endpoint checks in.
    pub fn register_session(&mut self, name: impl Into<String>) -> SessionId {
        let id = self.next_id;
        self.next_id += 1;
        let session = Session::new(id, name.into());
        info!(id, name = %session.name, "session registered");
        self.sessions.insert(id, session);
        id
    }

    pub fn get_by_local_id(&self, id: SessionId) -> Option<&Session> {
        self.sessions.get(&id)
    }

    /// Mark a session as the attach target for the pass-through layer.
    /// Returns false if the id is unknown.
    pub fn attach_session(&mut self, id: SessionId) -> bool {
        if !self.sessions.contains_key(&id) {
            warn!(id, "attach requested for unknown session");
            return false;
        }
        info!(id, "console attached to session");
        self.attached = Some(id);
        true
    }

    /// Clear the attach target
    pub fn detach(&mut self) {
        if let Some(id) = self.attached.take() {
            info!(id, "console detached from session");
        }
    }

    pub fn attached_session(&self) -> Option<SessionId> {
        self.attached
    }

    /// Tear down a session. Returns false if the id is unknown.
    pub fn kill_session(&mut self, id: SessionId) -> bool {
        match self.sessions.remove(&id) {
            Some(session) => {
                info!(id, name = %session.name, "session killed");
                if self.attached == Some(id) {
                    self.attached = None;
                }
                true
            }
            None => {
                warn!(id, "kill requested for unknown session");
                false
            }
        }
    }

    /// Queue one line of operator input for an attached session.
    /// Returns false if the session no longer exists.
    pub fn forward_input(&mut self, id: SessionId, line: &str) -> bool {
        match self.sessions.get_mut(&id) {
            Some(session) => {
                debug!(id, len = line.len(), "forwarding input to session");
                session.inbox.push(line.to_string());
                true
            }
            None => false,
        }
    }

    pub fn set_option(&mut self, name: &str, value: &str) {
        debug!(name, value, "option set");
        self.options.insert(name.to_string(), value.to_string());
    }

    pub fn option(&self, name: &str) -> Option<&str> {
        self.options.get(name).map(String::as_str)
    }

    /// Visit every option as (name, value), in name order
    pub fn each_option(&self, mut f: impl FnMut(&str, &str)) {
        for (name, value) in &self.options {
            f(name, value);
        }
    }

    /// Visit every live session in local-id order
    pub fn each_session(&self, mut f: impl FnMut(SessionId, &Session)) {
        for (id, session) in &self.sessions {
            f(*id, session);
        }
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}
