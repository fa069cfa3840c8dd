//! Attachment state machine
//!
//! Tracks whether the console is in command mode or piped through to one
//! session. The state holds only the session's local id, never the session
//! itself, so teardown elsewhere cannot leave a dangling reference here.

use tracing::debug;

use crate::session::SessionId;

/// Console-lifetime oscillation between command mode and pass-through mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttachmentState {
    #[default]
    Detached,
    Attached(SessionId),
}

impl AttachmentState {
    pub fn is_attached(&self) -> bool {
        matches!(self, AttachmentState::Attached(_))
    }

    /// Local id of the attached session, if any
    pub fn attached_id(&self) -> Option<SessionId> {
        match self {
            AttachmentState::Attached(id) => Some(*id),
            AttachmentState::Detached => None,
        }
    }

    /// Bind the console to a session. The caller must have resolved the id
    /// through the session manager first.
    pub fn attach(&mut self, id: SessionId) {
        debug!(id, "attachment state -> attached");
        *self = AttachmentState::Attached(id);
    }

    /// Return to command mode, yielding the previously attached id
    pub fn detach(&mut self) -> Option<SessionId> {
        let previous = self.attached_id();
        if let Some(id) = previous {
            debug!(id, "attachment state -> detached");
        }
        *self = AttachmentState::Detached;
        previous
    }
}
