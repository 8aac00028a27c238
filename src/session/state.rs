//! Published conversation snapshot.

use crate::message::{AttachmentRef, ConversationLog};

/// Immutable snapshot of a conversation, published after every transition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub(crate) log: ConversationLog,
    pub(crate) pending_attachment: Option<AttachmentRef>,
    pub(crate) exchange_in_flight: bool,
}

impl SessionState {
    pub(crate) fn hydrated(log: ConversationLog) -> Self {
        Self {
            log,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    /// Attachments waiting to go out with the next submission (at most one).
    #[must_use]
    pub fn pending_attachments(&self) -> &[AttachmentRef] {
        self.pending_attachment.as_slice()
    }

    /// True while exactly one exchange is outstanding. Submission is refused
    /// until it clears.
    #[must_use]
    pub fn is_exchange_in_flight(&self) -> bool {
        self.exchange_in_flight
    }
}
