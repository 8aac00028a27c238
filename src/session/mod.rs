//! Conversation session state machine.
//!
//! A session is `Idle` or `Exchanging`. [`ConversationSession::begin_submit`]
//! moves it to `Exchanging` and hands back the request to send;
//! [`ConversationSession::complete`] merges the outcome, returns to `Idle`,
//! and persists the log. [`ConversationSession::submit`] drives both against
//! a [`RemoteExchange`].

mod prompt;
mod state;

pub use prompt::{DOCUMENT_UPLOADED_LABEL, SYSTEM_DIRECTIVE, build_chat_context, upload_confirmation};
pub use state::SessionState;

use crate::attachment::StagedDocument;
use crate::history::{HistoryError, PersistedHistoryStore, RETENTION_CAP};
use crate::message::{ConversationLog, Message};
use crate::remote::{AssistantReply, ContextMessage, ExchangeError, RemoteExchange, UploadResult};
use tokio::sync::watch;
use tracing::{debug, warn};

/// Request produced by a successful `begin_submit`.
///
/// A document submission carries no conversational context.
#[derive(Debug, Clone)]
pub enum OutboundRequest {
    Chat(Vec<ContextMessage>),
    Document(StagedDocument),
}

impl OutboundRequest {
    /// Send this request. Exactly one remote call is made.
    pub async fn dispatch(
        &self,
        remote: &dyn RemoteExchange,
    ) -> Result<ExchangeReply, ExchangeError> {
        match self {
            Self::Chat(context) => remote.exchange_chat(context).await.map(ExchangeReply::Chat),
            Self::Document(doc) => remote
                .exchange_document(doc.bytes(), doc.mime_type())
                .await
                .map(ExchangeReply::Document),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeReply {
    Chat(AssistantReply),
    Document(UploadResult),
}

pub type ExchangeOutcome = Result<ExchangeReply, ExchangeError>;

/// What the outstanding exchange was for.
#[derive(Debug)]
enum InFlight {
    Chat,
    Document { file_name: String },
}

pub struct ConversationSession {
    user_id: String,
    state: SessionState,
    staged: Option<StagedDocument>,
    in_flight: Option<InFlight>,
    store: PersistedHistoryStore,
    notifier: watch::Sender<SessionState>,
}

impl ConversationSession {
    /// Start a session for a confirmed identity, hydrated from its history.
    pub fn open(user_id: impl Into<String>, store: PersistedHistoryStore) -> Self {
        let user_id = user_id.into();
        let state = SessionState::hydrated(store.load(&user_id));
        debug!(user_id = %user_id, messages = state.log.len(), "Session opened");

        let (notifier, _) = watch::channel(state.clone());
        Self {
            user_id,
            state,
            staged: None,
            in_flight: None,
            store,
            notifier,
        }
    }

    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub fn log(&self) -> &ConversationLog {
        &self.state.log
    }

    #[must_use]
    pub fn is_exchange_in_flight(&self) -> bool {
        self.state.exchange_in_flight
    }

    /// Receive a snapshot after every state transition.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.notifier.subscribe()
    }

    fn publish(&self) {
        self.notifier.send_replace(self.state.clone());
    }

    /// Set the single pending attachment, replacing any previous one.
    ///
    /// Refused while an exchange is in flight.
    pub fn attach(&mut self, document: StagedDocument) -> bool {
        if self.state.exchange_in_flight {
            return false;
        }
        self.state.pending_attachment = Some(document.attachment().clone());
        self.staged = Some(document);
        self.publish();
        true
    }

    /// Drop the pending attachment, if any.
    pub fn detach(&mut self) {
        let had_pending = self.state.pending_attachment.take().is_some();
        self.staged = None;
        if had_pending {
            self.publish();
        }
    }

    /// Echo the user's input and enter `Exchanging`.
    ///
    /// `attachment` falls back to the pending attachment. Returns `None`
    /// without touching state when an exchange is already in flight or there
    /// is neither text nor an attachment.
    pub fn begin_submit(
        &mut self,
        text: &str,
        attachment: Option<StagedDocument>,
    ) -> Option<OutboundRequest> {
        if self.state.exchange_in_flight {
            debug!(user_id = %self.user_id, "Submit ignored: exchange in flight");
            return None;
        }

        let text = text.trim();
        if text.is_empty() && attachment.is_none() && self.staged.is_none() {
            return None;
        }

        let document = attachment.or_else(|| self.staged.take());
        self.staged = None;
        self.state.pending_attachment = None;

        let content = if text.is_empty() {
            DOCUMENT_UPLOADED_LABEL
        } else {
            text
        };
        let attachments = document
            .as_ref()
            .map(|doc| vec![doc.attachment().clone()])
            .unwrap_or_default();
        self.state
            .log
            .push(Message::user(content).with_attachments(attachments));

        // Attachment takes priority over text
        let (request, in_flight) = match document {
            Some(doc) => {
                let file_name = doc.attachment().name.clone();
                (OutboundRequest::Document(doc), InFlight::Document { file_name })
            }
            None => (
                OutboundRequest::Chat(build_chat_context(&self.state.log)),
                InFlight::Chat,
            ),
        };

        debug!(user_id = %self.user_id, kind = ?in_flight, "Exchange started");
        self.in_flight = Some(in_flight);
        self.state.exchange_in_flight = true;
        self.publish();
        Some(request)
    }

    /// Merge the outcome of the outstanding exchange and return to `Idle`.
    ///
    /// Appends exactly one assistant message, trims the log to the retention
    /// cap, releases the guard, and writes the updated log. Returns false if
    /// no exchange was outstanding.
    pub fn complete(&mut self, outcome: ExchangeOutcome) -> bool {
        let Some(in_flight) = self.in_flight.take() else {
            warn!(user_id = %self.user_id, "Exchange outcome with nothing in flight");
            return false;
        };

        let content = match outcome {
            Ok(ExchangeReply::Chat(reply)) => reply.content,
            Ok(ExchangeReply::Document(result)) => {
                let file_name = match &in_flight {
                    InFlight::Document { file_name } => file_name.as_str(),
                    InFlight::Chat => "document",
                };
                upload_confirmation(&result, file_name)
            }
            Err(e) => {
                warn!(user_id = %self.user_id, error = %e, "Exchange failed");
                e.user_message()
            }
        };

        self.state.log.push(Message::assistant(content));
        self.state.log.retain_last(RETENTION_CAP);
        self.state.exchange_in_flight = false;
        self.persist();
        self.publish();
        true
    }

    /// Run a full exchange: echo, one remote call, merge, persist.
    ///
    /// Returns `None` if the submission was ignored.
    pub async fn submit(
        &mut self,
        remote: &dyn RemoteExchange,
        text: &str,
        attachment: Option<StagedDocument>,
    ) -> Option<ExchangeOutcome> {
        let request = self.begin_submit(text, attachment)?;
        let outcome = request.dispatch(remote).await;
        self.complete(outcome.clone());
        Some(outcome)
    }

    /// Forget this user's history, in memory and in storage.
    ///
    /// Refused while an exchange is in flight.
    pub fn clear_history(&mut self) -> Result<bool, HistoryError> {
        if self.state.exchange_in_flight {
            return Ok(false);
        }
        self.store.clear(&self.user_id)?;
        self.state.log = ConversationLog::new();
        self.publish();
        Ok(true)
    }

    /// Discard the session on logout or identity loss.
    pub fn end(self) {
        debug!(user_id = %self.user_id, "Session ended");
    }

    fn persist(&self) {
        if let Err(e) = self.store.save(&self.user_id, &self.state.log) {
            warn!(user_id = %self.user_id, error = %e, "Failed to persist history");
        }
    }
}
