//! Typed request and response shapes for the backend.
//!
//! Wire structs are private to the client; only the parsed results below
//! cross the boundary.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ContextRole {
    System,
    User,
    Assistant,
}

/// One entry of the chat context sent to the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContextMessage {
    pub role: ContextRole,
    pub content: String,
}

impl ContextMessage {
    pub fn new(role: ContextRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Successful chat exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantReply {
    pub content: String,
    pub model: Option<String>,
    pub usage: TokenUsage,
    /// Whether the backend enriched the answer from the user's documents.
    pub memory_enabled: bool,
}

/// Successful document upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    pub status_message: String,
    pub phi_deidentified: bool,
    pub document_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatBody<'a> {
    pub messages: &'a [ContextMessage],
    pub model: &'a str,
    pub max_tokens: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatResponseBody {
    pub content: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub usage: TokenUsage,
    #[serde(default)]
    pub memory_enabled: bool,
}

impl From<ChatResponseBody> for AssistantReply {
    fn from(body: ChatResponseBody) -> Self {
        Self {
            content: body.content,
            model: body.model,
            usage: body.usage,
            memory_enabled: body.memory_enabled,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct DocumentBody<'a> {
    pub image_base64: String,
    pub mime_type: &'a str,
}

/// The backend also returns a free-form `details` object; it is ignored.
#[derive(Debug, Deserialize)]
pub(crate) struct DocumentResponseBody {
    pub message: String,
    #[serde(default)]
    pub de_identified_text_uploaded: bool,
    #[serde(default)]
    pub supermemory_document_id: Option<String>,
}

impl From<DocumentResponseBody> for UploadResult {
    fn from(body: DocumentResponseBody) -> Self {
        Self {
            status_message: body.message,
            phi_deidentified: body.de_identified_text_uploaded,
            document_id: body.supermemory_document_id.filter(|id| !id.is_empty()),
        }
    }
}
