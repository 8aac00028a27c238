//! Outbound context construction and templated transcript text.

use crate::message::{ConversationLog, Role};
use crate::remote::{ContextMessage, ContextRole, UploadResult};

/// Persona and behavioral constraints sent ahead of every chat context.
pub const SYSTEM_DIRECTIVE: &str = "You are MedeSense, a compassionate wellness companion. \
Listen carefully and respond with warmth, empathy, and encouragement. \
You are not a clinician: never diagnose conditions, prescribe treatments, or recommend \
medication doses, and gently suggest a qualified professional when the user asks for \
medical advice. If the user may be in crisis or danger, urge them to contact local \
emergency services right away. Keep replies concise, usually a few short paragraphs.";

/// User-message content when a document is submitted without text.
pub const DOCUMENT_UPLOADED_LABEL: &str = "Uploaded medical document for processing";

/// The system directive followed by the whole log as role/content pairs.
///
/// The session trims its log to the retention cap after every exchange, so
/// the context holds at most the cap plus the new echo.
#[must_use]
pub fn build_chat_context(log: &ConversationLog) -> Vec<ContextMessage> {
    std::iter::once(ContextMessage::new(ContextRole::System, SYSTEM_DIRECTIVE))
        .chain(log.iter().map(|msg| {
            let role = match msg.role {
                Role::User => ContextRole::User,
                Role::Assistant => ContextRole::Assistant,
            };
            ContextMessage::new(role, msg.content.clone())
        }))
        .collect()
}

/// Transcript confirmation for a processed document.
///
/// Only the display-intended fields of the result are used.
#[must_use]
pub fn upload_confirmation(result: &UploadResult, file_name: &str) -> String {
    format!(
        "**Document Processed Successfully**\n\n\
         **{status}**\n\n\
         File: {file_name}\n\
         PHI De-identified: {phi}\n\
         Document ID: {doc_id}\n\n\
         Your medical document has been securely processed. Personally identifiable \
         health information (PHI) has been removed, and the de-identified content has \
         been added to your secure knowledge base.\n\n\
         You can now ask me questions about your medical records!",
        status = result.status_message,
        phi = if result.phi_deidentified { "Yes" } else { "No" },
        doc_id = result.document_id.as_deref().unwrap_or("N/A"),
    )
}
