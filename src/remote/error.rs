//! Exchange failure taxonomy.

use thiserror::Error;

/// Longest backend reason carried into a transcript message.
const MAX_REASON_CHARS: usize = 300;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExchangeError {
    /// No usable credential, or the backend refused the one we sent.
    #[error("Not authenticated")]
    Unauthenticated,

    /// The backend answered with a non-success status.
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// The backend could not be reached.
    #[error("Service unreachable: {0}")]
    Unreachable(String),
}

impl ExchangeError {
    /// Transcript-safe description of the failure.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthenticated => "**Your session has expired**\n\n\
                 Please sign in again to continue our conversation."
                .to_string(),
            Self::Rejected(reason) => format!(
                "**I couldn't process that request**\n\n{}\n\n\
                 If you attached a document, check that it is a JPEG, PNG, PDF, \
                 or TIFF file under 10MB.",
                truncate(reason)
            ),
            Self::Unreachable(_) => "**I couldn't reach the service**\n\n\
                 Please check your internet connection and try again."
                .to_string(),
        }
    }
}

fn truncate(reason: &str) -> String {
    if reason.chars().count() > MAX_REASON_CHARS {
        format!("{}...", reason.chars().take(MAX_REASON_CHARS).collect::<String>())
    } else {
        reason.to_string()
    }
}

/// Human-readable reason from a failed response body.
///
/// Handles the shapes the backend produces:
/// - `{"detail": "..."}` (most routes)
/// - `{"detail": [{"msg": "..."}]}` (request validation)
/// - `{"error": "..."}` or `{"error": {"message": "..."}}`
/// - `{"message": "..."}`
///
/// Anything else yields a generic reason naming only the status. The raw
/// body never ends up in the reason, since it reaches the transcript.
#[must_use]
pub fn rejection_reason(status: u16, body: &str) -> String {
    let body = body.trim();
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body)
        && let Some(msg) = extract_error_message(&json)
    {
        return msg;
    }

    format!("The service could not complete the request (HTTP {status})")
}

fn extract_error_message(json: &serde_json::Value) -> Option<String> {
    if let Some(detail) = json.get("detail") {
        if let Some(msg) = detail.as_str() {
            return Some(msg.to_string());
        }
        if let Some(items) = detail.as_array() {
            let msgs: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                .collect();
            if !msgs.is_empty() {
                return Some(msgs.join("; "));
            }
        }
    }

    if let Some(error_obj) = json.get("error") {
        if let Some(msg) = error_obj.as_str() {
            return Some(msg.to_string());
        }
        if let Some(msg) = error_obj.get("message").and_then(|v| v.as_str()) {
            return Some(msg.to_string());
        }
    }

    json.get("message")
        .and_then(|v| v.as_str())
        .map(str::to_string)
}
