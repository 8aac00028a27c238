//! Render-ready projection of session state.

use crate::message::{AttachmentRef, Role};
use crate::session::SessionState;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentChip {
    pub name: String,
    pub size_label: String,
}

impl From<&AttachmentRef> for AttachmentChip {
    fn from(attachment: &AttachmentRef) -> Self {
        Self {
            name: attachment.name.clone(),
            size_label: format_file_size(attachment.size_bytes),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayItem {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub attachments: Vec<AttachmentChip>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewModel {
    /// Transcript in display order.
    pub items: Vec<DisplayItem>,
    pub show_pending_indicator: bool,
    /// Chips for the attachment waiting in the composer.
    pub composer_attachments: Vec<AttachmentChip>,
    /// Whether submit affordances may be enabled.
    pub submit_enabled: bool,
}

impl ViewModel {
    /// No transcript yet; hosts show a welcome screen.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Derive the view for a state snapshot.
#[must_use]
pub fn project(state: &SessionState) -> ViewModel {
    let items = state
        .log()
        .iter()
        .map(|msg| DisplayItem {
            id: msg.id.clone(),
            role: msg.role,
            content: msg.content.clone(),
            created_at: msg.created_at,
            attachments: msg.attachments.iter().map(AttachmentChip::from).collect(),
        })
        .collect();

    ViewModel {
        items,
        show_pending_indicator: state.is_exchange_in_flight(),
        composer_attachments: state
            .pending_attachments()
            .iter()
            .map(AttachmentChip::from)
            .collect(),
        submit_enabled: !state.is_exchange_in_flight(),
    }
}

/// Human-readable size in base-1024 units.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_file_size(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * 1024;

    if bytes < KIB {
        format!("{bytes} B")
    } else if bytes < MIB {
        format!("{:.1} KB", bytes as f64 / KIB as f64)
    } else {
        format!("{:.1} MB", bytes as f64 / MIB as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{ConversationLog, Message};

    fn attachment(name: &str, size_bytes: u64) -> AttachmentRef {
        AttachmentRef {
            name: name.into(),
            size_bytes,
            mime_type: "application/pdf".into(),
            remote_url: None,
        }
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(1023), "1023 B");
        assert_eq!(format_file_size(1024), "1.0 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(1024 * 1024 - 1), "1024.0 KB");
        assert_eq!(format_file_size(1024 * 1024), "1.0 MB");
        assert_eq!(format_file_size(10 * 1024 * 1024), "10.0 MB");
    }

    #[test]
    fn test_empty_state() {
        let view = project(&SessionState::default());
        assert!(view.is_empty());
        assert!(!view.show_pending_indicator);
        assert!(view.submit_enabled);
    }

    #[test]
    fn test_items_follow_log() {
        let log: ConversationLog = vec![
            Message::user("see attached").with_attachments(vec![attachment("labs.pdf", 2048)]),
            Message::assistant("thanks"),
        ]
        .into();
        let state = SessionState {
            log: log.clone(),
            pending_attachment: Some(attachment("next.pdf", 10)),
            exchange_in_flight: true,
        };

        let view = project(&state);
        assert_eq!(view.items.len(), 2);
        assert_eq!(view.items[0].id, log.as_slice()[0].id);
        assert_eq!(
            view.items[0].attachments,
            vec![AttachmentChip {
                name: "labs.pdf".into(),
                size_label: "2.0 KB".into()
            }]
        );
        assert!(view.items[1].attachments.is_empty());
        assert_eq!(view.composer_attachments[0].size_label, "10 B");
        assert!(view.show_pending_indicator);
        assert!(!view.submit_enabled);
    }

    #[test]
    fn test_projection_is_deterministic() {
        let state = SessionState {
            log: vec![Message::user("a")].into(),
            ..SessionState::default()
        };
        assert_eq!(project(&state), project(&state));
    }
}
