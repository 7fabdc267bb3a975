use chrono::{DateTime, Duration, Utc};

use crate::chat::{DisplayedMessage, RenderHandle, Renderer};
use crate::common::MessageOrigin;

const STATUS_TTL_SECS: i64 = 3;

/// Một đoạn text chỉ hiển thị trong khoảng thời gian giới hạn.
#[derive(Debug, Clone)]
pub struct TransientText {
    pub text: String,
    pub shown_at: DateTime<Utc>,
}

impl TransientText {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            shown_at: Utc::now(),
        }
    }

    pub fn visible_at(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now.signed_duration_since(self.shown_at) < ttl
    }
}

/// Một dòng trong khung chat egui.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRow {
    /// `None` với thông báo hệ thống.
    pub handle: Option<RenderHandle>,
    pub sender: Option<String>,
    pub content: String,
    pub time: String,
    pub origin: MessageOrigin,
    pub pending: bool,
}

impl MessageRow {
    fn from_message(handle: RenderHandle, message: &DisplayedMessage) -> Self {
        Self {
            handle: Some(handle),
            sender: Some(message.sender().to_string()),
            content: message.content().to_string(),
            time: message.display_time(),
            origin: message.origin(),
            pending: message.is_pending(),
        }
    }
}

/// Renderer cho egui: giữ các dòng theo thứ tự hiển thị, cập nhật tại chỗ theo handle.
#[derive(Debug, Default)]
pub struct TimelineView {
    rows: Vec<MessageRow>,
    next_handle: u64,
    status: Option<TransientText>,
}

impl TimelineView {
    pub fn rows(&self) -> &[MessageRow] {
        &self.rows
    }

    pub fn status_text(&self, now: DateTime<Utc>) -> Option<&str> {
        self.status
            .as_ref()
            .filter(|status| status.visible_at(now, Duration::seconds(STATUS_TTL_SECS)))
            .map(|status| status.text.as_str())
    }
}

impl Renderer for TimelineView {
    fn create(&mut self, message: &DisplayedMessage) -> RenderHandle {
        self.next_handle += 1;
        let handle = RenderHandle(self.next_handle);
        self.rows.push(MessageRow::from_message(handle, message));
        handle
    }

    fn update(&mut self, handle: RenderHandle, message: &DisplayedMessage) {
        match self.rows.iter_mut().find(|row| row.handle == Some(handle)) {
            Some(row) => {
                row.pending = message.is_pending();
                row.time = message.display_time();
            }
            None => log::warn!("Render handle {handle:?} not found; view already cleared?"),
        }
    }

    fn clear(&mut self) {
        self.rows.clear();
    }

    fn notice(&mut self, text: &str) {
        self.rows.push(MessageRow {
            handle: None,
            sender: None,
            content: text.to_string(),
            time: chrono::Local::now().format("%H:%M:%S").to_string(),
            origin: MessageOrigin::System,
            pending: false,
        });
    }

    fn status(&mut self, text: &str) {
        self.status = Some(TransientText::new(text));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::ChatSession;
    use crate::common::{ServerMessage, ServerTimestamp, SessionEvent, SessionId};

    #[test]
    fn merged_row_loses_pending_style_in_place() {
        let mut session = ChatSession::new(SessionId(1), "alice", "general", TimelineView::default());
        session.notice("Welcome alice!");
        session.submit_local("hi");
        session.apply(
            SessionId(1),
            SessionEvent::History(vec![
                ServerMessage {
                    sender: "bob".to_string(),
                    content: "earlier".to_string(),
                    timestamp: Some(ServerTimestamp::new("2025-11-02T09:59:00")),
                    channel: None,
                },
                ServerMessage {
                    sender: "alice".to_string(),
                    content: "hi".to_string(),
                    timestamp: Some(ServerTimestamp::new("2025-11-02T10:00:00")),
                    channel: None,
                },
            ]),
        );

        let rows = session.renderer().rows();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].origin, MessageOrigin::System);
        // Tin của mình giữ vị trí cũ, chỉ đổi style và giờ.
        assert_eq!(rows[1].content, "hi");
        assert!(!rows[1].pending);
        assert_eq!(rows[1].time, "10:00:00");
        assert_eq!(rows[2].content, "earlier");
    }

    #[test]
    fn status_expires_after_ttl() {
        let mut view = TimelineView::default();
        view.status("Message sent");

        let now = Utc::now();
        assert_eq!(view.status_text(now), Some("Message sent"));
        assert_eq!(view.status_text(now + Duration::seconds(4)), None);
    }
}
