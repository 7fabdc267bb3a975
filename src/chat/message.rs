use chrono::{DateTime, Local, NaiveDateTime};

use crate::common::{MessageOrigin, ServerTimestamp};

use super::render::RenderHandle;

const UNKNOWN_SENDER: &str = "Unknown";

/// Trạng thái giao nhận của một tin nhắn hiển thị.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Vừa tạo cục bộ, chưa có bản chính thức từ server.
    Pending,
    Confirmed(ServerTimestamp),
}

/// Một dòng trong khung chat, do reconciler quản lý.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayedMessage {
    pub(super) sender: String,
    pub(super) content: String,
    pub(super) delivery: Delivery,
    pub(super) origin: MessageOrigin,
    pub(super) render_handle: Option<RenderHandle>,
}

impl DisplayedMessage {
    pub(super) fn pending(sender: &str, content: &str, origin: MessageOrigin) -> Self {
        Self {
            sender: normalize_sender(sender),
            content: normalize_content(content),
            delivery: Delivery::Pending,
            origin,
            render_handle: None,
        }
    }

    pub(super) fn confirmed(
        sender: &str,
        content: &str,
        timestamp: ServerTimestamp,
        origin: MessageOrigin,
    ) -> Self {
        Self {
            sender: normalize_sender(sender),
            content: normalize_content(content),
            delivery: Delivery::Confirmed(timestamp),
            origin,
            render_handle: None,
        }
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn origin(&self) -> MessageOrigin {
        self.origin
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.delivery, Delivery::Pending)
    }

    pub fn timestamp(&self) -> Option<&ServerTimestamp> {
        match &self.delivery {
            Delivery::Pending => None,
            Delivery::Confirmed(timestamp) => Some(timestamp),
        }
    }

    pub fn render_handle(&self) -> Option<RenderHandle> {
        self.render_handle
    }

    /// Giờ hiển thị: giờ server nếu đã xác nhận, giờ máy nếu còn pending.
    pub fn display_time(&self) -> String {
        match self.timestamp() {
            Some(timestamp) => format_server_time(timestamp),
            None => Local::now().format("%H:%M:%S").to_string(),
        }
    }

    pub(super) fn matches_pending(&self, sender: &str, content: &str) -> bool {
        self.is_pending() && self.sender == sender && self.content == content
    }

    pub(super) fn confirm(&mut self, timestamp: ServerTimestamp) {
        debug_assert!(self.is_pending(), "confirmed entries are never merged again");
        self.delivery = Delivery::Confirmed(timestamp);
    }
}

pub fn normalize_sender(sender: &str) -> String {
    let trimmed = sender.trim();
    if trimmed.is_empty() {
        UNKNOWN_SENDER.to_string()
    } else {
        trimmed.to_string()
    }
}

pub fn normalize_content(content: &str) -> String {
    content.trim().to_string()
}

/// Đổi timestamp server sang HH:MM:SS. Giữ nguyên chuỗi gốc nếu không parse được.
pub fn format_server_time(timestamp: &ServerTimestamp) -> String {
    let raw = timestamp.as_str();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed.with_timezone(&Local).format("%H:%M:%S").to_string();
    }
    // datetime.isoformat() không kèm timezone
    if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return parsed.format("%H:%M:%S").to_string();
    }
    if let Ok(millis) = raw.parse::<i64>() {
        if let Some(parsed) = DateTime::from_timestamp_millis(millis) {
            return parsed.with_timezone(&Local).format("%H:%M:%S").to_string();
        }
    }
    raw.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_trims_and_defaults_sender() {
        assert_eq!(normalize_sender("  alice "), "alice");
        assert_eq!(normalize_sender("   "), "Unknown");
        assert_eq!(normalize_content("\thi there \n"), "hi there");
    }

    #[test]
    fn naive_iso_timestamp_formats_as_clock() {
        let ts = ServerTimestamp::new("2025-11-02T10:20:30.123456");
        assert_eq!(format_server_time(&ts), "10:20:30");
    }

    #[test]
    fn unparseable_timestamp_is_shown_verbatim() {
        let ts = ServerTimestamp::new("yesterday");
        assert_eq!(format_server_time(&ts), "yesterday");
    }

    #[test]
    fn confirm_moves_out_of_pending() {
        let mut message = DisplayedMessage::pending("alice", "hi", MessageOrigin::Own);
        assert!(message.is_pending());
        assert_eq!(message.timestamp(), None);

        message.confirm(ServerTimestamp::new("t1"));
        assert!(!message.is_pending());
        assert_eq!(message.timestamp().map(|ts| ts.as_str()), Some("t1"));
    }
}
