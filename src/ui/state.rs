use chrono::{DateTime, Utc};

use crate::chat::ChatSession;

use super::timeline::{TimelineView, TransientText};

/// Debug event để hiển thị thông tin mạng
#[derive(Debug, Clone)]
pub struct DebugEvent {
    pub timestamp: DateTime<Utc>,
    pub event_type: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendMode {
    Broadcast,
    Direct,
}

/// Trạng thái cục bộ của UI.
pub struct AppState {
    pub channel: String,
    pub username_input: String,
    pub password_input: String,
    pub login_error: Option<TransientText>,
    pub login_in_flight: bool,
    /// Phiên đang hoạt động; `None` khi ở màn hình login.
    pub session: Option<ChatSession<TimelineView>>,
    pub input_text: String,
    pub send_mode: SendMode,
    pub target_peer: Option<String>,
    pub debug_events: Vec<DebugEvent>,
}

impl AppState {
    pub fn new(channel: String, last_username: Option<String>) -> Self {
        Self {
            channel,
            username_input: last_username.unwrap_or_default(),
            password_input: String::new(),
            login_error: None,
            login_in_flight: false,
            session: None,
            input_text: String::new(),
            send_mode: SendMode::Broadcast,
            target_peer: None,
            debug_events: Vec::new(),
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_some()
    }

    /// Chọn peer để nhắn trực tiếp (click trong sidebar).
    pub fn select_direct_target(&mut self, peer_id: String) {
        self.send_mode = SendMode::Direct;
        self.target_peer = Some(peer_id);
    }

    /// Quay về màn hình login; username vẫn được giữ để đăng nhập lại.
    pub fn reset_after_logout(&mut self) {
        self.session = None;
        self.password_input.clear();
        self.input_text.clear();
        self.login_error = None;
        self.login_in_flight = false;
        self.send_mode = SendMode::Broadcast;
        self.target_peer = None;
    }

    pub fn add_debug_event(&mut self, event_type: &str, message: String) {
        self.debug_events.push(DebugEvent {
            timestamp: Utc::now(),
            event_type: event_type.to_string(),
            message,
        });

        // Giữ tối đa 100 events để không chiếm quá nhiều bộ nhớ
        if self.debug_events.len() > 100 {
            self.debug_events.remove(0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::SessionId;

    #[test]
    fn logout_drops_session_and_direct_target() {
        let mut state = AppState::new("general".to_string(), Some("alice".to_string()));
        state.session = Some(ChatSession::new(
            SessionId(1),
            "alice",
            "general",
            TimelineView::default(),
        ));
        state.select_direct_target("bob".to_string());

        state.reset_after_logout();

        assert!(!state.is_logged_in());
        assert_eq!(state.send_mode, SendMode::Broadcast);
        assert_eq!(state.target_peer, None);
        assert_eq!(state.username_input, "alice");
    }

    #[test]
    fn debug_events_are_capped() {
        let mut state = AppState::new("general".to_string(), None);
        for i in 0..120 {
            state.add_debug_event("POLL", format!("event {i}"));
        }
        assert_eq!(state.debug_events.len(), 100);
        assert_eq!(state.debug_events[0].message, "event 20");
    }
}
