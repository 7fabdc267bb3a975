use super::types::{PeerInfo, SendOutcome, ServerMessage, SessionId};

/// Sự kiện từ tầng mạng gửi lên UI.
#[derive(Debug, Clone)]
pub enum NetworkEvent {
    LoggedIn {
        session: SessionId,
        username: String,
    },
    LoginFailed(String),
    /// Sự kiện gắn với một phiên; UI bỏ qua nếu phiên đã kết thúc.
    Session {
        session: SessionId,
        event: SessionEvent,
    },
}

#[derive(Debug, Clone)]
pub enum SessionEvent {
    PeerRegistered,
    History(Vec<ServerMessage>),
    PeersUpdated(Vec<PeerInfo>),
    SendFinished(SendOutcome),
    PeersConnected { connected: usize, total: usize },
}

impl NetworkEvent {
    pub fn session(session: SessionId, event: SessionEvent) -> Self {
        Self::Session { session, event }
    }
}
