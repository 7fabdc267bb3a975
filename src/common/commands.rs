use super::types::SessionId;

/// Lệnh UI gửi xuống tầng mạng.
#[derive(Debug, Clone)]
pub enum NetworkCommand {
    Login {
        username: String,
        password: String,
    },
    /// Dừng poller của phiên hiện tại. Request đang bay không bị huỷ.
    Logout,
    /// Gửi tin tới toàn kênh (POST /broadcast-peer)
    Broadcast {
        session: SessionId,
        from_peer: String,
        content: String,
    },
    /// Gửi tin trực tiếp (POST /send-peer)
    Direct {
        session: SessionId,
        from_peer: String,
        to_peer: String,
        content: String,
    },
    RefreshPeers {
        session: SessionId,
    },
    /// Connect tới từng peer trong danh sách (POST /connect-peer)
    ConnectAll {
        session: SessionId,
        from_peer: String,
        peers: Vec<String>,
    },
}
