use crate::common::{
    FailureKind, InputAction, InputError, MessageOrigin, NetworkCommand, PeerInfo, SendOutcome,
    ServerMessage, SessionEvent, SessionId, parse_input,
};

use super::render::Renderer;
use super::store::{MessageStore, Reconciliation};

/// Kết quả xử lý một dòng nhập.
#[derive(Debug)]
pub enum InputOutcome {
    /// Cần gửi lệnh này xuống tầng mạng.
    Command(NetworkCommand),
    /// Đã xử lý cục bộ (clear, lỗi cú pháp...).
    Handled,
    Quit,
}

/// Trạng thái gắn với một phiên đăng nhập: danh sách tin nhắn, peers và renderer.
///
/// Được tạo khi login thành công và huỷ khi logout; sự kiện mạng mang
/// `SessionId` khác sẽ bị bỏ qua.
pub struct ChatSession<R: Renderer> {
    id: SessionId,
    user: String,
    channel: String,
    store: MessageStore,
    peers: Vec<PeerInfo>,
    renderer: R,
}

impl<R: Renderer> ChatSession<R> {
    pub fn new(id: SessionId, user: impl Into<String>, channel: impl Into<String>, renderer: R) -> Self {
        Self {
            id,
            user: user.into(),
            channel: channel.into(),
            store: MessageStore::new(),
            peers: Vec::new(),
            renderer,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn store(&self) -> &MessageStore {
        &self.store
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Peers khác (đã loại bỏ chính mình).
    pub fn peers(&self) -> impl Iterator<Item = &PeerInfo> {
        self.peers.iter().filter(|peer| peer.peer_id != self.user)
    }

    pub fn peer_ids(&self) -> Vec<String> {
        self.peers().map(|peer| peer.peer_id.clone()).collect()
    }

    /// Hiển thị ngay tin mình vừa gửi (pending). Trả về vị trí trong store.
    pub fn submit_local(&mut self, content: &str) -> Option<usize> {
        let index = self
            .store
            .submit_local(&self.user, content, MessageOrigin::Own)?;
        self.render_new(index);
        Some(index)
    }

    pub fn ingest_server_message(&mut self, message: &ServerMessage) -> Option<Reconciliation> {
        let Some(timestamp) = message.timestamp.clone() else {
            log::debug!("Skipping server message from {} without timestamp", message.sender);
            return None;
        };
        let origin = if message.sender.trim() == self.user {
            MessageOrigin::Own
        } else {
            MessageOrigin::Other
        };

        let result =
            self.store
                .ingest_server_message(&message.sender, &message.content, timestamp, origin);
        match result {
            Reconciliation::Duplicate => {}
            Reconciliation::Merged(index) => {
                if let Some(entry) = self.store.get(index) {
                    if let Some(handle) = entry.render_handle() {
                        self.renderer.update(handle, entry);
                    }
                }
            }
            Reconciliation::Inserted(index) => self.render_new(index),
        }
        Some(result)
    }

    /// Ingest toàn bộ lịch sử theo đúng thứ tự nhận được. Trả về số entry mới.
    pub fn ingest_history(&mut self, messages: &[ServerMessage]) -> usize {
        messages
            .iter()
            .filter_map(|message| self.ingest_server_message(message))
            .filter(|result| matches!(result, Reconciliation::Inserted(_)))
            .count()
    }

    /// Vẽ tin pending rồi dựng lệnh broadcast tương ứng.
    pub fn send_broadcast(&mut self, content: &str) -> Option<NetworkCommand> {
        self.submit_local(content)?;
        Some(NetworkCommand::Broadcast {
            session: self.id,
            from_peer: self.user.clone(),
            content: content.trim().to_string(),
        })
    }

    pub fn send_direct(&mut self, to_peer: &str, content: &str) -> Option<NetworkCommand> {
        self.submit_local(content)?;
        Some(NetworkCommand::Direct {
            session: self.id,
            from_peer: self.user.clone(),
            to_peer: to_peer.to_string(),
            content: content.trim().to_string(),
        })
    }

    /// Xử lý một dòng nhập. `direct_to` là peer đang chọn khi ở chế độ direct.
    pub fn handle_input(&mut self, line: &str, direct_to: Option<&str>) -> InputOutcome {
        let action = match parse_input(line) {
            Ok(action) => action,
            Err(InputError::Empty) => return InputOutcome::Handled,
            Err(err) => {
                self.status(&err.to_string());
                return InputOutcome::Handled;
            }
        };

        let command = match action {
            InputAction::Send(text) => match direct_to {
                Some(peer) => self.send_direct(peer, &text),
                None => self.send_broadcast(&text),
            },
            InputAction::Broadcast(text) => self.send_broadcast(&text),
            InputAction::Direct { to_peer, content } => self.send_direct(&to_peer, &content),
            InputAction::RefreshPeers => Some(NetworkCommand::RefreshPeers { session: self.id }),
            InputAction::ConnectAll => Some(self.connect_all()),
            InputAction::Clear => {
                self.clear();
                None
            }
            InputAction::Quit => return InputOutcome::Quit,
        };

        command.map_or(InputOutcome::Handled, InputOutcome::Command)
    }

    pub fn connect_all(&self) -> NetworkCommand {
        NetworkCommand::ConnectAll {
            session: self.id,
            from_peer: self.user.clone(),
            peers: self.peer_ids(),
        }
    }

    pub fn clear(&mut self) {
        let released = self.store.clear();
        log::debug!("Cleared chat ({} views released)", released.len());
        self.renderer.clear();
        self.renderer.notice("Chat cleared");
    }

    pub fn notice(&mut self, text: &str) {
        self.renderer.notice(text);
    }

    pub fn status(&mut self, text: &str) {
        self.renderer.status(text);
    }

    /// Áp dụng sự kiện mạng nếu nó thuộc về phiên này. Trả về `false` nếu bị bỏ qua.
    pub fn apply(&mut self, session: SessionId, event: SessionEvent) -> bool {
        if session != self.id {
            log::debug!("Ignoring event for stale {session} (active {})", self.id);
            return false;
        }

        match event {
            SessionEvent::PeerRegistered => self.notice("Registered as peer successfully"),
            SessionEvent::History(messages) => {
                let inserted = self.ingest_history(&messages);
                if inserted > 0 {
                    log::debug!("Poll added {inserted} new messages");
                }
            }
            SessionEvent::PeersUpdated(peers) => self.peers = peers,
            SessionEvent::SendFinished(outcome) => {
                let text = match outcome {
                    SendOutcome::Delivered => "Message sent",
                    SendOutcome::Failed { kind, detail } => {
                        log::debug!("Message stays pending: {detail}");
                        match kind {
                            FailureKind::Application => "Failed to send message",
                            FailureKind::Network => "Network error",
                        }
                    }
                };
                self.status(text);
            }
            SessionEvent::PeersConnected { connected, total } => {
                self.notice(&format!("Connected to {connected} out of {total} peers"));
            }
        }
        true
    }

    fn render_new(&mut self, index: usize) {
        if let Some(entry) = self.store.get(index) {
            let handle = self.renderer.create(entry);
            self.store.attach_handle(index, handle);
        }
    }
}
