use std::ops::Range;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::mpsc;
use rand::Rng;

use crate::common::{
    NetworkCommand, NetworkEvent, SendOutcome, SessionEvent, SessionId,
};

use super::api::TrackerApi;
use super::poller::{PollHandle, spawn_poller};
use super::transport::{ApiError, Transport};

const PEER_PORT_RANGE: Range<u16> = 50000..60000;
const LOGIN_NETWORK_ERROR: &str = "Network error. Please try again.";

/// Thông số cố định cho tầng mạng, lấy từ config.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub channel: String,
    pub poll_interval: Duration,
    /// IP khai báo với tracker khi đăng ký peer (host của server).
    pub advertised_ip: String,
}

/// Task mạng: nhận lệnh từ UI, gọi tracker, đẩy sự kiện ngược lên.
pub struct TrackerClient<T: Transport> {
    api: TrackerApi<T>,
    settings: ClientSettings,
    event_sender: mpsc::Sender<NetworkEvent>,
    command_receiver: mpsc::Receiver<NetworkCommand>,
    next_session: u64,
    poller: Option<PollHandle>,
}

impl<T: Transport> TrackerClient<T> {
    pub fn new(
        api: TrackerApi<T>,
        settings: ClientSettings,
        event_sender: mpsc::Sender<NetworkEvent>,
        command_receiver: mpsc::Receiver<NetworkCommand>,
    ) -> Self {
        Self {
            api,
            settings,
            event_sender,
            command_receiver,
            next_session: 0,
            poller: None,
        }
    }

    pub async fn run(mut self) {
        log::info!("Network event loop started");

        while let Some(command) = self.command_receiver.recv().await {
            self.handle_command(command).await;
        }

        self.stop_poller();
        log::info!("Command channel closed; network event loop stopped");
    }

    async fn handle_command(&mut self, command: NetworkCommand) {
        match command {
            NetworkCommand::Login { username, password } => {
                self.handle_login(username, password).await;
            }
            NetworkCommand::Logout => self.stop_poller(),
            NetworkCommand::Broadcast {
                session,
                from_peer,
                content,
            } => {
                let api = self.api.clone();
                let events = self.event_sender.clone();
                let channel = self.settings.channel.clone();
                tokio::spawn(async move {
                    let result = api.broadcast(&from_peer, &content, &channel).await;
                    report_send(&events, session, result).await;
                });
            }
            NetworkCommand::Direct {
                session,
                from_peer,
                to_peer,
                content,
            } => {
                let api = self.api.clone();
                let events = self.event_sender.clone();
                tokio::spawn(async move {
                    let result = api.send_peer(&from_peer, &to_peer, &content).await;
                    report_send(&events, session, result).await;
                });
            }
            NetworkCommand::RefreshPeers { session } => {
                let api = self.api.clone();
                let events = self.event_sender.clone();
                tokio::spawn(async move {
                    match api.get_list().await {
                        Ok(peers) => {
                            emit(&events, NetworkEvent::session(session, SessionEvent::PeersUpdated(peers)))
                                .await;
                        }
                        Err(err) => log::warn!("Refresh peers failed: {err}"),
                    }
                });
            }
            NetworkCommand::ConnectAll {
                session,
                from_peer,
                peers,
            } => {
                let api = self.api.clone();
                let events = self.event_sender.clone();
                tokio::spawn(async move {
                    let total = peers.len();
                    let results =
                        join_all(peers.iter().map(|peer| api.connect_peer(&from_peer, peer))).await;
                    let connected = results
                        .into_iter()
                        .zip(&peers)
                        .filter(|(result, peer)| match result {
                            Ok(()) => true,
                            Err(err) => {
                                log::warn!("Connect to {peer} failed: {err}");
                                false
                            }
                        })
                        .count();
                    emit(
                        &events,
                        NetworkEvent::session(
                            session,
                            SessionEvent::PeersConnected { connected, total },
                        ),
                    )
                    .await;
                });
            }
        }
    }

    async fn handle_login(&mut self, username: String, password: String) {
        let username = username.trim().to_string();
        self.stop_poller();

        match self.api.login(&username, &password).await {
            Ok(message) => log::info!("Logged in as {username}: {message}"),
            Err(ApiError::Application(message)) => {
                log::warn!("Login rejected for {username}: {message}");
                emit(&self.event_sender, NetworkEvent::LoginFailed(message)).await;
                return;
            }
            Err(err) => {
                log::warn!("Login request failed: {err}");
                emit(
                    &self.event_sender,
                    NetworkEvent::LoginFailed(LOGIN_NETWORK_ERROR.to_string()),
                )
                .await;
                return;
            }
        }

        self.next_session += 1;
        let session = SessionId(self.next_session);
        emit(
            &self.event_sender,
            NetworkEvent::LoggedIn {
                session,
                username: username.clone(),
            },
        )
        .await;

        let port = random_peer_port();
        match self
            .api
            .submit_info(&username, &self.settings.advertised_ip, port)
            .await
        {
            Ok(()) => {
                log::info!(
                    "Registered {username} as peer at {}:{port}",
                    self.settings.advertised_ip
                );
                emit(
                    &self.event_sender,
                    NetworkEvent::session(session, SessionEvent::PeerRegistered),
                )
                .await;
            }
            Err(err) => log::warn!("Peer registration failed: {err}"),
        }

        self.poller = Some(spawn_poller(
            self.api.clone(),
            session,
            self.settings.channel.clone(),
            self.settings.poll_interval,
            self.event_sender.clone(),
        ));
    }

    fn stop_poller(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.cancel();
        }
    }
}

async fn report_send(
    events: &mpsc::Sender<NetworkEvent>,
    session: SessionId,
    result: Result<(), ApiError>,
) {
    let outcome = match result {
        Ok(()) => SendOutcome::Delivered,
        Err(err) => {
            log::warn!("Send failed: {err}");
            SendOutcome::Failed {
                kind: err.kind(),
                detail: err.to_string(),
            }
        }
    };
    emit(
        events,
        NetworkEvent::session(session, SessionEvent::SendFinished(outcome)),
    )
    .await;
}

async fn emit(events: &mpsc::Sender<NetworkEvent>, event: NetworkEvent) {
    if let Err(err) = events.send(event).await {
        log::warn!("Failed to deliver network event to UI: {err}");
    }
}

fn random_peer_port() -> u16 {
    rand::thread_rng().gen_range(PEER_PORT_RANGE)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::common::FailureKind;
    use crate::network::api::tests::FakeTransport;

    fn start(transport: FakeTransport) -> (mpsc::Sender<NetworkCommand>, mpsc::Receiver<NetworkEvent>) {
        let (cmd_tx, cmd_rx) = mpsc::channel(16);
        let (event_tx, event_rx) = mpsc::channel(16);
        let settings = ClientSettings {
            channel: "general".to_string(),
            poll_interval: Duration::from_secs(60),
            advertised_ip: "127.0.0.1".to_string(),
        };
        let client = TrackerClient::new(TrackerApi::new(transport), settings, event_tx, cmd_rx);
        tokio::spawn(client.run());
        (cmd_tx, event_rx)
    }

    fn logged_in_transport() -> FakeTransport {
        let transport = FakeTransport::default();
        transport.respond("/login", json!({"status": "success", "message": "Login successful"}));
        transport.respond("/submit-info", json!({"status": "success"}));
        transport.respond(
            "/get-messages?channel=general",
            json!({"status": "success", "messages": []}),
        );
        transport.respond("/get-list", json!({"status": "success", "peers": []}));
        transport
    }

    #[tokio::test]
    async fn login_starts_session_registers_and_polls() {
        let (commands, mut events) = start(logged_in_transport());
        commands
            .send(NetworkCommand::Login {
                username: " alice ".to_string(),
                password: "secret".to_string(),
            })
            .await
            .unwrap();

        match events.recv().await {
            Some(NetworkEvent::LoggedIn { session, username }) => {
                assert_eq!(session, SessionId(1));
                assert_eq!(username, "alice");
            }
            other => panic!("expected LoggedIn, got {other:?}"),
        }
        assert!(matches!(
            events.recv().await,
            Some(NetworkEvent::Session {
                event: SessionEvent::PeerRegistered,
                ..
            })
        ));
        assert!(matches!(
            events.recv().await,
            Some(NetworkEvent::Session {
                event: SessionEvent::History(_),
                ..
            })
        ));
    }

    #[tokio::test]
    async fn rejected_login_reports_server_message() {
        let transport = FakeTransport::default();
        transport.respond("/login", json!({"status": "error", "message": "Invalid credentials"}));
        let (commands, mut events) = start(transport);

        commands
            .send(NetworkCommand::Login {
                username: "alice".to_string(),
                password: String::new(),
            })
            .await
            .unwrap();

        match events.recv().await {
            Some(NetworkEvent::LoginFailed(message)) => assert_eq!(message, "Invalid credentials"),
            other => panic!("expected LoginFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_server_reports_network_error_on_login() {
        let transport = FakeTransport::default();
        transport.fail("/login", 502);
        let (commands, mut events) = start(transport);

        commands
            .send(NetworkCommand::Login {
                username: "alice".to_string(),
                password: "pw".to_string(),
            })
            .await
            .unwrap();

        match events.recv().await {
            Some(NetworkEvent::LoginFailed(message)) => assert_eq!(message, LOGIN_NETWORK_ERROR),
            other => panic!("expected LoginFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn failed_broadcast_reports_network_kind() {
        let transport = FakeTransport::default();
        transport.fail("/broadcast-peer", 500);
        let (commands, mut events) = start(transport);

        commands
            .send(NetworkCommand::Broadcast {
                session: SessionId(4),
                from_peer: "alice".to_string(),
                content: "hi".to_string(),
            })
            .await
            .unwrap();

        match events.recv().await {
            Some(NetworkEvent::Session {
                session,
                event: SessionEvent::SendFinished(SendOutcome::Failed { kind, .. }),
            }) => {
                assert_eq!(session, SessionId(4));
                assert_eq!(kind, FailureKind::Network);
            }
            other => panic!("expected SendFinished, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn connect_all_counts_successes() {
        let transport = FakeTransport::default();
        transport.respond("/connect-peer", json!({"status": "success"}));
        let (commands, mut events) = start(transport);

        commands
            .send(NetworkCommand::ConnectAll {
                session: SessionId(1),
                from_peer: "alice".to_string(),
                peers: vec!["bob".to_string(), "carol".to_string()],
            })
            .await
            .unwrap();

        match events.recv().await {
            Some(NetworkEvent::Session {
                event: SessionEvent::PeersConnected { connected, total },
                ..
            }) => {
                assert_eq!(connected, 2);
                assert_eq!(total, 2);
            }
            other => panic!("expected PeersConnected, got {other:?}"),
        }
    }

    #[test]
    fn peer_port_stays_in_registration_range() {
        for _ in 0..100 {
            let port = random_peer_port();
            assert!((50000..60000).contains(&port));
        }
    }
}
