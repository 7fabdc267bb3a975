use std::error::Error;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::chat::{ChatSession, DisplayedMessage, InputOutcome, RenderHandle, Renderer};
use crate::common::{NetworkCommand, NetworkEvent};

/// Renderer cho chế độ headless: in từng thay đổi ra stdout.
#[derive(Debug, Default)]
pub struct ConsoleRenderer {
    next_handle: u64,
}

impl Renderer for ConsoleRenderer {
    fn create(&mut self, message: &DisplayedMessage) -> RenderHandle {
        self.next_handle += 1;
        let marker = if message.is_pending() { " (sending…)" } else { "" };
        println!(
            "[{}] {}: {}{marker}",
            message.display_time(),
            message.sender(),
            message.content()
        );
        RenderHandle(self.next_handle)
    }

    fn update(&mut self, _handle: RenderHandle, message: &DisplayedMessage) {
        println!(
            "[{}] ✓ delivered: {}",
            message.display_time(),
            message.content()
        );
    }

    fn clear(&mut self) {
        println!("{}", "-".repeat(40));
    }

    fn notice(&mut self, text: &str) {
        println!("[System] {text}");
    }

    fn status(&mut self, text: &str) {
        println!("[Status] {text}");
    }
}

/// Đăng nhập và chat qua stdin/stdout, dùng chung reconciler với giao diện egui.
pub async fn run_headless(
    username: String,
    password: String,
    channel: String,
    command_sender: mpsc::Sender<NetworkCommand>,
    mut event_receiver: mpsc::Receiver<NetworkEvent>,
) -> Result<(), Box<dyn Error>> {
    command_sender
        .send(NetworkCommand::Login { username, password })
        .await?;

    let mut session: Option<ChatSession<ConsoleRenderer>> = None;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            event = event_receiver.recv() => {
                match event {
                    Some(NetworkEvent::LoggedIn { session: id, username }) => {
                        let mut chat = ChatSession::new(id, username.clone(), channel.clone(), ConsoleRenderer::default());
                        chat.notice(&format!("Welcome {username}! You are now logged in."));
                        chat.notice("Commands: /msg <peer> <text>, /broadcast <text>, /peers, /connect, /clear, /quit");
                        session = Some(chat);
                    }
                    Some(NetworkEvent::LoginFailed(message)) => {
                        return Err(format!("login failed: {message}").into());
                    }
                    Some(NetworkEvent::Session { session: id, event }) => {
                        if let Some(chat) = session.as_mut() {
                            chat.apply(id, event);
                        }
                    }
                    None => break,
                }
            }
            line = lines.next_line(), if session.is_some() => {
                let Some(line) = line? else {
                    break;
                };
                let Some(chat) = session.as_mut() else {
                    continue;
                };
                if line.trim() == "/peers" {
                    print_peers(chat);
                }
                match chat.handle_input(&line, None) {
                    InputOutcome::Command(command) => command_sender.send(command).await?,
                    InputOutcome::Handled => {}
                    InputOutcome::Quit => break,
                }
            }
        }
    }

    if let Err(err) = command_sender.send(NetworkCommand::Logout).await {
        log::warn!("Failed to stop network session: {err}");
    }
    println!("[System] Goodbye!");
    Ok(())
}

fn print_peers(chat: &ChatSession<ConsoleRenderer>) {
    let peers: Vec<String> = chat
        .peers()
        .map(|peer| format!("{} ({}:{})", peer.peer_id, peer.ip, peer.port))
        .collect();
    if peers.is_empty() {
        println!("[System] No other peers online");
    } else {
        println!("[System] Peers: {}", peers.join(", "));
    }
}
