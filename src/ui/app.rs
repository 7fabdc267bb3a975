use chrono::Utc;
use eframe::egui;
use tokio::sync::mpsc;

use crate::chat::{ChatSession, InputOutcome};
use crate::common::{NetworkCommand, NetworkEvent, PeerInfo};
use crate::config::{AppConfig, persist_last_username};

use super::components::{
    chat_area, debug_panel, input_bar, login_form,
    sidebar::{self, SidebarActions},
};
use super::state::{AppState, SendMode};
use super::timeline::{TimelineView, TransientText};

const LOGIN_UNAVAILABLE: &str = "Network error. Please try again.";

pub struct ChatApp {
    state: AppState,
    config_path: String,
    command_sender: mpsc::Sender<NetworkCommand>,
    event_receiver: mpsc::Receiver<NetworkEvent>,
}

impl ChatApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        config: &AppConfig,
        config_path: String,
        command_sender: mpsc::Sender<NetworkCommand>,
        event_receiver: mpsc::Receiver<NetworkEvent>,
    ) -> Self {
        Self {
            state: AppState::new(config.channel.clone(), config.last_username.clone()),
            config_path,
            command_sender,
            event_receiver,
        }
    }

    fn handle_network_events(&mut self) {
        while let Ok(event) = self.event_receiver.try_recv() {
            match event {
                NetworkEvent::LoggedIn { session, username } => {
                    let mut chat = ChatSession::new(
                        session,
                        username.clone(),
                        self.state.channel.clone(),
                        TimelineView::default(),
                    );
                    chat.notice(&format!("Welcome {username}! You are now logged in."));
                    self.state.session = Some(chat);
                    self.state.login_in_flight = false;
                    self.state.login_error = None;
                    self.state
                        .add_debug_event("LOGGED_IN", format!("{username} started {session}"));
                    persist_last_username(&self.config_path, &username);
                }
                NetworkEvent::LoginFailed(message) => {
                    self.state.login_in_flight = false;
                    self.state
                        .add_debug_event("LOGIN_FAILED", message.clone());
                    self.state.login_error = Some(TransientText::new(message));
                }
                NetworkEvent::Session { session, event } => {
                    let applied = match self.state.session.as_mut() {
                        Some(chat) => chat.apply(session, event),
                        None => false,
                    };
                    if !applied {
                        self.state
                            .add_debug_event("STALE_EVENT", format!("Dropped event for {session}"));
                    }
                }
            }
        }
    }

    /// Trả về `false` nếu tầng mạng không nhận lệnh (kênh đầy hoặc đã đóng).
    fn dispatch(&mut self, command: NetworkCommand) -> bool {
        match self.command_sender.try_send(command) {
            Ok(()) => true,
            Err(err) => {
                log::warn!("Failed to send command to network: {err}");
                false
            }
        }
    }

    fn login(&mut self, username: String, password: String) {
        self.state.login_in_flight = true;
        if !self.dispatch(NetworkCommand::Login { username, password }) {
            self.state.login_in_flight = false;
            self.state.login_error = Some(TransientText::new(LOGIN_UNAVAILABLE));
        }
    }

    fn logout(&mut self) {
        if let Some(chat) = &self.state.session {
            let message = format!("{} left {}", chat.user(), chat.id());
            self.state.add_debug_event("LOGGED_OUT", message);
        }
        self.state.reset_after_logout();
        self.dispatch(NetworkCommand::Logout);
    }

    fn submit_input(&mut self, line: String) {
        let direct_to = match self.state.send_mode {
            SendMode::Broadcast => None,
            SendMode::Direct => self.state.target_peer.clone(),
        };
        let Some(chat) = self.state.session.as_mut() else {
            return;
        };

        // Chế độ direct mà chưa chọn peer: chỉ cho phép slash command.
        if self.state.send_mode == SendMode::Direct
            && direct_to.is_none()
            && !line.trim_start().starts_with('/')
        {
            chat.status("Select a peer first");
            return;
        }

        match chat.handle_input(&line, direct_to.as_deref()) {
            InputOutcome::Command(command) => {
                self.dispatch(command);
            }
            InputOutcome::Handled => {}
            InputOutcome::Quit => self.logout(),
        }
    }

    fn apply_sidebar_actions(&mut self, actions: SidebarActions) {
        if let Some(peer_id) = actions.direct_peer_id {
            self.state.select_direct_target(peer_id);
        }
        let Some(chat) = self.state.session.as_mut() else {
            return;
        };
        if actions.clear_chat {
            chat.clear();
        }
        let session = chat.id();
        let connect = actions.connect_all.then(|| chat.connect_all());
        if actions.refresh_peers {
            self.dispatch(NetworkCommand::RefreshPeers { session });
        }
        if let Some(command) = connect {
            self.dispatch(command);
        }
    }

    fn render_top_bar(&mut self, ctx: &egui::Context) {
        let mut logout = false;
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Tracker Chat");
                ui.separator();
                match &self.state.session {
                    Some(chat) => {
                        ui.colored_label(egui::Color32::GREEN, "Connected");
                        ui.label(format!("as {} in #{}", chat.user(), chat.channel()));
                        if ui.button("Logout").clicked() {
                            logout = true;
                        }
                    }
                    None => {
                        ui.colored_label(egui::Color32::GRAY, "Disconnected");
                    }
                }
            });
        });
        if logout {
            self.logout();
        }
    }

    fn render_chat(&mut self, ctx: &egui::Context) {
        let peers: Vec<PeerInfo> = self
            .state
            .session
            .as_ref()
            .map(|chat| chat.peers().cloned().collect())
            .unwrap_or_default();
        let peer_ids: Vec<String> = peers.iter().map(|peer| peer.peer_id.clone()).collect();

        egui::SidePanel::left("peer_sidebar")
            .resizable(true)
            .default_width(200.0)
            .show(ctx, |ui| {
                let actions = sidebar::render(ui, &peers);
                self.apply_sidebar_actions(actions);
            });

        egui::SidePanel::right("debug_panel")
            .resizable(true)
            .default_width(260.0)
            .show(ctx, |ui| {
                debug_panel::render(ui, &self.state);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            let state = &mut self.state;
            let submitted = egui::TopBottomPanel::bottom("input_bar")
                .show_inside(ui, |ui| {
                    if let Some(status) = state
                        .session
                        .as_ref()
                        .and_then(|chat| chat.renderer().status_text(Utc::now()))
                    {
                        ui.label(egui::RichText::new(status).weak());
                    }
                    input_bar::render(
                        ui,
                        &mut state.input_text,
                        &mut state.send_mode,
                        &mut state.target_peer,
                        &peer_ids,
                    )
                })
                .inner;

            if let Some(chat) = &state.session {
                chat_area::render(ui, chat.renderer());
            }

            if let Some(line) = submitted {
                self.submit_input(line);
            }
        });
    }
}

impl eframe::App for ChatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_network_events();
        self.render_top_bar(ctx);

        if self.state.is_logged_in() {
            self.render_chat(ctx);
        } else {
            egui::CentralPanel::default().show(ctx, |ui| {
                if let Some(request) = login_form::render(ui, &mut self.state) {
                    self.login(request.username, request.password);
                }
            });
        }

        ctx.request_repaint();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app_with_sender(command_sender: mpsc::Sender<NetworkCommand>) -> ChatApp {
        let (_event_tx, event_receiver) = mpsc::channel(1);
        ChatApp {
            state: AppState::new("general".to_string(), None),
            config_path: String::new(),
            command_sender,
            event_receiver,
        }
    }

    #[test]
    fn login_is_in_flight_once_dispatched() {
        let (cmd_tx, mut cmd_rx) = mpsc::channel(1);
        let mut app = app_with_sender(cmd_tx);

        app.login("alice".to_string(), "pw".to_string());

        assert!(app.state.login_in_flight);
        assert!(matches!(cmd_rx.try_recv(), Ok(NetworkCommand::Login { .. })));
    }

    #[test]
    fn undeliverable_login_re_enables_form() {
        let (cmd_tx, cmd_rx) = mpsc::channel(1);
        drop(cmd_rx);
        let mut app = app_with_sender(cmd_tx);

        app.login("alice".to_string(), "pw".to_string());

        assert!(!app.state.login_in_flight);
        let error = app.state.login_error.as_ref().expect("login error shown");
        assert_eq!(error.text, LOGIN_UNAVAILABLE);
    }
}
