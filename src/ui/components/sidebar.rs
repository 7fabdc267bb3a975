use eframe::egui;

use crate::common::PeerInfo;

#[derive(Default)]
pub struct SidebarActions {
    pub refresh_peers: bool,
    pub connect_all: bool,
    pub clear_chat: bool,
    pub direct_peer_id: Option<String>,
}

pub fn render(ui: &mut egui::Ui, peers: &[PeerInfo]) -> SidebarActions {
    let mut actions = SidebarActions::default();

    ui.horizontal(|ui| {
        ui.heading("Peers");
        ui.label(egui::RichText::new(format!("({})", peers.len())).weak());
    });
    ui.separator();

    ui.horizontal(|ui| {
        if ui.button("Refresh").clicked() {
            actions.refresh_peers = true;
        }
        if ui.button("Connect all").clicked() {
            actions.connect_all = true;
        }
    });
    if ui.button("Clear chat").clicked() {
        actions.clear_chat = true;
    }

    ui.separator();

    if peers.is_empty() {
        ui.label("No other peers online");
        return actions;
    }

    for peer in peers {
        ui.horizontal(|ui| {
            ui.colored_label(egui::Color32::GREEN, "●");

            // Click vào peer để chuyển sang nhắn trực tiếp
            if ui
                .link(peer.peer_id.as_str())
                .on_hover_text("Send a direct message")
                .clicked()
            {
                actions.direct_peer_id = Some(peer.peer_id.clone());
            }
            ui.label(egui::RichText::new(format!("({}:{})", peer.ip, peer.port)).weak());
        });
    }

    actions
}
