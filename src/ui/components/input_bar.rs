use eframe::egui;

use crate::ui::state::SendMode;

pub fn render(
    ui: &mut egui::Ui,
    input_text: &mut String,
    send_mode: &mut SendMode,
    target_peer: &mut Option<String>,
    peer_ids: &[String],
) -> Option<String> {
    ui.horizontal(|ui| {
        ui.radio_value(send_mode, SendMode::Broadcast, "Broadcast");
        ui.radio_value(send_mode, SendMode::Direct, "Direct");

        if *send_mode == SendMode::Direct {
            let selected = target_peer.as_deref().unwrap_or("Select Peer...").to_string();
            egui::ComboBox::from_id_salt("target_peer")
                .selected_text(selected)
                .show_ui(ui, |ui| {
                    for peer_id in peer_ids {
                        ui.selectable_value(target_peer, Some(peer_id.clone()), peer_id.as_str());
                    }
                });
        }
    });

    let mut send = false;
    ui.horizontal(|ui| {
        let response = ui.text_edit_singleline(input_text);
        if ui.button("Send").clicked() {
            send = true;
        }

        if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            send = true;
            response.request_focus();
        }
    });

    if send && !input_text.trim().is_empty() {
        let message = input_text.clone();
        input_text.clear();
        return Some(message);
    }

    None
}
