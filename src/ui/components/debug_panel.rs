use eframe::egui;

use crate::ui::state::AppState;

pub fn render(ui: &mut egui::Ui, state: &AppState) {
    ui.heading("Debug Info");
    ui.separator();

    match &state.session {
        Some(session) => {
            ui.horizontal(|ui| {
                ui.label("Session:");
                ui.label(session.id().to_string());
            });
            ui.horizontal(|ui| {
                ui.label("Channel:");
                ui.label(session.channel());
            });
            ui.horizontal(|ui| {
                ui.label("Messages:");
                ui.label(format!("{}", session.store().len()));
            });
            ui.horizontal(|ui| {
                ui.label("Pending:");
                ui.label(format!("{}", session.store().pending_count()));
            });
        }
        None => {
            ui.label("No active session");
        }
    }

    ui.separator();

    // Hiển thị log events gần đây
    ui.label("Recent Events:");
    egui::ScrollArea::vertical()
        .max_height(200.0)
        .show(ui, |ui| {
            for event in state.debug_events.iter().rev().take(20) {
                let time_str = event.timestamp.format("%H:%M:%S");
                let color = match event.event_type.as_str() {
                    "LOGGED_IN" => egui::Color32::GREEN,
                    "LOGIN_FAILED" | "STALE_EVENT" => egui::Color32::RED,
                    "LOGGED_OUT" => egui::Color32::YELLOW,
                    _ => egui::Color32::WHITE,
                };

                ui.horizontal(|ui| {
                    ui.colored_label(color, format!("[{}]", time_str));
                    ui.label(event.message.as_str());
                });
            }
        });
}
