use eframe::egui;

use crate::common::MessageOrigin;
use crate::ui::timeline::{MessageRow, TimelineView};

pub fn render(ui: &mut egui::Ui, timeline: &TimelineView) {
    egui::ScrollArea::vertical()
        .auto_shrink([false; 2])
        .stick_to_bottom(true)
        .show(ui, |ui| {
            for row in timeline.rows() {
                render_row(ui, row);
            }
        });
}

fn render_row(ui: &mut egui::Ui, row: &MessageRow) {
    ui.horizontal_wrapped(|ui| {
        ui.label(egui::RichText::new(format!("[{}]", row.time)).weak());

        match row.origin {
            MessageOrigin::System => {
                ui.label(egui::RichText::new(&row.content).italics().weak());
            }
            origin => {
                let color = if origin == MessageOrigin::Own {
                    egui::Color32::LIGHT_BLUE
                } else {
                    egui::Color32::LIGHT_GREEN
                };
                if let Some(sender) = &row.sender {
                    ui.colored_label(color, format!("{sender}:"));
                }

                // Tin pending hiển thị mờ cho tới khi server xác nhận
                let content = egui::RichText::new(&row.content);
                if row.pending {
                    ui.label(content.weak().italics());
                    ui.label(egui::RichText::new("(sending…)").small().weak());
                } else {
                    ui.label(content);
                }
            }
        }
    });
}
