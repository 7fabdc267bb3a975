use chrono::{Duration, Utc};
use eframe::egui;

use crate::ui::state::AppState;

const LOGIN_ERROR_TTL_SECS: i64 = 5;

pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

pub fn render(ui: &mut egui::Ui, state: &mut AppState) -> Option<LoginRequest> {
    let mut submit = false;

    ui.vertical_centered(|ui| {
        ui.add_space(40.0);
        ui.heading("Login");
        ui.add_space(12.0);

        egui::Grid::new("login_grid")
            .num_columns(2)
            .spacing([8.0, 8.0])
            .show(ui, |ui| {
                ui.label("Username");
                ui.text_edit_singleline(&mut state.username_input);
                ui.end_row();

                ui.label("Password");
                let response =
                    ui.add(egui::TextEdit::singleline(&mut state.password_input).password(true));
                if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    submit = true;
                }
                ui.end_row();
            });

        ui.add_space(8.0);
        let button = ui.add_enabled(!state.login_in_flight, egui::Button::new("Login"));
        if button.clicked() {
            submit = true;
        }

        if let Some(error) = &state.login_error {
            if error.visible_at(Utc::now(), Duration::seconds(LOGIN_ERROR_TTL_SECS)) {
                ui.colored_label(egui::Color32::RED, error.text.as_str());
            }
        }
    });

    if !submit || state.login_in_flight {
        return None;
    }

    let username = state.username_input.trim().to_string();
    if username.is_empty() {
        return None;
    }
    Some(LoginRequest {
        username,
        password: state.password_input.clone(),
    })
}
