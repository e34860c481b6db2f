/// Top action bar — folder picker and scan controls.
use crate::state::{AppPhase, AppState};
use egui::Ui;

/// Draw the toolbar.
pub fn toolbar(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui| {
        ui.label(
            egui::RichText::new("Strataview")
                .size(18.0)
                .strong()
                .color(egui::Color32::from_rgb(0x89, 0xb4, 0xfa)),
        );

        ui.separator();

        let can_scan = state.phase != AppPhase::Scanning;
        let scan_btn = ui.add_enabled(
            can_scan,
            egui::Button::new("📂 Scan folder...").min_size(egui::vec2(110.0, 28.0)),
        );
        if scan_btn.clicked() {
            if let Some(path) = rfd::FileDialog::new().pick_folder() {
                state.start_scan(path);
            }
        }

        let can_stop = state.phase == AppPhase::Scanning;
        let stop_btn = ui.add_enabled(
            can_stop,
            egui::Button::new("⏹ Stop").min_size(egui::vec2(70.0, 28.0)),
        );
        if stop_btn.clicked() {
            state.cancel_scan();
        }

        ui.separator();

        ui.add_enabled(
            state.session.root_path().is_some(),
            egui::Label::new(
                egui::RichText::new(
                    state
                        .session
                        .root_path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_default(),
                )
                .size(12.0)
                .color(ui.visuals().weak_text_color()),
            ),
        );

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button("ℹ").on_hover_text("About Strataview").clicked() {
                state.show_about = true;
            }
            if ui
                .button(if state.theme_mode == crate::theme::ThemeMode::Dark {
                    "☀"
                } else {
                    "🌙"
                })
                .on_hover_text("Toggle theme")
                .clicked()
            {
                state.theme_mode.toggle();
            }
        });
    });
}
