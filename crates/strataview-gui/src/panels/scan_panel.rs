/// Scan panel — folder picker, search, and monitor controls in the left
/// sidebar.
use crate::state::AppState;
use egui::Ui;

/// Draw the scan panel (left sidebar content above the tree view).
pub fn scan_panel(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui| {
        if ui.button("📂 Scan folder...").clicked() {
            if let Some(path) = rfd::FileDialog::new().pick_folder() {
                state.start_scan(path);
            }
        }
        if state.phase == crate::state::AppPhase::Scanning && ui.button("⏹ Stop").clicked() {
            state.cancel_scan();
        }
    });

    if state.session.tree().is_none() {
        return;
    }

    ui.add_space(8.0);
    ui.separator();
    ui.add_space(8.0);

    ui.heading("Search");
    ui.add_space(4.0);
    let response = ui.text_edit_singleline(&mut state.search_query);
    ui.horizontal(|ui| {
        ui.checkbox(&mut state.search_files, "Files");
        ui.checkbox(&mut state.search_dirs, "Folders");
    });
    if response.changed() || ui.button("Search").clicked() {
        state.run_search();
    }

    ui.add_space(8.0);
    ui.separator();
    ui.add_space(8.0);

    ui.checkbox(&mut state.show_monitor_panel, "Live change monitor");
}
