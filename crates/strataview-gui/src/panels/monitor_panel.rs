/// Live file change monitor panel.
///
/// Displays a continuously-updated log of filesystem events reconciled
/// against the scanned tree, helping spot what's changing on disk while
/// the session stays open.
///
/// The panel is rendered as a bottom panel when `state.show_monitor_panel`
/// is `true`. The monitor itself starts automatically once a scan
/// completes (see `Session::finish_scan`); this panel only displays and
/// clears the accumulated log.
use crate::state::AppState;
use egui::Ui;
use strataview_core::monitor::FileEventKind;

/// Draw the live change monitor panel.
pub fn monitor_panel(ui: &mut Ui, state: &mut AppState) {
    ui.vertical(|ui| {
        ui.horizontal(|ui| {
            ui.label(
                egui::RichText::new("👁 Live Change Monitor")
                    .strong()
                    .color(ui.visuals().hyperlink_color),
            );
            ui.label(format!("({} events)", state.monitor_entries.len()));
            if ui.button("Clear").clicked() {
                state.monitor_entries.clear();
            }
        });
        ui.separator();

        egui::ScrollArea::vertical()
            .stick_to_bottom(true)
            .max_height(160.0)
            .show(ui, |ui| {
                if state.monitor_entries.is_empty() {
                    ui.label(
                        egui::RichText::new("No changes observed yet.")
                            .italics()
                            .weak(),
                    );
                    return;
                }
                for resolved in &state.monitor_entries {
                    ui.horizontal(|ui| {
                        let (icon, label) = match &resolved.event.kind {
                            FileEventKind::Created => ("➕", "created".to_string()),
                            FileEventKind::Deleted => ("➖", "deleted".to_string()),
                            FileEventKind::Touched => ("✏", "touched".to_string()),
                            FileEventKind::Renamed { to } => {
                                ("🔀", format!("renamed to {}", to.display()))
                            }
                        };
                        ui.label(icon);
                        ui.label(resolved.event.relative_path.display().to_string());
                        ui.label(egui::RichText::new(label).weak());
                        if resolved.node.is_none() {
                            ui.label(egui::RichText::new("(unresolved)").weak().italics());
                        }
                    });
                }
            });
    });
}
