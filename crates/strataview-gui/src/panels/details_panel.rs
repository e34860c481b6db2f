/// Details panel — shows information about the currently selected node.

use crate::state::AppState;
use crate::theme::StrataviewTheme;
use egui::Ui;
use strataview_core::model::file_info::FileKind;
use strataview_core::model::size::{format_count, format_size};

/// Draw the details panel for the currently selected node.
pub fn details_panel(ui: &mut Ui, state: &AppState, theme: &StrataviewTheme) {
    let Some(selected) = state.selected_node else {
        ui.label(
            egui::RichText::new("Select an item to see details")
                .color(theme.text_muted)
                .italics(),
        );
        return;
    };

    let Some(tree) = state.session.tree() else {
        return;
    };
    let guard = tree.read();
    let payload = guard.payload(selected);
    let file = &payload.file;
    let is_dir = file.kind == FileKind::Directory;

    ui.label(egui::RichText::new(if is_dir { "📁" } else { "📄" }).size(16.0));
    ui.add_space(2.0);

    ui.label(
        egui::RichText::new(file.name.as_str())
            .size(14.0)
            .strong()
            .color(theme.text_primary),
    );

    ui.add_space(4.0);

    if let Some(path) = state.full_path(selected) {
        ui.label(
            egui::RichText::new(path.display().to_string())
                .size(11.0)
                .color(theme.text_muted),
        );
    }

    ui.add_space(8.0);
    ui.separator();
    ui.add_space(4.0);

    let parent_size = guard.parent(selected).map(|p| guard.payload(p).file.size);
    let percent_of_parent = parent_size
        .filter(|&s| s > 0)
        .map(|s| file.size as f64 / s as f64 * 100.0)
        .unwrap_or(0.0);

    egui::Grid::new("details_grid")
        .num_columns(2)
        .spacing([8.0, 4.0])
        .show(ui, |ui| {
            ui.label(egui::RichText::new("Size:").color(theme.text_muted));
            ui.label(
                egui::RichText::new(format_size(file.size))
                    .color(theme.accent)
                    .strong(),
            );
            ui.end_row();

            ui.label(egui::RichText::new("% of parent:").color(theme.text_muted));
            ui.label(
                egui::RichText::new(format!("{percent_of_parent:.1}%"))
                    .color(theme.text_secondary),
            );
            ui.end_row();

            if is_dir {
                let descendants = guard.descendants_preorder(selected).count() as u64;
                ui.label(egui::RichText::new("Files:").color(theme.text_muted));
                ui.label(
                    egui::RichText::new(format_count(descendants)).color(theme.text_secondary),
                );
                ui.end_row();
            }

            if let Some(modified) = file.modified {
                if let Ok(duration) = modified.elapsed() {
                    let days = duration.as_secs() / 86400;
                    let date_str = if days == 0 {
                        "Today".to_string()
                    } else if days == 1 {
                        "Yesterday".to_string()
                    } else if days < 365 {
                        format!("{days} days ago")
                    } else {
                        format!("{:.1} years ago", days as f64 / 365.0)
                    };
                    ui.label(egui::RichText::new("Modified:").color(theme.text_muted));
                    ui.label(egui::RichText::new(date_str).color(theme.text_secondary));
                    ui.end_row();
                }
            }

            if file.is_error {
                ui.label(egui::RichText::new("Status:").color(theme.text_muted));
                ui.label(egui::RichText::new("Access error").color(theme.warning));
                ui.end_row();
            }
        });

    ui.add_space(8.0);

    if ui.button("📋 Copy Path").clicked() {
        if let Some(path) = state.full_path(selected) {
            ui.ctx().copy_text(path.display().to_string());
        }
    }
}
