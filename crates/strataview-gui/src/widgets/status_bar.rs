/// Bottom status bar — scan progress and statistics.

use crate::state::{AppPhase, AppState};
use crate::theme::StrataviewTheme;
use strataview_core::model::size::{format_count, format_size};
use egui::Ui;

/// Draw the status bar at the bottom of the window.
pub fn status_bar(ui: &mut Ui, state: &AppState, theme: &StrataviewTheme) {
    ui.horizontal(|ui| {
        match state.phase {
            AppPhase::Idle => {
                let text = if state.scan_was_cancelled {
                    "Scan stopped"
                } else {
                    "Ready"
                };
                ui.label(
                    egui::RichText::new(text)
                        .size(12.0)
                        .color(theme.text_muted),
                );
            }
            AppPhase::Scanning => {
                ui.spinner();

                ui.label(
                    egui::RichText::new(format!(
                        "{} files",
                        format_count(state.scan_files_found)
                    ))
                    .size(12.0)
                    .color(theme.text_primary),
                );

                ui.separator();

                ui.label(
                    egui::RichText::new(format!("{} dirs", format_count(state.scan_dirs_found)))
                        .size(12.0)
                        .color(theme.text_primary),
                );

                ui.separator();

                ui.label(
                    egui::RichText::new(format_size(state.scan_bytes_processed))
                        .size(12.0)
                        .color(theme.accent),
                );

                if state.scan_error_count > 0 {
                    ui.separator();
                    ui.label(
                        egui::RichText::new(format!(
                            "{} errors",
                            format_count(state.scan_error_count)
                        ))
                        .size(12.0)
                        .color(theme.warning),
                    );
                }
            }
            AppPhase::Results => {
                let status_text = if state.scan_was_cancelled {
                    "⏹ Scan stopped (partial results)"
                } else {
                    "✓ Scan complete"
                };
                let status_color = if state.scan_was_cancelled {
                    theme.warning
                } else {
                    theme.success
                };
                ui.label(
                    egui::RichText::new(status_text)
                        .size(12.0)
                        .color(status_color),
                );

                ui.separator();

                ui.label(
                    egui::RichText::new(format!("{} files", format_count(state.scan_files_found)))
                        .size(12.0)
                        .color(theme.text_primary),
                );

                ui.separator();

                ui.label(
                    egui::RichText::new(format_size(state.scan_bytes_processed))
                        .size(12.0)
                        .color(theme.accent),
                );

                if let Some(duration) = state.scan_duration {
                    ui.separator();
                    ui.label(
                        egui::RichText::new(format!("{:.1}s", duration.as_secs_f64()))
                            .size(12.0)
                            .color(theme.text_muted),
                    );
                }

                if state.scan_error_count > 0 {
                    ui.separator();
                    ui.label(
                        egui::RichText::new(format!(
                            "{} skipped",
                            format_count(state.scan_error_count)
                        ))
                        .size(12.0)
                        .color(theme.warning),
                    );
                }

                if !state.monitor_entries.is_empty() {
                    ui.separator();
                    ui.label(
                        egui::RichText::new(format!(
                            "{} live changes",
                            state.monitor_entries.len()
                        ))
                        .size(12.0)
                        .color(theme.text_muted),
                    );
                }
            }
        }
    });
}
