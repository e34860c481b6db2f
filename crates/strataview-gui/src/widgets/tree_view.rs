/// Virtualised TreeView widget — the core UI component.
///
/// Only renders rows visible in the viewport, giving roughly constant
/// rendering cost regardless of tree size. Reads from `AppState`'s flat
/// `visible_rows` list, which `AppState::rebuild_visible_rows` keeps in
/// sync with the expansion set.
use crate::state::AppState;
use crate::theme::StrataviewTheme;
use egui::{Rect, Response, Sense, Ui, Vec2};
use strataview_core::model::file_info::FileKind;
use strataview_core::model::size::{format_count, format_size};
use strataview_core::model::NodeId;

const ROW_HEIGHT: f32 = 24.0;
const INDENT_PX: f32 = 20.0;

/// Draw the virtualised tree view. Returns the response for the outer
/// scroll area so callers can detect interactions.
pub fn tree_view(ui: &mut Ui, state: &mut AppState, theme: &StrataviewTheme) -> Response {
    if state.session.tree().is_none() {
        ui.centered_and_justified(|ui| {
            ui.label(
                egui::RichText::new("No scan results. Pick a folder and click Scan.")
                    .color(theme.text_muted),
            );
        });
        return ui.interact(ui.max_rect(), ui.id().with("empty_tree"), Sense::click());
    }

    let (toggle_node, new_selection) = render_rows(ui, state, theme);

    if let Some(node) = new_selection {
        state.selected_node = Some(node);
    }
    if let Some(node) = toggle_node {
        state.toggle_expand(node);
    }

    ui.interact(ui.max_rect(), ui.id().with("tree_bg"), Sense::hover())
}

fn render_rows(
    ui: &mut Ui,
    state: &AppState,
    theme: &StrataviewTheme,
) -> (Option<NodeId>, Option<NodeId>) {
    let Some(tree) = state.session.tree() else {
        return (None, None);
    };
    let guard = tree.read();

    let total_rows = state.visible_rows.len();
    let total_height = total_rows as f32 * ROW_HEIGHT;

    let mut toggle_node: Option<NodeId> = None;
    let mut new_selection: Option<NodeId> = None;

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            let (response, painter) =
                ui.allocate_painter(Vec2::new(ui.available_width(), total_height), Sense::click());

            let viewport = ui.clip_rect();
            let top_y = response.rect.top();

            let first_visible = ((viewport.top() - top_y) / ROW_HEIGHT).floor().max(0.0) as usize;
            let last_visible = (((viewport.bottom() - top_y) / ROW_HEIGHT).ceil() as usize)
                .min(total_rows);

            for row_idx in first_visible..last_visible {
                let row = &state.visible_rows[row_idx];
                let payload = guard.payload(row.node);
                let file = &payload.file;
                let is_dir = file.kind == FileKind::Directory;

                let row_rect = Rect::from_min_size(
                    egui::pos2(response.rect.left(), top_y + row_idx as f32 * ROW_HEIGHT),
                    Vec2::new(response.rect.width(), ROW_HEIGHT),
                );
                if !viewport.intersects(row_rect) {
                    continue;
                }

                let is_selected = state.selected_node == Some(row.node);
                if is_selected {
                    painter.rect_filled(row_rect, 0.0, theme.selection);
                }

                let row_response =
                    ui.interact(row_rect, ui.id().with(("tree_row", row.node)), Sense::click());
                if row_response.hovered() && !is_selected {
                    painter.rect_filled(row_rect, 0.0, theme.surface_hover);
                }
                if row_response.clicked() {
                    new_selection = Some(row.node);
                }
                if row_response.double_clicked() && is_dir {
                    toggle_node = Some(row.node);
                }

                let indent = INDENT_PX * row.depth as f32;
                let text_x = row_rect.left() + indent + 4.0;
                let text_y = row_rect.center().y;

                if is_dir {
                    let arrow = if row.is_expanded { "▼" } else { "▶" };
                    let arrow_rect = Rect::from_min_size(
                        egui::pos2(row_rect.left() + indent - 14.0, row_rect.top()),
                        Vec2::new(16.0, ROW_HEIGHT),
                    );
                    let arrow_response = ui.interact(
                        arrow_rect,
                        ui.id().with(("arrow", row.node)),
                        Sense::click(),
                    );
                    if arrow_response.clicked() {
                        toggle_node = Some(row.node);
                    }
                    painter.text(
                        egui::pos2(row_rect.left() + indent - 12.0, text_y),
                        egui::Align2::LEFT_CENTER,
                        arrow,
                        egui::FontId::proportional(11.0),
                        theme.text_muted,
                    );
                }

                let (icon, icon_color) = if file.is_error {
                    ("⚠", theme.warning)
                } else if is_dir {
                    ("📁", theme.folder_icon)
                } else {
                    ("📄", theme.file_icon)
                };
                painter.text(
                    egui::pos2(text_x, text_y),
                    egui::Align2::LEFT_CENTER,
                    icon,
                    egui::FontId::proportional(13.0),
                    icon_color,
                );

                let name_x = text_x + 20.0;
                let right_area_start = row_rect.right() - 300.0;
                let name_color = if file.is_error {
                    theme.text_muted
                } else {
                    theme.text_primary
                };
                painter.text(
                    egui::pos2(name_x, text_y),
                    egui::Align2::LEFT_CENTER,
                    file.name.as_str(),
                    egui::FontId::proportional(13.0),
                    name_color,
                );

                painter.text(
                    egui::pos2(right_area_start, text_y),
                    egui::Align2::LEFT_CENTER,
                    format_size(file.size),
                    egui::FontId::proportional(12.0),
                    theme.text_secondary,
                );

                let percent = guard
                    .parent(row.node)
                    .map(|p| guard.payload(p).file.size)
                    .filter(|&parent_size| parent_size > 0)
                    .map(|parent_size| file.size as f32 / parent_size as f32 * 100.0)
                    .unwrap_or(0.0);
                painter.text(
                    egui::pos2(right_area_start + 80.0, text_y),
                    egui::Align2::LEFT_CENTER,
                    format!("{percent:.1}%"),
                    egui::FontId::proportional(12.0),
                    theme.text_secondary,
                );

                let bar_rect = Rect::from_min_size(
                    egui::pos2(right_area_start + 130.0, text_y - 5.0),
                    Vec2::new(100.0, 10.0),
                );
                painter.rect_filled(bar_rect, 2.0, theme.surface);
                let fill_w = bar_rect.width() * (percent / 100.0).clamp(0.0, 1.0);
                if fill_w > 0.5 {
                    let fill_rect = Rect::from_min_size(bar_rect.min, Vec2::new(fill_w, bar_rect.height()));
                    painter.rect_filled(fill_rect, 2.0, theme.bar_color(percent));
                }

                if is_dir && !row.is_expanded {
                    let count = guard.descendants_preorder(row.node).count() as u64;
                    if count > 0 {
                        painter.text(
                            egui::pos2(bar_rect.right() + 10.0, text_y),
                            egui::Align2::LEFT_CENTER,
                            format!("{} files", format_count(count)),
                            egui::FontId::proportional(11.0),
                            theme.text_muted,
                        );
                    }
                }
            }

            response
        });

    (toggle_node, new_selection)
}
