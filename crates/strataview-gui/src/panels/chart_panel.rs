/// Chart panel — a by-extension breakdown of disk usage.
///
/// This is GUI-local bookkeeping, not a core concern: it just walks the
/// already-scanned tree and buckets regular files by extension. Nothing
/// here feeds back into layout or picking.
use std::collections::HashMap;

use crate::state::AppState;
use crate::theme::StrataviewTheme;
use egui::{Rect, Ui, Vec2};
use strataview_core::model::file_info::FileKind;
use strataview_core::model::size::format_size;

/// Show at most this many extension buckets; the rest are folded into
/// "Other".
const MAX_BUCKETS: usize = 8;

pub fn chart_panel(ui: &mut Ui, state: &AppState, theme: &StrataviewTheme) {
    let Some(tree) = state.session.tree() else {
        return;
    };
    let guard = tree.read();
    if guard.is_empty() {
        return;
    }

    let mut totals: HashMap<String, u64> = HashMap::new();
    let mut grand_total: u64 = 0;
    for id in guard.descendants_preorder(guard.root()) {
        let file = &guard.payload(id).file;
        if file.kind != FileKind::Regular {
            continue;
        }
        grand_total += file.size;
        let key = if file.extension.is_empty() {
            "(no extension)".to_string()
        } else {
            file.extension.to_lowercase()
        };
        *totals.entry(key).or_insert(0) += file.size;
    }
    if grand_total == 0 {
        return;
    }

    let mut buckets: Vec<(String, u64)> = totals.into_iter().collect();
    buckets.sort_by(|a, b| b.1.cmp(&a.1));
    let (shown, rest) = buckets.split_at(buckets.len().min(MAX_BUCKETS));
    let other_total: u64 = rest.iter().map(|(_, size)| size).sum();

    ui.heading("File Types");
    ui.add_space(4.0);

    let mut draw_row = |ui: &mut Ui, label: &str, size: u64| {
        let pct = size as f64 / grand_total as f64 * 100.0;
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new(label).color(theme.text_primary).size(12.0));
            ui.label(egui::RichText::new(format_size(size)).color(theme.text_secondary).size(12.0));
            ui.label(
                egui::RichText::new(format!("({pct:.1}%)"))
                    .color(theme.text_muted)
                    .size(11.0),
            );
        });
        let bar_width = ui.available_width() - 16.0;
        let (bar_rect, _) = ui.allocate_exact_size(Vec2::new(bar_width.max(1.0), 4.0), egui::Sense::hover());
        let painter = ui.painter_at(bar_rect);
        painter.rect_filled(bar_rect, 2.0, theme.surface);
        let fill_w = bar_rect.width() * (pct as f32 / 100.0).clamp(0.0, 1.0);
        if fill_w > 0.5 {
            let fill_rect = Rect::from_min_size(bar_rect.min, Vec2::new(fill_w, bar_rect.height()));
            painter.rect_filled(fill_rect, 2.0, theme.bar_color(pct as f32));
        }
        ui.add_space(2.0);
    };

    for (extension, size) in shown {
        draw_row(ui, extension, *size);
    }
    if other_total > 0 {
        draw_row(ui, "Other", other_total);
    }
}
