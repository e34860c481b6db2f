/// Interactive treemap widget — projects the core's own squarified-layout
/// geometry onto the screen instead of re-deriving it.
///
/// The layout engine already computes an absolute world-space [`Block`] for
/// every node, nested so a child's footprint always lies inside its
/// parent's padded footprint. This widget only has to pick a focus node,
/// map its footprint onto the available screen rect, and linearly project
/// every descendant (up to a depth cap) into that same rect — the
/// squarified packing itself is never recomputed here.
///
/// Clicking maps the cursor back into world space and returns a [`Ray`] for
/// the caller to cast through [`Session::select_node_via_ray`], exercising
/// the real ray-picker rather than a hand-rolled 2-D hit test whenever the
/// click doesn't land on an already-drawn rectangle.
use egui::{Color32, Rect, Sense, Ui};

use strataview_core::model::file_info::FileKind;
use strataview_core::model::{Block, NodeId, Point3};
use strataview_core::ray::{Camera, Ray};

use crate::state::AppState;
use crate::theme::StrataviewTheme;

/// How many levels below the focus node are projected onto the screen at
/// once. Deeper nodes are reached by drilling in (changing the focus).
const MAX_NEST_DEPTH: u32 = 4;

/// Skip drawing (and labeling) a rectangle this small in screen pixels.
const MIN_RECT_SIDE: f32 = 2.0;

const MIN_LABEL_W: f32 = 40.0;
const MIN_LABEL_H: f32 = 14.0;

/// A camera with no near plane of its own — every hit in front of the
/// downward-cast ray's origin counts, since the treemap has no real 3-D
/// camera to consult.
pub struct AlwaysInFront;
impl Camera for AlwaysInFront {
    fn is_in_front_of_near_plane(&self, _point: Point3) -> bool {
        true
    }
}

pub enum TreemapAction {
    NavigateInto(NodeId),
    Select(NodeId),
    /// A click that missed every drawn rectangle (a gap left by padding,
    /// or a visibility-filtered node); the caller resolves it with
    /// [`Session::select_node_via_ray`].
    RayPick(Ray),
    Back,
    Forward,
    Up,
}

/// Draw the treemap in the available space and return an action for the
/// caller to apply, deferred so the widget itself never mutates `state`
/// beyond what egui's immediate-mode model already requires.
pub fn treemap(ui: &mut Ui, state: &AppState, theme: &StrataviewTheme) -> Option<TreemapAction> {
    let Some(tree) = state.session.tree() else {
        ui.centered_and_justified(|ui| {
            ui.label(egui::RichText::new("Scan a folder to see its treemap").color(theme.text_muted));
        });
        return None;
    };
    let guard = tree.read();
    let focus = state.treemap_focus.unwrap_or_else(|| guard.root());

    let mut action = None;

    ui.horizontal(|ui| {
        if ui.button("⬅").on_hover_text("Back").clicked() {
            action = Some(TreemapAction::Back);
        }
        if ui.button("➡").on_hover_text("Forward").clicked() {
            action = Some(TreemapAction::Forward);
        }
        if ui.button("⬆").on_hover_text("Up one level").clicked() {
            action = Some(TreemapAction::Up);
        }
        let name = guard.payload(focus).file.name.clone();
        ui.label(
            egui::RichText::new(name.as_str())
                .strong()
                .color(theme.text_primary),
        );
    });

    let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click());
    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, 0.0, theme.background);

    let focus_block = guard.payload(focus).block;
    if focus_block.width <= 0.0 || focus_block.depth <= 0.0 {
        return action;
    }

    let to_screen = |x: f64, z: f64| -> egui::Pos2 {
        let u = (x - focus_block.origin.x) / focus_block.width;
        let v = (focus_block.origin.z - z) / focus_block.depth;
        egui::pos2(
            rect.left() + u as f32 * rect.width(),
            rect.top() + v as f32 * rect.height(),
        )
    };

    let block_screen_rect = |b: &Block| -> Rect {
        let top_left = to_screen(b.origin.x, b.origin.z);
        let bottom_right = to_screen(b.origin.x + b.width, b.origin.z - b.depth);
        Rect::from_two_pos(top_left, bottom_right)
    };

    let mut clicked_node: Option<NodeId> = None;
    let mut hover_label: Option<String> = None;
    let mut click_landed = false;

    // Breadth-first so a directory's own rectangle is drawn, then painted
    // over by its children's, in a stable shallow-to-deep order.
    let mut frontier = vec![(focus, 0u32)];
    while let Some((node, depth)) = frontier.pop() {
        let payload = guard.payload(node);
        let screen_rect = block_screen_rect(&payload.block);
        if screen_rect.width() < MIN_RECT_SIDE || screen_rect.height() < MIN_RECT_SIDE {
            continue;
        }

        let color = state
            .session
            .node_color(node)
            .map(|c| Color32::from_rgb(c.0, c.1, c.2))
            .unwrap_or(theme.surface);
        painter.rect_filled(screen_rect, 0.0, color);
        painter.rect_stroke(screen_rect, 0.0, egui::Stroke::new(1.0, theme.separator));

        if screen_rect.width() >= MIN_LABEL_W && screen_rect.height() >= MIN_LABEL_H {
            painter.text(
                screen_rect.left_top() + egui::vec2(3.0, 2.0),
                egui::Align2::LEFT_TOP,
                payload.file.name.as_str(),
                egui::FontId::proportional(11.0),
                theme.text_primary,
            );
        }

        if let Some(pos) = response.interact_pointer_pos() {
            if screen_rect.contains(pos) {
                click_landed = true;
                if response.clicked() {
                    clicked_node = Some(node);
                }
            }
        }
        if let Some(pos) = response.hover_pos() {
            if screen_rect.contains(pos) {
                hover_label = Some(format!(
                    "{}\n{}",
                    payload.file.name,
                    strataview_core::model::size::format_size(payload.file.size)
                ));
            }
        }

        if depth < MAX_NEST_DEPTH && payload.file.kind == FileKind::Directory {
            for child in guard.children(node) {
                frontier.push((child, depth + 1));
            }
        }
    }

    if let Some(text) = hover_label {
        response.clone().on_hover_text(text);
    }

    if let Some(node) = clicked_node {
        let is_dir = guard.payload(node).file.kind == FileKind::Directory;
        action = Some(if is_dir && node != focus {
            TreemapAction::NavigateInto(node)
        } else {
            TreemapAction::Select(node)
        });
    } else if response.clicked() && !click_landed {
        if let Some(pos) = response.interact_pointer_pos() {
            let u = (pos.x - rect.left()) / rect.width();
            let v = (pos.y - rect.top()) / rect.height();
            let wx = focus_block.origin.x + u as f64 * focus_block.width;
            let wz = focus_block.origin.z - v as f64 * focus_block.depth;
            action = Some(TreemapAction::RayPick(Ray {
                origin: Point3::new(wx, 1000.0, wz),
                direction: Point3::new(0.0, -1.0, 0.0),
            }));
        }
    }

    action
}
