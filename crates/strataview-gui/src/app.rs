/// Main `eframe::App` implementation for Strataview.
///
/// This is the top-level UI layout that composes all panels and widgets.
use crate::panels;
use crate::state::AppState;
use crate::theme::StrataviewTheme;
use crate::widgets;
use crate::widgets::treemap::AlwaysInFront;
use strataview_core::ray::Ray;

/// The Strataview application.
pub struct StrataviewApp {
    state: AppState,
}

impl StrataviewApp {
    /// Create a new application instance.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let theme = StrataviewTheme::dark();
        theme.apply(&cc.egui_ctx);

        Self {
            state: AppState::new(),
        }
    }
}

impl eframe::App for StrataviewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let _data_changed = self.state.process_scan_messages();
        self.state.process_monitor_messages();

        let theme = StrataviewTheme::for_mode(self.state.theme_mode);
        theme.apply(ctx);

        if self.state.phase == crate::state::AppPhase::Scanning {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        } else if self.state.show_monitor_panel {
            ctx.request_repaint_after(std::time::Duration::from_millis(250));
        }

        // ── Top toolbar ───────────────────────────────────────────
        egui::TopBottomPanel::top("toolbar")
            .min_height(36.0)
            .show(ctx, |ui| {
                ui.add_space(4.0);
                widgets::toolbar::toolbar(ui, &mut self.state);
                ui.add_space(4.0);
            });

        // ── Bottom status bar ─────────────────────────────────────
        egui::TopBottomPanel::bottom("status_bar")
            .min_height(24.0)
            .show(ctx, |ui| {
                ui.add_space(2.0);
                widgets::status_bar::status_bar(ui, &self.state, &theme);
                ui.add_space(2.0);
            });

        // ── Live change monitor (bottom, above status bar) ─────────
        if self.state.show_monitor_panel {
            egui::TopBottomPanel::bottom("monitor_panel")
                .min_height(180.0)
                .resizable(true)
                .show(ctx, |ui| {
                    panels::monitor_panel::monitor_panel(ui, &mut self.state);
                });
        }

        // ── Left sidebar ──────────────────────────────────────────
        egui::SidePanel::left("left_panel")
            .default_width(500.0)
            .min_width(300.0)
            .max_width(800.0)
            .resizable(true)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    panels::scan_panel::scan_panel(ui, &mut self.state);
                    ui.add_space(8.0);
                    ui.separator();
                    ui.add_space(4.0);
                    panels::tree_panel::tree_panel(ui, &mut self.state, &theme);
                });
            });

        // ── Right details panel ───────────────────────────────────
        egui::SidePanel::right("right_panel")
            .default_width(220.0)
            .min_width(180.0)
            .max_width(350.0)
            .resizable(true)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    panels::details_panel::details_panel(ui, &self.state, &theme);
                    ui.add_space(16.0);
                    ui.separator();
                    ui.add_space(8.0);
                    panels::chart_panel::chart_panel(ui, &self.state, &theme);
                });
            });

        // ── Central panel (Treemap) ───────────────────────────────
        egui::CentralPanel::default().show(ctx, |ui| {
            use widgets::treemap::TreemapAction;
            if let Some(act) = widgets::treemap::treemap(ui, &self.state, &theme) {
                match act {
                    TreemapAction::NavigateInto(node) => {
                        self.state.treemap_navigate_into(node);
                        self.state.selected_node = Some(node);
                        self.state.reveal_node_in_tree(node);
                    }
                    TreemapAction::Select(node) => {
                        self.state.selected_node = Some(node);
                        self.state.reveal_node_in_tree(node);
                    }
                    TreemapAction::RayPick(ray) => {
                        self.handle_ray_pick(ray);
                    }
                    TreemapAction::Back => self.state.treemap_go_back(),
                    TreemapAction::Forward => self.state.treemap_go_forward(),
                    TreemapAction::Up => self.state.treemap_go_up(),
                }
            }
        });

        if self.state.show_about {
            egui::Window::new("About Strataview")
                .collapsible(false)
                .resizable(false)
                .open(&mut self.state.show_about)
                .show(ctx, |ui| {
                    ui.label("Strataview");
                    ui.label("A 3-D squarified-treemap disk usage visualiser.");
                });
        }
    }
}

impl StrataviewApp {
    fn handle_ray_pick(&mut self, ray: Ray) {
        if let Some(node) = self.state.session.select_node_via_ray(&AlwaysInFront, ray) {
            self.state.selected_node = Some(node);
            self.state.reveal_node_in_tree(node);
        }
    }
}
