/// Application state machine — owns the [`Session`] and the view-local
/// bookkeeping (expansion set, navigation history, monitor log) that has no
/// business living in the core crate.
///
/// `AppState` is deliberately thin: scanning, layout, picking, search and
/// coloring are all delegated straight to `Session`. What's left here is
/// purely a matter of how the GUI chooses to present that state — which
/// rows are visible, which directory the treemap is focused on, how many
/// monitor events to keep around for display.
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use strataview_core::config::SessionConfig;
use strataview_core::model::{FileKind, NodeId};
use strataview_core::ray::VisibilityFilter;
use strataview_core::reconcile::ResolvedEvent;
use strataview_core::scanner::progress::ScanProgress;
use strataview_core::session::Session;

use crate::theme::ThemeMode;

/// Upper bound on scan-progress messages drained in a single frame, so a
/// burst of queued updates can't stall the UI thread.
const MAX_MESSAGES_PER_FRAME: usize = 300;

/// Upper bound on monitor events drained in a single frame.
const MAX_MONITOR_MESSAGES_PER_FRAME: usize = 200;

/// How many monitor events to keep for display before dropping the oldest.
const MAX_MONITOR_ENTRIES: usize = 500;

/// How many directory levels deep `treemap_go_back`/`treemap_go_forward`
/// history is allowed to grow.
const MAX_NAV_HISTORY: usize = 50;

/// Coarse phase of the application, driving which panel/toolbar state is
/// shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppPhase {
    Idle,
    Scanning,
    Results,
}

/// One row in the flattened, virtualisable tree view.
#[derive(Clone, Copy, Debug)]
pub struct VisibleRow {
    pub node: NodeId,
    pub depth: u16,
    pub is_expanded: bool,
}

pub struct AppState {
    pub session: Session,
    pub phase: AppPhase,
    pub theme_mode: ThemeMode,

    // Scan progress counters, refreshed by `process_scan_messages`.
    pub scan_files_found: u64,
    pub scan_dirs_found: u64,
    pub scan_bytes_processed: u64,
    pub scan_error_count: u64,
    pub scan_errors: Vec<(String, String)>,
    pub scan_duration: Option<Duration>,
    pub scan_was_cancelled: bool,

    // Tree-view presentation.
    pub expanded: HashSet<NodeId>,
    pub visible_rows: Vec<VisibleRow>,
    pub selected_node: Option<NodeId>,

    // Treemap navigation.
    pub treemap_focus: Option<NodeId>,
    nav_back: Vec<NodeId>,
    nav_forward: Vec<NodeId>,

    // Search / highlight.
    pub search_query: String,
    pub search_files: bool,
    pub search_dirs: bool,

    // UI chrome.
    pub show_about: bool,
    pub show_errors: bool,
    pub show_monitor_panel: bool,

    // Change-monitor log.
    pub monitor_entries: Vec<ResolvedEvent>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            session: Session::new(SessionConfig::default()),
            phase: AppPhase::Idle,
            theme_mode: ThemeMode::Dark,
            scan_files_found: 0,
            scan_dirs_found: 0,
            scan_bytes_processed: 0,
            scan_error_count: 0,
            scan_errors: Vec::new(),
            scan_duration: None,
            scan_was_cancelled: false,
            expanded: HashSet::new(),
            visible_rows: Vec::new(),
            selected_node: None,
            treemap_focus: None,
            nav_back: Vec::new(),
            nav_forward: Vec::new(),
            search_query: String::new(),
            search_files: true,
            search_dirs: true,
            show_about: false,
            show_errors: false,
            show_monitor_panel: false,
            monitor_entries: Vec::new(),
        }
    }

    /// Start scanning `root`. Resets every piece of per-scan state.
    pub fn start_scan(&mut self, root: PathBuf) {
        if self.session.scan(root, VisibilityFilter::SHOW_ALL).is_err() {
            return;
        }
        self.phase = AppPhase::Scanning;
        self.scan_files_found = 0;
        self.scan_dirs_found = 0;
        self.scan_bytes_processed = 0;
        self.scan_error_count = 0;
        self.scan_errors.clear();
        self.scan_duration = None;
        self.scan_was_cancelled = false;
        self.expanded.clear();
        self.visible_rows.clear();
        self.selected_node = None;
        self.treemap_focus = None;
        self.nav_back.clear();
        self.nav_forward.clear();
        self.monitor_entries.clear();
    }

    pub fn cancel_scan(&mut self) {
        self.session.stop_scan();
        self.scan_was_cancelled = true;
        self.phase = AppPhase::Idle;
    }

    /// Drain up to `MAX_MESSAGES_PER_FRAME` scan-progress messages. Returns
    /// `true` if the tree's shape may have changed (new data arrived, or the
    /// scan just completed) so the caller knows to rebuild `visible_rows`.
    pub fn process_scan_messages(&mut self) -> bool {
        let mut changed = self.phase == AppPhase::Scanning;
        for _ in 0..MAX_MESSAGES_PER_FRAME {
            let Some(progress) = self.session.poll_scan() else {
                break;
            };
            match progress {
                ScanProgress::Update {
                    files_scanned,
                    directories_scanned,
                    bytes_processed,
                } => {
                    self.scan_files_found = files_scanned;
                    self.scan_dirs_found = directories_scanned;
                    self.scan_bytes_processed = bytes_processed;
                }
                ScanProgress::Error { path, message } => {
                    self.scan_error_count += 1;
                    if self.scan_errors.len() < 500 {
                        self.scan_errors.push((path, message));
                    }
                }
                ScanProgress::Complete { duration, error_count } => {
                    self.scan_duration = Some(duration);
                    self.scan_error_count = error_count;
                    self.phase = AppPhase::Results;
                    self.treemap_focus = self.session.tree().map(|t| t.read().root());
                    changed = true;
                }
                ScanProgress::Cancelled => {
                    self.scan_was_cancelled = true;
                    self.phase = AppPhase::Idle;
                    changed = true;
                }
            }
        }
        if changed {
            self.rebuild_visible_rows();
        }
        changed
    }

    /// Drain reconciled filesystem events for display in the monitor panel.
    /// Live-monitored changes also invalidate the current row layout, since
    /// the tree they were applied to may have gained or lost nodes.
    pub fn process_monitor_messages(&mut self) {
        let mut any = false;
        for _ in 0..MAX_MONITOR_MESSAGES_PER_FRAME {
            let Some(event) = self.session.fetch_next_file_event() else {
                break;
            };
            any = true;
            self.monitor_entries.push(event);
            if self.monitor_entries.len() > MAX_MONITOR_ENTRIES {
                self.monitor_entries.remove(0);
            }
        }
        if any {
            self.rebuild_visible_rows();
        }
    }

    /// Rebuild the flat `visible_rows` list from the live tree, honoring
    /// `expanded`. Root itself is never shown as a row; its children become
    /// the top-level rows.
    pub fn rebuild_visible_rows(&mut self) {
        self.visible_rows.clear();
        let Some(tree) = self.session.tree() else {
            return;
        };
        let guard = tree.read();
        let root = guard.root();
        let mut stack: Vec<(NodeId, u16)> = guard
            .children(root)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .map(|c| (c, 0))
            .collect();

        while let Some((node, depth)) = stack.pop() {
            let is_dir = guard.payload(node).file.kind == FileKind::Directory;
            let is_expanded = is_dir && self.expanded.contains(&node);
            self.visible_rows.push(VisibleRow {
                node,
                depth,
                is_expanded,
            });
            if is_expanded {
                let children: Vec<_> = guard.children(node).collect();
                for c in children.into_iter().rev() {
                    stack.push((c, depth + 1));
                }
            }
        }
    }

    pub fn toggle_expand(&mut self, node: NodeId) {
        if !self.expanded.remove(&node) {
            self.expanded.insert(node);
        }
        self.rebuild_visible_rows();
    }

    /// Expand every ancestor of `node` and rebuild rows so it becomes
    /// visible, used when the treemap selects a node not currently shown in
    /// the tree view.
    pub fn reveal_node_in_tree(&mut self, node: NodeId) {
        let Some(tree) = self.session.tree() else {
            return;
        };
        let guard = tree.read();
        let mut cur = guard.parent(node);
        while let Some(id) = cur {
            self.expanded.insert(id);
            cur = guard.parent(id);
        }
        drop(guard);
        self.rebuild_visible_rows();
    }

    /// Reconstruct the absolute path for `node` by walking parent links
    /// back to the root and re-joining with the scanned root path.
    pub fn full_path(&self, node: NodeId) -> Option<PathBuf> {
        let tree = self.session.tree()?;
        let guard = tree.read();
        let mut names = Vec::new();
        let mut cur = Some(node);
        while let Some(id) = cur {
            if id == guard.root() {
                break;
            }
            names.push(guard.payload(id).file.name.to_string());
            cur = guard.parent(id);
        }
        names.reverse();
        let mut path = self.session.root_path()?.to_path_buf();
        for name in names {
            path.push(name);
        }
        Some(path)
    }

    /// Re-run the search over the live tree, replacing the highlight set.
    pub fn run_search(&mut self) {
        if self.search_query.is_empty() {
            self.session.clear_highlights();
            return;
        }
        self.session
            .search(&self.search_query, self.search_files, self.search_dirs);
    }

    // ── Treemap navigation ──────────────────────────────────────────

    pub fn treemap_navigate_into(&mut self, node: NodeId) {
        if let Some(current) = self.treemap_focus {
            if current == node {
                return;
            }
            self.nav_back.push(current);
            if self.nav_back.len() > MAX_NAV_HISTORY {
                self.nav_back.remove(0);
            }
        }
        self.nav_forward.clear();
        self.treemap_focus = Some(node);
    }

    pub fn treemap_go_back(&mut self) {
        if let Some(prev) = self.nav_back.pop() {
            if let Some(current) = self.treemap_focus {
                self.nav_forward.push(current);
            }
            self.treemap_focus = Some(prev);
        }
    }

    pub fn treemap_go_forward(&mut self) {
        if let Some(next) = self.nav_forward.pop() {
            if let Some(current) = self.treemap_focus {
                self.nav_back.push(current);
            }
            self.treemap_focus = Some(next);
        }
    }

    pub fn treemap_go_up(&mut self) {
        let Some(tree) = self.session.tree() else {
            return;
        };
        let guard = tree.read();
        if let Some(focus) = self.treemap_focus {
            if let Some(parent) = guard.parent(focus) {
                drop(guard);
                self.treemap_navigate_into(parent);
            }
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
