//! Session façade (§4.8): the single object the UI binds to. Wires the
//! scanner (§4.2), layout engine (§4.3), bounding-volume pass (§4.4),
//! ray-picker (§4.5), change monitor (§4.6), and reconciler (§4.7)
//! together, and owns the selection/highlight state none of those
//! modules know about individually.
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use crate::bounds::compute_bounding_boxes;
use crate::color::{ColorScheme, Rgb};
use crate::config::SessionConfig;
use crate::layout::layout_tree;
use crate::model::aggregate::{prune_zero_size, rollup_sizes, sort_children_by_size_desc};
use crate::model::{FileKind, FileTree, NodeId};
use crate::monitor::{self, FileEvent, MonitorHandle};
use crate::ray::{self, Camera, Ray, VisibilityFilter};
use crate::reconcile::{Reconciler, ResolvedEvent};
use crate::scanner::error::ScanError;
use crate::scanner::progress::ScanProgress;
use crate::scanner::{self, LiveTree, ScanHandle};

/// Everything a session needs to resolve a scanned tree into visible,
/// colored, pickable geometry.
pub struct Session {
    config: SessionConfig,
    colors: ColorScheme,
    filter: VisibilityFilter,

    scan: Option<ScanHandle>,
    tree: Option<LiveTree>,
    root_path: Option<PathBuf>,
    monitor: Option<MonitorHandle>,
    reconciler: Option<Reconciler>,

    selected: Option<NodeId>,
    highlighted: HashSet<NodeId>,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        let filter = config.default_filter.into();
        Self {
            config,
            colors: ColorScheme::built_in_default(),
            filter,
            scan: None,
            tree: None,
            root_path: None,
            monitor: None,
            reconciler: None,
            selected: None,
            highlighted: HashSet::new(),
        }
    }

    pub fn with_color_scheme(mut self, colors: ColorScheme) -> Self {
        self.colors = colors;
        self
    }

    /// Start scanning `root`. Only one scan may be active at a time;
    /// starting another cancels and drops whatever was running.
    pub fn scan(&mut self, root: PathBuf, filter: VisibilityFilter) -> Result<(), ScanError> {
        self.stop_scan();
        self.filter = filter;
        self.selected = None;
        self.highlighted.clear();

        let handle = scanner::start_scan(root.clone(), self.config.scan_concurrency)?;
        self.tree = Some(handle.live_tree.clone());
        self.root_path = Some(root);
        self.scan = Some(handle);
        Ok(())
    }

    /// Cancel the active scan, if any, and drop the monitor/reconciler
    /// that belonged to whatever tree was previously live.
    pub fn stop_scan(&mut self) {
        if let Some(handle) = self.scan.take() {
            handle.cancel();
        }
        self.monitor.take().map(MonitorHandle::stop);
        self.reconciler = None;
    }

    /// Poll the active scan's progress channel once. Returns `true` the
    /// moment a `Complete` message arrives, at which point the tree has
    /// already been rolled up, pruned, sorted, laid out, and bounded, and
    /// (if `enable_monitor`) the monitor and reconciler have been started.
    pub fn poll_scan(&mut self) -> Option<ScanProgress> {
        let progress = self.scan.as_ref()?.progress_rx.try_recv().ok()?;
        if let ScanProgress::Complete { .. } = &progress {
            self.finish_scan();
        }
        Some(progress)
    }

    fn finish_scan(&mut self) {
        let (Some(tree), Some(root_path)) = (self.tree.clone(), self.root_path.clone()) else {
            return;
        };
        {
            let mut t = tree.write();
            rollup_sizes(&mut t);
            prune_zero_size(&mut t);
            sort_children_by_size_desc(&mut t);
            layout_tree(&mut t);
            compute_bounding_boxes(&mut t);
        }

        if self.config.enable_monitor {
            match monitor::start(&root_path) {
                Ok((handle, events_rx)) => {
                    let reconciler = Reconciler::spawn(tree.clone(), root_path.clone());
                    let ingest = reconciler.ingest_sender();
                    std::thread::Builder::new()
                        .name("strataview-monitor-forward".into())
                        .spawn(move || {
                            while let Ok(event) = events_rx.recv() {
                                if ingest.send(event).is_err() {
                                    return;
                                }
                            }
                        })
                        .expect("failed to spawn monitor-forward thread");
                    self.monitor = Some(handle);
                    self.reconciler = Some(reconciler);
                }
                Err(e) => {
                    tracing::warn!("session: failed to start change monitor: {e}");
                }
            }
        }
        info!(root = %root_path.display(), "session: scan finished, tree ready");
    }

    pub fn tree(&self) -> Option<LiveTree> {
        self.tree.clone()
    }

    pub fn root_path(&self) -> Option<&Path> {
        self.root_path.as_deref()
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    pub fn visibility_filter(&self) -> VisibilityFilter {
        self.filter
    }

    pub fn set_visibility_filter(&mut self, filter: VisibilityFilter) {
        self.filter = filter;
    }

    /// Cast a ray against the live tree, selecting whatever it hits (or
    /// clearing the selection if it hits nothing).
    pub fn select_node_via_ray(&mut self, camera: &dyn Camera, ray: Ray) -> Option<NodeId> {
        let tree = self.tree.as_ref()?;
        let guard = tree.read();
        self.selected = ray::pick(&guard, &ray, camera, &self.filter);
        self.selected
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn clear_highlights(&mut self) {
        self.highlighted.clear();
    }

    /// Case-insensitive substring search over name+extension, gated by
    /// `search_files`/`search_dirs` and the active visibility filter.
    /// Replaces the highlight set with the matches found.
    pub fn search(&mut self, query: &str, search_files: bool, search_dirs: bool) -> &HashSet<NodeId> {
        self.highlighted.clear();
        let needle = query.to_lowercase();
        if let Some(tree) = self.tree.as_ref() {
            let guard = tree.read();
            for id in guard.descendants_preorder(guard.root()) {
                let file = &guard.payload(id).file;
                let kind_ok = match file.kind {
                    FileKind::Directory => search_dirs,
                    _ => search_files,
                };
                if !kind_ok || file.size < self.filter.min_size {
                    continue;
                }
                let haystack = if file.extension.is_empty() {
                    file.name.to_lowercase()
                } else {
                    format!("{}.{}", file.name, file.extension).to_lowercase()
                };
                if haystack.contains(&needle) {
                    self.highlighted.insert(id);
                }
            }
        }
        &self.highlighted
    }

    pub fn highlight_descendants(&mut self, handle: NodeId) -> &HashSet<NodeId> {
        self.highlighted.clear();
        if let Some(tree) = self.tree.as_ref() {
            let guard = tree.read();
            self.highlighted.extend(guard.descendants_preorder(handle));
        }
        &self.highlighted
    }

    pub fn highlight_ancestors(&mut self, handle: NodeId) -> &HashSet<NodeId> {
        self.highlighted.clear();
        if let Some(tree) = self.tree.as_ref() {
            let guard = tree.read();
            let mut cur = guard.parent(handle);
            while let Some(id) = cur {
                self.highlighted.insert(id);
                cur = guard.parent(id);
            }
        }
        &self.highlighted
    }

    pub fn highlight_matching_extension(&mut self, handle: NodeId) -> &HashSet<NodeId> {
        self.highlighted.clear();
        if let Some(tree) = self.tree.as_ref() {
            let guard = tree.read();
            let extension = guard.payload(handle).file.extension.clone();
            if !extension.is_empty() {
                for id in guard.descendants_preorder(guard.root()) {
                    if guard.payload(id).file.extension == extension {
                        self.highlighted.insert(id);
                    }
                }
            }
        }
        &self.highlighted
    }

    /// Non-blocking drain of one reconciled filesystem event, for the
    /// renderer's per-frame poll.
    pub fn fetch_next_file_event(&self) -> Option<ResolvedEvent> {
        self.reconciler.as_ref()?.try_recv_update()
    }

    /// Final color for `handle`, folding in the current selection and
    /// highlight state.
    pub fn node_color(&self, handle: NodeId) -> Option<Rgb> {
        let tree = self.tree.as_ref()?;
        let guard = tree.read();
        let file = &guard.payload(handle).file;
        Some(self.colors.node_color(
            file,
            self.selected == Some(handle),
            self.highlighted.contains(&handle),
        ))
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::thread;
    use std::time::{Duration, Instant};
    use tempfile::tempdir;

    fn wait_for_complete(session: &mut Session, timeout: Duration) -> bool {
        let start = Instant::now();
        loop {
            if let Some(ScanProgress::Complete { .. }) = session.poll_scan() {
                return true;
            }
            if start.elapsed() > timeout {
                return false;
            }
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn scan_then_pick_resolves_to_a_node() {
        let tmp = tempdir().unwrap();
        fs::write(tmp.path().join("a.txt"), vec![0u8; 1024]).unwrap();

        let mut session = Session::new(SessionConfig {
            enable_monitor: false,
            ..SessionConfig::default()
        });
        session
            .scan(tmp.path().to_path_buf(), VisibilityFilter::SHOW_ALL)
            .unwrap();
        assert!(wait_for_complete(&mut session, Duration::from_secs(5)));

        let tree = session.tree().unwrap();
        let guard = tree.read();
        let child = guard.first_child(guard.root()).unwrap();
        let block = guard.payload(child).block;
        drop(guard);

        struct AlwaysInFront;
        impl Camera for AlwaysInFront {
            fn is_in_front_of_near_plane(&self, _point: crate::model::Point3) -> bool {
                true
            }
        }

        let cx = block.origin.x + block.width / 2.0;
        let cz = block.origin.z - block.depth / 2.0;
        let ray = Ray {
            origin: crate::model::Point3::new(cx, 1000.0, cz),
            direction: crate::model::Point3::new(0.0, -1.0, 0.0),
        };
        let hit = session.select_node_via_ray(&AlwaysInFront, ray);
        assert_eq!(hit, Some(child));
        assert_eq!(session.selected(), Some(child));
    }

    #[test]
    fn search_highlights_matching_names_only() {
        let tmp = tempdir().unwrap();
        fs::write(tmp.path().join("report.csv"), b"a,b,c").unwrap();
        fs::write(tmp.path().join("notes.txt"), b"hello").unwrap();

        let mut session = Session::new(SessionConfig {
            enable_monitor: false,
            ..SessionConfig::default()
        });
        session
            .scan(tmp.path().to_path_buf(), VisibilityFilter::SHOW_ALL)
            .unwrap();
        assert!(wait_for_complete(&mut session, Duration::from_secs(5)));

        let matches = session.search("report", true, true).clone();
        assert_eq!(matches.len(), 1);

        let tree = session.tree().unwrap();
        let guard = tree.read();
        let matched_name = guard.payload(*matches.iter().next().unwrap()).file.name.clone();
        assert_eq!(matched_name, "report.csv");
    }

    #[test]
    fn clearing_highlights_empties_the_set() {
        let tmp = tempdir().unwrap();
        fs::write(tmp.path().join("a.txt"), b"x").unwrap();
        let mut session = Session::new(SessionConfig {
            enable_monitor: false,
            ..SessionConfig::default()
        });
        session
            .scan(tmp.path().to_path_buf(), VisibilityFilter::SHOW_ALL)
            .unwrap();
        assert!(wait_for_complete(&mut session, Duration::from_secs(5)));

        session.search("a", true, true);
        assert!(!session.highlighted.is_empty());
        session.clear_highlights();
        assert!(session.highlighted.is_empty());
    }

    #[test]
    fn node_color_reflects_selection() {
        let tmp = tempdir().unwrap();
        fs::write(tmp.path().join("a.rs"), b"fn main() {}").unwrap();
        let mut session = Session::new(SessionConfig {
            enable_monitor: false,
            ..SessionConfig::default()
        });
        session
            .scan(tmp.path().to_path_buf(), VisibilityFilter::SHOW_ALL)
            .unwrap();
        assert!(wait_for_complete(&mut session, Duration::from_secs(5)));

        let tree = session.tree().unwrap();
        let child = {
            let guard = tree.read();
            guard.first_child(guard.root()).unwrap()
        };

        let unselected = session.node_color(child).unwrap();
        session.selected = Some(child);
        let selected = session.node_color(child).unwrap();
        assert_ne!(unselected, selected);
        assert_eq!(selected, crate::color::SELECTED_COLOR);
    }
}
