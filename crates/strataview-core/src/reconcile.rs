//! Event reconciler (§4.7): drains the monitor's ingest queue, resolves
//! each event's path to a node, mutates the tree, and forwards a resolved
//! copy to the update queue the renderer drains.
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crossbeam_channel::{bounded, select, Receiver, Sender};
use parking_lot::RwLock;
use tracing::debug;

use crate::model::aggregate::reaggregate_upward;
use crate::model::file_info::FileKind;
use crate::model::{FileInfo, FileTree, NodeId, Payload};
use crate::monitor::{FileEvent, FileEventKind};
use crate::scanner::parallel::{classify, file_name_of, Classification};

/// Capacity of the ingest queue (monitor thread → reconciler thread).
const INGEST_CHANNEL_CAPACITY: usize = 4_096;

/// A [`FileEvent`] after it's been applied to the tree, carrying whichever
/// node handle is now relevant so the renderer can update its per-instance
/// buffer without re-resolving the path itself.
#[derive(Clone, Debug)]
pub struct ResolvedEvent {
    pub event: FileEvent,
    /// The node created, touched, or (now-detached) deleted. `None` when
    /// the path could not be resolved and the event was dropped.
    pub node: Option<NodeId>,
}

/// Owns the reconciler's background thread. Dropping this (or calling
/// [`Reconciler::stop`]) signals the thread to exit and joins it.
pub struct Reconciler {
    ingest_tx: Sender<FileEvent>,
    update_rx: Receiver<ResolvedEvent>,
    stop_tx: Sender<()>,
    thread: Option<std::thread::JoinHandle<()>>,
}

impl Reconciler {
    /// Spawn a reconciler thread that applies events against `live_tree`.
    /// `root_path` is the absolute path the tree was scanned from, needed
    /// to turn an event's tree-relative path back into a real path to stat.
    pub fn spawn(live_tree: Arc<RwLock<FileTree>>, root_path: PathBuf) -> Self {
        let (ingest_tx, ingest_rx) = bounded::<FileEvent>(INGEST_CHANNEL_CAPACITY);
        let (update_tx, update_rx) = crossbeam_channel::unbounded::<ResolvedEvent>();
        let (stop_tx, stop_rx) = bounded::<()>(1);

        let thread = std::thread::Builder::new()
            .name("strataview-reconciler".into())
            .spawn(move || run(live_tree, root_path, ingest_rx, update_tx, stop_rx))
            .expect("failed to spawn reconciler thread");

        Self {
            ingest_tx,
            update_rx,
            stop_tx,
            thread: Some(thread),
        }
    }

    /// Sender the monitor's callback (or a test) posts raw events onto.
    pub fn ingest_sender(&self) -> Sender<FileEvent> {
        self.ingest_tx.clone()
    }

    /// Non-blocking drain of one resolved event, for the UI's per-frame poll.
    pub fn try_recv_update(&self) -> Option<ResolvedEvent> {
        self.update_rx.try_recv().ok()
    }

    /// Signal the reconciler thread to abandon its wait and exit, then join it.
    pub fn stop(mut self) {
        let _ = self.stop_tx.try_send(());
        if let Some(t) = self.thread.take() {
            let _ = t.join();
        }
    }
}

impl Drop for Reconciler {
    fn drop(&mut self) {
        let _ = self.stop_tx.try_send(());
        if let Some(t) = self.thread.take() {
            let _ = t.join();
        }
    }
}

fn run(
    live_tree: Arc<RwLock<FileTree>>,
    root_path: PathBuf,
    ingest_rx: Receiver<FileEvent>,
    update_tx: Sender<ResolvedEvent>,
    stop_rx: Receiver<()>,
) {
    loop {
        select! {
            recv(ingest_rx) -> msg => match msg {
                Ok(event) => {
                    let resolved = apply(&live_tree, &root_path, event);
                    if update_tx.send(resolved).is_err() {
                        return;
                    }
                }
                Err(_) => return,
            },
            recv(stop_rx) -> _ => return,
        }
    }
}

/// Walk `relative_path`'s components from `tree`'s root, matching each
/// against a direct child's `file.name`. Misses drop the event (§4.7.2).
fn resolve(tree: &FileTree, relative_path: &Path) -> Option<NodeId> {
    let mut cur = tree.root();
    for component in relative_path.components() {
        let name = component.as_os_str().to_string_lossy();
        cur = tree.children(cur).find(|&c| tree.payload(c).file.name == name.as_ref())?;
    }
    Some(cur)
}

/// Resolve everything but the last path component — the node the new
/// entry should be appended under.
fn resolve_parent(tree: &FileTree, relative_path: &Path) -> Option<NodeId> {
    match relative_path.parent() {
        Some(parent) if parent.as_os_str().is_empty() => Some(tree.root()),
        Some(parent) => resolve(tree, parent),
        None => Some(tree.root()),
    }
}

fn apply(live_tree: &Arc<RwLock<FileTree>>, root_path: &Path, event: FileEvent) -> ResolvedEvent {
    debug!(path = %event.relative_path.display(), kind = ?event.kind, "reconcile: applying event");

    let node = match &event.kind {
        FileEventKind::Created => apply_created(live_tree, root_path, &event.relative_path),
        FileEventKind::Deleted => apply_deleted(live_tree, &event.relative_path),
        FileEventKind::Touched => apply_touched(live_tree, root_path, &event.relative_path),
        FileEventKind::Renamed { to } => {
            // Open question (§9) resolved as Deleted(from) + Created(to).
            apply_deleted(live_tree, &event.relative_path);
            apply_created(live_tree, root_path, to)
        }
    };

    ResolvedEvent { event, node }
}

fn apply_created(
    live_tree: &Arc<RwLock<FileTree>>,
    root_path: &Path,
    relative_path: &Path,
) -> Option<NodeId> {
    let mut tree = live_tree.write();
    let parent = resolve_parent(&tree, relative_path)?;
    let absolute = root_path.join(relative_path);
    let name = file_name_of(relative_path);

    let payload = match classify(&absolute) {
        Classification::Directory => Payload::new(FileInfo::new_dir(name)),
        Classification::File(size) if size > 0 => Payload::new(FileInfo::new_file(name, size)),
        _ => return None,
    };

    let id = tree.append_child(parent, payload);
    reaggregate_upward(&mut tree, id);
    Some(id)
}

fn apply_deleted(live_tree: &Arc<RwLock<FileTree>>, relative_path: &Path) -> Option<NodeId> {
    let mut tree = live_tree.write();
    let target = resolve(&tree, relative_path)?;
    let parent = tree.parent(target);
    tree.detach(target);
    if let Some(parent) = parent {
        reaggregate_upward(&mut tree, parent);
    }
    Some(target)
}

fn apply_touched(
    live_tree: &Arc<RwLock<FileTree>>,
    root_path: &Path,
    relative_path: &Path,
) -> Option<NodeId> {
    let mut tree = live_tree.write();
    let target = resolve(&tree, relative_path)?;
    if tree.payload(target).file.kind != FileKind::Regular {
        // Directory "Touched" has no defined effect (§9) — silently ignored.
        return Some(target);
    }
    let absolute = root_path.join(relative_path);
    if let Ok(meta) = fs::metadata(&absolute) {
        tree.payload_mut(target).file.size = meta.len();
        reaggregate_upward(&mut tree, target);
    }
    Some(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FileInfo, Payload};
    use compact_str::CompactString;
    use std::time::SystemTime;
    use tempfile::tempdir;

    fn dir(name: &str) -> Payload {
        Payload::new(FileInfo::new_dir(CompactString::from(name)))
    }
    fn file(name: &str, size: u64) -> Payload {
        Payload::new(FileInfo::new_file(CompactString::from(name), size))
    }

    fn fresh() -> Arc<RwLock<FileTree>> {
        Arc::new(RwLock::new(FileTree::new(dir("root"))))
    }

    fn evt(path: &Path, kind: FileEventKind) -> FileEvent {
        FileEvent {
            relative_path: path.to_path_buf(),
            kind,
            timestamp: SystemTime::now(),
        }
    }

    #[test]
    fn deleting_a_resolved_node_detaches_it_and_rerolls_parent() {
        let tmp = tempdir().unwrap();
        let tree = fresh();
        let sub_id;
        let leaf_id;
        {
            let mut t = tree.write();
            let root = t.root();
            sub_id = t.append_child(root, dir("sub"));
            leaf_id = t.append_child(sub_id, file("a.txt", 100));
            t.payload_mut(sub_id).file.size = 100;
        }

        let resolved = apply(
            &tree,
            tmp.path(),
            evt(&PathBuf::from("sub/a.txt"), FileEventKind::Deleted),
        );
        assert_eq!(resolved.node, Some(leaf_id));

        let t = tree.read();
        assert_eq!(t.child_count(sub_id), 0);
        assert_eq!(t.payload(sub_id).file.size, 0);
    }

    #[test]
    fn deleting_an_unresolvable_path_is_dropped_silently() {
        let tmp = tempdir().unwrap();
        let tree = fresh();
        let resolved = apply(
            &tree,
            tmp.path(),
            evt(&PathBuf::from("ghost.txt"), FileEventKind::Deleted),
        );
        assert_eq!(resolved.node, None);
    }

    #[test]
    fn creating_a_real_file_appends_and_reaggregates() {
        let tmp = tempdir().unwrap();
        fs::write(tmp.path().join("new.txt"), b"hello world").unwrap();
        let tree = fresh();

        let resolved = apply(
            &tree,
            tmp.path(),
            evt(&PathBuf::from("new.txt"), FileEventKind::Created),
        );
        assert!(resolved.node.is_some());
        let t = tree.read();
        assert_eq!(t.payload(resolved.node.unwrap()).file.size, 11);
    }

    #[test]
    fn touching_a_regular_file_refreshes_its_size() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("grows.txt");
        fs::write(&path, b"12345").unwrap();
        let tree = fresh();
        let leaf_id;
        {
            let mut t = tree.write();
            let root = t.root();
            leaf_id = t.append_child(root, file("grows.txt", 1));
        }

        fs::write(&path, b"1234567890").unwrap();
        let resolved = apply(
            &tree,
            tmp.path(),
            evt(&PathBuf::from("grows.txt"), FileEventKind::Touched),
        );
        assert_eq!(resolved.node, Some(leaf_id));
        assert_eq!(tree.read().payload(leaf_id).file.size, 10);
    }

    #[test]
    fn idempotent_delete_of_an_already_deleted_node_is_a_noop() {
        let tmp = tempdir().unwrap();
        let tree = fresh();
        let leaf_id;
        {
            let mut t = tree.write();
            let root = t.root();
            leaf_id = t.append_child(root, file("a.txt", 10));
        }
        let first = apply(
            &tree,
            tmp.path(),
            evt(&PathBuf::from("a.txt"), FileEventKind::Deleted),
        );
        assert_eq!(first.node, Some(leaf_id));
        let second = apply(
            &tree,
            tmp.path(),
            evt(&PathBuf::from("a.txt"), FileEventKind::Deleted),
        );
        assert_eq!(second.node, None);
    }
}
