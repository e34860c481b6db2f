/// Bounded worker-pool directory walker (§4.2 of the design).
///
/// A `rayon` scoped thread pool sized to the caller's concurrency bound
/// drains a recursive task set: one task per directory, each posting one
/// further task per child directory it finds. Tree insertions all go
/// through the single `LiveTree` write lock, held only for one
/// `append_child` call at a time, so contention stays low even with many
/// workers.
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use compact_str::CompactString;
use crossbeam_channel::Sender;
use tracing::{debug, warn};

use crate::model::{aggregate, FileInfo, NodeId, Payload};
use crate::scanner::progress::ScanProgress;
use crate::scanner::LiveTree;

#[derive(Default)]
struct Counters {
    files: AtomicU64,
    dirs: AtomicU64,
    bytes: AtomicU64,
    errors: AtomicU64,
}

const PROGRESS_REPORT_INTERVAL: Duration = Duration::from_millis(200);

/// Scan `root_path` into `live_tree` (already seeded with a root node) using
/// a worker pool of `concurrency` threads. Sends progress on `progress_tx`
/// and checks `cancel` cooperatively between directory entries.
pub fn scan_parallel(
    root_path: PathBuf,
    concurrency: usize,
    progress_tx: Sender<ScanProgress>,
    cancel: Arc<AtomicBool>,
    live_tree: LiveTree,
) {
    let start = Instant::now();
    let counters = Arc::new(Counters::default());
    let root_id = live_tree.read().root();

    let reporter_done = Arc::new(AtomicBool::new(false));
    let reporter =
        spawn_progress_reporter(counters.clone(), progress_tx.clone(), reporter_done.clone());

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(concurrency.max(1))
        .thread_name(|i| format!("strataview-scan-{i}"))
        .build();

    match pool {
        Ok(pool) => pool.in_place_scope(|scope| {
            scan_dir_task(
                scope,
                live_tree.clone(),
                root_id,
                root_path,
                cancel.clone(),
                counters.clone(),
                progress_tx.clone(),
            );
        }),
        Err(e) => {
            warn!("failed to build scan thread pool ({e}); scanning on the calling thread");
            scan_dir_recursive(&live_tree, root_id, &root_path, &cancel, &counters, &progress_tx);
        }
    }

    reporter_done.store(true, Ordering::Relaxed);
    let _ = reporter.join();

    if cancel.load(Ordering::Relaxed) {
        debug!("scan cancelled after {:?}", start.elapsed());
        let _ = progress_tx.send(ScanProgress::Cancelled);
        return;
    }

    {
        let mut tree = live_tree.write();
        aggregate::rollup_sizes(&mut tree);
        aggregate::prune_zero_size(&mut tree);
        aggregate::sort_children_by_size_desc(&mut tree);
    }

    let error_count = counters.errors.load(Ordering::Relaxed);
    debug!(
        "scan complete in {:?}: {} files, {} dirs, {} errors",
        start.elapsed(),
        counters.files.load(Ordering::Relaxed),
        counters.dirs.load(Ordering::Relaxed),
        error_count,
    );

    let _ = progress_tx.send(ScanProgress::Complete {
        duration: start.elapsed(),
        error_count,
    });
}

fn spawn_progress_reporter(
    counters: Arc<Counters>,
    progress_tx: Sender<ScanProgress>,
    done: Arc<AtomicBool>,
) -> std::thread::JoinHandle<()> {
    std::thread::Builder::new()
        .name("strataview-scan-progress".into())
        .spawn(move || {
            while !done.load(Ordering::Relaxed) {
                std::thread::sleep(PROGRESS_REPORT_INTERVAL);
                let _ = progress_tx.send(ScanProgress::Update {
                    files_scanned: counters.files.load(Ordering::Relaxed),
                    directories_scanned: counters.dirs.load(Ordering::Relaxed),
                    bytes_processed: counters.bytes.load(Ordering::Relaxed),
                });
            }
        })
        .expect("failed to spawn scan progress reporter thread")
}

pub(crate) enum Classification {
    File(u64),
    Directory,
    Skip,
}

/// A path is scannable as a directory iff it is a directory and not a
/// symlink. `symlink_metadata` never follows the final path component, so a
/// symlink pointing at a directory is reported here as a symlink, not a
/// directory — this is what keeps the scanner from following link loops.
///
/// Shared with the reconciler (§4.7), which needs the same classification
/// to decide whether a live-created path is a file or directory node.
pub(crate) fn classify(path: &Path) -> Classification {
    let meta = match fs::symlink_metadata(path) {
        Ok(m) => m,
        Err(_) => return Classification::Skip,
    };
    if meta.file_type().is_symlink() {
        return Classification::Skip;
    }
    if meta.is_dir() {
        Classification::Directory
    } else if meta.is_file() {
        Classification::File(meta.len())
    } else {
        Classification::Skip
    }
}

pub(crate) fn file_name_of(path: &Path) -> CompactString {
    CompactString::from(
        path.file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
    )
}

/// Name to give the root node: the final path component, or the whole
/// path for filesystem roots (e.g. `/`) that have none.
pub fn root_display_name(path: &Path) -> CompactString {
    match path.file_name() {
        Some(n) => CompactString::from(n.to_string_lossy()),
        None => CompactString::from(path.to_string_lossy()),
    }
}

/// Posts one `rayon::Scope` task per child directory of `path`.
fn scan_dir_task<'scope>(
    scope: &rayon::Scope<'scope>,
    live_tree: LiveTree,
    parent: NodeId,
    path: PathBuf,
    cancel: Arc<AtomicBool>,
    counters: Arc<Counters>,
    progress_tx: Sender<ScanProgress>,
) {
    if cancel.load(Ordering::Relaxed) {
        return;
    }

    let entries = match fs::read_dir(&path) {
        Ok(rd) => rd,
        Err(e) => {
            counters.errors.fetch_add(1, Ordering::Relaxed);
            let _ = progress_tx.send(ScanProgress::Error {
                path: path.display().to_string(),
                message: e.to_string(),
            });
            return;
        }
    };

    for entry in entries {
        if cancel.load(Ordering::Relaxed) {
            return;
        }
        let entry = match entry {
            Ok(e) => e,
            Err(_) => break, // enumeration failed mid-stream; abandon the rest
        };
        let entry_path = entry.path();
        match classify(&entry_path) {
            Classification::File(size) if size > 0 => {
                record_file(&live_tree, parent, &entry_path, size, &counters);
            }
            Classification::Directory => {
                let child_id = record_dir(&live_tree, parent, &entry_path, &counters);
                let live_tree = live_tree.clone();
                let cancel = cancel.clone();
                let counters = counters.clone();
                let progress_tx = progress_tx.clone();
                scope.spawn(move |scope| {
                    scan_dir_task(scope, live_tree, child_id, entry_path, cancel, counters, progress_tx);
                });
            }
            Classification::File(_) | Classification::Skip => {}
        }
    }
}

/// Single-threaded fallback walker, used only if the scoped pool fails to build.
fn scan_dir_recursive(
    live_tree: &LiveTree,
    parent: NodeId,
    path: &Path,
    cancel: &Arc<AtomicBool>,
    counters: &Arc<Counters>,
    progress_tx: &Sender<ScanProgress>,
) {
    if cancel.load(Ordering::Relaxed) {
        return;
    }
    let entries = match fs::read_dir(path) {
        Ok(rd) => rd,
        Err(e) => {
            counters.errors.fetch_add(1, Ordering::Relaxed);
            let _ = progress_tx.send(ScanProgress::Error {
                path: path.display().to_string(),
                message: e.to_string(),
            });
            return;
        }
    };
    for entry in entries {
        if cancel.load(Ordering::Relaxed) {
            return;
        }
        let entry = match entry {
            Ok(e) => e,
            Err(_) => break,
        };
        let entry_path = entry.path();
        match classify(&entry_path) {
            Classification::File(size) if size > 0 => {
                record_file(live_tree, parent, &entry_path, size, counters);
            }
            Classification::Directory => {
                let child_id = record_dir(live_tree, parent, &entry_path, counters);
                scan_dir_recursive(live_tree, child_id, &entry_path, cancel, counters, progress_tx);
            }
            _ => {}
        }
    }
}

fn record_file(live_tree: &LiveTree, parent: NodeId, path: &Path, size: u64, counters: &Counters) {
    let name = file_name_of(path);
    live_tree
        .write()
        .append_child(parent, Payload::new(FileInfo::new_file(name, size)));
    counters.files.fetch_add(1, Ordering::Relaxed);
    counters.bytes.fetch_add(size, Ordering::Relaxed);
}

fn record_dir(live_tree: &LiveTree, parent: NodeId, path: &Path, counters: &Counters) -> NodeId {
    let name = file_name_of(path);
    let id = live_tree
        .write()
        .append_child(parent, Payload::new(FileInfo::new_dir(name)));
    counters.dirs.fetch_add(1, Ordering::Relaxed);
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FileTree;
    use tempfile::tempdir;

    fn fresh_tree(name: &str) -> LiveTree {
        Arc::new(parking_lot::RwLock::new(FileTree::new(Payload::new(
            FileInfo::new_dir(CompactString::from(name)),
        ))))
    }

    fn run_to_completion(live_tree: &LiveTree, root: PathBuf, cancel: Arc<AtomicBool>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        scan_parallel(root, 2, tx, cancel, live_tree.clone());
        while let Ok(msg) = rx.recv_timeout(Duration::from_secs(10)) {
            if matches!(msg, ScanProgress::Complete { .. } | ScanProgress::Cancelled) {
                break;
            }
        }
    }

    #[test]
    fn scans_nested_files_and_rolls_up() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), b"hello").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("b.txt"), b"world!").unwrap();

        let live_tree = fresh_tree("root");
        run_to_completion(&live_tree, dir.path().to_path_buf(), Arc::new(AtomicBool::new(false)));

        let tree = live_tree.read();
        assert_eq!(tree.payload(tree.root()).file.size, 11);
        assert_eq!(tree.child_count(tree.root()), 2);
    }

    #[test]
    fn empty_directory_prunes_to_bare_root() {
        let dir = tempdir().unwrap();
        let live_tree = fresh_tree("root");
        run_to_completion(&live_tree, dir.path().to_path_buf(), Arc::new(AtomicBool::new(false)));

        let tree = live_tree.read();
        assert_eq!(tree.child_count(tree.root()), 0);
    }

    #[test]
    fn zero_byte_file_is_pruned() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("placeholder"), b"").unwrap();
        fs::write(dir.path().join("real.txt"), b"x").unwrap();

        let live_tree = fresh_tree("root");
        run_to_completion(&live_tree, dir.path().to_path_buf(), Arc::new(AtomicBool::new(false)));

        let tree = live_tree.read();
        let names: Vec<_> = tree
            .children(tree.root())
            .map(|c| tree.payload(c).file.name.clone())
            .collect();
        assert_eq!(names, vec![CompactString::from("real.txt")]);
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_are_not_followed() {
        let dir = tempdir().unwrap();
        let target = tempdir().unwrap();
        fs::write(target.path().join("outside.bin"), vec![0u8; 500]).unwrap();
        std::os::unix::fs::symlink(target.path(), dir.path().join("link")).unwrap();

        let live_tree = fresh_tree("root");
        run_to_completion(&live_tree, dir.path().to_path_buf(), Arc::new(AtomicBool::new(false)));

        let tree = live_tree.read();
        assert_eq!(tree.child_count(tree.root()), 0);
        assert_eq!(tree.payload(tree.root()).file.size, 0);
    }

    #[test]
    fn sort_pass_orders_children_descending() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("small.bin"), vec![0u8; 10]).unwrap();
        fs::write(dir.path().join("big.bin"), vec![0u8; 900]).unwrap();

        let live_tree = fresh_tree("root");
        run_to_completion(&live_tree, dir.path().to_path_buf(), Arc::new(AtomicBool::new(false)));

        let tree = live_tree.read();
        let sizes: Vec<_> = tree
            .children(tree.root())
            .map(|c| tree.payload(c).file.size)
            .collect();
        assert_eq!(sizes, vec![900, 10]);
    }
}
