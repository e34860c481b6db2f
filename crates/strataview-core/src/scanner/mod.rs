/// Scanner module — orchestrates a concurrent filesystem walk (§4.2).
///
/// Scanning writes into a shared `LiveTree` (`Arc<RwLock<FileTree>>`) so a
/// caller can render a real-time, incrementally-growing tree while the scan
/// runs, then take ownership of the finished tree once `Complete` arrives.
pub mod error;
pub mod parallel;
pub mod progress;

use crate::model::{FileInfo, FileTree, Payload};
use error::ScanError;
use progress::ScanProgress;

use crossbeam_channel::Receiver;
use parking_lot::RwLock;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use tracing::info;

/// A shared, concurrently-readable file tree. The scanner holds the write
/// lock only briefly, once per entry; a caller can hold a read lock each
/// frame to render the live tree while a scan is in progress.
pub type LiveTree = Arc<RwLock<FileTree>>;

/// Default worker-pool size, per §6's world constants table.
pub const CONCURRENCY_DEFAULT: usize = 4;

/// Maximum number of progress messages that may queue up before `send`
/// starts applying back-pressure to the scan thread.
pub const PROGRESS_CHANNEL_CAPACITY: usize = 4_096;

/// Handle to a running or completed scan.
pub struct ScanHandle {
    pub progress_rx: Receiver<ScanProgress>,
    pub live_tree: LiveTree,
    cancel_flag: Arc<AtomicBool>,
    _thread: Option<thread::JoinHandle<()>>,
}

impl ScanHandle {
    pub fn cancel(&self) {
        self.cancel_flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_flag.load(Ordering::Relaxed)
    }
}

/// Start a new scan of `root_path` on a background thread with `concurrency`
/// workers. Fails fast with [`ScanError::NotADirectory`] without spawning
/// anything if `root_path` isn't a readable directory.
pub fn start_scan(root_path: PathBuf, concurrency: usize) -> Result<ScanHandle, ScanError> {
    if !root_path.is_dir() {
        return Err(ScanError::NotADirectory { path: root_path });
    }

    let (progress_tx, progress_rx) =
        crossbeam_channel::bounded::<ScanProgress>(PROGRESS_CHANNEL_CAPACITY);
    let cancel_flag = Arc::new(AtomicBool::new(false));
    let cancel_clone = cancel_flag.clone();

    let root_name = parallel::root_display_name(&root_path);
    let live_tree: LiveTree = Arc::new(RwLock::new(FileTree::new(Payload::new(
        FileInfo::new_dir(root_name),
    ))));
    let tree_clone = live_tree.clone();

    let thread = thread::Builder::new()
        .name("strataview-scanner".into())
        .spawn(move || {
            info!(path = %root_path.display(), concurrency, "starting scan");
            parallel::scan_parallel(root_path, concurrency, progress_tx, cancel_clone, tree_clone);
        })
        .expect("failed to spawn scanner thread");

    Ok(ScanHandle {
        progress_rx,
        live_tree,
        cancel_flag,
        _thread: Some(thread),
    })
}
