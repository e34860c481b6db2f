//! Filesystem change monitor (§4.6).
//!
//! Wraps the cross-platform `notify` crate's recommended watcher
//! (inotify on Linux, `ReadDirectoryChangesW` on Windows, FSEvents on
//! macOS) running in `RecursiveMode::Recursive`, so the "recursively
//! register every directory, best-effort on new subdirectories" story the
//! spec describes for hand-rolled per-OS watchers is handled by the crate
//! instead. `notify`'s own event type never leaks past this module —
//! everything downstream sees [`FileEvent`].
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::SystemTime;

use crossbeam_channel::{bounded, Receiver, Sender};
use notify::{
    Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher,
};
use notify::event::{ModifyKind, RenameMode};
use tracing::{debug, warn};

/// Capacity of the channel the watcher thread posts raw events onto.
const EVENT_CHANNEL_CAPACITY: usize = 4_096;

/// Semantic kind of a single filesystem change, already normalized away
/// from whatever backend-specific encoding `notify` reported.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FileEventKind {
    Created,
    Deleted,
    Touched,
    /// A rename. `relative_path` on the enclosing [`FileEvent`] is the old
    /// path; `to` is the new one. The open question of "old name, new
    /// name, or both" (§9) is resolved by always carrying both: the
    /// reconciler applies this as a Deleted-then-Created pair.
    Renamed { to: PathBuf },
}

/// One change reported by the monitor, already relative to the scanned root.
#[derive(Clone, Debug)]
pub struct FileEvent {
    pub relative_path: PathBuf,
    pub kind: FileEventKind,
    pub timestamp: SystemTime,
}

/// Handle to a running monitor. Dropping or calling [`MonitorHandle::stop`]
/// joins the background watcher thread.
pub struct MonitorHandle {
    active: Arc<AtomicBool>,
    _watcher: RecommendedWatcher,
}

impl MonitorHandle {
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Relaxed)
    }

    /// Stop watching. The underlying `notify` watcher is torn down when
    /// this handle (and its `RecommendedWatcher`) drops.
    pub fn stop(self) {
        self.active.store(false, Ordering::Relaxed);
    }
}

/// Start watching `root` for changes. Returns a handle plus the receiving
/// end of a bounded channel of translated [`FileEvent`]s; `root` itself is
/// never included in a `relative_path` (it is always empty iff the event
/// is about the root itself, which the reconciler ignores).
pub fn start(root: &Path) -> notify::Result<(MonitorHandle, Receiver<FileEvent>)> {
    let (raw_tx, raw_rx) = bounded::<Event>(EVENT_CHANNEL_CAPACITY);
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
        Ok(event) => {
            let _ = raw_tx.try_send(event);
        }
        Err(e) => warn!("monitor: watcher error: {e}"),
    })?;
    watcher.watch(root, RecursiveMode::Recursive)?;

    let (tx, rx) = bounded::<FileEvent>(EVENT_CHANNEL_CAPACITY);
    let active = Arc::new(AtomicBool::new(true));
    let active_clone = active.clone();
    let root = root.to_path_buf();

    std::thread::Builder::new()
        .name("strataview-monitor".into())
        .spawn(move || translate_loop(root, raw_rx, tx, active_clone))
        .expect("failed to spawn monitor thread");

    Ok((
        MonitorHandle {
            active,
            _watcher: watcher,
        },
        rx,
    ))
}

fn translate_loop(
    root: PathBuf,
    raw_rx: Receiver<Event>,
    tx: Sender<FileEvent>,
    active: Arc<AtomicBool>,
) {
    debug!(root = %root.display(), "monitor: translation thread started");
    while active.load(Ordering::Relaxed) {
        let event = match raw_rx.recv_timeout(std::time::Duration::from_millis(200)) {
            Ok(e) => e,
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => continue,
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => break,
        };
        for translated in translate(&root, &event) {
            if tx.send(translated).is_err() {
                return;
            }
        }
    }
    debug!("monitor: translation thread stopped");
}

/// Translate one raw `notify::Event` into zero or more [`FileEvent`]s,
/// making every path relative to `root`.
fn translate(root: &Path, event: &Event) -> Vec<FileEvent> {
    let now = SystemTime::now();
    let relativize = |p: &Path| -> PathBuf { p.strip_prefix(root).unwrap_or(p).to_path_buf() };

    match &event.kind {
        EventKind::Create(_) => event
            .paths
            .iter()
            .map(|p| FileEvent {
                relative_path: relativize(p),
                kind: FileEventKind::Created,
                timestamp: now,
            })
            .collect(),
        EventKind::Remove(_) => event
            .paths
            .iter()
            .map(|p| FileEvent {
                relative_path: relativize(p),
                kind: FileEventKind::Deleted,
                timestamp: now,
            })
            .collect(),
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) if event.paths.len() == 2 => {
            vec![FileEvent {
                relative_path: relativize(&event.paths[0]),
                kind: FileEventKind::Renamed {
                    to: relativize(&event.paths[1]),
                },
                timestamp: now,
            }]
        }
        // Some backends only ever emit the "from" half of a rename, or
        // only the "to" half, instead of a correlated pair (§4.6 — "the
        // reconciler must tolerate both"). Each half degrades gracefully
        // to the equivalent Deleted/Created half of the pair.
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => event
            .paths
            .iter()
            .map(|p| FileEvent {
                relative_path: relativize(p),
                kind: FileEventKind::Deleted,
                timestamp: now,
            })
            .collect(),
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => event
            .paths
            .iter()
            .map(|p| FileEvent {
                relative_path: relativize(p),
                kind: FileEventKind::Created,
                timestamp: now,
            })
            .collect(),
        EventKind::Modify(_) => event
            .paths
            .iter()
            .map(|p| FileEvent {
                relative_path: relativize(p),
                kind: FileEventKind::Touched,
                timestamp: now,
            })
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, RemoveKind};

    fn evt(kind: EventKind, paths: Vec<PathBuf>) -> Event {
        Event {
            kind,
            paths,
            attrs: Default::default(),
        }
    }

    #[test]
    fn create_translates_to_created() {
        let root = PathBuf::from("/tmp/root");
        let e = evt(EventKind::Create(CreateKind::File), vec![root.join("a.txt")]);
        let out = translate(&root, &e);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].relative_path, PathBuf::from("a.txt"));
        assert_eq!(out[0].kind, FileEventKind::Created);
    }

    #[test]
    fn remove_translates_to_deleted() {
        let root = PathBuf::from("/tmp/root");
        let e = evt(EventKind::Remove(RemoveKind::File), vec![root.join("a.txt")]);
        let out = translate(&root, &e);
        assert_eq!(out[0].kind, FileEventKind::Deleted);
    }

    #[test]
    fn correlated_rename_produces_single_renamed_event() {
        let root = PathBuf::from("/tmp/root");
        let e = evt(
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)),
            vec![root.join("old.txt"), root.join("new.txt")],
        );
        let out = translate(&root, &e);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].relative_path, PathBuf::from("old.txt"));
        assert_eq!(
            out[0].kind,
            FileEventKind::Renamed {
                to: PathBuf::from("new.txt")
            }
        );
    }

    #[test]
    fn uncorrelated_rename_halves_degrade_to_delete_and_create() {
        let root = PathBuf::from("/tmp/root");
        let from = evt(
            EventKind::Modify(ModifyKind::Name(RenameMode::From)),
            vec![root.join("old.txt")],
        );
        let to = evt(
            EventKind::Modify(ModifyKind::Name(RenameMode::To)),
            vec![root.join("new.txt")],
        );
        assert_eq!(translate(&root, &from)[0].kind, FileEventKind::Deleted);
        assert_eq!(translate(&root, &to)[0].kind, FileEventKind::Created);
    }
}
