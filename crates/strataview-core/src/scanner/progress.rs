/// Scan progress reporting — lightweight messages sent from the scan
/// thread(s) to the UI thread via a crossbeam channel. The tree itself
/// lives in the shared `LiveTree`; these messages carry only counters.
use std::time::Duration;

/// Commands sent from the UI thread to control the scanner.
#[derive(Debug)]
pub enum ScanCommand {
    Start(std::path::PathBuf),
    Cancel,
}

#[derive(Debug)]
pub enum ScanProgress {
    /// Periodic snapshot of the running totals.
    Update {
        files_scanned: u64,
        directories_scanned: u64,
        bytes_processed: u64,
    },
    /// A non-fatal error encountered while scanning one entry or directory.
    Error { path: String, message: String },
    /// Scanning completed; the tree in `LiveTree` is rolled up, pruned, and sorted.
    Complete {
        duration: Duration,
        error_count: u64,
    },
    /// Scan was cancelled before completion; `LiveTree` should be discarded.
    Cancelled,
}
