use std::path::PathBuf;
use thiserror::Error;

/// The only failure modes a scan can resolve with. Everything else
/// (permission denied on one subdirectory, a race during enumeration) is
/// swallowed at the point it occurs and logged, per the scanner's
/// narrowest-scope recovery policy.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("{path:?} is not a directory")]
    NotADirectory { path: PathBuf },

    #[error("scan was cancelled")]
    Cancelled,
}
