//! Layered session configuration (§10).
//!
//! This is the in-core analogue of the out-of-scope `preferences.json`:
//! the core never reads that file itself, but exposes typed knobs a
//! settings layer can drive. `serde` is derived so a caller that wants to
//! deserialize a `SessionConfig` from disk can do so directly; the core's
//! own tests never depend on file-based config.
use serde::{Deserialize, Serialize};

use crate::model::block::{MAX_PADDING, PADDING_RATIO, ROOT_BLOCK_DEPTH, ROOT_BLOCK_WIDTH};
use crate::ray::VisibilityFilter;
use crate::scanner::CONCURRENCY_DEFAULT;

/// Root-block footprint dimensions, exposed here mainly so a caller can
/// assert the world constants it's rendering against match what the core
/// actually laid out (the layout engine itself always uses the §6 table).
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct RootBlockDimensions {
    pub width: f64,
    pub depth: f64,
}

impl Default for RootBlockDimensions {
    fn default() -> Self {
        Self {
            width: ROOT_BLOCK_WIDTH,
            depth: ROOT_BLOCK_DEPTH,
        }
    }
}

/// Default visibility filter applied by a freshly created [`Session`](crate::session::Session).
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct VisibilityFilterConfig {
    pub min_size: u64,
    pub only_directories: bool,
}

impl Default for VisibilityFilterConfig {
    fn default() -> Self {
        Self {
            min_size: 0,
            only_directories: false,
        }
    }
}

impl From<VisibilityFilterConfig> for VisibilityFilter {
    fn from(c: VisibilityFilterConfig) -> Self {
        VisibilityFilter {
            min_size: c.min_size,
            only_directories: c.only_directories,
        }
    }
}

/// Knobs a [`Session`](crate::session::Session) is constructed with.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionConfig {
    /// Worker-pool size for the scanner (§4.2).
    pub scan_concurrency: usize,
    /// Linear per-side padding shrink applied by the layout engine.
    pub padding_ratio: f64,
    /// Absolute cap on padding removed from one side, in world units.
    pub max_padding: f64,
    pub root_block: RootBlockDimensions,
    pub default_filter: VisibilityFilterConfig,
    /// Whether `scan()` automatically starts the change monitor and
    /// reconciler once a scan completes. Disabling this is useful for a
    /// one-shot CLI report that never needs live updates.
    pub enable_monitor: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            scan_concurrency: CONCURRENCY_DEFAULT,
            padding_ratio: PADDING_RATIO,
            max_padding: MAX_PADDING,
            root_block: RootBlockDimensions::default(),
            default_filter: VisibilityFilterConfig::default(),
            enable_monitor: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_world_constants() {
        let cfg = SessionConfig::default();
        assert_eq!(cfg.scan_concurrency, 4);
        assert_eq!(cfg.root_block.width, 1000.0);
        assert_eq!(cfg.max_padding, 0.75);
    }

    #[test]
    fn round_trips_through_json() {
        let cfg = SessionConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: SessionConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg, back);
    }
}
