//! Node coloring policy (§11, grounded in `Include/Settings/nodePainter.h`
//! of the original implementation).
//!
//! The persisted `colors.json` the real color scheme lives in is owned by
//! the settings layer, which is out of scope (§1); this module only
//! carries the typed `scheme → extension → RGB` table and the
//! selection/highlight override policy that consumes it, exactly the
//! split `node_color` promises in §4.8.
use std::collections::HashMap;

use crate::model::file_info::FileKind;
use crate::model::FileInfo;

/// An 8-bit-per-channel color, matching the `[r,g,b]` triples `colors.json`
/// stores (0-255, not the 0.0-1.0 floats a GPU buffer would want — that
/// narrowing is the renderer's job).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Linearly blend towards white by `amount` (0 = unchanged, 1 = white).
    /// Used for the highlighted-node tint.
    fn lightened(self, amount: f32) -> Rgb {
        let mix = |c: u8| -> u8 {
            let c = c as f32;
            (c + (255.0 - c) * amount).round().clamp(0.0, 255.0) as u8
        };
        Rgb(mix(self.0), mix(self.1), mix(self.2))
    }
}

/// Fraction toward white applied to a highlighted (but not selected) node.
const HIGHLIGHT_TINT: f32 = 0.45;

/// Color used for a selected node, overriding any extension lookup.
pub const SELECTED_COLOR: Rgb = Rgb(255, 196, 0);

/// Fallback used for directories and for extensions absent from the
/// active scheme.
const DEFAULT_DIRECTORY_COLOR: Rgb = Rgb(120, 140, 200);
const DEFAULT_UNKNOWN_EXTENSION_COLOR: Rgb = Rgb(150, 150, 150);

/// A `scheme name → (lowercased extension → color)` table, the in-memory
/// shape of a parsed `colors.json`.
#[derive(Clone, Debug, Default)]
pub struct ColorScheme {
    schemes: HashMap<String, HashMap<String, Rgb>>,
    active: String,
}

impl ColorScheme {
    /// A scheme with a handful of common extensions, used when no
    /// `colors.json` has been loaded by the (out-of-scope) settings layer.
    pub fn built_in_default() -> Self {
        let mut default = HashMap::new();
        default.insert("rs".to_string(), Rgb(222, 165, 132));
        default.insert("toml".to_string(), Rgb(156, 110, 175));
        default.insert("json".to_string(), Rgb(201, 185, 97));
        default.insert("md".to_string(), Rgb(120, 170, 120));
        default.insert("txt".to_string(), Rgb(190, 190, 190));
        default.insert("zip".to_string(), Rgb(200, 90, 90));
        default.insert("png".to_string(), Rgb(90, 150, 200));
        default.insert("jpg".to_string(), Rgb(90, 150, 200));

        let mut schemes = HashMap::new();
        schemes.insert("Default".to_string(), default);
        Self {
            schemes,
            active: "Default".to_string(),
        }
    }

    /// Load a scheme table deserialized elsewhere (e.g. by the settings
    /// layer from `colors.json`), keeping whichever scheme is currently
    /// active if it still exists in the new table.
    pub fn from_schemes(schemes: HashMap<String, HashMap<String, Rgb>>, active: &str) -> Self {
        Self {
            schemes,
            active: active.to_string(),
        }
    }

    pub fn active_scheme_name(&self) -> &str {
        &self.active
    }

    pub fn set_active_scheme(&mut self, scheme: &str) {
        self.active = scheme.to_string();
    }

    /// Base color from the active scheme's extension map, before any
    /// selection/highlight override is applied.
    fn base_color(&self, file: &FileInfo) -> Rgb {
        if file.kind == FileKind::Directory {
            return DEFAULT_DIRECTORY_COLOR;
        }
        self.schemes
            .get(&self.active)
            .and_then(|ext_map| ext_map.get(file.extension.as_str()))
            .copied()
            .unwrap_or(DEFAULT_UNKNOWN_EXTENSION_COLOR)
    }

    /// Final color for a node, folding in selection/highlight state.
    /// Selection wins outright; highlighting lightens the base color;
    /// otherwise it's a plain extension lookup.
    pub fn node_color(&self, file: &FileInfo, is_selected: bool, is_highlighted: bool) -> Rgb {
        if is_selected {
            return SELECTED_COLOR;
        }
        let base = self.base_color(file);
        if is_highlighted {
            base.lightened(HIGHLIGHT_TINT)
        } else {
            base
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use compact_str::CompactString;

    #[test]
    fn known_extension_resolves_from_active_scheme() {
        let scheme = ColorScheme::built_in_default();
        let file = FileInfo::new_file(CompactString::from("main.rs"), 10);
        assert_eq!(scheme.node_color(&file, false, false), Rgb(222, 165, 132));
    }

    #[test]
    fn unknown_extension_falls_back_to_default() {
        let scheme = ColorScheme::built_in_default();
        let file = FileInfo::new_file(CompactString::from("data.xyz"), 10);
        assert_eq!(
            scheme.node_color(&file, false, false),
            DEFAULT_UNKNOWN_EXTENSION_COLOR
        );
    }

    #[test]
    fn selection_overrides_everything() {
        let scheme = ColorScheme::built_in_default();
        let file = FileInfo::new_file(CompactString::from("main.rs"), 10);
        assert_eq!(scheme.node_color(&file, true, true), SELECTED_COLOR);
    }

    #[test]
    fn highlight_lightens_but_does_not_override() {
        let scheme = ColorScheme::built_in_default();
        let file = FileInfo::new_file(CompactString::from("main.rs"), 10);
        let base = scheme.node_color(&file, false, false);
        let highlighted = scheme.node_color(&file, false, true);
        assert_ne!(base, highlighted);
        assert!(highlighted.0 >= base.0 && highlighted.1 >= base.1 && highlighted.2 >= base.2);
    }

    #[test]
    fn directories_get_the_directory_color_regardless_of_scheme() {
        let scheme = ColorScheme::built_in_default();
        let dir = FileInfo::new_dir(CompactString::from("sub"));
        assert_eq!(scheme.node_color(&dir, false, false), DEFAULT_DIRECTORY_COLOR);
    }
}
