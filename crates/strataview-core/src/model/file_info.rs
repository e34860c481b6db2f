use compact_str::CompactString;
use std::time::SystemTime;

/// What kind of filesystem entry a node represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileKind {
    Regular,
    Directory,
    Symlink,
}

/// Per-entry metadata captured at scan time, independent of layout.
#[derive(Clone, Debug)]
pub struct FileInfo {
    /// Entry name only, not the full path. Full paths are reconstructed
    /// on demand by walking up through the tree's `parent` links.
    pub name: CompactString,

    /// Extension without the leading dot; empty for directories and
    /// extensionless files.
    pub extension: CompactString,

    /// Logical size in bytes. For directories this is the recursive sum
    /// of descendant regular-file sizes, zero until the rollup pass runs.
    pub size: u64,

    pub kind: FileKind,

    pub modified: Option<SystemTime>,

    /// `true` if this entry could not be fully read (permission denied,
    /// transient I/O error during enumeration). The node is kept so the
    /// gap is visible rather than silently missing.
    pub is_error: bool,
}

impl FileInfo {
    pub fn new_file(name: CompactString, size: u64) -> Self {
        let extension = split_extension(&name);
        Self {
            name,
            extension,
            size,
            kind: FileKind::Regular,
            modified: None,
            is_error: false,
        }
    }

    pub fn new_dir(name: CompactString) -> Self {
        Self {
            name,
            extension: CompactString::default(),
            size: 0,
            kind: FileKind::Directory,
            modified: None,
            is_error: false,
        }
    }

    pub fn new_symlink(name: CompactString) -> Self {
        Self {
            name,
            extension: CompactString::default(),
            size: 0,
            kind: FileKind::Symlink,
            modified: None,
            is_error: false,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == FileKind::Directory
    }
}

fn split_extension(name: &str) -> CompactString {
    match name.rfind('.') {
        Some(0) => CompactString::default(), // dotfile, e.g. ".gitignore"
        Some(pos) => CompactString::from(&name[pos + 1..]),
        None => CompactString::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_extension() {
        let f = FileInfo::new_file(CompactString::from("report.csv"), 10);
        assert_eq!(f.extension, "csv");
    }

    #[test]
    fn dotfile_has_no_extension() {
        let f = FileInfo::new_file(CompactString::from(".gitignore"), 10);
        assert_eq!(f.extension, "");
    }
}
