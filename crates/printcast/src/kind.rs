//! Input file classification.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// The two kinds of print job the pipeline accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    /// Binary STL solid.
    Stl,
    /// Pre-sliced G-code toolpath.
    Gcode,
}

impl FileKind {
    /// Classify by file extension, ignoring case.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "stl" => Some(Self::Stl),
            "gcode" | "gco" | "g" => Some(Self::Gcode),
            _ => None,
        }
    }

    /// Classify by the extension of `path`.
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path() {
        assert_eq!(FileKind::from_path("benchy.STL"), Some(FileKind::Stl));
        assert_eq!(FileKind::from_path("dir/part.gcode"), Some(FileKind::Gcode));
        assert_eq!(FileKind::from_path("part.gco"), Some(FileKind::Gcode));
        assert_eq!(FileKind::from_path("part.g"), Some(FileKind::Gcode));
        assert_eq!(FileKind::from_path("notes.txt"), None);
        assert_eq!(FileKind::from_path("stl"), None);
    }
}
