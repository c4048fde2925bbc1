//! Output format table and per-tile file naming.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::tiles::TileRange;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum OutputError {
    #[error("unsupported output format {0:?} (expected svg, pdf, ps or png)")]
    UnsupportedFormat(String),
}

/// Artifact kinds a downstream writer can produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Svg,
    Pdf,
    Ps,
    /// Rasterized from the SVG rendition.
    Png,
}

impl OutputFormat {
    /// Resolve the format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Result<Self, OutputError> {
        match ext.to_ascii_lowercase().as_str() {
            "svg" => Ok(OutputFormat::Svg),
            "pdf" => Ok(OutputFormat::Pdf),
            "ps" => Ok(OutputFormat::Ps),
            "png" => Ok(OutputFormat::Png),
            _ => Err(OutputError::UnsupportedFormat(ext.to_string())),
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, OutputError> {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        Self::from_extension(ext)
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Svg => "svg",
            OutputFormat::Pdf => "pdf",
            OutputFormat::Ps => "ps",
            OutputFormat::Png => "png",
        }
    }
}

/// `<dir>/<stem>_X{x0}_{x1}_Y{y0}_{y1}.<ext>` for a tile of `base`.
pub fn tile_path(base: impl AsRef<Path>, range: &TileRange) -> PathBuf {
    let base = base.as_ref();
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut name = format!("{stem}{}", range.suffix());
    if let Some(ext) = base.extension() {
        name.push('.');
        name.push_str(&ext.to_string_lossy());
    }
    base.with_file_name(name)
}
