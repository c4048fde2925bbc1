//! JSON configuration and report helpers for printing boards.

use std::{
    fs,
    path::{Path, PathBuf},
};

use calib_sheets_aruco::{DictionaryError, DictionarySet};
use calib_sheets_core::Scene;
use serde::{Deserialize, Serialize};

use crate::board::{BoardError, BoardLayout, BoardSpec};
use crate::output::{tile_path, OutputError, OutputFormat};
use crate::render::RenderMode;
use crate::tiles::{Tile, TileRange};

#[derive(thiserror::Error, Debug)]
pub enum PrintIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Board(#[from] BoardError),
    #[error(transparent)]
    Dictionary(#[from] DictionaryError),
    #[error(transparent)]
    Output(#[from] OutputError),
}

fn default_dictionary() -> String {
    "DICT_ARUCO_ORIGINAL".to_string()
}

fn default_output_path() -> String {
    "image.pdf".to_string()
}

/// Everything needed to print one board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrintConfig {
    #[serde(default)]
    pub board: BoardSpec,
    #[serde(default = "default_dictionary")]
    pub dictionary: String,
    /// JSON dictionary table (see `DictionarySet::load_json`).
    #[serde(default)]
    pub dictionaries_path: Option<String>,
    #[serde(default = "default_output_path")]
    pub output_path: String,
    /// Cells per tile `[x, y]`; 0 on an axis spans the board, `[0, 0]` disables tiling.
    #[serde(default)]
    pub sub_size: [u32; 2],
    #[serde(default)]
    pub render_mode: RenderMode,
    #[serde(default)]
    pub report_path: Option<String>,
}

impl Default for PrintConfig {
    fn default() -> Self {
        Self {
            board: BoardSpec::default(),
            dictionary: default_dictionary(),
            dictionaries_path: None,
            output_path: default_output_path(),
            sub_size: [0, 0],
            render_mode: RenderMode::default(),
            report_path: None,
        }
    }
}

impl PrintConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, PrintIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), PrintIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Resolve the report path (defaults to the output path with a `.json` extension).
    pub fn report_path(&self) -> PathBuf {
        self.report_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| Path::new(&self.output_path).with_extension("json"))
    }

    /// Load the configured dictionary table, or an empty one if none is set.
    pub fn load_dictionaries(&self) -> Result<DictionarySet, PrintIoError> {
        match &self.dictionaries_path {
            Some(path) => Ok(DictionarySet::load_json(path)?),
            None => Ok(DictionarySet::new()),
        }
    }

    /// Validate and render the full board plus any requested tiles.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "info", skip_all, fields(mode = ?self.board.mode)))]
    pub fn render(&self, dictionaries: &DictionarySet) -> Result<PrintReport, PrintIoError> {
        let format = OutputFormat::from_path(&self.output_path)?;
        let dictionary = if self.board.mode.uses_markers() && !dictionaries.is_empty() {
            Some(dictionaries.require(&self.dictionary)?)
        } else {
            None
        };
        let layout = BoardLayout::new(self.board, dictionary)?;
        let pages = render_pages(
            &layout,
            Path::new(&self.output_path),
            self.sub_size,
            self.render_mode,
        )?;

        Ok(PrintReport {
            board: self.board,
            dictionary: dictionary.map(|d| d.name().to_string()),
            format,
            render_mode: self.render_mode,
            pages,
        })
    }
}

/// Render the full board to `output` and every tile to its suffixed path.
pub fn render_pages(
    layout: &BoardLayout<'_>,
    output: &Path,
    sub_size: [u32; 2],
    mode: RenderMode,
) -> Result<Vec<PageReport>, BoardError> {
    let tiles = layout.tiles(sub_size)?;
    let mut pages = Vec::with_capacity(tiles.len() + 1);
    pages.push(PageReport::render(layout, &layout.full_tile(), output.to_path_buf(), mode)?);
    for tile in &tiles {
        let path = tile_path(output, &tile.range);
        pages.push(PageReport::render(layout, tile, path, mode)?);
    }
    log::info!(
        "rendered {} page(s) for {:?} board into {}",
        pages.len(),
        layout.mode(),
        output.display()
    );
    Ok(pages)
}

/// One output file: where it goes, what it covers, and what to draw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageReport {
    pub file: String,
    pub range: TileRange,
    pub width_pt: f64,
    pub height_pt: f64,
    pub scene: Scene,
}

impl PageReport {
    fn render(
        layout: &BoardLayout<'_>,
        tile: &Tile,
        file: PathBuf,
        mode: RenderMode,
    ) -> Result<Self, BoardError> {
        let scene = layout.render(tile, mode)?;
        Ok(Self {
            file: file.to_string_lossy().into_owned(),
            range: tile.range,
            width_pt: tile.size.x,
            height_pt: tile.size.y,
            scene,
        })
    }
}

/// Result of one print run, consumed by a format-specific writer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrintReport {
    pub board: BoardSpec,
    #[serde(default)]
    pub dictionary: Option<String>,
    pub format: OutputFormat,
    pub render_mode: RenderMode,
    pub pages: Vec<PageReport>,
}

impl PrintReport {
    /// Load a JSON report from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, PrintIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this report to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), PrintIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::BoardMode;
    use calib_sheets_aruco::Dictionary;

    fn dictionaries() -> DictionarySet {
        let mut set = DictionarySet::new();
        set.insert(Dictionary::new("tiny", 3, vec![vec![0x55, 0x00]; 12]).expect("dict"));
        set
    }

    #[test]
    fn defaults_fill_missing_fields() {
        let cfg: PrintConfig = serde_json::from_str("{}").expect("parse");
        assert_eq!(cfg, PrintConfig::default());
        assert_eq!(cfg.board.mode, BoardMode::Charuco);
        assert_eq!((cfg.board.size_x, cfg.board.size_y), (16, 9));
        assert_eq!(cfg.dictionary, "DICT_ARUCO_ORIGINAL");
        assert_eq!(cfg.report_path(), PathBuf::from("image.json"));
    }

    #[test]
    fn config_round_trips_through_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("print.json");
        let cfg = PrintConfig {
            board: BoardSpec::aruco_grid(3, 2, 0.04, 0.01, 2),
            dictionary: "tiny".into(),
            sub_size: [2, 0],
            render_mode: RenderMode::Block,
            ..PrintConfig::default()
        };
        cfg.write_json(&path).expect("write");
        assert_eq!(PrintConfig::load_json(&path).expect("load"), cfg);
    }

    #[test]
    fn tiled_render_lists_full_page_then_tiles() {
        let cfg = PrintConfig {
            board: BoardSpec::aruco_grid(3, 2, 0.04, 0.01, 2),
            dictionary: "tiny".into(),
            output_path: "out/grid.svg".into(),
            sub_size: [2, 0],
            ..PrintConfig::default()
        };
        let report = cfg.render(&dictionaries()).expect("render");
        assert_eq!(report.format, OutputFormat::Svg);
        assert_eq!(report.dictionary.as_deref(), Some("tiny"));
        let files: Vec<&str> = report.pages.iter().map(|p| p.file.as_str()).collect();
        assert_eq!(
            files,
            vec!["out/grid.svg", "out/grid_X0_2_Y0_2.svg", "out/grid_X2_3_Y0_2.svg"]
        );
        assert!(report.pages[1].width_pt > report.pages[2].width_pt);
    }

    #[test]
    fn render_reports_each_failure_kind() {
        let dicts = dictionaries();
        let bad_ext = PrintConfig {
            output_path: "board.bmp".into(),
            ..PrintConfig::default()
        };
        assert!(matches!(
            bad_ext.render(&dicts),
            Err(PrintIoError::Output(OutputError::UnsupportedFormat(_)))
        ));

        let unknown = PrintConfig::default();
        assert!(matches!(
            unknown.render(&dicts),
            Err(PrintIoError::Dictionary(DictionaryError::Unknown(_)))
        ));

        assert!(matches!(
            unknown.render(&DictionarySet::new()),
            Err(PrintIoError::Board(BoardError::MissingDictionary(BoardMode::Charuco)))
        ));

        let too_big = PrintConfig {
            board: BoardSpec::aruco_grid(4, 4, 0.04, 0.01, 0),
            dictionary: "tiny".into(),
            ..PrintConfig::default()
        };
        assert!(matches!(
            too_big.render(&dicts),
            Err(PrintIoError::Board(BoardError::DictionaryCapacity {
                needed: 16,
                available: 12
            }))
        ));
    }

    #[test]
    fn chess_needs_no_dictionary() {
        let cfg = PrintConfig {
            board: BoardSpec::chess(5, 4, 0.03),
            ..PrintConfig::default()
        };
        let report = cfg.render(&DictionarySet::new()).expect("render");
        assert_eq!(report.pages.len(), 1);
        assert_eq!(report.dictionary, None);
    }
}
