//! Board specification, validation and per-cell role resolution.

use calib_sheets_aruco::{DecodeError, Dictionary};
use calib_sheets_core::meters_to_points;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// Kind of printable board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardMode {
    /// Plain chessboard; no markers.
    Chess,
    /// One marker on a 1×1 board.
    Aruco,
    /// Uniform grid of markers separated by `marker_separation`.
    ArucoGrid,
    /// Chessboard with markers centered in alternating squares.
    Charuco,
}

impl BoardMode {
    /// Whether this mode draws markers (and thus needs a dictionary).
    #[inline]
    pub fn uses_markers(self) -> bool {
        !matches!(self, BoardMode::Chess)
    }

    /// Role of cell `(bx, by)` on a board `size_x` cells wide.
    ///
    /// Marker ids saturate at `u32::MAX`; such ids exceed any dictionary and
    /// are rejected by [`BoardLayout::new`].
    pub fn resolve_role(self, bx: u32, by: u32, size_x: u32, first_marker_id: u32) -> BlockRole {
        let same_parity = (bx % 2 == 0) == (by % 2 == 0);
        let index = u64::from(by) * u64::from(size_x) + u64::from(bx);
        match self {
            BoardMode::Chess => {
                if same_parity {
                    BlockRole::SolidSquare
                } else {
                    BlockRole::Blank
                }
            }
            BoardMode::Aruco => BlockRole::Marker(first_marker_id),
            BoardMode::ArucoGrid => BlockRole::Marker(offset_id(first_marker_id, index)),
            BoardMode::Charuco => {
                if same_parity {
                    BlockRole::Marker(offset_id(first_marker_id, index / 2))
                } else {
                    // Off-parity ChArUco cells are the chessboard's black squares.
                    BlockRole::SolidSquare
                }
            }
        }
    }
}

fn offset_id(first: u32, offset: u64) -> u32 {
    u32::try_from(u64::from(first) + offset).unwrap_or(u32::MAX)
}

/// What gets drawn in one board cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockRole {
    Blank,
    SolidSquare,
    Marker(u32),
}

fn default_border_bits() -> u32 {
    1
}

/// Board parameters. Lengths are in meters.
///
/// `size_x`/`size_y` count cells (squares or markers), not inner corners.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardSpec {
    pub mode: BoardMode,
    pub size_x: u32,
    pub size_y: u32,
    #[serde(default)]
    pub square_length: Option<f64>,
    #[serde(default)]
    pub marker_length: Option<f64>,
    #[serde(default)]
    pub marker_separation: Option<f64>,
    #[serde(default)]
    pub first_marker_id: u32,
    #[serde(default = "default_border_bits")]
    pub border_bits: u32,
}

impl Default for BoardSpec {
    /// 16×9 ChArUco, 9 cm squares, 7 cm markers.
    fn default() -> Self {
        Self {
            marker_separation: Some(0.02),
            ..Self::charuco(16, 9, 0.09, 0.07)
        }
    }
}

impl BoardSpec {
    pub fn chess(size_x: u32, size_y: u32, square_length: f64) -> Self {
        Self {
            mode: BoardMode::Chess,
            size_x,
            size_y,
            square_length: Some(square_length),
            marker_length: None,
            marker_separation: None,
            first_marker_id: 0,
            border_bits: default_border_bits(),
        }
    }

    /// A single marker `marker_id`.
    pub fn aruco(marker_id: u32, marker_length: f64) -> Self {
        Self {
            mode: BoardMode::Aruco,
            size_x: 1,
            size_y: 1,
            square_length: None,
            marker_length: Some(marker_length),
            marker_separation: None,
            first_marker_id: marker_id,
            border_bits: default_border_bits(),
        }
    }

    pub fn aruco_grid(
        size_x: u32,
        size_y: u32,
        marker_length: f64,
        marker_separation: f64,
        first_marker_id: u32,
    ) -> Self {
        Self {
            mode: BoardMode::ArucoGrid,
            size_x,
            size_y,
            square_length: None,
            marker_length: Some(marker_length),
            marker_separation: Some(marker_separation),
            first_marker_id,
            border_bits: default_border_bits(),
        }
    }

    pub fn charuco(size_x: u32, size_y: u32, square_length: f64, marker_length: f64) -> Self {
        Self {
            mode: BoardMode::Charuco,
            size_x,
            size_y,
            square_length: Some(square_length),
            marker_length: Some(marker_length),
            marker_separation: None,
            first_marker_id: 0,
            border_bits: default_border_bits(),
        }
    }

    pub fn with_border_bits(mut self, border_bits: u32) -> Self {
        self.border_bits = border_bits;
        self
    }

    pub fn with_first_marker_id(mut self, first_marker_id: u32) -> Self {
        self.first_marker_id = first_marker_id;
        self
    }

    /// Number of marker cells on the board.
    pub fn marker_count(&self) -> usize {
        let (sx, sy) = (self.size_x as usize, self.size_y as usize);
        match self.mode {
            BoardMode::Chess => 0,
            BoardMode::Aruco => 1,
            BoardMode::ArucoGrid => sx * sy,
            // Even rows hold ceil(sx/2) markers, odd rows floor(sx/2).
            BoardMode::Charuco => sy.div_ceil(2) * sx.div_ceil(2) + (sy / 2) * (sx / 2),
        }
    }
}

/// Board validation errors.
#[derive(thiserror::Error, Debug)]
pub enum BoardError {
    #[error("{mode:?} board cannot be {size_x}x{size_y} cells")]
    InvalidSize {
        mode: BoardMode,
        size_x: u32,
        size_y: u32,
    },
    #[error("{name} must be finite and > 0, got {value}")]
    InvalidLength { name: &'static str, value: f64 },
    #[error("marker_length {marker} exceeds square_length {square}")]
    MarkerLargerThanSquare { marker: f64, square: f64 },
    #[error("border_bits must be >= 1")]
    InvalidBorderBits,
    #[error("tile size must be >= 1 cell per axis, got {sub_x}x{sub_y}")]
    InvalidTileSize { sub_x: u32, sub_y: u32 },
    #[error("{0:?} boards need a dictionary")]
    MissingDictionary(BoardMode),
    #[error("missing {0}")]
    MissingLength(&'static str),
    #[error(transparent)]
    InvalidMarkerId(#[from] DecodeError),
    #[error("board needs {needed} markers, dictionary has {available}")]
    DictionaryCapacity { needed: usize, available: usize },
}

fn check_length(name: &'static str, value: f64) -> Result<f64, BoardError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(BoardError::InvalidLength { name, value })
    }
}

/// A validated board with lengths resolved to points.
///
/// Only parameters are stored; cells are resolved on the fly.
#[derive(Clone, Debug)]
pub struct BoardLayout<'a> {
    spec: BoardSpec,
    dictionary: Option<&'a Dictionary>,
    square: f64,
    marker: f64,
    separation: f64,
}

impl<'a> BoardLayout<'a> {
    /// Validate `spec` against `dictionary` and resolve lengths.
    pub fn new(spec: BoardSpec, dictionary: Option<&'a Dictionary>) -> Result<Self, BoardError> {
        let size_ok = match spec.mode {
            BoardMode::Aruco => spec.size_x == 1 && spec.size_y == 1,
            _ => spec.size_x >= 2 && spec.size_y >= 2,
        };
        if !size_ok {
            return Err(BoardError::InvalidSize {
                mode: spec.mode,
                size_x: spec.size_x,
                size_y: spec.size_y,
            });
        }

        let square = spec.square_length.or(spec.marker_length);
        let marker = spec.marker_length.or(spec.square_length);
        let (Some(square), Some(marker)) = (square, marker) else {
            return Err(BoardError::MissingLength("square_length or marker_length"));
        };
        let square = check_length("square_length", square)?;
        let marker = check_length("marker_length", marker)?;

        let mut separation = 0.0;
        match spec.mode {
            BoardMode::ArucoGrid => {
                let sep = spec
                    .marker_separation
                    .ok_or(BoardError::MissingLength("marker_separation"))?;
                separation = check_length("marker_separation", sep)?;
            }
            BoardMode::Charuco if marker > square => {
                return Err(BoardError::MarkerLargerThanSquare { marker, square });
            }
            _ => {}
        }

        if spec.mode.uses_markers() {
            if spec.border_bits == 0 {
                return Err(BoardError::InvalidBorderBits);
            }
            let dict = dictionary.ok_or(BoardError::MissingDictionary(spec.mode))?;
            let available = dict.len();
            let first = spec.first_marker_id as usize;
            if spec.mode == BoardMode::Aruco {
                if first >= available {
                    return Err(DecodeError::InvalidMarkerId {
                        id: first,
                        count: available,
                    }
                    .into());
                }
            } else {
                let needed = first + spec.marker_count();
                if needed > available {
                    return Err(BoardError::DictionaryCapacity { needed, available });
                }
            }
        }

        Ok(Self {
            spec,
            dictionary,
            square: meters_to_points(square),
            marker: meters_to_points(marker),
            separation: meters_to_points(separation),
        })
    }

    #[inline]
    pub fn spec(&self) -> &BoardSpec {
        &self.spec
    }

    #[inline]
    pub fn mode(&self) -> BoardMode {
        self.spec.mode
    }

    #[inline]
    pub fn dictionary(&self) -> Option<&'a Dictionary> {
        self.dictionary
    }

    /// Board size in cells.
    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.spec.size_x, self.spec.size_y)
    }

    /// Square side in points.
    #[inline]
    pub fn square_length(&self) -> f64 {
        self.square
    }

    /// Marker side in points.
    #[inline]
    pub fn marker_length(&self) -> f64 {
        self.marker
    }

    /// Gap between grid markers in points (zero for other modes).
    #[inline]
    pub fn marker_separation(&self) -> f64 {
        self.separation
    }

    /// Distance between consecutive cell origins, in points.
    pub fn pitch(&self) -> f64 {
        match self.spec.mode {
            BoardMode::Chess | BoardMode::Charuco => self.square,
            BoardMode::Aruco => self.marker,
            BoardMode::ArucoGrid => self.marker + self.separation,
        }
    }

    /// Full page size in points.
    pub fn page_size(&self) -> Vector2<f64> {
        let (sx, sy) = self.size();
        Vector2::new(
            sx as f64 * self.pitch() - self.separation,
            sy as f64 * self.pitch() - self.separation,
        )
    }

    /// Role of cell `(bx, by)`.
    #[inline]
    pub fn role(&self, bx: u32, by: u32) -> BlockRole {
        self.spec
            .mode
            .resolve_role(bx, by, self.spec.size_x, self.spec.first_marker_id)
    }

    /// Offset of a marker inside its cell (ChArUco markers are centered).
    pub fn marker_inset(&self) -> f64 {
        match self.spec.mode {
            BoardMode::Charuco => (self.square - self.marker) * 0.5,
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use calib_sheets_core::PT_PER_METER;

    fn dict(count: usize) -> Dictionary {
        Dictionary::new("custom", 4, vec![vec![0xB2, 0xC0]; count]).expect("dict")
    }

    #[test]
    fn chess_roles_alternate_from_a_solid_corner() {
        let m = BoardMode::Chess;
        assert_eq!(m.resolve_role(0, 0, 4, 0), BlockRole::SolidSquare);
        assert_eq!(m.resolve_role(1, 0, 4, 0), BlockRole::Blank);
        assert_eq!(m.resolve_role(1, 1, 4, 0), BlockRole::SolidSquare);
        assert_eq!(m.resolve_role(0, 1, 4, 0), BlockRole::Blank);
    }

    #[test]
    fn aruco_grid_ids_are_row_major() {
        let ids: Vec<BlockRole> = (0..2)
            .flat_map(|by| (0..3).map(move |bx| BoardMode::ArucoGrid.resolve_role(bx, by, 3, 5)))
            .collect();
        let expected: Vec<BlockRole> = (5..=10).map(BlockRole::Marker).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn charuco_ids_are_consecutive_on_marker_cells() {
        for size_x in 2..8u32 {
            for size_y in 2..6u32 {
                let spec = BoardSpec::charuco(size_x, size_y, 0.04, 0.03).with_first_marker_id(3);
                let mut ids = Vec::new();
                for by in 0..size_y {
                    for bx in 0..size_x {
                        match BoardMode::Charuco.resolve_role(bx, by, size_x, 3) {
                            BlockRole::Marker(id) => {
                                assert_eq!(id, 3 + (by * size_x + bx) / 2);
                                assert_eq!(bx % 2, by % 2);
                                ids.push(id);
                            }
                            other => assert_eq!(other, BlockRole::SolidSquare),
                        }
                    }
                }
                let expected: Vec<u32> = (3..3 + spec.marker_count() as u32).collect();
                assert_eq!(ids, expected, "{size_x}x{size_y}");
            }
        }
    }

    #[test]
    fn ids_past_u32_saturate() {
        let big = u32::MAX;
        assert_eq!(
            BoardMode::ArucoGrid.resolve_role(big - 1, big - 1, big, 7),
            BlockRole::Marker(u32::MAX)
        );
        assert_eq!(
            BoardMode::Charuco.resolve_role(big - 1, big - 1, big, big),
            BlockRole::Marker(u32::MAX)
        );
        assert_eq!(
            BoardMode::Charuco.resolve_role(big - 1, big - 2, big, 0),
            BlockRole::SolidSquare
        );
        // 65535 * 65536 + 65535 is exactly u32::MAX.
        assert_eq!(
            BoardMode::ArucoGrid.resolve_role(65535, 65535, 65536, 0),
            BlockRole::Marker(u32::MAX)
        );
        assert_eq!(
            BoardMode::ArucoGrid.resolve_role(65534, 65535, 65536, 0),
            BlockRole::Marker(u32::MAX - 1)
        );
    }

    #[test]
    fn chess_page_size_matches_square_count() {
        let layout = BoardLayout::new(BoardSpec::chess(4, 3, 0.09), None).expect("layout");
        let page = layout.page_size();
        assert_relative_eq!(page.x, 4.0 * 0.09 * PT_PER_METER, epsilon = 1e-9);
        assert_relative_eq!(page.y, 3.0 * 0.09 * PT_PER_METER, epsilon = 1e-9);
    }

    #[test]
    fn grid_page_has_no_trailing_gap() {
        let d = dict(6);
        let spec = BoardSpec::aruco_grid(3, 2, 0.05, 0.01, 0);
        let layout = BoardLayout::new(spec, Some(&d)).expect("layout");
        let page = layout.page_size();
        assert_relative_eq!(page.x, (3.0 * 0.05 + 2.0 * 0.01) * PT_PER_METER, epsilon = 1e-9);
        assert_relative_eq!(page.y, (2.0 * 0.05 + 0.01) * PT_PER_METER, epsilon = 1e-9);
    }

    #[test]
    fn missing_lengths_and_dictionary_are_reported() {
        let mut spec = BoardSpec::chess(4, 4, 0.05);
        spec.square_length = None;
        assert!(matches!(
            BoardLayout::new(spec, None),
            Err(BoardError::MissingLength(_))
        ));

        let spec = BoardSpec::charuco(4, 4, 0.05, 0.04);
        assert!(matches!(
            BoardLayout::new(spec, None),
            Err(BoardError::MissingDictionary(BoardMode::Charuco))
        ));

        let mut spec = BoardSpec::aruco_grid(2, 2, 0.05, 0.01, 0);
        spec.marker_separation = None;
        let d = dict(4);
        assert!(matches!(
            BoardLayout::new(spec, Some(&d)),
            Err(BoardError::MissingLength("marker_separation"))
        ));
    }

    #[test]
    fn one_length_stands_in_for_the_other() {
        let d = dict(8);
        let mut spec = BoardSpec::charuco(4, 4, 0.05, 0.05);
        spec.marker_length = None;
        let layout = BoardLayout::new(spec, Some(&d)).expect("layout");
        assert_relative_eq!(layout.marker_length(), layout.square_length());
        assert_relative_eq!(layout.marker_inset(), 0.0);
    }

    #[test]
    fn invalid_configurations_are_rejected() {
        let d = dict(100);
        assert!(matches!(
            BoardLayout::new(BoardSpec::chess(1, 5, 0.05), None),
            Err(BoardError::InvalidSize { .. })
        ));
        assert!(matches!(
            BoardLayout::new(BoardSpec::chess(3, 3, -0.05), None),
            Err(BoardError::InvalidLength { name: "square_length", .. })
        ));
        assert!(matches!(
            BoardLayout::new(BoardSpec::charuco(3, 3, 0.03, 0.04), Some(&d)),
            Err(BoardError::MarkerLargerThanSquare { .. })
        ));
        assert!(matches!(
            BoardLayout::new(BoardSpec::aruco(0, 0.05).with_border_bits(0), Some(&d)),
            Err(BoardError::InvalidBorderBits)
        ));
        assert!(matches!(
            BoardLayout::new(BoardSpec::aruco_grid(2, 2, 0.05, 0.0, 0), Some(&d)),
            Err(BoardError::InvalidLength { name: "marker_separation", .. })
        ));
    }

    #[test]
    fn dictionary_capacity_is_checked() {
        let d = dict(10);
        assert!(BoardLayout::new(BoardSpec::aruco_grid(3, 3, 0.05, 0.01, 1), Some(&d)).is_ok());
        assert!(matches!(
            BoardLayout::new(BoardSpec::aruco_grid(3, 3, 0.05, 0.01, 2), Some(&d)),
            Err(BoardError::DictionaryCapacity {
                needed: 11,
                available: 10
            })
        ));
        // 5x4 ChArUco has 10 marker squares.
        assert!(BoardLayout::new(BoardSpec::charuco(5, 4, 0.05, 0.04), Some(&d)).is_ok());
        assert!(BoardLayout::new(BoardSpec::charuco(5, 5, 0.05, 0.04), Some(&d)).is_err());
        assert!(matches!(
            BoardLayout::new(BoardSpec::aruco(10, 0.05), Some(&d)),
            Err(BoardError::InvalidMarkerId(DecodeError::InvalidMarkerId {
                id: 10,
                count: 10
            }))
        ));
    }

    #[test]
    fn spec_round_trips_through_json() {
        let spec = BoardSpec::aruco_grid(4, 3, 0.04, 0.01, 7).with_border_bits(2);
        let json = serde_json::to_string(&spec).expect("json");
        assert!(json.contains("\"aruco_grid\""));
        let back: BoardSpec = serde_json::from_str(&json).expect("parse");
        assert_eq!(back, spec);

        let minimal: BoardSpec =
            serde_json::from_str(r#"{"mode":"chess","size_x":5,"size_y":4,"square_length":0.03}"#)
                .expect("parse");
        assert_eq!(minimal.border_bits, 1);
        assert_eq!(minimal.first_marker_id, 0);
    }
}
