//! Splitting a board into printable sub-tiles.

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

use crate::board::{BoardError, BoardLayout, BoardMode};

/// Half-open cell range `[x0, x1) × [y0, y1)` of one tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileRange {
    pub x0: u32,
    pub x1: u32,
    pub y0: u32,
    pub y1: u32,
}

impl TileRange {
    /// The whole `size_x × size_y` board.
    pub fn full(size_x: u32, size_y: u32) -> Self {
        Self {
            x0: 0,
            x1: size_x,
            y0: 0,
            y1: size_y,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.x1 - self.x0
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.y1 - self.y0
    }

    #[inline]
    pub fn contains(&self, bx: u32, by: u32) -> bool {
        (self.x0..self.x1).contains(&bx) && (self.y0..self.y1).contains(&by)
    }

    /// Cells of the tile in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (self.y0..self.y1).flat_map(move |by| (self.x0..self.x1).map(move |bx| (bx, by)))
    }

    /// File name suffix `_X{x0}_{x1}_Y{y0}_{y1}`.
    pub fn suffix(&self) -> String {
        format!("_X{}_{}_Y{}_{}", self.x0, self.x1, self.y0, self.y1)
    }
}

/// Tile boundaries along one axis: `0, sub, 2·sub, …` clamped to `size`.
fn boundaries(size: u32, sub: u32) -> Vec<u32> {
    let count = size.div_ceil(sub);
    (0..=count).map(|i| i.saturating_mul(sub).min(size)).collect()
}

/// Split a `size_x × size_y` board into tiles of at most `sub_x × sub_y` cells.
///
/// Tiles come in x-major order: every y range of the first x range, then the
/// next x range. Trailing tiles are clamped to the board.
pub fn split(size_x: u32, size_y: u32, sub_x: u32, sub_y: u32) -> Result<Vec<TileRange>, BoardError> {
    if sub_x == 0 || sub_y == 0 {
        return Err(BoardError::InvalidTileSize { sub_x, sub_y });
    }
    if sub_x > size_x || sub_y > size_y {
        log::warn!(
            "tile size {sub_x}x{sub_y} exceeds the {size_x}x{size_y} board; clamping to the board"
        );
    }

    let xs = boundaries(size_x, sub_x);
    let ys = boundaries(size_y, sub_y);
    let mut tiles = Vec::with_capacity((xs.len() - 1) * (ys.len() - 1));
    for x in xs.windows(2) {
        for y in ys.windows(2) {
            tiles.push(TileRange {
                x0: x[0],
                x1: x[1],
                y0: y[0],
                y1: y[1],
            });
        }
    }
    Ok(tiles)
}

/// Resolve a requested `[sub_x, sub_y]` against the board size.
///
/// A zero axis spans the whole board; `[0, 0]` means no tiling (`None`).
pub fn resolve_sub_size(sub: [u32; 2], size_x: u32, size_y: u32) -> Option<(u32, u32)> {
    match sub {
        [0, 0] => None,
        [0, y] => Some((size_x, y)),
        [x, 0] => Some((x, size_y)),
        [x, y] => Some((x, y)),
    }
}

/// One printable page: a cell range plus its physical placement in points.
#[derive(Clone, Debug, PartialEq)]
pub struct Tile {
    pub range: TileRange,
    /// Top-left corner of the tile on the full board.
    pub origin: Point2<f64>,
    /// Page size of the tile.
    pub size: Vector2<f64>,
}

impl BoardLayout<'_> {
    /// Physical extent of `range` on the board.
    ///
    /// The trailing separation of an ArUco grid is dropped only where the
    /// range ends on the board edge.
    pub fn tile(&self, range: TileRange) -> Tile {
        let pitch = self.pitch();
        let (size_x, size_y) = self.size();
        let trim = |end: u32, size: u32| {
            if end == size && self.mode() == BoardMode::ArucoGrid {
                self.marker_separation()
            } else {
                0.0
            }
        };
        let origin = Point2::new(range.x0 as f64 * pitch, range.y0 as f64 * pitch);
        let end = Point2::new(
            range.x1 as f64 * pitch - trim(range.x1, size_x),
            range.y1 as f64 * pitch - trim(range.y1, size_y),
        );
        Tile {
            range,
            origin,
            size: end - origin,
        }
    }

    /// The single page covering the whole board.
    pub fn full_tile(&self) -> Tile {
        let (size_x, size_y) = self.size();
        self.tile(TileRange::full(size_x, size_y))
    }

    /// Tiles for a requested `[sub_x, sub_y]` (see [`resolve_sub_size`]).
    ///
    /// Returns an empty list when no tiling is requested.
    pub fn tiles(&self, sub: [u32; 2]) -> Result<Vec<Tile>, BoardError> {
        let (size_x, size_y) = self.size();
        let Some((sub_x, sub_y)) = resolve_sub_size(sub, size_x, size_y) else {
            return Ok(Vec::new());
        };
        Ok(split(size_x, size_y, sub_x, sub_y)?
            .into_iter()
            .map(|r| self.tile(r))
            .collect())
    }
}
