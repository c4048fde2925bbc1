//! Drawing a validated board (or one tile of it) onto a [`Canvas`].

use calib_sheets_aruco::{BorderedBitMatrix, ContourTracer, EdgeMap, FillColor};
use calib_sheets_core::{Canvas, Rgba, Scene};
use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

use crate::board::{BlockRole, BoardError, BoardLayout};
use crate::tiles::Tile;

/// How marker bit patterns are drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// Filled vector contours from the boundary tracer.
    #[default]
    Contour,
    /// Debug: stroke every transition edge.
    Line,
    /// Debug: one filled square per set bit.
    Block,
}

fn fill(color: FillColor) -> Rgba {
    match color {
        FillColor::Black => Rgba::BLACK,
        FillColor::White => Rgba::WHITE,
    }
}

/// Maps marker grid points to page coordinates.
struct MarkerFrame {
    origin: Point2<f64>,
    unit: f64,
    border: f64,
}

impl MarkerFrame {
    #[inline]
    fn point(&self, [x, y]: [i32; 2]) -> Point2<f64> {
        self.origin + Vector2::new(x as f64 + self.border, y as f64 + self.border) * self.unit
    }
}

impl BoardLayout<'_> {
    /// Draw `tile` with coordinates relative to its top-left corner.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "debug", skip(self, canvas), fields(range = ?tile.range)))]
    pub fn draw<C: Canvas>(&self, canvas: &mut C, tile: &Tile, mode: RenderMode) -> Result<(), BoardError> {
        let pitch = self.pitch();
        let range = tile.range;

        canvas.set_color(Rgba::WHITE);
        canvas.fill_rect(0.0, 0.0, tile.size.x, tile.size.y);

        let mut markers = 0usize;
        for (bx, by) in range.cells() {
            let cell = Point2::new(
                (bx - range.x0) as f64 * pitch,
                (by - range.y0) as f64 * pitch,
            );
            match self.role(bx, by) {
                BlockRole::Blank => {}
                BlockRole::SolidSquare => {
                    let side = self.square_length();
                    canvas.set_color(Rgba::BLACK);
                    canvas.fill_rect(cell.x, cell.y, side, side);
                }
                BlockRole::Marker(id) => {
                    let inset = self.marker_inset();
                    self.draw_marker(canvas, cell + Vector2::new(inset, inset), id, mode)?;
                    markers += 1;
                }
            }
        }

        log::debug!(
            "drew {:?} cells {}..{} x {}..{} ({} markers, {:.1}x{:.1} pt)",
            self.mode(),
            range.x0,
            range.x1,
            range.y0,
            range.y1,
            markers,
            tile.size.x,
            tile.size.y
        );
        Ok(())
    }

    /// Record `tile` into a fresh [`Scene`] of the tile's page size.
    pub fn render(&self, tile: &Tile, mode: RenderMode) -> Result<Scene, BoardError> {
        let mut scene = Scene::new(tile.size.x, tile.size.y);
        self.draw(&mut scene, tile, mode)?;
        Ok(scene)
    }

    fn draw_marker<C: Canvas>(
        &self,
        canvas: &mut C,
        origin: Point2<f64>,
        id: u32,
        mode: RenderMode,
    ) -> Result<(), BoardError> {
        let dict = self
            .dictionary()
            .ok_or(BoardError::MissingDictionary(self.mode()))?;
        let border_bits = self.spec().border_bits as usize;
        let bits = dict.marker_bits(id as usize)?.bordered(border_bits);
        let side = self.marker_length();

        canvas.set_color(Rgba::BLACK);
        canvas.fill_rect(origin.x, origin.y, side, side);

        let frame = MarkerFrame {
            origin,
            unit: side / bits.side() as f64,
            border: border_bits as f64,
        };
        match mode {
            RenderMode::Contour => draw_contours(canvas, &frame, &bits),
            RenderMode::Line => draw_edges(canvas, &frame, &bits),
            RenderMode::Block => draw_blocks(canvas, &frame, &bits),
        }
        Ok(())
    }
}

fn draw_contours<C: Canvas>(canvas: &mut C, frame: &MarkerFrame, bits: &BorderedBitMatrix) {
    let mut edges = EdgeMap::build(bits);
    for contour in ContourTracer::new(&mut edges, bits) {
        let Some((first, rest)) = contour.points.split_first() else {
            continue;
        };
        canvas.set_color(fill(contour.color));
        let p = frame.point(*first);
        canvas.move_to(p.x, p.y);
        // The last point repeats the first; close_path draws that segment.
        for &q in &rest[..rest.len().saturating_sub(1)] {
            let p = frame.point(q);
            canvas.line_to(p.x, p.y);
        }
        canvas.close_path();
        canvas.fill_path();
    }
}

fn draw_edges<C: Canvas>(canvas: &mut C, frame: &MarkerFrame, bits: &BorderedBitMatrix) {
    canvas.set_color(Rgba::WHITE);
    canvas.set_stroke_width(frame.unit * 0.1);
    for (a, b) in EdgeMap::build(bits).segments() {
        let (a, b) = (frame.point(a), frame.point(b));
        canvas.move_to(a.x, a.y);
        canvas.line_to(b.x, b.y);
        canvas.stroke_path();
    }
}

fn draw_blocks<C: Canvas>(canvas: &mut C, frame: &MarkerFrame, bits: &BorderedBitMatrix) {
    let inner = bits.inner();
    canvas.set_color(Rgba::WHITE);
    for y in 0..inner.size() {
        for x in 0..inner.size() {
            if inner.get(x, y) {
                let p = frame.point([x as i32, y as i32]);
                canvas.fill_rect(p.x, p.y, frame.unit, frame.unit);
            }
        }
    }
}
