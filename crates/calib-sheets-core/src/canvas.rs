//! Minimal vector canvas interface.
//!
//! Coordinates are in points with the origin at the top-left corner of the
//! surface and `y` growing downwards. Paths are built with `move_to` /
//! `line_to` / `close_path` and consumed by `fill_path` or `stroke_path`.

use serde::{Deserialize, Serialize};

/// RGBA color with components in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::opaque(0.0, 0.0, 0.0);
    pub const WHITE: Rgba = Rgba::opaque(1.0, 1.0, 1.0);

    /// Fully opaque color.
    pub const fn opaque(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }
}

/// Drawing surface used by the board renderer.
///
/// The current color applies to both fills and strokes.
pub trait Canvas {
    fn set_color(&mut self, color: Rgba);

    /// Fill an axis-aligned rectangle with the current color.
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64);

    /// Start a new sub-path at `(x, y)`.
    fn move_to(&mut self, x: f64, y: f64);

    fn line_to(&mut self, x: f64, y: f64);

    /// Close the current sub-path back to its starting point.
    fn close_path(&mut self);

    /// Fill the current path with the current color and clear it.
    fn fill_path(&mut self);

    fn set_stroke_width(&mut self, width: f64);

    /// Stroke the current path with the current color and clear it.
    fn stroke_path(&mut self);
}

impl<C: Canvas + ?Sized> Canvas for &mut C {
    fn set_color(&mut self, color: Rgba) {
        (**self).set_color(color)
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        (**self).fill_rect(x, y, width, height)
    }

    fn move_to(&mut self, x: f64, y: f64) {
        (**self).move_to(x, y)
    }

    fn line_to(&mut self, x: f64, y: f64) {
        (**self).line_to(x, y)
    }

    fn close_path(&mut self) {
        (**self).close_path()
    }

    fn fill_path(&mut self) {
        (**self).fill_path()
    }

    fn set_stroke_width(&mut self, width: f64) {
        (**self).set_stroke_width(width)
    }

    fn stroke_path(&mut self) {
        (**self).stroke_path()
    }
}
