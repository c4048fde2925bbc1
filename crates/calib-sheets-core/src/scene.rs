//! Recording canvas.
//!
//! A [`Scene`] stores every drawing call as a [`DrawCommand`] so that a file
//! writer (SVG, PDF, ...) can replay it later, and so that tests can inspect
//! the rendered result by point sampling.

use serde::{Deserialize, Serialize};

use crate::canvas::{Canvas, Rgba};

/// One recorded drawing call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    SetColor { color: Rgba },
    FillRect { x: f64, y: f64, width: f64, height: f64 },
    MoveTo { x: f64, y: f64 },
    LineTo { x: f64, y: f64 },
    ClosePath,
    FillPath,
    SetStrokeWidth { width: f64 },
    StrokePath,
}

/// A page of recorded drawing commands with its size in points.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    width: f64,
    height: f64,
    commands: Vec<DrawCommand>,
}

impl Scene {
    /// Empty scene of the given page size (points).
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Recorded commands in drawing order.
    #[inline]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Number of `fill_path` calls recorded.
    pub fn filled_path_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::FillPath))
            .count()
    }

    /// Color visible at `(x, y)` after replaying every fill in order.
    ///
    /// Paths are filled with the nonzero winding rule. Strokes are ignored.
    /// Returns `None` when nothing was painted at that point.
    pub fn color_at(&self, x: f64, y: f64) -> Option<Rgba> {
        let mut current = Rgba::BLACK;
        let mut visible = None;
        let mut path: Vec<Vec<[f64; 2]>> = Vec::new();

        for cmd in &self.commands {
            match *cmd {
                DrawCommand::SetColor { color } => current = color,
                DrawCommand::FillRect {
                    x: rx,
                    y: ry,
                    width,
                    height,
                } => {
                    if x >= rx && x < rx + width && y >= ry && y < ry + height {
                        visible = Some(current);
                    }
                }
                DrawCommand::MoveTo { x: px, y: py } => path.push(vec![[px, py]]),
                DrawCommand::LineTo { x: px, y: py } => match path.last_mut() {
                    Some(sub) => sub.push([px, py]),
                    None => path.push(vec![[px, py]]),
                },
                DrawCommand::ClosePath => {
                    if let Some(first) = path.last().and_then(|sub| sub.first().copied()) {
                        path.push(vec![first]);
                    }
                }
                DrawCommand::FillPath => {
                    let winding: i32 = path.iter().map(|sub| winding_number(sub, x, y)).sum();
                    if winding != 0 {
                        visible = Some(current);
                    }
                    path.clear();
                }
                DrawCommand::StrokePath => path.clear(),
                DrawCommand::SetStrokeWidth { .. } => {}
            }
        }

        visible
    }
}

/// Winding number of an implicitly closed polygon around `(x, y)`.
fn winding_number(poly: &[[f64; 2]], x: f64, y: f64) -> i32 {
    if poly.len() < 2 {
        return 0;
    }
    let mut winding = 0;
    for (i, &[x1, y1]) in poly.iter().enumerate() {
        let [x2, y2] = poly[(i + 1) % poly.len()];
        let upward = y1 <= y && y < y2;
        let downward = y2 <= y && y < y1;
        if !(upward || downward) {
            continue;
        }
        let xi = x1 + (y - y1) * (x2 - x1) / (y2 - y1);
        if x < xi {
            winding += if upward { 1 } else { -1 };
        }
    }
    winding
}

impl Canvas for Scene {
    fn set_color(&mut self, color: Rgba) {
        self.commands.push(DrawCommand::SetColor { color });
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.commands.push(DrawCommand::FillRect {
            x,
            y,
            width,
            height,
        });
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.commands.push(DrawCommand::MoveTo { x, y });
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.commands.push(DrawCommand::LineTo { x, y });
    }

    fn close_path(&mut self) {
        self.commands.push(DrawCommand::ClosePath);
    }

    fn fill_path(&mut self) {
        self.commands.push(DrawCommand::FillPath);
    }

    fn set_stroke_width(&mut self, width: f64) {
        self.commands.push(DrawCommand::SetStrokeWidth { width });
    }

    fn stroke_path(&mut self) {
        self.commands.push(DrawCommand::StrokePath);
    }
}
