//! Boundary tracing: turn a marker's transition edges into filled contours.
//!
//! Contours are extracted with a right-hand wall follower. Each start point is
//! the first unconsumed horizontal edge in row-major order, so a contour is
//! always found before any contour nested inside it. Filling the contours in
//! emission order on top of a black square reproduces the bit matrix exactly;
//! no connected-component pass is needed.

use serde::{Deserialize, Serialize};

use crate::bits::BorderedBitMatrix;
use crate::dictionary::{DecodeError, Dictionary};
use crate::edges::EdgeMap;

/// Fill color of a traced region.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillColor {
    Black,
    White,
}

impl FillColor {
    /// Color of a marker cell holding `bit`.
    #[inline]
    pub fn of_bit(bit: bool) -> Self {
        if bit {
            FillColor::White
        } else {
            FillColor::Black
        }
    }

    #[inline]
    pub fn inverted(self) -> Self {
        match self {
            FillColor::Black => FillColor::White,
            FillColor::White => FillColor::Black,
        }
    }
}

/// A closed polygon on the marker's grid points (`first == last`).
///
/// Points are in inner-matrix grid coordinates: `(0, 0)` is the top-left
/// corner of the first inner cell.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contour {
    pub color: FillColor,
    pub points: Vec<[i32; 2]>,
}

impl Contour {
    /// Number of unit edges walked.
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.points.len().saturating_sub(1)
    }
}

/// Heading of the wall follower, clockwise from east.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Heading {
    East,
    South,
    West,
    North,
}

impl Heading {
    #[inline]
    fn turn_right(self) -> Self {
        match self {
            Heading::East => Heading::South,
            Heading::South => Heading::West,
            Heading::West => Heading::North,
            Heading::North => Heading::East,
        }
    }
}

/// Consume the edge leaving `(x, y)` towards `heading`, returning the new point.
fn step(edges: &mut EdgeMap, [x, y]: [i32; 2], heading: Heading) -> Option<[i32; 2]> {
    match heading {
        Heading::East => edges.take_h(x, y).then_some([x + 1, y]),
        Heading::South => edges.take_v(x, y).then_some([x, y + 1]),
        Heading::West => edges.take_h(x - 1, y).then_some([x - 1, y]),
        Heading::North => edges.take_v(x, y - 1).then_some([x, y - 1]),
    }
}

/// Lazy contour extraction over a single-use [`EdgeMap`].
///
/// Each `next()` traces one closed contour and clears its edges. Clone the
/// edge map first to keep it intact.
pub struct ContourTracer<'a> {
    edges: &'a mut EdgeMap,
    bits: &'a BorderedBitMatrix,
    cursor: usize,
}

impl<'a> ContourTracer<'a> {
    pub fn new(edges: &'a mut EdgeMap, bits: &'a BorderedBitMatrix) -> Self {
        debug_assert_eq!(edges.marker_size(), bits.marker_size());
        Self {
            edges,
            bits,
            cursor: 0,
        }
    }

    fn walk(&mut self, start: [i32; 2]) -> Vec<[i32; 2]> {
        let mut points = vec![start];
        let mut current = start;
        let mut heading = Heading::North;

        loop {
            let mut next = None;
            let mut candidate = heading;
            for _ in 0..4 {
                candidate = candidate.turn_right();
                if let Some(p) = step(self.edges, current, candidate) {
                    next = Some(p);
                    break;
                }
            }
            let Some(p) = next else {
                // Unreachable for a closed boundary; close what we have.
                log::warn!("contour tracing hit a dead end at {current:?}");
                points.push(start);
                break;
            };
            points.push(p);
            current = p;
            heading = candidate;
            if current == start {
                break;
            }
        }

        points
    }
}

impl Iterator for ContourTracer<'_> {
    type Item = Contour;

    fn next(&mut self) -> Option<Contour> {
        let (idx, start) = self.edges.next_h_from(self.cursor)?;
        self.cursor = idx;

        let b = self.bits.border_bits() as isize;
        let above = self
            .bits
            .get(start[0] as isize + b, start[1] as isize + b - 1);
        let color = FillColor::of_bit(above).inverted();

        let points = self.walk(start);
        Some(Contour { color, points })
    }
}

/// Trace all contours of a bordered marker, consuming `edges`.
pub fn trace_contours(edges: &mut EdgeMap, bits: &BorderedBitMatrix) -> Vec<Contour> {
    ContourTracer::new(edges, bits).collect()
}

/// Decode marker `id`, frame it with `border_bits` and trace its contours.
#[cfg_attr(feature = "tracing", tracing::instrument(level = "debug", skip(dict), fields(dict = dict.name())))]
pub fn marker_contours(
    dict: &Dictionary,
    id: usize,
    border_bits: usize,
) -> Result<Vec<Contour>, DecodeError> {
    let bits = dict.marker_bits(id)?.bordered(border_bits);
    let mut edges = EdgeMap::build(&bits);
    Ok(trace_contours(&mut edges, &bits))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::BitMatrix;

    #[test]
    fn single_white_cell_is_one_square() {
        let bits = BitMatrix::from_fn(3, |x, y| x == 1 && y == 1).bordered(1);
        let mut edges = EdgeMap::build(&bits);
        let contours = trace_contours(&mut edges, &bits);

        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].color, FillColor::White);
        assert_eq!(contours[0].points, vec![[1, 1], [2, 1], [2, 2], [1, 2], [1, 1]]);
        assert!(edges.is_empty());
    }

    #[test]
    fn black_hole_in_white_ring_is_traced_after_the_ring() {
        let bits = BitMatrix::from_fn(3, |x, y| !(x == 1 && y == 1)).bordered(1);
        let mut edges = EdgeMap::build(&bits);
        let contours = trace_contours(&mut edges, &bits);

        assert_eq!(contours.len(), 2);
        assert_eq!(contours[0].color, FillColor::White);
        assert_eq!(contours[0].edge_count(), 12);
        assert_eq!(contours[1].color, FillColor::Black);
        assert_eq!(contours[1].points.first(), Some(&[1, 1]));
    }

    #[test]
    fn contours_are_closed_and_consume_every_edge() {
        let inner = BitMatrix::from_fn(6, |x, y| (x ^ y) & 1 == 0 || (x + 2 * y) % 5 == 0);
        for border in 0..3 {
            let bits = inner.bordered(border);
            let mut edges = EdgeMap::build(&bits);
            let total = edges.count();
            let contours = trace_contours(&mut edges, &bits);

            assert!(edges.is_empty());
            let walked: usize = contours.iter().map(Contour::edge_count).sum();
            assert_eq!(walked, total);
            for c in &contours {
                assert_eq!(c.points.first(), c.points.last());
            }
        }
    }

    #[test]
    fn diagonal_touch_at_a_vertex_stays_simple() {
        // White cells touching only at the corner (1, 1).
        let bits = BitMatrix::from_fn(2, |x, y| x == y).bordered(1);
        let mut edges = EdgeMap::build(&bits);
        let contours = trace_contours(&mut edges, &bits);
        let walked: usize = contours.iter().map(Contour::edge_count).sum();
        assert_eq!(walked, 8);
        assert!(contours.iter().all(|c| c.color == FillColor::White));
    }

    #[test]
    fn marker_contours_reports_bad_ids() {
        let dict = Dictionary::new("custom", 4, vec![vec![0xB2, 0xC0]]).expect("dict");
        assert!(marker_contours(&dict, 0, 1).is_ok());
        assert!(matches!(
            marker_contours(&dict, 3, 1),
            Err(DecodeError::InvalidMarkerId { id: 3, count: 1 })
        ));
    }
}
