//! Boundary edges between adjacent cells of a bordered marker.
//!
//! Grid points are the corners of marker cells, `(0, 0)` being the top-left
//! corner of the inner (unbordered) matrix and `(N, N)` its bottom-right.
//! `h(x, y)` is the horizontal unit segment `(x, y) → (x + 1, y)`, set when the
//! cells above and below it differ; `v(x, y)` is the vertical segment
//! `(x, y) → (x, y + 1)`, set when the cells left and right of it differ.
//! Only segments touching the inner matrix are computed: the border is painted
//! as one solid rectangle beforehand.

use crate::bits::BorderedBitMatrix;

/// Horizontal and vertical transition edges of one marker, `(N + 1)²` each.
///
/// Tracing consumes edges in place, so an `EdgeMap` is single-use.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EdgeMap {
    marker_size: usize,
    h: Vec<bool>,
    v: Vec<bool>,
}

impl EdgeMap {
    /// Compute every transition edge of `bits`.
    pub fn build(bits: &BorderedBitMatrix) -> Self {
        let n = bits.marker_size();
        let b = bits.border_bits() as isize;
        let stride = n + 1;
        let mut h = vec![false; stride * stride];
        let mut v = vec![false; stride * stride];

        for mx in 0..n {
            for my in 0..=n {
                let (x, y) = (mx as isize + b, my as isize + b);
                h[my * stride + mx] = bits.get(x, y - 1) ^ bits.get(x, y);
            }
        }
        for mx in 0..=n {
            for my in 0..n {
                let (x, y) = (mx as isize + b, my as isize + b);
                v[my * stride + mx] = bits.get(x - 1, y) ^ bits.get(x, y);
            }
        }

        Self {
            marker_size: n,
            h,
            v,
        }
    }

    #[inline]
    pub fn marker_size(&self) -> usize {
        self.marker_size
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let stride = self.marker_size as i32 + 1;
        if x < 0 || y < 0 || x >= stride || y >= stride {
            return None;
        }
        Some((y * stride + x) as usize)
    }

    /// Horizontal edge `(x, y) → (x + 1, y)`; out-of-range reads as unset.
    pub fn h(&self, x: i32, y: i32) -> bool {
        self.index(x, y).is_some_and(|i| self.h[i])
    }

    /// Vertical edge `(x, y) → (x, y + 1)`; out-of-range reads as unset.
    pub fn v(&self, x: i32, y: i32) -> bool {
        self.index(x, y).is_some_and(|i| self.v[i])
    }

    /// Clear a horizontal edge, returning whether it was set.
    pub(crate) fn take_h(&mut self, x: i32, y: i32) -> bool {
        match self.index(x, y) {
            Some(i) => std::mem::replace(&mut self.h[i], false),
            None => false,
        }
    }

    /// Clear a vertical edge, returning whether it was set.
    pub(crate) fn take_v(&mut self, x: i32, y: i32) -> bool {
        match self.index(x, y) {
            Some(i) => std::mem::replace(&mut self.v[i], false),
            None => false,
        }
    }

    /// Number of set edges (both orientations).
    pub fn count(&self) -> usize {
        self.h.iter().chain(&self.v).filter(|&&e| e).count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Row-major position of the first set horizontal edge at or after `from`.
    pub(crate) fn next_h_from(&self, from: usize) -> Option<(usize, [i32; 2])> {
        let stride = self.marker_size + 1;
        self.h
            .iter()
            .enumerate()
            .skip(from)
            .find(|&(_, &e)| e)
            .map(|(i, _)| (i, [(i % stride) as i32, (i / stride) as i32]))
    }

    /// Every set edge as a `(start, end)` unit segment in grid points.
    pub fn segments(&self) -> Vec<([i32; 2], [i32; 2])> {
        let stride = self.marker_size as i32 + 1;
        let mut out = Vec::new();
        for y in 0..stride {
            for x in 0..stride {
                if self.h(x, y) {
                    out.push(([x, y], [x + 1, y]));
                }
                if self.v(x, y) {
                    out.push(([x, y], [x, y + 1]));
                }
            }
        }
        out
    }
}
