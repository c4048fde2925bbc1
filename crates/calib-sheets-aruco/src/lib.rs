//! ArUco/AprilTag dictionaries and marker vectorization.
//!
//! This crate focuses on:
//! - dictionaries as immutable tables of packed marker bytes (loaded by the host),
//! - decoding one marker into its `N × N` bit matrix,
//! - converting a bordered bit matrix into a minimal set of closed, filled
//!   contours so markers render as crisp vector paths.
//!
//! It does **not** draw anything. Board layout and canvas output live in
//! `calib-sheets-print`.

mod bits;
mod dictionary;
mod edges;
mod trace;

pub use bits::{packed_len, BitMatrix, BorderedBitMatrix};
pub use dictionary::{known_marker_size, DecodeError, Dictionary, DictionaryError, DictionarySet};
pub use edges::EdgeMap;
pub use trace::{marker_contours, trace_contours, Contour, ContourTracer, FillColor};
