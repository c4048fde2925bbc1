//! Core types for printable calibration sheets.
//!
//! This crate is intentionally small: it knows about physical units, a
//! minimal vector [`Canvas`] and a recording [`Scene`], but nothing about
//! markers or boards. File-format writers consume recorded scenes.

mod canvas;
mod logger;
mod scene;
mod units;

pub use canvas::{Canvas, Rgba};
pub use scene::{DrawCommand, Scene};
pub use units::{meters_to_points, points_to_meters, PT_PER_METER};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_with_level, level_from_verbosity};
