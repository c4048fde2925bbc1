//! Printable calibration boards.
//!
//! - [`BoardSpec`] / [`BoardLayout`]: board parameters, validation and per-cell
//!   roles for chessboard, single ArUco, ArUco grid and ChArUco boards.
//! - [`split`] / [`BoardLayout::tiles`]: cut an oversized board into pages.
//! - [`BoardLayout::draw`]: draw a page onto any [`calib_sheets_core::Canvas`].
//! - [`PrintConfig`] / [`PrintReport`]: JSON in, recorded pages out.
//!
//! Lengths in [`BoardSpec`] are meters; everything drawn is in points.
//!
//! ```
//! use calib_sheets_print::{BoardLayout, BoardSpec, RenderMode};
//!
//! let layout = BoardLayout::new(BoardSpec::chess(4, 3, 0.09), None)?;
//! let scene = layout.render(&layout.full_tile(), RenderMode::Contour)?;
//! assert_eq!(scene.filled_path_count(), 0);
//! # Ok::<(), calib_sheets_print::BoardError>(())
//! ```

mod board;
mod io;
mod output;
mod render;
mod tiles;

pub use board::{BlockRole, BoardError, BoardLayout, BoardMode, BoardSpec};
pub use io::{render_pages, PageReport, PrintConfig, PrintIoError, PrintReport};
pub use output::{tile_path, OutputError, OutputFormat};
pub use render::RenderMode;
pub use tiles::{resolve_sub_size, split, Tile, TileRange};
