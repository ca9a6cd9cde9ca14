//! Full-screen terminal explorer.
//!
//! ## Entry points
//!
//! - [`explore::run_explorer`]: interactive ego-graph navigation over a
//!   loaded dataset.
//!
//! The canvas is drawn in braille cells. The engine works in screen pixels,
//! so every terminal cell counts as [`CELL_W`] × [`CELL_H`] pixels.

mod draw;
pub mod explore;
mod terminal;

/// Pixel width of one terminal cell.
pub const CELL_W: f64 = 8.0;
/// Pixel height of one terminal cell.
pub const CELL_H: f64 = 16.0;

/// Filter panel width in columns.
pub const LEFT_COLS: u16 = 44;
/// Detail panel width in columns.
pub const RIGHT_COLS: u16 = 40;
/// Focus banner height in rows.
pub const BANNER_ROWS: u16 = 5;
