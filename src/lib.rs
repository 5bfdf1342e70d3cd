//! Family-tree layout engine with a terminal viewer.

pub mod config;
pub mod error;
pub mod family;
pub mod geometry;
pub mod tui;
pub mod viewport;
