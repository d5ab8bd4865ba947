//! Terminal UI module using ratatui.
//!
//! - `render`: frame layout, banners and overlays
//! - `cards`: the user card grid
//! - `input`: keyboard event handling
//! - `styles`: color scheme and text styling

pub mod cards;
pub mod input;
pub mod render;
pub mod styles;
