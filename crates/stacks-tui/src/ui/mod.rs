//! Terminal UI module using ratatui.
//!
//! - `render`: frame layout, navigation bar and overlays
//! - `input`: keyboard event handling
//! - `styles`: color scheme and text styling
//! - `pages`: content rendering for each routed page

pub mod input;
pub mod pages;
pub mod render;
pub mod styles;
