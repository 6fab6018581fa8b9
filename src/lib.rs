//! Grid ray-casting renderer: walls cast against a tile map, billboard
//! sprites projected into the same view, and one far-to-near draw list.

pub mod config;
pub mod core;
pub mod error;
pub mod render;
