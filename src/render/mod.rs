//! Frame pipeline and presentation helpers.
//!
//! - `casters`: ray casting against the grid
//! - `column`: wall strip rasterizer
//! - `sprites`: sprite projector
//! - `compositor`: far-to-near draw list
//! - `framebuffer`: CPU colour buffer
//! - `textures`: texture store with fallbacks
//! - `render3d`: background, pipeline and blitter

pub mod casters;
pub mod column;
pub mod compositor;
pub mod framebuffer;
pub mod render3d;
pub mod sprites;
pub mod textures;
