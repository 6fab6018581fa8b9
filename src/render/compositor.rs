//! Depth compositor: one global far-to-near sort of walls and sprites
//! (painter's algorithm, no per-pixel depth test).
//!
//! Items of nearly equal depth may swap order between frames; that is accepted.
use crate::render::sprites::SpriteView;
use crate::render::textures::TextureKey;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }
}

/// A positioned image ready for blitting.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DrawItem {
    pub depth: f32,
    pub texture: TextureKey,
    /// Source sub-rectangle; `None` means the whole image.
    pub src: Option<Rect>,
    pub dest: Rect,
}

/// Merges walls and the visible sprites, farthest first. Hidden sprites are
/// dropped. The sort is stable, so equal depths keep their input order.
pub fn compose(walls: Vec<DrawItem>, sprites: &[SpriteView]) -> Vec<DrawItem> {
    let mut items = walls;
    items.extend(sprites.iter().filter_map(SpriteView::draw_item));
    sort_far_to_near(&mut items);
    items
}

pub fn sort_far_to_near(items: &mut [DrawItem]) {
    items.sort_by(|a, b| b.depth.total_cmp(&a.depth));
}
