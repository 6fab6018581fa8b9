//! Frame assembly: background, the cast/rasterize/project/composite pipeline
//! and the blitter that paints the ordered draw list.
use raylib::prelude::*;
use tracing::trace;

use crate::config::Projection;
use crate::core::maze::Maze;
use crate::core::player::Viewpoint;
use crate::core::sprite::Sprite;
use crate::render::casters::{Ray, cast_rays};
use crate::render::column::rasterize_walls;
use crate::render::compositor::{DrawItem, Rect, compose};
use crate::render::framebuffer::Framebuffer;
use crate::render::sprites::locate_all;
use crate::render::textures::{TextureKey, TextureProvider};

const FLOOR: Color = Color::new(110, 110, 110, 255);
/// Sky pixels scrolled per degree of rotation.
const SKY_SCROLL: f32 = 5.0;
/// Pixels with lower alpha are treated as transparent.
const ALPHA_CUTOFF: u8 = 8;

/// Depth and projected size of whatever sits on the centre ray.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Shot {
    pub depth: f32,
    pub projected_height: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FrameStats {
    pub visible_sprites: usize,
    pub draw_items: usize,
    /// Centre-ray wall.
    pub wall_shot: Shot,
    /// Nearest targeted sprite, if any.
    pub sprite_shot: Option<Shot>,
}

impl FrameStats {
    /// Whichever of the wall and the targeted sprite is nearer.
    pub fn impact(&self) -> Shot {
        match self.sprite_shot {
            Some(s) if s.depth < self.wall_shot.depth => s,
            _ => self.wall_shot,
        }
    }
}

/// Ordered draw list for one frame plus what interaction needs from it.
pub struct Frame {
    pub rays: Vec<Ray>,
    pub items: Vec<DrawItem>,
    pub stats: FrameStats,
}

/// Runs the per-frame pipeline without painting anything. Sprite caches and
/// animations are updated as a side effect.
pub fn build_frame<T: TextureProvider>(
    maze: &Maze,
    sprites: &mut [Sprite],
    view: &Viewpoint,
    proj: &Projection,
    textures: &T,
) -> Frame {
    let rays = cast_rays(maze, view, proj);
    let walls = rasterize_walls(&rays, textures, proj);
    let views = locate_all(sprites, view, proj);
    let visible_sprites = views.iter().filter(|v| v.is_visible()).count();
    let items = compose(walls, &views);

    let centre = proj.center_ray.clamp(0, proj.num_rays as i32 - 1) as usize;
    let wall_shot = rays
        .get(centre)
        .map(|r| Shot { depth: r.depth, projected_height: r.projected_height })
        .unwrap_or(Shot { depth: proj.max_depth, projected_height: 0.0 });
    let sprite_shot = sprites
        .iter()
        .filter(|s| s.is_targeted(proj.center_ray, proj.scale))
        .map(|s| Shot { depth: s.cache.distance, projected_height: s.cache.projected_height as f32 })
        .min_by(|a, b| a.depth.total_cmp(&b.depth));

    trace!(visible_sprites, draw_items = items.len(), "frame built");
    Frame {
        rays,
        stats: FrameStats { visible_sprites, draw_items: items.len(), wall_shot, sprite_shot },
        items,
    }
}

/// Sky scrolled with the facing angle over the upper half, flat floor below.
pub fn paint_background<T: TextureProvider>(fb: &mut Framebuffer, textures: &T, angle: f32, proj: &Projection) {
    let w = fb.width;
    let half = (proj.half_height.max(0) as u32).min(fb.height);
    let (sky_w, sky_h) = textures.size(TextureKey::Sky);
    let offset = (-SKY_SCROLL * angle.to_degrees()).rem_euclid(w as f32) as u32;
    if half > 0 {
        for y in 0..half {
            let ty = y * sky_h / half;
            for x in 0..w {
                let local = (x + w - offset) % w;
                let tx = local * sky_w / w;
                fb.set_pixel_color(x, y, textures.sample(TextureKey::Sky, tx, ty));
            }
        }
    }
    fb.fill_rows(half, fb.height, FLOOR);
}

/// Scales `item`'s source rectangle onto its destination, clipped to the
/// buffer, skipping transparent pixels.
pub fn draw_item<T: TextureProvider>(fb: &mut Framebuffer, textures: &T, item: &DrawItem) {
    let dest = item.dest;
    if dest.w <= 0 || dest.h <= 0 {
        return;
    }
    let src = item.src.unwrap_or_else(|| {
        let (w, h) = textures.size(item.texture);
        Rect::new(0, 0, w as i32, h as i32)
    });
    let x0 = dest.x.max(0);
    let x1 = (dest.x + dest.w).min(fb.width as i32);
    let y0 = dest.y.max(0);
    let y1 = (dest.y + dest.h).min(fb.height as i32);
    for x in x0..x1 {
        let sx = src.x + ((x - dest.x) as i64 * src.w as i64 / dest.w as i64) as i32;
        for y in y0..y1 {
            let sy = src.y + ((y - dest.y) as i64 * src.h as i64 / dest.h as i64) as i32;
            let c = textures.sample(item.texture, sx.max(0) as u32, sy.max(0) as u32);
            if c.a < ALPHA_CUTOFF {
                continue;
            }
            fb.set_pixel_color(x as u32, y as u32, c);
        }
    }
}

/// Paints a complete frame into `fb` and reports its stats.
pub fn render_frame<T: TextureProvider>(
    fb: &mut Framebuffer,
    maze: &Maze,
    sprites: &mut [Sprite],
    view: &Viewpoint,
    proj: &Projection,
    textures: &T,
) -> FrameStats {
    let view = view.normalized();
    paint_background(fb, textures, view.angle, proj);
    let frame = build_frame(maze, sprites, &view, proj, textures);
    for item in &frame.items {
        draw_item(fb, textures, item);
    }
    frame.stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::core::sprite::SpriteKind;
    use crate::render::textures::TextureManager;

    fn small_settings() -> Settings {
        Settings { width: 120, height: 80, num_rays: 30, fake_rays: 10, ..Settings::default() }
    }

    fn room() -> Maze {
        Maze::parse("1 1 1 1 1\n1 _ _ _ 1\n1 _ _ _ 1\n1 _ _ _ 1\n1 1 1 1 1\n", 100.0).unwrap()
    }

    #[test]
    fn frame_has_one_item_per_ray_plus_visible_sprites() {
        let p = small_settings().projection();
        let tm = TextureManager::procedural();
        let mut sprites = vec![
            Sprite::new(SpriteKind::Pin, 350.0, 250.0),
            Sprite::new(SpriteKind::Pin, 120.0, 250.0),
        ];
        let frame = build_frame(&room(), &mut sprites, &Viewpoint::new(200.0, 250.0, 0.0), &p, &tm);
        assert_eq!(frame.stats.visible_sprites, 1);
        assert_eq!(frame.items.len(), p.num_rays + 1);
        for pair in frame.items.windows(2) {
            assert!(pair[0].depth >= pair[1].depth);
        }
        assert!((frame.stats.wall_shot.depth - 200.0).abs() < 1.0);
    }

    #[test]
    fn targeted_sprite_is_nearer_than_wall() {
        let p = small_settings().projection();
        let tm = TextureManager::procedural();
        let mut sprites = vec![Sprite::new(SpriteKind::Barrel, 350.0, 250.0)];
        let stats = build_frame(&room(), &mut sprites, &Viewpoint::new(200.0, 250.0, 0.0), &p, &tm).stats;
        let hit = stats.sprite_shot.expect("barrel on the centre ray");
        assert!(hit.depth < stats.wall_shot.depth);
        assert_eq!(stats.impact(), hit);
    }

    #[test]
    fn background_splits_sky_and_floor() {
        let p = small_settings().projection();
        let tm = TextureManager::procedural();
        let mut fb = Framebuffer::new(120, 80);
        paint_background(&mut fb, &tm, 0.0, &p);
        assert_eq!(fb.get_pixel(5, 79), FLOOR);
        assert_eq!(fb.get_pixel(5, 40), FLOOR);
        assert_eq!(fb.get_pixel(0, 0), tm.sample(TextureKey::Sky, 0, 0));
    }

    #[test]
    fn blit_clips_and_skips_transparent_pixels() {
        let tm = TextureManager::procedural();
        let mut fb = Framebuffer::new(40, 40);
        fb.set_background_color(Color::BLUE);
        fb.clear();
        let frame = crate::core::sprite::FrameRef {
            kind: SpriteKind::Devil,
            set: crate::core::sprite::FrameSet::Base,
            index: 0,
        };
        let item = DrawItem { depth: 1.0, texture: TextureKey::Sprite(frame), src: None, dest: Rect::new(-20, -20, 64, 64) };
        draw_item(&mut fb, &tm, &item);
        // top-left of the sprite image is transparent
        assert_eq!(fb.get_pixel(0, 0), Color::BLUE);
        // body centre (32, 38) in image space lands at (12, 18)
        assert_ne!(fb.get_pixel(12, 18), Color::BLUE);
    }

    #[test]
    fn render_frame_paints_every_column() {
        let s = small_settings();
        let p = s.projection();
        let tm = TextureManager::procedural();
        let mut fb = Framebuffer::new(s.width, s.height);
        fb.set_background_color(Color::new(1, 2, 3, 255));
        fb.clear();
        let mut sprites = Vec::new();
        let stats = render_frame(&mut fb, &room(), &mut sprites, &Viewpoint::new(250.0, 250.0, 1.0), &p, &tm);
        assert_eq!(stats.draw_items, p.num_rays);
        assert!(fb.color_buffer.iter().all(|c| *c != Color::new(1, 2, 3, 255)));
    }
}
