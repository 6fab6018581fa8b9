//! Texture manager: CPU pixmaps keyed by wall material, sky, or sprite frame,
//! with procedural fallbacks when an asset file is missing.
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use raylib::prelude::*;
use tracing::{debug, warn};

use crate::core::maze::MaterialId;
use crate::core::sprite::{FrameRef, FrameSet, SpriteKind};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TextureKey {
    Wall(MaterialId),
    Sky,
    Sprite(FrameRef),
}

/// What the rasterizer and the blitter need from an image store.
pub trait TextureProvider {
    /// Native (width, height). Unknown keys report the default wall's size.
    fn size(&self, key: TextureKey) -> (u32, u32);
    /// Pixel at (x, y), wrapped into the image. Unknown keys sample the
    /// default wall.
    fn sample(&self, key: TextureKey, x: u32, y: u32) -> Color;
}

/// Immutable pixmap sampled per pixel.
#[derive(Clone)]
pub struct Pixmap {
    w: u32,
    h: u32,
    px: Vec<Color>,
}

impl Pixmap {
    pub fn new(w: u32, h: u32, px: Vec<Color>) -> Self {
        debug_assert_eq!(px.len(), (w * h) as usize);
        Self { w, h, px }
    }

    #[inline]
    fn sample(&self, x: u32, y: u32) -> Color {
        let xi = (x % self.w) as usize;
        let yi = (y % self.h) as usize;
        self.px[(yi * self.w as usize) + xi]
    }
}

pub struct TextureManager {
    maps: HashMap<TextureKey, Pixmap>,
    default_wall: Pixmap,
}

const WALL_SIZE: u32 = 256;
const SPRITE_SIZE: u32 = 64;

impl TextureManager {
    /// Procedural textures only; no files touched.
    pub fn procedural() -> Self {
        let mut tm = Self { maps: HashMap::new(), default_wall: Self::wall_fallback(MaterialId::BOUNDARY) };
        tm.fill_fallbacks();
        tm
    }

    /// Loads textures below `assets_dir`:
    /// `images/wall{N}.png`, `images/sky.png` and
    /// `sprites/<kind>/<set>/<index>.png`. Whatever is missing is generated.
    pub fn load(assets_dir: &Path) -> Self {
        let mut tm = Self { maps: HashMap::new(), default_wall: Self::wall_fallback(MaterialId::BOUNDARY) };
        let mut missing = 0usize;
        for (key, path) in Self::asset_paths(assets_dir) {
            match Image::load_image(&path.to_string_lossy()) {
                Ok(img) => {
                    let w = img.width().max(1) as u32;
                    let h = img.height().max(1) as u32;
                    let data = img.get_image_data().to_vec();
                    tm.maps.insert(key, Pixmap::new(w, h, data));
                }
                Err(_) => {
                    debug!(path = %path.display(), "texture not found");
                    missing += 1;
                }
            }
        }
        if missing > 0 {
            warn!(missing, dir = %assets_dir.display(), "textures missing, using generated fallbacks");
        }
        if let Some(wall) = tm.maps.get(&TextureKey::Wall(MaterialId::BOUNDARY)) {
            tm.default_wall = wall.clone();
        }
        tm.fill_fallbacks();
        tm
    }

    fn asset_paths(dir: &Path) -> Vec<(TextureKey, PathBuf)> {
        let mut out = Vec::new();
        for m in MaterialId::ALL {
            out.push((TextureKey::Wall(m), dir.join("images").join(format!("wall{}.png", m.0))));
        }
        out.push((TextureKey::Sky, dir.join("images").join("sky.png")));
        for kind in SpriteKind::ALL {
            let name = kind.config().name;
            for set in [FrameSet::Base, FrameSet::Idle, FrameSet::Death, FrameSet::Action] {
                for index in 0..kind.frame_count(set) {
                    let path = dir.join("sprites").join(name).join(set.dir_name()).join(format!("{index}.png"));
                    out.push((TextureKey::Sprite(FrameRef { kind, set, index }), path));
                }
            }
        }
        out
    }

    fn fill_fallbacks(&mut self) {
        for m in MaterialId::ALL {
            self.maps.entry(TextureKey::Wall(m)).or_insert_with(|| Self::wall_fallback(m));
        }
        self.maps.entry(TextureKey::Sky).or_insert_with(Self::sky_fallback);
        for kind in SpriteKind::ALL {
            for set in [FrameSet::Base, FrameSet::Idle, FrameSet::Death, FrameSet::Action] {
                for index in 0..kind.frame_count(set) {
                    let frame = FrameRef { kind, set, index };
                    self.maps
                        .entry(TextureKey::Sprite(frame))
                        .or_insert_with(|| Self::sprite_fallback(frame));
                }
            }
        }
    }

    #[inline]
    fn resolve(&self, key: TextureKey) -> &Pixmap {
        self.maps.get(&key).unwrap_or(&self.default_wall)
    }

    pub fn contains(&self, key: TextureKey) -> bool {
        self.maps.contains_key(&key)
    }

    fn material_color(m: MaterialId) -> Color {
        match m.0 {
            '1' => Color::new(120, 40, 40, 255),
            '2' => Color::new(60, 90, 140, 255),
            '3' => Color::new(70, 120, 60, 255),
            '4' => Color::new(130, 110, 60, 255),
            c => {
                let k = c as u32;
                Color::new(((k * 97) % 200 + 40) as u8, ((k * 57) % 200 + 40) as u8, ((k * 31) % 200 + 40) as u8, 255)
            }
        }
    }

    /// Brick pattern tinted by material.
    fn wall_fallback(m: MaterialId) -> Pixmap {
        let (w, h) = (WALL_SIZE, WALL_SIZE);
        let base = Self::material_color(m);
        let mortar = Self::mix(base, Color::BLACK, 140);
        let brick_h = h / 8;
        let brick_w = w / 4;
        let mut px = vec![base; (w * h) as usize];
        for y in 0..h {
            let row = y / brick_h;
            let shift = if row % 2 == 0 { 0 } else { brick_w / 2 };
            for x in 0..w {
                let i = (y * w + x) as usize;
                if y % brick_h < 3 || (x + shift) % brick_w < 3 {
                    px[i] = mortar;
                } else if ((x / 8) + (y / 8)) % 2 == 0 {
                    px[i] = Self::mix(base, Color::WHITE, 16);
                }
            }
        }
        Pixmap::new(w, h, px)
    }

    /// Night gradient, wide enough to scroll across the screen.
    fn sky_fallback() -> Pixmap {
        let (w, h) = (512u32, 128u32);
        let top = Color::new(12, 16, 26, 255);
        let bottom = Color::new(60, 40, 70, 255);
        let mut px = vec![Color::BLACK; (w * h) as usize];
        for y in 0..h {
            let t = (y * 255 / (h - 1)) as u8;
            let col = Self::mix(top, bottom, t);
            for x in 0..w {
                px[(y * w + x) as usize] = col;
            }
        }
        Pixmap::new(w, h, px)
    }

    /// Flat ellipse body, colour by kind and darkened/reddened by frame set;
    /// the frame index slightly shifts the body so animations visibly move.
    fn sprite_fallback(frame: FrameRef) -> Pixmap {
        let (w, h) = (SPRITE_SIZE, SPRITE_SIZE);
        let body = match frame.kind {
            SpriteKind::Barrel => Color::new(90, 120, 70, 255),
            SpriteKind::Pin => Color::new(200, 200, 210, 255),
            SpriteKind::Flame => Color::new(255, 150, 40, 255),
            SpriteKind::Devil => Color::new(200, 60, 60, 255),
            SpriteKind::Soldier => Color::new(110, 110, 60, 255),
        };
        let body = match frame.set {
            FrameSet::Base | FrameSet::Idle => body,
            FrameSet::Death => Self::mix(body, Color::BLACK, 120),
            FrameSet::Action => Self::additive(body, Color::new(60, 0, 0, 0)),
        };
        let mut px = vec![Color::new(0, 0, 0, 0); (w * h) as usize];
        let wobble = (frame.index % 4) as f32 - 1.5;
        let cx = w as f32 * 0.5 + wobble;
        let cy = h as f32 * 0.6;
        let rx = w as f32 * 0.23;
        let ry = h as f32 * 0.35;
        for y in 0..h {
            for x in 0..w {
                let nx = (x as f32 - cx) / rx;
                let ny = (y as f32 - cy) / ry;
                if nx * nx + ny * ny <= 1.0 {
                    px[(y * w + x) as usize] = body;
                }
            }
        }
        Pixmap::new(w, h, px)
    }

    #[inline]
    fn mix(a: Color, b: Color, t: u8) -> Color {
        let ta = t as u16;
        let na = 255u16 - ta;
        let mixc = |x: u8, y: u8| -> u8 { (((x as u16) * na + (y as u16) * ta) / 255) as u8 };
        Color::new(mixc(a.r, b.r), mixc(a.g, b.g), mixc(a.b, b.b), mixc(a.a, b.a))
    }

    #[inline]
    fn additive(a: Color, b: Color) -> Color {
        let add = |x: u8, y: u8| -> u8 { x.saturating_add(y) };
        Color::new(add(a.r, b.r), add(a.g, b.g), add(a.b, b.b), add(a.a, b.a))
    }
}

impl TextureProvider for TextureManager {
    fn size(&self, key: TextureKey) -> (u32, u32) {
        let p = self.resolve(key);
        (p.w, p.h)
    }

    fn sample(&self, key: TextureKey, x: u32, y: u32) -> Color {
        self.resolve(key).sample(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn procedural_manager_covers_every_known_key() {
        let tm = TextureManager::procedural();
        for m in MaterialId::ALL {
            assert!(tm.contains(TextureKey::Wall(m)));
        }
        assert!(tm.contains(TextureKey::Sky));
        let frame = FrameRef { kind: SpriteKind::Soldier, set: FrameSet::Death, index: 9 };
        assert!(tm.contains(TextureKey::Sprite(frame)));
    }

    #[test]
    fn unknown_keys_fall_back_to_default_wall() {
        let tm = TextureManager::procedural();
        let unknown = TextureKey::Wall(MaterialId('z'));
        assert_eq!(tm.size(unknown), tm.size(TextureKey::Wall(MaterialId::BOUNDARY)));
        assert_eq!(tm.sample(unknown, 10, 10), tm.sample(TextureKey::Wall(MaterialId::BOUNDARY), 10, 10));
        let past_end = TextureKey::Sprite(FrameRef { kind: SpriteKind::Pin, set: FrameSet::Idle, index: 99 });
        assert_eq!(tm.size(past_end), (WALL_SIZE, WALL_SIZE));
    }

    #[test]
    fn sampling_wraps() {
        let tm = TextureManager::procedural();
        let key = TextureKey::Wall(MaterialId('2'));
        assert_eq!(tm.sample(key, 5, 7), tm.sample(key, 5 + WALL_SIZE, 7 + 2 * WALL_SIZE));
    }

    #[test]
    fn sprite_fallback_has_transparent_corners() {
        let tm = TextureManager::procedural();
        let key = TextureKey::Sprite(FrameRef { kind: SpriteKind::Devil, set: FrameSet::Base, index: 0 });
        assert_eq!(tm.sample(key, 0, 0).a, 0);
        assert_eq!(tm.sample(key, 32, 38).a, 255);
    }
}
