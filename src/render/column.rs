//! Column rasterizer: one ray becomes one textured vertical strip.
use crate::config::Projection;
use crate::render::casters::Ray;
use crate::render::compositor::{DrawItem, Rect};
use crate::render::textures::{TextureKey, TextureProvider};

/// Maps `ray` onto a `scale`-wide strip centred on the screen midline.
///
/// The source column sits at the ray's face offset scaled to texture width.
/// Strips taller than the screen crop the texture vertically around its
/// centre first, so only the visible part is scaled.
pub fn rasterize_column(ray: &Ray, tex_w: u32, tex_h: u32, proj: &Projection) -> DrawItem {
    let tex_w = tex_w.max(1) as i32;
    let tex_h = tex_h.max(1) as i32;
    let texture_scale = ((tex_w as f32 / proj.tile) as i32).max(1);
    let src_x = ((ray.offset as f32 * tex_w as f32 / proj.tile) as i32).clamp(0, (tex_w - texture_scale).max(0));
    let height = (ray.projected_height as i32).max(1);
    let x = ray.index as i32 * proj.scale;

    let (src, dest) = if height > proj.height {
        let coeff = height as f32 / proj.height as f32;
        let visible = ((tex_h as f32 / coeff) as i32).clamp(1, tex_h);
        (
            Rect::new(src_x, tex_h / 2 - visible / 2, texture_scale, visible),
            Rect::new(x, 0, proj.scale, proj.height),
        )
    } else {
        (
            Rect::new(src_x, 0, texture_scale, tex_h),
            Rect::new(x, proj.half_height - height / 2, proj.scale, height),
        )
    };
    DrawItem { depth: ray.depth, texture: TextureKey::Wall(ray.material), src: Some(src), dest }
}

/// One strip per ray, in ray order.
pub fn rasterize_walls<T: TextureProvider>(rays: &[Ray], textures: &T, proj: &Projection) -> Vec<DrawItem> {
    rays.iter()
        .map(|ray| {
            let (w, h) = textures.size(TextureKey::Wall(ray.material));
            rasterize_column(ray, w, h, proj)
        })
        .collect()
}
