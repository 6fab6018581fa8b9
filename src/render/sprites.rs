//! Sprite projector: places billboard sprites in screen space and picks the
//! frame each one shows.
//!
//! `project_sprite` is pure. `locate` is the per-frame entry point: it
//! projects, stores the result in the sprite's cache and, when visible,
//! advances the sprite's animation by one tick.
use std::f32::consts::{PI, TAU};

use crate::config::Projection;
use crate::core::player::{Viewpoint, normalize_angle};
use crate::core::sprite::{ActiveAnimation, FrameRef, FrameSet, ProjectionCache, Sprite, ViewBuckets, bucket_frame};
use crate::render::compositor::{DrawItem, Rect};
use crate::render::textures::TextureKey;

/// Vertical compression applied to a collapsed (dead) sprite.
const DEATH_COMPRESSION: f32 = 1.3;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SpriteProjection {
    /// Fisheye-corrected distance.
    pub distance: f32,
    pub ray_index: i32,
    pub frame: FrameRef,
    pub rect: Rect,
    pub projected_height: i32,
    pub width: i32,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum SpriteView {
    /// Off screen (outside the fake-ray margin) or closer than the clip distance.
    Hidden { distance: f32, ray_index: i32 },
    Visible(SpriteProjection),
}

impl SpriteView {
    pub fn is_visible(&self) -> bool {
        matches!(self, SpriteView::Visible(_))
    }

    pub fn draw_item(&self) -> Option<DrawItem> {
        match self {
            SpriteView::Hidden { .. } => None,
            SpriteView::Visible(p) => Some(DrawItem {
                depth: p.distance,
                texture: TextureKey::Sprite(p.frame),
                src: None,
                dest: p.rect,
            }),
        }
    }

    fn cache(&self) -> ProjectionCache {
        match *self {
            SpriteView::Hidden { distance, ray_index } => ProjectionCache {
                distance,
                ray_index,
                projected_height: 0,
                width: 0,
                visible: false,
            },
            SpriteView::Visible(p) => ProjectionCache {
                distance: p.distance,
                ray_index: p.ray_index,
                projected_height: p.projected_height,
                width: p.width,
                visible: true,
            },
        }
    }
}

/// Bearing from the viewer to (dx, dy) relative to `facing`, with the
/// quadrant-dependent wrap applied. `facing` must already lie in [0, 2pi).
///
/// The wrap adds a full turn when the sprite is to the right (dx > 0) and the
/// viewer faces the upper half-plane [pi, 2pi], or when the sprite lies in the
/// (-x, -y) quadrant. Algebraically simpler forms disagree with it at the
/// 0/180/360 degree seams.
pub fn angular_offset(dx: f32, dy: f32, facing: f32) -> f32 {
    let theta = dy.atan2(dx);
    let mut gamma = theta - facing;
    if (dx > 0.0 && (PI..=TAU).contains(&facing)) || (dx < 0.0 && dy < 0.0) {
        gamma += TAU;
    }
    gamma
}

/// Ray index of a bearing offset; floor keeps negative offsets on the left.
pub fn ray_index_for(gamma: f32, proj: &Projection) -> i32 {
    proj.center_ray + (gamma / proj.delta_angle).floor() as i32
}

fn in_ray_range(ray_index: i32, proj: &Projection) -> bool {
    (-proj.fake_rays..=proj.num_rays as i32 - 1 + proj.fake_rays).contains(&ray_index)
}

/// Degree key for billboard selection: the bearing from the sprite back to
/// the viewer, truncated to whole degrees and mirrored as `360 - deg`.
pub fn view_degree(sprite: &Sprite, view: &Viewpoint) -> u32 {
    let bearing = normalize_angle((view.y - sprite.y).atan2(view.x - sprite.x));
    let deg = (bearing.to_degrees() as u32).min(359);
    (360 - deg) % 360
}

/// Base frame facing the viewer for sprites with angular buckets.
pub fn view_frame(sprite: &Sprite, view: &Viewpoint) -> usize {
    let c = sprite.config();
    if c.view_buckets < 2 {
        return 0;
    }
    let buckets = ViewBuckets::uniform(c.view_buckets);
    let bucket = buckets.select(view_degree(sprite, view)).unwrap_or(0);
    bucket_frame(bucket, c.base_frames, buckets.len())
}

/// Frame the sprite shows at `distance`, by animation priority.
pub fn select_frame(sprite: &Sprite, view: &Viewpoint, distance: f32) -> FrameRef {
    let kind = sprite.kind;
    let c = sprite.config();
    let (set, index) = match sprite.active_animation(distance) {
        ActiveAnimation::Death => (FrameSet::Death, sprite.death_anim.frame.min(c.death_frames - 1)),
        ActiveAnimation::Action => (FrameSet::Action, sprite.action_anim.frame % c.action_frames),
        ActiveAnimation::Idle => (FrameSet::Idle, sprite.idle.frame % c.idle_frames),
        ActiveAnimation::Static => (FrameSet::Base, view_frame(sprite, view)),
    };
    FrameRef { kind, set, index }
}

/// Projects one sprite without touching its state.
pub fn project_sprite(sprite: &Sprite, view: &Viewpoint, proj: &Projection) -> SpriteView {
    let view = view.normalized();
    let dx = sprite.x - view.x;
    let dy = sprite.y - view.y;
    let raw_distance = dx.hypot(dy);
    let ray_index = ray_index_for(angular_offset(dx, dy, view.angle), proj);
    let distance = (raw_distance * (proj.half_fov - ray_index as f32 * proj.delta_angle).cos())
        .max(proj.depth_epsilon);

    if !in_ray_range(ray_index, proj) || raw_distance < proj.sprite_clip_distance {
        return SpriteView::Hidden { distance, ray_index };
    }

    let c = sprite.config();
    let projected_height = (proj.projection_coeff / distance).min(proj.max_sprite_height);
    let width = (projected_height * c.scale.0).min(proj.max_sprite_height);
    // placement is anchored on the scaled height before any death compression
    let scaled_height = (projected_height * c.scale.1).min(proj.max_sprite_height);
    let half_scaled = scaled_height / 2.0;
    let (height, shift) = if sprite.shows_death() {
        (scaled_height / DEATH_COMPRESSION, half_scaled * c.dead_shift)
    } else {
        (scaled_height, half_scaled * c.shift)
    };

    let w = width as i32;
    let rect = Rect::new(
        ray_index * proj.scale - w / 2,
        proj.half_height - half_scaled as i32 + shift as i32,
        w,
        height as i32,
    );
    SpriteView::Visible(SpriteProjection {
        distance,
        ray_index,
        frame: select_frame(sprite, &view, distance),
        rect,
        projected_height: projected_height as i32,
        width: w,
    })
}

/// Projects, caches the outputs for targeting, and advances the animation
/// of visible sprites.
pub fn locate(sprite: &mut Sprite, view: &Viewpoint, proj: &Projection) -> SpriteView {
    let result = project_sprite(sprite, view, proj);
    let cache = result.cache();
    debug_assert!(cache.distance.is_finite(), "sprite distance must stay finite");
    debug_assert!(cache.width >= 0 && cache.projected_height >= 0);
    sprite.cache = cache;
    if let SpriteView::Visible(p) = &result {
        sprite.advance_animation(p.distance);
    }
    result
}

/// Locates every sprite in order.
pub fn locate_all(sprites: &mut [Sprite], view: &Viewpoint, proj: &Projection) -> Vec<SpriteView> {
    sprites.iter_mut().map(|s| locate(s, view, proj)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::core::sprite::SpriteKind;
    use pretty_assertions::assert_eq;
    use std::f32::consts::FRAC_PI_2;

    fn proj() -> Projection {
        Settings::default().projection()
    }

    #[test]
    fn sprite_straight_ahead_sits_on_centre_ray() {
        let p = proj();
        let s = Sprite::new(SpriteKind::Pin, 500.0, 200.0);
        let view = Viewpoint::new(200.0, 200.0, 0.0);
        let SpriteView::Visible(v) = project_sprite(&s, &view, &p) else {
            panic!("expected visible");
        };
        assert_eq!(v.ray_index, p.center_ray);
        assert!((v.distance - 300.0 * p.delta_angle.cos()).abs() < 1e-2);
        assert_eq!(v.frame, FrameRef { kind: SpriteKind::Pin, set: FrameSet::Idle, index: 0 });
        assert_eq!(v.rect.x, p.center_ray * p.scale - v.width / 2);
    }

    #[test]
    fn wrap_rule_at_quadrant_seams() {
        // facing 0, sprite dead ahead: no wrap
        assert!((angular_offset(1.0, 0.0, 0.0)).abs() < 1e-6);
        // facing 270 degrees, sprite at -90 degrees bearing: wrap brings it to 0
        let g = angular_offset(1.0, -1e4, 1.5 * PI);
        assert!((g - (-FRAC_PI_2 + TAU - 1.5 * PI)).abs() < 1e-3);
        // facing exactly 2pi counts as the upper half-plane
        assert!((angular_offset(1.0, 0.0, TAU) - 0.0).abs() < 1e-5);
        // sprite behind-left in (-x, -y): full turn added
        let g = angular_offset(-1.0, -1.0, PI);
        assert!((g - (-0.75 * PI - PI + TAU)).abs() < 1e-5);
        // facing 180 degrees, sprite straight behind along -x with dy = 0
        assert!((angular_offset(-1.0, 0.0, PI)).abs() < 1e-5);
    }

    #[test]
    fn facing_west_sees_sprite_to_the_west() {
        let p = proj();
        let s = Sprite::new(SpriteKind::Pin, 100.0, 300.0);
        let view = Viewpoint::new(400.0, 300.0, PI);
        let v = project_sprite(&s, &view, &p);
        let SpriteView::Visible(v) = v else { panic!("expected visible") };
        assert!((v.ray_index - p.center_ray).abs() <= 1);
    }

    #[test]
    fn sprite_behind_is_hidden() {
        let p = proj();
        let s = Sprite::new(SpriteKind::Pin, 100.0, 300.0);
        let view = Viewpoint::new(400.0, 300.0, 0.0);
        assert!(!project_sprite(&s, &view, &p).is_visible());
    }

    #[test]
    fn too_close_is_hidden() {
        let p = proj();
        let s = Sprite::new(SpriteKind::Pin, 210.0, 200.0);
        let view = Viewpoint::new(200.0, 200.0, 0.0);
        assert!(matches!(project_sprite(&s, &view, &p), SpriteView::Hidden { .. }));
    }

    #[test]
    fn fake_ray_margin_keeps_edge_sprites() {
        let p = proj();
        // just outside the left screen edge but inside the margin
        let gamma = -p.half_fov - 10.0 * p.delta_angle;
        let s = Sprite::new(SpriteKind::Pin, 200.0 + 400.0 * gamma.cos(), 200.0 + 400.0 * gamma.sin());
        let view = Viewpoint::new(200.0, 200.0, 0.0);
        let SpriteView::Visible(v) = project_sprite(&s, &view, &p) else { panic!("expected visible") };
        assert!(v.ray_index < 0);
        assert!(v.ray_index >= -p.fake_rays);
    }

    #[test]
    fn dead_sprite_is_compressed_and_shifted() {
        let p = proj();
        let view = Viewpoint::new(200.0, 200.0, 0.0);
        let mut s = Sprite::new(SpriteKind::Soldier, 600.0, 200.0);
        let SpriteView::Visible(alive) = project_sprite(&s, &view, &p) else { panic!() };
        s.kill();
        let SpriteView::Visible(dead) = project_sprite(&s, &view, &p) else { panic!() };
        assert!(dead.rect.h < alive.rect.h);
        assert!(dead.rect.y > alive.rect.y);
        assert_eq!(dead.frame.set, FrameSet::Death);
    }

    /// Sprite `ahead` units due east of the viewer, on the centre ray.
    fn placed(kind: SpriteKind, ahead: f32, dead: bool) -> SpriteProjection {
        let mut s = Sprite::new(kind, 200.0 + ahead, 200.0);
        if dead {
            s.kill();
        }
        match project_sprite(&s, &Viewpoint::new(200.0, 200.0, 0.0), &proj()) {
            SpriteView::Visible(v) => v,
            hidden => panic!("expected visible, got {hidden:?}"),
        }
    }

    #[test]
    fn barrel_rests_near_the_floor_line() {
        let p = proj();
        let v = placed(SpriteKind::Barrel, 400.0, false);
        let ph = v.projected_height;
        assert!((ph - 194).abs() <= 1, "projected height {ph}");
        // scaled height 78, shifted by 1.8 of its half
        assert!((v.rect.y - 431).abs() <= 2, "top {}", v.rect.y);
        assert!((v.rect.h - 77).abs() <= 1);
        let floor_line = p.half_height + ph / 2;
        assert!(v.rect.y + v.rect.h <= floor_line + ph / 10);
    }

    #[test]
    fn live_sprites_stand_on_the_visible_floor() {
        let p = proj();
        for kind in [SpriteKind::Barrel, SpriteKind::Pin, SpriteKind::Soldier] {
            for ahead in [250.0, 400.0, 900.0] {
                let v = placed(kind, ahead, false);
                let ph = v.projected_height;
                let c = kind.config();
                let half = (ph as f32 * c.scale.1 / 2.0) as i32;
                let expected = p.half_height - half + (half as f32 * c.shift) as i32;
                assert!((v.rect.y - expected).abs() <= 2, "{kind:?} at {ahead}: top {} vs {expected}", v.rect.y);
                assert!(v.rect.y <= p.half_height + ph / 2, "{kind:?} at {ahead} starts below the floor line");
                assert!(v.rect.y + v.rect.h <= p.half_height + ph * 6 / 10, "{kind:?} at {ahead} sinks");
            }
        }
    }

    #[test]
    fn dead_soldier_keeps_its_anchor() {
        let p = proj();
        let alive = placed(SpriteKind::Soldier, 400.0, false);
        let dead = placed(SpriteKind::Soldier, 400.0, true);
        let c = SpriteKind::Soldier.config();
        let half = (alive.projected_height as f32 * c.scale.1 / 2.0) as i32;
        assert!((dead.rect.y - (p.half_height - half + (half as f32 * c.dead_shift) as i32)).abs() <= 2);
        assert!((dead.rect.h as f32 - alive.rect.h as f32 / DEATH_COMPRESSION).abs() <= 1.0);
        assert!(dead.rect.y <= p.half_height + dead.projected_height / 2);
        assert_eq!(dead.rect.x, alive.rect.x);
    }

    #[test]
    fn billboard_frame_follows_viewer_side() {
        let s = Sprite::new(SpriteKind::Devil, 500.0, 500.0);
        // viewer due east of the sprite: bearing 0 degrees
        assert_eq!(view_degree(&s, &Viewpoint::new(900.0, 500.0, PI)), 0);
        assert_eq!(view_frame(&s, &Viewpoint::new(900.0, 500.0, PI)), 0);
        // viewer due south (y grows downward): bearing 90, key 270
        assert!((269..=271).contains(&view_degree(&s, &Viewpoint::new(500.0, 900.0, 0.0))));
        assert_eq!(view_frame(&s, &Viewpoint::new(500.0, 900.0, 0.0)), 6);
        // viewer due west: bearing 180, key 180
        assert_eq!(view_frame(&s, &Viewpoint::new(100.0, 500.0, 0.0)), 4);
    }

    #[test]
    fn locate_caches_and_animates_only_visible() {
        let p = proj();
        let view = Viewpoint::new(200.0, 200.0, 0.0);
        let mut ahead = Sprite::new(SpriteKind::Flame, 500.0, 200.0);
        let before = ahead.idle;
        let v = locate(&mut ahead, &view, &p);
        assert!(ahead.cache.visible);
        assert_eq!(ahead.cache.ray_index, p.center_ray);
        assert!(ahead.cache.width > 0);
        assert_ne!(ahead.idle, before);
        assert!(v.draw_item().is_some());

        let mut behind = Sprite::new(SpriteKind::Flame, 50.0, 200.0);
        let before = behind.idle;
        locate(&mut behind, &view, &p);
        assert!(!behind.cache.visible);
        assert_eq!(behind.idle, before);
    }

    #[test]
    fn projection_is_pure() {
        let p = proj();
        let view = Viewpoint::new(200.0, 200.0, 0.3);
        let s = Sprite::new(SpriteKind::Barrel, 600.0, 400.0);
        assert_eq!(project_sprite(&s, &view, &p), project_sprite(&s, &view, &p));
    }
}
