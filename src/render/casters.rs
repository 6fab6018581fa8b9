//! Ray casting against the tile grid.
//!
//! Each ray does two independent walks, one across vertical grid lines and
//! one across horizontal ones, stepping a whole tile at a time. The nearer
//! walk wins; on an exact tie the vertical walk is kept.
use crate::config::Projection;
use crate::core::maze::{Maze, MaterialId};
use crate::core::player::Viewpoint;

/// Smallest |sin| / |cos| used for stepping, so axis-parallel rays stay finite.
const AXIS_EPSILON: f32 = 1e-6;

/// Nearest wall along one ray, before fisheye correction.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Intersect {
    pub distance: f32,
    pub impact: MaterialId,
    /// Position along the wall face, in [0, tile).
    pub offset: i32,
    pub hit: bool,
}

/// One screen column's worth of ray data.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ray {
    pub index: usize,
    pub angle: f32,
    pub raw_depth: f32,
    /// Fisheye-corrected, floored at the depth epsilon.
    pub depth: f32,
    pub offset: i32,
    pub material: MaterialId,
    pub hit: bool,
    pub projected_height: f32,
}

#[inline]
fn away_from_zero(v: f32) -> f32 {
    if v.abs() < AXIS_EPSILON { AXIS_EPSILON.copysign(v) } else { v }
}

/// Walk across vertical grid lines. Returns (depth, y at the hit, material).
fn walk_vertical(maze: &Maze, ox: f32, oy: f32, sin_a: f32, cos_a: f32) -> WalkHit {
    let tile = maze.tile();
    let xm = (ox / tile).floor() * tile;
    let (mut x, dx) = if cos_a >= 0.0 { (xm + tile, 1.0) } else { (xm, -1.0) };
    for _ in 0..=maze.cols() {
        let depth = (x - ox) / cos_a;
        let y = oy + depth * sin_a;
        let (col, row) = maze.cell_of(x + dx, y);
        if let Some(m) = maze.get(col, row) {
            return Some((depth, y, m));
        }
        if (dx > 0.0 && col >= maze.cols() as i32) || (dx < 0.0 && col < 0) {
            break;
        }
        x += dx * tile;
    }
    None
}

/// Walk across horizontal grid lines. Returns (depth, x at the hit, material).
fn walk_horizontal(maze: &Maze, ox: f32, oy: f32, sin_a: f32, cos_a: f32) -> WalkHit {
    let tile = maze.tile();
    let ym = (oy / tile).floor() * tile;
    let (mut y, dy) = if sin_a >= 0.0 { (ym + tile, 1.0) } else { (ym, -1.0) };
    for _ in 0..=maze.rows() {
        let depth = (y - oy) / sin_a;
        let x = ox + depth * cos_a;
        let (col, row) = maze.cell_of(x, y + dy);
        if let Some(m) = maze.get(col, row) {
            return Some((depth, x, m));
        }
        if (dy > 0.0 && row >= maze.rows() as i32) || (dy < 0.0 && row < 0) {
            break;
        }
        y += dy * tile;
    }
    None
}

type WalkHit = Option<(f32, f32, MaterialId)>;

/// Picks the nearer walk; equal depths keep the vertical one.
#[inline]
fn nearer(vertical: WalkHit, horizontal: WalkHit) -> WalkHit {
    match (vertical, horizontal) {
        (Some(v), Some(h)) => if v.0 <= h.0 { Some(v) } else { Some(h) },
        (v, h) => v.or(h),
    }
}

#[inline]
fn face_offset(along: f32, tile: f32) -> i32 {
    let max = (tile.ceil() as i32 - 1).max(0);
    (along.rem_euclid(tile) as i32).clamp(0, max)
}

/// Casts one ray from (ox, oy) at `angle`. Misses report `max_depth` and the
/// boundary material.
pub fn cast_ray(maze: &Maze, ox: f32, oy: f32, angle: f32, max_depth: f32) -> Intersect {
    let (sin_a, cos_a) = angle.sin_cos();
    let (sin_a, cos_a) = (away_from_zero(sin_a), away_from_zero(cos_a));
    let vertical = walk_vertical(maze, ox, oy, sin_a, cos_a);
    let horizontal = walk_horizontal(maze, ox, oy, sin_a, cos_a);

    match nearer(vertical, horizontal) {
        Some((distance, along, impact)) => Intersect {
            distance,
            impact,
            offset: face_offset(along, maze.tile()),
            hit: true,
        },
        None => Intersect { distance: max_depth, impact: MaterialId::BOUNDARY, offset: 0, hit: false },
    }
}

/// Casts `proj.num_rays` rays spanning [angle - fov/2, angle + fov/2).
pub fn cast_rays(maze: &Maze, view: &Viewpoint, proj: &Projection) -> Vec<Ray> {
    let view = view.normalized();
    (0..proj.num_rays)
        .map(|index| {
            let angle = proj.ray_angle(view.angle, index);
            let hit = cast_ray(maze, view.x, view.y, angle, proj.max_depth);
            let depth = if hit.hit {
                (hit.distance * (view.angle - angle).cos()).max(proj.depth_epsilon)
            } else {
                proj.max_depth
            };
            Ray {
                index,
                angle,
                raw_depth: hit.distance,
                depth,
                offset: hit.offset,
                material: hit.impact,
                hit: hit.hit,
                projected_height: proj.projected_height(depth),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use std::f32::consts::{FRAC_PI_2, PI};

    fn boxed(n: usize) -> Maze {
        let rows = (0..n)
            .map(|r| {
                (0..n)
                    .map(|c| if r == 0 || c == 0 || r == n - 1 || c == n - 1 { Some(MaterialId('2')) } else { None })
                    .collect()
            })
            .collect();
        Maze::from_rows(rows, 100.0)
    }

    #[test]
    fn axis_rays_hit_the_box_faces() {
        let m = boxed(5);
        let east = cast_ray(&m, 250.0, 250.0, 0.0, 800.0);
        assert!(east.hit);
        assert!((east.distance - 150.0).abs() < 1e-3);
        assert_eq!(east.offset, 50);
        let north = cast_ray(&m, 250.0, 250.0, -FRAC_PI_2, 800.0);
        assert!((north.distance - 150.0).abs() < 1e-2);
        let west = cast_ray(&m, 230.0, 250.0, PI, 800.0);
        assert!((west.distance - 130.0).abs() < 1e-2);
    }

    #[test]
    fn diagonal_ray_offset_within_tile() {
        let m = boxed(6);
        let hit = cast_ray(&m, 210.0, 330.0, 0.7, 800.0);
        assert!(hit.hit);
        assert!((0..100).contains(&hit.offset));
    }

    #[test]
    fn empty_grid_reports_misses_at_max_depth() {
        let m = Maze::empty(100.0);
        let p = Settings::default().projection();
        let rays = cast_rays(&m, &Viewpoint::new(50.0, 50.0, 1.0), &p);
        assert_eq!(rays.len(), p.num_rays);
        for r in rays {
            assert!(!r.hit);
            assert_eq!(r.depth, p.max_depth);
            assert_eq!(r.material, MaterialId::BOUNDARY);
        }
    }

    #[test]
    fn centre_ray_is_uncorrected() {
        let m = boxed(7);
        let p = Settings::default().projection();
        let rays = cast_rays(&m, &Viewpoint::new(350.0, 350.0, 0.0), &p);
        let c = &rays[p.num_rays / 2];
        assert!((c.angle).abs() < 1e-6);
        assert!((c.depth - c.raw_depth).abs() < 1e-3);
        for r in &rays {
            assert!(r.depth <= r.raw_depth + 1e-3);
        }
    }

    #[test]
    fn tie_prefers_vertical_walk() {
        let v = Some((120.0, 10.0, MaterialId('2')));
        let h = Some((120.0, 70.0, MaterialId('3')));
        assert_eq!(nearer(v, h), v);
        let closer_h = Some((119.0, 70.0, MaterialId('3')));
        assert_eq!(nearer(v, closer_h), closer_h);
        assert_eq!(nearer(None, h), h);
        assert_eq!(nearer(None, None), None);
    }
}
