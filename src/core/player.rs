//! Player data, viewpoint and movement.
use std::f32::consts::TAU;

use crate::config::Settings;
use crate::core::maze::Maze;
use crate::core::sprite::Sprite;

/// Eye position and facing, the only thing the renderer reads from the player.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewpoint {
    pub x: f32,
    pub y: f32,
    pub angle: f32,
}

impl Viewpoint {
    pub fn new(x: f32, y: f32, angle: f32) -> Self {
        Self { x, y, angle }
    }

    /// Same viewpoint with the angle wrapped into [0, 2pi).
    pub fn normalized(self) -> Self {
        Self { angle: normalize_angle(self.angle), ..self }
    }
}

#[inline]
pub fn normalize_angle(a: f32) -> f32 {
    let r = a.rem_euclid(TAU);
    // rem_euclid can round up to TAU itself for tiny negative inputs
    if r >= TAU { 0.0 } else { r }
}

/// Per-tick input, already sampled from the device.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct InputState {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub turn_left: bool,
    pub turn_right: bool,
    /// Horizontal mouse movement in pixels since the last tick.
    pub mouse_dx: f32,
    pub fire: bool,
}

/// Ticks a shot takes before the weapon can fire again.
pub const SHOT_TICKS: u32 = 60;

pub struct Player {
    pub x: f32,
    pub y: f32,
    pub angle: f32,
    pub radius: f32,
    speed: f32,
    rotation_speed: f32,
    mouse_sens: f32,
    shot_ticks: u32,
    shot_pending: bool,
}

impl Player {
    pub fn new(x: f32, y: f32, angle: f32) -> Self {
        Self {
            x,
            y,
            angle: normalize_angle(angle),
            radius: 25.0,
            speed: 3.0,
            rotation_speed: 0.03,
            mouse_sens: 0.003,
            shot_ticks: 0,
            shot_pending: false,
        }
    }

    pub fn from_settings(s: &Settings) -> Self {
        Self {
            speed: s.player_speed,
            rotation_speed: s.rotation_speed,
            mouse_sens: s.mouse_sensitivity,
            radius: s.tile * 0.25,
            ..Self::new(s.player_start.0 * s.tile, s.player_start.1 * s.tile, s.player_angle)
        }
    }

    pub fn viewpoint(&self) -> Viewpoint {
        Viewpoint::new(self.x, self.y, self.angle)
    }

    pub fn is_shooting(&self) -> bool {
        self.shot_ticks > 0
    }

    /// True exactly once per shot, on the tick the trigger was pulled.
    pub fn take_shot(&mut self) -> bool {
        std::mem::take(&mut self.shot_pending)
    }

    /// Applies one tick of input. `is_free(x, y, r)` tells whether a circle of
    /// radius `r` centred at (x, y) is clear of walls and blocking sprites.
    pub fn update<F>(&mut self, input: &InputState, is_free: F)
    where
        F: Fn(f32, f32, f32) -> bool,
    {
        let (sin_a, cos_a) = self.angle.sin_cos();
        let mut dx = 0.0;
        let mut dy = 0.0;
        if input.forward { dx += self.speed * cos_a; dy += self.speed * sin_a; }
        if input.backward { dx -= self.speed * cos_a; dy -= self.speed * sin_a; }
        if input.left { dx += self.speed * sin_a; dy -= self.speed * cos_a; }
        if input.right { dx -= self.speed * sin_a; dy += self.speed * cos_a; }

        // axis by axis so the player slides along walls
        if dx != 0.0 && is_free(self.x + dx, self.y, self.radius) {
            self.x += dx;
        }
        if dy != 0.0 && is_free(self.x, self.y + dy, self.radius) {
            self.y += dy;
        }

        if input.turn_left { self.angle -= self.rotation_speed; }
        if input.turn_right { self.angle += self.rotation_speed; }
        self.angle += input.mouse_dx * self.mouse_sens;
        self.angle = normalize_angle(self.angle);

        if self.shot_ticks > 0 {
            self.shot_ticks -= 1;
        } else if input.fire {
            self.shot_ticks = SHOT_TICKS;
            self.shot_pending = true;
        }
    }
}

/// True when a circle of radius `r` at (wx, wy) touches neither a wall nor a
/// blocking sprite. Walls are tested at the centre and eight rim samples;
/// leaving a non-empty grid counts as blocked.
pub fn is_free_with_radius(maze: &Maze, sprites: &[Sprite], wx: f32, wy: f32, r: f32) -> bool {
    const D: f32 = std::f32::consts::FRAC_1_SQRT_2;
    let samples = [
        (wx, wy),
        (wx + r, wy),
        (wx - r, wy),
        (wx, wy + r),
        (wx, wy - r),
        (wx + r * D, wy + r * D),
        (wx - r * D, wy + r * D),
        (wx + r * D, wy - r * D),
        (wx - r * D, wy - r * D),
    ];
    let outside = |x: f32, y: f32| {
        maze.cols() > 0 && (x < 0.0 || y < 0.0 || x >= maze.world_width() || y >= maze.world_height())
    };
    if samples.iter().any(|&(x, y)| outside(x, y) || maze.is_wall_at(x, y)) {
        return false;
    }
    !sprites.iter().any(|s| s.blocks_circle(wx, wy, r))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sprite::SpriteKind;
    use std::f32::consts::PI;

    #[test]
    fn normalize_wraps_into_range() {
        assert_eq!(normalize_angle(0.0), 0.0);
        assert!((normalize_angle(-PI / 2.0) - 1.5 * PI).abs() < 1e-5);
        assert!((normalize_angle(TAU + 0.25) - 0.25).abs() < 1e-5);
        let tiny = normalize_angle(-1e-9);
        assert!((0.0..TAU).contains(&tiny));
    }

    #[test]
    fn forward_moves_along_facing() {
        let mut p = Player::new(100.0, 100.0, 0.0);
        p.update(&InputState { forward: true, ..Default::default() }, |_, _, _| true);
        assert!((p.x - 103.0).abs() < 1e-4);
        assert!((p.y - 100.0).abs() < 1e-4);
    }

    #[test]
    fn blocked_axis_slides() {
        let mut p = Player::new(100.0, 100.0, PI / 4.0);
        // wall to the east: x may not grow past 101
        p.update(&InputState { forward: true, ..Default::default() }, |x, _, _| x < 101.0);
        assert_eq!(p.x, 100.0);
        assert!(p.y > 100.0);
    }

    #[test]
    fn shot_fires_once_then_cools_down() {
        let mut p = Player::new(0.0, 0.0, 0.0);
        let fire = InputState { fire: true, ..Default::default() };
        p.update(&fire, |_, _, _| true);
        assert!(p.is_shooting());
        assert!(p.take_shot());
        assert!(!p.take_shot());
        p.update(&fire, |_, _, _| true);
        assert!(!p.take_shot());
        for _ in 0..SHOT_TICKS {
            p.update(&InputState::default(), |_, _, _| true);
        }
        assert!(!p.is_shooting());
        p.update(&fire, |_, _, _| true);
        assert!(p.take_shot());
    }

    #[test]
    fn mouse_turns_and_angle_stays_normalized() {
        let mut p = Player::new(0.0, 0.0, 0.01);
        p.update(&InputState { mouse_dx: -100.0, ..Default::default() }, |_, _, _| true);
        assert!((0.0..TAU).contains(&p.angle));
        assert!((p.angle - (0.01 - 0.3 + TAU)).abs() < 1e-4);
    }

    #[test]
    fn radius_check_sees_walls_sprites_and_grid_edge() {
        let m = Maze::parse("1 1 1 1\n1 _ _ 1\n1 _ _ 1\n1 1 1 1\n", 100.0).unwrap();
        assert!(is_free_with_radius(&m, &[], 200.0, 200.0, 25.0));
        assert!(!is_free_with_radius(&m, &[], 120.0, 200.0, 25.0));
        let pin = [Sprite::new(SpriteKind::Pin, 250.0, 200.0)];
        assert!(!is_free_with_radius(&m, &pin, 220.0, 200.0, 25.0));
        let flame = [Sprite::new(SpriteKind::Flame, 250.0, 200.0)];
        assert!(is_free_with_radius(&m, &flame, 220.0, 200.0, 25.0));
        let open = Maze::parse("_ _\n_ _\n", 100.0).unwrap();
        assert!(!is_free_with_radius(&open, &[], 10.0, 100.0, 25.0));
        assert!(is_free_with_radius(&Maze::empty(100.0), &[], -500.0, 9.0, 25.0));
    }
}
