//! Engine settings and the projection constants derived from them.
//!
//! Settings come from an optional TOML file. Every field has a default, so a
//! partial file only overrides what it names.
use std::f32::consts::PI;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::error::{EngineError, Result};

pub const DEFAULT_SETTINGS_PATH: &str = "settings.toml";

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    /// World units per tile.
    pub tile: f32,
    /// Horizontal field of view, radians.
    pub fov: f32,
    pub num_rays: usize,
    pub max_depth: f32,
    /// Extra rays on each side of the screen inside which sprites still project.
    pub fake_rays: i32,
    /// Sprites closer than this are not drawn.
    pub sprite_clip_distance: f32,
    pub map_path: String,
    pub assets_dir: String,
    /// Start position in tiles.
    pub player_start: (f32, f32),
    pub player_angle: f32,
    pub player_speed: f32,
    pub rotation_speed: f32,
    pub mouse_sensitivity: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 800,
            fps: 60,
            tile: 100.0,
            fov: PI / 3.0,
            num_rays: 300,
            max_depth: 800.0,
            fake_rays: 100,
            sprite_clip_distance: 30.0,
            map_path: "assets/map.txt".to_string(),
            assets_dir: "assets".to_string(),
            player_start: (1.5, 1.5),
            player_angle: 0.0,
            player_speed: 3.0,
            rotation_speed: 0.03,
            mouse_sensitivity: 0.003,
        }
    }
}

impl Settings {
    /// Loads settings from `path`. With no explicit path the default file is
    /// optional and its absence yields the built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let settings = match path {
            Some(p) => {
                if !p.exists() {
                    return Err(EngineError::MissingPath { path: p.to_path_buf() });
                }
                Self::from_toml(&fs::read_to_string(p)?)?
            }
            None => {
                let p = Path::new(DEFAULT_SETTINGS_PATH);
                if p.exists() {
                    Self::from_toml(&fs::read_to_string(p)?)?
                } else {
                    info!("no {DEFAULT_SETTINGS_PATH}, using built-in settings");
                    Self::default()
                }
            }
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.tile > 0.0) {
            return Err(EngineError::config("tile must be positive"));
        }
        if self.num_rays == 0 {
            return Err(EngineError::config("num_rays must be at least 1"));
        }
        if self.width == 0 || self.height == 0 {
            return Err(EngineError::config("screen dimensions must be non-zero"));
        }
        if !(self.fov > 0.0 && self.fov < PI) {
            return Err(EngineError::config("fov must lie in (0, pi)"));
        }
        if !(self.max_depth > 0.0) {
            return Err(EngineError::config("max_depth must be positive"));
        }
        if self.fake_rays < 0 {
            return Err(EngineError::config("fake_rays must not be negative"));
        }
        Ok(())
    }

    pub fn projection(&self) -> Projection {
        Projection::new(self)
    }
}

/// Constants every stage of the frame pipeline shares.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    pub width: i32,
    pub height: i32,
    pub half_height: i32,
    pub tile: f32,
    pub fov: f32,
    pub half_fov: f32,
    pub num_rays: usize,
    pub delta_angle: f32,
    /// Distance from the eye to the projection plane, in rays.
    pub dist: f32,
    pub projection_coeff: f32,
    /// Screen pixels per ray column.
    pub scale: i32,
    /// Crosshair column: `num_rays / 2 - 1`, one ray left of the ray aligned
    /// with the facing direction. Sprite ray indices, targeting and the
    /// frame's wall shot all measure against this column.
    pub center_ray: i32,
    pub fake_rays: i32,
    pub max_depth: f32,
    pub max_wall_height: f32,
    pub max_sprite_height: f32,
    pub sprite_clip_distance: f32,
    pub depth_epsilon: f32,
}

impl Projection {
    pub fn new(s: &Settings) -> Self {
        let half_fov = s.fov / 2.0;
        let dist = s.num_rays as f32 / (2.0 * half_fov.tan());
        let height = s.height as i32;
        Self {
            width: s.width as i32,
            height,
            half_height: height / 2,
            tile: s.tile,
            fov: s.fov,
            half_fov,
            num_rays: s.num_rays,
            delta_angle: s.fov / s.num_rays as f32,
            dist,
            projection_coeff: 3.0 * dist * s.tile,
            scale: (s.width as usize / s.num_rays).max(1) as i32,
            center_ray: s.num_rays as i32 / 2 - 1,
            fake_rays: s.fake_rays,
            max_depth: s.max_depth,
            max_wall_height: 2.0 * height as f32,
            max_sprite_height: 2.0 * height as f32,
            sprite_clip_distance: s.sprite_clip_distance,
            depth_epsilon: 1e-5,
        }
    }

    /// Wall (or sprite base) height for a fisheye-corrected depth.
    #[inline]
    pub fn projected_height(&self, corrected_depth: f32) -> f32 {
        let depth = corrected_depth.max(self.depth_epsilon);
        (self.projection_coeff / depth).min(self.max_wall_height)
    }

    /// Angle of ray `index` for a viewer facing `angle`.
    #[inline]
    pub fn ray_angle(&self, angle: f32, index: usize) -> f32 {
        angle - self.half_fov + index as f32 * self.delta_angle
    }
}
