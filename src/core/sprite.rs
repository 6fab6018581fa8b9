//! Sprite entities: per-kind configuration table, animation state machines
//! and the cached projection the interaction code reads back.
use rand::Rng;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SpriteKind {
    Barrel,
    Pin,
    Flame,
    Devil,
    Soldier,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Flag {
    Decoration,
    Npc,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DeathType {
    Immortal,
    Mortal,
}

/// Which frame list a visual frame comes from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FrameSet {
    Base,
    Idle,
    Death,
    Action,
}

impl FrameSet {
    pub fn dir_name(self) -> &'static str {
        match self {
            FrameSet::Base => "base",
            FrameSet::Idle => "animations",
            FrameSet::Death => "death",
            FrameSet::Action => "action",
        }
    }
}

/// Handle of one sprite image; resolved to pixels by the texture manager.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FrameRef {
    pub kind: SpriteKind,
    pub set: FrameSet,
    pub index: usize,
}

/// Immutable per-kind visual configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct SpriteConfig {
    pub name: &'static str,
    pub flag: Flag,
    pub death: DeathType,
    /// Horizontal and vertical scale applied to the projected height.
    pub scale: (f32, f32),
    /// Vertical shift, in half projected heights.
    pub shift: f32,
    pub dead_shift: f32,
    pub blocked: bool,
    /// Number of angular view buckets; 0 means a single base frame.
    pub view_buckets: usize,
    pub base_frames: usize,
    pub idle_frames: usize,
    pub death_frames: usize,
    pub action_frames: usize,
    /// Idle animation only plays closer than this (world units).
    pub animation_dist: f32,
    /// Ticks each animation frame is held before advancing.
    pub animation_speed: u32,
}

const BARREL: SpriteConfig = SpriteConfig {
    name: "barrel",
    flag: Flag::Decoration,
    death: DeathType::Mortal,
    scale: (0.4, 0.4),
    shift: 1.8,
    dead_shift: 2.6,
    blocked: true,
    view_buckets: 0,
    base_frames: 1,
    idle_frames: 12,
    death_frames: 4,
    action_frames: 0,
    animation_dist: 800.0,
    animation_speed: 10,
};

const PIN: SpriteConfig = SpriteConfig {
    name: "pin",
    flag: Flag::Decoration,
    death: DeathType::Immortal,
    scale: (0.6, 0.6),
    shift: 0.6,
    dead_shift: 0.6,
    blocked: true,
    view_buckets: 0,
    base_frames: 1,
    idle_frames: 8,
    death_frames: 0,
    action_frames: 0,
    animation_dist: 800.0,
    animation_speed: 10,
};

const FLAME: SpriteConfig = SpriteConfig {
    name: "flame",
    flag: Flag::Decoration,
    death: DeathType::Immortal,
    scale: (0.6, 0.6),
    shift: 0.7,
    dead_shift: 0.7,
    blocked: false,
    view_buckets: 0,
    base_frames: 1,
    idle_frames: 16,
    death_frames: 0,
    action_frames: 0,
    animation_dist: 800.0,
    animation_speed: 5,
};

const DEVIL: SpriteConfig = SpriteConfig {
    name: "devil",
    flag: Flag::Npc,
    death: DeathType::Mortal,
    scale: (1.1, 1.1),
    shift: -0.2,
    dead_shift: 0.6,
    blocked: true,
    view_buckets: 8,
    base_frames: 8,
    idle_frames: 0,
    death_frames: 6,
    action_frames: 9,
    animation_dist: 150.0,
    animation_speed: 10,
};

const SOLDIER: SpriteConfig = SpriteConfig {
    name: "soldier",
    flag: Flag::Npc,
    death: DeathType::Mortal,
    scale: (0.4, 0.6),
    shift: 0.8,
    dead_shift: 1.7,
    blocked: true,
    view_buckets: 8,
    base_frames: 8,
    idle_frames: 0,
    death_frames: 10,
    action_frames: 4,
    animation_dist: 800.0,
    animation_speed: 6,
};

impl SpriteKind {
    pub const ALL: [SpriteKind; 5] = [
        SpriteKind::Barrel,
        SpriteKind::Pin,
        SpriteKind::Flame,
        SpriteKind::Devil,
        SpriteKind::Soldier,
    ];

    pub fn config(self) -> &'static SpriteConfig {
        match self {
            SpriteKind::Barrel => &BARREL,
            SpriteKind::Pin => &PIN,
            SpriteKind::Flame => &FLAME,
            SpriteKind::Devil => &DEVIL,
            SpriteKind::Soldier => &SOLDIER,
        }
    }

    pub fn frame_count(self, set: FrameSet) -> usize {
        let c = self.config();
        match set {
            FrameSet::Base => c.base_frames,
            FrameSet::Idle => c.idle_frames,
            FrameSet::Death => c.death_frames,
            FrameSet::Action => c.action_frames,
        }
    }
}

/// Integer degree range; `start > end` wraps through 0.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DegreeRange {
    pub start: u32,
    pub end: u32,
}

impl DegreeRange {
    pub fn contains(&self, deg: u32) -> bool {
        if self.start > self.end {
            deg >= self.start || deg < self.end
        } else {
            self.start <= deg && deg < self.end
        }
    }

    fn midpoint(&self) -> f32 {
        let span = (self.end + 360 - self.start) % 360;
        (self.start as f32 + span as f32 / 2.0) % 360.0
    }
}

/// Angular buckets used to pick a billboard frame, tested in order.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewBuckets {
    ranges: Vec<DegreeRange>,
}

impl ViewBuckets {
    /// `count` equal buckets, the first one centred on 0 degrees.
    /// With 8 buckets: [338,360)+[0,23), [23,68), ..., [293,338).
    pub fn uniform(count: usize) -> Self {
        if count < 2 {
            return Self { ranges: Vec::new() };
        }
        let width = 360.0 / count as f32;
        let half = width / 2.0;
        let mut ranges = Vec::with_capacity(count);
        ranges.push(DegreeRange { start: (360.0 - half).round() as u32, end: half.round() as u32 });
        for i in 1..count {
            ranges.push(DegreeRange {
                start: (half + (i - 1) as f32 * width).round() as u32,
                end: (half + i as f32 * width).round() as u32,
            });
        }
        Self { ranges }
    }

    pub fn from_ranges(ranges: Vec<DegreeRange>) -> Self {
        Self { ranges }
    }

    pub fn len(&self) -> usize { self.ranges.len() }
    pub fn is_empty(&self) -> bool { self.ranges.is_empty() }

    /// First bucket containing `deg` (taken mod 360). When no bucket matches,
    /// the bucket whose midpoint is angularly closest is used. `None` only for
    /// an empty set.
    pub fn select(&self, deg: u32) -> Option<usize> {
        if self.is_empty() {
            return None;
        }
        let d = deg % 360;
        if let Some(i) = self.ranges.iter().position(|r| r.contains(d)) {
            return Some(i);
        }
        self.ranges
            .iter()
            .enumerate()
            .map(|(i, r)| {
                let diff = (r.midpoint() - d as f32).abs() % 360.0;
                (i, diff.min(360.0 - diff))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
    }
}

/// Frame for `bucket` when only `frames` images exist for `buckets` buckets:
/// the circularly nearest available one, ties going to frame 0.
pub fn bucket_frame(bucket: usize, frames: usize, buckets: usize) -> usize {
    if frames == 0 {
        return 0;
    }
    if bucket < frames {
        return bucket;
    }
    let down = bucket - (frames - 1);
    let up = buckets.saturating_sub(bucket);
    if up <= down { 0 } else { frames - 1 }
}

/// Frame counter for one animation: holds each frame for `cadence` ticks,
/// then advances on the following tick.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct AnimationState {
    pub frame: usize,
    pub ticks_until_advance: u32,
}

impl AnimationState {
    pub fn new(cadence: u32) -> Self {
        Self { frame: 0, ticks_until_advance: cadence }
    }

    /// Loops back to the first frame after the last.
    pub fn tick_cyclic(&mut self, len: usize, cadence: u32) {
        self.tick(len, cadence, true);
    }

    /// Stops on the last frame.
    pub fn tick_hold(&mut self, len: usize, cadence: u32) {
        self.tick(len, cadence, false);
    }

    fn tick(&mut self, len: usize, cadence: u32, wrap: bool) {
        if len == 0 {
            return;
        }
        if self.ticks_until_advance > 0 {
            self.ticks_until_advance -= 1;
            return;
        }
        self.ticks_until_advance = cadence;
        if self.frame + 1 < len {
            self.frame += 1;
        } else if wrap {
            self.frame = 0;
        }
    }
}

/// Which animation drives the sprite's frame this tick.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ActiveAnimation {
    Death,
    Action,
    Idle,
    Static,
}

/// Outputs of the last projection, read back by targeting queries.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ProjectionCache {
    pub distance: f32,
    pub ray_index: i32,
    pub projected_height: i32,
    pub width: i32,
    pub visible: bool,
}

impl Default for ProjectionCache {
    fn default() -> Self {
        Self { distance: f32::INFINITY, ray_index: 0, projected_height: 0, width: 0, visible: false }
    }
}

#[derive(Clone, Debug)]
pub struct Sprite {
    pub kind: SpriteKind,
    pub x: f32,
    pub y: f32,
    pub dead: bool,
    pub action: bool,
    pub blocked: bool,
    pub idle: AnimationState,
    pub action_anim: AnimationState,
    pub death_anim: AnimationState,
    pub cache: ProjectionCache,
}

impl Sprite {
    /// Sprite at world position (x, y).
    pub fn new(kind: SpriteKind, x: f32, y: f32) -> Self {
        let c = kind.config();
        Self {
            kind,
            x,
            y,
            dead: false,
            action: false,
            blocked: c.blocked,
            idle: AnimationState::new(c.animation_speed),
            action_anim: AnimationState::new(c.animation_speed),
            death_anim: AnimationState::new(c.animation_speed),
            cache: ProjectionCache::default(),
        }
    }

    /// Sprite at a position given in tiles.
    pub fn at_tile(kind: SpriteKind, tx: f32, ty: f32, tile: f32) -> Self {
        Self::new(kind, tx * tile, ty * tile)
    }

    #[inline]
    pub fn config(&self) -> &'static SpriteConfig {
        self.kind.config()
    }

    pub fn is_npc(&self) -> bool {
        self.config().flag == Flag::Npc
    }

    pub fn is_mortal(&self) -> bool {
        self.config().death == DeathType::Mortal
    }

    /// Dead in the sense that drives rendering: immortal kinds never are.
    pub fn shows_death(&self) -> bool {
        self.dead && self.is_mortal()
    }

    /// Side of the square the sprite occupies for collisions.
    pub fn side(&self) -> f32 {
        30.0
    }

    /// Kills the sprite. Returns false when it was already dead or immortal.
    pub fn kill(&mut self) -> bool {
        if self.dead || !self.is_mortal() {
            return false;
        }
        self.dead = true;
        self.blocked = false;
        self.action = false;
        self.death_anim = AnimationState::new(self.config().animation_speed);
        true
    }

    pub fn set_action(&mut self, on: bool) {
        self.action = on && !self.dead && self.config().action_frames > 0;
    }

    /// True if a circle of radius `r` at (x, y) overlaps this blocking sprite.
    pub fn blocks_circle(&self, x: f32, y: f32, r: f32) -> bool {
        if !self.blocked {
            return false;
        }
        let half = self.side() / 2.0;
        let nx = x.clamp(self.x - half, self.x + half);
        let ny = y.clamp(self.y - half, self.y + half);
        (x - nx).powi(2) + (y - ny).powi(2) < r * r
    }

    pub fn active_animation(&self, distance: f32) -> ActiveAnimation {
        let c = self.config();
        if self.shows_death() && c.death_frames > 0 {
            ActiveAnimation::Death
        } else if self.action && c.action_frames > 0 {
            ActiveAnimation::Action
        } else if c.idle_frames > 0 && distance < c.animation_dist {
            ActiveAnimation::Idle
        } else {
            ActiveAnimation::Static
        }
    }

    /// Steps whichever animation is active at `distance` by one tick.
    pub fn advance_animation(&mut self, distance: f32) {
        let c = self.config();
        match self.active_animation(distance) {
            ActiveAnimation::Death => self.death_anim.tick_hold(c.death_frames, c.animation_speed),
            ActiveAnimation::Action => self.action_anim.tick_cyclic(c.action_frames, c.animation_speed),
            ActiveAnimation::Idle => self.idle.tick_cyclic(c.idle_frames, c.animation_speed),
            ActiveAnimation::Static => {}
        }
    }

    /// Targeted means: visible last frame, blocking, and its ray index lies
    /// within half its projected width of the centre ray.
    pub fn is_targeted(&self, center_ray: i32, scale: i32) -> bool {
        if !self.blocked || !self.cache.visible {
            return false;
        }
        let offset_px = (self.cache.ray_index - center_ray).abs() * scale.max(1);
        offset_px < self.cache.width / 2
    }
}

/// The demo level's sprites, positions in tiles.
pub fn default_population(tile: f32) -> Vec<Sprite> {
    [
        (SpriteKind::Barrel, 7.1, 2.1),
        (SpriteKind::Barrel, 5.9, 2.1),
        (SpriteKind::Pin, 8.7, 2.5),
        (SpriteKind::Devil, 7.0, 4.0),
        (SpriteKind::Flame, 8.6, 5.6),
        (SpriteKind::Devil, 12.5, 4.5),
        (SpriteKind::Soldier, 13.5, 7.5),
    ]
    .into_iter()
    .map(|(kind, tx, ty)| Sprite::at_tile(kind, tx, ty, tile))
    .collect()
}

/// Randomizes the idle phase of every sprite so copies don't animate in step.
pub fn stagger_animations<R: Rng>(sprites: &mut [Sprite], rng: &mut R) {
    for s in sprites.iter_mut() {
        let c = s.config();
        if c.idle_frames > 0 {
            s.idle.frame = rng.gen_range(0..c.idle_frames);
            s.idle.ticks_until_advance = rng.gen_range(0..=c.animation_speed);
        }
    }
}
