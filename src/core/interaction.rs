//! Gameplay reactions to a rendered frame: shots, NPC pursuit and the win
//! condition. Reads the sprites' cached projection, never recomputes it.
use tracing::info;

use crate::core::maze::Maze;
use crate::core::player::Viewpoint;
use crate::core::sprite::Sprite;
use crate::render::casters::cast_ray;

/// What a fired shot did.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ShotOutcome {
    /// Index of the sprite that absorbed the shot.
    pub index: usize,
    pub npc: bool,
    pub killed: bool,
}

/// True when no wall lies between `from` and `to`.
pub fn line_of_sight(maze: &Maze, from: (f32, f32), to: (f32, f32)) -> bool {
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let distance = dx.hypot(dy);
    if distance <= f32::EPSILON {
        return true;
    }
    let hit = cast_ray(maze, from.0, from.1, dy.atan2(dx), distance);
    !hit.hit || hit.distance >= distance
}

/// Resolves a shot against the last frame's projection. Sprites are tried
/// nearest first; the first one on the crosshair absorbs the shot and dies
/// if it is mortal, alive and in plain sight.
pub fn resolve_shot(
    sprites: &mut [Sprite],
    shooter: &Viewpoint,
    maze: &Maze,
    center_ray: i32,
    scale: i32,
) -> Option<ShotOutcome> {
    let mut order: Vec<usize> = (0..sprites.len()).collect();
    order.sort_by(|&a, &b| sprites[a].cache.distance.total_cmp(&sprites[b].cache.distance));

    let index = order.into_iter().find(|&i| sprites[i].is_targeted(center_ray, scale))?;
    let sprite = &mut sprites[index];
    let in_sight = line_of_sight(maze, (shooter.x, shooter.y), (sprite.x, sprite.y));
    let killed = in_sight && sprite.kill();
    if killed {
        info!(kind = ?sprite.kind, x = sprite.x, y = sprite.y, "sprite killed");
    }
    Some(ShotOutcome { index, npc: sprite.is_npc(), killed })
}

/// Living NPCs that can see the player switch to their action animation and
/// step one unit per axis towards them while farther than a tile away.
pub fn npc_action(sprites: &mut [Sprite], player: &Viewpoint, maze: &Maze) {
    let tile = maze.tile();
    for s in sprites.iter_mut().filter(|s| s.is_npc() && !s.dead) {
        if line_of_sight(maze, (s.x, s.y), (player.x, player.y)) {
            s.set_action(true);
            if s.cache.distance > tile {
                s.x += if s.x < player.x { 1.0 } else { -1.0 };
                s.y += if s.y < player.y { 1.0 } else { -1.0 };
            }
        } else {
            s.set_action(false);
        }
    }
}

pub fn all_npcs_dead(sprites: &[Sprite]) -> bool {
    sprites.iter().filter(|s| s.is_npc()).all(|s| s.dead)
}
