//! World data and gameplay state.
//!
//! - `maze`: tile grid and its loader
//! - `player`: viewpoint, input and movement
//! - `sprite`: sprite kinds, animation state and projection cache
//! - `interaction`: shots, NPC pursuit, win condition

pub mod interaction;
pub mod maze;
pub mod player;
pub mod sprite;
