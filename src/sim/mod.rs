//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering, audio or platform dependencies

pub mod collision;
pub mod motion;
pub mod rect;
pub mod spawner;
pub mod state;
pub mod tick;

pub use collision::{collectable_hits, obstacle_hits, power_up_hits};
pub use rect::Rect;
pub use spawner::SpawnTimers;
pub use state::{
    ActiveEffects, Collectable, EntityRegistry, GameEvent, GamePhase, GameState, Knockback,
    Obstacle, Player, PowerUp, PowerUpKind,
};
pub use tick::{TickInput, tick};
