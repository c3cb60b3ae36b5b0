//! Lane Dash - A side-scrolling lane runner
//!
//! Core modules:
//! - `sim`: Deterministic simulation (motion, collisions, spawning, game state)
//! - `tuning`: Data-driven game balance
//! - `platform`: Clock and input plumbing
//! - `audio`: Sound triggers and sample playback (kira)
//! - `runner`: Fixed-step tick driver and render sink

pub mod audio;
pub mod platform;
pub mod runner;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use runner::{LogRenderer, RenderSink, Runner};
pub use settings::Settings;
pub use tuning::{SpawnPolicy, Tuning};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (~60 Hz)
    pub const SIM_DT: f32 = 0.016;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Entities are recycled once their anchor passes this x
    pub const DESPAWN_X: f32 = -0.5;

    /// Player defaults
    pub const PLAYER_START_X: f32 = 0.7;
    pub const PLAYER_BASELINE_Y: f32 = 0.05;
    pub const PLAYER_WIDTH: f32 = 0.1;
    pub const PLAYER_HEIGHT: f32 = 0.1;
    /// Ducking squashes the box: lower, wider
    pub const DUCK_WIDTH: f32 = 0.12;
    pub const DUCK_HEIGHT: f32 = 0.05;
    pub const MAX_JUMP_HEIGHT: f32 = 0.3;
    /// Rise and fall each take this long (3 s full arc)
    pub const JUMP_HALF_DURATION: f32 = 1.5;

    /// Obstacle cannot re-trigger damage within this window after a hit
    pub const HIT_IMMUNITY: f32 = 0.5;

    /// Pickups
    pub const COLLECTABLE_RADIUS: f32 = 0.05;
    pub const POWER_UP_SIZE: f32 = 0.1;
    /// Bob amplitude for pickups (presentation only)
    pub const BOB_AMPLITUDE: f32 = 0.01;
}

/// Linear interpolation between `a` and `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
