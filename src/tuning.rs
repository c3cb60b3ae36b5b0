//! Data-driven game balance
//!
//! Every gameplay constant tuned by feel lives here so a round can be
//! reshaped from a JSON file without touching the simulation.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// How new obstacles and collectables enter the lane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpawnPolicy {
    /// Three jittered periodic timers append to open-ended entity lists
    Timed,
    /// Two fixed obstacle slots recycled in lockstep, one collectable slot
    TwinSlots,
}

/// Geometry of one recycled obstacle slot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlotSpec {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Session ===
    pub starting_health: u32,
    /// Round length in whole seconds
    pub total_time: u32,
    /// Countdown freezes while the player is invincible
    pub pause_countdown_while_invincible: bool,

    // === Speed ===
    /// Leftward scroll per tick
    pub base_speed: f32,
    pub speed_up_interval: u32,
    pub speed_up_increment: f32,

    // === Player ===
    /// `None` means duck is held until released
    pub duck_duration: Option<f32>,

    // === Collisions ===
    pub stall_duration: f32,
    pub push_back: f32,
    pub knockback_distance: f32,
    pub knockback_duration: f32,
    pub hit_spawn_delay: f32,
    pub collect_bonus: u64,

    // === Power-ups ===
    pub slow_factor: f32,
    pub slow_duration: f32,
    pub invincibility_duration: f32,

    // === Spawning ===
    pub spawn_policy: SpawnPolicy,
    pub spawn_x: f32,
    pub obstacle_period: f32,
    pub collectable_period: f32,
    pub power_up_period: f32,
    /// Timers closer than this are considered colliding
    pub spawn_overlap_window: f32,
    /// Lower-priority timer is pushed back by this much
    pub spawn_jitter: f32,
    pub obstacle_size_range: (f32, f32),
    pub spawn_y_range: (f32, f32),

    // === Twin slots ===
    pub slots: [SlotSpec; 2],
    pub placement_attempts: u32,
    pub placement_clearance: f32,
    pub placement_spread: f32,
    pub placement_fallback_offset: f32,

    // === Presentation ===
    /// Collectable spin in degrees per second
    pub collectable_spin_rate: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self::arcade()
    }
}

impl Tuning {
    /// Open-ended run: timed spawner, 90 s round, big collectable payout
    pub fn arcade() -> Self {
        Self {
            starting_health: 5,
            total_time: 90,
            pause_countdown_while_invincible: true,

            base_speed: 0.01,
            speed_up_interval: 30,
            speed_up_increment: 0.005,

            duck_duration: Some(1.0),

            stall_duration: 1.0,
            push_back: 0.1,
            knockback_distance: 0.5,
            knockback_duration: 1.0,
            hit_spawn_delay: 1.0,
            collect_bonus: 10_000,

            slow_factor: 0.5,
            slow_duration: 10.0,
            invincibility_duration: 10.0,

            spawn_policy: SpawnPolicy::Timed,
            spawn_x: 3.0,
            obstacle_period: 3.0,
            collectable_period: 11.0,
            power_up_period: 13.0,
            spawn_overlap_window: 0.2,
            spawn_jitter: 1.3,
            obstacle_size_range: (0.05, 0.15),
            spawn_y_range: (0.1, 0.3),

            slots: [
                SlotSpec {
                    x: 3.0,
                    y: 0.05,
                    width: 0.1,
                    height: 0.15,
                },
                SlotSpec {
                    x: 4.5,
                    y: 0.14,
                    width: 0.1,
                    height: 0.1,
                },
            ],
            placement_attempts: 10,
            placement_clearance: 0.2,
            placement_spread: 0.6,
            placement_fallback_offset: 0.3,

            // 1 degree per tick
            collectable_spin_rate: 62.5,
        }
    }

    /// Two-slot lane: ground and overhead obstacles, 60 s round, hold to duck
    pub fn classic() -> Self {
        Self {
            total_time: 60,
            pause_countdown_while_invincible: false,
            duck_duration: None,
            collect_bonus: 5,
            collectable_period: 13.0,
            power_up_period: 15.0,
            spawn_policy: SpawnPolicy::TwinSlots,
            // 10 degrees per tick
            collectable_spin_rate: 625.0,
            ..Self::arcade()
        }
    }

    /// Look up a preset by name
    pub fn preset(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "arcade" => Some(Self::arcade()),
            "classic" => Some(Self::classic()),
            _ => None,
        }
    }

    /// Load tuning overrides from a JSON file, falling back to `fallback`
    pub fn load(path: &Path, fallback: Self) -> Self {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                log::warn!("Tuning file {} unreadable ({e}), using preset", path.display());
                return fallback;
            }
        };
        match serde_json::from_str(&text) {
            Ok(tuning) => {
                log::info!("Loaded tuning from {}", path.display());
                tuning
            }
            Err(e) => {
                log::warn!("Tuning file {} invalid ({e}), using preset", path.display());
                fallback
            }
        }
    }
}
