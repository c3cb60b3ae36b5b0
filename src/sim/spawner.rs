//! Spawn scheduling
//!
//! Two policies share this module:
//! - `Timed`: three periodic timers (obstacle > collectable > power-up
//!   priority) that push each other apart so spawns never bunch up.
//! - `TwinSlots`: exactly two obstacle slots recycled together, plus one
//!   collectable slot placed clear of both obstacles.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::{GameState, PowerUpKind};
use crate::consts::*;
use crate::tuning::SpawnPolicy;

/// Seconds accumulated toward each entity kind's next spawn
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SpawnTimers {
    pub obstacle: f32,
    pub collectable: f32,
    pub power_up: f32,
}

impl SpawnTimers {
    pub fn advance(&mut self, dt: f32) {
        self.obstacle += dt;
        self.collectable += dt;
        self.power_up += dt;
    }

    /// Push the lower-priority timer of every near-coincident pair back by
    /// `jitter` so the two never fire on the same tick.
    pub fn desync(&mut self, window: f32, jitter: f32) {
        if (self.obstacle - self.collectable).abs() < window {
            self.collectable -= jitter;
        }
        if (self.obstacle - self.power_up).abs() < window {
            self.power_up -= jitter;
        }
        if (self.collectable - self.power_up).abs() < window {
            self.power_up -= jitter;
        }
    }

    /// Delay every upcoming spawn by `amount` seconds
    pub fn delay_all(&mut self, amount: f32) {
        self.obstacle -= amount;
        self.collectable -= amount;
        self.power_up -= amount;
    }
}

/// Uniform roll in `[lo, hi)`, or `lo` for an empty range
fn roll(rng: &mut impl Rng, (lo, hi): (f32, f32)) -> f32 {
    if hi > lo { rng.random_range(lo..hi) } else { lo }
}

/// Advance spawn timers by `dt` and add any entities that came due
pub fn update(state: &mut GameState, dt: f32) {
    match state.tuning.spawn_policy {
        SpawnPolicy::Timed => update_timed(state, dt),
        SpawnPolicy::TwinSlots => update_twin_slots(state, dt),
    }
}

fn update_timed(state: &mut GameState, dt: f32) {
    let window = state.tuning.spawn_overlap_window;
    let jitter = state.tuning.spawn_jitter;

    state.timers.advance(dt);
    state.timers.desync(window, jitter);

    if state.timers.obstacle >= state.tuning.obstacle_period {
        spawn_obstacle(state);
        state.timers.obstacle = 0.0;
    }
    if state.timers.collectable >= state.tuning.collectable_period {
        spawn_collectable(state);
        state.timers.collectable = 0.0;
    }
    if state.timers.power_up >= state.tuning.power_up_period {
        spawn_power_up(state);
        state.timers.power_up = 0.0;
    }
}

fn update_twin_slots(state: &mut GameState, dt: f32) {
    // Only power-ups run on a timer here; obstacles and the collectable
    // are slot-driven, so there is nothing to desync against.
    state.timers.power_up += dt;
    if state.timers.power_up >= state.tuning.power_up_period {
        spawn_power_up(state);
        state.timers.power_up = 0.0;
    }

    let all_passed = state
        .entities
        .obstacles
        .iter()
        .all(|o| o.pos.x < DESPAWN_X);
    if all_passed {
        recycle_slots(state);
    }

    if state.entities.collectables.is_empty() {
        place_collectable(state);
    }
}

fn spawn_obstacle(state: &mut GameState) {
    let size_range = state.tuning.obstacle_size_range;
    let width = roll(&mut state.rng, size_range);
    let height = roll(&mut state.rng, size_range);
    let y = roll(&mut state.rng, state.tuning.spawn_y_range);
    let pos = Vec2::new(state.tuning.spawn_x, y);
    let id = state.entities.spawn_obstacle(pos, Vec2::new(width, height));
    log::debug!("Spawned obstacle {id} at y={y:.3} ({width:.3}x{height:.3})");
}

fn spawn_collectable(state: &mut GameState) {
    let y = roll(&mut state.rng, state.tuning.spawn_y_range);
    let pos = Vec2::new(state.tuning.spawn_x, y);
    let id = state.entities.spawn_collectable(pos, COLLECTABLE_RADIUS);
    log::debug!("Spawned collectable {id} at y={y:.3}");
}

fn spawn_power_up(state: &mut GameState) {
    let y = roll(&mut state.rng, state.tuning.spawn_y_range);
    let kind = PowerUpKind::random(&mut state.rng);
    let pos = Vec2::new(state.tuning.spawn_x, y);
    let id = state.entities.spawn_power_up(pos, kind);
    log::debug!("Spawned {kind:?} power-up {id} at y={y:.3}");
}

/// Replace the obstacle list with fresh slot obstacles
pub(crate) fn reset_slots(state: &mut GameState) {
    state.entities.obstacles.clear();
    for slot in state.tuning.slots {
        state.entities.spawn_obstacle(
            Vec2::new(slot.x, slot.y),
            Vec2::new(slot.width, slot.height),
        );
    }
    if state.entities.collectables.is_empty() {
        place_collectable(state);
    }
}

/// Send both slots back to their start positions together
fn recycle_slots(state: &mut GameState) {
    let slots = state.tuning.slots;
    if state.entities.obstacles.len() != slots.len() {
        reset_slots(state);
        return;
    }
    for (obstacle, slot) in state.entities.obstacles.iter_mut().zip(slots) {
        obstacle.pos = Vec2::new(slot.x, slot.y);
        obstacle.hit_player = false;
        obstacle.knockback = None;
    }
    log::debug!("Recycled obstacle slots");
}

/// Place the single collectable clear of every obstacle.
///
/// Tries up to `placement_attempts` random x positions; if all land within
/// `placement_clearance` of an obstacle, falls back to a fixed offset past
/// the furthest obstacle. Returns the chosen x.
pub fn place_collectable(state: &mut GameState) -> f32 {
    let tuning = &state.tuning;
    let clearance = tuning.placement_clearance;
    let spawn_x = tuning.spawn_x;
    let spread = (0.0, tuning.placement_spread);
    let attempts = tuning.placement_attempts;
    let fallback_offset = tuning.placement_fallback_offset;
    let y_range = tuning.spawn_y_range;

    let obstacle_xs: Vec<f32> = state.entities.obstacles.iter().map(|o| o.pos.x).collect();
    let y = roll(&mut state.rng, y_range);

    let mut chosen = None;
    for _ in 0..attempts {
        let x = spawn_x + roll(&mut state.rng, spread);
        if obstacle_xs.iter().all(|&ox| (x - ox).abs() >= clearance) {
            chosen = Some(x);
            break;
        }
    }
    let x = chosen.unwrap_or_else(|| {
        let furthest = obstacle_xs.iter().copied().fold(spawn_x, f32::max);
        log::debug!("Collectable placement fell back after {attempts} attempts");
        furthest + fallback_offset
    });

    state
        .entities
        .spawn_collectable(Vec2::new(x, y), COLLECTABLE_RADIUS);
    x
}
