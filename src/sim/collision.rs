//! Collision detection and response
//!
//! Obstacles use two boxes (head and body) against the player's box,
//! collectables a center-distance test, power-ups a plain box test.
//! Entities are checked in spawn order and every overlap in a tick is
//! handled; nothing exits early.

use super::rect::Rect;
use super::state::{Collectable, GameEvent, GamePhase, GameState, Obstacle, Player, PowerUp};

/// True if the player box overlaps either of the obstacle's boxes
pub fn obstacle_hits(player: &Rect, obstacle: &Obstacle) -> bool {
    player.overlaps(&obstacle.head_box()) || player.overlaps(&obstacle.body_box())
}

/// Center-distance test against half the player's width plus the radius
pub fn collectable_hits(player: &Player, collectable: &Collectable) -> bool {
    player.center().distance(collectable.pos) < player.size.x * 0.5 + collectable.radius
}

pub fn power_up_hits(player: &Rect, power_up: &PowerUp) -> bool {
    player.overlaps(&power_up.hitbox())
}

/// Resolve every contact for this tick
pub fn resolve(state: &mut GameState, now: f32) {
    resolve_obstacles(state, now);
    resolve_collectables(state);
    resolve_power_ups(state, now);
}

fn resolve_obstacles(state: &mut GameState, now: f32) {
    let stall = state.tuning.stall_duration;
    let push_back = state.tuning.push_back;
    let knockback_distance = state.tuning.knockback_distance;
    let knockback_duration = state.tuning.knockback_duration;
    let spawn_delay = state.tuning.hit_spawn_delay;

    for i in 0..state.entities.obstacles.len() {
        if state.player.invincible || state.health == 0 || state.phase != GamePhase::Playing {
            return;
        }

        // Re-read each time: an earlier hit this tick may have moved the player
        let player_box = state.player.hitbox();
        let obstacle = &mut state.entities.obstacles[i];
        if obstacle.is_immune(now) || !obstacle_hits(&player_box, obstacle) {
            continue;
        }

        let body_left = obstacle.body_box().left();
        let obstacle_id = obstacle.id;
        obstacle.mark_hit(now);
        obstacle.start_knockback(now, knockback_distance, knockback_duration);

        state.health = state.health.saturating_sub(1);
        state.effects.stall_until = Some(now + stall);
        state.speed = 0.0;
        state.timers.delay_all(spawn_delay);
        state.player.pos.x = body_left - push_back;
        state.events.push(GameEvent::Collision { obstacle_id });

        log::debug!(
            "Obstacle {obstacle_id} hit player at t={now:.3}, health now {}",
            state.health
        );
    }
}

fn resolve_collectables(state: &mut GameState) {
    let player = &state.player;
    let mut picked = 0u32;
    state.entities.collectables.retain(|c| {
        let hit = collectable_hits(player, c);
        if hit {
            picked += 1;
        }
        !hit
    });

    let bonus = state.tuning.collect_bonus;
    for _ in 0..picked {
        state.score += bonus;
        state.events.push(GameEvent::Collected { bonus });
    }
    if picked > 0 {
        log::debug!("Collected {picked}, score now {}", state.score);
    }
}

fn resolve_power_ups(state: &mut GameState, now: f32) {
    let player_box = state.player.hitbox();
    let mut collected = Vec::new();
    state.entities.power_ups.retain(|p| {
        if power_up_hits(&player_box, p) {
            collected.push(p.kind);
            false
        } else {
            true
        }
    });
    if collected.is_empty() {
        return;
    }

    for kind in collected {
        kind.apply(&mut state.effects, &mut state.player, now, &state.tuning);
        state.events.push(GameEvent::PowerUpCollected(kind));
        log::debug!("Power-up {kind:?} active at t={now:.3}");
    }
    state.refresh_speed(now);
}
