//! Time-parameterized animation and scrolling
//!
//! Every animation is a pure function of (start time, now): nothing here
//! integrates velocity, so the same `now` always lands on the same pose.

use super::state::{GameState, Obstacle, Player};
use crate::consts::*;
use crate::lerp;
use crate::tuning::SpawnPolicy;

impl Player {
    /// Pose the player for session time `now`.
    ///
    /// The jump rises linearly for `JUMP_HALF_DURATION`, falls for the same
    /// time, then snaps back to the baseline. A timed duck ends once
    /// `duck_duration` has passed; with `None` it lasts until released.
    pub fn animate(&mut self, now: f32, duck_duration: Option<f32>) {
        if self.is_jumping {
            let t = (now - self.jump_started_at).max(0.0);
            let half = JUMP_HALF_DURATION;
            if t < half {
                self.pos.y = PLAYER_BASELINE_Y + (t / half) * self.max_jump_height;
            } else if t < 2.0 * half {
                self.pos.y = PLAYER_BASELINE_Y + (1.0 - (t - half) / half) * self.max_jump_height;
            } else {
                self.pos.y = PLAYER_BASELINE_Y;
                self.is_jumping = false;
            }
        }

        if self.is_ducking
            && duck_duration.is_some_and(|limit| now - self.duck_started_at >= limit)
        {
            self.stand();
        }
    }
}

impl Obstacle {
    /// Advance the knock-back slide. Returns true if one was running this
    /// tick, in which case the obstacle does not scroll.
    pub fn animate_knockback(&mut self, now: f32) -> bool {
        let Some(knockback) = self.knockback else {
            return false;
        };
        let elapsed = now - knockback.started_at;
        if elapsed >= knockback.duration {
            self.pos.x = knockback.target_x;
            self.knockback = None;
        } else {
            let t = (elapsed / knockback.duration).max(0.0);
            self.pos.x = lerp(knockback.initial_x, knockback.target_x, t);
        }
        true
    }
}

/// Animate the player, scroll every entity left by the current speed, and
/// drop entities that scrolled off the lane.
pub fn advance(state: &mut GameState, now: f32) {
    let speed = state.speed;
    state.player.animate(now, state.tuning.duck_duration);

    for obstacle in &mut state.entities.obstacles {
        obstacle.update_hit_status(now);
        if !obstacle.animate_knockback(now) {
            obstacle.pos.x -= speed;
        }
    }
    for collectable in &mut state.entities.collectables {
        collectable.pos.x -= speed;
    }
    for power_up in &mut state.entities.power_ups {
        power_up.pos.x -= speed;
    }

    // Slot obstacles are recycled by the spawner instead
    let include_obstacles = state.tuning.spawn_policy == SpawnPolicy::Timed;
    let removed = state.entities.despawn_passed(DESPAWN_X, include_obstacles);
    if removed > 0 {
        log::trace!("Despawned {removed} entities");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::GameState;
    use glam::Vec2;
    use proptest::prelude::*;

    #[test]
    fn test_jump_rises_then_falls() {
        let mut player = Player::new(PLAYER_START_X);
        player.jump(0.0);

        player.animate(0.75, None);
        assert!((player.pos.y - (PLAYER_BASELINE_Y + 0.15)).abs() < 1e-6);

        player.animate(1.5, None);
        assert_eq!(player.pos.y, PLAYER_BASELINE_Y + MAX_JUMP_HEIGHT);

        player.animate(2.25, None);
        assert!((player.pos.y - (PLAYER_BASELINE_Y + 0.15)).abs() < 1e-6);
        assert!(player.is_jumping);

        player.animate(3.0, None);
        assert_eq!(player.pos.y, PLAYER_BASELINE_Y);
        assert!(!player.is_jumping);
    }

    #[test]
    fn test_timed_duck_ends() {
        let mut player = Player::new(PLAYER_START_X);
        player.duck(2.0);
        player.animate(2.9, Some(1.0));
        assert!(player.is_ducking);
        player.animate(3.0, Some(1.0));
        assert!(!player.is_ducking);
        assert_eq!(player.size, Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT));
    }

    #[test]
    fn test_held_duck_lasts() {
        let mut player = Player::new(PLAYER_START_X);
        player.duck(2.0);
        player.animate(50.0, None);
        assert!(player.is_ducking);
    }

    #[test]
    fn test_knockback_slides_then_snaps() {
        let mut obstacle = Obstacle::new(1, Vec2::new(2.0, 0.1), Vec2::splat(0.1));
        obstacle.start_knockback(1.0, 0.5, 1.0);

        assert!(obstacle.animate_knockback(1.5));
        assert!((obstacle.pos.x - 2.25).abs() < 1e-6);

        assert!(obstacle.animate_knockback(2.0));
        assert_eq!(obstacle.pos.x, 2.5);
        assert!(obstacle.knockback.is_none());

        assert!(!obstacle.animate_knockback(2.1));
    }

    #[test]
    fn test_advance_scrolls_and_despawns() {
        let mut state = GameState::new(1);
        state
            .entities
            .spawn_obstacle(Vec2::new(1.0, 0.2), Vec2::splat(0.1));
        state
            .entities
            .spawn_collectable(Vec2::new(DESPAWN_X + 0.005, 0.2), COLLECTABLE_RADIUS);

        advance(&mut state, 0.016);
        assert!((state.entities.obstacles[0].pos.x - 0.99).abs() < 1e-6);
        assert!(state.entities.collectables.is_empty());
    }

    #[test]
    fn test_knocked_back_obstacle_ignores_scroll() {
        let mut state = GameState::new(1);
        state
            .entities
            .spawn_obstacle(Vec2::new(1.0, 0.2), Vec2::splat(0.1));
        state.entities.obstacles[0].start_knockback(0.0, 0.5, 1.0);

        advance(&mut state, 0.5);
        assert!((state.entities.obstacles[0].pos.x - 1.25).abs() < 1e-6);
    }

    /// Start times on a 1/64 s grid keep the float arithmetic exact
    fn grid_time() -> impl Strategy<Value = f32> {
        (0u32..6400).prop_map(|n| n as f32 / 64.0)
    }

    proptest! {
        #[test]
        fn jump_peaks_and_lands_on_schedule(start in grid_time()) {
            let mut player = Player::new(PLAYER_START_X);
            player.jump(start);

            player.animate(start + JUMP_HALF_DURATION, None);
            prop_assert_eq!(player.pos.y, PLAYER_BASELINE_Y + MAX_JUMP_HEIGHT);

            player.animate(start + 2.0 * JUMP_HALF_DURATION, None);
            prop_assert_eq!(player.pos.y, PLAYER_BASELINE_Y);
            prop_assert!(!player.is_jumping);
        }

        #[test]
        fn jump_stays_within_arc(start in grid_time(), offset in 0.0f32..3.0) {
            let mut player = Player::new(PLAYER_START_X);
            player.jump(start);
            player.animate(start + offset, None);
            prop_assert!(player.pos.y >= PLAYER_BASELINE_Y - 1e-5);
            prop_assert!(player.pos.y <= PLAYER_BASELINE_Y + MAX_JUMP_HEIGHT + 1e-5);
        }
    }
}
