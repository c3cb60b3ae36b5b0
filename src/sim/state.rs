//! Game state and core simulation types
//!
//! The session aggregate owns the player and every entity list; entities
//! never point back at the session. All timestamps are session seconds.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::rect::Rect;
use super::spawner::{self, SpawnTimers};
use crate::consts::*;
use crate::tuning::{SpawnPolicy, Tuning};

/// Overall session phase. `Lost` and `Won` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Playing,
    /// Health ran out
    Lost,
    /// Countdown ran out with health left
    Won,
}

impl GamePhase {
    pub fn is_terminal(self) -> bool {
        !matches!(self, GamePhase::Playing)
    }
}

/// Things that happened during a tick, drained by the driver
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// An obstacle hit the player
    Collision { obstacle_id: u32 },
    /// A collectable was picked up
    Collected { bonus: u64 },
    PowerUpCollected(PowerUpKind),
    /// Base scroll speed stepped up
    SpeedUp { base_speed: f32 },
    Lost,
    Won,
}

/// The runner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Bottom-left corner
    pub pos: Vec2,
    pub size: Vec2,
    pub is_jumping: bool,
    pub is_ducking: bool,
    pub invincible: bool,
    pub jump_started_at: f32,
    pub duck_started_at: f32,
    pub max_jump_height: f32,
}

impl Player {
    pub fn new(x: f32) -> Self {
        Self {
            pos: Vec2::new(x, PLAYER_BASELINE_Y),
            size: Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT),
            is_jumping: false,
            is_ducking: false,
            invincible: false,
            jump_started_at: 0.0,
            duck_started_at: 0.0,
            max_jump_height: MAX_JUMP_HEIGHT,
        }
    }

    pub fn hitbox(&self) -> Rect {
        Rect::from_origin_size(self.pos, self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// Start a jump. Returns false (and changes nothing) if already airborne.
    pub fn jump(&mut self, now: f32) -> bool {
        if self.is_jumping {
            return false;
        }
        self.is_jumping = true;
        self.jump_started_at = now;
        true
    }

    /// Start ducking. Returns false (and changes nothing) if already ducking.
    ///
    /// A duck may start mid-jump and a jump may start mid-duck; the two
    /// animations run independently.
    pub fn duck(&mut self, now: f32) -> bool {
        if self.is_ducking {
            return false;
        }
        self.is_ducking = true;
        self.duck_started_at = now;
        self.size = Vec2::new(DUCK_WIDTH, DUCK_HEIGHT);
        true
    }

    /// End a duck early (key release)
    pub fn stand(&mut self) {
        self.is_ducking = false;
        self.size = Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT);
    }
}

/// Timed linear slide of an obstacle after it hits the player
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Knockback {
    pub initial_x: f32,
    pub target_x: f32,
    pub started_at: f32,
    pub duration: f32,
}

/// A hazard scrolling toward the player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    /// Anchor point: the head extends right of it, the body left of it
    pub pos: Vec2,
    pub size: Vec2,
    pub hit_player: bool,
    pub hit_time: f32,
    pub knockback: Option<Knockback>,
}

impl Obstacle {
    pub fn new(id: u32, pos: Vec2, size: Vec2) -> Self {
        Self {
            id,
            pos,
            size,
            hit_player: false,
            hit_time: 0.0,
            knockback: None,
        }
    }

    /// Narrow upright spike at the anchor
    pub fn head_box(&self) -> Rect {
        Rect::from_edges(
            self.pos.x,
            self.pos.x + self.size.x * 0.2,
            self.pos.y - self.size.y * 0.3,
            self.pos.y + self.size.y * 0.5,
        )
    }

    /// Long flat slab trailing left of the anchor
    pub fn body_box(&self) -> Rect {
        Rect::from_edges(
            self.pos.x - self.size.x * 1.5,
            self.pos.x,
            self.pos.y + self.size.y * 0.05,
            self.pos.y + self.size.y * 0.2,
        )
    }

    /// True while the post-hit immunity window is open at `now`
    pub fn is_immune(&self, now: f32) -> bool {
        self.hit_player && now - self.hit_time < HIT_IMMUNITY
    }

    pub fn mark_hit(&mut self, now: f32) {
        self.hit_player = true;
        self.hit_time = now;
    }

    /// Clear the hit flag once the immunity window has elapsed
    pub fn update_hit_status(&mut self, now: f32) {
        if self.hit_player && now - self.hit_time >= HIT_IMMUNITY {
            self.hit_player = false;
        }
    }

    pub fn start_knockback(&mut self, now: f32, distance: f32, duration: f32) {
        self.knockback = Some(Knockback {
            initial_x: self.pos.x,
            target_x: self.pos.x + distance,
            started_at: now,
            duration,
        });
    }
}

/// A scoring pickup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collectable {
    pub id: u32,
    /// Center
    pub pos: Vec2,
    pub radius: f32,
}

impl Collectable {
    /// Spin angle in degrees at `rate` degrees per second (presentation only)
    pub fn spin(&self, now: f32, rate: f32) -> f32 {
        (now * rate) % 360.0
    }
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// Halves scroll speed for a while
    Slow,
    /// Ignores obstacle hits for a while
    Invincibility,
}

impl PowerUpKind {
    /// Fair coin flip between the two kinds
    pub fn random(rng: &mut impl Rng) -> Self {
        if rng.random_bool(0.5) {
            PowerUpKind::Slow
        } else {
            PowerUpKind::Invincibility
        }
    }

    /// Start this power-up's timed effect
    pub fn apply(self, effects: &mut ActiveEffects, player: &mut Player, now: f32, tuning: &Tuning) {
        match self {
            PowerUpKind::Slow => {
                effects.slow_until = Some(now + tuning.slow_duration);
            }
            PowerUpKind::Invincibility => {
                player.invincible = true;
                effects.invincible_until = Some(now + tuning.invincibility_duration);
            }
        }
    }
}

/// A power-up pickup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: u32,
    /// Bottom-left corner
    pub pos: Vec2,
    pub size: f32,
    pub kind: PowerUpKind,
}

impl PowerUp {
    pub fn hitbox(&self) -> Rect {
        Rect::from_origin_size(self.pos, Vec2::splat(self.size))
    }

    /// Vertical bob for drawing (presentation only)
    pub fn bob_offset(&self, now: f32) -> f32 {
        BOB_AMPLITUDE * (now * 2.0).sin()
    }
}

/// Deadlines of the running timed effects
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActiveEffects {
    pub invincible_until: Option<f32>,
    pub slow_until: Option<f32>,
    /// Scroll is frozen after a hit until this time
    pub stall_until: Option<f32>,
}

impl ActiveEffects {
    /// Drop every effect whose deadline has passed
    pub fn expire(&mut self, now: f32, player: &mut Player) {
        for deadline in [
            &mut self.invincible_until,
            &mut self.slow_until,
            &mut self.stall_until,
        ] {
            if deadline.is_some_and(|t| now >= t) {
                *deadline = None;
            }
        }
        player.invincible = self.invincible_until.is_some();
    }

    pub fn stalled(&self) -> bool {
        self.stall_until.is_some()
    }

    pub fn slowed(&self) -> bool {
        self.slow_until.is_some()
    }
}

/// Ordered live entity lists, in spawn order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityRegistry {
    pub obstacles: Vec<Obstacle>,
    pub collectables: Vec<Collectable>,
    pub power_ups: Vec<PowerUp>,
    next_id: u32,
}

impl EntityRegistry {
    fn next_entity_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    pub fn spawn_obstacle(&mut self, pos: Vec2, size: Vec2) -> u32 {
        let id = self.next_entity_id();
        self.obstacles.push(Obstacle::new(id, pos, size));
        id
    }

    pub fn spawn_collectable(&mut self, pos: Vec2, radius: f32) -> u32 {
        let id = self.next_entity_id();
        self.collectables.push(Collectable { id, pos, radius });
        id
    }

    pub fn spawn_power_up(&mut self, pos: Vec2, kind: PowerUpKind) -> u32 {
        let id = self.next_entity_id();
        self.power_ups.push(PowerUp {
            id,
            pos,
            size: POWER_UP_SIZE,
            kind,
        });
        id
    }

    /// Remove pickups (and optionally obstacles) whose anchor passed `bound`.
    /// Returns how many were removed.
    pub fn despawn_passed(&mut self, bound: f32, include_obstacles: bool) -> usize {
        let before = self.len();
        if include_obstacles {
            self.obstacles.retain(|o| o.pos.x >= bound);
        }
        self.collectables.retain(|c| c.pos.x >= bound);
        self.power_ups.retain(|p| p.pos.x >= bound);
        before - self.len()
    }

    pub fn len(&self) -> usize {
        self.obstacles.len() + self.collectables.len() + self.power_ups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Complete session state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub tuning: Tuning,
    pub phase: GamePhase,
    pub health: u32,
    /// Only ever grows
    pub score: u64,
    /// Session seconds since the first tick
    pub elapsed: f32,
    /// Whole seconds left on the countdown
    pub remaining: u32,
    /// Time toward the next countdown second
    pub(crate) second_accumulator: f32,
    /// Countdown value at which the last speed-up fired
    pub last_speed_up_at: Option<u32>,
    /// Permanent scroll speed (grows every interval)
    pub base_speed: f32,
    /// Effective scroll speed this tick
    pub speed: f32,
    pub effects: ActiveEffects,
    pub player: Player,
    pub entities: EntityRegistry,
    pub timers: SpawnTimers,
    /// Events raised since the last drain
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    pub(crate) rng: Pcg32,
}

impl GameState {
    /// Create a new arcade session with the given seed
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        let mut state = Self {
            seed,
            phase: GamePhase::Playing,
            health: tuning.starting_health,
            score: 0,
            elapsed: 0.0,
            remaining: tuning.total_time,
            second_accumulator: 0.0,
            last_speed_up_at: None,
            base_speed: tuning.base_speed,
            speed: tuning.base_speed,
            effects: ActiveEffects::default(),
            player: Player::new(PLAYER_START_X),
            entities: EntityRegistry::default(),
            timers: SpawnTimers::default(),
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            tuning,
        };

        if state.tuning.spawn_policy == SpawnPolicy::TwinSlots {
            spawner::reset_slots(&mut state);
        }

        state
    }

    /// Seconds left as a continuous value (total minus elapsed)
    pub fn time_left(&self) -> f32 {
        (self.tuning.total_time as f32 - self.elapsed).max(0.0)
    }

    /// Expire finished effects and recompute the effective scroll speed
    pub fn refresh_speed(&mut self, now: f32) {
        self.effects.expire(now, &mut self.player);
        self.speed = if self.effects.stalled() {
            0.0
        } else if self.effects.slowed() {
            self.base_speed * self.tuning.slow_factor
        } else {
            self.base_speed
        };
    }

    /// Take all events raised since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_defaults() {
        let state = GameState::new(7);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.health, 5);
        assert_eq!(state.remaining, 90);
        assert_eq!(state.speed, 0.01);
        assert!(state.entities.is_empty());
        assert_eq!(state.player.pos, Vec2::new(PLAYER_START_X, PLAYER_BASELINE_Y));
    }

    #[test]
    fn test_classic_session_starts_with_two_slots() {
        let state = GameState::with_tuning(7, Tuning::classic());
        assert_eq!(state.entities.obstacles.len(), 2);
        assert_eq!(state.entities.collectables.len(), 1);
        assert_eq!(state.remaining, 60);
    }

    #[test]
    fn test_time_left_counts_down_to_zero() {
        let mut state = GameState::new(7);
        assert_eq!(state.time_left(), 90.0);
        state.elapsed = 30.5;
        assert_eq!(state.time_left(), 59.5);
        state.elapsed = 95.0;
        assert_eq!(state.time_left(), 0.0);
    }

    #[test]
    fn test_jump_is_not_reentrant() {
        let mut player = Player::new(0.7);
        assert!(player.jump(1.0));
        assert!(!player.jump(2.0));
        assert_eq!(player.jump_started_at, 1.0);
    }

    #[test]
    fn test_duck_is_not_reentrant() {
        let mut player = Player::new(0.7);
        assert!(player.duck(1.0));
        assert!(!player.duck(1.5));
        assert_eq!(player.duck_started_at, 1.0);
        assert_eq!(player.size, Vec2::new(DUCK_WIDTH, DUCK_HEIGHT));
        player.stand();
        assert!(!player.is_ducking);
        assert_eq!(player.size, Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT));
    }

    #[test]
    fn test_jump_and_duck_may_overlap() {
        let mut player = Player::new(0.7);
        assert!(player.duck(0.0));
        assert!(player.jump(0.1));
        assert!(player.is_ducking && player.is_jumping);
    }

    #[test]
    fn test_obstacle_hitboxes() {
        let obstacle = Obstacle::new(1, Vec2::new(2.0, 0.2), Vec2::new(0.1, 0.1));
        let head = obstacle.head_box();
        let body = obstacle.body_box();
        assert!((head.right() - 2.02).abs() < 1e-6);
        assert!((head.bottom() - 0.17).abs() < 1e-6);
        assert!((body.left() - 1.85).abs() < 1e-6);
        assert_eq!(body.right(), 2.0);
        assert!((body.top() - 0.22).abs() < 1e-6);
    }

    #[test]
    fn test_immunity_window() {
        let mut obstacle = Obstacle::new(1, Vec2::new(2.0, 0.2), Vec2::new(0.1, 0.1));
        obstacle.mark_hit(4.0);
        assert!(obstacle.is_immune(4.0));
        assert!(obstacle.is_immune(4.49));
        assert!(!obstacle.is_immune(4.5));

        obstacle.update_hit_status(4.25);
        assert!(obstacle.hit_player);
        obstacle.update_hit_status(4.5);
        assert!(!obstacle.hit_player);
    }

    #[test]
    fn test_effects_expire_and_speed_recovers() {
        let mut state = GameState::new(1);
        state.effects.stall_until = Some(2.0);
        state.refresh_speed(1.5);
        assert_eq!(state.speed, 0.0);
        state.refresh_speed(2.0);
        assert_eq!(state.speed, state.base_speed);
    }

    #[test]
    fn test_slow_power_up_halves_speed() {
        let mut state = GameState::new(1);
        let tuning = state.tuning.clone();
        PowerUpKind::Slow.apply(&mut state.effects, &mut state.player, 0.0, &tuning);
        state.refresh_speed(0.0);
        assert!((state.speed - 0.005).abs() < 1e-7);
        state.refresh_speed(tuning.slow_duration);
        assert_eq!(state.speed, 0.01);
    }

    #[test]
    fn test_invincibility_power_up_expires() {
        let mut state = GameState::new(1);
        let tuning = state.tuning.clone();
        PowerUpKind::Invincibility.apply(&mut state.effects, &mut state.player, 3.0, &tuning);
        assert!(state.player.invincible);
        state.refresh_speed(12.9);
        assert!(state.player.invincible);
        state.refresh_speed(13.0);
        assert!(!state.player.invincible);
    }

    #[test]
    fn test_pickup_presentation_helpers() {
        let power_up = PowerUp {
            id: 1,
            pos: Vec2::ZERO,
            size: POWER_UP_SIZE,
            kind: PowerUpKind::Slow,
        };
        assert_eq!(power_up.bob_offset(0.0), 0.0);
        for t in [0.3, 1.7, 42.0] {
            assert!(power_up.bob_offset(t).abs() <= BOB_AMPLITUDE);
        }

        let collectable = Collectable {
            id: 2,
            pos: Vec2::ZERO,
            radius: COLLECTABLE_RADIUS,
        };
        let arcade = Tuning::arcade().collectable_spin_rate;
        let classic = Tuning::classic().collectable_spin_rate;
        assert!((collectable.spin(SIM_DT, arcade) - 1.0).abs() < 1e-4);
        assert!((collectable.spin(SIM_DT, classic) - 10.0).abs() < 1e-3);
        assert!(collectable.spin(100.0, classic) < 360.0);

        // Bob phase advances 2 rad/s, so one full period takes pi seconds
        let peak = std::f32::consts::FRAC_PI_4;
        assert!((power_up.bob_offset(peak) - BOB_AMPLITUDE).abs() < 1e-6);
        assert!(power_up.bob_offset(std::f32::consts::PI).abs() < 1e-6);
    }

    #[test]
    fn test_registry_ids_and_despawn() {
        let mut registry = EntityRegistry::default();
        let a = registry.spawn_obstacle(Vec2::new(-1.0, 0.1), Vec2::splat(0.1));
        let b = registry.spawn_collectable(Vec2::new(1.0, 0.2), COLLECTABLE_RADIUS);
        let c = registry.spawn_power_up(Vec2::new(-0.6, 0.2), PowerUpKind::Slow);
        assert!(a < b && b < c);

        assert_eq!(registry.despawn_passed(DESPAWN_X, false), 1);
        assert_eq!(registry.obstacles.len(), 1);
        assert_eq!(registry.despawn_passed(DESPAWN_X, true), 1);
        assert_eq!(registry.len(), 1);
    }
}
