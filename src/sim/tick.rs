//! Fixed timestep simulation tick
//!
//! Advances one session by one step: input, spawning, motion, collisions,
//! then the countdown and win/lose checks.

use glam::Vec2;

use super::rect::Rect;
use super::state::{GameEvent, GamePhase, GameState};
use super::{collision, motion, spawner};
use crate::consts::*;

/// How far ahead (in ticks of travel at the current speed) autopilot looks
const AUTOPILOT_LOOKAHEAD_TICKS: f32 = 30.0;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Start a jump
    pub jump: bool,
    /// Start a duck
    pub duck: bool,
    /// Stop a held duck
    pub duck_released: bool,
    /// Autopilot - AI plays the game
    pub autopilot: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if state.phase.is_terminal() {
        return;
    }

    state.elapsed += dt;
    let now = state.elapsed;

    let mut input = input.clone();
    if input.autopilot {
        autopilot(state, &mut input);
    }
    apply_input(state, &input, now);

    spawner::update(state, dt);
    state.refresh_speed(now);
    motion::advance(state, now);
    collision::resolve(state, now);

    advance_countdown(state, dt);
    update_phase(state);
}

fn apply_input(state: &mut GameState, input: &TickInput, now: f32) {
    if input.jump && state.player.jump(now) {
        log::trace!("Jump at t={now:.3}");
    }
    if input.duck && state.player.duck(now) {
        log::trace!("Duck at t={now:.3}");
    }
    // Timed ducks ignore release
    if input.duck_released && state.tuning.duck_duration.is_none() && state.player.is_ducking {
        state.player.stand();
    }
}

/// Tick the whole-second countdown and fire interval speed-ups
fn advance_countdown(state: &mut GameState, dt: f32) {
    state.second_accumulator += dt;
    while state.second_accumulator >= 1.0 {
        state.second_accumulator -= 1.0;

        let frozen = state.tuning.pause_countdown_while_invincible && state.player.invincible;
        if frozen || state.remaining == 0 {
            continue;
        }
        state.remaining -= 1;

        let interval = state.tuning.speed_up_interval;
        if interval > 0
            && state.remaining > 0
            && state.remaining % interval == 0
            && state.last_speed_up_at != Some(state.remaining)
        {
            state.last_speed_up_at = Some(state.remaining);
            state.base_speed += state.tuning.speed_up_increment;
            state.refresh_speed(state.elapsed);
            state.events.push(GameEvent::SpeedUp {
                base_speed: state.base_speed,
            });
            log::info!(
                "Speed up to {:.3} with {}s left",
                state.base_speed,
                state.remaining
            );
        }
    }
}

/// Running out the clock wins even if the last hit landed on the same tick
fn update_phase(state: &mut GameState) {
    let (phase, event) = if state.remaining == 0 {
        (GamePhase::Won, GameEvent::Won)
    } else if state.health == 0 {
        (GamePhase::Lost, GameEvent::Lost)
    } else {
        return;
    };

    state.phase = phase;
    state.events.push(event);
    log::info!(
        "Session over: {phase:?} with score {} at t={:.2}",
        state.score,
        state.elapsed
    );
}

/// Vertical band overlap only; x is handled by the lookahead window
fn shares_band(a: &Rect, b: &Rect) -> bool {
    a.bottom() < b.top() && a.top() > b.bottom()
}

/// Simple AI: jump over low obstacles, duck under ones it can clear
fn autopilot(state: &GameState, input: &mut TickInput) {
    let player = &state.player;
    let baseline = Vec2::new(player.pos.x, PLAYER_BASELINE_Y);
    let standing = Rect::from_origin_size(baseline, Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT));
    let ducked = Rect::from_origin_size(baseline, Vec2::new(DUCK_WIDTH, DUCK_HEIGHT));
    let lookahead = state.speed.max(state.base_speed) * AUTOPILOT_LOOKAHEAD_TICKS;

    let threat = state.entities.obstacles.iter().find(|o| {
        let head = o.head_box();
        let body = o.body_box();
        let gap = body.left() - standing.right();
        head.right() > standing.left()
            && gap <= lookahead
            && (shares_band(&standing, &head) || shares_band(&standing, &body))
    });

    let Some(obstacle) = threat else {
        if player.is_ducking {
            input.duck_released = true;
        }
        return;
    };

    let duck_clears =
        !shares_band(&ducked, &obstacle.head_box()) && !shares_band(&ducked, &obstacle.body_box());
    if duck_clears {
        input.duck = !player.is_ducking;
    } else if !player.is_jumping {
        input.jump = true;
    }
}
