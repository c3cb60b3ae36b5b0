//! Fixed-step tick driver
//!
//! Owns one session, a clock and an audio sink. Each frame reads the clock,
//! runs as many fixed ticks as the elapsed time allows, and forwards the
//! simulation's events to audio. Rendering is a read-only view of state.

use crate::audio::{AudioSink, SoundEffect};
use crate::consts::*;
use crate::platform::{Clock, InputQueue};
use crate::sim::{GameEvent, GamePhase, GameState, tick};

/// Largest frame delta fed to the accumulator
const MAX_FRAME_DT: f32 = 0.1;

/// Something that draws the current state
pub trait RenderSink {
    fn present(&mut self, state: &GameState);
}

/// Renders the HUD and terminal screens as log lines
#[derive(Debug, Default)]
pub struct LogRenderer {
    last_second: Option<u32>,
    shown_terminal: bool,
}

impl RenderSink for LogRenderer {
    fn present(&mut self, state: &GameState) {
        match state.phase {
            GamePhase::Playing => {
                if self.last_second == Some(state.remaining) {
                    return;
                }
                self.last_second = Some(state.remaining);
                log::info!("{}", hud_line(state));
                log_pickups(state);
            }
            GamePhase::Lost | GamePhase::Won if !self.shown_terminal => {
                self.shown_terminal = true;
                let banner = if state.phase == GamePhase::Lost {
                    "YOU DIED"
                } else {
                    "YOU WIN"
                };
                log::info!("{banner} - final score {}", state.score);
            }
            _ => {}
        }
    }
}

/// One-line HUD. `Time` is the countdown; `Run` is wall session time left,
/// which drifts below it while the countdown is frozen.
fn hud_line(state: &GameState) -> String {
    format!(
        "Health {} | Score {} | Time {}s | Run {:.1}s | Speed {:.3}{}",
        state.health,
        state.score,
        state.remaining,
        state.time_left(),
        state.speed,
        if state.player.invincible { " | INVINCIBLE" } else { "" }
    )
}

/// Where each pickup would be drawn this frame
fn log_pickups(state: &GameState) {
    let now = state.elapsed;
    for c in &state.entities.collectables {
        log::debug!(
            "Collectable {} at ({:.2}, {:.2}) spin {:.0}",
            c.id,
            c.pos.x,
            c.pos.y,
            c.spin(now, state.tuning.collectable_spin_rate)
        );
    }
    for p in &state.entities.power_ups {
        log::debug!(
            "{:?} power-up {} at ({:.2}, {:.2})",
            p.kind,
            p.id,
            p.pos.x,
            p.pos.y + p.bob_offset(now)
        );
    }
}

/// Drives one session in real (or manual) time
pub struct Runner<C: Clock, A: AudioSink> {
    pub state: GameState,
    clock: C,
    audio: A,
    accumulator: f32,
    last_time: Option<f32>,
}

impl<C: Clock, A: AudioSink> Runner<C, A> {
    pub fn new(state: GameState, clock: C, audio: A) -> Self {
        Self {
            state,
            clock,
            audio,
            accumulator: 0.0,
            last_time: None,
        }
    }

    /// Start the music and the frame clock
    pub fn start(&mut self) {
        self.audio.start_music();
        self.last_time = Some(self.clock.now());
        log::info!(
            "Session started (seed {}, {:?} spawns, {}s)",
            self.state.seed,
            self.state.tuning.spawn_policy,
            self.state.tuning.total_time
        );
    }

    /// Run simulation ticks for the time since the last frame.
    /// Returns the number of ticks run.
    pub fn frame(&mut self, input: &mut InputQueue) -> u32 {
        let now = self.clock.now();
        let dt = (now - self.last_time.unwrap_or(now)).clamp(0.0, MAX_FRAME_DT);
        self.last_time = Some(now);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            tick(&mut self.state, input.current(), SIM_DT);
            self.dispatch_events();
            self.accumulator -= SIM_DT;
            substeps += 1;

            // Clear one-shot inputs after processing
            input.clear_edges();
        }
        substeps
    }

    /// Forward simulation events to audio
    fn dispatch_events(&mut self) {
        for event in self.state.drain_events() {
            match event {
                GameEvent::Collision { .. } => self.audio.play(SoundEffect::Collision),
                GameEvent::Lost => {
                    self.audio.stop_music();
                    self.audio.play(SoundEffect::Lose);
                }
                GameEvent::Won => {
                    self.audio.stop_music();
                    self.audio.play(SoundEffect::Win);
                }
                GameEvent::Collected { .. }
                | GameEvent::PowerUpCollected(_)
                | GameEvent::SpeedUp { .. } => {}
            }
        }
    }

    pub fn render(&self, sink: &mut impl RenderSink) {
        sink.present(&self.state);
    }

    pub fn is_finished(&self) -> bool {
        self.state.phase.is_terminal()
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{InputEvent, ManualClock};
    use crate::tuning::Tuning;
    use glam::Vec2;

    /// Sink that records every trigger
    #[derive(Debug, Default)]
    struct RecordingSink {
        calls: Vec<String>,
    }

    impl AudioSink for RecordingSink {
        fn play(&mut self, effect: SoundEffect) {
            self.calls.push(format!("play {effect:?}"));
        }

        fn start_music(&mut self) {
            self.calls.push("start music".to_string());
        }

        fn stop_music(&mut self) {
            self.calls.push("stop music".to_string());
        }
    }

    fn quiet_state(seed: u64) -> GameState {
        GameState::with_tuning(
            seed,
            Tuning {
                obstacle_period: 1e9,
                collectable_period: 1e9,
                power_up_period: 1e9,
                ..Tuning::arcade()
            },
        )
    }

    #[test]
    fn test_frame_runs_ticks_for_elapsed_time() {
        let clock = ManualClock::new();
        let mut runner = Runner::new(quiet_state(1), clock.clone(), RecordingSink::default());
        let mut input = InputQueue::default();
        runner.start();

        assert_eq!(runner.frame(&mut input), 0);
        clock.advance(SIM_DT * 3.5);
        assert_eq!(runner.frame(&mut input), 3);
        clock.advance(SIM_DT * 0.75);
        assert_eq!(runner.frame(&mut input), 1);
    }

    #[test]
    fn test_long_frame_is_capped() {
        let clock = ManualClock::new();
        let mut runner = Runner::new(quiet_state(1), clock.clone(), RecordingSink::default());
        let mut input = InputQueue::default();
        runner.start();

        clock.advance(10.0);
        assert_eq!(runner.frame(&mut input), 6);
    }

    #[test]
    fn test_jump_applied_once() {
        let clock = ManualClock::new();
        let mut runner = Runner::new(quiet_state(1), clock.clone(), RecordingSink::default());
        let mut input = InputQueue::default();
        runner.start();

        input.push(InputEvent::JumpPressed);
        clock.advance(SIM_DT * 2.0);
        runner.frame(&mut input);
        assert!(runner.state.player.is_jumping);
        assert!(!input.current().jump);
    }

    #[test]
    fn test_events_reach_audio() {
        let clock = ManualClock::new();
        let mut state = quiet_state(1);
        state.health = 1;
        state
            .entities
            .spawn_obstacle(Vec2::new(0.85, 0.1), Vec2::splat(0.1));
        let mut runner = Runner::new(state, clock.clone(), RecordingSink::default());
        let mut input = InputQueue::default();
        runner.start();

        clock.advance(SIM_DT);
        runner.frame(&mut input);

        assert!(runner.is_finished());
        assert_eq!(
            runner.audio().calls,
            vec!["start music", "play Collision", "stop music", "play Lose"]
        );
    }

    #[test]
    fn test_hud_line() {
        let mut state = quiet_state(1);
        state.elapsed = 12.3;
        state.remaining = 80;
        state.player.invincible = true;
        assert_eq!(
            hud_line(&state),
            "Health 5 | Score 0 | Time 80s | Run 77.7s | Speed 0.010 | INVINCIBLE"
        );
    }

    #[test]
    fn test_log_renderer_reports_terminal_once() {
        let mut renderer = LogRenderer::default();
        let mut state = quiet_state(1);
        renderer.present(&state);
        assert_eq!(renderer.last_second, Some(90));

        state.phase = GamePhase::Won;
        renderer.present(&state);
        renderer.present(&state);
        assert!(renderer.shown_terminal);
    }
}
