//! Lane Dash entry point
//!
//! Runs one session with the HUD in the log. The autopilot plays unless
//! `--manual` is given; key names typed on stdin (`up`, `down`, `release`)
//! are fed to the player either way. `--headless` runs on a manual clock
//! as fast as possible.

use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use clap::Parser;
use lane_dash::audio::{self, AudioManager};
use lane_dash::consts::*;
use lane_dash::platform::{Clock, InputEvent, InputQueue, ManualClock, SystemClock};
use lane_dash::sim::GameState;
use lane_dash::{LogRenderer, Runner, Settings, Tuning};

/// Optional tuning overrides beside the binary
const TUNING_FILE: &str = "lane_dash_tuning.json";
/// Directory holding the sound files
const SOUND_DIR: &str = "sounds";

/// Lane Dash
#[derive(Parser, Debug)]
#[command(name = "lane-dash", version, about = "A side-scrolling lane runner")]
struct Cli {
    /// Tuning preset (arcade or classic). Defaults to the saved setting.
    preset: Option<String>,

    /// Session seed. Defaults to the current time.
    seed: Option<u64>,

    /// Run on a manual clock as fast as possible, without key input
    #[arg(long)]
    headless: bool,

    /// Turn the autopilot off and play from stdin
    #[arg(long, conflicts_with = "headless")]
    manual: bool,

    /// JSON file with tuning overrides
    #[arg(long, value_name = "PATH", default_value = TUNING_FILE)]
    tuning: PathBuf,

    /// Directory holding the sound files
    #[arg(long, value_name = "DIR", default_value = SOUND_DIR)]
    sounds: PathBuf,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    log::info!("Lane Dash starting...");

    let settings_path = Path::new(Settings::FILE_NAME);
    let settings = if settings_path.exists() {
        Settings::load(settings_path)
    } else {
        let settings = Settings::default();
        settings.save(settings_path);
        settings
    };

    let preset = cli.preset.as_deref().unwrap_or(&settings.preset);
    let tuning = Tuning::preset(preset).unwrap_or_else(|| {
        log::warn!("Unknown preset '{preset}', using arcade");
        Tuning::arcade()
    });
    let tuning = if cli.tuning.exists() {
        Tuning::load(&cli.tuning, tuning)
    } else {
        tuning
    };

    let seed = cli.seed.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    });
    log::info!("Game initialized with seed: {seed}");

    // Sounds decode in the background while the session is set up
    let sounds = audio::preload(cli.sounds.clone());

    let mut audio = AudioManager::new();
    audio.apply_settings(&settings);
    match sounds.join() {
        Ok(bank) => audio.set_bank(bank),
        Err(_) => log::warn!("Sound loading thread panicked - running without sounds"),
    }

    let state = GameState::with_tuning(seed, tuning);
    let mut input = InputQueue::default();
    input.set_autopilot(settings.autopilot && !cli.manual);

    if cli.headless {
        let clock = ManualClock::new();
        let pace = clock.clone();
        run(Runner::new(state, clock, audio), &mut input, None, move || {
            pace.advance(SIM_DT)
        });
    } else {
        run(
            Runner::new(state, SystemClock::new(), audio),
            &mut input,
            Some(spawn_key_reader()),
            || std::thread::sleep(Duration::from_secs_f32(SIM_DT)),
        );
    }
}

/// Read one key name per stdin line and forward the mapped commands
fn spawn_key_reader() -> Receiver<InputEvent> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            let key = line.trim();
            match InputEvent::from_key(key) {
                Some(event) => {
                    if tx.send(event).is_err() {
                        break;
                    }
                }
                None => log::warn!("Unknown key '{key}'"),
            }
        }
    });
    rx
}

/// Run frames until the session ends, calling `pace` between frames
fn run<C: Clock>(
    mut runner: Runner<C, AudioManager>,
    input: &mut InputQueue,
    keys: Option<Receiver<InputEvent>>,
    mut pace: impl FnMut(),
) {
    let mut renderer = LogRenderer::default();
    runner.start();
    runner.render(&mut renderer);

    while !runner.is_finished() {
        pace();
        if let Some(keys) = &keys {
            for event in keys.try_iter() {
                input.push(event);
            }
        }
        runner.frame(input);
        runner.render(&mut renderer);
    }

    log::info!(
        "Finished after {:.1}s with score {}",
        runner.state.elapsed,
        runner.state.score
    );
}
