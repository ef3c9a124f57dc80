//! Headless runner: loads a game config, its collision map and a replay, then
//! drives a session through the fixed-timestep loop and logs the result.
//!
//!   1. `advance(fixed_dt)` (or `begin_frame()` with `--realtime`) feeds the
//!      accumulator
//!   2. `while should_step()` consumes one replay frame per tick: held keys are
//!      synced, the session ticks, edge-triggered input is cleared
//!   3. The run ends on an outcome, on Escape, or when the replay runs out

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use climb_core::input::{InputState, Key};
use climb_core::time::TimeState;
use climb_game::audio::{LogAudioSink, MovementEvent};
use climb_game::collision::load_collision_map_from_path;
use climb_game::config::load_config_from_path;
use climb_game::replay::load_replay_from_path;
use climb_game::session::{Session, SessionOutcome};

const CONFIG_PATH: &str = "assets/config/climb.json";
const REPLAY_PATH: &str = "assets/replays/opening_climb.json";
const REALTIME_FLAG: &str = "--realtime";

fn usage() -> String {
    format!(
        "Usage: climb_game [config.json] [replay.json] [{REALTIME_FLAG}]\n\
         Defaults: {CONFIG_PATH} {REPLAY_PATH}"
    )
}

fn main() -> Result<(), String> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let realtime = args.iter().any(|a| a == REALTIME_FLAG);
    let positional: Vec<&String> = args.iter().filter(|a| !a.starts_with("--")).collect();
    if positional.len() > 2 || args.iter().any(|a| a.starts_with("--") && a != REALTIME_FLAG) {
        return Err(usage());
    }
    let config_path = positional
        .first()
        .map(|p| PathBuf::from(p.as_str()))
        .unwrap_or_else(|| PathBuf::from(CONFIG_PATH));
    let replay_path = positional
        .get(1)
        .map(|p| PathBuf::from(p.as_str()))
        .unwrap_or_else(|| PathBuf::from(REPLAY_PATH));

    log::info!("Climb runner starting...");

    let config = load_config_from_path(&config_path)?;
    let map = load_collision_map_from_path(Path::new(&config.map_path))?;
    let replay = load_replay_from_path(&replay_path)?;
    let mut session = Session::new(&config, replay.mode, Arc::new(map))?;

    let mut time = TimeState::new();
    time.fixed_dt = replay.fixed_dt;
    let mut input = InputState::new();
    let mut audio = LogAudioSink::new();
    let frames = replay.expanded_keys();
    let mut frames = frames.iter();

    let outcome = 'run: loop {
        if realtime {
            time.begin_frame();
        } else {
            time.advance(time.fixed_dt);
        }

        while time.should_step() {
            let Some(keys) = frames.next() else {
                log::info!("Replay finished");
                break 'run None;
            };
            input.sync_held(keys);
            if input.is_just_pressed(Key::Escape) {
                log::info!("Escape pressed, exiting.");
                break 'run None;
            }
            let outcome = session.tick(&input, time.total_time, &mut audio);
            input.end_frame();
            if outcome.is_some() {
                break 'run outcome;
            }
        }
        time.end_frame();

        if realtime {
            std::thread::sleep(Duration::from_millis(1));
        }
    };

    time.end_frame();
    log_summary(&session, &audio, outcome, &time);
    Ok(())
}

fn log_summary(
    session: &Session,
    audio: &LogAudioSink,
    outcome: Option<SessionOutcome>,
    time: &TimeState,
) {
    let elapsed_secs = time.total_time;
    log::info!(
        "Ran {} ticks ({:.2}s simulated), {}",
        session.ticks(),
        elapsed_secs,
        session.hud_timer_label(elapsed_secs)
    );
    log::info!(
        "Clock: {} frames, {} fixed steps, {} in the last frame, alpha {:.2}",
        time.frame_count,
        time.fixed_step_count,
        time.steps_this_frame,
        time.interpolation_alpha
    );
    for pose in session.poses() {
        let id = pose.id;
        log::info!(
            "{}P: x={:.1} y={:.1} grounded={} goal={} jumps={} wall-jumps={} boosts={}",
            id + 1,
            pose.body.x,
            pose.body.y,
            pose.body.grounded,
            pose.body.goal_reached,
            audio.count(id, MovementEvent::JumpTriggered),
            audio.count(id, MovementEvent::WallJumpTriggered),
            audio.count(id, MovementEvent::BoostATriggered)
                + audio.count(id, MovementEvent::BoostBTriggered)
        );
    }
    match outcome {
        Some(outcome) => log::info!("{}", outcome.message()),
        None => log::info!(
            "No outcome yet, highest altitude {:.1}",
            session.highest_altitude()
        ),
    }
}
