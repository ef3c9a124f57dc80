use climb_core::input::Key;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::session::PlayMode;

/// Scripted key input, one expanded frame per fixed tick.
#[derive(Debug, Deserialize, Clone)]
pub struct ReplaySequence {
    #[serde(default = "default_dt")]
    pub fixed_dt: f64,
    #[serde(default)]
    pub mode: PlayMode,
    pub frames: Vec<ReplayFrame>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReplayFrame {
    /// Keys held during this frame; everything else is released.
    #[serde(default)]
    pub keys: Vec<Key>,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

impl ReplaySequence {
    pub fn expanded_keys(&self) -> Vec<HashSet<Key>> {
        let mut out = Vec::new();
        for frame in &self.frames {
            let held: HashSet<Key> = frame.keys.iter().copied().collect();
            for _ in 0..frame.repeat.max(1) {
                out.push(held.clone());
            }
        }
        out
    }

    pub fn tick_count(&self) -> usize {
        self.frames.iter().map(|f| f.repeat.max(1) as usize).sum()
    }
}

pub fn load_replay_from_path(path: &Path) -> Result<ReplaySequence, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let replay: ReplaySequence = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse replay JSON {}: {e}", path.display()))?;
    validate_replay(&replay)?;
    log::info!(
        "Replay loaded: {} ({:?}, {} ticks)",
        path.display(),
        replay.mode,
        replay.tick_count()
    );
    Ok(replay)
}

fn validate_replay(replay: &ReplaySequence) -> Result<(), String> {
    if !(replay.fixed_dt > 0.0) {
        return Err("Replay validation failed: fixed_dt must be > 0".to_string());
    }
    if replay.frames.is_empty() {
        return Err("Replay validation failed: frames list is empty".to_string());
    }
    Ok(())
}

const fn default_dt() -> f64 {
    1.0 / 60.0
}

const fn default_repeat() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{LogAudioSink, MovementEvent};
    use crate::collision::{CollisionMap, Surface};
    use crate::config::GameConfig;
    use crate::session::{PlayerPose, Session, SessionOutcome};
    use climb_core::input::InputState;
    use std::sync::Arc;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "climb_replay_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    /// Floor, a climbing shaft on the left, and a boost pad on the right.
    fn course() -> Arc<CollisionMap> {
        Arc::new(CollisionMap::from_fn(400, 3000, |x, y| {
            if y < 100 {
                Surface::Solid
            } else if x < 40 && y > 160 && y < 1200 {
                Surface::Solid
            } else if (300..340).contains(&x) && y < 104 {
                Surface::BoostA
            } else {
                Surface::Empty
            }
        }))
    }

    fn run(
        replay: &ReplaySequence,
        map: Arc<CollisionMap>,
    ) -> (Vec<Vec<PlayerPose>>, LogAudioSink, Option<SessionOutcome>) {
        let config = GameConfig {
            goal_y: 2500.0,
            spawn_x: vec![120.0, 200.0],
            spawn_y: 100.0,
            ..GameConfig::default()
        };
        let mut session = Session::new(&config, replay.mode, map).expect("session");
        let mut audio = LogAudioSink::new();
        let mut input = InputState::new();
        let mut trace = Vec::new();
        let mut outcome = None;
        for (tick, keys) in replay.expanded_keys().iter().enumerate() {
            input.sync_held(keys);
            outcome = session.tick(&input, (tick + 1) as f64 * replay.fixed_dt, &mut audio);
            input.end_frame();
            trace.push(session.poses());
        }
        (trace, audio, outcome)
    }

    #[test]
    fn replay_file_parses_and_expands() {
        let path = temp_file_path("parse");
        fs::write(
            &path,
            r#"{
              "fixed_dt": 0.016666667,
              "mode": "split",
              "frames": [
                { "keys": ["D", "Right"], "repeat": 3 },
                { "keys": ["W"] },
                { "repeat": 2 }
              ]
            }"#,
        )
        .expect("write replay file");

        let replay = load_replay_from_path(&path).expect("replay should load");
        assert_eq!(replay.mode, PlayMode::Split);
        let expanded = replay.expanded_keys();
        assert_eq!(expanded.len(), 6);
        assert_eq!(replay.tick_count(), 6);
        assert!(expanded[0].contains(&Key::D) && expanded[0].contains(&Key::Right));
        assert!(expanded[3].contains(&Key::W));
        assert!(expanded[5].is_empty());

        let _ = fs::remove_file(path);
    }

    #[test]
    fn replay_rejects_empty_frames_and_unknown_keys() {
        let path = temp_file_path("invalid");
        fs::write(&path, r#"{ "frames": [] }"#).expect("write replay file");
        let err = load_replay_from_path(&path).expect_err("empty replay must fail");
        assert!(err.contains("frames list is empty"));

        fs::write(&path, r#"{ "frames": [ { "keys": ["F13"] } ] }"#).expect("write replay file");
        let err = load_replay_from_path(&path).expect_err("unknown key must fail");
        assert!(err.contains("Failed to parse replay JSON"));

        let _ = fs::remove_file(path);
    }

    #[test]
    fn replay_run_is_deterministic() {
        let replay: ReplaySequence = serde_json::from_str(
            r#"{
              "mode": "split",
              "frames": [
                { "keys": ["A"], "repeat": 50 },
                { "keys": ["A", "W"], "repeat": 40 },
                { "keys": ["D", "W", "Right"], "repeat": 30 },
                { "keys": ["Right", "Up", "Period"], "repeat": 90 },
                { "keys": ["R"], "repeat": 60 }
              ]
            }"#,
        )
        .expect("replay parses");

        let (trace_a, audio_a, outcome_a) = run(&replay, course());
        let (trace_b, audio_b, outcome_b) = run(&replay, course());

        assert_eq!(trace_a.len(), replay.tick_count());
        assert_eq!(trace_a, trace_b);
        assert_eq!(audio_a.event_counts, audio_b.event_counts);
        assert_eq!(outcome_a, outcome_b);
        assert!(audio_a.count(0, MovementEvent::JumpTriggered) > 0);
    }
}
