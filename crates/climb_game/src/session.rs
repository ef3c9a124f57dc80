//! One play session: a shared collision map, one or two controlled bodies
//! with their own cameras, the countdown, and the outcome once play ends.
//!
//! Per tick, in order: each player's actions are read from its binding table,
//! its body is stepped and the resulting events are forwarded to audio, its
//! zoom and camera are eased; then the background track is matched to the
//! highest body; then the outcome is checked. Time running out takes
//! precedence over any goal reached on the same tick.
//!
//! Cameras start snapped onto their player's spawn instead of easing in from
//! the map origin, so the first frame already frames the body.

use std::sync::Arc;

use climb_core::input::{ControlBindings, InputState};
use climb_core::time::SessionTimer;
use glam::Vec2;
use serde::Deserialize;

use crate::audio::{wind_volume, AudioSink, BgmTrack, MovementEvent, PlayerId};
use crate::camera::{Camera, CameraPose, SmoothedZoom};
use crate::collision::CollisionMap;
use crate::config::{validate_spawns, CameraConfig, GameConfig};
use crate::controller::{BodyPose, FacingMode, MovementController, PhysicsBody};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayMode {
    #[default]
    Single,
    Split,
}

impl PlayMode {
    pub fn player_count(self) -> usize {
        match self {
            Self::Single => 1,
            Self::Split => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    TimeOver,
    Goal,
    Winner(PlayerId),
    Draw,
}

impl SessionOutcome {
    pub fn message(self) -> String {
        match self {
            Self::TimeOver => "TIME OVER!".to_string(),
            Self::Goal => "GOAL! YOU MADE IT!".to_string(),
            Self::Winner(id) => format!("{}P WINS! (Goal Reached)", id + 1),
            Self::Draw => "DRAW! Both players reached the goal!".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub body: PhysicsBody,
    pub bindings: ControlBindings,
    pub camera: Camera,
    pub zoom: SmoothedZoom,
    events: Vec<MovementEvent>,
}

impl Player {
    /// Events raised by this player's most recent tick.
    pub fn last_events(&self) -> &[MovementEvent] {
        &self.events
    }
}

/// Render-facing snapshot of one player.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerPose {
    pub id: PlayerId,
    pub body: BodyPose,
    pub camera: CameraPose,
}

pub struct Session {
    mode: PlayMode,
    map: Arc<CollisionMap>,
    controller: MovementController,
    camera_config: CameraConfig,
    facing_mode: FacingMode,
    timer: SessionTimer,
    players: Vec<Player>,
    current_bgm: Option<BgmTrack>,
    outcome: Option<SessionOutcome>,
    ticks: u64,
}

impl Session {
    pub fn new(config: &GameConfig, mode: PlayMode, map: Arc<CollisionMap>) -> Result<Self, String> {
        let count = mode.player_count();
        if config.bindings.len() < count || config.spawn_x.len() < count {
            return Err(format!(
                "{mode:?} mode needs {count} binding tables and spawn columns, config has {} and {}",
                config.bindings.len(),
                config.spawn_x.len()
            ));
        }
        validate_spawns(config, count, map.width(), map.height())?;

        let base_width = match mode {
            PlayMode::Single => config.camera.base_width_single,
            PlayMode::Split => config.camera.base_width_split,
        };
        let map_size = Vec2::new(map.width() as f32, map.height() as f32);

        let players = (0..count)
            .map(|id| {
                let body = PhysicsBody::spawn(&config.movement, config.spawn_x[id], config.spawn_y);
                let mut camera = Camera::new(base_width, config.camera.base_height, map_size);
                camera.snap_to(body_corner(&body), body_half_size(&body), 1.0);
                Player {
                    id,
                    body,
                    bindings: config.bindings[id].clone(),
                    camera,
                    zoom: SmoothedZoom::new(config.camera.zoom_smoothing),
                    events: Vec::new(),
                }
            })
            .collect();

        log::info!(
            "Session started: {:?}, spawns {:?} at y={}, goal y={}, {}s limit",
            mode,
            &config.spawn_x[..count],
            config.spawn_y,
            config.goal_y,
            config.time_limit_secs
        );

        Ok(Self {
            mode,
            map,
            controller: MovementController::new(config.movement, config.goal_y),
            camera_config: config.camera.clone(),
            facing_mode: config.movement.facing_mode,
            timer: SessionTimer::new(config.time_limit_secs),
            players,
            current_bgm: None,
            outcome: None,
            ticks: 0,
        })
    }

    pub fn mode(&self) -> PlayMode {
        self.mode
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn outcome(&self) -> Option<SessionOutcome> {
        self.outcome
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn timer(&self) -> SessionTimer {
        self.timer
    }

    /// Highest body bottom edge across all players.
    pub fn highest_altitude(&self) -> f32 {
        self.players
            .iter()
            .map(|p| p.body.y)
            .fold(f32::NEG_INFINITY, f32::max)
    }

    /// Advance one fixed tick. Once an outcome is reached the session is
    /// frozen and every later call returns it unchanged.
    pub fn tick<A>(&mut self, input: &InputState, elapsed_secs: f64, audio: &mut A) -> Option<SessionOutcome>
    where
        A: AudioSink + ?Sized,
    {
        if self.outcome.is_some() {
            return self.outcome;
        }
        self.ticks += 1;

        for player in self.players.iter_mut() {
            let actions = player.bindings.actions(input);
            player.events.clear();
            self.controller
                .step(&mut player.body, actions, &self.map, &mut player.events);
            for &event in &player.events {
                audio.play(player.id, event);
            }
            audio.set_wind_volume(player.id, wind_volume(player.body.vy));

            let target_zoom = if actions.zoom_out {
                self.camera_config.zoom_out_scale
            } else {
                1.0
            };
            let zoom = player.zoom.approach(target_zoom);
            player.camera.update(
                body_corner(&player.body),
                body_half_size(&player.body),
                self.camera_config.smoothing,
                zoom,
            );
        }

        let track = BgmTrack::for_height(self.highest_altitude());
        if self.current_bgm != Some(track) {
            audio.switch_bgm(track);
            self.current_bgm = Some(track);
        }

        let outcome = self.check_outcome(elapsed_secs);
        if let Some(outcome) = outcome {
            self.outcome = Some(outcome);
            audio.stop_bgm();
            log::info!(
                "Session over after {} ticks: {}",
                self.ticks,
                outcome.message()
            );
        }
        outcome
    }

    fn check_outcome(&self, elapsed_secs: f64) -> Option<SessionOutcome> {
        if self.timer.is_expired(elapsed_secs) {
            return Some(SessionOutcome::TimeOver);
        }
        let reached: Vec<bool> = self.players.iter().map(|p| p.body.goal_reached).collect();
        match (self.mode, reached.as_slice()) {
            (PlayMode::Single, [true]) => Some(SessionOutcome::Goal),
            (PlayMode::Split, [true, true]) => Some(SessionOutcome::Draw),
            (PlayMode::Split, [true, false]) => Some(SessionOutcome::Winner(0)),
            (PlayMode::Split, [false, true]) => Some(SessionOutcome::Winner(1)),
            _ => None,
        }
    }

    pub fn poses(&self) -> Vec<PlayerPose> {
        self.players
            .iter()
            .map(|p| PlayerPose {
                id: p.id,
                body: p.body.pose(self.facing_mode),
                camera: p.camera.pose(),
            })
            .collect()
    }

    pub fn hud_timer_label(&self, elapsed_secs: f64) -> String {
        self.timer.label(elapsed_secs)
    }
}

fn body_corner(body: &PhysicsBody) -> Vec2 {
    Vec2::new(body.x, body.y)
}

fn body_half_size(body: &PhysicsBody) -> Vec2 {
    Vec2::new(body.width, body.height) * 0.5
}
