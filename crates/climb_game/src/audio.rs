//! Audio boundary. The simulation never plays sound: the movement controller
//! reports what happened through an `EventSink`, and the session forwards those
//! events, a per-player wind volume and background-music zone changes to an
//! `AudioSink` supplied by whoever owns the mixer.

use std::collections::HashMap;
use std::fmt;

/// Index of a controlled body within a session (0 for player one).
pub type PlayerId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MovementEvent {
    JumpTriggered,
    WallJumpTriggered,
    Landed,
    BoostATriggered,
    BoostBTriggered,
}

impl MovementEvent {
    pub fn label(self) -> &'static str {
        match self {
            Self::JumpTriggered => "jump",
            Self::WallJumpTriggered => "wall-jump",
            Self::Landed => "landed",
            Self::BoostATriggered => "boost-a",
            Self::BoostBTriggered => "boost-b",
        }
    }
}

impl fmt::Display for MovementEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Capability the movement controller calls into for side effects.
pub trait EventSink {
    fn emit(&mut self, event: MovementEvent);
}

impl EventSink for Vec<MovementEvent> {
    fn emit(&mut self, event: MovementEvent) {
        self.push(event);
    }
}

/// Background music zones, selected by altitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BgmTrack {
    Original,
    Mid,
    High,
}

impl BgmTrack {
    pub const MID_ALTITUDE: f32 = 9500.0;
    pub const HIGH_ALTITUDE: f32 = 25000.0;

    pub fn for_height(y: f32) -> Self {
        if y < Self::MID_ALTITUDE {
            Self::Original
        } else if y < Self::HIGH_ALTITUDE {
            Self::Mid
        } else {
            Self::High
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Original => "original",
            Self::Mid => "mid",
            Self::High => "high",
        }
    }
}

impl fmt::Display for BgmTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Wind loop volume in `[0, 0.8]`: silent until the body falls faster than
/// one unit per tick, then proportional to fall speed.
pub fn wind_volume(vy: f32) -> f32 {
    const FALL_THRESHOLD: f32 = -1.0;
    const MAX_VOLUME: f32 = 0.8;
    if vy < FALL_THRESHOLD {
        (vy.abs() / 10.0).min(1.0) * MAX_VOLUME
    } else {
        0.0
    }
}

/// Session-facing audio collaborator.
pub trait AudioSink {
    fn play(&mut self, player: PlayerId, event: MovementEvent);
    fn set_wind_volume(&mut self, player: PlayerId, volume: f32);
    fn switch_bgm(&mut self, track: BgmTrack);
    fn stop_bgm(&mut self);
}

/// Headless sink: logs everything and keeps counts for the run summary.
#[derive(Debug, Default)]
pub struct LogAudioSink {
    pub event_counts: HashMap<(PlayerId, MovementEvent), u32>,
    pub wind_volumes: HashMap<PlayerId, f32>,
    pub current_bgm: Option<BgmTrack>,
    pub bgm_switches: u32,
}

impl LogAudioSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, player: PlayerId, event: MovementEvent) -> u32 {
        self.event_counts
            .get(&(player, event))
            .copied()
            .unwrap_or(0)
    }
}

impl AudioSink for LogAudioSink {
    fn play(&mut self, player: PlayerId, event: MovementEvent) {
        log::trace!("P{} sfx: {}", player + 1, event);
        *self.event_counts.entry((player, event)).or_insert(0) += 1;
    }

    fn set_wind_volume(&mut self, player: PlayerId, volume: f32) {
        self.wind_volumes.insert(player, volume);
    }

    fn switch_bgm(&mut self, track: BgmTrack) {
        log::info!("[BGM] Switching to: {}", track);
        self.current_bgm = Some(track);
        self.bgm_switches += 1;
    }

    fn stop_bgm(&mut self) {
        log::info!("[BGM] Stopped");
        self.current_bgm = None;
    }
}
