//! Per-tick movement state machine for a climbing body.
//!
//! All constants are per tick (60 Hz), not per second. One call to
//! [`MovementController::step`] runs the phases below in a fixed order; the
//! order is what gives the climb its feel, so it must not be rearranged:
//!
//!  1. horizontal acceleration / decay and speed clamp
//!  2. jump or wall-jump
//!  3. wall-jump cooldown countdown
//!  4. gravity (always, even when grounded)
//!  5. axis-separated collision: X first, then Y with the committed X
//!  6. map clamp
//!  7. goal check (terminal)
//!  8. boost pads under the final box, re-applied every tick of overlap
//!
//! Axis separation can let a body snag on convex corners at some velocity
//! combinations. That behaviour is kept as-is.

use climb_core::input::ActionSet;
use serde::Deserialize;

use crate::audio::{EventSink, MovementEvent};
use crate::collision::{Boost, CollisionMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    pub fn flipped(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

/// How physical travel direction maps to the facing shown to the renderer.
/// `Mirrored` reproduces sprites authored facing the other way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    #[default]
    Travel,
    Mirrored,
}

impl FacingMode {
    pub fn apply(self, facing: Facing) -> Facing {
        match self {
            Self::Travel => facing,
            Self::Mirrored => facing.flipped(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    pub body_width: f32,
    pub body_height: f32,
    pub max_speed: f32,
    pub accel_ground: f32,
    pub accel_air: f32,
    pub jump_speed: f32,
    pub gravity: f32,
    /// Gap between the body edge and the wall probe.
    pub wall_jump_probe: f32,
    pub wall_jump_cooldown_ticks: u32,
    pub wall_jump_vertical_factor: f32,
    pub wall_jump_horizontal_factor: f32,
    pub boost_a_speed: f32,
    pub boost_b_speed: f32,
    pub facing_mode: FacingMode,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            body_width: 20.0,
            body_height: 30.0,
            max_speed: 2.5,
            accel_ground: 0.375,
            accel_air: 0.025,
            jump_speed: 3.24,
            gravity: 0.075,
            wall_jump_probe: 0.2,
            wall_jump_cooldown_ticks: 10,
            wall_jump_vertical_factor: 0.8,
            wall_jump_horizontal_factor: 0.7,
            boost_a_speed: 8.66,
            boost_b_speed: 17.32,
            facing_mode: FacingMode::Travel,
        }
    }
}

/// Kinematic state of one controlled body. `(x, y)` is the bottom-left
/// corner of its box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsBody {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub vx: f32,
    pub vy: f32,
    pub grounded: bool,
    pub wall_jump_cooldown: u32,
    pub facing: Facing,
    pub goal_reached: bool,
}

/// What a renderer needs to draw one body for the current tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyPose {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub facing: Facing,
    pub grounded: bool,
    pub goal_reached: bool,
}

impl PhysicsBody {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            vx: 0.0,
            vy: 0.0,
            grounded: false,
            wall_jump_cooldown: 0,
            facing: Facing::Right,
            goal_reached: false,
        }
    }

    pub fn spawn(config: &MovementConfig, x: f32, y: f32) -> Self {
        Self::new(x, y, config.body_width, config.body_height)
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width * 0.5
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.height * 0.5
    }

    pub fn pose(&self, facing_mode: FacingMode) -> BodyPose {
        BodyPose {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
            facing: facing_mode.apply(self.facing),
            grounded: self.grounded,
            goal_reached: self.goal_reached,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WallSide {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy)]
pub struct MovementController {
    pub config: MovementConfig,
    /// World height at which a body stops simulating for good.
    pub goal_y: f32,
}

impl MovementController {
    pub fn new(config: MovementConfig, goal_y: f32) -> Self {
        Self { config, goal_y }
    }

    /// Advance `body` by one tick.
    pub fn step<S>(
        &self,
        body: &mut PhysicsBody,
        actions: ActionSet,
        map: &CollisionMap,
        events: &mut S,
    ) where
        S: EventSink + ?Sized,
    {
        if body.goal_reached {
            return;
        }

        self.apply_horizontal_input(body, actions);
        if actions.jump {
            self.apply_jump(body, map, events);
        }
        body.wall_jump_cooldown = body.wall_jump_cooldown.saturating_sub(1);
        body.vy -= self.config.gravity;

        self.move_and_collide(body, map, events);
        self.clamp_to_map(body, map);

        if body.y >= self.goal_y {
            body.goal_reached = true;
            body.vx = 0.0;
            body.vy = 0.0;
            log::debug!("Body reached goal at y={:.1}", body.y);
            return;
        }

        self.apply_boost(body, map, events);
    }

    fn apply_horizontal_input(&self, body: &mut PhysicsBody, actions: ActionSet) {
        let accel = if body.grounded {
            self.config.accel_ground
        } else {
            self.config.accel_air
        };

        // Left wins when both directions are held.
        if actions.move_left {
            body.vx -= accel;
            body.facing = Facing::Left;
        } else if actions.move_right {
            body.vx += accel;
            body.facing = Facing::Right;
        } else {
            body.vx = decay_toward_zero(body.vx, accel);
        }

        let max_speed = self.config.max_speed;
        body.vx = body.vx.clamp(-max_speed, max_speed);
    }

    fn apply_jump<S>(&self, body: &mut PhysicsBody, map: &CollisionMap, events: &mut S)
    where
        S: EventSink + ?Sized,
    {
        if body.grounded {
            body.vy = self.config.jump_speed;
            body.grounded = false;
            events.emit(MovementEvent::JumpTriggered);
            return;
        }
        if body.wall_jump_cooldown > 0 {
            return;
        }
        let Some(side) = self.wall_contact(body, map) else {
            return;
        };

        let push = self.config.max_speed * self.config.wall_jump_horizontal_factor;
        body.vy = self.config.jump_speed * self.config.wall_jump_vertical_factor;
        body.vx = match side {
            WallSide::Left => push,
            WallSide::Right => -push,
        };
        body.wall_jump_cooldown = self.config.wall_jump_cooldown_ticks;
        events.emit(MovementEvent::WallJumpTriggered);
    }

    /// Probe a thin slice past each side of the body. The left probe is
    /// checked first and wins when both touch.
    fn wall_contact(&self, body: &PhysicsBody, map: &CollisionMap) -> Option<WallSide> {
        let probe = self.config.wall_jump_probe;
        if map.any_solid_in_box(body.x - probe, body.y, body.width, body.height) {
            Some(WallSide::Left)
        } else if map.any_solid_in_box(body.x + probe, body.y, body.width, body.height) {
            Some(WallSide::Right)
        } else {
            None
        }
    }

    fn move_and_collide<S>(&self, body: &mut PhysicsBody, map: &CollisionMap, events: &mut S)
    where
        S: EventSink + ?Sized,
    {
        let new_x = body.x + body.vx;
        let new_y = body.y + body.vy;

        if map.any_solid_in_box(new_x, body.y, body.width, body.height) {
            body.vx = 0.0;
        } else {
            body.x = new_x;
        }

        if !map.any_solid_in_box(body.x, new_y, body.width, body.height) {
            body.y = new_y;
            body.grounded = false;
            return;
        }

        if body.vy < 0.0 {
            if !body.grounded {
                events.emit(MovementEvent::Landed);
            }
            body.grounded = true;
        }
        body.vy = 0.0;
    }

    fn clamp_to_map(&self, body: &mut PhysicsBody, map: &CollisionMap) {
        let max_x = map.width() as f32 - body.width;
        body.x = body.x.min(max_x).max(0.0);
        body.y = body.y.max(0.0);
    }

    fn apply_boost<S>(&self, body: &mut PhysicsBody, map: &CollisionMap, events: &mut S)
    where
        S: EventSink + ?Sized,
    {
        match map.special_in_box(body.x, body.y, body.width, body.height) {
            Some(Boost::A) => {
                body.vy = self.config.boost_a_speed;
                events.emit(MovementEvent::BoostATriggered);
            }
            Some(Boost::B) => {
                body.vy = self.config.boost_b_speed;
                events.emit(MovementEvent::BoostBTriggered);
            }
            None => {}
        }
    }
}

fn decay_toward_zero(v: f32, amount: f32) -> f32 {
    if v > 0.0 {
        (v - amount).max(0.0)
    } else if v < 0.0 {
        (v + amount).min(0.0)
    } else {
        v
    }
}
