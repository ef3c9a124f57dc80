//! Simulation core of a vertical climbing platformer.
//!
//! A pixel-exact `CollisionMap` classifies every world point; a
//! `MovementController` steps each `PhysicsBody` once per fixed tick; a
//! smoothed `Camera` follows each body; a `Session` ties one or two players
//! together with the countdown, background-music zones and the outcome.
//! Rendering and audio mixing live outside this crate and consume poses and
//! `AudioSink` calls.

pub mod audio;
pub mod camera;
pub mod collision;
pub mod config;
pub mod controller;
pub mod replay;
pub mod session;
