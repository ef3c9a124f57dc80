//! Engine-agnostic building blocks shared by the climbing game: raw input and
//! logical action bindings, and the fixed-timestep clock.

pub mod input;
pub mod time;
