//! Reference model: a serial production line.
//!
//! `n` machines in series with a unit buffer between neighbors. Machine `i`
//! starts on command (`s{i}`, controllable) and finishes on its own after a
//! fixed processing time (`f{i}`, uncontrollable). A start is only allowed
//! if the machine is idle, has a part to work on and has room downstream,
//! so the supervised plant never overflows a buffer.
//!
//! One product passes through every machine once, so a product takes `2n`
//! events and every complete schedule returns the line to its empty state.

mod model;
mod state;

pub use model::{LineOracle, ProductionLine};
pub use state::LineState;
