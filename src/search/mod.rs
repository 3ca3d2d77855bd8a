//! Frontier expansion search over the product-state space.
//!
//! [`FrontierEngine`] explores the reachable states layer by layer,
//! pruning contexts with a [`MergePolicy`], and returns the best event
//! sequence reaching the target state.

mod config;
mod engine;
mod types;

pub use config::{EngineConfig, MergePolicy};
pub use engine::FrontierEngine;
pub use types::SearchOutcome;
