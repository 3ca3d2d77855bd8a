//! Planner configuration.

use crate::search::EngineConfig;
use crate::vns::VnsConfig;

/// Settings shared by every [`Algorithm`](super::Algorithm).
///
/// The engine's merge policy is chosen per algorithm; the value in
/// [`engine`](Self::engine) is ignored.
///
/// # Examples
///
/// ```
/// use u_desplan::planner::PlannerConfig;
/// use u_desplan::vns::VnsConfig;
///
/// let config = PlannerConfig::default()
///     .with_vns(VnsConfig::fast().with_seed(3))
///     .with_batch_string(2);
/// assert_eq!(config.batch_string, 2);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlannerConfig {
    /// Frontier engine settings.
    pub engine: EngineConfig,
    /// Optimizer settings for [`Algorithm::Composed`](super::Algorithm::Composed).
    pub vns: VnsConfig,
    /// Products searched exactly before composition (default 1).
    pub batch_string: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            vns: VnsConfig::standard(),
            batch_string: 1,
        }
    }
}

impl PlannerConfig {
    /// Sets the engine configuration.
    pub fn with_engine(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }

    /// Sets the optimizer configuration.
    pub fn with_vns(mut self, vns: VnsConfig) -> Self {
        self.vns = vns;
        self
    }

    /// Sets how many products the composed planner searches exactly.
    pub fn with_batch_string(mut self, n: usize) -> Self {
        self.batch_string = n;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.batch_string == 0 {
            return Err("batch_string must be at least 1".into());
        }
        self.vns.validate()
    }
}
