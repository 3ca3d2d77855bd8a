//! Frontier engine configuration.

/// How contexts that reach the same state are merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MergePolicy {
    /// Cost is cumulative time. Contexts with equal scheduler signatures
    /// are deduplicated, keeping the faster one; contexts with different
    /// signatures coexist.
    #[default]
    TimeDominance,

    /// Cost is the accumulated active-task count of visited states. A
    /// single context per state is kept: the one with the higher score.
    Parallelism,
}

impl MergePolicy {
    /// Whether `candidate` is strictly better than `incumbent`.
    ///
    /// Ties always favor the incumbent, which keeps the merge independent
    /// of arrival order as far as cost is concerned.
    pub fn improves(self, candidate: f64, incumbent: f64) -> bool {
        match self {
            MergePolicy::TimeDominance => candidate < incumbent,
            MergePolicy::Parallelism => candidate > incumbent,
        }
    }
}

/// Configuration for [`FrontierEngine`](super::FrontierEngine).
///
/// # Examples
///
/// ```
/// use u_desplan::search::{EngineConfig, MergePolicy};
///
/// let config = EngineConfig::default()
///     .with_policy(MergePolicy::Parallelism)
///     .with_parallel_threshold(500);
/// assert_eq!(config.parallel_threshold, 500);
/// assert!(config.controllable_first);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EngineConfig {
    /// Merge policy and cost model.
    pub policy: MergePolicy,

    /// Drop uncontrollable events from a state's candidates whenever a
    /// controllable event is available there.
    ///
    /// A branching-reduction heuristic; turning it off explores more
    /// interleavings at a higher cost.
    pub controllable_first: bool,

    /// Frontier size above which a layer is expanded in parallel with
    /// rayon. Smaller frontiers are expanded sequentially.
    pub parallel_threshold: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            policy: MergePolicy::TimeDominance,
            controllable_first: true,
            parallel_threshold: 100,
        }
    }
}

impl EngineConfig {
    /// Sets the merge policy.
    pub fn with_policy(mut self, policy: MergePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Enables or disables the controllable-first tie-break.
    pub fn with_controllable_first(mut self, enabled: bool) -> Self {
        self.controllable_first = enabled;
        self
    }

    /// Sets the parallel fan-out threshold.
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_config_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.policy, MergePolicy::TimeDominance);
        assert!(config.controllable_first);
        assert_eq!(config.parallel_threshold, 100);
    }

    #[test]
    fn test_policy_direction() {
        assert!(MergePolicy::TimeDominance.improves(1.0, 2.0));
        assert!(!MergePolicy::TimeDominance.improves(2.0, 2.0));
        assert!(MergePolicy::Parallelism.improves(3.0, 2.0));
        assert!(!MergePolicy::Parallelism.improves(2.0, 2.0));
    }
}
