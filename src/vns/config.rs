//! Variable Neighborhood Search configuration.

/// Configuration parameters for the schedule optimizer.
///
/// # Examples
///
/// ```
/// use u_desplan::vns::VnsConfig;
///
/// let config = VnsConfig::default()
///     .with_max_iterations(50)
///     .with_k_max(8)
///     .with_seed(7);
/// assert_eq!(config.max_iterations, 50);
/// assert_eq!(config.k_max, 8);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VnsConfig {
    /// Maximum number of outer iterations.
    pub max_iterations: usize,
    /// Neighbors drawn per outer iteration before it counts as a failure.
    pub k_max: usize,
    /// Consecutive failed outer iterations before stopping.
    pub max_no_improvement: usize,
    /// Random seed (None for a random seed).
    pub seed: Option<u64>,
}

impl Default for VnsConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl VnsConfig {
    /// 10 outer iterations of up to 20 neighbors, patience 20.
    pub fn standard() -> Self {
        Self {
            max_iterations: 10,
            k_max: 20,
            max_no_improvement: 20,
            seed: None,
        }
    }

    /// 5 outer iterations of up to 10 neighbors, patience 10.
    pub fn fast() -> Self {
        Self {
            max_iterations: 5,
            k_max: 10,
            max_no_improvement: 10,
            seed: None,
        }
    }

    /// Sets the maximum number of outer iterations.
    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    /// Sets the number of neighbors per outer iteration.
    pub fn with_k_max(mut self, k: usize) -> Self {
        self.k_max = k;
        self
    }

    /// Sets the number of failed outer iterations tolerated.
    pub fn with_max_no_improvement(mut self, n: usize) -> Self {
        self.max_no_improvement = n;
        self
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_iterations == 0 {
            return Err("max_iterations must be at least 1".into());
        }
        if self.k_max == 0 {
            return Err("k_max must be at least 1".into());
        }
        Ok(())
    }
}
