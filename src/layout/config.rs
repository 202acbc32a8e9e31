use crate::errors::LayoutError;
use crate::geometry::Vec2;

/// Default configuration: theta 0.7, unbounded interaction range, clustering
/// disabled on both axes.
pub const DEFAULT_LAYOUT_CONFIG: LayoutConfig = LayoutConfig {
    theta: 0.7,
    min_distance: 0.0,
    max_distance: f64::INFINITY,
    cluster_center: Vec2::new(f64::NAN, f64::NAN),
    centering_strength: 2.0e-4,
    jiggle_seed: 0,
};

/// Tuning parameters for a [`ForceSimulation`].
///
/// `theta` trades accuracy for speed: a region whose size-to-distance ratio
/// does not exceed `theta` is approximated as a single aggregate body, so
/// smaller values recurse more and cost more. Pairs closer than
/// `min_distance` or farther than `max_distance` contribute no force. A
/// non-finite `cluster_center` coordinate is the sentinel for "no pull along
/// that axis" and is not an error.
///
/// # Examples
///
/// ```
/// use force_layout::geometry::Vec2;
/// use force_layout::layout::LayoutConfig;
///
/// let config = LayoutConfig::new(Some(0.5), None, Some(200.0), None, None)
///     .expect("Failed to build config");
/// assert_eq!(config.theta, 0.5);
/// assert_eq!(config.min_distance, 0.0);
/// assert_eq!(config.max_distance, 200.0);
/// // Clustering stays disabled unless a center is supplied.
/// assert!(config.cluster_center.x.is_nan());
/// ```
///
/// [`ForceSimulation`]: crate::layout::ForceSimulation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    /// Barnes-Hut acceptance threshold; must be finite and greater than zero.
    pub theta: f64,
    /// Inclusive lower bound on the interaction distance.
    pub min_distance: f64,
    /// Inclusive upper bound on the interaction distance.
    pub max_distance: f64,
    /// Optional clustering center; a non-finite coordinate disables the pull
    /// along that axis.
    pub cluster_center: Vec2,
    /// Magnitude of the constant per-axis pull toward the clustering center.
    pub centering_strength: f64,
    /// Seed for the jiggle perturbation, so near-coincident-point handling is
    /// reproducible.
    pub jiggle_seed: u64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        DEFAULT_LAYOUT_CONFIG
    }
}

impl LayoutConfig {
    /// Builds a configuration, falling back to the defaults for every `None`.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::InvalidTheta`] if `theta` is non-finite or not
    /// greater than zero, and [`LayoutError::InvalidDistanceRange`] if the
    /// minimum distance is negative or exceeds the maximum.
    pub fn new(
        theta: Option<f64>,
        min_distance: Option<f64>,
        max_distance: Option<f64>,
        cluster_center: Option<Vec2>,
        centering_strength: Option<f64>,
    ) -> Result<Self, LayoutError> {
        let config = LayoutConfig {
            theta: theta.unwrap_or(DEFAULT_LAYOUT_CONFIG.theta),
            min_distance: min_distance.unwrap_or(DEFAULT_LAYOUT_CONFIG.min_distance),
            max_distance: max_distance.unwrap_or(DEFAULT_LAYOUT_CONFIG.max_distance),
            cluster_center: cluster_center.unwrap_or(DEFAULT_LAYOUT_CONFIG.cluster_center),
            centering_strength: centering_strength
                .unwrap_or(DEFAULT_LAYOUT_CONFIG.centering_strength),
            jiggle_seed: DEFAULT_LAYOUT_CONFIG.jiggle_seed,
        };
        config.validate()?;
        Ok(config)
    }

    pub(crate) fn validate(&self) -> Result<(), LayoutError> {
        if !self.theta.is_finite() || self.theta <= 0.0 {
            return Err(LayoutError::InvalidTheta);
        }
        if self.min_distance < 0.0 || self.min_distance > self.max_distance {
            return Err(LayoutError::InvalidDistanceRange);
        }
        Ok(())
    }
}
