/// Defaults shared by the coverage estimator and the batch compositor

/// Maximum number of scenes that get histograms and density tables exported
pub const MAX_EXPORT: usize = 20;

/// Spacing added around the probe extent when sizing grid cells
pub const GRID_MARGIN: f64 = 15.0;

/// Number of bins in the per-scene occurrence likelihood histogram
pub const OCCURRENCE_HISTOGRAM_BINS: usize = 20;

/// Offset inside the logarithm of the inverse class frequency weights
pub const CLASS_WEIGHT_OFFSET: f64 = 1.2;
