/// Monte Carlo estimate of how often each point of each scene ends up in a
/// sampled input. Nothing here renders or writes files.
mod accumulator;
mod histogram;
mod report;

pub use accumulator::{
    ClassHistogram, CoverageAccumulator, CoverageEstimate, SceneAccumulator, accumulate_draws,
};
pub use histogram::{OccurrenceHistogram, normalise_counts};
pub use report::{
    CoverageReport, ReportStage, SceneDensity, SceneOccurrence, SkipReason, SkippedScene,
    build_report, scene_name,
};

use crate::dataset::{Dataset, InputRequest};
use crate::error::{Result, VisuError};
use indicatif::ProgressBar;
use log::info;

/// Draws `samples_per_scene × F` inputs and folds them into a
/// [`CoverageAccumulator`]. The estimate is turned into histograms and
/// density tables by [`build_report`].
///
/// Any sampling error aborts the run; no partial estimate is returned.
pub fn estimate_coverage(
    dataset: &mut dyn Dataset,
    samples_per_scene: usize,
    dropout: bool,
    pb: &ProgressBar,
) -> Result<CoverageEstimate> {
    let scene_count = dataset.data_filenames().len();
    if scene_count == 0 {
        return Err(VisuError::EmptyDataset);
    }

    let point_counts = (0..scene_count)
        .map(|f| dataset.scene_shape(f).map(|shape| shape.point_count))
        .collect::<Result<Vec<_>>>()?;

    let total = samples_per_scene * scene_count;
    info!("Generating {} inputs over {} scenes", total, scene_count);

    let request = InputRequest {
        dropout,
        want_mask: true,
        augment: false,
        want_seed: true,
    };

    let mut accumulator = CoverageAccumulator::new(&point_counts, dataset.num_classes());
    pb.set_length(total as u64);
    for _ in 0..total {
        let input = dataset.next_input(request)?;
        accumulator.accumulate(&input)?;
        pb.inc(1);
    }

    Ok(accumulator.finish())
}
