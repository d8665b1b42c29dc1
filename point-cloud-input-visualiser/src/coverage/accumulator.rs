/// Selection count accumulation across sampling draws.
use super::histogram::normalise_counts;
use crate::dataset::SampledInput;
use crate::error::{Result, VisuError};
use serde::Serialize;

/// Running selection statistics for one scene.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneAccumulator {
    /// Number of draws each point was selected in.
    pub selection_count: Vec<u64>,
    /// Number of draws that landed on this scene.
    pub draw_count: u64,
    /// Seed point of every draw, in draw order.
    pub seeds: Vec<usize>,
}

impl SceneAccumulator {
    pub fn new(point_count: usize) -> Self {
        Self {
            selection_count: vec![0; point_count],
            draw_count: 0,
            seeds: Vec::new(),
        }
    }

    /// Number of points selected at least once.
    pub fn selected_points(&self) -> usize {
        self.selection_count.iter().filter(|&&c| c > 0).count()
    }

    /// Percentage of draws each point was selected in.
    /// `None` for scenes that were never drawn.
    pub fn occurrence_likelihood(&self) -> Option<Vec<f64>> {
        if self.draw_count == 0 {
            return None;
        }
        let draws = self.draw_count as f64;
        Some(
            self.selection_count
                .iter()
                .map(|&c| 100.0 * c as f64 / draws)
                .collect(),
        )
    }

    /// Within-scene relative density, summing to one over all points.
    /// `None` when no point was ever selected.
    pub fn relative_density(&self) -> Option<Vec<f64>> {
        normalise_counts(&self.selection_count)
    }
}

/// Class label counts summed over every draw.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassHistogram {
    bins: Vec<u64>,
}

impl ClassHistogram {
    pub fn new(num_classes: usize) -> Self {
        Self {
            bins: vec![0; num_classes],
        }
    }

    pub fn bins(&self) -> &[u64] {
        &self.bins
    }

    pub fn density(&self) -> Option<Vec<f64>> {
        normalise_counts(&self.bins)
    }

    fn add(&mut self, delta: &[u64]) {
        for (bin, &d) in self.bins.iter_mut().zip(delta) {
            *bin += d;
        }
    }
}

/// Mutable accumulation state of one estimator run.
#[derive(Debug, Clone)]
pub struct CoverageAccumulator {
    scenes: Vec<SceneAccumulator>,
    classes: ClassHistogram,
    total_draws: u64,
}

impl CoverageAccumulator {
    pub fn new(point_counts: &[usize], num_classes: usize) -> Self {
        Self {
            scenes: point_counts
                .iter()
                .map(|&n| SceneAccumulator::new(n))
                .collect(),
            classes: ClassHistogram::new(num_classes),
            total_draws: 0,
        }
    }

    /// Fold one draw into the running counts.
    /// The draw is validated in full before anything is updated.
    pub fn accumulate(&mut self, input: &SampledInput) -> Result<()> {
        let scene_count = self.scenes.len();
        let scene = self
            .scenes
            .get_mut(input.scene)
            .ok_or(VisuError::SceneOutOfRange {
                scene: input.scene,
                count: scene_count,
            })?;
        let mask = input
            .mask
            .as_ref()
            .ok_or(VisuError::MissingMask { scene: input.scene })?;
        if mask.len() != scene.selection_count.len() {
            return Err(VisuError::MaskLength {
                scene: input.scene,
                got: mask.len(),
                expected: scene.selection_count.len(),
            });
        }
        if input.class_counts.len() != self.classes.bins.len() {
            return Err(VisuError::ClassBins {
                got: input.class_counts.len(),
                expected: self.classes.bins.len(),
            });
        }

        for (count, &selected) in scene.selection_count.iter_mut().zip(mask) {
            if selected {
                *count += 1;
            }
        }
        scene.draw_count += 1;
        if let Some(seed) = input.seed {
            scene.seeds.push(seed);
        }
        self.classes.add(&input.class_counts);
        self.total_draws += 1;
        Ok(())
    }

    pub fn finish(self) -> CoverageEstimate {
        CoverageEstimate {
            scenes: self.scenes,
            class_histogram: self.classes,
            total_draws: self.total_draws,
        }
    }
}

/// Frozen result of an estimator run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageEstimate {
    scenes: Vec<SceneAccumulator>,
    class_histogram: ClassHistogram,
    total_draws: u64,
}

impl CoverageEstimate {
    pub fn scenes(&self) -> &[SceneAccumulator] {
        &self.scenes
    }

    pub fn scene(&self, index: usize) -> Option<&SceneAccumulator> {
        self.scenes.get(index)
    }

    pub fn class_histogram(&self) -> &ClassHistogram {
        &self.class_histogram
    }

    pub fn total_draws(&self) -> u64 {
        self.total_draws
    }
}

/// Accumulate a fixed sequence of draws without touching a dataset.
pub fn accumulate_draws<I>(
    point_counts: &[usize],
    num_classes: usize,
    draws: I,
) -> Result<CoverageEstimate>
where
    I: IntoIterator<Item = SampledInput>,
{
    let mut accumulator = CoverageAccumulator::new(point_counts, num_classes);
    for draw in draws {
        accumulator.accumulate(&draw)?;
    }
    Ok(accumulator.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draw(scene: usize, mask: &[u8], seed: usize) -> SampledInput {
        SampledInput {
            scene,
            mask: Some(mask.iter().map(|&m| m != 0).collect()),
            class_counts: vec![mask.iter().map(|&m| m as u64).sum(), 0],
            seed: Some(seed),
        }
    }

    #[test]
    fn rejected_draw_leaves_state_untouched() {
        let mut acc = CoverageAccumulator::new(&[3], 2);
        acc.accumulate(&draw(0, &[1, 0, 1], 0)).unwrap();

        let err = acc.accumulate(&draw(0, &[1, 1], 1)).unwrap_err();
        assert!(matches!(
            err,
            VisuError::MaskLength {
                scene: 0,
                got: 2,
                expected: 3
            }
        ));

        let estimate = acc.finish();
        assert_eq!(estimate.scenes()[0].selection_count, vec![1, 0, 1]);
        assert_eq!(estimate.scenes()[0].draw_count, 1);
        assert_eq!(estimate.total_draws(), 1);
    }

    #[test]
    fn out_of_range_scene_is_fatal() {
        let mut acc = CoverageAccumulator::new(&[3], 2);
        let err = acc.accumulate(&draw(4, &[1, 0, 1], 0)).unwrap_err();
        assert!(matches!(err, VisuError::SceneOutOfRange { scene: 4, count: 1 }));
    }

    #[test]
    fn missing_mask_is_fatal() {
        let mut acc = CoverageAccumulator::new(&[3], 2);
        let mut input = draw(0, &[1, 0, 1], 0);
        input.mask = None;
        assert!(matches!(
            acc.accumulate(&input).unwrap_err(),
            VisuError::MissingMask { scene: 0 }
        ));
    }

    #[test]
    fn wrong_class_bins_are_fatal() {
        let mut acc = CoverageAccumulator::new(&[3], 3);
        assert!(matches!(
            acc.accumulate(&draw(0, &[1, 0, 1], 0)).unwrap_err(),
            VisuError::ClassBins {
                got: 2,
                expected: 3
            }
        ));
    }

    #[test]
    fn never_drawn_scene_has_no_likelihood() {
        let scene = SceneAccumulator::new(4);
        assert_eq!(scene.occurrence_likelihood(), None);
        assert_eq!(scene.relative_density(), None);
    }

    #[test]
    fn likelihood_is_a_percentage_of_draws() {
        let estimate = accumulate_draws(
            &[2],
            2,
            vec![draw(0, &[1, 0], 0), draw(0, &[1, 1], 1)],
        )
        .unwrap();
        let scene = estimate.scene(0).unwrap();
        assert_eq!(scene.occurrence_likelihood(), Some(vec![100.0, 50.0]));
        assert_eq!(scene.seeds, vec![0, 1]);
        assert_eq!(scene.selected_points(), 2);
    }
}
