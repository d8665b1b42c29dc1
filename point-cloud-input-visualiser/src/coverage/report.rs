/// Turns a coverage estimate into the histograms and per-scene density
/// tables that get plotted and exported.
use super::accumulator::CoverageEstimate;
use super::histogram::{OccurrenceHistogram, normalise_counts};
use log::warn;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// No draw ever landed on the scene.
    NeverDrawn,
    /// The scene was drawn but no point was ever selected.
    NeverSelected,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NeverDrawn => write!(f, "scene was never drawn"),
            SkipReason::NeverSelected => write!(f, "no point of the scene was ever selected"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStage {
    Occurrence,
    Export,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedScene {
    pub scene: usize,
    pub name: String,
    pub stage: ReportStage,
    pub reason: SkipReason,
}

/// Occurrence likelihood histogram of one scene.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneOccurrence {
    pub scene: usize,
    pub name: String,
    pub histogram: OccurrenceHistogram,
}

/// Relative selection density of one exported scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneDensity {
    pub scene: usize,
    pub name: String,
    pub density: Vec<f64>,
    pub seeds: Vec<usize>,
}

impl SceneDensity {
    /// Indices of points selected at least once.
    pub fn cleaned_indices(&self) -> Vec<usize> {
        self.density
            .iter()
            .enumerate()
            .filter(|(_, d)| **d > 0.0)
            .map(|(i, _)| i)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CoverageReport {
    /// Class density of the stored clouds, before input sampling.
    pub decimated_density: Option<Vec<f64>>,
    /// Class density of the inputs actually produced by the sampler.
    pub sampled_density: Option<Vec<f64>>,
    pub occurrences: Vec<SceneOccurrence>,
    pub densities: Vec<SceneDensity>,
    pub skipped: Vec<SkippedScene>,
}

/// Name used for a scene in export file names: the identifier's file stem.
pub fn scene_name(identifier: &str) -> String {
    std::path::Path::new(identifier)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| identifier.to_string())
}

/// Builds the report for the first `max_export` scenes.
///
/// Scenes that cannot be reported are skipped with a warning and listed in
/// [`CoverageReport::skipped`]; no division ever runs on a zero total.
pub fn build_report(
    estimate: &CoverageEstimate,
    filenames: &[String],
    decimated_histogram: &[u64],
    max_export: usize,
    bins: usize,
) -> CoverageReport {
    let mut report = CoverageReport {
        decimated_density: normalise_counts(decimated_histogram),
        sampled_density: estimate.class_histogram().density(),
        occurrences: Vec::new(),
        densities: Vec::new(),
        skipped: Vec::new(),
    };

    if report.decimated_density.is_none() {
        warn!("Native label histogram is empty, no decimated class density");
    }
    if report.sampled_density.is_none() {
        warn!("Sampled inputs contained no labelled points, no input class density");
    }

    let export_count = estimate.scenes().len().min(max_export);
    for (index, scene) in estimate.scenes().iter().take(export_count).enumerate() {
        let name = filenames
            .get(index)
            .map(|f| scene_name(f))
            .unwrap_or_else(|| format!("scene_{index}"));

        match scene
            .occurrence_likelihood()
            .and_then(|values| OccurrenceHistogram::from_values(&values, bins))
        {
            Some(histogram) => report.occurrences.push(SceneOccurrence {
                scene: index,
                name: name.clone(),
                histogram,
            }),
            None => report.skip(index, &name, ReportStage::Occurrence, SkipReason::NeverDrawn),
        }

        match scene.relative_density() {
            Some(density) => report.densities.push(SceneDensity {
                scene: index,
                name,
                density,
                seeds: scene.seeds.clone(),
            }),
            None => {
                let reason = if scene.draw_count == 0 {
                    SkipReason::NeverDrawn
                } else {
                    SkipReason::NeverSelected
                };
                report.skip(index, &name, ReportStage::Export, reason);
            }
        }
    }

    report
}

impl CoverageReport {
    fn skip(&mut self, scene: usize, name: &str, stage: ReportStage, reason: SkipReason) {
        warn!("Skipping {:?} for scene {} ({}): {}", stage, scene, name, reason);
        self.skipped.push(SkippedScene {
            scene,
            name: name.to_string(),
            stage,
            reason,
        });
    }

    pub fn skip_reasons(&self, scene: usize) -> Vec<&SkippedScene> {
        self.skipped.iter().filter(|s| s.scene == scene).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coverage::accumulate_draws;
    use crate::dataset::SampledInput;

    fn draw(scene: usize, mask: Vec<bool>) -> SampledInput {
        SampledInput {
            scene,
            mask: Some(mask),
            class_counts: vec![1],
            seed: Some(0),
        }
    }

    #[test]
    fn export_is_capped() {
        let estimate = accumulate_draws(
            &[1, 1, 1],
            1,
            vec![draw(0, vec![true]), draw(1, vec![true]), draw(2, vec![true])],
        )
        .unwrap();
        let names = vec!["a.laz".to_string(), "b.laz".to_string(), "c.laz".to_string()];
        let report = build_report(&estimate, &names, &[3], 2, 20);
        assert_eq!(report.densities.len(), 2);
        assert_eq!(report.occurrences.len(), 2);
        assert_eq!(report.densities[1].name, "b");
    }

    #[test]
    fn drawn_but_unselected_scene_is_reported() {
        let estimate = accumulate_draws(&[2], 1, vec![draw(0, vec![false, false])]).unwrap();
        let report = build_report(&estimate, &["x".to_string()], &[0], 20, 20);

        assert!(report.densities.is_empty());
        assert_eq!(report.occurrences.len(), 1);
        assert_eq!(report.decimated_density, None);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].reason, SkipReason::NeverSelected);
        assert_eq!(report.skipped[0].stage, ReportStage::Export);
    }

    #[test]
    fn scene_name_strips_directories_and_extension() {
        assert_eq!(scene_name("data/train/bildstein_1.laz"), "bildstein_1");
        assert_eq!(scene_name("synthetic_00"), "synthetic_00");
    }
}
