/// Run summary written next to the exported tables and plots.
use crate::compositor::GridLayout;
use crate::coverage::{OccurrenceHistogram, SkippedScene};
use crate::error::Result;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Top-level summary of one visualiser run.
#[derive(Serialize)]
pub struct RunManifest {
    pub dataset: String,
    pub split: String,
    /// Short class names, in class index order.
    pub class_names: Vec<String>,
    pub coverage: Option<CoverageSummary>,
    pub batches: Option<BatchSummary>,
}

/// Statistics gathered by the coverage pass.
#[derive(Serialize)]
pub struct CoverageSummary {
    pub samples_per_scene: usize,
    pub total_draws: u64,
    /// Class density of the stored clouds.
    pub decimated_density: Option<Vec<f64>>,
    /// Class density of the sampled inputs.
    pub sampled_density: Option<Vec<f64>>,
    pub scenes: Vec<SceneSummary>,
}

#[derive(Serialize)]
pub struct SceneSummary {
    pub index: usize,
    pub name: String,
    pub point_count: usize,
    pub draw_count: u64,
    /// Points selected at least once.
    pub selected_points: usize,
    pub exported: bool,
    pub occurrence_histogram: Option<OccurrenceHistogram>,
    pub skipped: Vec<SkippedScene>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchMode {
    Grid,
    PerScene,
}

/// What the batch pass produced.
#[derive(Serialize)]
pub struct BatchSummary {
    pub mode: BatchMode,
    pub batch_count: usize,
    pub batch_size: usize,
    pub layout: Option<GridLayout>,
    pub composite_points: Option<usize>,
    pub files: Vec<String>,
}

/// Writes `summary.json` into the run's output directory.
pub struct ManifestGenerator {
    output_dir: PathBuf,
}

impl ManifestGenerator {
    pub fn new(output_dir: &Path) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
        }
    }

    pub fn write(&self, manifest: &RunManifest) -> Result<PathBuf> {
        let manifest_path = self.output_dir.join("summary.json");
        let manifest_json = serde_json::to_string_pretty(manifest)?;
        fs::write(&manifest_path, manifest_json)?;

        println!("Generated run summary: {}", manifest_path.display());
        self.print_manifest_summary(manifest);
        Ok(manifest_path)
    }

    /// Prints the class densities side by side with the skipped scenes.
    fn print_manifest_summary(&self, manifest: &RunManifest) {
        println!("Summary ({} / {}):", manifest.dataset, manifest.split);

        if let Some(coverage) = &manifest.coverage {
            println!(
                "  Draws: {} ({} per scene)",
                coverage.total_draws, coverage.samples_per_scene
            );
            println!("  {:<12} {:>10} {:>10}", "class", "decimated", "sampled");
            for (i, name) in manifest.class_names.iter().enumerate() {
                println!(
                    "  {:<12} {:>10} {:>10}",
                    name,
                    format_share(coverage.decimated_density.as_deref(), i),
                    format_share(coverage.sampled_density.as_deref(), i)
                );
            }

            let exported = coverage.scenes.iter().filter(|s| s.exported).count();
            println!(
                "  Exported densities: {}/{} scenes",
                exported,
                coverage.scenes.len()
            );
            for scene in coverage.scenes.iter().filter(|s| !s.skipped.is_empty()) {
                for skip in &scene.skipped {
                    println!("  Skipped {} ({:?}): {}", scene.name, skip.stage, skip.reason);
                }
            }
        }

        if let Some(batches) = &manifest.batches {
            println!(
                "  Batches: {} x {} ({:?}), {} files",
                batches.batch_count,
                batches.batch_size,
                batches.mode,
                batches.files.len()
            );
            if let Some(layout) = &batches.layout {
                println!("  Grid cell: {:.2} x {:.2}", layout.xsize, layout.ysize);
            }
        }
    }
}

fn format_share(density: Option<&[f64]>, index: usize) -> String {
    density
        .and_then(|d| d.get(index))
        .map(|v| format!("{:.2}%", v * 100.0))
        .unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_is_written_as_json() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = RunManifest {
            dataset: "synthetic".to_string(),
            split: "train".to_string(),
            class_names: vec!["a".to_string(), "b".to_string()],
            coverage: None,
            batches: Some(BatchSummary {
                mode: BatchMode::Grid,
                batch_count: 2,
                batch_size: 2,
                layout: Some(GridLayout::from_extent(10.0, 10.0, 15.0)),
                composite_points: Some(8),
                files: vec!["train_trueColors.txt".to_string()],
            }),
        };

        let path = ManifestGenerator::new(dir.path()).write(&manifest).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(value["batches"]["mode"], "grid");
        assert_eq!(value["batches"]["layout"]["xsize"], 25.0);
        assert!(value["coverage"].is_null());
    }

    #[test]
    fn missing_density_prints_dash() {
        assert_eq!(format_share(None, 0), "-");
        assert_eq!(format_share(Some(&[0.25]), 0), "25.00%");
        assert_eq!(format_share(Some(&[0.25]), 3), "-");
    }
}
