/// Orchestrates the sampling statistics pass and the batch visualisation
/// pass over one dataset accessor.
use crate::compositor::{GridLayout, compose_batches};
use crate::config::Split;
use crate::coverage::{CoverageEstimate, CoverageReport, build_report, estimate_coverage};
use crate::dataset::{Dataset, DatasetKind};
use crate::error::Result;
use crate::export::{
    write_density_table, write_label_colour_cloud, write_seeds, write_true_colour_cloud,
};
use crate::manifest::{
    BatchMode, BatchSummary, CoverageSummary, ManifestGenerator, RunManifest, SceneSummary,
};
use crate::plot::{BarChartStyle, bar_legend, save_bar_chart};
use constants::sampling::{GRID_MARGIN, OCCURRENCE_HISTOGRAM_BINS};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

/// Static options of one run, fixed before any sampling happens.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub dataset: DatasetKind,
    pub split: Split,
    pub stats: bool,
    pub draw_plots: bool,
    pub batch_count: usize,
    pub samples_per_scene: usize,
    pub batch_size: usize,
    pub dropout: bool,
    pub augment: bool,
    pub max_export: usize,
    /// Lay batches out on one grid instead of exporting every scene alone.
    pub group_by_batches: bool,
    pub output_root: PathBuf,
}

/// Output directory tree of one run, `{root}/{dataset}_{split}/...`.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    pub run_dir: PathBuf,
    pub hist: PathBuf,
    pub stats: PathBuf,
    pub seeds: PathBuf,
    pub batches: PathBuf,
}

impl OutputLayout {
    pub fn new(root: &Path, dataset: DatasetKind, split: Split) -> Self {
        let run_dir = root.join(format!("{}_{}", dataset.as_str(), split.as_str()));
        Self {
            hist: run_dir.join("hist"),
            stats: run_dir.join("color_proba_selection"),
            seeds: run_dir.join("seeds"),
            batches: run_dir.join("grouped_by_batches"),
            run_dir,
        }
    }
}

pub struct InputVisualiser {
    dataset: Box<dyn Dataset>,
    settings: RunSettings,
    output: OutputLayout,
}

impl InputVisualiser {
    pub fn new(dataset: Box<dyn Dataset>, settings: RunSettings) -> Self {
        let output = OutputLayout::new(&settings.output_root, settings.dataset, settings.split);
        Self {
            dataset,
            settings,
            output,
        }
    }

    /// Runs the enabled passes and writes the run summary.
    pub fn run(&mut self) -> Result<RunManifest> {
        fs::create_dir_all(&self.output.run_dir)?;
        if self.settings.dropout {
            println!("Input dropout is on");
        }
        if self.settings.augment {
            println!("Rotation augmentation is on");
        }

        let coverage = if self.settings.stats {
            Some(self.run_stats()?)
        } else {
            None
        };

        let batches = if self.settings.batch_count > 0 {
            println!("Batch visualisation:");
            fs::create_dir_all(&self.output.batches)?;
            Some(if self.settings.group_by_batches {
                self.run_grid()?
            } else {
                self.run_per_scene()?
            })
        } else {
            None
        };

        let manifest = RunManifest {
            dataset: self.settings.dataset.as_str().to_string(),
            split: self.settings.split.as_str().to_string(),
            class_names: self.dataset.short_label_names().to_vec(),
            coverage,
            batches,
        };
        ManifestGenerator::new(&self.output.run_dir).write(&manifest)?;

        println!("Done");
        Ok(manifest)
    }

    /// Class repartition of stored and sampled points, per-point selection
    /// likelihood and density maps.
    fn run_stats(&mut self) -> Result<CoverageSummary> {
        fs::create_dir_all(&self.output.hist)?;
        fs::create_dir_all(&self.output.stats)?;
        fs::create_dir_all(&self.output.seeds)?;

        let decimated_histogram = self.dataset.label_histogram();
        let filenames = self.dataset.data_filenames().to_vec();

        let pb = progress_bar(0, "inputs", "Sampling inputs");
        let estimate = estimate_coverage(
            self.dataset.as_mut(),
            self.settings.samples_per_scene,
            self.settings.dropout,
            &pb,
        )?;
        pb.finish_with_message("Inputs sampled");

        let report = build_report(
            &estimate,
            &filenames,
            &decimated_histogram,
            self.settings.max_export,
            OCCURRENCE_HISTOGRAM_BINS,
        );

        if self.settings.draw_plots {
            self.save_histogram_plots(&report)?;
        }
        self.export_densities(&report)?;

        Ok(self.coverage_summary(&estimate, &report, &filenames))
    }

    fn save_histogram_plots(&self, report: &CoverageReport) -> Result<()> {
        let style = BarChartStyle::default();
        let classes = bar_legend(self.dataset.short_label_names());
        if let Some(density) = &report.decimated_density {
            save_bar_chart(&self.output.hist.join("dec.png"), density, &style)?;
            info!("dec.png: decimated class density, bars {}", classes);
        }
        if let Some(density) = &report.sampled_density {
            save_bar_chart(&self.output.hist.join("input.png"), density, &style)?;
            info!("input.png: sampled class density, bars {}", classes);
        }

        let log_style = BarChartStyle::log();
        for occurrence in &report.occurrences {
            let counts: Vec<f64> = occurrence
                .histogram
                .counts
                .iter()
                .map(|&c| c as f64)
                .collect();
            let path = self
                .output
                .hist
                .join(format!("proba_scene_{}.png", occurrence.scene));
            save_bar_chart(&path, &counts, &log_style)?;
            info!(
                "proba_scene_{}.png: occurrence likelihood of {} ({:.1}% to {:.1}%, log counts)",
                occurrence.scene,
                occurrence.name,
                occurrence.histogram.edges.first().copied().unwrap_or_default(),
                occurrence.histogram.edges.last().copied().unwrap_or_default()
            );
        }
        info!("Saved histogram plots to {}", self.output.hist.display());
        Ok(())
    }

    /// Exports per-point density tables and seed lists of reported scenes.
    fn export_densities(&self, report: &CoverageReport) -> Result<()> {
        let set = self.settings.split.as_str();
        println!(
            "Exporting {} point clouds with densities",
            report.densities.len()
        );

        for density in &report.densities {
            let scene = self.dataset.scene(density.scene)?;
            let full_path = self.output.stats.join(format!(
                "{}_{}_appearance_density.txt",
                set, density.name
            ));
            let cleaned_path = self.output.stats.join(format!(
                "{}_{}_appearance_density_cleaned.txt",
                set, density.name
            ));
            let seeds_path = self
                .output
                .seeds
                .join(format!("{}_{}_seeds.txt", set, density.name));

            write_density_table(&full_path, &scene, &density.density, false)?;
            let kept = write_density_table(&cleaned_path, &scene, &density.density, true)?;
            write_seeds(&seeds_path, &density.seeds)?;
            debug!(
                "{}: {}/{} points selected, {} seeds",
                density.name,
                kept,
                scene.len(),
                density.seeds.len()
            );
        }
        Ok(())
    }

    fn coverage_summary(
        &self,
        estimate: &CoverageEstimate,
        report: &CoverageReport,
        filenames: &[String],
    ) -> CoverageSummary {
        let scenes = estimate
            .scenes()
            .iter()
            .enumerate()
            .map(|(index, scene)| SceneSummary {
                index,
                name: filenames.get(index).cloned().unwrap_or_default(),
                point_count: scene.selection_count.len(),
                draw_count: scene.draw_count,
                selected_points: scene.selected_points(),
                exported: report.densities.iter().any(|d| d.scene == index),
                occurrence_histogram: report
                    .occurrences
                    .iter()
                    .find(|o| o.scene == index)
                    .map(|o| o.histogram.clone()),
                skipped: report.skip_reasons(index).into_iter().cloned().collect(),
            })
            .collect();

        CoverageSummary {
            samples_per_scene: self.settings.samples_per_scene,
            total_draws: estimate.total_draws(),
            decimated_density: report.decimated_density.clone(),
            sampled_density: report.sampled_density.clone(),
            scenes,
        }
    }

    /// Lays every batch out on one grid and exports the composite twice,
    /// once with true colours and once with label colours.
    fn run_grid(&mut self) -> Result<BatchSummary> {
        let set = self.settings.split.as_str();
        let pb = progress_bar(0, "batches", "Composing batches");
        let (layout, composite) = compose_batches(
            self.dataset.as_mut(),
            self.settings.batch_count,
            self.settings.batch_size,
            self.settings.augment,
            self.settings.dropout,
            GRID_MARGIN,
            &pb,
        )?;
        pb.finish_with_message("Batches composed");

        let true_name = format!("{}_trueColors.txt", set);
        let label_name = format!("{}_labelColors.txt", set);
        write_true_colour_cloud(&self.output.batches.join(&true_name), composite.cloud())?;
        write_label_colour_cloud(
            &self.output.batches.join(&label_name),
            composite.cloud(),
            composite.labels(),
        )?;
        println!(
            "Saved {} composite points from {} batches to {}",
            composite.len(),
            composite.batch_count(),
            self.output.batches.display()
        );

        Ok(BatchSummary {
            mode: BatchMode::Grid,
            batch_count: self.settings.batch_count,
            batch_size: self.settings.batch_size,
            layout: Some(layout),
            composite_points: Some(composite.len()),
            files: vec![true_name, label_name],
        })
    }

    /// Exports every scene of every batch on its own, without repositioning.
    fn run_per_scene(&mut self) -> Result<BatchSummary> {
        let set = self.settings.split.as_str();
        let mut files = Vec::new();
        let pb = progress_bar(self.settings.batch_count as u64, "batches", "Exporting scenes");

        for i in 0..self.settings.batch_count {
            let batch = self.dataset.next_batch(
                self.settings.batch_size,
                self.settings.augment,
                self.settings.dropout,
            )?;
            for (j, (scene, labels)) in batch.scenes.iter().zip(&batch.labels).enumerate() {
                let true_name = format!("{}_trueColors_{}_{}.txt", set, i, j);
                let label_name = format!("{}_labelColors_{}_{}.txt", set, i, j);
                write_true_colour_cloud(&self.output.batches.join(&true_name), scene)?;
                write_label_colour_cloud(&self.output.batches.join(&label_name), scene, labels)?;
                files.push(true_name);
                files.push(label_name);
            }
            pb.inc(1);
        }
        pb.finish_with_message("Scenes exported");

        Ok(BatchSummary {
            mode: BatchMode::PerScene,
            batch_count: self.settings.batch_count,
            batch_size: self.settings.batch_size,
            layout: None::<GridLayout>,
            composite_points: None,
            files,
        })
    }
}

fn progress_bar(len: u64, unit: &str, message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    let template = format!(
        "[{{bar:40.green/blue}}] {{pos}}/{{len}} {} ({{percent}}%) {{msg}}",
        unit
    );
    pb.set_style(
        ProgressStyle::default_bar()
            .template(&template)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("▉▊▋▌▍▎▏ "),
    );
    pb.set_message(message);
    pb
}
