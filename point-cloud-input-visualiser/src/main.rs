/// Input visualiser entry point
use clap::{ArgAction, Parser};
use input_visualiser::config::{Split, load_params};
use input_visualiser::dataset::{DatasetKind, DatasetOptions, open_dataset};
use input_visualiser::visualiser::{InputVisualiser, RunSettings};
use log::info;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "point-cloud-input-visualiser", version)]
struct Args {
    /// Dataset split to sample from
    #[arg(long = "set", value_enum, default_value = "train")]
    split: Split,

    /// Estimate class repartition and per-point selection likelihood
    #[arg(long, default_value_t = false)]
    stats: bool,

    /// Render histogram plots during the statistics pass
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    draw: bool,

    /// Number of batches to visualise
    #[arg(long = "n", default_value_t = 8)]
    batch_count: usize,

    /// Number of inputs drawn per scene for the statistics pass
    #[arg(long = "nps", default_value_t = 100)]
    samples_per_scene: usize,

    #[arg(long, default_value_t = 8)]
    batch_size: usize,

    /// Points per network input
    #[arg(long, default_value_t = 4096)]
    num_point: usize,

    #[arg(long, value_enum, default_value = "semantic")]
    dataset: DatasetKind,

    /// User configuration, merged over the base configuration
    #[arg(long, default_value = "config.json")]
    config: PathBuf,

    #[arg(long, default_value = "default.json")]
    base_config: PathBuf,

    #[arg(long, default_value = "visu")]
    output_dir: PathBuf,

    /// Apply random input dropout when sampling
    #[arg(long, default_value_t = false)]
    dropout: bool,

    /// Apply random rotation around the vertical axis to batches
    #[arg(long, default_value_t = false)]
    augment: bool,

    /// Maximum number of scenes exported with densities
    #[arg(long, default_value_t = 20)]
    max_export: usize,

    /// Export every scene of every batch on its own instead of one grid
    #[arg(long, default_value_t = false)]
    per_scene: bool,

    /// Seed for the dataset's random generator
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let params = load_params(&args.base_config, &args.config)?;
    info!("Dataset parameters: {:?}", params);

    let options = DatasetOptions {
        split: args.split,
        points_per_input: args.num_point,
        params,
        rng_seed: args.seed,
    };
    let dataset = open_dataset(args.dataset, &options)?;

    let settings = RunSettings {
        dataset: args.dataset,
        split: args.split,
        stats: args.stats,
        draw_plots: args.draw,
        batch_count: args.batch_count,
        samples_per_scene: args.samples_per_scene,
        batch_size: args.batch_size,
        dropout: args.dropout,
        augment: args.augment,
        max_export: args.max_export,
        group_by_batches: !args.per_scene,
        output_root: args.output_dir,
    };

    let mut visualiser = InputVisualiser::new(dataset, settings);
    visualiser.run()?;

    Ok(())
}
