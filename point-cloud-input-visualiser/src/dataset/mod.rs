/// Dataset accessor capability interface and its concrete accessors
mod las_source;
mod sampler;
mod scene;
mod synthetic;

pub use las_source::LasSource;
pub use sampler::SceneDataset;
pub use scene::{PointTable, Scene};
pub use synthetic::SyntheticSource;

use crate::config::{DatasetParams, Split};
use crate::error::Result;
use clap::ValueEnum;

/// Flags forwarded to a single input draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputRequest {
    pub dropout: bool,
    pub want_mask: bool,
    pub augment: bool,
    pub want_seed: bool,
}

/// Result of one sampling draw against a single scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SampledInput {
    pub scene: usize,
    /// One entry per scene point, true when the point was part of the input.
    pub mask: Option<Vec<bool>>,
    /// Label histogram of the selected points, one bin per class.
    pub class_counts: Vec<u64>,
    /// Index of the point the sampling box was centred on.
    pub seed: Option<usize>,
}

/// A batch of sampled inputs as fed to the network.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    pub scenes: Vec<PointTable>,
    pub labels: Vec<Vec<u8>>,
    /// Per-point class weights, carried alongside but unused for visualisation.
    pub weights: Vec<Vec<f32>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneShape {
    pub point_count: usize,
    pub channels: usize,
}

/// The coverage estimator draws single inputs with point masks, the batch
/// compositor draws whole batches. Concrete accessors are picked by
/// [`DatasetKind`] and built by [`open_dataset`].
pub trait Dataset {
    fn num_classes(&self) -> usize;

    fn short_label_names(&self) -> &[String];

    /// One identifier per scene, in scene index order.
    fn data_filenames(&self) -> &[String];

    fn scene_shape(&self, scene: usize) -> Result<SceneShape>;

    fn scene(&self, scene: usize) -> Result<PointTable>;

    /// Label histogram of the stored clouds, before any input sampling.
    fn label_histogram(&self) -> Vec<u64>;

    /// Draw one input. Successive calls are not expected to be deterministic.
    fn next_input(&mut self, request: InputRequest) -> Result<SampledInput>;

    fn next_batch(&mut self, batch_size: usize, augment: bool, dropout: bool) -> Result<Batch>;
}

/// Concrete accessor selected from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DatasetKind {
    /// LAS/LAZ scenes read from `{data_path}/{split}/`.
    Semantic,
    /// Procedurally generated scenes, no data on disk required.
    Synthetic,
}

impl DatasetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetKind::Semantic => "semantic",
            DatasetKind::Synthetic => "synthetic",
        }
    }
}

/// Options shared by every concrete accessor.
#[derive(Debug, Clone)]
pub struct DatasetOptions {
    pub split: Split,
    pub points_per_input: usize,
    pub params: DatasetParams,
    pub rng_seed: Option<u64>,
}

/// Source of fully loaded scenes for a [`SceneDataset`].
pub trait SceneSource {
    fn load(&self) -> Result<Vec<Scene>>;

    fn describe(&self) -> String;
}

/// Build the accessor named by `kind`.
pub fn open_dataset(kind: DatasetKind, options: &DatasetOptions) -> Result<Box<dyn Dataset>> {
    let source: Box<dyn SceneSource> = match kind {
        DatasetKind::Semantic => Box::new(LasSource::new(&options.params.data_path, options.split)),
        DatasetKind::Synthetic => Box::new(SyntheticSource::new(
            options.split,
            options.rng_seed.unwrap_or(0),
        )),
    };

    println!("Loading {} dataset: {}", kind.as_str(), source.describe());
    let scenes = source.load()?;
    let dataset = SceneDataset::new(scenes, options)?;
    Ok(Box::new(dataset))
}
