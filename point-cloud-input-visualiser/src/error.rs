/// Error types for sampling statistics and batch visualisation runs.
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VisuError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("LAS error: {0}")]
    Las(#[from] las::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("dataset has no scenes")]
    EmptyDataset,
    #[error("scene {scene} has no points")]
    EmptyScene { scene: usize },
    #[error("scene index {scene} out of range ({count} scenes)")]
    SceneOutOfRange { scene: usize, count: usize },
    #[error("mask for scene {scene} has {got} entries, expected {expected}")]
    MaskLength {
        scene: usize,
        got: usize,
        expected: usize,
    },
    #[error("class delta has {got} bins, expected {expected}")]
    ClassBins { got: usize, expected: usize },
    #[error("draw for scene {scene} returned no point mask")]
    MissingMask { scene: usize },
    #[error("sampling failed: {0}")]
    Sampling(String),
    #[error("probe batch has no points to size the grid")]
    EmptyProbe,
    #[error("batch {batch} scene {scene} colour channels disagree with the composite")]
    ColourMismatch { batch: usize, scene: usize },
}

pub type Result<T> = std::result::Result<T, VisuError>;
