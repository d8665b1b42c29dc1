/// Sampling coverage statistics and batch visualisation for point cloud
/// segmentation datasets
pub mod bounds;
pub mod compositor;
pub mod config;
pub mod coverage;
pub mod dataset;
pub mod error;
pub mod export;
pub mod manifest;
pub mod plot;
pub mod visualiser;

pub use error::{Result, VisuError};
