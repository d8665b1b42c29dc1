/// Batch grid compositor. The grid column is the scene's slot inside its
/// batch and the row is the batch index.
use crate::bounds::PointCloudBounds;
use crate::dataset::{Batch, Dataset, PointTable};
use crate::error::{Result, VisuError};
use indicatif::ProgressBar;
use log::{debug, warn};
use serde::Serialize;

/// Grid cell spacing derived from a probe scene's horizontal extent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GridLayout {
    pub xsize: f64,
    pub ysize: f64,
}

impl GridLayout {
    pub fn from_extent(width: f64, depth: f64, margin: f64) -> Self {
        Self {
            xsize: width + margin,
            ysize: depth + margin,
        }
    }

    /// Sizes cells from the first scene of a probe batch.
    pub fn from_probe(probe: &Batch, margin: f64) -> Result<Self> {
        let bounds = probe
            .scenes
            .first()
            .and_then(PointTable::bounds)
            .ok_or(VisuError::EmptyProbe)?;
        let (width, depth, _) = bounds.dimensions();
        Ok(Self::from_extent(width, depth, margin))
    }

    /// Origin of the cell holding scene `slot` of batch `batch`.
    pub fn cell_origin(&self, batch: usize, slot: usize) -> [f64; 3] {
        [slot as f64 * self.xsize, batch as f64 * self.ysize, 0.0]
    }

    /// Moves a scene so that its own minimum corner sits on the cell origin.
    /// Only the spatial columns change.
    pub fn reposition(&self, scene: &PointTable, batch: usize, slot: usize) -> PointTable {
        let Some(bounds) = scene.bounds() else {
            return scene.clone();
        };

        let (width, depth, _) = bounds.dimensions();
        if width > self.xsize || depth > self.ysize {
            warn!(
                "Scene {} of batch {} spans {:.2}x{:.2}, larger than the {:.2}x{:.2} grid cell",
                slot, batch, width, depth, self.xsize, self.ysize
            );
        }

        let origin = self.cell_origin(batch, slot);
        let min = bounds.min_corner();
        scene.translated([origin[0] - min[0], origin[1] - min[1], origin[2] - min[2]])
    }
}

/// All repositioned scenes of a run with their labels, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct BatchComposite {
    cloud: PointTable,
    labels: Vec<u8>,
    batches: usize,
    cell_bounds: Vec<CellBounds>,
}

/// Where one repositioned scene ended up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CellBounds {
    pub batch: usize,
    pub slot: usize,
    pub bounds: PointCloudBounds,
}

impl BatchComposite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cloud(&self) -> &PointTable {
        &self.cloud
    }

    pub fn labels(&self) -> &[u8] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.cloud.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cloud.is_empty()
    }

    pub fn batch_count(&self) -> usize {
        self.batches
    }

    pub fn cell_bounds(&self) -> &[CellBounds] {
        &self.cell_bounds
    }

    /// Repositions every scene of `batch` into row `batch_index` and appends
    /// it with its labels. The whole batch is checked before anything is
    /// appended.
    pub fn push_batch(
        &mut self,
        batch_index: usize,
        batch: &Batch,
        layout: &GridLayout,
    ) -> Result<()> {
        self.check_batch(batch_index, batch)?;

        if self.cloud.is_empty() && self.labels.is_empty() {
            if let Some(first) = batch.scenes.first() {
                self.cloud.colours = first.has_colour().then(Vec::new);
            }
        }

        for (slot, (scene, labels)) in batch.scenes.iter().zip(&batch.labels).enumerate() {
            let placed = layout.reposition(scene, batch_index, slot);
            if let Some(bounds) = placed.bounds() {
                self.cell_bounds.push(CellBounds {
                    batch: batch_index,
                    slot,
                    bounds,
                });
            }
            self.cloud.append(&placed);
            self.labels.extend_from_slice(labels);
        }

        self.batches += 1;
        debug_assert_eq!(self.cloud.len(), self.labels.len());
        Ok(())
    }

    fn check_batch(&self, batch_index: usize, batch: &Batch) -> Result<()> {
        if batch.labels.len() != batch.scenes.len() {
            return Err(VisuError::Sampling(format!(
                "batch {} has {} label vectors for {} scenes",
                batch_index,
                batch.labels.len(),
                batch.scenes.len()
            )));
        }

        let fresh = self.cloud.is_empty() && self.labels.is_empty();
        let expected_colour = match batch.scenes.first() {
            Some(first) if fresh => first.has_colour(),
            _ => self.cloud.has_colour(),
        };
        for (slot, (scene, labels)) in batch.scenes.iter().zip(&batch.labels).enumerate() {
            if labels.len() != scene.len() {
                return Err(VisuError::Sampling(format!(
                    "batch {} scene {} has {} labels for {} points",
                    batch_index,
                    slot,
                    labels.len(),
                    scene.len()
                )));
            }
            if scene.has_colour() != expected_colour {
                return Err(VisuError::ColourMismatch {
                    batch: batch_index,
                    scene: slot,
                });
            }
        }
        Ok(())
    }
}

/// Draws a probe batch to size the grid, then `batch_count` fresh batches
/// that are laid out and concatenated.
pub fn compose_batches(
    dataset: &mut dyn Dataset,
    batch_count: usize,
    batch_size: usize,
    augment: bool,
    dropout: bool,
    margin: f64,
    pb: &ProgressBar,
) -> Result<(GridLayout, BatchComposite)> {
    let probe = dataset.next_batch(batch_size, augment, dropout)?;
    let layout = GridLayout::from_probe(&probe, margin)?;
    debug!("Grid cells {:.2} x {:.2}", layout.xsize, layout.ysize);

    let mut composite = BatchComposite::new();
    pb.set_length(batch_count as u64);
    for i in 0..batch_count {
        let batch = dataset.next_batch(batch_size, augment, dropout)?;
        composite.push_batch(i, &batch, &layout)?;
        pb.inc(1);
    }

    Ok((layout, composite))
}
