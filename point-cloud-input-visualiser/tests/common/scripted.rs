use input_visualiser::dataset::{
    Batch, Dataset, InputRequest, PointTable, SampledInput, SceneShape,
};
use input_visualiser::error::{Result, VisuError};
use std::collections::VecDeque;

/// Dataset double that replays fixed draws and batches in order.
pub struct ScriptedDataset {
    pub scenes: Vec<PointTable>,
    pub labels: Vec<Vec<u8>>,
    pub filenames: Vec<String>,
    pub short_labels: Vec<String>,
    pub inputs: VecDeque<SampledInput>,
    pub batches: VecDeque<Batch>,
    pub requests: Vec<InputRequest>,
}

impl ScriptedDataset {
    /// Scenes laid out along x, one point per unit, every label 0 or 1.
    pub fn with_point_counts(point_counts: &[usize]) -> Self {
        let scenes: Vec<PointTable> = point_counts
            .iter()
            .map(|&n| {
                PointTable::new(
                    (0..n).map(|i| [i as f64, 0.0, 0.0]).collect(),
                    Some(vec![[0.5, 0.5, 0.5]; n]),
                )
            })
            .collect();
        let labels = point_counts
            .iter()
            .map(|&n| (0..n).map(|i| (i % 2) as u8).collect())
            .collect();
        let filenames = (0..point_counts.len())
            .map(|i| format!("data/train/scene_{}.laz", i))
            .collect();

        Self {
            scenes,
            labels,
            filenames,
            short_labels: vec!["even".to_string(), "odd".to_string()],
            inputs: VecDeque::new(),
            batches: VecDeque::new(),
            requests: Vec::new(),
        }
    }

    /// Queues a draw against `scene`, counting classes from the scene labels.
    pub fn push_draw(&mut self, scene: usize, mask: &[u8]) {
        let mut class_counts = vec![0u64; self.short_labels.len()];
        for (&m, &label) in mask.iter().zip(&self.labels[scene]) {
            if m == 1 {
                class_counts[label as usize] += 1;
            }
        }
        self.inputs.push_back(SampledInput {
            scene,
            mask: Some(mask.iter().map(|&m| m == 1).collect()),
            class_counts,
            seed: mask.iter().position(|&m| m == 1),
        });
    }

    pub fn push_batch(&mut self, batch: Batch) {
        self.batches.push_back(batch);
    }
}

impl Dataset for ScriptedDataset {
    fn num_classes(&self) -> usize {
        self.short_labels.len()
    }

    fn short_label_names(&self) -> &[String] {
        &self.short_labels
    }

    fn data_filenames(&self) -> &[String] {
        &self.filenames
    }

    fn scene_shape(&self, scene: usize) -> Result<SceneShape> {
        let table = self.scene(scene)?;
        Ok(SceneShape {
            point_count: table.len(),
            channels: table.channels(),
        })
    }

    fn scene(&self, scene: usize) -> Result<PointTable> {
        self.scenes
            .get(scene)
            .cloned()
            .ok_or(VisuError::SceneOutOfRange {
                scene,
                count: self.scenes.len(),
            })
    }

    fn label_histogram(&self) -> Vec<u64> {
        let mut bins = vec![0u64; self.short_labels.len()];
        for &label in self.labels.iter().flatten() {
            bins[label as usize] += 1;
        }
        bins
    }

    fn next_input(&mut self, request: InputRequest) -> Result<SampledInput> {
        self.requests.push(request);
        self.inputs
            .pop_front()
            .ok_or_else(|| VisuError::Sampling("scripted inputs exhausted".to_string()))
    }

    fn next_batch(&mut self, _batch_size: usize, _augment: bool, _dropout: bool) -> Result<Batch> {
        self.batches
            .pop_front()
            .ok_or_else(|| VisuError::Sampling("scripted batches exhausted".to_string()))
    }
}

/// Axis-aligned square scene of `side` with corners at `origin`.
pub fn square_scene(origin: [f64; 2], side: f64) -> PointTable {
    PointTable::new(
        vec![
            [origin[0], origin[1], 1.0],
            [origin[0] + side, origin[1], 1.5],
            [origin[0], origin[1] + side, 2.0],
            [origin[0] + side, origin[1] + side, 0.5],
        ],
        Some(vec![[0.1, 0.2, 0.3]; 4]),
    )
}

pub fn square_batch(origins: &[[f64; 2]], side: f64, label: u8) -> Batch {
    Batch {
        scenes: origins.iter().map(|&o| square_scene(o, side)).collect(),
        labels: vec![vec![label; 4]; origins.len()],
        weights: vec![vec![1.0; 4]; origins.len()],
    }
}
