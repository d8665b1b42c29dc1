/// Box-around-seed sampling over a set of loaded scenes.
use super::{
    Batch, Dataset, DatasetOptions, InputRequest, PointTable, SampledInput, Scene, SceneShape,
};
use crate::bounds::PointCloudBounds;
use crate::error::{Result, VisuError};
use constants::class::{num_classes, short_label_names};
use constants::sampling::CLASS_WEIGHT_OFFSET;
use log::info;
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};

/// Points picked by one draw, before resampling to the input size.
struct Selection {
    scene: usize,
    seed: usize,
    indices: Vec<usize>,
}

/// Dataset accessor shared by every scene source.
///
/// Scenes are drawn with probability proportional to their point count, a
/// seed point is drawn uniformly inside the scene, and the input is the
/// vertical column of side `box_size` centred on that seed.
pub struct SceneDataset {
    scenes: Vec<Scene>,
    scene_bounds: Vec<PointCloudBounds>,
    filenames: Vec<String>,
    short_labels: Vec<String>,
    label_histogram: Vec<u64>,
    class_weights: Vec<f32>,
    scene_picker: WeightedIndex<usize>,
    rng: StdRng,
    box_size: f64,
    dropout_max: f64,
    use_color: bool,
    use_z_feature: bool,
    points_per_input: usize,
}

impl SceneDataset {
    pub fn new(scenes: Vec<Scene>, options: &DatasetOptions) -> Result<Self> {
        if scenes.is_empty() {
            return Err(VisuError::EmptyDataset);
        }

        let mut scene_bounds = Vec::with_capacity(scenes.len());
        for (index, scene) in scenes.iter().enumerate() {
            let bounds = scene
                .points
                .bounds()
                .ok_or(VisuError::EmptyScene { scene: index })?;
            if scene.labels.len() != scene.point_count() {
                return Err(VisuError::Sampling(format!(
                    "scene {} has {} labels for {} points",
                    scene.name,
                    scene.labels.len(),
                    scene.point_count()
                )));
            }
            scene_bounds.push(bounds);
        }

        let class_count = num_classes();
        let mut label_histogram = vec![0u64; class_count];
        for scene in &scenes {
            for &label in &scene.labels {
                if let Some(bin) = label_histogram.get_mut(label as usize) {
                    *bin += 1;
                }
            }
        }
        let class_weights = inverse_frequency_weights(&label_histogram);

        let scene_picker = WeightedIndex::new(scenes.iter().map(Scene::point_count))
            .map_err(|e| VisuError::Sampling(format!("cannot weight scenes: {e}")))?;
        let rng = match options.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        info!(
            "{} scenes, {} classes, box size {}, dropout max {}",
            scenes.len(),
            class_count,
            options.params.box_size,
            options.params.input_dropout
        );

        Ok(Self {
            filenames: scenes.iter().map(|s| s.name.clone()).collect(),
            scenes,
            scene_bounds,
            short_labels: short_label_names(),
            label_histogram,
            class_weights,
            scene_picker,
            rng,
            box_size: options.params.box_size,
            dropout_max: options.params.input_dropout,
            use_color: options.params.use_color,
            use_z_feature: options.params.use_z_feature,
            points_per_input: options.points_per_input,
        })
    }

    fn get(&self, scene: usize) -> Result<&Scene> {
        self.scenes.get(scene).ok_or(VisuError::SceneOutOfRange {
            scene,
            count: self.scenes.len(),
        })
    }

    fn draw_selection(&mut self, dropout: bool) -> Selection {
        let scene_index = self.scene_picker.sample(&mut self.rng);
        let scene = &self.scenes[scene_index];
        let seed = self.rng.gen_range(0..scene.point_count());
        let centre = scene.points.positions[seed];
        let half = self.box_size / 2.0;

        let mut indices: Vec<usize> = scene
            .points
            .positions
            .iter()
            .enumerate()
            .filter(|(_, p)| (p[0] - centre[0]).abs() <= half && (p[1] - centre[1]).abs() <= half)
            .map(|(i, _)| i)
            .collect();

        if dropout && self.dropout_max > 0.0 {
            let ratio = self.rng.gen_range(0.0..self.dropout_max);
            let rng = &mut self.rng;
            indices.retain(|_| rng.r#gen::<f64>() >= ratio);
            if indices.is_empty() {
                indices.push(seed);
            }
        }

        Selection {
            scene: scene_index,
            seed,
            indices,
        }
    }

    /// Resample a selection to the network input size and lay it out
    /// around the seed column.
    fn build_input(&mut self, selection: &Selection, augment: bool) -> (PointTable, Vec<u8>) {
        let count = selection.indices.len();
        let picks: Vec<usize> = if count >= self.points_per_input {
            index::sample(&mut self.rng, count, self.points_per_input).into_vec()
        } else {
            (0..self.points_per_input)
                .map(|_| self.rng.gen_range(0..count))
                .collect()
        };

        let scene = &self.scenes[selection.scene];
        let bounds = &self.scene_bounds[selection.scene];
        let centre = scene.points.positions[selection.seed];
        let angle: f64 = if augment {
            self.rng.gen_range(0.0..std::f64::consts::TAU)
        } else {
            0.0
        };
        let (sin, cos) = angle.sin_cos();

        let mut positions = Vec::with_capacity(picks.len());
        let mut colours = Vec::with_capacity(picks.len());
        let mut heights = Vec::with_capacity(picks.len());
        let mut labels = Vec::with_capacity(picks.len());

        for &pick in &picks {
            let point_index = selection.indices[pick];
            let p = scene.points.positions[point_index];
            let (dx, dy) = (p[0] - centre[0], p[1] - centre[1]);
            positions.push([cos * dx - sin * dy, sin * dx + cos * dy, p[2]]);
            labels.push(scene.labels[point_index]);

            if self.use_color {
                let colour = scene
                    .points
                    .colours
                    .as_ref()
                    .map_or([0.0; 3], |c| c[point_index]);
                colours.push(colour);
            }
            if self.use_z_feature {
                heights.push(bounds.normalize_z(p[2]));
            }
        }

        let mut table = PointTable::new(positions, self.use_color.then_some(colours));
        if self.use_z_feature {
            table.z_feature = Some(heights);
        }
        (table, labels)
    }
}

/// Inverse log frequency class weights, `1 / ln(offset + frequency)`.
fn inverse_frequency_weights(histogram: &[u64]) -> Vec<f32> {
    let total: u64 = histogram.iter().sum();
    histogram
        .iter()
        .map(|&count| {
            let frequency = if total > 0 {
                count as f64 / total as f64
            } else {
                0.0
            };
            (1.0 / (CLASS_WEIGHT_OFFSET + frequency).ln()) as f32
        })
        .collect()
}

impl Dataset for SceneDataset {
    fn num_classes(&self) -> usize {
        self.label_histogram.len()
    }

    fn short_label_names(&self) -> &[String] {
        &self.short_labels
    }

    fn data_filenames(&self) -> &[String] {
        &self.filenames
    }

    fn scene_shape(&self, scene: usize) -> Result<SceneShape> {
        let scene = self.get(scene)?;
        Ok(SceneShape {
            point_count: scene.point_count(),
            channels: if self.use_color { 6 } else { 3 },
        })
    }

    fn scene(&self, scene: usize) -> Result<PointTable> {
        let scene = self.get(scene)?;
        let colours = if self.use_color {
            Some(
                scene
                    .points
                    .colours
                    .clone()
                    .unwrap_or_else(|| vec![[0.0; 3]; scene.point_count()]),
            )
        } else {
            None
        };
        Ok(PointTable::new(scene.points.positions.clone(), colours))
    }

    fn label_histogram(&self) -> Vec<u64> {
        self.label_histogram.clone()
    }

    /// Augmentation does not change which points are selected, so it has no
    /// effect on the returned mask.
    fn next_input(&mut self, request: InputRequest) -> Result<SampledInput> {
        let selection = self.draw_selection(request.dropout);
        let scene = &self.scenes[selection.scene];

        let mut class_counts = vec![0u64; self.label_histogram.len()];
        for &i in &selection.indices {
            if let Some(bin) = class_counts.get_mut(scene.labels[i] as usize) {
                *bin += 1;
            }
        }

        let mask = request.want_mask.then(|| {
            let mut mask = vec![false; scene.point_count()];
            for &i in &selection.indices {
                mask[i] = true;
            }
            mask
        });

        Ok(SampledInput {
            scene: selection.scene,
            mask,
            class_counts,
            seed: request.want_seed.then_some(selection.seed),
        })
    }

    fn next_batch(&mut self, batch_size: usize, augment: bool, dropout: bool) -> Result<Batch> {
        let mut batch = Batch::default();
        for _ in 0..batch_size {
            let selection = self.draw_selection(dropout);
            let (table, labels) = self.build_input(&selection, augment);
            let weights = labels
                .iter()
                .map(|&l| self.class_weights.get(l as usize).copied().unwrap_or(0.0))
                .collect();
            batch.scenes.push(table);
            batch.labels.push(labels);
            batch.weights.push(weights);
        }
        Ok(batch)
    }
}
