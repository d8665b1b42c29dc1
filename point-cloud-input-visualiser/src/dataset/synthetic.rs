/// Procedurally generated street scenes for runs without data on disk.
use super::{PointTable, Scene, SceneSource};
use crate::config::Split;
use crate::error::Result;
use constants::class::{class_index, label_colour};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SCENE_COUNT: usize = 6;
const BASE_POINTS_PER_SCENE: usize = 4000;
const SCENE_SIDE: f64 = 40.0;
const OBJECTS_PER_SCENE: usize = 5;

/// LAS codes of the classes placed as obstacles on the ground plane.
const OBJECT_CODES: [u8; 5] = [3, 5, 6, 8, 15];
const GROUND_CODE: u8 = 2;
const PAVEMENT_CODE: u8 = 11;

struct Obstacle {
    label: u8,
    centre: [f64; 2],
    half_size: [f64; 2],
    height: f64,
}

impl Obstacle {
    fn contains(&self, x: f64, y: f64) -> bool {
        (x - self.centre[0]).abs() <= self.half_size[0]
            && (y - self.centre[1]).abs() <= self.half_size[1]
    }
}

pub struct SyntheticSource {
    split: Split,
    seed: u64,
}

impl SyntheticSource {
    pub fn new(split: Split, seed: u64) -> Self {
        Self { split, seed }
    }

    fn split_seed(&self) -> u64 {
        match self.split {
            Split::Train => self.seed,
            Split::Test => self.seed.wrapping_add(0x5EED),
        }
    }
}

impl SceneSource for SyntheticSource {
    fn load(&self) -> Result<Vec<Scene>> {
        let mut rng = StdRng::seed_from_u64(self.split_seed());
        Ok((0..SCENE_COUNT)
            .map(|index| generate_scene(&mut rng, index))
            .collect())
    }

    fn describe(&self) -> String {
        format!(
            "{} generated {} scenes (seed {})",
            SCENE_COUNT,
            self.split.as_str(),
            self.split_seed()
        )
    }
}

fn generate_scene(rng: &mut StdRng, index: usize) -> Scene {
    // Scenes differ in size so that they can be told apart by shape.
    let point_count = BASE_POINTS_PER_SCENE + index * 500;

    let obstacles: Vec<Obstacle> = (0..OBJECTS_PER_SCENE)
        .map(|_| {
            let code = OBJECT_CODES[rng.gen_range(0..OBJECT_CODES.len())];
            Obstacle {
                label: class_index(code) as u8,
                centre: [
                    rng.gen_range(4.0..SCENE_SIDE - 4.0),
                    rng.gen_range(4.0..SCENE_SIDE - 4.0),
                ],
                half_size: [rng.gen_range(1.0..4.0), rng.gen_range(1.0..4.0)],
                height: rng.gen_range(1.5..12.0),
            }
        })
        .collect();

    let mut positions = Vec::with_capacity(point_count);
    let mut colours = Vec::with_capacity(point_count);
    let mut labels = Vec::with_capacity(point_count);

    for _ in 0..point_count {
        let x = rng.gen_range(0.0..SCENE_SIDE);
        let y = rng.gen_range(0.0..SCENE_SIDE);

        let (z, label) = match obstacles.iter().find(|o| o.contains(x, y)) {
            Some(obstacle) => (rng.gen_range(0.0..obstacle.height), obstacle.label),
            None => {
                let code = if x < SCENE_SIDE / 2.0 {
                    GROUND_CODE
                } else {
                    PAVEMENT_CODE
                };
                (rng.gen_range(-0.05..0.05), class_index(code) as u8)
            }
        };

        let base = label_colour(label as usize);
        let jitter: f32 = rng.gen_range(-0.05..0.05);
        colours.push(base.map(|c| (c as f32 / 255.0 + jitter).clamp(0.0, 1.0)));
        positions.push([x, y, z]);
        labels.push(label);
    }

    Scene {
        name: format!("synthetic_{:02}", index),
        points: PointTable::new(positions, Some(colours)),
        labels,
    }
}
