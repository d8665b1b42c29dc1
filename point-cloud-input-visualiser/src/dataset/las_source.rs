/// LAS/LAZ scene loading for the semantic dataset accessor.
use super::{PointTable, Scene, SceneSource};
use crate::config::Split;
use crate::error::{Result, VisuError};
use constants::class::class_index;
use indicatif::{ProgressBar, ProgressStyle};
use las::Reader;
use log::{debug, info};
use rayon::prelude::*;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Scene files of one split, read from `{data_path}/{split}/`.
pub struct LasSource {
    split_dir: PathBuf,
}

impl LasSource {
    pub fn new(data_path: &Path, split: Split) -> Self {
        Self {
            split_dir: data_path.join(split.as_str()),
        }
    }
}

impl SceneSource for LasSource {
    fn load(&self) -> Result<Vec<Scene>> {
        let files = discover_scene_files(&self.split_dir)?;
        if files.is_empty() {
            return Err(VisuError::Config(format!(
                "no .las/.laz scenes found in {}",
                self.split_dir.display()
            )));
        }

        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{bar:40.green/blue}] {pos}/{len} scenes ({percent}%) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("▉▊▋▌▍▎▏ "),
        );
        pb.set_message("Loading scenes");

        let scenes = files
            .par_iter()
            .map(|path| {
                let scene = load_scene(path);
                pb.inc(1);
                scene
            })
            .collect::<Result<Vec<_>>>()?;

        pb.finish_with_message("Scenes loaded");
        info!(
            "Loaded {} scenes ({} points) from {}",
            scenes.len(),
            scenes.iter().map(Scene::point_count).sum::<usize>(),
            self.split_dir.display()
        );
        Ok(scenes)
    }

    fn describe(&self) -> String {
        self.split_dir.display().to_string()
    }
}

/// Lists `.las`/`.laz` files in `dir`, sorted by file name so scene
/// indices are stable between runs.
pub fn discover_scene_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(VisuError::Config(format!(
            "scene directory does not exist: {}",
            dir.display()
        )));
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        if let Some(extension) = path.extension() {
            let ext_str = extension.to_string_lossy().to_lowercase();
            if ext_str == "laz" || ext_str == "las" {
                files.push(path);
            }
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Create LAS file reader for point cloud access.
/// Handles both .las and .laz compressed formats.
fn create_reader(file_path: &Path) -> Result<Reader> {
    let file = File::open(file_path)?;
    let buf_reader = BufReader::new(file);
    Ok(Reader::new(buf_reader)?)
}

/// Reads every point of one scene file, mapping classification codes to
/// class indices and 16-bit colour to the 0-1 range.
fn load_scene(path: &Path) -> Result<Scene> {
    let mut reader = create_reader(path)?;
    let total_points = reader.header().number_of_points() as usize;

    let mut positions = Vec::with_capacity(total_points);
    let mut colours = Vec::with_capacity(total_points);
    let mut labels = Vec::with_capacity(total_points);
    let mut has_colour = true;

    for point_result in reader.points() {
        let point = point_result?;
        positions.push([point.x, point.y, point.z]);
        labels.push(class_index(u8::from(point.classification)) as u8);

        match point.color {
            Some(c) => colours.push([
                c.red as f32 / 65535.0,
                c.green as f32 / 65535.0,
                c.blue as f32 / 65535.0,
            ]),
            None => has_colour = false,
        }
    }

    let name = path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    debug!(
        "{}: {} points, colour={}",
        name,
        positions.len(),
        has_colour
    );

    Ok(Scene {
        name,
        points: PointTable::new(positions, has_colour.then_some(colours)),
        labels,
    })
}
