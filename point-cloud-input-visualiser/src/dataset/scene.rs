/// Scene geometry tables shared by the dataset accessors and both pipelines
use crate::bounds::PointCloudBounds;

/// Per-point geometry with optional colour and height feature columns.
/// Colours are stored in the 0-1 range.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointTable {
    pub positions: Vec<[f64; 3]>,
    pub colours: Option<Vec<[f32; 3]>>,
    /// Normalised height feature emitted when the z feature is enabled.
    pub z_feature: Option<Vec<f32>>,
}

impl PointTable {
    pub fn new(positions: Vec<[f64; 3]>, colours: Option<Vec<[f32; 3]>>) -> Self {
        Self {
            positions,
            colours,
            z_feature: None,
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn has_colour(&self) -> bool {
        self.colours.is_some()
    }

    /// Geometry columns per row: xyz, plus rgb when colour is present
    pub fn channels(&self) -> usize {
        if self.has_colour() { 6 } else { 3 }
    }

    pub fn bounds(&self) -> Option<PointCloudBounds> {
        PointCloudBounds::from_positions(&self.positions)
    }

    /// Copy of the table with every position shifted by `offset`.
    /// Colour and feature columns are left untouched.
    pub fn translated(&self, offset: [f64; 3]) -> Self {
        Self {
            positions: self
                .positions
                .iter()
                .map(|p| [p[0] + offset[0], p[1] + offset[1], p[2] + offset[2]])
                .collect(),
            colours: self.colours.clone(),
            z_feature: self.z_feature.clone(),
        }
    }

    /// Row-wise union with another table of the same colour layout.
    /// Feature columns are not carried through concatenation.
    pub fn append(&mut self, other: &PointTable) {
        self.positions.extend_from_slice(&other.positions);
        if let (Some(colours), Some(other_colours)) = (&mut self.colours, &other.colours) {
            colours.extend_from_slice(other_colours);
        }
        self.z_feature = None;
    }

    /// Geometry row `x y z [r g b]` for point `index`
    pub fn row(&self, index: usize) -> Vec<f64> {
        let p = self.positions[index];
        let mut row = Vec::with_capacity(self.channels() + 1);
        row.extend_from_slice(&p);
        if let Some(colours) = &self.colours {
            let c = colours[index];
            row.extend(c.iter().map(|&v| v as f64));
        }
        row
    }
}

/// One fully loaded scene with its per-point class indices
#[derive(Debug, Clone)]
pub struct Scene {
    pub name: String,
    pub points: PointTable,
    pub labels: Vec<u8>,
}

impl Scene {
    pub fn point_count(&self) -> usize {
        self.points.len()
    }
}
