/// Axis-aligned point cloud bounds used for grid sizing and box sampling
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointCloudBounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
    pub min_z: f64,
    pub max_z: f64,
}

impl Default for PointCloudBounds {
    fn default() -> Self {
        Self::new()
    }
}

impl PointCloudBounds {
    /// Create new bounds initialised to infinity values
    pub fn new() -> Self {
        Self {
            min_x: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            min_y: f64::INFINITY,
            max_y: f64::NEG_INFINITY,
            min_z: f64::INFINITY,
            max_z: f64::NEG_INFINITY,
        }
    }

    /// Bounds of a set of positions; `None` when there are none
    pub fn from_positions(positions: &[[f64; 3]]) -> Option<Self> {
        if positions.is_empty() {
            return None;
        }
        let mut bounds = Self::new();
        for p in positions {
            bounds.update(p[0], p[1], p[2]);
        }
        Some(bounds)
    }

    /// Update bounds with a new point
    pub fn update(&mut self, x: f64, y: f64, z: f64) {
        self.min_x = self.min_x.min(x);
        self.max_x = self.max_x.max(x);
        self.min_y = self.min_y.min(y);
        self.max_y = self.max_y.max(y);
        self.min_z = self.min_z.min(z);
        self.max_z = self.max_z.max(z);
    }

    /// World space extents along each axis
    pub fn dimensions(&self) -> (f64, f64, f64) {
        (
            self.max_x - self.min_x,
            self.max_y - self.min_y,
            self.max_z - self.min_z,
        )
    }

    pub fn min_corner(&self) -> [f64; 3] {
        [self.min_x, self.min_y, self.min_z]
    }

    /// True when the two boxes share interior area in the horizontal plane
    pub fn overlaps_xy(&self, other: &Self) -> bool {
        self.min_x < other.max_x
            && other.min_x < self.max_x
            && self.min_y < other.max_y
            && other.min_y < self.max_y
    }

    /// Normalise Z coordinate to 0-1 range, flat clouds map to zero
    pub fn normalize_z(&self, z: f64) -> f32 {
        let span = self.max_z - self.min_z;
        if span > 0.0 {
            ((z - self.min_z) / span) as f32
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_track_extremes() {
        let bounds =
            PointCloudBounds::from_positions(&[[1.0, -2.0, 0.5], [4.0, 3.0, -1.0]]).unwrap();
        assert_eq!(bounds.min_corner(), [1.0, -2.0, -1.0]);
        assert_eq!(bounds.dimensions(), (3.0, 5.0, 1.5));
    }

    #[test]
    fn touching_boxes_do_not_overlap() {
        let a = PointCloudBounds::from_positions(&[[0.0, 0.0, 0.0], [10.0, 10.0, 0.0]]).unwrap();
        let b =
            PointCloudBounds::from_positions(&[[10.0, 0.0, 0.0], [20.0, 10.0, 0.0]]).unwrap();
        let c = PointCloudBounds::from_positions(&[[5.0, 5.0, 0.0], [15.0, 15.0, 0.0]]).unwrap();
        assert!(!a.overlaps_xy(&b));
        assert!(a.overlaps_xy(&c));
    }

    #[test]
    fn empty_positions_have_no_bounds() {
        assert!(PointCloudBounds::from_positions(&[]).is_none());
    }
}
