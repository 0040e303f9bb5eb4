//! Axis-aligned bounding box

use serde::{Serialize, Deserialize};
use super::math::Vec3;

/// Axis-aligned box. Valid boxes satisfy `min <= max` on every axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox3 {
    pub min: Vec3,
    pub max: Vec3,
}

impl BBox3 {
    /// Create a box from its corners as given (no reordering)
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Smallest box containing both points
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        Self { min: a.min(b), max: a.max(b) }
    }

    /// The unit cube spanning [-1,-1,-1] to [1,1,1]
    pub fn unit_cube() -> Self {
        Self { min: -Vec3::ONE, max: Vec3::ONE }
    }

    /// Finite and `min <= max` component-wise
    pub fn is_valid(&self) -> bool {
        self.min.is_finite()
            && self.max.is_finite()
            && self.min.x <= self.max.x
            && self.min.y <= self.max.y
            && self.min.z <= self.max.z
    }

    /// True if any axis has zero (or negative) extent
    pub fn is_degenerate(&self) -> bool {
        let size = self.size();
        size.x <= 0.0 || size.y <= 0.0 || size.z <= 0.0
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Point containment, boundary inclusive
    pub fn contains(&self, point: Vec3) -> bool {
        point.x >= self.min.x && point.x <= self.max.x
            && point.y >= self.min.y && point.y <= self.max.y
            && point.z >= self.min.z && point.z <= self.max.z
    }

    /// Smallest box containing both boxes
    pub fn merge(&self, other: &BBox3) -> BBox3 {
        BBox3 {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn translate(&self, delta: Vec3) -> BBox3 {
        BBox3 {
            min: self.min + delta,
            max: self.max + delta,
        }
    }
}

impl std::fmt::Display for BBox3 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}->{}", self.min, self.max)
    }
}
