//! Pick hits and ranked pick results

use serde::{Deserialize, Serialize};

use crate::geometry::Vec3;
use super::feature::BoxFeature;

/// Kind of handle a hit refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HitKind {
    Face,
    Edge,
    Corner,
}

impl HitKind {
    /// Every handle kind the scale tool produces
    pub const ALL: [HitKind; 3] = [HitKind::Face, HitKind::Edge, HitKind::Corner];

    pub fn as_str(&self) -> &'static str {
        match self {
            HitKind::Face => "face",
            HitKind::Edge => "edge",
            HitKind::Corner => "corner",
        }
    }
}

/// A single ray hit on a box handle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Distance along the pick ray (>= 0)
    pub distance: f32,
    /// World-space point on the ray at `distance`
    pub point: Vec3,
    pub target: BoxFeature,
}

impl Hit {
    pub fn new(distance: f32, point: Vec3, target: BoxFeature) -> Self {
        Self { distance, point, target }
    }

    /// Handle kind, always the kind of `target`
    pub fn kind(&self) -> HitKind {
        self.target.kind()
    }
}

/// Hits collected for one pick ray, ordered nearest first.
///
/// Hits at equal distance keep their insertion order.
#[derive(Debug, Clone, Default)]
pub struct PickResult {
    hits: Vec<Hit>,
}

impl PickResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a hit after every hit that is not farther away
    pub fn add_hit(&mut self, hit: Hit) {
        let index = self.hits.partition_point(|h| h.distance <= hit.distance);
        self.hits.insert(index, hit);
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn hits(&self) -> &[Hit] {
        &self.hits
    }

    /// Nearest hit of any kind
    pub fn first(&self) -> Option<&Hit> {
        self.hits.first()
    }

    /// Nearest hit whose kind is in `kinds`; hits of other kinds do not occlude
    pub fn first_of(&self, kinds: &[HitKind]) -> Option<&Hit> {
        self.hits.iter().find(|h| kinds.contains(&h.kind()))
    }

    /// All hits whose kind is in `kinds`, nearest first
    pub fn all_of<'a>(&'a self, kinds: &'a [HitKind]) -> impl Iterator<Item = &'a Hit> + 'a {
        self.hits.iter().filter(move |h| kinds.contains(&h.kind()))
    }
}

impl From<Option<Hit>> for PickResult {
    fn from(hit: Option<Hit>) -> Self {
        let mut result = PickResult::new();
        if let Some(hit) = hit {
            result.add_hit(hit);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::feature::{BBoxCorner, BBoxSide};

    fn side_hit(distance: f32) -> Hit {
        Hit::new(distance, Vec3::ZERO, BoxFeature::Side(BBoxSide::new(Vec3::POS_X)))
    }

    fn corner_hit(distance: f32) -> Hit {
        Hit::new(distance, Vec3::ZERO, BoxFeature::Corner(BBoxCorner::new(Vec3::ONE)))
    }

    #[test]
    fn test_hits_sorted_by_distance() {
        let mut result = PickResult::new();
        result.add_hit(side_hit(5.0));
        result.add_hit(corner_hit(2.0));
        result.add_hit(side_hit(3.0));

        let distances: Vec<f32> = result.hits().iter().map(|h| h.distance).collect();
        assert_eq!(distances, vec![2.0, 3.0, 5.0]);
        assert_eq!(result.first().unwrap().kind(), HitKind::Corner);
    }

    #[test]
    fn test_kind_follows_target() {
        let mut hit = side_hit(1.0);
        assert_eq!(hit.kind(), HitKind::Face);
        hit.target = BoxFeature::Corner(BBoxCorner::new(Vec3::ONE));
        assert_eq!(hit.kind(), HitKind::Corner);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let mut result = PickResult::new();
        result.add_hit(side_hit(4.0));
        result.add_hit(corner_hit(4.0));
        assert_eq!(result.first().unwrap().kind(), HitKind::Face);
    }

    #[test]
    fn test_first_of_filters_kinds() {
        let mut result = PickResult::new();
        result.add_hit(corner_hit(1.0));
        result.add_hit(side_hit(2.0));

        assert_eq!(result.first_of(&[HitKind::Face]).unwrap().distance, 2.0);
        assert!(result.first_of(&[HitKind::Edge]).is_none());
        assert_eq!(result.all_of(&HitKind::ALL).count(), 2);
    }

    #[test]
    fn test_empty_result() {
        let result = PickResult::from(None);
        assert!(result.is_empty());
        assert!(result.first_of(&HitKind::ALL).is_none());
    }
}
