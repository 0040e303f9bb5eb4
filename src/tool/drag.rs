//! Resize drag state and delta projection
//!
//! A resize drag is constrained to the handle's drag axis: the mouse ray is
//! reduced to the closest point on the line through the drag origin along
//! that axis, the signed distance is split across the sides the handle
//! belongs to, snapped, and applied to the box captured at drag start.

use crate::document::Grid;
use crate::geometry::{ray_line_closest_point, BBox3, Ray, Vec3};
use super::feature::{move_bbox_face, BoxFeature};
use super::hit::Hit;

/// The status of a drag after an update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragStatus {
    /// Drag continues, the update was applied (or there was nothing to apply)
    Continue,
    /// Drag continues but this update was rejected
    Deny,
    /// Drag should end
    End,
}

/// How a finished drag resolved its transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionOutcome {
    Committed,
    Cancelled,
}

/// Everything recorded when a resize drag starts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    /// The handle hit that started the drag
    pub start_hit: Hit,
    /// Selection bounds when the drag started
    pub box_at_start: BBox3,
    /// World point where the handle was grabbed
    pub drag_origin: Vec3,
    /// Displacement of the dragged handle applied so far, relative to `box_at_start`
    pub total_delta: Vec3,
}

impl DragSession {
    pub fn new(start_hit: Hit, box_at_start: BBox3) -> Self {
        Self {
            start_hit,
            box_at_start,
            drag_origin: start_hit.point,
            total_delta: Vec3::ZERO,
        }
    }

    pub fn feature(&self) -> BoxFeature {
        self.start_hit.target
    }

    /// Unit direction the drag is constrained to
    pub fn axis(&self) -> Vec3 {
        self.feature().drag_axis()
    }

    /// Project `ray` onto the drag axis and compute the resized box.
    ///
    /// Returns `Ok(None)` when the ray is parallel to the axis, `Err(delta)`
    /// when the snapped delta would collapse or invert an axis the handle moves.
    pub fn propose(&self, ray: &Ray, grid: &Grid) -> Result<Option<(BBox3, Vec3)>, Vec3> {
        let Some(dist) = project_drag_distance(ray, self.drag_origin, self.axis()) else {
            return Ok(None);
        };
        let delta = snapped_delta(&self.feature(), dist, grid);
        match resize_box(&self.box_at_start, &self.feature(), delta) {
            Some(bbox) => Ok(Some((bbox, delta))),
            None => Err(delta),
        }
    }
}

/// Signed distance along `axis` from `origin` to the point on that line
/// closest to the ray. None if the ray runs parallel to the axis.
pub fn project_drag_distance(ray: &Ray, origin: Vec3, axis: Vec3) -> Option<f32> {
    ray_line_closest_point(ray, origin, axis).map(|(_, t)| t)
}

/// Split a distance along the feature's drag axis into per-axis moves,
/// each snapped to the grid. Axes the feature does not touch stay zero.
pub fn snapped_delta(feature: &BoxFeature, dist: f32, grid: &Grid) -> Vec3 {
    let axis = feature.drag_axis();
    feature
        .adjacent_sides()
        .iter()
        .fold(Vec3::ZERO, |delta, side| {
            let i = side.axis();
            delta.with(i, grid.snap(axis[i] * dist))
        })
}

/// Move every side the feature lies on by `delta`.
/// None if a moved axis would end with zero or negative extent. Axes the
/// feature does not touch keep their extent, flat or not.
pub fn resize_box(bbox: &BBox3, feature: &BoxFeature, delta: Vec3) -> Option<BBox3> {
    let sides = feature.adjacent_sides();
    let resized = sides
        .iter()
        .fold(*bbox, |b, side| move_bbox_face(&b, *side, delta));
    let size = resized.size();
    let moved_axes_open = sides.iter().all(|side| size[side.axis()] > 0.0);
    (resized.is_valid() && moved_axes_open).then_some(resized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::feature::{BBoxCorner, BBoxEdge, BBoxSide};
    use approx::assert_relative_eq;

    fn two_box() -> BBox3 {
        BBox3::new(Vec3::ZERO, Vec3::new(2.0, 2.0, 2.0))
    }

    fn face_hit(normal: Vec3, point: Vec3) -> Hit {
        Hit::new(1.0, point, BoxFeature::Side(BBoxSide::new(normal)))
    }

    #[test]
    fn test_face_drag_moves_one_plane() {
        let session = DragSession::new(face_hit(Vec3::POS_X, Vec3::new(2.0, 1.0, 1.0)), two_box());
        let ray = Ray::new(Vec3::new(3.0, 1.0, 5.0), Vec3::NEG_Z);

        let (bbox, delta) = session.propose(&ray, &Grid::new(1.0)).unwrap().unwrap();
        assert_eq!(delta, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(bbox, BBox3::new(Vec3::ZERO, Vec3::new(3.0, 2.0, 2.0)));
    }

    #[test]
    fn test_negative_face_moves_min() {
        let session = DragSession::new(face_hit(Vec3::NEG_Y, Vec3::new(1.0, 0.0, 1.0)), two_box());
        // Ray crosses the drag line 1.4 below the face: snaps to 1
        let ray = Ray::new(Vec3::new(1.0, -1.4, 5.0), Vec3::NEG_Z);

        let (bbox, delta) = session.propose(&ray, &Grid::new(1.0)).unwrap().unwrap();
        assert_eq!(delta, Vec3::new(0.0, -1.0, 0.0));
        assert_eq!(bbox, BBox3::new(Vec3::new(0.0, -1.0, 0.0), Vec3::new(2.0, 2.0, 2.0)));
    }

    #[test]
    fn test_parallel_ray_has_no_solution() {
        let session = DragSession::new(face_hit(Vec3::POS_X, Vec3::new(2.0, 1.0, 1.0)), two_box());
        let ray = Ray::new(Vec3::new(5.0, 1.0, 1.0), Vec3::POS_X);
        assert_eq!(session.propose(&ray, &Grid::new(1.0)), Ok(None));
    }

    #[test]
    fn test_snapping_off_keeps_raw_distance() {
        let mut grid = Grid::new(1.0);
        grid.set_snap(false);
        let feature = BoxFeature::Side(BBoxSide::new(Vec3::POS_Z));
        assert_relative_eq!(snapped_delta(&feature, 0.3, &grid).z, 0.3);
    }

    #[test]
    fn test_edge_drag_moves_two_planes() {
        let edge = BBoxEdge::new(Vec3::new(1.0, 1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));
        let feature = BoxFeature::Edge(edge);
        // sqrt(2) along the (1,1,0) diagonal is one unit on x and on y
        let delta = snapped_delta(&feature, 2.0_f32.sqrt(), &Grid::new(1.0));
        assert_eq!(delta, Vec3::new(1.0, 1.0, 0.0));

        let bbox = resize_box(&two_box(), &feature, delta).unwrap();
        assert_eq!(bbox, BBox3::new(Vec3::ZERO, Vec3::new(3.0, 3.0, 2.0)));
    }

    #[test]
    fn test_corner_drag_moves_three_planes() {
        let feature = BoxFeature::Corner(BBoxCorner::new(Vec3::new(-1.0, -1.0, -1.0)));
        let delta = snapped_delta(&feature, 3.0_f32.sqrt(), &Grid::new(1.0));
        assert_eq!(delta, Vec3::new(-1.0, -1.0, -1.0));

        let bbox = resize_box(&two_box(), &feature, delta).unwrap();
        assert_eq!(bbox, BBox3::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(2.0, 2.0, 2.0)));
    }

    #[test]
    fn test_inversion_rejected() {
        let feature = BoxFeature::Side(BBoxSide::new(Vec3::POS_X));
        assert!(resize_box(&two_box(), &feature, Vec3::new(-2.0, 0.0, 0.0)).is_none());
        assert!(resize_box(&two_box(), &feature, Vec3::new(-3.0, 0.0, 0.0)).is_none());
        assert!(resize_box(&two_box(), &feature, Vec3::new(-1.0, 0.0, 0.0)).is_some());
    }

    #[test]
    fn test_flat_box_resizes_along_open_axis() {
        let flat = BBox3::new(Vec3::ZERO, Vec3::new(2.0, 0.0, 2.0));
        let feature = BoxFeature::Side(BBoxSide::new(Vec3::POS_X));
        let bbox = resize_box(&flat, &feature, Vec3::new(1.0, 0.0, 0.0)).unwrap();
        assert_eq!(bbox, BBox3::new(Vec3::ZERO, Vec3::new(3.0, 0.0, 2.0)));

        // Moving the flat axis itself still has to leave it open
        let top = BoxFeature::Side(BBoxSide::new(Vec3::NEG_Y));
        assert!(resize_box(&flat, &top, Vec3::ZERO).is_none());
        assert!(resize_box(&flat, &top, Vec3::new(0.0, -1.0, 0.0)).is_some());
    }

    #[test]
    fn test_propose_reports_rejected_delta() {
        let session = DragSession::new(face_hit(Vec3::POS_X, Vec3::new(2.0, 1.0, 1.0)), two_box());
        let ray = Ray::new(Vec3::new(-1.0, 1.0, 5.0), Vec3::NEG_Z);
        assert_eq!(session.propose(&ray, &Grid::new(1.0)), Err(Vec3::new(-3.0, 0.0, 0.0)));
    }
}
