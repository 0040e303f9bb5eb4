//! Handle picking
//!
//! Casts a pick ray against every corner, edge and face handle of a box.
//! Corners and edges are picked with a tolerance radius supplied by the
//! view (`HandlePicker`); faces are intersected exactly.

use crate::geometry::{
    BBox3, Camera, Ray, Vec3,
    ray_polygon_intersection, ray_segment_closest, ray_sphere_intersection,
};
use super::feature::{
    all_corners, all_edges, all_sides, point_for_corner, polygon_for_side,
    segment_for_edge, BoxFeature,
};
use super::hit::{Hit, HitKind, PickResult};

/// View service that picks screen-sized handles.
///
/// Both methods return the distance along the ray of the hit, or None if
/// the handle is out of reach.
pub trait HandlePicker {
    /// Pick a point handle drawn with `radius`
    fn pick_point_handle(&self, ray: &Ray, point: Vec3, radius: f32) -> Option<f32>;

    /// Pick a line segment handle drawn with `radius`
    fn pick_line_segment_handle(&self, ray: &Ray, start: Vec3, end: Vec3, radius: f32) -> Option<f32>;
}

/// Picker whose tolerance radius is given in world units
#[derive(Debug, Clone, Copy, Default)]
pub struct WorldHandlePicker;

impl HandlePicker for WorldHandlePicker {
    /// Distance at which the ray enters the tolerance sphere around the point
    fn pick_point_handle(&self, ray: &Ray, point: Vec3, radius: f32) -> Option<f32> {
        ray_sphere_intersection(ray, point, radius)
    }

    /// Ray parameter of the closest approach, if within `radius` of the segment
    fn pick_line_segment_handle(&self, ray: &Ray, start: Vec3, end: Vec3, radius: f32) -> Option<f32> {
        let (t, separation) = ray_segment_closest(ray, start, end);
        (separation <= radius).then_some(t)
    }
}

/// Camera picking: `radius` is in screen pixels and scales with depth
impl HandlePicker for Camera {
    fn pick_point_handle(&self, ray: &Ray, point: Vec3, radius: f32) -> Option<f32> {
        ray_sphere_intersection(ray, point, self.pixels_to_world(point, radius))
    }

    fn pick_line_segment_handle(&self, ray: &Ray, start: Vec3, end: Vec3, radius: f32) -> Option<f32> {
        let (t, separation) = ray_segment_closest(ray, start, end);
        (separation <= self.pixels_to_world(ray.at(t), radius)).then_some(t)
    }
}

/// Collect every handle the ray hits, nearest first.
///
/// Handles are tested faces first, then edges, then corners, so among hits
/// at exactly the same distance a face beats an edge and an edge beats a
/// corner. A ray starting inside the box hits nothing.
pub fn pick_handles<P: HandlePicker + ?Sized>(
    ray: &Ray,
    bbox: &BBox3,
    picker: &P,
    radius: f32,
) -> PickResult {
    let mut result = PickResult::new();
    if bbox.contains(ray.origin) {
        return result;
    }

    for side in all_sides() {
        let polygon = polygon_for_side(bbox, side);
        if let Some(dist) = ray_polygon_intersection(ray, &polygon) {
            result.add_hit(Hit::new(dist, ray.at(dist), BoxFeature::Side(side)));
        }
    }

    for edge in all_edges() {
        let (start, end) = segment_for_edge(bbox, edge);
        if let Some(dist) = picker.pick_line_segment_handle(ray, start, end, radius) {
            result.add_hit(Hit::new(dist, ray.at(dist), BoxFeature::Edge(edge)));
        }
    }

    for corner in all_corners() {
        let point = point_for_corner(bbox, corner);
        if let Some(dist) = picker.pick_point_handle(ray, point, radius) {
            result.add_hit(Hit::new(dist, ray.at(dist), BoxFeature::Corner(corner)));
        }
    }

    result
}

/// The nearest handle hit by the ray, if any
pub fn pick_box<P: HandlePicker + ?Sized>(
    ray: &Ray,
    bbox: &BBox3,
    picker: &P,
    radius: f32,
) -> Option<Hit> {
    pick_handles(ray, bbox, picker, radius)
        .first_of(&HitKind::ALL)
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::feature::{BBoxCorner, BBoxEdge, BBoxSide};
    use approx::assert_relative_eq;

    const RADIUS: f32 = 0.25;

    fn unit_box() -> BBox3 {
        BBox3::unit_cube()
    }

    #[test]
    fn test_face_center_hit() {
        let ray = Ray::new(Vec3::new(5.0, 0.0, 0.0), Vec3::NEG_X);
        let hit = pick_box(&ray, &unit_box(), &WorldHandlePicker, RADIUS).unwrap();

        assert_eq!(hit.kind(), HitKind::Face);
        assert_eq!(hit.target, BoxFeature::Side(BBoxSide::new(Vec3::POS_X)));
        assert_relative_eq!(hit.distance, 4.0);
        assert_relative_eq!(hit.point.x, 1.0);
    }

    #[test]
    fn test_face_beats_far_side() {
        // The ray passes through both the +Z and -Z faces; the near one wins
        let ray = Ray::new(Vec3::new(0.1, 0.2, 10.0), Vec3::NEG_Z);
        let result = pick_handles(&ray, &unit_box(), &WorldHandlePicker, RADIUS);
        assert_eq!(result.len(), 2);

        let hit = result.first_of(&HitKind::ALL).unwrap();
        assert_eq!(hit.target, BoxFeature::Side(BBoxSide::new(Vec3::POS_Z)));
        assert_relative_eq!(hit.distance, 9.0);
    }

    #[test]
    fn test_corner_hit() {
        let origin = Vec3::new(5.0, 5.0, 5.0);
        let ray = Ray::new(origin, Vec3::new(-1.0, -1.0, -1.0));
        let hit = pick_box(&ray, &unit_box(), &WorldHandlePicker, RADIUS).unwrap();

        assert_eq!(hit.kind(), HitKind::Corner);
        assert_eq!(hit.target, BoxFeature::Corner(BBoxCorner::new(Vec3::ONE)));
        // Entry into the tolerance sphere around (1,1,1)
        let expected = (origin - Vec3::ONE).len() - RADIUS;
        assert_relative_eq!(hit.distance, expected, epsilon = 1e-4);
    }

    #[test]
    fn test_edge_hit_just_outside() {
        // Skims 0.1 above the +Y face, crossing the +X/+Y edge at its middle
        let ray = Ray::new(Vec3::new(10.0, 1.1, 0.0), Vec3::NEG_X);
        let hit = pick_box(&ray, &unit_box(), &WorldHandlePicker, RADIUS).unwrap();

        assert_eq!(hit.kind(), HitKind::Edge);
        assert_eq!(
            hit.target,
            BoxFeature::Edge(BBoxEdge::new(Vec3::new(1.0, 1.0, -1.0), Vec3::new(1.0, 1.0, 1.0))),
        );
        assert_relative_eq!(hit.distance, 9.0, epsilon = 1e-4);
    }

    #[test]
    fn test_face_wins_tie_with_edge() {
        // Crosses the +X/+Z edge where it enters the +Z face, both at distance 4
        let ray = Ray::new(Vec3::new(1.0, 0.0, 5.0), Vec3::NEG_Z);
        let result = pick_handles(&ray, &unit_box(), &WorldHandlePicker, RADIUS);
        let hits = result.hits();
        assert_eq!(hits[0].target, BoxFeature::Side(BBoxSide::new(Vec3::POS_Z)));
        assert_eq!(hits[1].kind(), HitKind::Edge);
        assert_eq!(hits[0].distance, hits[1].distance);

        let hit = result.first_of(&HitKind::ALL).unwrap();
        assert_eq!(hit.kind(), HitKind::Face);
        assert_relative_eq!(hit.distance, 4.0);
    }

    #[test]
    fn test_miss() {
        let ray = Ray::new(Vec3::new(5.0, 5.0, 0.0), Vec3::POS_X);
        assert!(pick_box(&ray, &unit_box(), &WorldHandlePicker, RADIUS).is_none());
    }

    #[test]
    fn test_origin_inside_box_hits_nothing() {
        let ray = Ray::new(Vec3::new(0.5, 0.0, 0.0), Vec3::POS_X);
        assert!(pick_handles(&ray, &unit_box(), &WorldHandlePicker, RADIUS).is_empty());
    }

    #[test]
    fn test_camera_picker_scales_with_depth() {
        let camera = Camera::looking_at(Vec3::new(0.0, 0.0, -50.0), Vec3::ZERO, (320, 240));
        let point = Vec3::ZERO;
        // 0.5 units off the handle: too far for 1px, close enough for 20px
        let ray = Ray::new(Vec3::new(0.5, 0.0, -50.0), Vec3::POS_Z);
        assert!(camera.pick_point_handle(&ray, point, 1.0).is_none());
        assert!(camera.pick_point_handle(&ray, point, 20.0).is_some());
    }
}
