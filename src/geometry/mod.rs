//! Geometry primitives for handle picking
//!
//! # Module Organization
//!
//! - `math` - Vec3 and vector operators
//! - `ray` - Ray type and ray queries (line, plane, sphere, segment, polygon)
//! - `bbox` - Axis-aligned bounding box
//! - `camera` - Perspective camera for screen-to-ray conversion

pub mod bbox;
pub mod camera;
pub mod math;
pub mod ray;

pub use bbox::BBox3;
pub use camera::Camera;
pub use math::Vec3;
pub use ray::{
    Ray,
    ray_line_closest_point, ray_plane_intersection, ray_sphere_intersection,
    ray_segment_closest, ray_polygon_intersection,
};
