//! Ray casting utilities for handle picking and drag projection
//!
//! All distances returned here are ray parameters: with a normalized
//! direction they are world-space distances from the ray origin.

use super::math::Vec3;

/// Below this, two directions are treated as parallel
const PARALLEL_EPSILON: f32 = 0.0001;

/// A 3D ray with origin and direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,  // Normalized
}

impl Ray {
    /// Create a new ray, normalizing the direction
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize()
        }
    }

    /// Get point at distance t along ray
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Find the closest point on an infinite line to a ray.
///
/// Used for axis-constrained dragging where we want to find where
/// the mouse ray "intersects" the constraint axis.
///
/// Returns (point_on_line, parameter_along_line) or None if ray and line are parallel
/// (or the line direction is degenerate).
pub fn ray_line_closest_point(
    ray: &Ray,
    line_origin: Vec3,
    line_dir: Vec3
) -> Option<(Vec3, f32)> {
    // Closest pair of P1 = o1 + t*d1 and P2 = o2 + s*d2 satisfies
    // (P1 - P2) . d1 = 0 and (P1 - P2) . d2 = 0. With w = o1 - o2:
    //   a = d1.d1, b = d1.d2, c = d2.d2, d = w.d1, e = w.d2
    //   s = (a*e - d*b) / (a*c - b*b)
    let w = ray.origin - line_origin;
    let d1 = ray.direction;
    let d2 = line_dir;

    let a = d1.dot(d1);
    let b = d1.dot(d2);
    let c = d2.dot(d2);
    let d = w.dot(d1);
    let e = w.dot(d2);

    let denom = a * c - b * b;
    if denom.abs() < PARALLEL_EPSILON || c == 0.0 {
        return None;
    }

    let s = (a * e - d * b) / denom;
    let closest_point = line_origin + line_dir * s;

    Some((closest_point, s))
}

/// Find the intersection of a ray with a plane.
///
/// Returns the distance along the ray to the intersection point,
/// or None if the ray is parallel to the plane or intersection is behind ray origin.
pub fn ray_plane_intersection(
    ray: &Ray,
    plane_point: Vec3,
    plane_normal: Vec3,
) -> Option<f32> {
    let denom = ray.direction.dot(plane_normal);
    if denom.abs() < PARALLEL_EPSILON {
        return None;
    }

    let t = (plane_point - ray.origin).dot(plane_normal) / denom;
    if t < 0.0 {
        return None;
    }

    Some(t)
}

/// Distance along the ray at which it enters a sphere.
///
/// If the origin is already inside the sphere the exit distance is returned.
pub fn ray_sphere_intersection(ray: &Ray, center: Vec3, radius: f32) -> Option<f32> {
    let oc = ray.origin - center;
    let b = oc.dot(ray.direction);
    let c = oc.len_squared() - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }

    let root = disc.sqrt();
    let near = -b - root;
    if near >= 0.0 {
        return Some(near);
    }
    let far = -b + root;
    if far >= 0.0 {
        return Some(far);
    }
    None
}

/// Closest approach between a ray and a line segment.
///
/// Returns (ray_distance, separation): the parameter along the ray of its
/// point nearest to the segment, and the distance between the two closest
/// points. Rays running parallel to the segment measure from the segment start.
pub fn ray_segment_closest(ray: &Ray, start: Vec3, end: Vec3) -> (f32, f32) {
    let seg = end - start;
    let seg_len_sq = seg.len_squared();
    let d = ray.direction;

    let mut s = if seg_len_sq == 0.0 {
        0.0
    } else {
        // Unit direction keeps the parallel test independent of segment length
        let seg_len = seg_len_sq.sqrt();
        match ray_line_closest_point(ray, start, seg * (1.0 / seg_len)) {
            Some((_, s)) => (s / seg_len).clamp(0.0, 1.0),
            None => 0.0,
        }
    };

    // Clamp t to the ray, then re-project onto the segment
    let mut t = ((start + seg * s) - ray.origin).dot(d).max(0.0);
    if seg_len_sq > 0.0 {
        s = ((ray.at(t) - start).dot(seg) / seg_len_sq).clamp(0.0, 1.0);
        t = ((start + seg * s) - ray.origin).dot(d).max(0.0);
    }

    let separation = (ray.at(t) - (start + seg * s)).len();
    (t, separation)
}

/// Intersect a ray with a planar convex polygon.
///
/// Points on the polygon boundary count as inside. Returns the distance
/// along the ray, or None for a miss, a degenerate polygon, or a ray
/// parallel to the polygon plane.
pub fn ray_polygon_intersection(ray: &Ray, vertices: &[Vec3]) -> Option<f32> {
    if vertices.len() < 3 {
        return None;
    }

    let normal = (vertices[1] - vertices[0]).cross(vertices[2] - vertices[0]);
    let normal_len = normal.len();
    if normal_len == 0.0 {
        return None;
    }
    let normal = normal * (1.0 / normal_len);

    let t = ray_plane_intersection(ray, vertices[0], normal)?;
    let hit = ray.at(t);

    // Tolerance relative to the polygon size so boundary hits stay inside
    let epsilon = normal_len * 1e-5;
    let mut sign = 0.0f32;
    for (i, &v0) in vertices.iter().enumerate() {
        let v1 = vertices[(i + 1) % vertices.len()];
        let side = (v1 - v0).cross(hit - v0).dot(normal);
        if side.abs() <= epsilon {
            continue;
        }
        if sign == 0.0 {
            sign = side.signum();
        } else if side.signum() != sign {
            return None;
        }
    }

    Some(t)
}
