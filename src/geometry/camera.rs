//! Viewport camera
//!
//! Perspective camera used to turn screen positions into pick rays and to
//! size screen-space handles in world units.

use super::math::Vec3;
use super::ray::Ray;

/// Projection constants (virtual eye distance and viewport scale)
const DISTANCE: f32 = 5.0;
const SCALE: f32 = 0.75;

/// Camera state for picking
#[derive(Clone, Debug)]
pub struct Camera {
    pub position: Vec3,
    pub rotation_x: f32, // Pitch
    pub rotation_y: f32, // Yaw

    /// Framebuffer size in pixels
    pub viewport: (usize, usize),

    // Computed basis vectors
    pub basis_x: Vec3,
    pub basis_y: Vec3,
    pub basis_z: Vec3,
}

impl Camera {
    pub fn new() -> Self {
        let mut cam = Self {
            position: Vec3::ZERO,
            rotation_x: 0.0,
            rotation_y: 0.0,
            viewport: (320, 240),
            basis_x: Vec3::POS_X,
            basis_y: Vec3::POS_Y,
            basis_z: Vec3::POS_Z,
        };
        cam.update_basis();
        cam
    }

    /// Camera at `position` facing `target`
    pub fn looking_at(position: Vec3, target: Vec3, viewport: (usize, usize)) -> Self {
        let dir = (target - position).normalize();
        let mut cam = Self::new();
        cam.position = position;
        cam.viewport = viewport;
        cam.rotation_x = (-dir.y).clamp(-1.0, 1.0).asin();
        cam.rotation_y = dir.x.atan2(dir.z);
        cam.update_basis();
        cam
    }

    pub fn update_basis(&mut self) {
        let upward = Vec3::new(0.0, -1.0, 0.0);  // -Y is up in screen coordinates

        self.basis_z = Vec3 {
            x: self.rotation_x.cos() * self.rotation_y.sin(),
            y: -self.rotation_x.sin(),
            z: self.rotation_x.cos() * self.rotation_y.cos(),
        };
        self.basis_x = upward.cross(self.basis_z).normalize();
        self.basis_y = self.basis_z.cross(self.basis_x);
    }

    /// Pixels per unit of normalized screen space
    fn viewport_scale(&self) -> f32 {
        (self.viewport.0.min(self.viewport.1) as f32 / 2.0) * SCALE
    }

    /// Camera-space depth of a world point
    pub fn depth(&self, point: Vec3) -> f32 {
        (point - self.position).dot(self.basis_z)
    }

    /// Generate a ray from screen coordinates through the camera.
    ///
    /// Inverts `screen = cam * us / (cam_z + DISTANCE) * vs + center`. Rays
    /// converge at the virtual eye DISTANCE units behind the camera.
    pub fn screen_to_ray(&self, screen_x: f32, screen_y: f32) -> Ray {
        let (width, height) = self.viewport;
        let vs = self.viewport_scale();
        let us = DISTANCE - 1.0;

        let ndc_x = (screen_x - width as f32 / 2.0) / vs;
        let ndc_y = (screen_y - height as f32 / 2.0) / vs;

        let world_dir = self.basis_x * (ndc_x / us)
            + self.basis_y * (ndc_y / us)
            + self.basis_z;

        Ray::new(self.position - self.basis_z * DISTANCE, world_dir)
    }

    /// Project a world-space point to framebuffer coordinates.
    /// None when the point is behind the camera.
    pub fn world_to_screen(&self, world_pos: Vec3) -> Option<(f32, f32)> {
        let rel = world_pos - self.position;
        let cam_z = rel.dot(self.basis_z);
        if cam_z <= 0.1 {
            return None;
        }

        let vs = self.viewport_scale();
        let us = DISTANCE - 1.0;
        let denom = cam_z + DISTANCE;
        let sx = (rel.dot(self.basis_x) * us / denom) * vs + (self.viewport.0 as f32 / 2.0);
        let sy = (rel.dot(self.basis_y) * us / denom) * vs + (self.viewport.1 as f32 / 2.0);
        Some((sx, sy))
    }

    /// World-space length covered by `pixels` at the depth of `point`
    pub fn pixels_to_world(&self, point: Vec3, pixels: f32) -> f32 {
        let us = DISTANCE - 1.0;
        let denom = self.depth(point).max(0.0) + DISTANCE;
        pixels * denom / (us * self.viewport_scale())
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_screen_to_ray_roundtrip() {
        let mut camera = Camera::new();
        camera.position = Vec3::new(0.0, 0.0, -100.0);
        camera.update_basis();

        let world_point = Vec3::new(50.0, 30.0, 100.0);
        let (sx, sy) = camera.world_to_screen(world_point).expect("point should be visible");

        let ray = camera.screen_to_ray(sx, sy);
        let t = (world_point - ray.origin).dot(ray.direction);
        let distance = (ray.at(t) - world_point).len();
        assert!(distance < 0.01, "ray should pass through the world point, got {}", distance);
    }

    #[test]
    fn test_screen_center_looks_forward() {
        let camera = Camera::looking_at(
            Vec3::new(10.0, 4.0, -20.0),
            Vec3::new(10.0, 4.0, 0.0),
            (320, 240),
        );
        let ray = camera.screen_to_ray(160.0, 120.0);
        assert!(ray.direction.dot(Vec3::POS_Z) > 0.999);
    }

    #[test]
    fn test_pixels_grow_with_depth() {
        let camera = Camera::looking_at(Vec3::ZERO, Vec3::POS_Z, (320, 240));
        let near = camera.pixels_to_world(Vec3::new(0.0, 0.0, 5.0), 4.0);
        let far = camera.pixels_to_world(Vec3::new(0.0, 0.0, 95.0), 4.0);
        assert_relative_eq!(far / near, 10.0, epsilon = 0.001);
    }
}
