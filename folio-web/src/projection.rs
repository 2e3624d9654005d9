//! Perspective projection for the background canvas
//!
//! Pure calculation logic that can be unit tested without browser
//! dependencies. The scene camera sits on the +z axis looking at the origin.

use glam::{Vec2, Vec3};

use crate::particles::Viewport;

/// Perspective camera mapping world coordinates onto the canvas
#[derive(Debug, Clone)]
pub struct Projection {
    /// Canvas width in pixels
    pub width: f32,
    /// Canvas height in pixels
    pub height: f32,
    /// Vertical field of view in radians
    pub fov_y: f32,
    /// Camera distance from the z = 0 plane
    pub distance: f32,
    /// Points closer to the camera than this are culled
    pub near: f32,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            fov_y: 75.0_f32.to_radians(),
            distance: 5.0,
            near: 0.1,
        }
    }
}

impl Projection {
    /// Create a projection for a canvas of the given pixel size
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
            ..Default::default()
        }
    }

    /// Update canvas dimensions
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
    }

    /// World extent visible at z = 0
    ///
    /// A hidden canvas yields an empty viewport.
    pub fn viewport(&self) -> Viewport {
        if self.width <= 0.0 || self.height <= 0.0 {
            return Viewport::default();
        }
        let height = 2.0 * self.distance * (self.fov_y / 2.0).tan();
        Viewport::new(height * self.width / self.height, height)
    }

    /// Pixels per world unit at the given depth in front of the camera
    fn pixels_per_unit(&self, depth: f32) -> f32 {
        self.height / (2.0 * depth * (self.fov_y / 2.0).tan())
    }

    /// Project a world point to canvas coordinates
    ///
    /// Returns the canvas position and the scale (pixels per world unit) at
    /// that depth, or `None` when the point is behind the near plane.
    pub fn project(&self, point: Vec3) -> Option<(Vec2, f32)> {
        let depth = self.distance - point.z;
        if depth <= self.near {
            return None;
        }
        let scale = self.pixels_per_unit(depth);
        let x = self.width / 2.0 + point.x * scale;
        let y = self.height / 2.0 - point.y * scale;
        Some((Vec2::new(x, y), scale))
    }
}
