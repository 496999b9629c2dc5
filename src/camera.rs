//! # Camera
//!
//! A fixed perspective camera. Its view and projection matrices depend only on its
//! parameters and the surface aspect ratio, so the pipeline computes them once and uploads
//! them again only when the surface is resized.
//!
//! The projection targets wgpu clip space: right-handed view space looking down `-z`, with
//! normalized depth in `[0, 1]` (`0` on the near plane, `1` on the far plane).

use nalgebra_glm as glm;

/// Camera placement and lens parameters.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    /// Position of the eye in world space.
    pub eye: glm::Vec3,
    /// Point the camera looks at.
    pub target: glm::Vec3,
    /// World-space up direction.
    pub up: glm::Vec3,
    /// Vertical field of view, in degrees.
    pub fov_y_degrees: f32,
    /// Distance to the near clip plane.
    pub near: f32,
    /// Distance to the far clip plane.
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: glm::vec3(3.0, 3.0, 5.0),
            target: glm::Vec3::zeros(),
            up: glm::Vec3::y(),
            fov_y_degrees: 45.0,
            near: 0.1,
            far: 10.0,
        }
    }
}

impl Camera {
    /// World-to-camera transform. The eye lands on the origin and the target on the `-z` axis.
    pub fn view_matrix(&self) -> glm::Mat4 {
        glm::look_at_rh(&self.eye, &self.target, &self.up)
    }

    /// Camera-to-clip transform for a surface with the given aspect ratio (width / height).
    pub fn projection_matrix(&self, aspect_ratio: f32) -> glm::Mat4 {
        glm::perspective_rh_zo(aspect_ratio, self.fov_y_degrees.to_radians(), self.near, self.far)
    }
}

/// Aspect ratio of a surface, guarding against a zero height while minimized.
pub fn aspect_ratio(width: u32, height: u32) -> f32 {
    width as f32 / height.max(1) as f32
}
