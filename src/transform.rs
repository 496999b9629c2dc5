//! # Transform Module
//!
//! Pure per-frame animation math: the scalar [`AnimationState`], the rule that advances it
//! with elapsed time, and the construction of the model matrix from it.
//!
//! Nothing here touches the GPU. The functions take values and return values so they can be
//! exercised without a device, and the [`crate::pipeline`] module is the only caller that
//! turns their output into uniform uploads.
//!
//! ## Conventions
//!
//! - Angles in [`AnimationState`] are stored in degrees and kept in `[0, 360)`.
//! - Matrices are column-major `nalgebra_glm::Mat4` and act on column vectors on the right,
//!   so in `a * b * v` the matrix `b` is applied to `v` first.
//! - Frame timestamps are milliseconds, the unit browsers hand to animation callbacks.

use nalgebra_glm as glm;

/// Default angular speed of the cube, in degrees per second.
pub const ROTATION_SPEED: f32 = 20.0;

/// The three scalars driving the model matrix.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AnimationState {
    /// Offset along the x axis, in world units.
    pub translation: f32,
    /// Scale factor applied to all three axes.
    pub scale: f32,
    /// Rotation about the z axis, in degrees within `[0, 360)`.
    pub rotation: f32,
}

impl Default for AnimationState {
    fn default() -> Self {
        Self {
            translation: 0.0,
            scale: 1.0,
            rotation: 0.0,
        }
    }
}

impl AnimationState {
    /// Returns the state after `delta_seconds` of rotation at `speed` degrees per second.
    ///
    /// Translation and scale are carried over unchanged.
    pub fn advance(self, delta_seconds: f32, speed: f32) -> Self {
        Self {
            rotation: wrap_degrees(self.rotation + delta_seconds * speed),
            ..self
        }
    }

    /// Builds the model matrix for this state.
    ///
    /// Scale is applied to a vertex first, then the rotation about z, then the translation
    /// along x.
    pub fn model_matrix(&self) -> glm::Mat4 {
        translation_matrix(self.translation) * rotation_matrix(self.rotation) * scale_matrix(self.scale)
    }
}

/// Seconds elapsed between two frame timestamps given in milliseconds.
///
/// No clamping happens here: the very first frame is measured from a previous timestamp of
/// zero, which makes its delta the full time since the clock origin.
pub fn time_delta(previous_ms: f64, current_ms: f64) -> f32 {
    ((current_ms - previous_ms) / 1000.0) as f32
}

/// Wraps an angle in degrees into `[0, 360)`.
pub fn wrap_degrees(degrees: f32) -> f32 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs.
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Translation by `offset` along the x axis.
pub fn translation_matrix(offset: f32) -> glm::Mat4 {
    glm::translation(&glm::vec3(offset, 0.0, 0.0))
}

/// Uniform scaling by `factor`.
pub fn scale_matrix(factor: f32) -> glm::Mat4 {
    glm::scaling(&glm::vec3(factor, factor, factor))
}

/// Rotation of `degrees` about the z axis, counter-clockwise when looking down -z.
pub fn rotation_matrix(degrees: f32) -> glm::Mat4 {
    glm::rotation(degrees.to_radians(), &glm::Vec3::z())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-4;

    fn transform_point(matrix: &glm::Mat4, point: glm::Vec3) -> glm::Vec3 {
        let p = matrix * glm::vec4(point.x, point.y, point.z, 1.0);
        glm::vec3(p.x, p.y, p.z) / p.w
    }

    fn assert_close(actual: glm::Vec3, expected: glm::Vec3) {
        assert!(
            (actual - expected).norm() < EPSILON,
            "expected {expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn first_second_of_animation_rotates_twenty_degrees() {
        let dt = time_delta(0.0, 1000.0);
        let state = AnimationState::default().advance(dt, ROTATION_SPEED);
        assert!((state.rotation - 20.0).abs() < EPSILON);
    }

    #[test]
    fn rotation_wraps_past_full_turn() {
        let state = AnimationState {
            rotation: 350.0,
            ..Default::default()
        };
        let state = state.advance(1.0, ROTATION_SPEED);
        assert!((state.rotation - 10.0).abs() < EPSILON);
    }

    #[test]
    fn first_frame_delta_is_whole_timestamp() {
        assert!((time_delta(0.0, 2500.0) - 2.5).abs() < 1e-6);
        assert!((time_delta(2500.0, 2516.0) - 0.016).abs() < 1e-6);
    }

    #[test]
    fn advance_matches_closed_form() {
        for &(start, seconds) in &[(0.0_f32, 0.0_f32), (10.0, 3.5), (300.0, 18.0), (359.0, 1000.25)] {
            let state = AnimationState {
                rotation: start,
                ..Default::default()
            }
            .advance(seconds, ROTATION_SPEED);
            let expected = (start as f64 + ROTATION_SPEED as f64 * seconds as f64).rem_euclid(360.0);
            assert!((state.rotation as f64 - expected).abs() < 1e-2, "start {start}, t {seconds}");
            assert!((0.0..360.0).contains(&state.rotation));
        }
    }

    #[test]
    fn many_small_steps_match_one_large_step() {
        let mut stepped = AnimationState::default();
        for _ in 0..600 {
            stepped = stepped.advance(1.0 / 60.0, ROTATION_SPEED);
        }
        let single = AnimationState::default().advance(10.0, ROTATION_SPEED);
        assert!((stepped.rotation - single.rotation).abs() < 5e-2);
        assert!((single.rotation - 200.0).abs() < EPSILON);
    }

    #[test]
    fn advance_keeps_translation_and_scale() {
        let state = AnimationState {
            translation: 0.5,
            scale: 2.0,
            rotation: 0.0,
        }
        .advance(1.0, ROTATION_SPEED);
        assert_eq!(state.translation, 0.5);
        assert_eq!(state.scale, 2.0);
    }

    #[test]
    fn wrap_degrees_stays_in_range() {
        assert_eq!(wrap_degrees(0.0), 0.0);
        assert_eq!(wrap_degrees(360.0), 0.0);
        assert!((wrap_degrees(-30.0) - 330.0).abs() < EPSILON);
        assert!((wrap_degrees(725.0) - 5.0).abs() < EPSILON);
        let tiny = wrap_degrees(-1e-9);
        assert!((0.0..360.0).contains(&tiny));
    }

    #[test]
    fn default_state_yields_identity() {
        let model = AnimationState::default().model_matrix();
        assert!((model - glm::Mat4::identity()).norm() < EPSILON);
    }

    #[test]
    fn model_applies_scale_then_rotation_then_translation() {
        let state = AnimationState {
            translation: 1.0,
            scale: 2.0,
            rotation: 90.0,
        };
        // (1,0,0) -> scaled (2,0,0) -> rotated (0,2,0) -> translated (1,2,0)
        let moved = transform_point(&state.model_matrix(), glm::vec3(1.0, 0.0, 0.0));
        assert_close(moved, glm::vec3(1.0, 2.0, 0.0));

        // z is scaled and left alone by the z rotation.
        let moved = transform_point(&state.model_matrix(), glm::vec3(0.0, 0.0, 1.0));
        assert_close(moved, glm::vec3(1.0, 0.0, 2.0));
    }

    #[test]
    fn model_equals_explicit_product() {
        let state = AnimationState {
            translation: -0.75,
            scale: 0.5,
            rotation: 33.0,
        };
        let expected = translation_matrix(-0.75) * rotation_matrix(33.0) * scale_matrix(0.5);
        assert!((state.model_matrix() - expected).norm() < EPSILON);
    }

    #[test]
    fn rotation_is_counter_clockwise_about_z() {
        let rotated = transform_point(&rotation_matrix(90.0), glm::vec3(1.0, 0.0, 0.0));
        assert_close(rotated, glm::vec3(0.0, 1.0, 0.0));
    }
}
