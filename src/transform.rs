//! World-space placement for the cart and its passengers.
//!
//! [`Transform`] stores translation, rotation and scale separately and builds
//! the 4×4 model matrix on demand, so a renderer can consume either form.
//!
//! ```
//! use rollercoaster::{Transform, Vec3};
//!
//! let cart = Transform::from_position(Vec3::new(0.0, 2.0, 0.0));
//! let seat = Transform::from_position(Vec3::new(0.5, 0.0, 0.0)).uniform_scale(0.4);
//!
//! // Seat placed relative to the cart.
//! let world = cart.mul_transform(&seat);
//! assert_eq!(world.position, Vec3::new(0.5, 2.0, 0.0));
//! assert_eq!(world.scale, Vec3::splat(0.4));
//! ```

use glam::{Mat4, Quat, Vec3};

use crate::frame::Frame;

/// Position, rotation and scale of an object in 3D space.
///
/// The matrix applies scale, then rotation, then translation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    /// World-space position (translation).
    pub position: Vec3,
    /// Rotation as a unit quaternion.
    pub rotation: Quat,
    /// Scale factors for each axis.
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Identity transform.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Places an object at `position`, oriented by a track frame.
    ///
    /// The resulting matrix is `Translate(position) · Rotate(N, B, T)`.
    pub fn from_frame(position: Vec3, frame: &Frame) -> Self {
        Self {
            position,
            rotation: frame.rotation(),
            scale: Vec3::ONE,
        }
    }

    pub fn position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn uniform_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::splat(scale);
        self
    }

    /// Composes `self` (parent) with a child expressed in the parent's space.
    ///
    /// Equivalent to `self.matrix() * child.matrix()` as long as the parent
    /// scale is uniform, which holds for the cart.
    pub fn mul_transform(&self, child: &Transform) -> Transform {
        Transform {
            position: self.transform_point(child.position),
            rotation: self.rotation * child.rotation,
            scale: self.scale * child.scale,
        }
    }

    /// Maps a local-space point into the space this transform places it in.
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.position + self.rotation * (self.scale * point)
    }

    /// 4×4 model matrix (scale, then rotation, then translation).
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_transform_matches_translate_times_rotate() {
        let frame = Frame::from_tangent(Vec3::new(1.0, 0.5, 0.0), Vec3::Y).unwrap();
        let position = Vec3::new(4.0, 2.0, -1.0);
        let transform = Transform::from_frame(position, &frame);

        let expected =
            Mat4::from_translation(position) * Mat4::from_mat3(frame.matrix());
        assert!(transform.matrix().abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn composition_matches_matrix_product() {
        let parent = Transform::new()
            .position(Vec3::new(1.0, 2.0, 3.0))
            .rotation(Quat::from_rotation_y(0.7));
        let child = Transform::from_position(Vec3::new(0.5, 0.2, -0.4)).uniform_scale(0.3);

        let composed = parent.mul_transform(&child).matrix();
        let expected = parent.matrix() * child.matrix();
        assert!(composed.abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn transform_point_applies_rotation() {
        let t = Transform::new().rotation(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2));
        let p = t.transform_point(Vec3::Z);
        assert!((p - Vec3::X).length() < 1e-5);
    }
}
