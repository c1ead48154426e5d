//! Orthonormal orientation frames along the track.
//!
//! A [`Frame`] holds the normal/binormal/tangent basis `(N, B, T)` used to
//! orient the cart and its passengers. The basis maps cart-local axes onto
//! world axes: local X → `N` (lateral), local Y → `B` (up), local Z → `T`
//! (direction of travel).

use glam::{Mat3, Quat, Vec3};

/// Squared length below which a cross product is treated as degenerate.
const DEGENERATE_EPSILON: f32 = 1e-10;

/// A right-handed orthonormal basis along the track.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frame {
    /// Lateral axis, `normalize(up × T)`.
    pub normal: Vec3,
    /// Cart-up axis, `normalize(T × N)`.
    pub binormal: Vec3,
    /// Direction of travel.
    pub tangent: Vec3,
}

impl Default for Frame {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Frame {
    /// World-aligned basis: `N = X`, `B = Y`, `T = Z`.
    pub const IDENTITY: Self = Self {
        normal: Vec3::X,
        binormal: Vec3::Y,
        tangent: Vec3::Z,
    };

    /// Builds the frame for a tangent, using `up` as the reference vertical.
    ///
    /// Returns `None` when the tangent is zero or parallel to `up`, since the
    /// normal `up × T` is undefined there.
    pub fn from_tangent(tangent: Vec3, up: Vec3) -> Option<Self> {
        let tangent = tangent.try_normalize()?;
        let normal = up.cross(tangent);
        if normal.length_squared() < DEGENERATE_EPSILON {
            return None;
        }
        let normal = normal.normalize();
        let binormal = tangent.cross(normal).normalize();

        Some(Self {
            normal,
            binormal,
            tangent,
        })
    }

    /// Like [`Frame::from_tangent`], but keeps `previous` when the tangent is degenerate.
    pub fn from_tangent_or(tangent: Vec3, up: Vec3, previous: Frame) -> Self {
        Self::from_tangent(tangent, up).unwrap_or(previous)
    }

    /// Rotation matrix whose columns are `(N, B, T)`.
    pub fn matrix(&self) -> Mat3 {
        Mat3::from_cols(self.normal, self.binormal, self.tangent)
    }

    /// The same rotation as a unit quaternion.
    pub fn rotation(&self) -> Quat {
        Quat::from_mat3(&self.matrix()).normalize()
    }
}
