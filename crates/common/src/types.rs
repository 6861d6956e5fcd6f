use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Handle to a block instance living in a world arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockHandle(pub u64);

/// Content-addressed identifier of a block template, derived from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TemplateId(pub u64);

/// Rigid spatial transform: position and rotation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Transform rotated about +Y by `degrees`, positioned at `position`.
    pub fn from_yaw_degrees(position: Vec3, degrees: f32) -> Self {
        Self {
            position,
            rotation: Quat::from_rotation_y(degrees.to_radians()),
        }
    }

    /// Compose `self` (parent) with a `local` transform expressed in the parent's frame.
    pub fn mul_transform(&self, local: &Transform) -> Transform {
        Transform {
            position: self.position + self.rotation * local.position,
            rotation: (self.rotation * local.rotation).normalize(),
        }
    }

    pub fn inverse(&self) -> Transform {
        let rotation = self.rotation.inverse();
        Transform {
            position: rotation * -self.position,
            rotation,
        }
    }

    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.position + self.rotation * point
    }

    pub fn transform_vector(&self, vector: Vec3) -> Vec3 {
        self.rotation * vector
    }

    /// Approximate equality; quaternions `q` and `-q` count as the same rotation.
    pub fn approx_eq(&self, other: &Transform, epsilon: f32) -> bool {
        self.position.abs_diff_eq(other.position, epsilon)
            && self.rotation.dot(other.rotation).abs() >= 1.0 - epsilon
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_default_is_identity() {
        let t = Transform::default();
        assert_eq!(t.position, Vec3::ZERO);
        assert_eq!(t.rotation, Quat::IDENTITY);
        assert_eq!(t, Transform::IDENTITY);
    }

    #[test]
    fn compose_then_inverse_is_identity() {
        let parent = Transform::from_yaw_degrees(Vec3::new(3.0, 1.0, -2.0), 90.0);
        let local = Transform::from_yaw_degrees(Vec3::new(-4.0, 0.0, 0.5), -45.0);
        let world = parent.mul_transform(&local);
        let back = parent.inverse().mul_transform(&world);
        assert!(back.approx_eq(&local, 1e-5));
    }

    #[test]
    fn yaw_rotates_points_about_up() {
        let t = Transform::from_yaw_degrees(Vec3::ZERO, 90.0);
        let p = t.transform_point(Vec3::NEG_X);
        assert!(p.abs_diff_eq(Vec3::Z, 1e-5));
    }

    #[test]
    fn approx_eq_ignores_quaternion_sign() {
        let a = Transform::from_yaw_degrees(Vec3::ONE, 30.0);
        let b = Transform::new(Vec3::ONE, -a.rotation);
        assert!(a.approx_eq(&b, 1e-5));
    }
}
