use autorunner_common::{BlockHandle, Transform};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Hits closer than this to the ray origin are treated as touching, not
/// blocking. Exit anchors sit exactly on the face of their own floor.
pub const CONTACT_SKIN: f32 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit direction.
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }

    /// This ray expressed in the local frame of `frame`.
    pub fn to_local(&self, frame: &Transform) -> Ray {
        let inverse = frame.inverse();
        Ray {
            origin: inverse.transform_point(self.origin),
            direction: inverse.transform_vector(self.direction),
        }
    }

    /// Slab test against an axis-aligned box. Returns the entry distance,
    /// clamped to 0 when the origin is inside the box.
    pub fn intersect_aabb(&self, min: Vec3, max: Vec3, max_distance: f32) -> Option<f32> {
        let mut t_near = f32::NEG_INFINITY;
        let mut t_far = f32::INFINITY;
        for axis in 0..3 {
            let o = self.origin[axis];
            let d = self.direction[axis];
            if d.abs() < 1e-8 {
                if o < min[axis] || o > max[axis] {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / d;
            let (t0, t1) = {
                let a = (min[axis] - o) * inv;
                let b = (max[axis] - o) * inv;
                if a <= b { (a, b) } else { (b, a) }
            };
            t_near = t_near.max(t0);
            t_far = t_far.min(t1);
            if t_near > t_far {
                return None;
            }
        }
        if t_far <= CONTACT_SKIN {
            return None;
        }
        let t = t_near.max(0.0);
        (t <= max_distance).then_some(t)
    }
}

/// Result of a successful raycast.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RayHit {
    /// Block whose collider was hit; `None` for static scenery.
    pub block: Option<BlockHandle>,
    pub distance: f32,
    pub point: Vec3,
}
