//! Placement helpers shared by the generator and the path walk.

use autorunner_common::{Transform, PROBE_AXIS};
use autorunner_kernel::Ray;
use glam::Vec3;

/// Root transform that puts a block's local `entry` anchor exactly on `anchor`.
pub fn root_for_entry(anchor: &Transform, entry: &Transform) -> Transform {
    anchor.mul_transform(&entry.inverse())
}

/// Obstruction probe cast forward out of an exit anchor.
pub fn probe_ray(exit: &Transform) -> Ray {
    Ray::new(exit.position, exit.transform_vector(PROBE_AXIS))
}

/// Character spawn point above a block entry.
pub fn spawn_point(entry: &Transform, height: f32) -> Vec3 {
    Vec3::new(entry.position.x, height, entry.position.z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_lands_on_anchor() {
        let anchor = Transform::from_yaw_degrees(Vec3::new(4.0, 0.0, -7.0), 90.0);
        let entry = Transform::from_yaw_degrees(Vec3::new(1.0, 0.5, 2.0), -30.0);
        let root = root_for_entry(&anchor, &entry);
        assert!(root.mul_transform(&entry).approx_eq(&anchor, 1e-4));
    }

    #[test]
    fn probe_follows_exit_heading() {
        let exit = Transform::from_yaw_degrees(Vec3::new(0.0, 0.0, 3.0), -90.0);
        let ray = probe_ray(&exit);
        assert_eq!(ray.origin, exit.position);
        assert!(ray.direction.abs_diff_eq(Vec3::NEG_Z, 1e-5));
    }

    #[test]
    fn spawn_point_lifts_to_height() {
        let entry = Transform::from_position(Vec3::new(2.0, 0.0, -2.0));
        assert_eq!(spawn_point(&entry, 10.0), Vec3::new(2.0, 10.0, -2.0));
    }
}
