use autorunner_assets::{BlockTemplate, FloorBox};
use autorunner_common::{BlockHandle, ExitSuffix, Transform};
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::ray::{Ray, RayHit};

/// Services the track core needs from the host engine.
///
/// A block instance is addressed by a [`BlockHandle`]; its anchors are named
/// children (`In`, `Out`, `OutL`, `OutR`) and its waypoint groups are named
/// child groups whose children are ordered points (`CenterIn`, `LeftOutR`, ...).
pub trait TrackWorld {
    /// Instantiate `template` with its root at the given world transform.
    fn spawn_instance(
        &mut self,
        template: &BlockTemplate,
        position: Vec3,
        rotation: Quat,
    ) -> BlockHandle;

    /// Remove an instance from the scene. Returns false if it was not alive.
    fn destroy_instance(&mut self, handle: BlockHandle) -> bool;

    /// Closest hit along `ray` within `max_distance` on any layer in `layer_mask`.
    fn raycast(&mut self, ray: &Ray, max_distance: f32, layer_mask: u32) -> Option<RayHit>;

    /// World transform of a named child of an instance.
    fn named_child_transform(&self, handle: BlockHandle, name: &str) -> Option<Transform>;

    /// World positions of the children of a named group, in child order.
    fn children_positions(&self, handle: BlockHandle, group: &str) -> Option<Vec<Vec3>>;

    /// Enable or disable a decoration group. Returns false if the group does not exist.
    fn set_group_enabled(&mut self, handle: BlockHandle, group: &str, enabled: bool) -> bool;
}

/// An event record produced by every mutation of a [`SceneWorld`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WorldEvent {
    Spawned {
        handle: BlockHandle,
        template: String,
        transform: Transform,
    },
    Destroyed {
        handle: BlockHandle,
        template: String,
    },
    GroupToggled {
        handle: BlockHandle,
        group: String,
        enabled: bool,
    },
}

/// One raycast issued against a [`SceneWorld`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbeRecord {
    pub ray: Ray,
    pub max_distance: f32,
    pub layer_mask: u32,
    pub hit: Option<RayHit>,
}

/// Per-instance data stored in the scene.
#[derive(Debug, Clone)]
pub struct InstanceData {
    pub template: BlockTemplate,
    pub transform: Transform,
    pub disabled_groups: BTreeSet<String>,
}

/// Headless in-memory scene implementing [`TrackWorld`].
///
/// Instances live in a BTreeMap arena keyed by handle; handles are never
/// reused. Static scenery colliders are world-space boxes.
#[derive(Debug, Clone, Default)]
pub struct SceneWorld {
    instances: BTreeMap<BlockHandle, InstanceData>,
    statics: Vec<FloorBox>,
    next_handle: u64,
    event_log: Vec<WorldEvent>,
    probes: Vec<ProbeRecord>,
}

impl SceneWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a world-space static collider (terrain, scenery).
    pub fn add_static_box(&mut self, min: Vec3, max: Vec3, layer: u32) {
        self.statics.push(FloorBox { min, max, layer });
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    pub fn is_alive(&self, handle: BlockHandle) -> bool {
        self.instances.contains_key(&handle)
    }

    pub fn get(&self, handle: BlockHandle) -> Option<&InstanceData> {
        self.instances.get(&handle)
    }

    /// Read-only access to all instances, in handle order.
    pub fn instances(&self) -> &BTreeMap<BlockHandle, InstanceData> {
        &self.instances
    }

    pub fn is_group_enabled(&self, handle: BlockHandle, group: &str) -> Option<bool> {
        let data = self.instances.get(&handle)?;
        data.template
            .groups
            .iter()
            .any(|g| g.name == group)
            .then(|| !data.disabled_groups.contains(group))
    }

    pub fn events(&self) -> &[WorldEvent] {
        &self.event_log
    }

    /// Drain and return the event log.
    pub fn drain_events(&mut self) -> Vec<WorldEvent> {
        std::mem::take(&mut self.event_log)
    }

    pub fn probes(&self) -> &[ProbeRecord] {
        &self.probes
    }

    pub fn drain_probes(&mut self) -> Vec<ProbeRecord> {
        std::mem::take(&mut self.probes)
    }

    fn closest_hit(&self, ray: &Ray, max_distance: f32, layer_mask: u32) -> Option<RayHit> {
        let mut best: Option<RayHit> = None;
        let mut consider = |block: Option<BlockHandle>, distance: f32| {
            if best.is_none_or(|b| distance < b.distance) {
                best = Some(RayHit {
                    block,
                    distance,
                    point: ray.at(distance),
                });
            }
        };

        for collider in self.statics.iter().filter(|c| c.layer & layer_mask != 0) {
            if let Some(t) = ray.intersect_aabb(collider.min, collider.max, max_distance) {
                consider(None, t);
            }
        }
        for (handle, data) in &self.instances {
            let local = ray.to_local(&data.transform);
            for collider in data.template.floor.iter().filter(|c| c.layer & layer_mask != 0) {
                if let Some(t) = local.intersect_aabb(collider.min, collider.max, max_distance) {
                    consider(Some(*handle), t);
                }
            }
        }
        best
    }
}

impl TrackWorld for SceneWorld {
    fn spawn_instance(
        &mut self,
        template: &BlockTemplate,
        position: Vec3,
        rotation: Quat,
    ) -> BlockHandle {
        let handle = BlockHandle(self.next_handle);
        self.next_handle += 1;
        let transform = Transform::new(position, rotation);
        self.instances.insert(
            handle,
            InstanceData {
                template: template.clone(),
                transform,
                disabled_groups: BTreeSet::new(),
            },
        );
        self.event_log.push(WorldEvent::Spawned {
            handle,
            template: template.name.clone(),
            transform,
        });
        tracing::trace!(?handle, template = %template.name, position = ?position, "instance spawned");
        handle
    }

    fn destroy_instance(&mut self, handle: BlockHandle) -> bool {
        match self.instances.remove(&handle) {
            Some(data) => {
                tracing::trace!(?handle, template = %data.template.name, "instance destroyed");
                self.event_log.push(WorldEvent::Destroyed {
                    handle,
                    template: data.template.name,
                });
                true
            }
            None => {
                tracing::warn!(?handle, "destroy requested for an instance that is not alive");
                false
            }
        }
    }

    fn raycast(&mut self, ray: &Ray, max_distance: f32, layer_mask: u32) -> Option<RayHit> {
        let hit = self.closest_hit(ray, max_distance, layer_mask);
        tracing::trace!(
            origin = ?ray.origin,
            direction = ?ray.direction,
            max_distance,
            hit = ?hit.map(|h| h.distance),
            "raycast"
        );
        self.probes.push(ProbeRecord {
            ray: *ray,
            max_distance,
            layer_mask,
            hit,
        });
        hit
    }

    fn named_child_transform(&self, handle: BlockHandle, name: &str) -> Option<Transform> {
        let data = self.instances.get(&handle)?;
        let suffix = ExitSuffix::parse(name)?;
        let local = data.template.anchor(suffix)?;
        Some(data.transform.mul_transform(local))
    }

    fn children_positions(&self, handle: BlockHandle, group: &str) -> Option<Vec<Vec3>> {
        let data = self.instances.get(&handle)?;
        let points = data.template.paths.get(group)?;
        Some(
            points
                .iter()
                .map(|p| data.transform.transform_point(*p))
                .collect(),
        )
    }

    fn set_group_enabled(&mut self, handle: BlockHandle, group: &str, enabled: bool) -> bool {
        let Some(data) = self.instances.get_mut(&handle) else {
            return false;
        };
        if !data.template.groups.iter().any(|g| g.name == group) {
            return false;
        }
        if enabled {
            data.disabled_groups.remove(group);
        } else {
            data.disabled_groups.insert(group.to_string());
        }
        self.event_log.push(WorldEvent::GroupToggled {
            handle,
            group: group.to_string(),
            enabled,
        });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autorunner_assets::kit;
    use autorunner_common::{layers, PROBE_AXIS};

    #[test]
    fn world_starts_empty() {
        let w = SceneWorld::new();
        assert_eq!(w.instance_count(), 0);
        assert!(w.events().is_empty());
    }

    #[test]
    fn spawn_and_destroy() {
        let mut w = SceneWorld::new();
        let t = kit::straight("Straight", 1, 10.0);
        let h = w.spawn_instance(&t, Vec3::ZERO, Quat::IDENTITY);
        assert!(w.is_alive(h));
        assert_eq!(w.instance_count(), 1);

        assert!(w.destroy_instance(h));
        assert!(!w.destroy_instance(h));
        assert_eq!(w.instance_count(), 0);
        assert_eq!(w.events().len(), 2);
    }

    #[test]
    fn handles_are_not_reused() {
        let mut w = SceneWorld::new();
        let t = kit::straight("Straight", 1, 10.0);
        let a = w.spawn_instance(&t, Vec3::ZERO, Quat::IDENTITY);
        w.destroy_instance(a);
        let b = w.spawn_instance(&t, Vec3::ZERO, Quat::IDENTITY);
        assert_ne!(a, b);
    }

    #[test]
    fn named_child_is_in_world_space() {
        let mut w = SceneWorld::new();
        let t = kit::straight("Straight", 1, 10.0);
        let root = Transform::from_yaw_degrees(Vec3::new(5.0, 0.0, 0.0), 90.0);
        let h = w.spawn_instance(&t, root.position, root.rotation);
        let out = w.named_child_transform(h, "Out").unwrap();
        assert!(out.position.abs_diff_eq(Vec3::new(5.0, 0.0, 10.0), 1e-4));
        assert!(w.named_child_transform(h, "OutL").is_none());
        assert!(w.named_child_transform(h, "Nope").is_none());
    }

    #[test]
    fn children_positions_keep_order() {
        let mut w = SceneWorld::new();
        let t = kit::straight("Straight", 1, 10.0);
        let h = w.spawn_instance(&t, Vec3::new(0.0, 0.0, 3.0), Quat::IDENTITY);
        let points = w.children_positions(h, "CenterIn").unwrap();
        assert_eq!(points.len(), t.paths["CenterIn"].len());
        for pair in points.windows(2) {
            assert!(pair[1].x < pair[0].x);
        }
        assert!(points.iter().all(|p| (p.z - 3.0).abs() < 1e-5));
    }

    #[test]
    fn raycast_hits_instance_floor() {
        let mut w = SceneWorld::new();
        let t = kit::straight("Straight", 1, 10.0);
        let h = w.spawn_instance(&t, Vec3::ZERO, Quat::IDENTITY);
        let ray = Ray::new(Vec3::new(-5.0, 0.0, 10.0), Vec3::NEG_Z);
        let hit = w.raycast(&ray, 20.0, layers::FLOOR).unwrap();
        assert_eq!(hit.block, Some(h));
        assert!((hit.distance - (10.0 - kit::HALF_WIDTH)).abs() < 1e-4);
        assert_eq!(w.probes().len(), 1);
    }

    #[test]
    fn raycast_filters_by_layer() {
        let mut w = SceneWorld::new();
        w.add_static_box(Vec3::splat(-1.0), Vec3::splat(1.0), layers::OBSTACLE);
        let ray = Ray::new(Vec3::new(-5.0, 0.0, 0.0), Vec3::X);
        assert!(w.raycast(&ray, 20.0, layers::FLOOR).is_none());
        let hit = w.raycast(&ray, 20.0, layers::OBSTACLE).unwrap();
        assert_eq!(hit.block, None);
    }

    #[test]
    fn probe_from_own_exit_is_clear() {
        let mut w = SceneWorld::new();
        let t = kit::straight("Straight", 1, 10.0);
        let h = w.spawn_instance(&t, Vec3::ZERO, Quat::IDENTITY);
        let out = w.named_child_transform(h, "Out").unwrap();
        let ray = Ray::new(out.position, out.transform_vector(PROBE_AXIS));
        assert!(w.raycast(&ray, 20.0, layers::FLOOR).is_none());
    }

    #[test]
    fn decoration_groups_toggle() {
        let mut w = SceneWorld::new();
        let t = kit::straight("Straight", 1, 10.0);
        let h = w.spawn_instance(&t, Vec3::ZERO, Quat::IDENTITY);
        assert_eq!(w.is_group_enabled(h, "Coins"), Some(true));
        assert!(w.set_group_enabled(h, "Coins", false));
        assert_eq!(w.is_group_enabled(h, "Coins"), Some(false));
        assert!(!w.set_group_enabled(h, "Lava", false));
        assert_eq!(w.is_group_enabled(h, "Lava"), None);
    }
}
