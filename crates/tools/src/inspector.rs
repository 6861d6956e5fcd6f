use std::fmt::{self, Write};

use autorunner_common::{BlockHandle, PROBE_AXIS};
use autorunner_kernel::SceneWorld;
use autorunner_track::{PathFollower, TrackSession, WaypointFollower};
use glam::Vec3;

/// Track inspector for developer tooling.
///
/// Read-only queries against a session and the scene it builds into.
pub struct TrackInspector;

impl TrackInspector {
    /// Produce a summary of the session state.
    pub fn summary(session: &TrackSession, world: &SceneWorld) -> TrackSummary {
        let generator = session.generator().stats();
        let accumulator = session.accumulator().stats();
        TrackSummary {
            seed: session.seed(),
            live_blocks: session.chain().len(),
            retired_blocks: session.chain().retired_len(),
            instances: world.instance_count(),
            placed: generator.placed,
            rejected: generator.rejected,
            passes: generator.passes,
            forks: generator.fork_terminations,
            rebuilds: accumulator.rebuilds,
            stalls: accumulator.stalls,
            anchor: session.chain().anchor().position,
        }
    }

    /// Details of one instance, if it is still alive.
    pub fn inspect_block(world: &SceneWorld, handle: BlockHandle) -> Option<BlockInfo> {
        world.get(handle).map(|data| {
            let p = data.transform.position;
            let forward = data.transform.transform_vector(PROBE_AXIS);
            BlockInfo {
                handle,
                template: data.template.name.clone(),
                outs: data.template.outs,
                position: [p.x, p.y, p.z],
                heading_degrees: heading_degrees(forward),
                active_groups: data
                    .template
                    .groups
                    .iter()
                    .filter(|g| !data.disabled_groups.contains(&g.name))
                    .map(|g| g.name.clone())
                    .collect(),
            }
        })
    }

    /// Handles held by the session, oldest retired block first.
    pub fn list_blocks(session: &TrackSession) -> Vec<BlockHandle> {
        let chain = session.chain();
        chain
            .retired()
            .copied()
            .chain(chain.iter().map(|b| b.handle))
            .collect()
    }

    /// Human-readable dump of the session, every block it holds and the
    /// follower's lane.
    pub fn dump(
        session: &TrackSession,
        world: &SceneWorld,
        follower: Option<&WaypointFollower>,
    ) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "=== {} ===", Self::summary(session, world));
        let live: Vec<BlockHandle> = session.chain().iter().map(|b| b.handle).collect();
        for handle in Self::list_blocks(session) {
            let state = if live.contains(&handle) { "live" } else { "passed" };
            match Self::inspect_block(world, handle) {
                Some(info) => {
                    let _ = writeln!(out, "  {state:<6} {info}");
                }
                None => {
                    let _ = writeln!(out, "  {state:<6} #{} <destroyed>", handle.0);
                }
            }
        }
        if let Some(f) = follower {
            let p = f.position();
            let _ = writeln!(
                out,
                "Follower: pos=({:.2}, {:.2}, {:.2}) lane={} ahead={} turn={:?}",
                p.x,
                p.y,
                p.z,
                f.lane(),
                f.remaining_points(),
                f.turn_decision()
            );
        }
        out
    }
}

/// Yaw of a forward vector, zero along the track axis and positive to the left.
fn heading_degrees(forward: Vec3) -> f32 {
    let h = forward.z.atan2(-forward.x).to_degrees();
    if h.abs() < 1e-3 { 0.0 } else { h }
}

/// Summary of session state for the inspector.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackSummary {
    pub seed: u64,
    pub live_blocks: usize,
    pub retired_blocks: usize,
    pub instances: usize,
    pub placed: u64,
    pub rejected: u64,
    pub passes: u64,
    pub forks: u64,
    pub rebuilds: u64,
    pub stalls: u64,
    pub anchor: Vec3,
}

impl fmt::Display for TrackSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Track: seed={} live={} passed={} instances={} placed={} rejected={} passes={} forks={} rebuilds={} stalls={} anchor=({:.2}, {:.2}, {:.2})",
            self.seed,
            self.live_blocks,
            self.retired_blocks,
            self.instances,
            self.placed,
            self.rejected,
            self.passes,
            self.forks,
            self.rebuilds,
            self.stalls,
            self.anchor.x,
            self.anchor.y,
            self.anchor.z,
        )
    }
}

/// Detailed info about a single block instance.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockInfo {
    pub handle: BlockHandle,
    pub template: String,
    pub outs: u32,
    pub position: [f32; 3],
    pub heading_degrees: f32,
    pub active_groups: Vec<String>,
}

impl fmt::Display for BlockInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {} outs={} pos=({:.2}, {:.2}, {:.2}) heading={:.0} groups=[{}]",
            self.handle.0,
            self.template,
            self.outs,
            self.position[0],
            self.position[1],
            self.position[2],
            self.heading_degrees,
            self.active_groups.join(", "),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autorunner_assets::{kit, TemplateLibrary};
    use autorunner_kernel::TrackWorld;
    use autorunner_track::TrackConfig;

    fn started(seed: u64) -> (TrackSession, SceneWorld, WaypointFollower) {
        let mut world = SceneWorld::new();
        let mut follower = WaypointFollower::new(Vec3::ZERO);
        let mut session = TrackSession::new(TemplateLibrary::builtin(), TrackConfig::default(), seed);
        session.start(&mut world, &mut follower).unwrap();
        (session, world, follower)
    }

    #[test]
    fn summary_empty_session() {
        let world = SceneWorld::new();
        let session = TrackSession::new(TemplateLibrary::builtin(), TrackConfig::default(), 3);
        let summary = TrackInspector::summary(&session, &world);
        assert_eq!(summary.live_blocks, 0);
        assert_eq!(summary.instances, 0);
        assert_eq!(summary.anchor, Vec3::new(0.0, 0.0, -2.0));
    }

    #[test]
    fn summary_after_start() {
        let (session, world, _) = started(11);
        let summary = TrackInspector::summary(&session, &world);
        assert_eq!(summary.passes, 1);
        assert_eq!(summary.live_blocks, session.chain().len());
        assert_eq!(summary.instances, summary.live_blocks);
        assert!(summary.placed >= 1);
    }

    #[test]
    fn inspect_block_reports_template_and_heading() {
        let mut world = SceneWorld::new();
        let handle = world.spawn_instance(
            &kit::turn("TurnLeft", 1.0),
            Vec3::new(1.0, 0.0, 2.0),
            glam::Quat::from_rotation_y(90f32.to_radians()),
        );
        world.set_group_enabled(handle, "Coins", false);

        let info = TrackInspector::inspect_block(&world, handle).unwrap();
        assert_eq!(info.template, "TurnLeft");
        assert_eq!(info.position, [1.0, 0.0, 2.0]);
        assert!((info.heading_degrees - 90.0).abs() < 1e-3);
        assert!(!info.active_groups.contains(&"Coins".to_string()));
    }

    #[test]
    fn inspect_destroyed_block() {
        let mut world = SceneWorld::new();
        let handle = world.spawn_instance(&kit::fork("Fork"), Vec3::ZERO, glam::Quat::IDENTITY);
        world.destroy_instance(handle);
        assert!(TrackInspector::inspect_block(&world, handle).is_none());
    }

    #[test]
    fn list_blocks_matches_chain() {
        let (session, _, _) = started(4);
        let listed = TrackInspector::list_blocks(&session);
        let live: Vec<_> = session.chain().iter().map(|b| b.handle).collect();
        assert_eq!(listed, live);
    }

    #[test]
    fn dump_lists_every_block() {
        let (session, world, follower) = started(8);
        let text = TrackInspector::dump(&session, &world, Some(&follower));
        assert!(text.contains("seed=8"));
        assert!(text.contains("Start"));
        assert!(text.contains("lane=Center"));
        assert_eq!(text.matches("  live").count(), session.chain().len());
    }
}
