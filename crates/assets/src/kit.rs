//! Built-in block kit.
//!
//! Blocks are authored with their entry at the local origin and the track
//! running along [`PROBE_AXIS`]. Lanes sit `LANE_OFFSET` to either side of the
//! center line; left is local +Z.

use autorunner_common::{layers, ExitSuffix, Lane, Transform, PROBE_AXIS};
use glam::Vec3;

use crate::template::{BlockTemplate, DecorationGroup, FloorBox};

pub const LANE_OFFSET: f32 = 1.5;
pub const HALF_WIDTH: f32 = 2.5;
pub const WAYPOINT_STEP: f32 = 2.0;
const FLOOR_HALF_HEIGHT: f32 = 1.0;
/// Distance from a turn's entry to the center of its corner.
const CORNER: f32 = 6.0;

/// Templates of the built-in kit. The first one is the start block.
pub fn builtin_kit() -> Vec<BlockTemplate> {
    vec![
        straight("Start", 1, 20.0),
        straight("Straight", 1, 16.0),
        straight("Plank", 0, 8.0),
        turn("TurnLeft", 1.0),
        turn("TurnRight", -1.0),
        fork("Fork"),
    ]
}

pub fn straight(name: &str, outs: u32, length: f32) -> BlockTemplate {
    let mut t = BlockTemplate::new(name, outs);
    let exit = Transform::from_position(PROBE_AXIS * length);
    t.anchors.insert(ExitSuffix::In, Transform::IDENTITY);
    t.anchors.insert(ExitSuffix::Out, exit);
    if t.is_dead_end() {
        lay_lanes(&mut t, ExitSuffix::In, &Transform::IDENTITY, length);
    } else {
        let half = length * 0.5;
        lay_lanes(&mut t, ExitSuffix::In, &Transform::IDENTITY, half);
        let mid = Transform::from_position(PROBE_AXIS * half);
        lay_lanes(&mut t, ExitSuffix::Out, &mid, half);
    }
    t.floor.push(floor(
        Vec3::new(-length, -FLOOR_HALF_HEIGHT, -HALF_WIDTH),
        Vec3::new(0.0, FLOOR_HALF_HEIGHT, HALF_WIDTH),
    ));
    t.groups = decorations();
    t
}

/// Ninety-degree turn; `side` is `1.0` for left and `-1.0` for right.
pub fn turn(name: &str, side: f32) -> BlockTemplate {
    let mut t = BlockTemplate::new(name, 1);
    let corner = Transform::from_yaw_degrees(PROBE_AXIS * CORNER, 90.0 * side);
    let exit = corner.mul_transform(&Transform::from_position(PROBE_AXIS * CORNER));
    t.anchors.insert(ExitSuffix::In, Transform::IDENTITY);
    t.anchors.insert(ExitSuffix::Out, exit);
    lay_lanes(&mut t, ExitSuffix::In, &Transform::IDENTITY, CORNER);
    lay_lanes(&mut t, ExitSuffix::Out, &corner, CORNER);
    t.floor.push(stem());
    let (z_min, z_max) = if side > 0.0 {
        (HALF_WIDTH, CORNER)
    } else {
        (-CORNER, -HALF_WIDTH)
    };
    t.floor.push(floor(
        Vec3::new(-CORNER - HALF_WIDTH, -FLOOR_HALF_HEIGHT, z_min),
        Vec3::new(-CORNER + HALF_WIDTH, FLOOR_HALF_HEIGHT, z_max),
    ));
    t.groups = decorations();
    t
}

/// T-junction with a left and a right exit.
pub fn fork(name: &str) -> BlockTemplate {
    let mut t = BlockTemplate::new(name, 2);
    t.anchors.insert(ExitSuffix::In, Transform::IDENTITY);
    lay_lanes(&mut t, ExitSuffix::In, &Transform::IDENTITY, CORNER);
    for (suffix, side) in [(ExitSuffix::OutL, 1.0), (ExitSuffix::OutR, -1.0)] {
        let corner = Transform::from_yaw_degrees(PROBE_AXIS * CORNER, 90.0 * side);
        let exit = corner.mul_transform(&Transform::from_position(PROBE_AXIS * CORNER));
        t.anchors.insert(suffix, exit);
        lay_lanes(&mut t, suffix, &corner, CORNER);
    }
    t.floor.push(stem());
    t.floor.push(floor(
        Vec3::new(-CORNER - HALF_WIDTH, -FLOOR_HALF_HEIGHT, -CORNER),
        Vec3::new(-CORNER + HALF_WIDTH, FLOOR_HALF_HEIGHT, CORNER),
    ));
    t.groups = vec![DecorationGroup {
        name: "Clear".into(),
        items: Vec::new(),
    }];
    t
}

/// Sample waypoints for all three lanes, walking `length` units forward
/// from `from`. The starting point itself is not emitted.
fn lay_lanes(t: &mut BlockTemplate, suffix: ExitSuffix, from: &Transform, length: f32) {
    let steps = (length / WAYPOINT_STEP).ceil().max(1.0) as usize;
    let forward = from.transform_vector(PROBE_AXIS);
    let lateral = from.transform_vector(Vec3::Z);
    for lane in Lane::ALL {
        let offset = match lane {
            Lane::Left => LANE_OFFSET,
            Lane::Center => 0.0,
            Lane::Right => -LANE_OFFSET,
        };
        let points = (1..=steps)
            .map(|i| {
                let distance = (i as f32 * WAYPOINT_STEP).min(length);
                from.position + forward * distance + lateral * offset
            })
            .collect();
        t.paths.insert(lane.group_name(suffix), points);
    }
}

fn stem() -> FloorBox {
    floor(
        Vec3::new(-CORNER - HALF_WIDTH, -FLOOR_HALF_HEIGHT, -HALF_WIDTH),
        Vec3::new(0.0, FLOOR_HALF_HEIGHT, HALF_WIDTH),
    )
}

fn floor(min: Vec3, max: Vec3) -> FloorBox {
    FloorBox {
        min,
        max,
        layer: layers::FLOOR,
    }
}

fn decorations() -> Vec<DecorationGroup> {
    vec![
        DecorationGroup {
            name: "Coins".into(),
            items: vec!["Coin".into(), "Coin".into(), "Coin".into()],
        },
        DecorationGroup {
            name: "Barrier".into(),
            items: vec!["Barrier".into()],
        },
        DecorationGroup {
            name: "Clear".into(),
            items: Vec::new(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_kit_validates() {
        for t in builtin_kit() {
            t.validate().unwrap();
        }
    }

    #[test]
    fn start_block_comes_first() {
        assert_eq!(builtin_kit()[0].name, "Start");
    }

    #[test]
    fn left_turn_exits_towards_local_left() {
        let t = turn("TurnLeft", 1.0);
        let exit = t.anchor(ExitSuffix::Out).unwrap();
        assert!(exit.position.abs_diff_eq(Vec3::new(-CORNER, 0.0, CORNER), 1e-4));
        let heading = exit.transform_vector(PROBE_AXIS);
        assert!(heading.abs_diff_eq(Vec3::Z, 1e-4));
    }

    #[test]
    fn fork_exits_face_opposite_ways() {
        let t = fork("Fork");
        let left = t.anchor(ExitSuffix::OutL).unwrap().transform_vector(PROBE_AXIS);
        let right = t.anchor(ExitSuffix::OutR).unwrap().transform_vector(PROBE_AXIS);
        assert!((left + right).length() < 1e-4);
    }

    #[test]
    fn lanes_end_at_segment_end() {
        let t = straight("Straight", 1, 16.0);
        let center = t.path(Lane::Center, ExitSuffix::Out).unwrap();
        let last = center.last().unwrap();
        assert!(last.abs_diff_eq(PROBE_AXIS * 16.0, 1e-4));
        let left = t.path(Lane::Left, ExitSuffix::Out).unwrap();
        assert!((left.last().unwrap().z - LANE_OFFSET).abs() < 1e-4);
    }
}
