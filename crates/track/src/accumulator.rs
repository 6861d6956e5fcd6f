use autorunner_common::{BlockHandle, ExitSuffix, Lane, TurnDecision};
use autorunner_kernel::TrackWorld;
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::chain::BlockChain;
use crate::error::TrackError;
use crate::follower::PathFollower;

/// Left, center and right waypoint sequences.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WaypointSet {
    pub left: Vec<Vec3>,
    pub center: Vec<Vec3>,
    pub right: Vec<Vec3>,
}

impl WaypointSet {
    pub fn lane(&self, lane: Lane) -> &[Vec3] {
        match lane {
            Lane::Left => &self.left,
            Lane::Center => &self.center,
            Lane::Right => &self.right,
        }
    }

    pub fn lane_mut(&mut self, lane: Lane) -> &mut Vec<Vec3> {
        match lane {
            Lane::Left => &mut self.left,
            Lane::Center => &mut self.center,
            Lane::Right => &mut self.right,
        }
    }

    /// Append `other` lane by lane.
    pub fn extend(&mut self, other: WaypointSet) {
        self.left.extend(other.left);
        self.center.extend(other.center);
        self.right.extend(other.right);
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty() && self.center.is_empty() && self.right.is_empty()
    }

    /// Total number of points over all lanes.
    pub fn total(&self) -> usize {
        self.left.len() + self.center.len() + self.right.len()
    }

    /// Replace the follower's three sequences with this set.
    pub fn publish<F: PathFollower + ?Sized>(&self, follower: &mut F) {
        for lane in Lane::ALL {
            follower.set_waypoints(lane, self.lane(lane).to_vec());
        }
    }
}

/// Waypoints gathered by one path walk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathSegment {
    pub waypoints: WaypointSet,
    /// Blocks the walk moved off the live chain, in order.
    pub consumed: Vec<BlockHandle>,
    /// Turn taken at a fork during this walk.
    pub turn: Option<TurnDecision>,
    /// The live chain is empty after the walk.
    pub drained: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RebuildOutcome {
    Complete(PathSegment),
    /// A fork needs the character's turn before the walk can continue.
    /// Nothing was consumed or published.
    AwaitingTurn { fork: BlockHandle },
}

/// Running totals since the last reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccumulatorStats {
    pub rebuilds: u64,
    pub stalls: u64,
    pub consumed: u64,
}

/// Walks the live chain and turns block waypoint groups into a follower path.
#[derive(Debug, Default)]
pub struct PathAccumulator {
    stats: AccumulatorStats,
}

impl PathAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> AccumulatorStats {
        self.stats
    }

    pub fn reset(&mut self) {
        self.stats = AccumulatorStats::default();
    }

    /// Walk the chain with the follower's current turn decision and, unless a
    /// fork is still undecided, replace the follower's waypoints with the result.
    pub fn rebuild_path<W, F>(
        &mut self,
        world: &W,
        chain: &mut BlockChain,
        follower: &mut F,
        start_from_entry: bool,
    ) -> Result<RebuildOutcome, TrackError>
    where
        W: TrackWorld + ?Sized,
        F: PathFollower + ?Sized,
    {
        let outcome = self.collect(world, chain, start_from_entry, follower.turn_decision())?;
        if let RebuildOutcome::Complete(segment) = &outcome {
            segment.waypoints.publish(follower);
            if let Some(decision) = segment.turn {
                follower.turn_consumed(decision);
            }
        }
        Ok(outcome)
    }

    /// Walk the chain from the front and gather waypoints without publishing.
    ///
    /// `start_from_entry` makes the first block contribute its `In` group;
    /// otherwise it contributes its exit side. The walk stops at the second
    /// block with exits, which stays live; every block before it is retired.
    /// Chain changes are applied only when the walk completes.
    pub fn collect<W: TrackWorld + ?Sized>(
        &mut self,
        world: &W,
        chain: &mut BlockChain,
        start_from_entry: bool,
        decision: TurnDecision,
    ) -> Result<RebuildOutcome, TrackError> {
        let _span = tracing::debug_span!("rebuild_path", start_from_entry).entered();

        let mut from_entry = start_from_entry;
        let mut steps: Vec<(BlockHandle, ExitSuffix)> = Vec::new();
        let mut pops = 0;
        let mut turn = None;

        for block in chain.iter() {
            let mut suffix = if from_entry || block.outs == 0 {
                ExitSuffix::In
            } else {
                ExitSuffix::Out
            };
            if block.is_fork() && !from_entry {
                let Some(exit) = decision.fork_exit() else {
                    self.stats.stalls += 1;
                    tracing::debug!(fork = ?block.handle, "waiting for turn decision");
                    return Ok(RebuildOutcome::AwaitingTurn { fork: block.handle });
                };
                suffix = exit;
                turn = Some((block.handle, exit, decision));
            }
            steps.push((block.handle, suffix));
            if block.outs > 0 {
                if from_entry {
                    break;
                }
                from_entry = true;
            }
            pops += 1;
        }

        let mut waypoints = WaypointSet::default();
        for (handle, suffix) in &steps {
            for lane in Lane::ALL {
                let group = lane.group_name(*suffix);
                let points = world
                    .children_positions(*handle, &group)
                    .ok_or(TrackError::MissingPathGroup {
                        handle: *handle,
                        group,
                    })?;
                waypoints.lane_mut(lane).extend(points);
            }
        }

        if let Some((handle, exit, _)) = turn {
            let anchor = world
                .named_child_transform(handle, exit.as_str())
                .ok_or_else(|| TrackError::MissingAnchor {
                    handle: Some(handle),
                    template: chain
                        .iter()
                        .find(|b| b.handle == handle)
                        .map(|b| b.name.clone())
                        .unwrap_or_default(),
                    anchor: exit.as_str().to_string(),
                })?;
            chain.set_anchor(anchor);
        }

        let consumed: Vec<BlockHandle> = (0..pops)
            .filter_map(|_| chain.retire_front().map(|b| b.handle))
            .collect();
        self.stats.rebuilds += 1;
        self.stats.consumed += consumed.len() as u64;
        tracing::debug!(
            walked = steps.len(),
            consumed = consumed.len(),
            points = waypoints.center.len(),
            "path rebuilt"
        );

        Ok(RebuildOutcome::Complete(PathSegment {
            waypoints,
            consumed,
            turn: turn.map(|(_, _, decision)| decision),
            drained: chain.is_empty(),
        }))
    }
}
