use autorunner_assets::TemplateLibrary;
use autorunner_common::BlockHandle;
use autorunner_kernel::{SeededRng, TrackWorld};
use glam::Vec3;

use crate::accumulator::{PathAccumulator, RebuildOutcome};
use crate::chain::BlockChain;
use crate::config::TrackConfig;
use crate::error::TrackError;
use crate::follower::PathFollower;
use crate::generator::{ExtendReport, TrackGenerator};
use crate::geometry;

/// What one [`TrackSession::tick`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum TickReport {
    /// The follower still has enough points ahead.
    Idle,
    /// The walk reached a fork and no turn has been chosen.
    AwaitingTurn { fork: BlockHandle },
    /// The path was rebuilt from the live chain.
    Rebuilt {
        consumed: usize,
        destroyed: usize,
        points: usize,
    },
    /// The live chain ran dry, a new generation pass was appended and its
    /// first waypoints were joined onto the path.
    Refilled {
        consumed: usize,
        destroyed: usize,
        points: usize,
        extend: ExtendReport,
    },
}

/// Generator, live chain and path walk driven together for one run.
pub struct TrackSession {
    generator: TrackGenerator,
    chain: BlockChain,
    accumulator: PathAccumulator,
    seed: u64,
}

impl TrackSession {
    pub fn new(library: TemplateLibrary, config: TrackConfig, seed: u64) -> Self {
        let chain = BlockChain::new(config.initial_anchor);
        Self {
            generator: TrackGenerator::new(library, config, SeededRng::new(seed)),
            chain,
            accumulator: PathAccumulator::new(),
            seed,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &TrackConfig {
        self.generator.config()
    }

    pub fn chain(&self) -> &BlockChain {
        &self.chain
    }

    pub fn generator(&self) -> &TrackGenerator {
        &self.generator
    }

    pub fn accumulator(&self) -> &PathAccumulator {
        &self.accumulator
    }

    /// Lay the opening stretch and publish its first waypoints.
    ///
    /// Returns where the character should be dropped.
    pub fn start<W, F>(&mut self, world: &mut W, follower: &mut F) -> Result<Vec3, TrackError>
    where
        W: TrackWorld,
        F: PathFollower + ?Sized,
    {
        self.reset(world);
        let count = self.config().blocks_per_pass;
        self.generator.extend_chain(world, &mut self.chain, count)?;
        self.accumulator
            .rebuild_path(world, &mut self.chain, follower, true)?;
        let spawn = self.generator.spawn_point().unwrap_or_else(|| {
            geometry::spawn_point(&self.config().initial_anchor, self.config().spawn_height)
        });
        tracing::info!(seed = self.seed, ?spawn, "run started");
        Ok(spawn)
    }

    /// Append up to `count` blocks at the current anchor.
    pub fn extend_chain<W: TrackWorld>(
        &mut self,
        world: &mut W,
        count: usize,
    ) -> Result<ExtendReport, TrackError> {
        self.generator.extend_chain(world, &mut self.chain, count)
    }

    /// Rebuild the path once the follower runs low, refilling the chain when
    /// the walk drains it.
    pub fn tick<W, F>(&mut self, world: &mut W, follower: &mut F) -> Result<TickReport, TrackError>
    where
        W: TrackWorld,
        F: PathFollower + ?Sized,
    {
        if follower.remaining_points() > self.config().refill_threshold {
            return Ok(TickReport::Idle);
        }

        let segment = match self
            .accumulator
            .rebuild_path(world, &mut self.chain, follower, false)?
        {
            RebuildOutcome::AwaitingTurn { fork } => return Ok(TickReport::AwaitingTurn { fork }),
            RebuildOutcome::Complete(segment) => segment,
        };
        let consumed = segment.consumed.len();
        let destroyed = self.remove_passed_blocks(world);

        if !segment.drained {
            return Ok(TickReport::Rebuilt {
                consumed,
                destroyed,
                points: segment.waypoints.total(),
            });
        }

        let count = self.config().blocks_per_pass;
        let extend = self.generator.extend_chain(world, &mut self.chain, count)?;
        let mut waypoints = segment.waypoints;
        if let RebuildOutcome::Complete(next) =
            self.accumulator
                .collect(world, &mut self.chain, true, follower.turn_decision())?
        {
            waypoints.extend(next.waypoints);
        }
        waypoints.publish(follower);
        tracing::debug!(
            accepted = extend.accepted.len(),
            points = waypoints.total(),
            "chain refilled"
        );
        Ok(TickReport::Refilled {
            consumed,
            destroyed,
            points: waypoints.total(),
            extend,
        })
    }

    /// Destroy retired blocks beyond the configured number kept behind the
    /// character. Returns how many were destroyed.
    pub fn remove_passed_blocks<W: TrackWorld>(&mut self, world: &mut W) -> usize {
        let keep = self.config().retain_passed;
        let mut destroyed = 0;
        while self.chain.retired_len() > keep {
            let Some(handle) = self.chain.pop_retired() else {
                break;
            };
            if world.destroy_instance(handle) {
                destroyed += 1;
            }
        }
        if destroyed > 0 {
            tracing::debug!(destroyed, "passed blocks removed");
        }
        destroyed
    }

    /// Destroy every instance the session placed and start over from the
    /// initial anchor with the session seed.
    pub fn reset<W: TrackWorld>(&mut self, world: &mut W) {
        let anchor = self.config().initial_anchor;
        let handles = self.chain.clear(anchor);
        let count = handles.len();
        for handle in handles {
            world.destroy_instance(handle);
        }
        self.generator.reset(self.seed);
        self.accumulator.reset();
        if count > 0 {
            tracing::info!(destroyed = count, "session reset");
        }
    }
}
