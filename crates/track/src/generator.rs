use autorunner_assets::{BlockTemplate, TemplateLibrary};
use autorunner_common::{BlockHandle, ExitSuffix, Transform};
use autorunner_kernel::{RayHit, SeededRng, TrackWorld};
use glam::Vec3;

use crate::chain::{BlockChain, LiveBlock};
use crate::config::TrackConfig;
use crate::error::TrackError;
use crate::geometry;

/// Result of one [`TrackGenerator::extend_chain`] pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtendReport {
    /// Accepted blocks in chain order.
    pub accepted: Vec<BlockHandle>,
    /// Placements destroyed because an exit probe was obstructed.
    pub rejected: u32,
    /// The pass ended early on a fork.
    pub fork_terminated: bool,
}

/// Running totals since the last reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeneratorStats {
    pub passes: u64,
    pub placed: u64,
    pub rejected: u64,
    pub fork_terminations: u64,
}

enum Probe {
    Clear { exit: ExitSuffix, transform: Transform },
    Blocked { exit: ExitSuffix, hit: RayHit },
}

/// Stitches block templates onto the end of a [`BlockChain`].
pub struct TrackGenerator {
    library: TemplateLibrary,
    config: TrackConfig,
    rng: SeededRng,
    stats: GeneratorStats,
    spawn_point: Option<Vec3>,
}

impl TrackGenerator {
    pub fn new(library: TemplateLibrary, config: TrackConfig, rng: SeededRng) -> Self {
        Self {
            library,
            config,
            rng,
            stats: GeneratorStats::default(),
            spawn_point: None,
        }
    }

    pub fn library(&self) -> &TemplateLibrary {
        &self.library
    }

    pub fn config(&self) -> &TrackConfig {
        &self.config
    }

    pub fn stats(&self) -> GeneratorStats {
        self.stats
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    /// Where the character should be dropped, known once the first block is placed.
    pub fn spawn_point(&self) -> Option<Vec3> {
        self.spawn_point
    }

    /// Forget everything placed so far; the next block placed is the start block again.
    pub fn reset(&mut self, seed: u64) {
        self.rng.reseed(seed);
        self.stats = GeneratorStats::default();
        self.spawn_point = None;
    }

    /// Append up to `count` probe-checked blocks at the chain anchor.
    ///
    /// Stops early after accepting a fork, and refuses to extend while the
    /// chain still ends in one: the turn must be known first. Fails once
    /// `retry_budget` placements in a row have been obstructed; a budget of 0
    /// fails on the first obstruction.
    pub fn extend_chain<W: TrackWorld>(
        &mut self,
        world: &mut W,
        chain: &mut BlockChain,
        count: usize,
    ) -> Result<ExtendReport, TrackError> {
        let _span = tracing::info_span!("extend_chain", count).entered();
        if self.library.is_empty() {
            return Err(TrackError::EmptyPool);
        }
        if let Some(fork) = chain.back().filter(|b| b.is_fork()) {
            tracing::debug!(fork = ?fork.handle, "extension waits for a turn decision");
            return Err(TrackError::UndecidedFork { fork: fork.handle });
        }

        let mut report = ExtendReport::default();
        let mut remaining = count;
        let mut streak = 0u32;

        while remaining > 0 {
            let position = if self.stats.placed == 0 {
                0
            } else {
                self.rng.below(self.library.len())
            };
            let Some(template) = self.library.at(position) else {
                return Err(TrackError::EmptyPool);
            };

            let entry = template
                .anchor(ExitSuffix::In)
                .ok_or_else(|| TrackError::MissingAnchor {
                    handle: None,
                    template: template.name.clone(),
                    anchor: ExitSuffix::In.as_str().to_string(),
                })?;
            let anchor = chain.anchor();
            let root = geometry::root_for_entry(&anchor, entry);
            let handle = world.spawn_instance(template, root.position, root.rotation);

            let probe = match probe_exits(world, handle, template, &self.config) {
                Ok(probe) => probe,
                Err(err) => {
                    world.destroy_instance(handle);
                    return Err(err);
                }
            };

            let (exit, exit_transform) = match probe {
                Probe::Clear { exit, transform } => (exit, transform),
                Probe::Blocked { exit, hit } => {
                    world.destroy_instance(handle);
                    report.rejected += 1;
                    self.stats.rejected += 1;
                    streak += 1;
                    let budget = self.config.retry_budget.saturating_sub(streak);
                    tracing::debug!(
                        template = %template.name,
                        %exit,
                        distance = hit.distance,
                        budget,
                        "placement obstructed"
                    );
                    if budget == 0 {
                        tracing::error!(
                            rejected = report.rejected,
                            template = %template.name,
                            "retry budget exhausted; block templates cannot continue the track"
                        );
                        return Err(TrackError::RetryBudgetExhausted {
                            rejected: streak,
                            template: template.name.clone(),
                        });
                    }
                    continue;
                }
            };

            streak = 0;
            pick_decoration(&mut self.rng, world, handle, template);
            if self.stats.placed == 0 {
                self.spawn_point = Some(geometry::spawn_point(&anchor, self.config.spawn_height));
            }

            chain.push(LiveBlock {
                handle,
                template: template.id(),
                name: template.name.clone(),
                outs: template.outs,
            });
            chain.set_anchor(exit_transform);
            self.stats.placed += 1;
            report.accepted.push(handle);
            remaining -= 1;
            tracing::debug!(template = %template.name, ?handle, %exit, "block accepted");

            if template.is_fork() {
                remaining = 0;
                report.fork_terminated = true;
                self.stats.fork_terminations += 1;
            }
        }

        self.stats.passes += 1;
        tracing::info!(
            accepted = report.accepted.len(),
            rejected = report.rejected,
            fork = report.fork_terminated,
            "generation pass complete"
        );
        Ok(report)
    }
}

/// Keep one decoration group at random and disable the rest.
fn pick_decoration<W: TrackWorld>(
    rng: &mut SeededRng,
    world: &mut W,
    handle: BlockHandle,
    template: &BlockTemplate,
) {
    if template.groups.len() < 2 {
        return;
    }
    let keep = rng.below(template.groups.len());
    for (i, group) in template.groups.iter().enumerate() {
        if i != keep {
            world.set_group_enabled(handle, &group.name, false);
        }
    }
}

/// Probe every declared exit in order. The first obstruction wins; when all
/// are clear the last exit probed is the one the chain continues from.
fn probe_exits<W: TrackWorld>(
    world: &mut W,
    handle: BlockHandle,
    template: &BlockTemplate,
    config: &TrackConfig,
) -> Result<Probe, TrackError> {
    let mut last = None;
    for &exit in template.exits() {
        let transform = world
            .named_child_transform(handle, exit.as_str())
            .ok_or_else(|| TrackError::MissingAnchor {
                handle: Some(handle),
                template: template.name.clone(),
                anchor: exit.as_str().to_string(),
            })?;
        let ray = geometry::probe_ray(&transform);
        let hit = world.raycast(&ray, config.probe_distance, config.probe_layers);
        tracing::trace!(template = %template.name, %exit, blocked = hit.is_some(), "probe");
        if let Some(hit) = hit {
            return Ok(Probe::Blocked { exit, hit });
        }
        last = Some((exit, transform));
    }
    let (exit, transform) = last.ok_or_else(|| TrackError::MissingAnchor {
        handle: Some(handle),
        template: template.name.clone(),
        anchor: ExitSuffix::Out.as_str().to_string(),
    })?;
    Ok(Probe::Clear { exit, transform })
}
