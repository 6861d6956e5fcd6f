use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context;
use autorunner_assets::TemplateLibrary;
use autorunner_common::TurnDecision;
use autorunner_kernel::SceneWorld;
use autorunner_tools::TrackInspector;
use autorunner_track::{PathFollower, TickReport, TrackConfig, TrackSession, WaypointFollower};
use clap::{Parser, Subcommand, ValueEnum};
use glam::Vec3;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "autorunner-cli", about = "CLI tool for autorunner tracks")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Lay a track without running it and print every block
    Generate {
        /// Minimum number of blocks to place
        #[arg(short, long, default_value = "12")]
        blocks: usize,
        /// RNG seed; defaults to the config seed, then the clock
        #[arg(short, long)]
        seed: Option<u64>,
        /// JSON block catalog to use instead of the built-in kit
        #[arg(long)]
        catalog: Option<PathBuf>,
        /// YAML track config
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Run a character along the track for a number of ticks
    Run {
        /// Number of ticks to simulate
        #[arg(short, long, default_value = "200")]
        ticks: u64,
        /// RNG seed; defaults to the config seed, then the clock
        #[arg(short, long)]
        seed: Option<u64>,
        /// Which way to go at forks
        #[arg(long, value_enum, default_value_t = TurnPolicy::Alternate)]
        turns: TurnPolicy,
        /// Distance covered per tick
        #[arg(long, default_value = "4.0")]
        speed: f32,
        /// JSON block catalog to use instead of the built-in kit
        #[arg(long)]
        catalog: Option<PathBuf>,
        /// YAML track config
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Write the built-in block kit as a JSON catalog
    Kit {
        /// Output path
        #[arg(short, long, default_value = "kit.json")]
        out: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TurnPolicy {
    Left,
    Right,
    Alternate,
}

impl TurnPolicy {
    fn decide(self, fork_index: u64) -> TurnDecision {
        match self {
            TurnPolicy::Left => TurnDecision::LeftChosen,
            TurnPolicy::Right => TurnDecision::RightChosen,
            TurnPolicy::Alternate if fork_index % 2 == 0 => TurnDecision::LeftChosen,
            TurnPolicy::Alternate => TurnDecision::RightChosen,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("autorunner-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("track: {}", autorunner_track::crate_info());
            println!("tools: {}", autorunner_tools::crate_info());
            let library = TemplateLibrary::builtin();
            println!("kit: {} templates", library.len());
            for template in library.iter() {
                println!("  {} outs={}", template.name, template.outs);
            }
        }
        Commands::Generate {
            blocks,
            seed,
            catalog,
            config,
        } => {
            let (mut session, mut world) = open_session(seed, catalog.as_deref(), config.as_deref())?;
            let mut follower = WaypointFollower::new(Vec3::ZERO);
            session.start(&mut world, &mut follower)?;
            while (session.generator().stats().placed as usize) < blocks {
                if let Some(fork) = session.chain().back().filter(|b| b.is_fork()) {
                    println!("Track ends at fork #{}; a turn is needed to go further", fork.handle.0);
                    break;
                }
                let count = session.config().blocks_per_pass;
                session.extend_chain(&mut world, count)?;
            }
            print!("{}", TrackInspector::dump(&session, &world, None));
        }
        Commands::Run {
            ticks,
            seed,
            turns,
            speed,
            catalog,
            config,
        } => {
            let (mut session, mut world) = open_session(seed, catalog.as_deref(), config.as_deref())?;
            let mut follower = WaypointFollower::new(Vec3::ZERO);
            let spawn = session.start(&mut world, &mut follower)?;
            follower.set_position(spawn);
            println!("Run: seed={} spawn=({:.1}, {:.1}, {:.1})", session.seed(), spawn.x, spawn.y, spawn.z);

            let mut forks = 0;
            for tick in 0..ticks {
                follower.advance(speed);
                match session.tick(&mut world, &mut follower)? {
                    TickReport::AwaitingTurn { fork } => {
                        if follower.turn_decision() == TurnDecision::Undecided {
                            let decision = turns.decide(forks);
                            follower.request_turn(decision);
                            forks += 1;
                            tracing::info!(tick, ?fork, ?decision, "turn requested");
                        }
                    }
                    TickReport::Refilled { extend, .. } => {
                        tracing::info!(tick, accepted = extend.accepted.len(), "track extended");
                    }
                    TickReport::Rebuilt { .. } | TickReport::Idle => {}
                }
            }
            print!("{}", TrackInspector::dump(&session, &world, Some(&follower)));
            println!("Reached {} waypoints over {ticks} ticks", follower.reached());
        }
        Commands::Kit { out } => {
            let library = TemplateLibrary::builtin();
            library
                .save(&out)
                .with_context(|| format!("writing {}", out.display()))?;
            println!("Wrote {} templates to {}", library.len(), out.display());
        }
    }

    Ok(())
}

fn open_session(
    seed: Option<u64>,
    catalog: Option<&Path>,
    config: Option<&Path>,
) -> anyhow::Result<(TrackSession, SceneWorld)> {
    let config = match config {
        Some(path) => {
            TrackConfig::load(path).with_context(|| format!("loading {}", path.display()))?
        }
        None => TrackConfig::default(),
    };
    let library = match catalog {
        Some(path) => {
            TemplateLibrary::load(path).with_context(|| format!("loading {}", path.display()))?
        }
        None => TemplateLibrary::builtin(),
    };
    let seed = seed.or(config.seed).unwrap_or_else(clock_seed);
    Ok((TrackSession::new(library, config, seed), SceneWorld::new()))
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}
