//! Track core: block chaining, obstruction probing, waypoint path accumulation.
//!
//! # Invariants
//! - The chain anchor is the chosen exit of the most recently accepted block,
//!   or the configured initial anchor when nothing has been placed.
//! - A block joins the live chain only after every exit it declares probed clear;
//!   rejected instances are destroyed before the next attempt.
//! - A fork ends the generation pass it was accepted in.
//! - Path rebuilds read only live blocks and replace the follower's waypoints wholesale.

pub mod accumulator;
pub mod chain;
pub mod config;
pub mod error;
pub mod follower;
pub mod generator;
pub mod geometry;
pub mod session;

pub use accumulator::{
    AccumulatorStats, PathAccumulator, PathSegment, RebuildOutcome, WaypointSet,
};
pub use chain::{BlockChain, LiveBlock};
pub use config::{ConfigError, TrackConfig};
pub use error::TrackError;
pub use follower::{PathFollower, WaypointFollower};
pub use generator::{ExtendReport, GeneratorStats, TrackGenerator};
pub use session::{TickReport, TrackSession};

pub fn crate_info() -> &'static str {
    "autorunner-track v0.1.0"
}
