//! World kernel: the seam between the track core and the host engine.
//!
//! # Invariants
//! - The track core touches the scene only through [`TrackWorld`].
//! - [`SceneWorld`] iterates instances in handle order (BTreeMap), so probes
//!   and dumps are reproducible across runs.
//! - Randomness flows from an explicit [`SeededRng`]; nothing reads the clock.

pub mod ray;
pub mod rng;
pub mod world;

pub use ray::{Ray, RayHit};
pub use rng::SeededRng;
pub use world::{InstanceData, ProbeRecord, SceneWorld, TrackWorld, WorldEvent};
