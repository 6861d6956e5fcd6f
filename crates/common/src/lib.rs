//! Shared types for the autorunner track core.
//!
//! # Invariants
//! - Transforms are rigid (position + rotation); block prefabs carry no scale.
//! - Handles are plain integers; nothing here holds a back-pointer into a scene.

pub mod track;
pub mod types;

pub use track::{layers, ExitSuffix, Lane, TurnDecision, PROBE_AXIS};
pub use types::{BlockHandle, TemplateId, Transform};
