//! Developer tooling: read-only views of a track session for the CLI and tests.
//!
//! # Invariants
//! - Inspection never mutates the world or the session.

pub mod inspector;

pub use inspector::{BlockInfo, TrackInspector, TrackSummary};

pub fn crate_info() -> &'static str {
    "autorunner-tools v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("tools"));
    }
}
