use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Local axis of an exit anchor along which the track continues.
///
/// Obstruction probes are cast along this axis, and block kits are authored
/// so that their exits face it.
pub const PROBE_AXIS: Vec3 = Vec3::NEG_X;

/// Collision layer bits.
pub mod layers {
    pub const FLOOR: u32 = 1;
    pub const COIN: u32 = 1 << 1;
    pub const OBSTACLE: u32 = 1 << 2;
    pub const ALL: u32 = FLOOR | COIN | OBSTACLE;
}

/// One of the three waypoint lanes a block exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Lane {
    Left,
    Center,
    Right,
}

impl Lane {
    pub const ALL: [Lane; 3] = [Lane::Left, Lane::Center, Lane::Right];

    pub fn as_str(self) -> &'static str {
        match self {
            Lane::Left => "Left",
            Lane::Center => "Center",
            Lane::Right => "Right",
        }
    }

    /// Name of the waypoint group for this lane on the given side of a block,
    /// e.g. `CenterIn` or `LeftOutR`.
    pub fn group_name(self, suffix: ExitSuffix) -> String {
        format!("{}{}", self.as_str(), suffix.as_str())
    }
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anchor and path-group suffix of a block.
///
/// `In` names the entry anchor and the waypoints leading up to a block's
/// decision point; the `Out*` variants name exit anchors and the waypoints
/// leading out through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ExitSuffix {
    In,
    Out,
    OutL,
    OutR,
}

impl ExitSuffix {
    pub fn as_str(self) -> &'static str {
        match self {
            ExitSuffix::In => "In",
            ExitSuffix::Out => "Out",
            ExitSuffix::OutL => "OutL",
            ExitSuffix::OutR => "OutR",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "In" => Some(ExitSuffix::In),
            "Out" => Some(ExitSuffix::Out),
            "OutL" => Some(ExitSuffix::OutL),
            "OutR" => Some(ExitSuffix::OutR),
            _ => None,
        }
    }

    /// Exits a block with `outs` declared branches must carry, in probe order.
    pub fn exits_for(outs: u32) -> &'static [ExitSuffix] {
        if outs >= 2 {
            &[ExitSuffix::OutR, ExitSuffix::OutL]
        } else {
            &[ExitSuffix::Out]
        }
    }
}

impl fmt::Display for ExitSuffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Turn choice the character has made at the fork ahead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TurnDecision {
    #[default]
    Undecided,
    LeftChosen,
    RightChosen,
}

impl TurnDecision {
    /// Exit a fork leaves through for this decision.
    pub fn fork_exit(self) -> Option<ExitSuffix> {
        match self {
            TurnDecision::Undecided => None,
            TurnDecision::LeftChosen => Some(ExitSuffix::OutL),
            TurnDecision::RightChosen => Some(ExitSuffix::OutR),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_names_concatenate_lane_and_suffix() {
        assert_eq!(Lane::Center.group_name(ExitSuffix::In), "CenterIn");
        assert_eq!(Lane::Left.group_name(ExitSuffix::OutR), "LeftOutR");
    }

    #[test]
    fn fork_probes_right_before_left() {
        assert_eq!(ExitSuffix::exits_for(0), &[ExitSuffix::Out]);
        assert_eq!(ExitSuffix::exits_for(1), &[ExitSuffix::Out]);
        assert_eq!(
            ExitSuffix::exits_for(2),
            &[ExitSuffix::OutR, ExitSuffix::OutL]
        );
    }

    #[test]
    fn suffix_parse_matches_as_str() {
        for s in [
            ExitSuffix::In,
            ExitSuffix::Out,
            ExitSuffix::OutL,
            ExitSuffix::OutR,
        ] {
            assert_eq!(ExitSuffix::parse(s.as_str()), Some(s));
        }
        assert_eq!(ExitSuffix::parse("Sideways"), None);
    }

    #[test]
    fn undecided_has_no_exit() {
        assert_eq!(TurnDecision::default(), TurnDecision::Undecided);
        assert_eq!(TurnDecision::Undecided.fork_exit(), None);
        assert_eq!(TurnDecision::LeftChosen.fork_exit(), Some(ExitSuffix::OutL));
    }
}
