use autorunner_common::{Lane, TurnDecision};
use glam::Vec3;

use crate::accumulator::WaypointSet;

/// Consumer of rebuilt paths: the running character's movement controller.
pub trait PathFollower {
    /// Replace the waypoint sequence of one lane.
    fn set_waypoints(&mut self, lane: Lane, points: Vec<Vec3>);

    /// Current choice for the next fork.
    fn turn_decision(&self) -> TurnDecision;

    /// Waypoints left ahead in the lane being followed.
    fn remaining_points(&self) -> usize;

    /// Called once the branch for `decision` has been spliced into the path.
    fn turn_consumed(&mut self, _decision: TurnDecision) {}
}

/// Point follower that walks the published lanes at a given pace.
///
/// All three lanes are consumed together, index by index, so switching lane
/// resumes at the same depth along the track.
#[derive(Debug, Clone)]
pub struct WaypointFollower {
    position: Vec3,
    lane: Lane,
    decision: TurnDecision,
    waypoints: WaypointSet,
    reached: u64,
}

impl WaypointFollower {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            lane: Lane::Center,
            decision: TurnDecision::Undecided,
            waypoints: WaypointSet::default(),
            reached: 0,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn lane(&self) -> Lane {
        self.lane
    }

    pub fn set_lane(&mut self, lane: Lane) {
        self.lane = lane;
    }

    pub fn request_turn(&mut self, decision: TurnDecision) {
        self.decision = decision;
    }

    pub fn waypoints(&self) -> &WaypointSet {
        &self.waypoints
    }

    /// Waypoints reached since creation.
    pub fn reached(&self) -> u64 {
        self.reached
    }

    /// Next waypoint in the current lane.
    pub fn target(&self) -> Option<Vec3> {
        self.waypoints.lane(self.lane).first().copied()
    }

    /// Move up to `distance` along the current lane and return how many
    /// waypoints were reached.
    pub fn advance(&mut self, distance: f32) -> usize {
        let mut budget = distance.max(0.0);
        let mut reached = 0;
        while let Some(target) = self.target() {
            let to_target = target - self.position;
            let gap = to_target.length();
            if gap > budget {
                self.position += to_target / gap * budget;
                break;
            }
            self.position = target;
            budget -= gap;
            self.pop_front();
            reached += 1;
        }
        self.reached += reached as u64;
        reached
    }

    fn pop_front(&mut self) {
        for lane in Lane::ALL {
            let points = self.waypoints.lane_mut(lane);
            if !points.is_empty() {
                points.remove(0);
            }
        }
    }
}

impl PathFollower for WaypointFollower {
    fn set_waypoints(&mut self, lane: Lane, points: Vec<Vec3>) {
        *self.waypoints.lane_mut(lane) = points;
    }

    fn turn_decision(&self) -> TurnDecision {
        self.decision
    }

    fn remaining_points(&self) -> usize {
        self.waypoints.lane(self.lane).len()
    }

    fn turn_consumed(&mut self, decision: TurnDecision) {
        if self.decision == decision {
            self.decision = TurnDecision::Undecided;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lanes(n: usize) -> WaypointSet {
        let line = |z: f32| (1..=n).map(|i| Vec3::new(-2.0 * i as f32, 0.0, z)).collect();
        WaypointSet {
            left: line(1.5),
            center: line(0.0),
            right: line(-1.5),
        }
    }

    #[test]
    fn advance_reaches_points_in_order() {
        let mut f = WaypointFollower::new(Vec3::ZERO);
        lanes(4).publish(&mut f);
        assert_eq!(f.remaining_points(), 4);

        assert_eq!(f.advance(3.0), 1);
        assert!(f.position().abs_diff_eq(Vec3::new(-3.0, 0.0, 0.0), 1e-5));
        assert_eq!(f.remaining_points(), 3);

        assert_eq!(f.advance(100.0), 3);
        assert!(f.position().abs_diff_eq(Vec3::new(-8.0, 0.0, 0.0), 1e-5));
        assert_eq!(f.remaining_points(), 0);
        assert_eq!(f.reached(), 4);
    }

    #[test]
    fn lanes_are_consumed_together() {
        let mut f = WaypointFollower::new(Vec3::ZERO);
        lanes(3).publish(&mut f);
        f.advance(2.0);
        f.set_lane(Lane::Left);
        assert_eq!(f.remaining_points(), 2);
        assert_eq!(f.target(), Some(Vec3::new(-4.0, 0.0, 1.5)));
    }

    #[test]
    fn advance_without_points_stays_put() {
        let mut f = WaypointFollower::new(Vec3::ONE);
        assert_eq!(f.advance(5.0), 0);
        assert_eq!(f.position(), Vec3::ONE);
    }

    #[test]
    fn consumed_turn_resets_only_matching_decision() {
        let mut f = WaypointFollower::new(Vec3::ZERO);
        f.request_turn(TurnDecision::LeftChosen);
        f.turn_consumed(TurnDecision::RightChosen);
        assert_eq!(f.turn_decision(), TurnDecision::LeftChosen);
        f.turn_consumed(TurnDecision::LeftChosen);
        assert_eq!(f.turn_decision(), TurnDecision::Undecided);
    }
}
