use autorunner_common::BlockHandle;

/// Errors from track generation and path rebuilding.
#[derive(Debug, thiserror::Error)]
pub enum TrackError {
    #[error("template pool is empty")]
    EmptyPool,
    /// Every placement tried in a row was obstructed. The block templates
    /// cannot continue the track from here.
    #[error(
        "retry budget exhausted after {rejected} obstructed placements (last tried {template:?})"
    )]
    RetryBudgetExhausted { rejected: u32, template: String },
    /// The chain ends in a fork whose branch has not been chosen yet.
    #[error("chain ends in fork {fork:?}; a turn must be chosen before extending")]
    UndecidedFork { fork: BlockHandle },
    #[error("block {handle:?} ({template:?}) has no {anchor:?} anchor")]
    MissingAnchor {
        handle: Option<BlockHandle>,
        template: String,
        anchor: String,
    },
    #[error("block {handle:?} has no {group:?} waypoint group")]
    MissingPathGroup { handle: BlockHandle, group: String },
}
