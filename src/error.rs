use crate::ik::JointId;
use thiserror::Error;

/// Errors surfaced at rig setup time.
///
/// Solving itself never fails: an unreachable goal simply leaves the chain in
/// its best-effort pose, which callers can detect through
/// [`SolveResult`](crate::ik::SolveResult).
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum IkError {
    #[error("root joint {root} is not an ancestor of effector {effector}, IK will fail")]
    RootNotAncestor { root: JointId, effector: JointId },

    #[error("unknown joint: {0}")]
    UnknownJoint(JointId),

    #[error("chain walk exceeded {limit} joints (cyclic hierarchy?)")]
    ChainTooDeep { limit: usize },

    #[error("min angle {min} should NOT be greater than max angle {max}")]
    MinAngleAboveMax { min: f32, max: f32 },

    #[error("max angle {max} should NOT be smaller than min angle {min}")]
    MaxAngleBelowMin { min: f32, max: f32 },

    #[error("angle must be finite, but {0} is given")]
    NonFiniteAngle(f32),

    #[error("cone angle should be within [0, 180], but {0} is given")]
    ConeAngleOutOfRange(f32),

    #[error("axis must have non-zero length")]
    DegenerateAxis,

    #[error("rotation must be a finite, non-zero quaternion")]
    DegenerateRotation,
}

pub type Result<T> = std::result::Result<T, IkError>;
