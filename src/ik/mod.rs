//! Inverse Kinematics module
//!
//! Joint hierarchy, bone chains, rotation constraints and the CCD solver.

pub mod chain;
pub mod constraint;
pub mod joint;
pub mod skeleton;
pub mod solver;

pub use chain::{BoneChain, MAX_CHAIN_LENGTH};
pub use constraint::{
    AngleConstraint, ConeConstraint, ConstraintFrame, HingeConstraint, RotationConstraint,
};
pub use joint::{Joint, JointId};
pub use skeleton::{Rig, Skeleton, SkeletonBuilder};
pub use solver::{CcdSolver, SolveResult, SolverConfig};
