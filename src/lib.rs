//! # ccd-rig
//!
//! Cyclic Coordinate Descent inverse kinematics over a joint hierarchy, with
//! per-joint rotation limits.
//!
//! ## Features
//! - CCD solver with weighted targets and squared-distance convergence
//! - Bone chains walked from an effector up to any ancestor root
//! - Hinge, cone and legacy single-axis rotation constraints
//! - Swing-twist rotation helpers
//! - Host-agnostic: any joint store implementing [`Rig`] can be solved
//!
//! ## Example
//! ```rust
//! use ccd_rig::{CcdSolver, HingeConstraint, Rig, Skeleton, SolverConfig};
//! use glam::Vec3;
//!
//! # fn main() -> Result<(), ccd_rig::IkError> {
//! // Build a three-joint arm with a limited elbow
//! let elbow = HingeConstraint::new(Vec3::Z)?.with_limits(-90.0, 90.0)?;
//! let mut skeleton = Skeleton::builder()
//!     .add_joint(Vec3::ZERO)
//!     .add_joint_with_constraint(Vec3::Y, elbow)
//!     .add_joint(Vec3::new(0.0, 2.0, 0.0))
//!     .build();
//! let ids: Vec<_> = skeleton.ids().collect();
//!
//! // Solve for target
//! let solver = CcdSolver::for_rig(&skeleton, ids[2], ids[0], SolverConfig::default())?;
//! let result = solver.solve(&mut skeleton, Vec3::new(1.0, 1.0, 0.0));
//! println!("Converged: {}, iterations: {}", result.converged, result.iterations);
//! assert!(skeleton.world_position(ids[2]).distance(Vec3::new(1.0, 1.0, 0.0)) < 0.01);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod ik;
pub mod math;

pub use error::IkError;
pub use ik::constraint::{
    AngleConstraint, ConeConstraint, ConstraintFrame, HingeConstraint, RotationConstraint,
};
pub use ik::{
    BoneChain, CcdSolver, Joint, JointId, Rig, Skeleton, SkeletonBuilder, SolveResult,
    SolverConfig, MAX_CHAIN_LENGTH,
};
pub use math::Transform;
