//! Math utilities module
//!
//! Rigid joint transforms plus the swing-twist and angle helpers the rotation
//! constraints are built on.

pub mod rotation;
mod transform;

pub use rotation::{
    angle_between, axis_angle, from_to_rotation, normalize_angle, perpendicular_axis,
    project_on_plane, signed_angle, swing_twist,
};
pub use transform::Transform;

// Re-export commonly used glam types
pub use glam::{Quat, Vec3};
