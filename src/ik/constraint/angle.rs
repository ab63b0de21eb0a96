use super::reject;
use crate::error::{IkError, Result};
use crate::ik::{JointId, Rig};
use crate::math::{from_to_rotation, project_on_plane};
use glam::{Quat, Vec3};

/// Single-axis limiter that only lets the twist axis move in the plane
/// perpendicular to `rotate_axis`.
///
/// Works incrementally: each call compares the candidate against the
/// previous local rotation rather than a fixed rest pose, so callers must
/// pass the rotation the joint held before the candidate was proposed.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "RawAngle")
)]
pub struct AngleConstraint {
    twist_axis: Vec3,
    rotate_axis: Vec3,
}

impl Default for AngleConstraint {
    fn default() -> Self {
        Self {
            twist_axis: Vec3::Z,
            rotate_axis: Vec3::X,
        }
    }
}

impl AngleConstraint {
    pub fn new(twist_axis: Vec3, rotate_axis: Vec3) -> Result<Self> {
        let mut constraint = Self::default();
        constraint.set_twist_axis(twist_axis)?;
        constraint.set_rotate_axis(rotate_axis)?;
        Ok(constraint)
    }

    /// Points the twist axis at `child`, expressed in `joint`'s local frame.
    pub fn towards_child<R: Rig + ?Sized>(rig: &R, joint: JointId, child: JointId) -> Result<Self> {
        for id in [joint, child] {
            if !rig.contains(id) {
                return Err(IkError::UnknownJoint(id));
            }
        }
        let world_dir = rig.world_position(child) - rig.world_position(joint);
        let local_dir = rig.world_rotation(joint).inverse() * world_dir;

        let mut constraint = Self::default();
        constraint.set_twist_axis(local_dir)?;
        Ok(constraint)
    }

    pub fn twist_axis(&self) -> Vec3 {
        self.twist_axis
    }

    pub fn set_twist_axis(&mut self, axis: Vec3) -> Result<()> {
        let Some(axis) = axis.try_normalize() else {
            return reject(IkError::DegenerateAxis);
        };
        self.twist_axis = axis;
        Ok(())
    }

    pub fn rotate_axis(&self) -> Vec3 {
        self.rotate_axis
    }

    pub fn set_rotate_axis(&mut self, axis: Vec3) -> Result<()> {
        let Some(axis) = axis.try_normalize() else {
            return reject(IkError::DegenerateAxis);
        };
        self.rotate_axis = axis;
        Ok(())
    }

    /// Replaces the step from `previous` to `current` with the minimal
    /// rotation between the twist axis before and after that step, both
    /// projected onto the plane perpendicular to `rotate_axis`.
    pub fn apply(&self, previous: Quat, current: Quat) -> Quat {
        let delta = previous.inverse() * current;
        let old_dir = self.project(self.twist_axis);
        let new_dir = self.project(delta * self.twist_axis);
        (previous * from_to_rotation(old_dir, new_dir)).normalize()
    }

    fn project(&self, dir: Vec3) -> Vec3 {
        project_on_plane(dir.normalize_or_zero(), self.rotate_axis).normalize_or_zero()
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawAngle {
    twist_axis: Vec3,
    rotate_axis: Vec3,
}

#[cfg(feature = "serde")]
impl TryFrom<RawAngle> for AngleConstraint {
    type Error = IkError;

    fn try_from(raw: RawAngle) -> Result<Self> {
        Self::new(raw.twist_axis, raw.rotate_axis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ik::Skeleton;

    fn deg(d: f32) -> f32 {
        d.to_radians()
    }

    #[test]
    fn rotation_about_rotate_axis_passes() {
        let constraint = AngleConstraint::default();
        let current = Quat::from_rotation_x(deg(20.0));

        let out = constraint.apply(Quat::IDENTITY, current);

        assert!(out.abs_diff_eq(current, 1e-5));
    }

    #[test]
    fn rotation_about_other_axes_is_removed() {
        let constraint = AngleConstraint::default();

        let out = constraint.apply(Quat::IDENTITY, Quat::from_rotation_y(deg(30.0)));
        assert!(out.abs_diff_eq(Quat::IDENTITY, 1e-5));

        let mixed = Quat::from_rotation_x(deg(20.0)) * Quat::from_rotation_y(deg(30.0));
        let out = constraint.apply(Quat::IDENTITY, mixed);
        assert!(out.abs_diff_eq(Quat::from_rotation_x(deg(20.0)), 1e-4));
    }

    #[test]
    fn step_is_measured_from_previous_rotation() {
        let constraint = AngleConstraint::default();
        let previous = Quat::from_rotation_z(0.5);
        let current = previous * Quat::from_rotation_x(deg(15.0));

        let out = constraint.apply(previous, current);

        assert!(out.abs_diff_eq(current, 1e-5));
    }

    #[test]
    fn twist_axis_along_rotate_axis_freezes_joint() {
        let constraint = AngleConstraint::new(Vec3::X, Vec3::X).unwrap();
        let previous = Quat::from_rotation_y(0.3);

        let out = constraint.apply(previous, Quat::from_rotation_z(1.0));

        assert!(!out.is_nan());
        assert!(out.abs_diff_eq(previous, 1e-5));
    }

    #[test]
    fn twist_axis_can_be_derived_from_child() {
        let skeleton = Skeleton::builder()
            .add_joint(Vec3::ZERO)
            .add_joint(Vec3::new(0.0, 0.0, 2.0))
            .build();
        let ids = skeleton.ids().collect::<Vec<_>>();

        let constraint = AngleConstraint::towards_child(&skeleton, ids[0], ids[1]).unwrap();

        assert!(constraint.twist_axis().abs_diff_eq(Vec3::Z, 1e-6));
        assert_eq!(
            AngleConstraint::towards_child(&skeleton, ids[0], ids[0]),
            Err(IkError::DegenerateAxis)
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn zero_axis_is_rejected_on_load() {
        let loaded: AngleConstraint =
            serde_json::from_str(r#"{"twist_axis":[0.0,2.0,0.0],"rotate_axis":[1.0,0.0,0.0]}"#)
                .unwrap();
        assert_eq!(loaded.twist_axis(), Vec3::Y);

        let zero = r#"{"twist_axis":[0.0,0.0,0.0],"rotate_axis":[1.0,0.0,0.0]}"#;
        assert!(serde_json::from_str::<AngleConstraint>(zero).is_err());
    }
}
