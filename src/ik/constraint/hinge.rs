use super::ConstraintFrame;
use crate::error::Result;
use crate::math::swing_twist;
use glam::{Quat, Vec3};

/// One degree of freedom: only twist about the rotation axis survives, clamped
/// to the frame's angle range when limits are enabled.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HingeConstraint {
    frame: ConstraintFrame,
}

impl HingeConstraint {
    pub fn new(rotation_axis: Vec3) -> Result<Self> {
        Ok(Self {
            frame: ConstraintFrame::new(rotation_axis)?,
        })
    }

    /// Enables angle limits with the given range in degrees.
    pub fn with_limits(mut self, min_degrees: f32, max_degrees: f32) -> Result<Self> {
        self.frame.set_limits(min_degrees, max_degrees)?;
        self.frame.set_use_angle_limits(true);
        Ok(self)
    }

    /// Free rotation about the axis.
    pub fn without_limits(mut self) -> Self {
        self.frame.set_use_angle_limits(false);
        self
    }

    pub fn frame(&self) -> &ConstraintFrame {
        &self.frame
    }

    pub fn frame_mut(&mut self) -> &mut ConstraintFrame {
        &mut self.frame
    }

    pub fn apply(&self, local_rotation: Quat) -> Quat {
        let delta = self.frame.delta(local_rotation);
        let (_, twist) = swing_twist(delta, self.frame.rotation_axis());
        let twist = if self.frame.use_angle_limits() {
            self.frame.clamp_twist(twist)
        } else {
            twist
        };
        self.frame.compose(twist)
    }

    /// Current hinge angle of `local_rotation` relative to the rest pose, in
    /// degrees. Any swing away from the axis is ignored.
    pub fn angle(&self, local_rotation: Quat) -> f32 {
        let (_, twist) = swing_twist(self.frame.delta(local_rotation), self.frame.rotation_axis());
        self.frame.twist_angle(twist)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::axis_angle;
    use approx::assert_relative_eq;

    fn elbow() -> HingeConstraint {
        HingeConstraint::new(Vec3::Z)
            .unwrap()
            .with_limits(-30.0, 45.0)
            .unwrap()
    }

    #[test]
    fn angles_inside_range_pass_unchanged() {
        let hinge = elbow();
        for theta in [-29.0_f32, -10.0, 0.0, 12.5, 44.0] {
            let out = hinge.apply(axis_angle(Vec3::Z, theta));
            assert_relative_eq!(hinge.angle(out), theta, epsilon = 1e-3);
        }
    }

    #[test]
    fn angles_past_range_clamp_to_boundary() {
        let hinge = elbow();

        let over = hinge.apply(axis_angle(Vec3::Z, 46.0));
        assert_relative_eq!(hinge.angle(over), 45.0, epsilon = 1e-3);

        let under = hinge.apply(axis_angle(Vec3::Z, -31.0));
        assert_relative_eq!(hinge.angle(under), -30.0, epsilon = 1e-3);
    }

    #[test]
    fn swing_off_axis_is_discarded() {
        let hinge = elbow();
        let candidate = Quat::from_rotation_x(0.6) * axis_angle(Vec3::Z, 20.0);

        let out = hinge.apply(candidate);

        assert!((out * Vec3::Z).abs_diff_eq(Vec3::Z, 1e-5));
        assert_relative_eq!(hinge.angle(out), 20.0, epsilon = 1e-2);
    }

    #[test]
    fn applying_twice_is_idempotent() {
        let hinge = elbow();
        let candidates = [
            axis_angle(Vec3::Z, 80.0),
            axis_angle(Vec3::Z, -5.0),
            Quat::from_euler(glam::EulerRot::XYZ, 0.4, -0.7, 1.3),
        ];
        for candidate in candidates {
            let once = hinge.apply(candidate);
            let twice = hinge.apply(once);
            assert!(twice.abs_diff_eq(once, 1e-5), "{once:?} vs {twice:?}");
        }
    }

    #[test]
    fn limits_are_relative_to_rest_pose() {
        let rest = Quat::from_rotation_y(0.8);
        let mut hinge = elbow();
        hinge.frame_mut().set_default_local_rotation(rest);

        let out = hinge.apply(rest * axis_angle(Vec3::Z, 60.0));

        assert!(out.abs_diff_eq(rest * axis_angle(Vec3::Z, 45.0), 1e-5));
    }

    #[test]
    fn unlimited_hinge_keeps_any_twist() {
        let hinge = elbow().without_limits();
        let out = hinge.apply(axis_angle(Vec3::Z, 150.0));
        assert_relative_eq!(hinge.angle(out), 150.0, epsilon = 1e-3);
    }
}
