use super::{reject, ConstraintFrame};
use crate::error::{IkError, Result};
use crate::math::{angle_between, axis_angle, project_on_plane, swing_twist};
use glam::{Quat, Vec3};

const PLANE_EPSILON_SQ: f32 = 1e-10;

/// Two degrees of freedom: swing of the rotation axis is bounded by a cone and
/// twist about the axis may additionally be range limited.
///
/// The most recent swing/twist split of the delta rotation is kept for
/// visualization.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "RawCone")
)]
pub struct ConeConstraint {
    frame: ConstraintFrame,
    use_cone_limit: bool,
    cone_angle: f32,
    #[cfg_attr(feature = "serde", serde(skip))]
    swing_rotation: Quat,
    #[cfg_attr(feature = "serde", serde(skip))]
    twist_rotation: Quat,
}

impl Default for ConeConstraint {
    fn default() -> Self {
        Self {
            frame: ConstraintFrame::default(),
            use_cone_limit: true,
            cone_angle: 30.0,
            swing_rotation: Quat::IDENTITY,
            twist_rotation: Quat::IDENTITY,
        }
    }
}

impl ConeConstraint {
    pub fn new(rotation_axis: Vec3) -> Result<Self> {
        Ok(Self {
            frame: ConstraintFrame::new(rotation_axis)?,
            ..Self::default()
        })
    }

    /// Enables the swing cone with the given half-angle in degrees.
    pub fn with_cone_angle(mut self, degrees: f32) -> Result<Self> {
        self.set_cone_angle(degrees)?;
        self.use_cone_limit = true;
        Ok(self)
    }

    /// Enables twist limits with the given range in degrees.
    pub fn with_twist_limits(mut self, min_degrees: f32, max_degrees: f32) -> Result<Self> {
        self.frame.set_limits(min_degrees, max_degrees)?;
        self.frame.set_use_angle_limits(true);
        Ok(self)
    }

    pub fn without_twist_limits(mut self) -> Self {
        self.frame.set_use_angle_limits(false);
        self
    }

    pub fn frame(&self) -> &ConstraintFrame {
        &self.frame
    }

    pub fn frame_mut(&mut self) -> &mut ConstraintFrame {
        &mut self.frame
    }

    pub fn use_cone_limit(&self) -> bool {
        self.use_cone_limit
    }

    pub fn set_use_cone_limit(&mut self, enabled: bool) {
        self.use_cone_limit = enabled;
    }

    pub fn cone_angle(&self) -> f32 {
        self.cone_angle
    }

    /// Half-angle of the swing cone in degrees, within `[0, 180]`.
    pub fn set_cone_angle(&mut self, degrees: f32) -> Result<()> {
        if !(0.0..=180.0).contains(&degrees) {
            return reject(IkError::ConeAngleOutOfRange(degrees));
        }
        self.cone_angle = degrees;
        Ok(())
    }

    pub fn swing_rotation(&self) -> Quat {
        self.swing_rotation
    }

    pub fn twist_rotation(&self) -> Quat {
        self.twist_rotation
    }

    pub fn apply(&mut self, local_rotation: Quat) -> Quat {
        let (swing, twist) = self.limit(self.frame.delta(local_rotation));
        self.swing_rotation = swing;
        self.twist_rotation = twist;
        self.frame.compose(swing * twist)
    }

    /// Refreshes the swing/twist split for `local_rotation` without limiting.
    pub fn observe(&mut self, local_rotation: Quat) {
        let (swing, twist) = swing_twist(self.frame.delta(local_rotation), self.frame.rotation_axis());
        self.swing_rotation = swing;
        self.twist_rotation = twist;
    }

    /// Angle between the rest axis and the swung axis of `local_rotation`, in
    /// degrees.
    pub fn swing_angle(&self, local_rotation: Quat) -> f32 {
        let axis = self.frame.rotation_axis();
        angle_between(axis, self.frame.delta(local_rotation) * axis)
    }

    fn limit(&self, delta: Quat) -> (Quat, Quat) {
        let axis = self.frame.rotation_axis();
        let (mut swing, mut twist) = swing_twist(delta, axis);

        if self.frame.use_angle_limits() {
            twist = self.frame.clamp_twist(twist);
        }

        if self.use_cone_limit {
            let axis_new = swing * axis;
            if angle_between(axis, axis_new) > self.cone_angle {
                swing = axis_angle(self.swing_plane(swing, axis_new), self.cone_angle);
            }
        }

        (swing, twist)
    }

    /// Normal of the plane the swing moves the axis through.
    ///
    /// Falls back to the swing's own axis when the axis is flipped to
    /// (nearly) its opposite and the cross product vanishes.
    fn swing_plane(&self, swing: Quat, axis_new: Vec3) -> Vec3 {
        let axis = self.frame.rotation_axis();
        let normal = axis.cross(axis_new);
        if normal.length_squared() > PLANE_EPSILON_SQ {
            return normal.normalize();
        }
        let (swing_axis, _) = swing.to_axis_angle();
        project_on_plane(swing_axis, axis)
            .try_normalize()
            .unwrap_or(self.frame.cross_axis())
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawCone {
    frame: ConstraintFrame,
    use_cone_limit: bool,
    cone_angle: f32,
}

#[cfg(feature = "serde")]
impl TryFrom<RawCone> for ConeConstraint {
    type Error = IkError;

    fn try_from(raw: RawCone) -> Result<Self> {
        let mut cone = Self {
            frame: raw.frame,
            use_cone_limit: raw.use_cone_limit,
            ..Self::default()
        };
        cone.set_cone_angle(raw.cone_angle)?;
        Ok(cone)
    }
}
