//! Per-joint rotation limits.
//!
//! A joint carries at most one [`RotationConstraint`]. The hinge and cone
//! variants measure everything relative to the joint's default local rotation
//! through a shared [`ConstraintFrame`]; the legacy [`AngleConstraint`] works
//! incrementally from the previous local rotation instead.

mod angle;
mod cone;
mod hinge;

pub use angle::AngleConstraint;
pub use cone::ConeConstraint;
pub use hinge::HingeConstraint;

use crate::error::{IkError, Result};
use crate::math::{axis_angle, normalize_angle, perpendicular_axis, signed_angle};
use glam::{Quat, Vec3};

const SAME_ROTATION_EPSILON: f32 = 1e-6;

pub(crate) fn reject<T>(err: IkError) -> Result<T> {
    log::error!("{err}");
    Err(err)
}

/// Limit values already inside `[-180, 180]` are kept as authored so that
/// `180` stays usable as an upper bound.
fn wrap_limit(degrees: f32) -> Result<f32> {
    if !degrees.is_finite() {
        return reject(IkError::NonFiniteAngle(degrees));
    }
    if (-180.0..=180.0).contains(&degrees) {
        Ok(degrees)
    } else {
        Ok(normalize_angle(degrees))
    }
}

/// Axis, reference direction, rest pose and twist range shared by the hinge
/// and cone constraints. All vectors are in the joint's local space.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "RawFrame")
)]
pub struct ConstraintFrame {
    rotation_axis: Vec3,
    cross_axis: Vec3,
    default_local_rotation: Quat,
    use_angle_limits: bool,
    min_angle: f32,
    max_angle: f32,
}

impl Default for ConstraintFrame {
    fn default() -> Self {
        Self {
            rotation_axis: Vec3::Z,
            cross_axis: perpendicular_axis(Vec3::Z),
            default_local_rotation: Quat::IDENTITY,
            use_angle_limits: true,
            min_angle: -90.0,
            max_angle: 90.0,
        }
    }
}

impl ConstraintFrame {
    pub fn new(rotation_axis: Vec3) -> Result<Self> {
        let mut frame = Self::default();
        frame.set_rotation_axis(rotation_axis)?;
        Ok(frame)
    }

    pub fn rotation_axis(&self) -> Vec3 {
        self.rotation_axis
    }

    /// Sets the constrained axis and re-derives the zero-angle cross axis.
    pub fn set_rotation_axis(&mut self, axis: Vec3) -> Result<()> {
        let Some(axis) = axis.try_normalize() else {
            return reject(IkError::DegenerateAxis);
        };
        self.rotation_axis = axis;
        self.cross_axis = perpendicular_axis(axis);
        Ok(())
    }

    /// Direction perpendicular to the rotation axis where `0` degrees starts.
    pub fn cross_axis(&self) -> Vec3 {
        self.cross_axis
    }

    pub fn default_local_rotation(&self) -> Quat {
        self.default_local_rotation
    }

    pub fn set_default_local_rotation(&mut self, rotation: Quat) {
        self.default_local_rotation = rotation.normalize();
    }

    pub fn use_angle_limits(&self) -> bool {
        self.use_angle_limits
    }

    pub fn set_use_angle_limits(&mut self, enabled: bool) {
        self.use_angle_limits = enabled;
    }

    pub fn min_angle(&self) -> f32 {
        self.min_angle
    }

    pub fn max_angle(&self) -> f32 {
        self.max_angle
    }

    pub fn set_min_angle(&mut self, degrees: f32) -> Result<()> {
        let min = wrap_limit(degrees)?;
        if min > self.max_angle {
            return reject(IkError::MinAngleAboveMax {
                min,
                max: self.max_angle,
            });
        }
        self.min_angle = min;
        Ok(())
    }

    pub fn set_max_angle(&mut self, degrees: f32) -> Result<()> {
        let max = wrap_limit(degrees)?;
        if max < self.min_angle {
            return reject(IkError::MaxAngleBelowMin {
                min: self.min_angle,
                max,
            });
        }
        self.max_angle = max;
        Ok(())
    }

    /// Replaces both limits at once; on rejection neither changes.
    pub fn set_limits(&mut self, min_degrees: f32, max_degrees: f32) -> Result<()> {
        let min = wrap_limit(min_degrees)?;
        let max = wrap_limit(max_degrees)?;
        if min > max {
            return reject(IkError::MinAngleAboveMax { min, max });
        }
        self.min_angle = min;
        self.max_angle = max;
        Ok(())
    }

    /// Rotation relative to the rest pose: `inverse(default) * candidate`.
    pub fn delta(&self, local_rotation: Quat) -> Quat {
        self.default_local_rotation.inverse() * local_rotation
    }

    /// Maps a limited delta back into a local rotation.
    pub fn compose(&self, delta: Quat) -> Quat {
        (self.default_local_rotation * delta).normalize()
    }

    /// Signed angle of a twist about the rotation axis, in degrees.
    pub fn twist_angle(&self, twist: Quat) -> f32 {
        signed_angle(self.cross_axis, twist * self.cross_axis, self.rotation_axis)
    }

    /// Clamps a twist into `[min_angle, max_angle]` and rebuilds it as a pure
    /// rotation about the axis.
    pub fn clamp_twist(&self, twist: Quat) -> Quat {
        let angle = self
            .twist_angle(twist)
            .clamp(self.min_angle, self.max_angle);
        axis_angle(self.rotation_axis, angle)
    }
}

/// Serialized form of [`ConstraintFrame`]. The cross axis is not read back;
/// it is always derived from the rotation axis.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawFrame {
    rotation_axis: Vec3,
    default_local_rotation: Quat,
    use_angle_limits: bool,
    min_angle: f32,
    max_angle: f32,
}

#[cfg(feature = "serde")]
impl TryFrom<RawFrame> for ConstraintFrame {
    type Error = IkError;

    fn try_from(raw: RawFrame) -> Result<Self> {
        let rest = raw.default_local_rotation;
        if !rest.is_finite() || rest.length_squared() < 1e-12 {
            return reject(IkError::DegenerateRotation);
        }

        let mut frame = Self::new(raw.rotation_axis)?;
        frame.set_limits(raw.min_angle, raw.max_angle)?;
        frame.set_use_angle_limits(raw.use_angle_limits);
        frame.set_default_local_rotation(rest);
        Ok(frame)
    }
}

/// The constraint attached to a joint, dispatched by variant.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RotationConstraint {
    #[default]
    None,
    Hinge(HingeConstraint),
    Cone(ConeConstraint),
    Angle(AngleConstraint),
}

impl RotationConstraint {
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Limits `candidate`, the joint's proposed local rotation.
    ///
    /// `previous` is the local rotation the joint held before the candidate
    /// was proposed; only the legacy [`AngleConstraint`] reads it.
    pub fn apply(&mut self, previous: Quat, candidate: Quat) -> Quat {
        match self {
            Self::None => candidate,
            Self::Hinge(hinge) => hinge.apply(candidate),
            Self::Cone(cone) => cone.apply(candidate),
            Self::Angle(angle) => angle.apply(previous, candidate),
        }
    }

    /// Like [`apply`](Self::apply), also reporting whether the rotation was
    /// altered. `q` and `-q` count as the same rotation.
    pub fn apply_with_change(&mut self, previous: Quat, candidate: Quat) -> (Quat, bool) {
        let limited = self.apply(previous, candidate);
        let changed = limited.dot(candidate).abs() < 1.0 - SAME_ROTATION_EPSILON;
        (limited, changed)
    }

    /// Captures `local_rotation` as the rest pose limits are measured from.
    pub fn initialize(&mut self, local_rotation: Quat) {
        if let Some(frame) = self.frame_mut() {
            frame.set_default_local_rotation(local_rotation);
        }
    }

    pub fn default_local_rotation(&self) -> Option<Quat> {
        self.frame().map(ConstraintFrame::default_local_rotation)
    }

    pub fn set_default_local_rotation(&mut self, rotation: Quat) {
        self.initialize(rotation);
    }

    pub fn frame(&self) -> Option<&ConstraintFrame> {
        match self {
            Self::Hinge(hinge) => Some(hinge.frame()),
            Self::Cone(cone) => Some(cone.frame()),
            Self::None | Self::Angle(_) => None,
        }
    }

    pub fn frame_mut(&mut self) -> Option<&mut ConstraintFrame> {
        match self {
            Self::Hinge(hinge) => Some(hinge.frame_mut()),
            Self::Cone(cone) => Some(cone.frame_mut()),
            Self::None | Self::Angle(_) => None,
        }
    }
}

impl From<HingeConstraint> for RotationConstraint {
    fn from(hinge: HingeConstraint) -> Self {
        Self::Hinge(hinge)
    }
}

impl From<ConeConstraint> for RotationConstraint {
    fn from(cone: ConeConstraint) -> Self {
        Self::Cone(cone)
    }
}

impl From<AngleConstraint> for RotationConstraint {
    fn from(angle: AngleConstraint) -> Self {
        Self::Angle(angle)
    }
}
