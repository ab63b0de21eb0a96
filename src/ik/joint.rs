use super::constraint::RotationConstraint;
use crate::math::Transform;
use glam::{Quat, Vec3};
use std::fmt;

/// Handle to a joint inside a [`Skeleton`](super::Skeleton).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JointId(pub(crate) usize);

impl JointId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for JointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Joint {
    pub name: String,
    pub(crate) parent: Option<JointId>,
    /// Offset and rotation relative to the parent joint.
    pub local: Transform,
    pub constraint: RotationConstraint,
}

impl Joint {
    pub fn new(name: impl Into<String>, parent: Option<JointId>, offset: Vec3) -> Self {
        Self {
            name: name.into(),
            parent,
            local: Transform::from_position(offset),
            constraint: RotationConstraint::None,
        }
    }

    pub fn parent(&self) -> Option<JointId> {
        self.parent
    }

    pub fn local_rotation(&self) -> Quat {
        self.local.rotation
    }

    /// Attaches `constraint`, capturing the current local rotation as its
    /// rest pose.
    pub fn set_constraint(&mut self, constraint: impl Into<RotationConstraint>) {
        let mut constraint = constraint.into();
        constraint.initialize(self.local.rotation);
        self.constraint = constraint;
    }

    pub fn clear_constraint(&mut self) {
        self.constraint = RotationConstraint::None;
    }

    /// Runs `candidate` through the attached constraint, treating the current
    /// local rotation as the previous one.
    pub fn apply_constraint(&mut self, candidate: Quat) -> Quat {
        self.constraint.apply(self.local.rotation, candidate)
    }
}
