use super::constraint::RotationConstraint;
use super::joint::{Joint, JointId};
use crate::error::{IkError, Result};
use crate::math::Transform;
use glam::{Quat, Vec3};

/// Host-side joint hierarchy the solver and chain builder operate on.
///
/// Implementations own the joints; the IK core only reads positions and
/// parent links, and reads/writes local rotations.
pub trait Rig {
    fn contains(&self, joint: JointId) -> bool;

    fn parent(&self, joint: JointId) -> Option<JointId>;

    fn world_position(&self, joint: JointId) -> Vec3;

    fn world_rotation(&self, joint: JointId) -> Quat;

    fn local_rotation(&self, joint: JointId) -> Quat;

    fn set_local_rotation(&mut self, joint: JointId, rotation: Quat);

    /// Limits a candidate local rotation for `joint`. Hosts without
    /// constraints accept every candidate.
    fn constrain(&mut self, _joint: JointId, _previous: Quat, candidate: Quat) -> Quat {
        candidate
    }
}

/// Arena of joints addressed by [`JointId`].
///
/// Parents are always inserted before their children, so the hierarchy is a
/// forest by construction. Deserialized skeletons are held to the same rule.
#[derive(Debug, Clone, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "RawSkeleton")
)]
pub struct Skeleton {
    joints: Vec<Joint>,
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawSkeleton {
    joints: Vec<Joint>,
}

#[cfg(feature = "serde")]
impl TryFrom<RawSkeleton> for Skeleton {
    type Error = IkError;

    fn try_from(raw: RawSkeleton) -> Result<Self> {
        for (index, joint) in raw.joints.iter().enumerate() {
            if let Some(parent) = joint.parent {
                if parent.0 >= index {
                    log::error!("joint {} listed before its parent {}", JointId(index), parent);
                    return Err(IkError::UnknownJoint(parent));
                }
            }
            let rotation = joint.local.rotation;
            if !rotation.is_finite() || rotation.length_squared() < 1e-12 {
                return Err(IkError::DegenerateRotation);
            }
        }
        Ok(Self { joints: raw.joints })
    }
}

impl Skeleton {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> SkeletonBuilder {
        SkeletonBuilder::new()
    }

    pub fn add_joint(
        &mut self,
        name: impl Into<String>,
        parent: Option<JointId>,
        offset: Vec3,
    ) -> Result<JointId> {
        self.add_joint_with_transform(name, parent, Transform::from_position(offset))
    }

    pub fn add_joint_with_transform(
        &mut self,
        name: impl Into<String>,
        parent: Option<JointId>,
        local: Transform,
    ) -> Result<JointId> {
        if let Some(parent) = parent {
            if !self.contains(parent) {
                return Err(IkError::UnknownJoint(parent));
            }
        }
        let id = JointId(self.joints.len());
        let mut joint = Joint::new(name, parent, local.position);
        joint.local.rotation = local.rotation.normalize();
        self.joints.push(joint);
        Ok(id)
    }

    pub fn joint(&self, id: JointId) -> Option<&Joint> {
        self.joints.get(id.0)
    }

    pub fn joint_mut(&mut self, id: JointId) -> Option<&mut Joint> {
        self.joints.get_mut(id.0)
    }

    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    pub fn ids(&self) -> impl Iterator<Item = JointId> {
        (0..self.joints.len()).map(JointId)
    }

    pub fn find(&self, name: &str) -> Option<JointId> {
        self.joints.iter().position(|j| j.name == name).map(JointId)
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    /// Composes local transforms from the root down to `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this skeleton. The [`Rig`] methods
    /// share this behavior; check with [`Rig::contains`] first.
    pub fn world_transform(&self, id: JointId) -> Transform {
        let mut path = vec![id];
        let mut current = self.joints[id.0].parent;
        while let Some(parent) = current {
            path.push(parent);
            current = self.joints[parent.0].parent;
        }

        path.iter()
            .rev()
            .fold(Transform::IDENTITY, |world, id| {
                world.mul_transform(&self.joints[id.0].local)
            })
    }

    /// Attaches `constraint` to `id` and captures the joint's current local
    /// rotation as its rest pose.
    pub fn set_constraint(
        &mut self,
        id: JointId,
        constraint: impl Into<RotationConstraint>,
    ) -> Result<()> {
        let joint = self.joint_mut(id).ok_or(IkError::UnknownJoint(id))?;
        joint.set_constraint(constraint);
        Ok(())
    }

    pub fn clear_constraint(&mut self, id: JointId) -> Result<()> {
        let joint = self.joint_mut(id).ok_or(IkError::UnknownJoint(id))?;
        joint.clear_constraint();
        Ok(())
    }

    /// Re-applies every attached constraint to its joint's current local
    /// rotation and returns how many joints were changed.
    ///
    /// Legacy angle constraints see no step here and keep their pose.
    pub fn apply_constraints(&mut self) -> usize {
        let mut changed_count = 0;
        for joint in &mut self.joints {
            if joint.constraint.is_none() {
                continue;
            }
            let current = joint.local.rotation;
            let (limited, changed) = joint.constraint.apply_with_change(current, current);
            if changed {
                joint.local.rotation = limited;
                changed_count += 1;
            }
        }
        changed_count
    }

    /// Local rotations of every joint, in id order.
    pub fn pose(&self) -> Vec<Quat> {
        self.joints.iter().map(|j| j.local.rotation).collect()
    }

    /// Restores local rotations captured by [`pose`](Self::pose). Extra
    /// entries are ignored.
    pub fn set_pose(&mut self, pose: &[Quat]) {
        for (joint, rotation) in self.joints.iter_mut().zip(pose) {
            joint.local.rotation = *rotation;
        }
    }
}

/// Every method except `contains` panics on a joint from another skeleton.
impl Rig for Skeleton {
    fn contains(&self, joint: JointId) -> bool {
        joint.0 < self.joints.len()
    }

    fn parent(&self, joint: JointId) -> Option<JointId> {
        self.joints[joint.0].parent
    }

    fn world_position(&self, joint: JointId) -> Vec3 {
        self.world_transform(joint).position
    }

    fn world_rotation(&self, joint: JointId) -> Quat {
        self.world_transform(joint).rotation
    }

    fn local_rotation(&self, joint: JointId) -> Quat {
        self.joints[joint.0].local.rotation
    }

    fn set_local_rotation(&mut self, joint: JointId, rotation: Quat) {
        self.joints[joint.0].local.rotation = rotation.normalize();
    }

    fn constrain(&mut self, joint: JointId, previous: Quat, candidate: Quat) -> Quat {
        self.joints[joint.0].constraint.apply(previous, candidate)
    }
}

/// Builds a single linear chain from world positions, base first, with every
/// joint parented to the one before it.
pub struct SkeletonBuilder {
    joints: Vec<(Vec3, RotationConstraint)>,
}

impl SkeletonBuilder {
    pub fn new() -> Self {
        Self { joints: Vec::new() }
    }

    pub fn add_joint(mut self, position: Vec3) -> Self {
        self.joints.push((position, RotationConstraint::None));
        self
    }

    pub fn add_joint_with_constraint(
        mut self,
        position: Vec3,
        constraint: impl Into<RotationConstraint>,
    ) -> Self {
        self.joints.push((position, constraint.into()));
        self
    }

    pub fn build(self) -> Skeleton {
        let mut skeleton = Skeleton::new();
        let mut previous: Option<(JointId, Vec3)> = None;

        for (index, (position, constraint)) in self.joints.into_iter().enumerate() {
            let (parent, offset) = match previous {
                Some((parent, parent_pos)) => (Some(parent), position - parent_pos),
                None => (None, position),
            };
            let id = JointId(skeleton.joints.len());
            let mut joint = Joint::new(format!("joint_{index}"), parent, offset);
            joint.set_constraint(constraint);
            skeleton.joints.push(joint);
            previous = Some((id, position));
        }

        skeleton
    }
}

impl Default for SkeletonBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ik::HingeConstraint;
    use std::f32::consts::FRAC_PI_2;

    fn arm() -> (Skeleton, JointId, JointId, JointId) {
        let mut skeleton = Skeleton::new();
        let shoulder = skeleton.add_joint("shoulder", None, Vec3::ZERO).unwrap();
        let elbow = skeleton.add_joint("elbow", Some(shoulder), Vec3::Y).unwrap();
        let wrist = skeleton.add_joint("wrist", Some(elbow), Vec3::Y).unwrap();
        (skeleton, shoulder, elbow, wrist)
    }

    #[test]
    fn world_position_follows_parent_rotation() {
        let (mut skeleton, shoulder, _, wrist) = arm();
        assert!(skeleton.world_position(wrist).abs_diff_eq(Vec3::new(0.0, 2.0, 0.0), 1e-6));

        skeleton.set_local_rotation(shoulder, Quat::from_rotation_z(-FRAC_PI_2));

        assert!(skeleton.world_position(wrist).abs_diff_eq(Vec3::new(2.0, 0.0, 0.0), 1e-5));
        assert!(skeleton
            .world_rotation(wrist)
            .abs_diff_eq(Quat::from_rotation_z(-FRAC_PI_2), 1e-6));
    }

    #[test]
    fn unknown_parent_is_rejected() {
        let mut skeleton = Skeleton::new();
        let ghost = JointId(3);

        assert_eq!(
            skeleton.add_joint("orphan", Some(ghost), Vec3::X),
            Err(IkError::UnknownJoint(ghost))
        );
        assert!(skeleton.is_empty());
    }

    #[test]
    fn find_by_name() {
        let (skeleton, _, elbow, _) = arm();
        assert_eq!(skeleton.find("elbow"), Some(elbow));
        assert_eq!(skeleton.find("knee"), None);
        assert_eq!(skeleton.len(), 3);
    }

    #[test]
    fn apply_constraints_counts_changed_joints() {
        let (mut skeleton, _, elbow, _) = arm();
        skeleton
            .set_constraint(elbow, HingeConstraint::new(Vec3::Z).unwrap().with_limits(-30.0, 30.0).unwrap())
            .unwrap();

        assert_eq!(skeleton.apply_constraints(), 0);

        skeleton.set_local_rotation(elbow, Quat::from_rotation_z(1.2));
        assert_eq!(skeleton.apply_constraints(), 1);

        let hinge = match &skeleton.joint(elbow).unwrap().constraint {
            RotationConstraint::Hinge(hinge) => *hinge,
            other => panic!("unexpected constraint {other:?}"),
        };
        approx::assert_relative_eq!(hinge.angle(skeleton.local_rotation(elbow)), 30.0, epsilon = 1e-3);
    }

    #[test]
    fn builder_makes_linear_chain() {
        let skeleton = Skeleton::builder()
            .add_joint(Vec3::new(1.0, 0.0, 0.0))
            .add_joint_with_constraint(Vec3::new(1.0, 1.0, 0.0), HingeConstraint::new(Vec3::Z).unwrap())
            .add_joint(Vec3::new(1.0, 3.0, 0.0))
            .build();

        let ids = skeleton.ids().collect::<Vec<_>>();
        assert_eq!(skeleton.parent(ids[0]), None);
        assert_eq!(skeleton.parent(ids[2]), Some(ids[1]));
        assert!(skeleton.world_position(ids[2]).abs_diff_eq(Vec3::new(1.0, 3.0, 0.0), 1e-6));
        assert!(!skeleton.joint(ids[1]).unwrap().constraint.is_none());
    }

    #[test]
    fn pose_round_trips_through_set_pose() {
        let (mut skeleton, shoulder, _, _) = arm();
        let rest = skeleton.pose();

        skeleton.set_local_rotation(shoulder, Quat::from_rotation_x(0.4));
        skeleton.set_pose(&rest);

        assert_eq!(skeleton.local_rotation(shoulder), Quat::IDENTITY);
    }

    #[test]
    fn joint_with_rest_rotation_orients_its_children() {
        let mut skeleton = Skeleton::new();
        let base = skeleton
            .add_joint_with_transform(
                "base",
                None,
                Transform::from_position_rotation(Vec3::X, Quat::from_rotation_z(FRAC_PI_2)),
            )
            .unwrap();
        let tip = skeleton.add_joint("tip", Some(base), Vec3::Y).unwrap();

        assert!(skeleton.world_position(tip).abs_diff_eq(Vec3::ZERO, 1e-6));
    }

    #[test]
    #[should_panic]
    fn foreign_joint_panics() {
        let (skeleton, _, _, _) = arm();
        skeleton.world_transform(JointId(3));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn skeleton_reloads_only_with_parents_first() {
        let (skeleton, _, elbow, wrist) = arm();
        let json = serde_json::to_string(&skeleton).unwrap();
        let loaded: Skeleton = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.parent(wrist), Some(elbow));
        assert!(loaded.world_position(wrist).abs_diff_eq(Vec3::new(0.0, 2.0, 0.0), 1e-6));

        let mut value: serde_json::Value = serde_json::from_str(&json).unwrap();
        value["joints"][0]["parent"] = serde_json::json!(1);
        let cyclic = value.to_string();
        assert!(serde_json::from_str::<Skeleton>(&cyclic).is_err());

        value["joints"][0]["parent"] = serde_json::json!(9);
        assert!(serde_json::from_str::<Skeleton>(&value.to_string()).is_err());
    }
}
