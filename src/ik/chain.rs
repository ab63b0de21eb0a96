use super::joint::JointId;
use super::skeleton::Rig;
use crate::error::{IkError, Result};
use glam::Vec3;

/// Upper bound on parent hops while walking a chain. Guards hosts whose
/// hierarchy is not acyclic.
pub const MAX_CHAIN_LENGTH: usize = 1024;

/// Ordered ancestor path from an effector up to a root joint.
///
/// Index `0` is the effector, the last index is the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoneChain {
    pub(crate) joints: Vec<JointId>,
}

impl BoneChain {
    /// Walks parent links from `effector` until `root` is reached.
    ///
    /// Fails if `root` is not an ancestor of (or equal to) `effector`.
    pub fn build<R: Rig + ?Sized>(rig: &R, effector: JointId, root: JointId) -> Result<Self> {
        for id in [effector, root] {
            if !rig.contains(id) {
                return Err(IkError::UnknownJoint(id));
            }
        }

        let mut joints = Vec::new();
        let mut current = Some(effector);

        while let Some(joint) = current {
            if joints.len() == MAX_CHAIN_LENGTH {
                return Err(IkError::ChainTooDeep {
                    limit: MAX_CHAIN_LENGTH,
                });
            }
            joints.push(joint);

            if joint == root {
                log::debug!(
                    "built bone chain {} -> {} with {} joints",
                    effector,
                    root,
                    joints.len()
                );
                return Ok(Self { joints });
            }

            current = rig.parent(joint);
        }

        Err(IkError::RootNotAncestor { root, effector })
    }

    pub fn joints(&self) -> &[JointId] {
        &self.joints
    }

    pub fn effector(&self) -> JointId {
        self.joints[0]
    }

    pub fn root(&self) -> JointId {
        self.joints[self.joints.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    /// Always false: a chain holds at least its effector.
    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    /// Sum of the distances between consecutive joints in the current pose.
    pub fn total_length<R: Rig + ?Sized>(&self, rig: &R) -> f32 {
        self.joints
            .windows(2)
            .map(|w| rig.world_position(w[0]).distance(rig.world_position(w[1])))
            .sum()
    }

    pub fn positions<'a, R: Rig + ?Sized>(&'a self, rig: &'a R) -> impl Iterator<Item = Vec3> + 'a {
        self.joints.iter().map(move |&j| rig.world_position(j))
    }
}
