use super::chain::BoneChain;
use super::joint::JointId;
use super::skeleton::Rig;
use crate::error::{IkError, Result};
use crate::math::from_to_rotation;
use glam::{Quat, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolveResult {
    pub converged: bool,
    /// Outer passes started, including the one that converged.
    pub iterations: u32,
    pub final_distance: f32,
    pub final_sqr_distance: f32,
}

impl SolveResult {
    fn new(converged: bool, iterations: u32, sqr_distance: f32) -> Self {
        Self {
            converged,
            iterations,
            final_distance: sqr_distance.sqrt(),
            final_sqr_distance: sqr_distance,
        }
    }
}

/// Solver tuning. Built with chained setters:
///
/// ```rust
/// use ccd_rig::SolverConfig;
///
/// let config = SolverConfig::default()
///     .weight(0.5)
///     .sqr_dist_error(1e-6)
///     .max_iterations(20);
/// assert_eq!(config.max_iterations, 20);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolverConfig {
    /// How far toward the goal the target sits, from `0` (stay) to `1` (goal).
    pub weight: f32,
    /// Squared effector-to-target distance that counts as converged.
    pub sqr_dist_error: f32,
    pub max_iterations: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            weight: 1.0,
            sqr_dist_error: 0.0001,
            max_iterations: 10,
        }
    }
}

fn clamp_weight(weight: f32) -> f32 {
    if weight.is_nan() {
        0.0
    } else {
        weight.clamp(0.0, 1.0)
    }
}

impl SolverConfig {
    pub fn weight(mut self, weight: f32) -> Self {
        let clamped = clamp_weight(weight);
        if clamped != weight {
            log::warn!("IK weight {weight} clamped to {clamped}");
        }
        self.weight = clamped;
        self
    }

    pub fn sqr_dist_error(mut self, sqr_dist_error: f32) -> Self {
        self.sqr_dist_error = sqr_dist_error.max(0.0);
        self
    }

    /// Weight and threshold as `solve` uses them. The fields are public, so
    /// values written directly are brought back into range here.
    pub fn effective(&self) -> Self {
        Self {
            weight: clamp_weight(self.weight),
            sqr_dist_error: self.sqr_dist_error.max(0.0),
            max_iterations: self.max_iterations,
        }
    }

    pub fn max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

/// Cyclic Coordinate Descent over a [`BoneChain`].
///
/// Each outer pass sweeps the chain repeatedly, widening by one bone per
/// sweep, so bones near the effector are rotated more often than bones near
/// the root:
///
/// ```text
/// bone[1], bone[2]
/// bone[1], bone[2], bone[3]
/// bone[1], bone[2], bone[3], bone[4]
/// ...
/// ```
#[derive(Debug, Clone)]
pub struct CcdSolver {
    chain: BoneChain,
    config: SolverConfig,
}

impl CcdSolver {
    pub fn new(chain: BoneChain, config: SolverConfig) -> Self {
        Self { chain, config }
    }

    /// Builds the chain from `effector` up to `root` and wraps it in a solver.
    pub fn for_rig<R: Rig + ?Sized>(
        rig: &R,
        effector: JointId,
        root: JointId,
        config: SolverConfig,
    ) -> Result<Self> {
        Ok(Self::new(BoneChain::build(rig, effector, root)?, config))
    }

    pub fn chain(&self) -> &BoneChain {
        &self.chain
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut SolverConfig {
        &mut self.config
    }

    /// Rotates the chain's joints in place to pull the effector toward `goal`.
    ///
    /// Running out of iterations is not an error; the chain is left in its
    /// best-effort pose and the result reports the remaining distance.
    ///
    /// A chain with joints `rig` does not contain is left untouched and
    /// reported as unconverged at infinite distance.
    pub fn solve<R: Rig + ?Sized>(&self, rig: &mut R, goal: Vec3) -> SolveResult {
        if let Some(missing) = self.chain.joints.iter().find(|&&j| !rig.contains(j)) {
            log::error!("{}", IkError::UnknownJoint(*missing));
            return SolveResult::new(false, 0, f32::INFINITY);
        }

        let config = self.config.effective();
        let effector = self.chain.effector();
        let target = rig.world_position(effector).lerp(goal, config.weight);
        let sqr_dist_error = config.sqr_dist_error;
        let n = self.chain.len();

        if n < 2 {
            let sqr_distance = rig.world_position(effector).distance_squared(target);
            return SolveResult::new(sqr_distance <= sqr_dist_error, 0, sqr_distance);
        }

        let sweeps = (n - 2).max(1);

        for iteration in 0..config.max_iterations {
            for i in 0..sweeps {
                for j in 1..=(i + 2).min(n - 1) {
                    Self::rotate_bone(rig, effector, self.chain.joints[j], target);

                    let sqr_distance = rig.world_position(effector).distance_squared(target);
                    if sqr_distance <= sqr_dist_error {
                        log::debug!(
                            "CCD converged after {} iteration(s), sqr distance {}",
                            iteration + 1,
                            sqr_distance
                        );
                        return SolveResult::new(true, iteration + 1, sqr_distance);
                    }
                }
            }
        }

        let sqr_distance = rig.world_position(effector).distance_squared(target);
        log::debug!(
            "CCD stopped after {} iteration(s) without converging, distance {}",
            config.max_iterations,
            sqr_distance.sqrt()
        );
        SolveResult::new(
            sqr_distance <= sqr_dist_error,
            config.max_iterations,
            sqr_distance,
        )
    }

    /// Turns `bone` so the direction from it to the effector points at
    /// `target`, then lets the bone's constraint limit the result.
    pub fn rotate_bone<R: Rig + ?Sized>(
        rig: &mut R,
        effector: JointId,
        bone: JointId,
        target: Vec3,
    ) {
        let bone_pos = rig.world_position(bone);
        let to_effector = rig.world_position(effector) - bone_pos;
        let to_target = target - bone_pos;

        // The arc is measured in the bone's already-rotated frame, so it goes
        // on the left.
        let arc = from_to_rotation(to_effector, to_target);
        let world_rotation = (arc * rig.world_rotation(bone)).normalize();

        let parent_rotation = rig
            .parent(bone)
            .map_or(Quat::IDENTITY, |parent| rig.world_rotation(parent));
        let candidate = (parent_rotation.inverse() * world_rotation).normalize();

        let previous = rig.local_rotation(bone);
        let limited = rig.constrain(bone, previous, candidate);
        log::trace!("rotate bone {bone}: {previous:?} -> {limited:?}");
        rig.set_local_rotation(bone, limited);
    }
}
