use ccd_rig::{
    CcdSolver, ConeConstraint, HingeConstraint, IkError, JointId, Rig, Skeleton, SolverConfig,
};
use glam::Vec3;

/// Goals the hand is walked through, in order.
const WAYPOINTS: [Vec3; 5] = [
    Vec3::new(1.2, 1.4, 0.0),
    Vec3::new(0.8, 2.0, 0.6),
    Vec3::new(-0.6, 1.6, 0.9),
    Vec3::new(-1.4, 0.6, 0.0),
    Vec3::new(4.0, 4.0, 0.0),
];

struct App {
    skeleton: Skeleton,
    solver: CcdSolver,
    hand: JointId,
}

impl App {
    fn new() -> Result<Self, IkError> {
        let mut skeleton = Skeleton::new();
        let shoulder = skeleton.add_joint("shoulder", None, Vec3::ZERO)?;
        let elbow = skeleton.add_joint("elbow", Some(shoulder), Vec3::new(0.0, 1.0, 0.0))?;
        let wrist = skeleton.add_joint("wrist", Some(elbow), Vec3::new(0.0, 0.9, 0.0))?;
        let hand = skeleton.add_joint("hand", Some(wrist), Vec3::new(0.0, 0.3, 0.0))?;

        skeleton.set_constraint(
            shoulder,
            ConeConstraint::new(Vec3::Y)?
                .with_cone_angle(75.0)?
                .with_twist_limits(-45.0, 45.0)?,
        )?;
        skeleton.set_constraint(elbow, HingeConstraint::new(Vec3::Z)?.with_limits(-150.0, 0.0)?)?;
        skeleton.set_constraint(wrist, ConeConstraint::new(Vec3::Y)?.with_cone_angle(40.0)?)?;

        let config = SolverConfig::default().sqr_dist_error(1e-5).max_iterations(20);
        let solver = CcdSolver::for_rig(&skeleton, hand, shoulder, config)?;
        log::info!(
            "Arm ready: {} joints, reach {:.2}",
            solver.chain().len(),
            solver.chain().total_length(&skeleton)
        );

        Ok(Self {
            skeleton,
            solver,
            hand,
        })
    }

    fn step(&mut self, goal: Vec3) {
        let result = self.solver.solve(&mut self.skeleton, goal);
        let hand = self.skeleton.world_position(self.hand);

        if result.converged {
            log::info!(
                "Goal {:?}: reached in {} iteration(s), hand at {:?}",
                goal,
                result.iterations,
                hand
            );
        } else {
            log::warn!(
                "Goal {:?}: stopped {:.3} short after {} iteration(s), hand at {:?}",
                goal,
                result.final_distance,
                result.iterations,
                hand
            );
        }

        let chain = self.solver.chain();
        for (id, position) in chain.joints().iter().zip(chain.positions(&self.skeleton)) {
            if let Some(joint) = self.skeleton.joint(*id) {
                log::debug!("  {:<8} {:?}", joint.name, position);
            }
        }
    }
}

fn main() -> Result<(), IkError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut app = App::new()?;
    for goal in WAYPOINTS {
        app.step(goal);
    }

    let corrected = app.skeleton.apply_constraints();
    log::info!("Constraint pass corrected {} joint(s)", corrected);
    Ok(())
}
