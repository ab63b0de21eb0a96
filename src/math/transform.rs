use glam::{Quat, Vec3};

/// Rigid transform of a joint relative to its parent (or to world space for a
/// root joint).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Composes `self` (parent) with `child`, expressed in the parent's frame.
    pub fn mul_transform(&self, child: &Self) -> Self {
        Self {
            position: self.transform_point(child.position),
            rotation: (self.rotation * child.rotation).normalize(),
        }
    }

    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.rotation * point + self.position
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn composes_parent_rotation_into_child_offset() {
        let parent = Transform::from_position_rotation(
            Vec3::new(1.0, 0.0, 0.0),
            Quat::from_rotation_z(FRAC_PI_2),
        );
        let child = Transform::from_position(Vec3::Y);

        let world = parent.mul_transform(&child);

        assert!(world.position.abs_diff_eq(Vec3::new(0.0, 0.0, 0.0), 1e-6));
        assert!(world.rotation.abs_diff_eq(parent.rotation, 1e-6));
        assert!((world.rotation * Vec3::Y).abs_diff_eq(Vec3::NEG_X, 1e-6));
    }

    #[test]
    fn composition_matches_applying_points_in_turn() {
        let parent = Transform::from_position_rotation(Vec3::ONE, Quat::from_rotation_x(0.7));
        let child =
            Transform::from_position_rotation(Vec3::new(0.0, 2.0, 0.0), Quat::from_rotation_y(-0.4));
        let point = Vec3::new(0.3, -0.2, 0.9);

        let world = parent.mul_transform(&child);

        assert!(world
            .transform_point(point)
            .abs_diff_eq(parent.transform_point(child.transform_point(point)), 1e-5));
        assert!(world.rotation.is_normalized());
    }
}
