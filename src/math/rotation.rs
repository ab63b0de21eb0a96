//! Quaternion and vector helpers shared by the constraints and the solver.
//!
//! Angles crossing this module's public boundary are in degrees, matching how
//! joint limits are authored. Every helper tolerates zero-length input and
//! falls back to a deterministic result instead of producing NaN.

use glam::{Quat, Vec3};

const EPSILON_SQ: f32 = 1e-12;

/// Wraps an angle in degrees into `[-180, 180)`.
///
/// `180` maps to `-180`.
pub fn normalize_angle(degrees: f32) -> f32 {
    let mut wrapped = (degrees + 180.0).rem_euclid(360.0);
    if wrapped >= 360.0 {
        wrapped -= 360.0;
    }
    wrapped - 180.0
}

/// Pure rotation of `degrees` about `axis` (expected unit length).
pub fn axis_angle(axis: Vec3, degrees: f32) -> Quat {
    Quat::from_axis_angle(axis, degrees.to_radians())
}

/// Minimal-arc rotation taking the direction of `from` onto the direction of
/// `to`.
///
/// Anti-parallel inputs rotate half a turn about an arbitrary axis orthogonal
/// to `from`; a zero-length input yields the identity.
pub fn from_to_rotation(from: Vec3, to: Vec3) -> Quat {
    let from = from.normalize_or_zero();
    let to = to.normalize_or_zero();
    if from == Vec3::ZERO || to == Vec3::ZERO {
        return Quat::IDENTITY;
    }
    Quat::from_rotation_arc(from, to)
}

/// Splits `rotation` into `(swing, twist)` with `rotation == swing * twist`.
///
/// `twist` is a pure rotation about `axis`; `swing` carries `axis` onto
/// `rotation * axis` without spinning about it.
pub fn swing_twist(rotation: Quat, axis: Vec3) -> (Quat, Quat) {
    let swing = from_to_rotation(axis, rotation * axis);
    let twist = swing.inverse() * rotation;
    (swing, twist)
}

/// Component of `v` lying in the plane whose normal is `normal`.
pub fn project_on_plane(v: Vec3, normal: Vec3) -> Vec3 {
    let normal = normal.normalize_or_zero();
    v - normal * v.dot(normal)
}

/// Unsigned angle between two directions in degrees, `0` if either is zero.
pub fn angle_between(a: Vec3, b: Vec3) -> f32 {
    if a.length_squared() < EPSILON_SQ || b.length_squared() < EPSILON_SQ {
        return 0.0;
    }
    a.cross(b).length().atan2(a.dot(b)).to_degrees()
}

/// Angle from `from` to `to` in degrees, signed by the right-hand rule about
/// `axis`. The result lies in `[-180, 180]`.
pub fn signed_angle(from: Vec3, to: Vec3, axis: Vec3) -> f32 {
    let unsigned = angle_between(from, to);
    if axis.dot(from.cross(to)) < 0.0 {
        -unsigned
    } else {
        unsigned
    }
}

/// Deterministic unit vector perpendicular to `axis`.
///
/// Seeds with the component-rotated copy `(z, x, y)` of the axis (or `Y` when
/// that copy coincides with the axis) and crosses it with the axis.
pub fn perpendicular_axis(axis: Vec3) -> Vec3 {
    let mut seed = Vec3::new(axis.z, axis.x, axis.y);
    if seed.abs_diff_eq(axis, 1e-5) {
        seed = Vec3::Y;
    }
    seed.cross(axis)
        .try_normalize()
        .unwrap_or_else(|| axis.any_orthonormal_vector())
}
