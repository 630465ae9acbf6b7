//! Defines the evaluator trait and the shared kinematic types of the solver.

use nalgebra::{DMatrix, Isometry3, Vector3};

/// Pose of the end effector. It contains both Cartesian position and rotation
/// quaternion.
/// ```
/// extern crate nalgebra as na;
/// use na::{Isometry3, Translation3, UnitQuaternion};
///
/// type Pose = Isometry3<f64>;
///
/// let translation = Translation3::new(1.0, 0.0, 0.0);
/// // The quaternion should be normalized to represent a valid rotation.
/// let rotation = UnitQuaternion::from_quaternion(na::Quaternion::new(1.0, 0.0, 0.0, 1.0).normalize());
/// let transform = Pose::from_parts(translation, rotation);
/// ```
pub type Pose = Isometry3<f64>;

/// Joint values of an N degree of freedom chain, radians for rotational
/// joints and metres for prismatic ones.
pub type Joints = Vec<f64>;

/// What a joint physically does, before the limits are looked at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JointMotion {
    /// The joint rotates about its axis.
    Rotational,
    /// The joint slides along its axis.
    Translational,
}

/// Classification of a movable joint once its limits are taken into account.
///
/// A rotational joint whose limits are both zero, or reach past the float
/// sentinel (±`f32::MAX`), has no usable bounds and is `Continuous`. Robot
/// descriptions in the wild use either convention, so both are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JointKind {
    /// Rotational joint with finite limits.
    Revolute,
    /// Rotational joint without limits (full turns allowed).
    Continuous,
    /// Translational joint.
    Prismatic,
}

impl JointKind {
    /// Classifies a joint from its motion and its configured limits.
    pub fn classify(motion: JointMotion, lower: f64, upper: f64) -> JointKind {
        match motion {
            JointMotion::Translational => JointKind::Prismatic,
            JointMotion::Rotational => {
                let sentinel = f32::MAX as f64;
                if (lower == 0.0 && upper == 0.0) || (lower <= -sentinel && upper >= sentinel) {
                    JointKind::Continuous
                } else {
                    JointKind::Revolute
                }
            }
        }
    }
}

/// Six-component pose difference: linear x, y, z then angular x, y, z.
///
/// Doubles as the per-axis tolerance handed to the solver: an axis whose
/// tolerance reaches ±`f32::MAX` (or beyond) is treated as free and its error
/// contribution is ignored. This is how position-only solving is requested.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Twist {
    /// Linear components in metres.
    pub vel: Vector3<f64>,
    /// Angular components in radians.
    pub rot: Vector3<f64>,
}

impl Twist {
    pub fn new(vel: Vector3<f64>, rot: Vector3<f64>) -> Self {
        Twist { vel, rot }
    }

    /// Zero tolerance on every axis: the full pose must match within eps.
    pub fn zero() -> Self {
        Twist {
            vel: Vector3::zeros(),
            rot: Vector3::zeros(),
        }
    }

    /// The same tolerance on all linear axes and on all angular axes.
    pub fn uniform(linear: f64, angular: f64) -> Self {
        Twist {
            vel: Vector3::new(linear, linear, linear),
            rot: Vector3::new(angular, angular, angular),
        }
    }

    /// Position-only solving: all rotation axes are free.
    pub fn position_only(linear: f64) -> Self {
        Twist::uniform(linear, f64::INFINITY)
    }

    /// Component by index, 0..3 linear then 3..6 angular.
    pub fn component(&self, index: usize) -> f64 {
        match index {
            0..=2 => self.vel[index],
            3..=5 => self.rot[index - 3],
            _ => panic!("twist component index out of range: {}", index),
        }
    }

    /// True when the tolerance on this axis means "do not constrain it".
    pub fn is_free(tolerance: f64) -> bool {
        tolerance >= f32::MAX as f64
    }
}

/// Agreed functionality of a chain evaluator: how many joints move, what each
/// of them does, and the two evaluators the solvers need. Implementations
/// must be pure and reentrant; both racing workers call them concurrently.
pub trait Kinematics {
    /// Number of movable joints N.
    fn dof(&self) -> usize;

    /// Motion of the movable joint at `index` (0..N, fixed segments skipped).
    fn joint_motion(&self, index: usize) -> JointMotion;

    /// Find forward kinematics (pose from joint positions).
    fn forward(&self, qs: &[f64]) -> Pose;

    /// The 6×N Jacobian at `qs`, linear rows first.
    ///
    /// The provided implementation differentiates `forward` numerically;
    /// override it where an analytic Jacobian is available.
    fn jacobian(&self, qs: &[f64]) -> DMatrix<f64>
    where
        Self: Sized,
    {
        crate::jacobian::numeric_jacobian(self, qs, 1e-6)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_revolute() {
        assert_eq!(
            JointKind::classify(JointMotion::Rotational, -1.0, 1.0),
            JointKind::Revolute
        );
    }

    #[test]
    fn classify_continuous_by_zero_sentinel() {
        assert_eq!(
            JointKind::classify(JointMotion::Rotational, 0.0, 0.0),
            JointKind::Continuous
        );
    }

    #[test]
    fn classify_continuous_by_float_sentinel() {
        assert_eq!(
            JointKind::classify(JointMotion::Rotational, -f64::INFINITY, f64::INFINITY),
            JointKind::Continuous
        );
        assert_eq!(
            JointKind::classify(JointMotion::Rotational, -(f32::MAX as f64), f32::MAX as f64),
            JointKind::Continuous
        );
    }

    #[test]
    fn classify_prismatic_ignores_sentinels() {
        assert_eq!(
            JointKind::classify(JointMotion::Translational, 0.0, 0.0),
            JointKind::Prismatic
        );
    }

    #[test]
    fn twist_components_in_order() {
        let t = Twist::new(Vector3::new(1.0, 2.0, 3.0), Vector3::new(4.0, 5.0, 6.0));
        for i in 0..6 {
            assert_eq!(t.component(i), (i + 1) as f64);
        }
    }

    #[test]
    fn position_only_frees_rotation() {
        let t = Twist::position_only(1e-4);
        assert!(!Twist::is_free(t.component(0)));
        assert!(Twist::is_free(t.component(3)));
        assert!(Twist::is_free(t.component(5)));
    }
}
