//! Numeric Jacobian of a chain evaluator.

use crate::kinematic_traits::Kinematics;
use nalgebra::DMatrix;

/// Computes the 6×N Jacobian of `robot.forward` at `joints` by one-sided
/// numerical differentiation with the disturbance `epsilon`.
///
/// Each column corresponds to a joint; the first three rows are the linear
/// velocity of the end effector, the last three the angular velocity.
pub fn numeric_jacobian(robot: &impl Kinematics, joints: &[f64], epsilon: f64) -> DMatrix<f64> {
    let n = joints.len();
    let mut jacobian = DMatrix::zeros(6, n);

    let current_pose = robot.forward(joints);
    let current_position = current_pose.translation.vector;
    let current_orientation = current_pose.rotation;

    for i in 0..n {
        let mut perturbed_qs = joints.to_vec();
        perturbed_qs[i] += epsilon;
        let perturbed_pose = robot.forward(&perturbed_qs);

        let delta_position = (perturbed_pose.translation.vector - current_position) / epsilon;
        let delta_orientation =
            (perturbed_pose.rotation * current_orientation.inverse()).scaled_axis() / epsilon;

        jacobian.fixed_view_mut::<3, 1>(0, i).copy_from(&delta_position);
        jacobian.fixed_view_mut::<3, 1>(3, i).copy_from(&delta_orientation);
    }

    jacobian
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinematic_traits::{JointMotion, Pose};
    use nalgebra::{Isometry3, Translation3, UnitQuaternion};

    const EPSILON: f64 = 1e-6;

    /// Example evaluator with a single rotary joint carrying a unit link.
    /// When the joint rotates from zero, it moves the Y-position and the
    /// Z-orientation of the end effector, both with derivative 1.
    struct SingleRotaryJointRobot;

    impl Kinematics for SingleRotaryJointRobot {
        fn dof(&self) -> usize {
            1
        }

        fn joint_motion(&self, _index: usize) -> JointMotion {
            JointMotion::Rotational
        }

        fn forward(&self, qs: &[f64]) -> Pose {
            let angle = qs[0];
            let rotation = UnitQuaternion::from_euler_angles(0.0, 0.0, angle);
            let translation = Translation3::new(angle.cos(), angle.sin(), 0.0);
            Isometry3::from_parts(translation, rotation)
        }
    }

    #[test]
    fn jacobian_of_single_rotary_joint() {
        let robot = SingleRotaryJointRobot;
        let jacobian = numeric_jacobian(&robot, &[0.0], EPSILON);

        assert_eq!(jacobian.nrows(), 6);
        assert_eq!(jacobian.ncols(), 1);

        let expected = [0.0, 1.0, 0.0, 0.0, 0.0, 1.0];
        for (row, want) in expected.iter().enumerate() {
            assert!(
                (jacobian[(row, 0)] - want).abs() < 1e-4,
                "row {}: {} is not approximately {}",
                row,
                jacobian[(row, 0)],
                want
            );
        }
    }

    #[test]
    fn default_trait_jacobian_matches_free_function() {
        let robot = SingleRotaryJointRobot;
        let direct = numeric_jacobian(&robot, &[0.4], EPSILON);
        let via_trait = robot.jacobian(&[0.4]);
        for row in 0..6 {
            assert!((direct[(row, 0)] - via_trait[(row, 0)]).abs() < 1e-9);
        }
    }
}
