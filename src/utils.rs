//! Helper functions shared by the solvers.

use crate::kinematic_traits::{Pose, Twist};
use nalgebra::Vector6;

/// Two configurations are the same solution when every component differs by
/// less than this.
pub const SOLUTION_EQ_EPS: f64 = 1e-5;

/// Checks if all elements of the configuration are finite.
pub fn is_valid(qs: &[f64]) -> bool {
    qs.iter().all(|&q| q.is_finite())
}

/// Componentwise equality of two configurations under [`SOLUTION_EQ_EPS`].
pub fn my_equal(a: &[f64], b: &[f64]) -> bool {
    a.len() == b.len()
        && a.iter()
            .zip(b.iter())
            .all(|(x, y)| (x - y).abs() < SOLUTION_EQ_EPS)
}

/// Pose difference `target ⊖ current` as a base-frame twist: translation
/// difference first, then the scaled rotation axis taking `current` onto
/// `target`.
pub fn pose_error(current: &Pose, target: &Pose) -> Vector6<f64> {
    let linear = target.translation.vector - current.translation.vector;
    let angular = (target.rotation * current.rotation.inverse()).scaled_axis();
    Vector6::new(
        linear.x, linear.y, linear.z, angular.x, angular.y, angular.z,
    )
}

/// Zeroes every error component already inside its per-axis tolerance. Free
/// axes (tolerance at or beyond the float sentinel) are always zeroed.
pub fn mask_error(error: &mut Vector6<f64>, bounds: &Twist) {
    for i in 0..6 {
        if error[i].abs() <= bounds.component(i) {
            error[i] = 0.0;
        }
    }
}

/// True when the masked error is zero to within `eps` on every axis, i.e.
/// the pose matches the target under the given tolerances.
pub fn within_bounds(error: &Vector6<f64>, bounds: &Twist, eps: f64) -> bool {
    let mut masked = *error;
    mask_error(&mut masked, bounds);
    masked.iter().all(|c| c.abs() < eps)
}
