//! Angular normalization of raw solver output.
//!
//! The inner solvers converge in a local linear regime, so a rotational joint
//! value is only meaningful up to whole turns. Before a candidate enters the
//! solution pool it is shifted by multiples of 2π into the wanted
//! neighborhood, then back inside the joint limits. The adjustment is not
//! re-verified against the pose: full turns of a rotational joint preserve
//! the pose, and the final limit step can only move a value that the inner
//! solver already left outside its limits.

use crate::kinematic_traits::JointKind;
use std::f64::consts::PI;

/// Shifts `solution` so every rotational joint lands within one revolution
/// of the seed, then within its limits.
pub fn normalize_seed(
    kinds: &[JointKind],
    lower: &[f64],
    upper: &[f64],
    seed: &[f64],
    solution: &mut [f64],
) {
    for i in 0..kinds.len() {
        normalize_joint(kinds[i], lower[i], upper[i], seed[i], &mut solution[i]);
    }
}

/// Shifts `solution` so every revolute joint lands within one revolution of
/// the middle of its limits, then within the limits. Continuous joints have
/// no usable middle and are normalized against the seed instead.
pub fn normalize_limits(
    kinds: &[JointKind],
    lower: &[f64],
    upper: &[f64],
    seed: &[f64],
    solution: &mut [f64],
) {
    for i in 0..kinds.len() {
        let target = match kinds[i] {
            JointKind::Revolute => (lower[i] + upper[i]) / 2.0,
            _ => seed[i],
        };
        normalize_joint(kinds[i], lower[i], upper[i], target, &mut solution[i]);
    }
}

fn normalize_joint(kind: JointKind, lower: f64, upper: f64, target: f64, val: &mut f64) {
    if kind == JointKind::Prismatic {
        return;
    }

    if *val > target + PI {
        // Actual angle offset past the target, minus a full turn
        let diffangle = (*val - target) % (2.0 * PI);
        *val = target + diffangle - 2.0 * PI;
    }
    if *val < target - PI {
        let diffangle = (target - *val) % (2.0 * PI);
        *val = target - diffangle + 2.0 * PI;
    }

    if kind == JointKind::Continuous {
        return;
    }

    if *val > upper {
        let diffangle = (*val - upper) % (2.0 * PI);
        *val = upper + diffangle - 2.0 * PI;
    }
    if *val < lower {
        let diffangle = (lower - *val) % (2.0 * PI);
        *val = lower - diffangle + 2.0 * PI;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    const REVOLUTE: [JointKind; 1] = [JointKind::Revolute];

    #[test]
    fn value_pulled_into_seed_neighborhood() {
        let mut sol = vec![0.3 + 4.0 * PI];
        normalize_seed(&REVOLUTE, &[-PI], &[PI], &[0.0], &mut sol);
        assert!((sol[0] - 0.3).abs() < 1e-12);
    }

    #[test]
    fn negative_value_pulled_up() {
        let mut sol = vec![-0.2 - 6.0 * PI];
        normalize_seed(&REVOLUTE, &[-PI], &[PI], &[0.0], &mut sol);
        assert!((sol[0] + 0.2).abs() < 1e-12);
    }

    #[test]
    fn value_within_pi_of_seed_is_untouched() {
        let mut sol = vec![2.0];
        normalize_seed(&REVOLUTE, &[-PI], &[PI], &[1.5], &mut sol);
        assert_eq!(sol[0], 2.0);
    }

    #[test]
    fn limit_step_wraps_back_inside() {
        // Seed sits at the upper limit; a solution just past it must come
        // back a full turn, not be clamped.
        let mut sol = vec![3.0 + 0.5];
        normalize_seed(&REVOLUTE, &[-3.0], &[3.0], &[3.0], &mut sol);
        assert!((sol[0] - (3.5 - 2.0 * PI)).abs() < 1e-12);
        assert!(sol[0] >= -3.0 && sol[0] <= 3.0);
    }

    #[test]
    fn continuous_joint_keeps_seed_relative_value() {
        let kinds = [JointKind::Continuous];
        // Seed at 3π: the solution may stay near it, whatever the limits say.
        let mut sol = vec![3.0 * PI + 0.1];
        normalize_seed(&kinds, &[0.0], &[0.0], &[3.0 * PI], &mut sol);
        assert!((sol[0] - (3.0 * PI + 0.1)).abs() < 1e-12);
    }

    #[test]
    fn prismatic_joint_is_skipped() {
        let kinds = [JointKind::Prismatic];
        let mut sol = vec![42.0];
        normalize_seed(&kinds, &[0.0], &[1.0], &[0.5], &mut sol);
        assert_eq!(sol[0], 42.0);
    }

    #[test]
    fn limits_variant_targets_mid_range() {
        let mut sol = vec![1.0 - 2.0 * PI];
        // Mid-range is 1.0, so the solution should come back near it even
        // though the seed is far away.
        normalize_limits(&REVOLUTE, &[0.0], &[2.0], &[-2.0], &mut sol);
        assert!((sol[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn normalization_is_idempotent() {
        let lower = [-2.9];
        let upper = [2.9];
        for start in [-20.0_f64, -7.3, -0.4, 5.0, 18.9] {
            let mut once = vec![start];
            normalize_seed(&REVOLUTE, &lower, &upper, &[0.7], &mut once);
            let mut twice = once.clone();
            normalize_seed(&REVOLUTE, &lower, &upper, &[0.7], &mut twice);
            assert_eq!(once, twice, "not idempotent for start {}", start);
        }
    }
}
