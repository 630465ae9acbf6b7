//! Ranking of candidate solutions.
//!
//! Every candidate that enters the pool is scored once; the race coordinator
//! picks the winner from the scores after both workers have finished. Speed
//! and Distance rank by squared distance from the seed (smaller is better),
//! the manipulability policies rank by a Jacobian conditioning measure scaled
//! with a joint-range penalty (larger is better).

use crate::kinematic_traits::{JointKind, Kinematics};

/// When the race ends and how candidates are ranked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveType {
    /// Stop at the first valid solution either strategy produces.
    Speed,
    /// Use the whole time budget, prefer solutions close to the seed.
    Distance,
    /// Use the whole time budget, prefer well-conditioned postures by the
    /// product of the Jacobian singular values.
    Manip1,
    /// Use the whole time budget, prefer well-conditioned postures by the
    /// ratio of the smallest to the largest Jacobian singular value.
    Manip2,
}

impl SolveType {
    /// Whether larger scores win under this policy.
    pub(crate) fn maximizes(self) -> bool {
        matches!(self, SolveType::Manip1 | SolveType::Manip2)
    }
}

/// Sum of squared per-joint differences from the seed. Continuous joints
/// carry no meaningful distance over full turns and are excluded.
pub fn joint_err(kinds: &[JointKind], seed: &[f64], solution: &[f64]) -> f64 {
    let mut err = 0.0;
    for i in 0..kinds.len() {
        if kinds[i] == JointKind::Continuous {
            continue;
        }
        err += (solution[i] - seed[i]).powi(2);
    }
    err
}

/// Joint-range penalty in (0, 1): peaks at the center of every bounded
/// range and falls towards zero at any limit. Continuous joints do not
/// contribute.
pub fn manip_penalty(kinds: &[JointKind], lower: &[f64], upper: &[f64], qs: &[f64]) -> f64 {
    let mut penalty = 1.0;
    for i in 0..kinds.len() {
        if kinds[i] == JointKind::Continuous {
            continue;
        }
        let range = upper[i] - lower[i];
        penalty *= (qs[i] - lower[i]) * (upper[i] - qs[i]) / (range * range);
    }
    1.0 - (-penalty).exp()
}

/// Product of the singular values of the Jacobian at `qs`.
pub fn manip_value1(kin: &impl Kinematics, qs: &[f64]) -> f64 {
    let jacobian = kin.jacobian(qs);
    let svd = jacobian.svd(false, false);
    svd.singular_values.iter().product()
}

/// Ratio of the smallest to the largest singular value of the Jacobian at
/// `qs`; zero for a degenerate Jacobian.
pub fn manip_value2(kin: &impl Kinematics, qs: &[f64]) -> f64 {
    let jacobian = kin.jacobian(qs);
    let svd = jacobian.svd(false, false);
    let min = svd.singular_values.iter().fold(f64::INFINITY, |a, &b| a.min(b));
    let max = svd.singular_values.iter().fold(0.0_f64, |a, &b| a.max(b));
    if max <= 0.0 {
        return 0.0;
    }
    min / max
}
