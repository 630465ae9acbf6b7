//! Bounded nonlinear inner solver minimizing the pose-error sum of squares.
//!
//! The second racing strategy: a Levenberg-Marquardt descent on
//! `Σ w_k · e_k(q)²`, where `e` is the six-component pose error and the
//! weight of every free axis is zero. Joint limits are hard constraints,
//! enforced by projection after each accepted step; continuous joints get no
//! projection. The damping factor blends between Gauss-Newton and gradient
//! descent, growing on rejected steps.

use crate::kinematic_traits::{JointKind, Kinematics, Pose, Twist};
use crate::utils::{mask_error, pose_error};
use nalgebra::{DMatrix, DVector, Vector6};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

const MAX_ITER: usize = 100;

/// Initial damping factor.
const LAMBDA_INIT: f64 = 1e-3;

/// Scale applied to the damping on a rejected (up) or accepted (down) step.
const LAMBDA_FACTOR: f64 = 10.0;

/// Damping past this means the descent is wedged in a local minimum.
const LAMBDA_MAX: f64 = 1e7;

/// Cost improvements below this are a stall.
const COST_STALL: f64 = 1e-14;

pub struct SumSqIk<'a, K: Kinematics> {
    kin: &'a K,
    lower: &'a [f64],
    upper: &'a [f64],
    kinds: &'a [JointKind],
    eps: f64,
}

impl<'a, K: Kinematics> SumSqIk<'a, K> {
    pub fn new(
        kin: &'a K,
        lower: &'a [f64],
        upper: &'a [f64],
        kinds: &'a [JointKind],
        eps: f64,
    ) -> Self {
        SumSqIk {
            kin,
            lower,
            upper,
            kinds,
            eps,
        }
    }

    /// Minimizes the weighted squared pose error from `q_init`. Success and
    /// failure conditions match the pseudoinverse strategy: per-axis
    /// tolerances decide success, and the deadline, the abort flag, the
    /// iteration cap or a stalled descent end the attempt.
    pub fn cart_to_jnt(
        &self,
        q_init: &[f64],
        target: &Pose,
        bounds: &Twist,
        deadline: Instant,
        abort: &AtomicBool,
    ) -> Option<Vec<f64>> {
        let mut q = q_init.to_vec();
        self.project(&mut q);

        let mut lambda = LAMBDA_INIT;
        let mut cost = self.weighted_cost(&q, target, bounds);

        for _ in 0..MAX_ITER {
            if abort.load(Ordering::Relaxed) || Instant::now() >= deadline {
                return None;
            }

            let error = pose_error(&self.kin.forward(&q), target);
            let mut masked = error;
            mask_error(&mut masked, bounds);
            if masked.iter().all(|c| c.abs() < self.eps) {
                return Some(q);
            }

            let (weighted_jac, weighted_err) = self.weighted_system(&q, &error, bounds);
            let n = q.len();
            let jt = weighted_jac.transpose();
            let gradient = &jt * &weighted_err;
            let hessian = &jt * &weighted_jac;

            // One damping adjustment per iteration; a rejected step only
            // grows lambda and the next iteration retries from the same q.
            let damped = &hessian + DMatrix::identity(n, n) * lambda;
            let step = match damped.cholesky() {
                Some(chol) => chol.solve(&gradient),
                None => {
                    lambda *= LAMBDA_FACTOR;
                    if lambda > LAMBDA_MAX {
                        return None;
                    }
                    continue;
                }
            };

            let mut trial = q.clone();
            for i in 0..n {
                trial[i] += step[i];
            }
            self.project(&mut trial);

            let trial_cost = self.weighted_cost(&trial, target, bounds);
            if trial_cost < cost {
                if cost - trial_cost < COST_STALL {
                    return None;
                }
                q = trial;
                cost = trial_cost;
                lambda = (lambda / LAMBDA_FACTOR).max(1e-9);
            } else {
                lambda *= LAMBDA_FACTOR;
                if lambda > LAMBDA_MAX {
                    return None;
                }
            }
        }

        None
    }

    /// `Σ w_k e_k²` at `q`; free axes carry weight zero.
    fn weighted_cost(&self, q: &[f64], target: &Pose, bounds: &Twist) -> f64 {
        let error = pose_error(&self.kin.forward(q), target);
        let mut cost = 0.0;
        for k in 0..6 {
            if Twist::is_free(bounds.component(k)) {
                continue;
            }
            cost += error[k] * error[k];
        }
        cost
    }

    /// Jacobian and error with the rows of free axes zeroed.
    fn weighted_system(
        &self,
        q: &[f64],
        error: &Vector6<f64>,
        bounds: &Twist,
    ) -> (DMatrix<f64>, DVector<f64>) {
        let mut jacobian = self.kin.jacobian(q);
        let mut rhs = DVector::from_column_slice(error.as_slice());
        for k in 0..6 {
            if Twist::is_free(bounds.component(k)) {
                rhs[k] = 0.0;
                for c in 0..jacobian.ncols() {
                    jacobian[(k, c)] = 0.0;
                }
            }
        }
        (jacobian, rhs)
    }

    /// Hard bound constraints; continuous joints are unconstrained.
    fn project(&self, q: &mut [f64]) {
        for i in 0..q.len() {
            if self.kinds[i] != JointKind::Continuous {
                q[i] = q[i].clamp(self.lower[i], self.upper[i]);
            }
        }
    }
}
