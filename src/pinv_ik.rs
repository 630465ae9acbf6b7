//! Newton-style inner solver stepping through the Jacobian pseudoinverse.
//!
//! One of the two strategies raced by the coordinator. Each call walks from
//! the given start configuration towards the target pose; the restart
//! sampling around failed attempts lives in the worker loop, not here.

use crate::kinematic_traits::{JointKind, Kinematics, Pose, Twist};
use crate::utils::{mask_error, pose_error};
use nalgebra::{DVector, SVD};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

/// Iteration cap per descent; on miss the worker resamples and tries again.
const MAX_ITER: usize = 100;

/// Infinity-norm cap on a single joint step, radians or metres.
const STEP_CAP: f64 = 0.35;

/// Steps smaller than this make no progress; give up and let the worker
/// restart from a fresh seed.
const STALL_EPS: f64 = 1e-12;

/// Singular values below this are dropped from the pseudoinverse.
const PINV_EPS: f64 = 1e-10;

pub struct PinvIk<'a, K: Kinematics> {
    kin: &'a K,
    lower: &'a [f64],
    upper: &'a [f64],
    kinds: &'a [JointKind],
    eps: f64,
}

impl<'a, K: Kinematics> PinvIk<'a, K> {
    pub fn new(
        kin: &'a K,
        lower: &'a [f64],
        upper: &'a [f64],
        kinds: &'a [JointKind],
        eps: f64,
    ) -> Self {
        PinvIk {
            kin,
            lower,
            upper,
            kinds,
            eps,
        }
    }

    /// Descends from `q_init` towards `target`. Succeeds when every pose
    /// error component is inside its per-axis tolerance (free axes never
    /// constrain), fails on the iteration cap, a stalled step, the deadline,
    /// or the abort flag raised by the sibling worker.
    pub fn cart_to_jnt(
        &self,
        q_init: &[f64],
        target: &Pose,
        bounds: &Twist,
        deadline: Instant,
        abort: &AtomicBool,
    ) -> Option<Vec<f64>> {
        let mut q = q_init.to_vec();
        self.clamp(&mut q);

        for _ in 0..MAX_ITER {
            if abort.load(Ordering::Relaxed) || Instant::now() >= deadline {
                return None;
            }

            let mut error = pose_error(&self.kin.forward(&q), target);
            mask_error(&mut error, bounds);
            if error.iter().all(|c| c.abs() < self.eps) {
                return Some(q);
            }

            let jacobian = self.kin.jacobian(&q);
            let svd = SVD::new(jacobian, true, true);
            let rhs = DVector::from_column_slice(error.as_slice());
            let mut dq = match svd.solve(&rhs, PINV_EPS) {
                Ok(dq) => dq,
                Err(_) => return None,
            };

            let magnitude = dq.amax();
            if magnitude < STALL_EPS {
                return None;
            }
            if magnitude > STEP_CAP {
                dq *= STEP_CAP / magnitude;
            }

            for i in 0..q.len() {
                q[i] += dq[i];
            }
            self.clamp(&mut q);
        }

        None
    }

    /// Keeps bounded joints inside their limits; continuous joints roam.
    fn clamp(&self, q: &mut [f64]) {
        for i in 0..q.len() {
            if self.kinds[i] != JointKind::Continuous {
                q[i] = q[i].clamp(self.lower[i], self.upper[i]);
            }
        }
    }
}
