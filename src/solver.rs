//! The public solver façade and the race it coordinates.
//!
//! `solve` races two independent strategies against one deadline: the
//! pseudoinverse descent and the sum-of-squares minimizer. Each worker loops
//! restart → inner solve → normalize → pool insertion, resampling its start
//! configuration within the joint bounds between attempts. The pool
//! de-duplicates and scores what they produce; the policy decides when the
//! race ends and which entry wins.

use crate::errors::{ChainError, SolveError};
use crate::kinematic_traits::{JointKind, Kinematics, Pose, Twist};
use crate::normalize::{normalize_limits, normalize_seed};
use crate::pinv_ik::PinvIk;
use crate::pool::SolutionPool;
use crate::scoring::{joint_err, manip_penalty, manip_value1, manip_value2, SolveType};
use crate::sumsq_ik::SumSqIk;
use crate::utils::is_valid;
use rand::Rng;
use rayon::ThreadPool;
use std::cmp::Ordering as CmpOrdering;
use std::f64::consts::PI;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::debug;

/// Winner of a race, with the pool size that produced it.
#[derive(Debug, Clone)]
pub struct IkSolution {
    /// The best configuration under the active policy.
    pub joints: Vec<f64>,
    /// Number of distinct solutions the race collected.
    pub candidates: usize,
}

/// Numerical inverse kinematics over any [`Kinematics`] evaluator.
///
/// The solver owns a persistent two-thread pool, one thread per strategy;
/// dropping the solver stops and joins both. A `solve` call is synchronous
/// and exclusive: it blocks the caller until both workers have terminated.
pub struct Solver<K> {
    kin: K,
    lower: Vec<f64>,
    upper: Vec<f64>,
    kinds: Vec<JointKind>,
    maxtime: f64,
    eps: f64,
    solve_type: SolveType,
    threads: ThreadPool,
}

impl<K: Kinematics + Sync> Solver<K> {
    /// Builds a solver around the evaluator and its joint bounds.
    ///
    /// `maxtime` is the race budget in seconds, `eps` the pose convergence
    /// epsilon. Fails with [`ChainError::InvalidChain`] when the bound
    /// arrays disagree with the evaluator's degrees of freedom.
    pub fn new(
        kin: K,
        q_min: &[f64],
        q_max: &[f64],
        maxtime: f64,
        eps: f64,
        solve_type: SolveType,
    ) -> Result<Self, ChainError> {
        let dof = kin.dof();
        if q_min.len() != dof || q_max.len() != dof {
            return Err(ChainError::InvalidChain {
                dof,
                lower: q_min.len(),
                upper: q_max.len(),
            });
        }

        let kinds = (0..dof)
            .map(|i| JointKind::classify(kin.joint_motion(i), q_min[i], q_max[i]))
            .collect();

        let threads = rayon::ThreadPoolBuilder::new()
            .num_threads(2)
            .thread_name(|i| format!("ik-race-{}", i))
            .build()
            .expect("worker thread pool");

        Ok(Solver {
            kin,
            lower: q_min.to_vec(),
            upper: q_max.to_vec(),
            kinds,
            maxtime,
            eps,
            solve_type,
            threads,
        })
    }

    pub fn set_maxtime(&mut self, seconds: f64) {
        self.maxtime = seconds;
    }

    pub fn set_eps(&mut self, eps: f64) {
        self.eps = eps;
    }

    pub fn set_solve_type(&mut self, solve_type: SolveType) {
        self.solve_type = solve_type;
    }

    /// The evaluator the solver was built around.
    pub fn kinematics(&self) -> &K {
        &self.kin
    }

    /// Joint classification derived from the bounds at construction.
    pub fn joint_kinds(&self) -> &[JointKind] {
        &self.kinds
    }

    /// Races both strategies for a configuration placing the end effector
    /// within `bounds` of `target`, starting from `seed`.
    ///
    /// Under `Speed` the race stops at the first solution; the other
    /// policies run out the full time budget and rank the pool. On success
    /// the number of distinct solutions found is reported alongside the
    /// winner; an empty pool is [`SolveError::NoSolution`] and the caller
    /// keeps the seed.
    pub fn solve(
        &mut self,
        seed: &[f64],
        target: &Pose,
        bounds: &Twist,
    ) -> Result<IkSolution, SolveError> {
        if seed.len() != self.kinds.len() {
            return Err(SolveError::WrongDimension {
                expected: self.kinds.len(),
                found: seed.len(),
            });
        }

        let pool = SolutionPool::new();
        let deadline = Instant::now() + Duration::from_secs_f64(self.maxtime);
        let abort_pinv = AtomicBool::new(false);
        let abort_sumsq = AtomicBool::new(false);

        debug!(dof = self.kinds.len(), policy = ?self.solve_type, "race started");

        self.threads.join(
            || {
                let inner = PinvIk::new(&self.kin, &self.lower, &self.upper, &self.kinds, self.eps);
                self.run_worker(
                    "pinv",
                    seed,
                    deadline,
                    &pool,
                    &abort_pinv,
                    &abort_sumsq,
                    |start, deadline, abort| inner.cart_to_jnt(start, target, bounds, deadline, abort),
                )
            },
            || {
                let inner =
                    SumSqIk::new(&self.kin, &self.lower, &self.upper, &self.kinds, self.eps);
                self.run_worker(
                    "sumsq",
                    seed,
                    deadline,
                    &pool,
                    &abort_sumsq,
                    &abort_pinv,
                    |start, deadline, abort| inner.cart_to_jnt(start, target, bounds, deadline, abort),
                )
            },
        );

        let (solutions, mut scores) = pool.snapshot();
        if solutions.is_empty() {
            debug!("race finished empty");
            return Err(SolveError::NoSolution);
        }

        // Stable ranking: score first, insertion order on ties.
        if self.solve_type.maximizes() {
            scores.sort_by(|a, b| {
                b.0.partial_cmp(&a.0)
                    .unwrap_or(CmpOrdering::Equal)
                    .then(a.1.cmp(&b.1))
            });
        } else {
            scores.sort_by(|a, b| {
                a.0.partial_cmp(&b.0)
                    .unwrap_or(CmpOrdering::Equal)
                    .then(a.1.cmp(&b.1))
            });
        }

        debug!(candidates = solutions.len(), "race finished");

        Ok(IkSolution {
            joints: solutions[scores[0].1].clone(),
            candidates: solutions.len(),
        })
    }

    /// The restart loop shared by both workers. `inner` runs one descent
    /// from the given start; everything around it (normalization, pool
    /// insertion, Speed early exit, reseeding) is common. On exit the
    /// sibling is told to abort, so a finished strategy never leaves the
    /// other one running out the clock alone in Speed mode.
    fn run_worker<F>(
        &self,
        strategy: &str,
        seed0: &[f64],
        deadline: Instant,
        pool: &SolutionPool,
        abort: &AtomicBool,
        abort_other: &AtomicBool,
        inner: F,
    ) where
        F: Fn(&[f64], Instant, &AtomicBool) -> Option<Vec<f64>>,
    {
        let mut rng = rand::thread_rng();
        let mut start = seed0.to_vec();

        loop {
            if Instant::now() >= deadline || abort.load(Ordering::Relaxed) {
                break;
            }

            if let Some(mut q) = inner(&start, deadline, abort) {
                match self.solve_type {
                    SolveType::Manip1 | SolveType::Manip2 => {
                        normalize_limits(&self.kinds, &self.lower, &self.upper, seed0, &mut q)
                    }
                    _ => normalize_seed(&self.kinds, &self.lower, &self.upper, seed0, &mut q),
                }
                if is_valid(&q) && pool.try_insert(q, |q| self.score(seed0, q)) {
                    debug!(strategy, "candidate accepted");
                }
            }

            if self.solve_type == SolveType::Speed && !pool.is_empty() {
                break;
            }

            for j in 0..start.len() {
                start[j] = if self.kinds[j] == JointKind::Continuous {
                    rng.gen_range(seed0[j] - 2.0 * PI..=seed0[j] + 2.0 * PI)
                } else {
                    rng.gen_range(self.lower[j]..=self.upper[j])
                };
            }
        }

        abort_other.store(true, Ordering::Relaxed);
    }

    fn score(&self, seed: &[f64], q: &[f64]) -> f64 {
        match self.solve_type {
            SolveType::Manip1 => {
                manip_penalty(&self.kinds, &self.lower, &self.upper, q) * manip_value1(&self.kin, q)
            }
            SolveType::Manip2 => {
                manip_penalty(&self.kinds, &self.lower, &self.upper, q) * manip_value2(&self.kin, q)
            }
            SolveType::Speed | SolveType::Distance => joint_err(&self.kinds, seed, q),
        }
    }
}
