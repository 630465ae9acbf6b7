//! Shared store for the solutions produced by the racing workers.
//!
//! Both workers append concurrently; the pool guarantees that no two stored
//! configurations are equal under [`crate::utils::my_equal`]. Scoring a
//! candidate can be expensive (a Jacobian SVD for the manipulability
//! policies), so insertion is two-phase: the slot is reserved under the
//! lock, the score is computed with the lock released, and written back
//! under a second lock. The pool never shrinks during a solve, so a
//! reserved index stays valid. Scores must only be read after every worker
//! has terminated; until then a reserved slot may still hold the NaN
//! placeholder.

use crate::utils::my_equal;
use std::sync::Mutex;

#[derive(Debug, Default)]
struct PoolInner {
    solutions: Vec<Vec<f64>>,
    /// Score and insertion index, parallel to `solutions`.
    scores: Vec<(f64, usize)>,
}

/// Thread-safe de-duplicated solution store.
#[derive(Debug, Default)]
pub struct SolutionPool {
    inner: Mutex<PoolInner>,
}

impl SolutionPool {
    pub fn new() -> Self {
        SolutionPool::default()
    }

    /// Appends `solution` unless an equal configuration is already stored.
    /// `score` runs with the pool unlocked. Returns false on a duplicate.
    pub fn try_insert<F>(&self, solution: Vec<f64>, score: F) -> bool
    where
        F: FnOnce(&[f64]) -> f64,
    {
        let index;
        let stored;
        {
            let mut inner = self.inner.lock().expect("solution pool poisoned");
            if inner.solutions.iter().any(|s| my_equal(s, &solution)) {
                return false;
            }
            index = inner.solutions.len();
            stored = solution.clone();
            inner.solutions.push(solution);
            inner.scores.push((f64::NAN, index));
        }

        let value = score(&stored);

        let mut inner = self.inner.lock().expect("solution pool poisoned");
        inner.scores[index].0 = value;
        true
    }

    /// True when at least one solution has been stored.
    pub fn is_empty(&self) -> bool {
        self.inner
            .lock()
            .expect("solution pool poisoned")
            .solutions
            .is_empty()
    }

    /// Copies of the stored solutions and their `(score, insertion index)`
    /// pairs. Only meaningful once all producers have stopped.
    pub fn snapshot(&self) -> (Vec<Vec<f64>>, Vec<(f64, usize)>) {
        let inner = self.inner.lock().expect("solution pool poisoned");
        (inner.solutions.clone(), inner.scores.clone())
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn insert_and_snapshot() {
        let pool = SolutionPool::new();
        assert!(pool.try_insert(vec![0.1, 0.2], |_| 7.0));
        let (sols, scores) = pool.snapshot();
        assert_eq!(sols, vec![vec![0.1, 0.2]]);
        assert_eq!(scores, vec![(7.0, 0)]);
    }

    #[test]
    fn duplicates_are_rejected() {
        let pool = SolutionPool::new();
        assert!(pool.try_insert(vec![0.1, 0.2], |_| 1.0));
        assert!(!pool.try_insert(vec![0.1 + 0.5e-5, 0.2], |_| 2.0));
        let (sols, _) = pool.snapshot();
        assert_eq!(sols.len(), 1);
    }

    #[test]
    fn empty_until_first_insert() {
        let pool = SolutionPool::new();
        assert!(pool.is_empty());
        pool.try_insert(vec![1.0], |_| 0.0);
        assert!(!pool.is_empty());
    }

    #[test]
    fn concurrent_inserts_keep_uniqueness_and_slots() {
        let pool = Arc::new(SolutionPool::new());
        let mut handles = Vec::new();
        for t in 0..4 {
            let pool = Arc::clone(&pool);
            handles.push(thread::spawn(move || {
                for i in 0..50 {
                    // Half the values collide across threads on purpose.
                    let v = if i % 2 == 0 { i as f64 } else { (t * 100 + i) as f64 };
                    pool.try_insert(vec![v], |s| s[0] * 2.0);
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }

        let (sols, scores) = pool.snapshot();
        assert_eq!(sols.len(), scores.len());
        for i in 0..sols.len() {
            for j in 0..i {
                assert!(!my_equal(&sols[i], &sols[j]), "duplicate at {} and {}", i, j);
            }
            assert_eq!(scores[i].1, i);
            assert_eq!(scores[i].0, sols[i][0] * 2.0);
        }
    }
}
