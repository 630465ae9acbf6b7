//! Numerical inverse kinematics for serial chains of revolute, prismatic and
//! continuous joints.
//!
//! Given a chain evaluator, joint limits, a target pose and a seed
//! configuration, the solver returns joint values placing the end effector
//! within a per-axis tolerance of the target. Two independent strategies are
//! raced on a persistent pair of worker threads against a shared deadline:
//!
//! - a Newton-style descent through the Jacobian pseudoinverse, and
//! - a bounded Levenberg-Marquardt minimizer of the pose-error sum of
//!   squares.
//!
//! Each strategy restarts from random configurations within the joint bounds
//! until time runs out. Everything either of them finds is normalized into
//! the seed's neighborhood, de-duplicated in a shared pool and scored by the
//! selected policy:
//!
//! - `Speed` stops the race at the first solution.
//! - `Distance` uses the whole budget and returns the solution closest to
//!   the seed.
//! - `Manip1` / `Manip2` use the whole budget and return the best
//!   conditioned posture by two manipulability measures.
//!
//! # Example
//!
//! ```
//! use nalgebra::Vector3;
//! use rs_race_ik::chain::{Chain, Segment};
//! use rs_race_ik::kinematic_traits::{Kinematics, Twist};
//! use rs_race_ik::scoring::SolveType;
//! use rs_race_ik::solver::Solver;
//! use std::f64::consts::PI;
//!
//! // Planar arm: two unit links rotating about Z.
//! let chain = Chain::from_segments(vec![
//!     Segment::revolute_z(Vector3::zeros()),
//!     Segment::revolute_z(Vector3::new(1.0, 0.0, 0.0)),
//! ]);
//! let target = chain.forward(&[0.4, 0.3]);
//!
//! let mut solver = Solver::new(
//!     chain,
//!     &[-PI, -PI],
//!     &[PI, PI],
//!     0.1,   // seconds for the race
//!     1e-5,  // pose convergence epsilon
//!     SolveType::Speed,
//! )
//! .unwrap();
//!
//! let found = solver
//!     .solve(&[0.0, 0.0], &target, &Twist::zero())
//!     .unwrap();
//! assert_eq!(found.joints.len(), 2);
//! ```

pub mod chain;
pub mod errors;
pub mod jacobian;
pub mod kinematic_traits;
pub mod normalize;
pub mod pinv_ik;
pub mod pool;
pub mod scoring;
pub mod solver;
pub mod sumsq_ik;
pub mod utils;
