//! A concrete serial-chain evaluator.
//!
//! The solver itself only needs the [`Kinematics`] trait; this module gives a
//! ready chain built from segments, each a fixed offset followed by an
//! optional revolute or prismatic joint. Forward kinematics composes the
//! segment isometries; the Jacobian is assembled geometrically from the joint
//! frames collected during that pass.

use crate::kinematic_traits::{JointMotion, Kinematics, Pose};
use nalgebra::{DMatrix, Isometry3, Translation3, Unit, UnitQuaternion, Vector3};

/// Motion of one segment of the chain.
#[derive(Debug, Clone)]
pub enum Joint {
    /// No motion, the segment only carries its offset.
    Fixed,
    /// Rotation about `axis`, given in the segment's local frame.
    Revolute { axis: Unit<Vector3<f64>> },
    /// Translation along `axis`, given in the segment's local frame.
    Prismatic { axis: Unit<Vector3<f64>> },
}

/// One link of the chain: a static offset from the previous segment's frame,
/// then the joint motion.
#[derive(Debug, Clone)]
pub struct Segment {
    pub origin: Isometry3<f64>,
    pub joint: Joint,
}

impl Segment {
    pub fn new(origin: Isometry3<f64>, joint: Joint) -> Self {
        Segment { origin, joint }
    }

    /// Revolute segment about the Z axis of its local frame, offset by
    /// `translation` from the previous segment.
    pub fn revolute_z(translation: Vector3<f64>) -> Self {
        Segment::new(
            Isometry3::from_parts(Translation3::from(translation), UnitQuaternion::identity()),
            Joint::Revolute {
                axis: Vector3::z_axis(),
            },
        )
    }

    /// Prismatic segment along the Z axis of its local frame.
    pub fn prismatic_z(translation: Vector3<f64>) -> Self {
        Segment::new(
            Isometry3::from_parts(Translation3::from(translation), UnitQuaternion::identity()),
            Joint::Prismatic {
                axis: Vector3::z_axis(),
            },
        )
    }

    /// Fixed segment, typically the tool flange or a frame adjustment.
    pub fn fixed(origin: Isometry3<f64>) -> Self {
        Segment::new(origin, Joint::Fixed)
    }

    fn transform(&self, value: f64) -> Isometry3<f64> {
        match &self.joint {
            Joint::Fixed => Isometry3::identity(),
            Joint::Revolute { axis } => Isometry3::from_parts(
                Translation3::identity(),
                UnitQuaternion::from_axis_angle(axis, value),
            ),
            Joint::Prismatic { axis } => Isometry3::from_parts(
                Translation3::from(axis.into_inner() * value),
                UnitQuaternion::identity(),
            ),
        }
    }
}

/// Ordered serial chain from base to end effector.
#[derive(Debug, Clone, Default)]
pub struct Chain {
    segments: Vec<Segment>,
}

impl Chain {
    pub fn new() -> Self {
        Chain::default()
    }

    pub fn from_segments(segments: Vec<Segment>) -> Self {
        Chain { segments }
    }

    pub fn push(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Joint frames in the base frame at configuration `qs`: per movable
    /// joint its origin and its axis, plus the end effector position. The
    /// axes are recorded before the joint's own motion is applied.
    fn joint_frames(&self, qs: &[f64]) -> (Vec<Vector3<f64>>, Vec<Vector3<f64>>, Vector3<f64>) {
        assert_eq!(qs.len(), self.dof(), "configuration length must equal DoF");

        let mut transform = Isometry3::identity();
        let mut origins = Vec::with_capacity(qs.len());
        let mut axes = Vec::with_capacity(qs.len());
        let mut qi = 0;

        for segment in &self.segments {
            transform *= segment.origin;
            match &segment.joint {
                Joint::Fixed => continue,
                Joint::Revolute { axis } | Joint::Prismatic { axis } => {
                    origins.push(transform.translation.vector);
                    axes.push(transform.rotation * axis.into_inner());
                }
            }
            transform *= segment.transform(qs[qi]);
            qi += 1;
        }

        (origins, axes, transform.translation.vector)
    }
}

impl Kinematics for Chain {
    fn dof(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| !matches!(s.joint, Joint::Fixed))
            .count()
    }

    fn joint_motion(&self, index: usize) -> JointMotion {
        let joint = self
            .segments
            .iter()
            .filter_map(|s| match s.joint {
                Joint::Fixed => None,
                ref j => Some(j),
            })
            .nth(index)
            .expect("joint index out of range");
        match joint {
            Joint::Revolute { .. } => JointMotion::Rotational,
            Joint::Prismatic { .. } => JointMotion::Translational,
            Joint::Fixed => unreachable!(),
        }
    }

    fn forward(&self, qs: &[f64]) -> Pose {
        assert_eq!(qs.len(), self.dof(), "configuration length must equal DoF");

        let mut transform = Isometry3::identity();
        let mut qi = 0;
        for segment in &self.segments {
            transform *= segment.origin;
            if !matches!(segment.joint, Joint::Fixed) {
                transform *= segment.transform(qs[qi]);
                qi += 1;
            }
        }
        transform
    }

    /// Geometric Jacobian: for a revolute joint the linear rows are
    /// `z × (p_ee − p_joint)` and the angular rows are `z`; for a prismatic
    /// joint the linear rows are `z` and the angular rows are zero.
    fn jacobian(&self, qs: &[f64]) -> DMatrix<f64> {
        let n = self.dof();
        let (origins, axes, ee_pos) = self.joint_frames(qs);
        let mut jacobian = DMatrix::zeros(6, n);

        let mut qi = 0;
        for segment in &self.segments {
            match segment.joint {
                Joint::Fixed => continue,
                Joint::Revolute { .. } => {
                    let z = &axes[qi];
                    let cross = z.cross(&(ee_pos - origins[qi]));
                    jacobian.fixed_view_mut::<3, 1>(0, qi).copy_from(&cross);
                    jacobian.fixed_view_mut::<3, 1>(3, qi).copy_from(z);
                }
                Joint::Prismatic { .. } => {
                    jacobian.fixed_view_mut::<3, 1>(0, qi).copy_from(&axes[qi]);
                }
            }
            qi += 1;
        }

        jacobian
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jacobian::numeric_jacobian;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    /// Planar 2R arm in the XY plane: two unit links, both rotating about Z.
    fn planar_2r() -> Chain {
        Chain::from_segments(vec![
            Segment::revolute_z(Vector3::zeros()),
            Segment::revolute_z(Vector3::new(1.0, 0.0, 0.0)),
            Segment::fixed(Isometry3::translation(1.0, 0.0, 0.0)),
        ])
    }

    #[test]
    fn planar_arm_at_zero_is_stretched() {
        let chain = planar_2r();
        assert_eq!(chain.dof(), 2);
        let pose = chain.forward(&[0.0, 0.0]);
        assert_relative_eq!(pose.translation.x, 2.0, epsilon = 1e-12);
        assert_relative_eq!(pose.translation.y, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn planar_arm_elbow_bend() {
        let chain = planar_2r();
        let pose = chain.forward(&[0.0, FRAC_PI_2]);
        assert_relative_eq!(pose.translation.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(pose.translation.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn prismatic_joint_slides() {
        let mut chain = Chain::new();
        chain.push(Segment::prismatic_z(Vector3::zeros()));
        let pose = chain.forward(&[0.4]);
        assert_relative_eq!(pose.translation.z, 0.4, epsilon = 1e-12);
        assert_eq!(chain.joint_motion(0), JointMotion::Translational);
    }

    #[test]
    fn geometric_jacobian_matches_numeric() {
        let chain = Chain::from_segments(vec![
            Segment::revolute_z(Vector3::new(0.0, 0.0, 0.3)),
            Segment::new(
                Isometry3::translation(0.0, 0.0, 0.3),
                Joint::Revolute {
                    axis: Vector3::y_axis(),
                },
            ),
            Segment::prismatic_z(Vector3::new(0.1, 0.0, 0.2)),
            Segment::fixed(Isometry3::translation(0.0, 0.0, 0.1)),
        ]);

        let qs = [0.3, -0.7, 0.15];
        let analytic = chain.jacobian(&qs);
        let numeric = numeric_jacobian(&chain, &qs, 1e-7);

        for row in 0..6 {
            for col in 0..3 {
                assert_relative_eq!(
                    analytic[(row, col)],
                    numeric[(row, col)],
                    epsilon = 1e-5
                );
            }
        }
    }

    #[test]
    fn fixed_segments_do_not_count_as_joints() {
        let chain = planar_2r();
        assert_eq!(chain.dof(), 2);
        assert_eq!(chain.segments().len(), 3);
        assert_eq!(chain.joint_motion(0), JointMotion::Rotational);
        assert_eq!(chain.joint_motion(1), JointMotion::Rotational);
    }
}
