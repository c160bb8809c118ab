use nalgebra::Vector3;

use crate::{
    body::{BodyPart, Centroid, SegmentLengths},
    ellipsoid::Ellipsoid,
    helper::midpoint,
    kinematics::Pose,
};

/// One body part at one instant, seen by the radar as an ellipsoidal scatterer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EllipsoidTarget {
    pub part: BodyPart,
    pub pos: Vector3<f32>,
    // Long axis of the ellipsoid, not normalized
    pub aspect: Vector3<f32>,
    pub shape: Ellipsoid,
}

impl EllipsoidTarget {
    pub fn from_pose(part: BodyPart, pose: &Pose, lengths: &SegmentLengths) -> EllipsoidTarget {
        let pos = match part.centroid() {
            Centroid::At(l) => pose[l],
            Centroid::Between(a, b) => midpoint(&pose[a], &pose[b]),
        };
        let (to, from) = part.axis();

        EllipsoidTarget {
            part,
            pos,
            aspect: pose[to] - pose[from],
            shape: part.ellipsoid(lengths),
        }
    }
}

/// The scatterers present at one pulse.
#[derive(Clone, Debug, Default)]
pub struct Scene(Vec<EllipsoidTarget>);

impl Scene {
    pub fn from_pose(
        pose: &Pose,
        lengths: &SegmentLengths,
        parts: impl IntoIterator<Item = BodyPart>,
    ) -> Scene {
        Scene(
            parts
                .into_iter()
                .map(|part| EllipsoidTarget::from_pose(part, pose, lengths))
                .collect(),
        )
    }

    pub fn targets(&self) -> &[EllipsoidTarget] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
