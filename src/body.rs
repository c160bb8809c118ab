// Tracked landmarks, the nine length categories and the sixteen scattering parts.

use std::ops::Index;

use serde::{Deserialize, Serialize};

use crate::{
    ellipsoid::Ellipsoid,
    error::{require_positive, Result},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    // The body frame has x forward, y to the left and z up.
    pub const fn lateral(self) -> f32 {
        match self {
            Side::Left => 1.,
            Side::Right => -1.,
        }
    }
}

/// Points of the skeleton whose trajectories are tracked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Landmark {
    Base,
    Neck,
    Head,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftHand,
    RightHand,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
    LeftToe,
    RightToe,
}

impl Landmark {
    pub const COUNT: usize = 17;

    pub const ALL: [Landmark; Landmark::COUNT] = [
        Landmark::Base,
        Landmark::Neck,
        Landmark::Head,
        Landmark::LeftShoulder,
        Landmark::RightShoulder,
        Landmark::LeftElbow,
        Landmark::RightElbow,
        Landmark::LeftHand,
        Landmark::RightHand,
        Landmark::LeftHip,
        Landmark::RightHip,
        Landmark::LeftKnee,
        Landmark::RightKnee,
        Landmark::LeftAnkle,
        Landmark::RightAnkle,
        Landmark::LeftToe,
        Landmark::RightToe,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Length categories. Left and right limbs share a category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Segment {
    Head,
    // Neck to shoulder joint, half the shoulder width
    Shoulder,
    Torso,
    // Pelvis center to hip joint, half the hip width
    Hip,
    UpperLeg,
    LowerLeg,
    Foot,
    UpperArm,
    LowerArm,
}

impl Segment {
    pub const COUNT: usize = 9;

    pub const ALL: [Segment; Segment::COUNT] = [
        Segment::Head,
        Segment::Shoulder,
        Segment::Torso,
        Segment::Hip,
        Segment::UpperLeg,
        Segment::LowerLeg,
        Segment::Foot,
        Segment::UpperArm,
        Segment::LowerArm,
    ];

    // Anthropometric proportion of the body height.
    pub fn ratio(self) -> f32 {
        match self {
            Segment::Head => 0.130,
            Segment::Shoulder => 0.259 / 2.,
            Segment::Torso => 0.288,
            Segment::Hip => 0.191 / 2.,
            Segment::UpperLeg => 0.245,
            Segment::LowerLeg => 0.246,
            Segment::Foot => 0.143,
            Segment::UpperArm => 0.188,
            Segment::LowerArm => 0.152,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Segment::Head => "Head Length",
            Segment::Shoulder => "Shoulder Length",
            Segment::Torso => "Torso Length",
            Segment::Hip => "Hip Length",
            Segment::UpperLeg => "Upper Leg Length",
            Segment::LowerLeg => "Lower Leg Length",
            Segment::Foot => "Foot Length",
            Segment::UpperArm => "Upper Arm Length",
            Segment::LowerArm => "Lower Arm Length",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SegmentLengths {
    height: f32,
    lengths: [f32; Segment::COUNT],
}

impl SegmentLengths {
    pub fn new(height: f32) -> Result<SegmentLengths> {
        let height = require_positive("height", height)?;
        let mut lengths = [0.; Segment::COUNT];
        for segment in Segment::ALL {
            lengths[segment as usize] = segment.ratio() * height;
        }
        Ok(SegmentLengths { height, lengths })
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    // Height of the hip joint above the sole, the unit of the relative velocity.
    pub fn leg(&self) -> f32 {
        self[Segment::UpperLeg] + self[Segment::LowerLeg]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Segment, f32)> + '_ {
        Segment::ALL.iter().map(move |&s| (s, self[s]))
    }
}

impl Index<Segment> for SegmentLengths {
    type Output = f32;

    fn index(&self, segment: Segment) -> &f32 {
        &self.lengths[segment as usize]
    }
}

/// Where a part's scattering center sits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Centroid {
    At(Landmark),
    Between(Landmark, Landmark),
}

/// Independently switchable scatterers. Each one is modeled as an ellipsoid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyPart {
    Head,
    Torso,
    LeftShoulder,
    RightShoulder,
    LeftUpperArm,
    RightUpperArm,
    LeftLowerArm,
    RightLowerArm,
    LeftHip,
    RightHip,
    LeftUpperLeg,
    RightUpperLeg,
    LeftLowerLeg,
    RightLowerLeg,
    LeftFoot,
    RightFoot,
}

impl BodyPart {
    pub const COUNT: usize = 16;

    pub const ALL: [BodyPart; BodyPart::COUNT] = [
        BodyPart::Head,
        BodyPart::Torso,
        BodyPart::LeftShoulder,
        BodyPart::RightShoulder,
        BodyPart::LeftUpperArm,
        BodyPart::RightUpperArm,
        BodyPart::LeftLowerArm,
        BodyPart::RightLowerArm,
        BodyPart::LeftHip,
        BodyPart::RightHip,
        BodyPart::LeftUpperLeg,
        BodyPart::RightUpperLeg,
        BodyPart::LeftLowerLeg,
        BodyPart::RightLowerLeg,
        BodyPart::LeftFoot,
        BodyPart::RightFoot,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn segment(self) -> Segment {
        use BodyPart::*;
        match self {
            Head => Segment::Head,
            Torso => Segment::Torso,
            LeftShoulder | RightShoulder => Segment::Shoulder,
            LeftUpperArm | RightUpperArm => Segment::UpperArm,
            LeftLowerArm | RightLowerArm => Segment::LowerArm,
            LeftHip | RightHip => Segment::Hip,
            LeftUpperLeg | RightUpperLeg => Segment::UpperLeg,
            LeftLowerLeg | RightLowerLeg => Segment::LowerLeg,
            LeftFoot | RightFoot => Segment::Foot,
        }
    }

    // The two semi-axes across the limb, in meters.
    pub fn thickness(self) -> f32 {
        use BodyPart::*;
        match self {
            Head => 0.1,
            Torso => 0.15,
            LeftShoulder | RightShoulder | LeftUpperArm | RightUpperArm => 0.06,
            LeftLowerArm | RightLowerArm | LeftFoot | RightFoot => 0.05,
            LeftHip | RightHip | LeftUpperLeg | RightUpperLeg => 0.07,
            LeftLowerLeg | RightLowerLeg => 0.06,
        }
    }

    pub fn centroid(self) -> Centroid {
        use Centroid::*;
        use Landmark as L;
        match self {
            BodyPart::Head => At(L::Head),
            BodyPart::Torso => Between(L::Neck, L::Base),
            BodyPart::LeftShoulder => At(L::LeftShoulder),
            BodyPart::RightShoulder => At(L::RightShoulder),
            BodyPart::LeftUpperArm => Between(L::LeftShoulder, L::LeftElbow),
            BodyPart::RightUpperArm => Between(L::RightShoulder, L::RightElbow),
            BodyPart::LeftLowerArm => At(L::LeftHand),
            BodyPart::RightLowerArm => At(L::RightHand),
            BodyPart::LeftHip => At(L::LeftHip),
            BodyPart::RightHip => At(L::RightHip),
            BodyPart::LeftUpperLeg => Between(L::LeftHip, L::LeftKnee),
            BodyPart::RightUpperLeg => Between(L::RightHip, L::RightKnee),
            BodyPart::LeftLowerLeg => Between(L::LeftAnkle, L::LeftKnee),
            BodyPart::RightLowerLeg => Between(L::RightAnkle, L::RightKnee),
            BodyPart::LeftFoot => At(L::LeftToe),
            BodyPart::RightFoot => At(L::RightToe),
        }
    }

    // Long axis of the ellipsoid as (to, from), the axis being `to - from`.
    pub fn axis(self) -> (Landmark, Landmark) {
        use Landmark as L;
        match self {
            BodyPart::Head => (L::Head, L::Neck),
            BodyPart::Torso => (L::Neck, L::Base),
            BodyPart::LeftShoulder => (L::LeftShoulder, L::Neck),
            BodyPart::RightShoulder => (L::RightShoulder, L::Neck),
            BodyPart::LeftUpperArm => (L::LeftShoulder, L::LeftElbow),
            BodyPart::RightUpperArm => (L::RightShoulder, L::RightElbow),
            BodyPart::LeftLowerArm => (L::LeftElbow, L::LeftHand),
            BodyPart::RightLowerArm => (L::RightElbow, L::RightHand),
            BodyPart::LeftHip => (L::LeftHip, L::Base),
            BodyPart::RightHip => (L::RightHip, L::Base),
            BodyPart::LeftUpperLeg => (L::LeftKnee, L::LeftHip),
            BodyPart::RightUpperLeg => (L::RightKnee, L::RightHip),
            BodyPart::LeftLowerLeg => (L::LeftAnkle, L::LeftKnee),
            BodyPart::RightLowerLeg => (L::RightAnkle, L::RightKnee),
            BodyPart::LeftFoot => (L::LeftAnkle, L::LeftToe),
            BodyPart::RightFoot => (L::RightAnkle, L::RightToe),
        }
    }

    pub fn ellipsoid(self, lengths: &SegmentLengths) -> Ellipsoid {
        let r = self.thickness();
        Ellipsoid {
            a: r,
            b: r,
            c: lengths[self.segment()] / 2.,
        }
    }
}

#[cfg(test)]
mod test {
    use approx::assert_relative_eq;

    use super::{BodyPart, Landmark, Segment, SegmentLengths, Side};

    #[test]
    fn enumerations_are_indexed_in_order() {
        for (i, l) in Landmark::ALL.iter().enumerate() {
            assert_eq!(l.index(), i);
        }
        for (i, p) in BodyPart::ALL.iter().enumerate() {
            assert_eq!(p.index(), i);
        }
        for (i, s) in Segment::ALL.iter().enumerate() {
            assert_eq!(*s as usize, i);
        }
    }

    #[test]
    fn lengths_scale_with_height() {
        let lengths = SegmentLengths::new(1.8).unwrap();

        assert_relative_eq!(lengths[Segment::UpperLeg], 0.245 * 1.8);
        assert_relative_eq!(lengths[Segment::Shoulder], 0.1295 * 1.8);
        assert_relative_eq!(lengths.leg(), 0.491 * 1.8, epsilon = 1e-6);
        assert_eq!(lengths.iter().count(), 9);
        assert_eq!(lengths.height(), 1.8);
        assert!(SegmentLengths::new(-1.).is_err());
    }

    #[test]
    fn segment_names_are_distinct() {
        let mut names: Vec<_> = Segment::ALL.iter().map(|s| s.name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), Segment::COUNT);
        assert_eq!(Segment::UpperArm.name(), "Upper Arm Length");
    }

    #[test]
    fn sides_point_outward() {
        assert_eq!(Side::Left.lateral(), 1.);
        assert_eq!(Side::Right.lateral(), -1.);
    }

    #[test]
    fn every_part_has_a_positive_ellipsoid() {
        let lengths = SegmentLengths::new(1.7).unwrap();
        for part in BodyPart::ALL {
            let e = part.ellipsoid(&lengths);
            assert!(e.a > 0. && e.b > 0. && e.c > 0., "{:?}", part);
            let (to, from) = part.axis();
            assert_ne!(to, from);
        }
        assert_relative_eq!(BodyPart::LeftUpperArm.ellipsoid(&lengths).c, 0.188 * 1.7 / 2.);
    }
}
