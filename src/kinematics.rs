use std::ops::Index;

use nalgebra::{Matrix3, Vector3};
use tracing::debug;

use crate::{
    body::{Landmark, Segment, SegmentLengths, Side},
    error::{Result, SimError},
    gait::{
        curves::{JointAngleCurves, JointCurve},
        CycleTiming, GaitParameters,
    },
    helper::{compose_rotation, pitch},
};

// Body frame: x forward, y left, z up, with the base of the spine at the origin.
// Frames and bones are listed parent first, so one pass over each resolves a pose.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Frame {
    Pelvis,
    Spine,
    LeftThigh,
    RightThigh,
    LeftShank,
    RightShank,
    LeftFoot,
    RightFoot,
    LeftUpperArm,
    RightUpperArm,
    LeftForearm,
    RightForearm,
}

const FRAME_COUNT: usize = 12;

#[derive(Clone, Copy, Debug)]
enum Joint {
    // Roll from the left/right rocking, yaw from the pelvis torsion
    Pelvis,
    // Pitch from the forward/backward tilt, yaw from the thorax torsion
    Spine,
    // A hinge about the lateral axis driven by one limb curve
    Flex {
        curve: JointCurve,
        side: Side,
        sign: f32,
    },
}

struct FrameLink {
    frame: Frame,
    parent: Option<Frame>,
    joint: Joint,
}

const fn flex(frame: Frame, parent: Frame, curve: JointCurve, side: Side, sign: f32) -> FrameLink {
    FrameLink {
        frame,
        parent: Some(parent),
        joint: Joint::Flex { curve, side, sign },
    }
}

// The knee curve is a flexion, which bends the shank backwards, hence the negative sign.
const FRAMES: [FrameLink; FRAME_COUNT] = {
    use Frame::*;
    use JointCurve::*;
    [
        FrameLink {
            frame: Pelvis,
            parent: None,
            joint: Joint::Pelvis,
        },
        FrameLink {
            frame: Spine,
            parent: None,
            joint: Joint::Spine,
        },
        flex(LeftThigh, Pelvis, HipFlex, Side::Left, 1.),
        flex(RightThigh, Pelvis, HipFlex, Side::Right, 1.),
        flex(LeftShank, LeftThigh, KneeFlex, Side::Left, -1.),
        flex(RightShank, RightThigh, KneeFlex, Side::Right, -1.),
        flex(LeftFoot, LeftShank, AnkleFlex, Side::Left, 1.),
        flex(RightFoot, RightShank, AnkleFlex, Side::Right, 1.),
        flex(LeftUpperArm, Spine, ShoulderFlex, Side::Left, 1.),
        flex(RightUpperArm, Spine, ShoulderFlex, Side::Right, 1.),
        flex(LeftForearm, LeftUpperArm, ElbowFlex, Side::Left, 1.),
        flex(RightForearm, RightUpperArm, ElbowFlex, Side::Right, 1.),
    ]
};

struct Bone {
    parent: Landmark,
    child: Landmark,
    frame: Frame,
    // Unit direction of the bone at rest, scaled by the segment length
    direction: Vector3<f32>,
    length: Segment,
}

const UP: Vector3<f32> = Vector3::new(0., 0., 1.);
const DOWN: Vector3<f32> = Vector3::new(0., 0., -1.);
const LEFT: Vector3<f32> = outward(Side::Left);
const RIGHT: Vector3<f32> = outward(Side::Right);
const FORWARD: Vector3<f32> = Vector3::new(1., 0., 0.);

const fn outward(side: Side) -> Vector3<f32> {
    Vector3::new(0., side.lateral(), 0.)
}

const fn bone(
    parent: Landmark,
    child: Landmark,
    frame: Frame,
    direction: Vector3<f32>,
    length: Segment,
) -> Bone {
    Bone {
        parent,
        child,
        frame,
        direction,
        length,
    }
}

// Every landmark but the base is the child of exactly one bone.
const BONES: [Bone; Landmark::COUNT - 1] = {
    use Frame as F;
    use Landmark::*;
    [
        bone(Base, Neck, F::Spine, UP, Segment::Torso),
        bone(Neck, Head, F::Spine, UP, Segment::Head),
        bone(Neck, LeftShoulder, F::Spine, LEFT, Segment::Shoulder),
        bone(Neck, RightShoulder, F::Spine, RIGHT, Segment::Shoulder),
        bone(LeftShoulder, LeftElbow, F::LeftUpperArm, DOWN, Segment::UpperArm),
        bone(RightShoulder, RightElbow, F::RightUpperArm, DOWN, Segment::UpperArm),
        bone(LeftElbow, LeftHand, F::LeftForearm, DOWN, Segment::LowerArm),
        bone(RightElbow, RightHand, F::RightForearm, DOWN, Segment::LowerArm),
        bone(Base, LeftHip, F::Pelvis, LEFT, Segment::Hip),
        bone(Base, RightHip, F::Pelvis, RIGHT, Segment::Hip),
        bone(LeftHip, LeftKnee, F::LeftThigh, DOWN, Segment::UpperLeg),
        bone(RightHip, RightKnee, F::RightThigh, DOWN, Segment::UpperLeg),
        bone(LeftKnee, LeftAnkle, F::LeftShank, DOWN, Segment::LowerLeg),
        bone(RightKnee, RightAnkle, F::RightShank, DOWN, Segment::LowerLeg),
        bone(LeftAnkle, LeftToe, F::LeftFoot, FORWARD, Segment::Foot),
        bone(RightAnkle, RightToe, F::RightFoot, FORWARD, Segment::Foot),
    ]
};

/// Position of every landmark at one instant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose([Vector3<f32>; Landmark::COUNT]);

impl Index<Landmark> for Pose {
    type Output = Vector3<f32>;

    fn index(&self, landmark: Landmark) -> &Vector3<f32> {
        &self.0[landmark.index()]
    }
}

impl Pose {
    fn translated(mut self, by: Vector3<f32>) -> Pose {
        for p in self.0.iter_mut() {
            *p += by;
        }
        self
    }
}

/// Landmark positions for every pulse of the simulated walk.
#[derive(Clone, Debug)]
pub struct SegmentTrajectories {
    poses: Vec<Pose>,
    samples_per_cycle: usize,
}

impl SegmentTrajectories {
    pub fn len(&self) -> usize {
        self.poses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    pub fn samples_per_cycle(&self) -> usize {
        self.samples_per_cycle
    }

    pub fn pose(&self, pulse: usize) -> &Pose {
        &self.poses[pulse]
    }

    pub fn poses(&self) -> &[Pose] {
        &self.poses
    }

    pub fn position(&self, landmark: Landmark, pulse: usize) -> Vector3<f32> {
        self.poses[pulse][landmark]
    }

    pub fn trajectory(&self, landmark: Landmark) -> Vec<Vector3<f32>> {
        self.poses.iter().map(|pose| pose[landmark]).collect()
    }
}

fn joint_rotation(joint: Joint, curves: &JointAngleCurves, i: usize) -> Matrix3<f32> {
    match joint {
        Joint::Pelvis => compose_rotation(
            -curves[JointCurve::PelvisLeftRight][i].to_radians(),
            0.,
            curves[JointCurve::PelvisTorsion][i].to_radians(),
        ),
        Joint::Spine => compose_rotation(
            0.,
            curves[JointCurve::PelvisForwardBackward][i].to_radians(),
            curves[JointCurve::ThoraxTorsion][i].to_radians(),
        ),
        Joint::Flex { curve, side, sign } => pitch(sign * curves.at(curve, side, i).to_radians()),
    }
}

// Skeleton relative to the spine origin at sample i of the cycle.
fn body_pose(curves: &JointAngleCurves, lengths: &SegmentLengths, i: usize) -> Pose {
    let mut frames = [Matrix3::identity(); FRAME_COUNT];
    for link in FRAMES.iter() {
        let local = joint_rotation(link.joint, curves, i);
        frames[link.frame as usize] = match link.parent {
            Some(parent) => frames[parent as usize] * local,
            None => local,
        };
    }

    let mut pose = [Vector3::zeros(); Landmark::COUNT];
    for b in BONES.iter() {
        let offset = frames[b.frame as usize] * (b.direction * lengths[b.length]);
        pose[b.child.index()] = pose[b.parent.index()] + offset;
    }

    Pose(pose)
}

/**
Builds the landmark trajectories for `timing.total_cycles` cycles.

The torso translations move the whole skeleton. With `forward_motion` the body also advances
by `relative_cycle_length / samples_per_cycle` every sample, so each cycle starts exactly one
cycle length ahead of the previous one. Without it the walk happens on a treadmill and every
cycle repeats the first.
*/
pub fn build_segments(
    curves: &JointAngleCurves,
    lengths: &SegmentLengths,
    timing: &CycleTiming,
    forward_motion: bool,
) -> Result<SegmentTrajectories> {
    let n = timing.samples_per_cycle;
    for c in JointCurve::ALL {
        if curves[c].len() != n {
            return Err(SimError::ArityMismatch {
                what: "joint curve",
                expected: n,
                actual: curves[c].len(),
            });
        }
    }

    let step = if forward_motion {
        timing.relative_cycle_length / n as f32
    } else {
        0.
    };

    let cycle: Vec<Pose> = (0..n)
        .map(|i| {
            let sway = Vector3::new(
                curves[JointCurve::ForwardTranslation][i] + step * i as f32,
                curves[JointCurve::LateralTranslation][i],
                curves[JointCurve::VerticalTranslation][i],
            );
            body_pose(curves, lengths, i).translated(sway)
        })
        .collect();

    let advance = step * n as f32;
    let poses = (0..timing.total_cycles)
        .flat_map(|c| {
            let shift = Vector3::new(advance * c as f32, 0., 0.);
            cycle.iter().map(move |pose| pose.translated(shift))
        })
        .collect::<Vec<_>>();

    debug!(
        pulses = poses.len(),
        cycles = timing.total_cycles,
        forward_motion,
        "built segment trajectories"
    );

    Ok(SegmentTrajectories {
        poses,
        samples_per_cycle: n,
    })
}

/// Runs the gait model end to end: timing, curves, lengths and trajectories.
pub fn generate_segments(
    params: &GaitParameters,
) -> Result<(SegmentTrajectories, SegmentLengths, CycleTiming)> {
    let timing = CycleTiming::new(params)?;
    let lengths = SegmentLengths::new(params.height)?;
    let curves = JointAngleCurves::synthesize(params.relative_velocity, params.gait()?, &timing)?;
    let segments = build_segments(&curves, &lengths, &timing, params.forward_motion)?;
    Ok((segments, lengths, timing))
}
