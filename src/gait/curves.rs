// Angles are in degrees, translations in meters.

use std::{f32::consts::PI, ops::Index};

use ndarray::Array1;
use tracing::debug;

use crate::{
    body::Side,
    error::{Result, SimError},
    interpolate::PeriodicCurve,
};

use super::{check_relative_velocity, CycleTiming, Gait};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JointCurve {
    VerticalTranslation,
    LateralTranslation,
    ForwardTranslation,
    // Pelvis tilt forward/backward, carried by the spine
    PelvisForwardBackward,
    // Pelvis falling towards the swinging leg
    PelvisLeftRight,
    PelvisTorsion,
    HipFlex,
    KneeFlex,
    AnkleFlex,
    ThoraxTorsion,
    ShoulderFlex,
    ElbowFlex,
}

impl JointCurve {
    pub const COUNT: usize = 12;

    pub const ALL: [JointCurve; JointCurve::COUNT] = [
        JointCurve::VerticalTranslation,
        JointCurve::LateralTranslation,
        JointCurve::ForwardTranslation,
        JointCurve::PelvisForwardBackward,
        JointCurve::PelvisLeftRight,
        JointCurve::PelvisTorsion,
        JointCurve::HipFlex,
        JointCurve::KneeFlex,
        JointCurve::AnkleFlex,
        JointCurve::ThoraxTorsion,
        JointCurve::ShoulderFlex,
        JointCurve::ElbowFlex,
    ];
}

/// One cycle of every joint curve, sampled at the phases of [`CycleTiming::phases`].
/// The curves describe the right side. The left side runs half a cycle out of phase.
#[derive(Clone, Debug)]
pub struct JointAngleCurves {
    pub(crate) curves: [Array1<f32>; JointCurve::COUNT],
}

impl Index<JointCurve> for JointAngleCurves {
    type Output = Array1<f32>;

    fn index(&self, curve: JointCurve) -> &Array1<f32> {
        &self.curves[curve as usize]
    }
}

impl JointAngleCurves {
    pub fn synthesize(rv: f32, gait: Gait, timing: &CycleTiming) -> Result<JointAngleCurves> {
        let rv = check_relative_velocity(rv)?;
        let n = timing.samples_per_cycle;
        if n < 2 {
            return Err(SimError::invalid(
                "samples_per_cycle",
                n as f32,
                "must be even and at least 2",
            ));
        }
        let t = timing.phases();
        let support = timing.support_fraction;

        let curve = |which: JointCurve| -> Result<Array1<f32>> {
            use JointCurve::*;
            Ok(match which {
                VerticalTranslation => vertical_translation(rv, &t),
                LateralTranslation => lateral_translation(rv, gait, &t),
                ForwardTranslation => forward_translation(rv, gait, support, &t),
                PelvisForwardBackward => pelvis_forward_backward(rv, gait, &t),
                PelvisLeftRight => pelvis_left_right(rv, &t),
                PelvisTorsion => t.mapv(|t| -4. * rv * (2. * PI * t).cos()),
                HipFlex => PeriodicCurve::new(&hip_points(rv, gait))?.sample(n),
                KneeFlex => PeriodicCurve::new(&knee_points(rv, gait))?.sample(n),
                AnkleFlex => PeriodicCurve::new(&ankle_points(rv, gait, support))?.sample(n),
                ThoraxTorsion => PeriodicCurve::new(&thorax_points(rv))?.sample(n),
                ShoulderFlex => {
                    let a = 9.88 * rv;
                    t.mapv(|t| 3. - a / 2. - a * (2. * PI * t).cos())
                }
                ElbowFlex => PeriodicCurve::new(&elbow_points(rv, gait))?.sample(n),
            })
        };

        let curves = [
            curve(JointCurve::VerticalTranslation)?,
            curve(JointCurve::LateralTranslation)?,
            curve(JointCurve::ForwardTranslation)?,
            curve(JointCurve::PelvisForwardBackward)?,
            curve(JointCurve::PelvisLeftRight)?,
            curve(JointCurve::PelvisTorsion)?,
            curve(JointCurve::HipFlex)?,
            curve(JointCurve::KneeFlex)?,
            curve(JointCurve::AnkleFlex)?,
            curve(JointCurve::ThoraxTorsion)?,
            curve(JointCurve::ShoulderFlex)?,
            curve(JointCurve::ElbowFlex)?,
        ];

        debug!(?gait, rv, samples = n, "synthesized joint curves");

        Ok(JointAngleCurves { curves })
    }

    pub fn samples_per_cycle(&self) -> usize {
        self.curves[0].len()
    }

    // Value of a limb curve at sample i for one side. The left side reads the curve half a
    // cycle later.
    pub fn at(&self, curve: JointCurve, side: Side, i: usize) -> f32 {
        let values = &self[curve];
        match side {
            Side::Right => values[i],
            Side::Left => values[(i + values.len() / 2) % values.len()],
        }
    }

    pub fn opposite_phase(&self, curve: JointCurve) -> Array1<f32> {
        (0..self.samples_per_cycle())
            .map(|i| self.at(curve, Side::Left, i))
            .collect()
    }
}

// Progress through the fast walk regime, 0 at rv = 1.3 and 1 at rv = 3.
fn fast(rv: f32) -> f32 {
    (rv - 1.3) / 1.7
}

fn vertical_translation(rv: f32, t: &Array1<f32>) -> Array1<f32> {
    let a = 0.015 * rv;
    t.mapv(|t| -a + a * (2. * PI * (2. * t - 0.35)).sin())
}

fn lateral_translation(rv: f32, gait: Gait, t: &Array1<f32>) -> Array1<f32> {
    let a = match gait {
        Gait::A => -0.128 * rv * rv + 0.128 * rv,
        Gait::B | Gait::C => -0.032,
    };
    t.mapv(|t| a * (2. * PI * (t - 0.1)).sin())
}

fn forward_translation(rv: f32, gait: Gait, support: f32, t: &Array1<f32>) -> Array1<f32> {
    let a = match gait {
        Gait::A => -0.084 * rv * rv + 0.084 * rv,
        Gait::B | Gait::C => -0.021,
    };
    let φ = 0.625 - support;
    t.mapv(|t| a * (2. * PI * (2. * t + 2. * φ)).sin())
}

fn pelvis_forward_backward(rv: f32, gait: Gait, t: &Array1<f32>) -> Array1<f32> {
    let a = match gait {
        Gait::A => -8. * rv * rv + 8. * rv,
        Gait::B | Gait::C => 2.,
    };
    t.mapv(|t| -a + a * (2. * PI * (2. * t - 0.1)).sin())
}

// Four cosine arcs, split at fixed fractions of the cycle. The split points are sample
// indices, rounded half to even.
fn pelvis_left_right(rv: f32, t: &Array1<f32>) -> Array1<f32> {
    let a = 0.01 * rv;
    let n = t.len();
    let split = |frac: f64| ((n as f64 * frac).round_ties_even() as usize).min(n);
    let (s1, s2, s3) = (split(0.15), split(0.5), split(0.65));

    t.iter()
        .enumerate()
        .map(|(i, &t)| {
            if i < s1 {
                -a + a * (2. * PI * (10. * t / 3.)).cos()
            } else if i < s2 {
                -a - a * (2. * PI * (10. * (t - 0.15) / 7.)).cos()
            } else if i < s3 {
                a - a * (2. * PI * (10. * (t - 0.5) / 3.)).cos()
            } else {
                a + a * (2. * PI * (10. * (t - 0.65) / 7.)).cos()
            }
        })
        .collect()
}

fn hip_points(rv: f32, gait: Gait) -> [(f32, f32); 3] {
    match gait {
        Gait::A => [(-0.1, 50. * rv), (0.5, -30. * rv), (0.9, 50. * rv)],
        Gait::B => [(-0.1, 25.), (0.5, -15.), (0.9, 25.)],
        Gait::C => {
            let f = fast(rv);
            [(0.2 * f - 0.1, 5. * f + 25.), (0.5, -15.), (0.9, 6. * f + 25.)]
        }
    }
}

fn knee_points(rv: f32, gait: Gait) -> [(f32, f32); 4] {
    match gait {
        Gait::A => [(0.17, 3.), (0.4, 3.), (0.75, 140. * rv), (1., 3.)],
        Gait::B => [(0.17, 3.), (0.4, 3.), (0.75, 70.), (1., 3.)],
        Gait::C => {
            let f = fast(rv);
            [
                (-0.05 * f + 0.17, 22. * f + 3.),
                (0.4, 3.),
                (-0.05 * f + 0.75, -5. * f + 70.),
                (-0.03 * f + 1., 3. * f + 3.),
            ]
        }
    }
}

// The fourth point sits at the end of the support phase.
fn ankle_points(rv: f32, gait: Gait, support: f32) -> [(f32, f32); 5] {
    match gait {
        Gait::A => [
            (0., -3.),
            (0.08, -30. * rv - 3.),
            (0.5, 22. * rv - 3.),
            (support, -34. * rv - 3.),
            (0.85, -3.),
        ],
        Gait::B => [
            (0., -3.),
            (0.08, -18.),
            (0.5, 8.),
            (support, -20.),
            (0.85, -3.),
        ],
        Gait::C => {
            let f = fast(rv);
            [
                (0., 5. * f - 3.),
                (0.08, 4. * f - 18.),
                (-0.1 * f + 0.5, -3. * f + 8.),
                (support, -8. * f - 20.),
                (0.85, 5. * f - 3.),
            ]
        }
    }
}

fn thorax_points(rv: f32) -> [(f32, f32); 4] {
    [
        (0.1, 4. / 3. * rv),
        (0.4, -4.5 / 3. * rv),
        (0.6, -4. / 3. * rv),
        (0.9, 4.5 / 3. * rv),
    ]
}

fn elbow_points(rv: f32, gait: Gait) -> [(f32, f32); 3] {
    match gait {
        Gait::A => [(0.05, 6. * rv + 3.), (0.5, 34. * rv + 3.), (0.9, 10. * rv + 3.)],
        Gait::B => {
            let f = (rv - 0.5) / 0.8;
            [(0.05, 8. * f + 6.), (0.01 * f + 0.5, 24. * f + 20.), (0.9, 9. * f + 8.)]
        }
        Gait::C => {
            let f = fast(rv);
            [
                (0.05, -6. * f + 14.),
                (0.04 * f + 0.51, 26. * f + 44.),
                (-0.1 * f + 0.9, -6. * f + 17.),
            ]
        }
    }
}
