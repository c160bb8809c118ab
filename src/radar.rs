use std::{collections::BTreeSet, f64::consts::PI};

use nalgebra::Vector3;
use ndarray::{Array1, Array2, Axis};
use num::complex::Complex32;
use tracing::{debug, trace, warn};

use crate::{
    body::SegmentLengths,
    config::ScatteringConfig,
    error::{require_positive, Result, SimError},
    helper::decibels_or_else,
    helper_traits::SphericalFunction,
    kinematics::SegmentTrajectories,
    scene::{EllipsoidTarget, Scene},
};

const c: f32 = 299_792_458.0;

pub const SPEED_OF_LIGHT: f32 = c;

/// A stationary monostatic radar sampling one complex value per range bin per pulse.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Radar {
    pub pos: Vector3<f32>,
    // Carrier wavelength, meters
    pub wavelength: f32,
    // Width of one range bin, meters
    pub range_resolution: f32,
}

impl Radar {
    pub fn new(pos: Vector3<f32>, wavelength: f32, range_resolution: f32) -> Result<Radar> {
        if !pos.iter().all(|x| x.is_finite()) {
            return Err(SimError::invalid(
                "radar_location",
                pos.norm(),
                "coordinates must be finite",
            ));
        }
        Ok(Radar {
            pos,
            wavelength: require_positive("wavelength", wavelength)?,
            range_resolution: require_positive("range_resolution", range_resolution)?,
        })
    }

    // Enough bins to cover twice the distance to the origin.
    pub fn range_bins(&self) -> usize {
        (2. * self.pos.norm() as f64 / self.range_resolution as f64).round_ties_even() as usize
    }

    // Bin a range falls into. Not bounds checked.
    pub fn range_bin(&self, range: f32) -> i64 {
        (range / self.range_resolution).floor() as i64
    }
}

/// The complex baseband return of one scatterer at one pulse.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Echo {
    pub value: Complex32,
    pub range: f32,
    // Angles the ellipsoid was evaluated at, radians
    pub azimuth: f32,
    pub elevation: f32,
}

/**
Scattered return of an ellipsoidal target.

The elevation is the angle between the line of sight (target to radar) and the long axis of
the ellipsoid. The azimuth is measured in the horizontal plane from the lateral offset. The
magnitude is the square root of the RCS and the phase is the two way path in wavelengths,
```text
s = sqrt(σ) exp(-j 4π R / λ)
```
There is no propagation loss or antenna pattern.

When the radar is directly above or below the target the azimuth is undefined and the
return is NaN.
*/
pub fn compute_return(radar: &Radar, target: &EllipsoidTarget) -> Echo {
    let los = radar.pos - target.pos;
    let range = los.norm();

    let cos_el = los.dot(&target.aspect) / (los.norm() * target.aspect.norm());
    let elevation = cos_el.clamp(-1., 1.).acos();

    let horizontal = (los.x * los.x + los.y * los.y).sqrt();
    let azimuth = (los.y / horizontal).clamp(-1., 1.).asin();

    let rcs = target.shape.lookup(azimuth, elevation);
    // Two way phase, reduced modulo 2π in f64
    let phase = (-4. * PI * range as f64 / radar.wavelength as f64).rem_euclid(2. * PI);
    let value = Complex32::from_polar(rcs.sqrt(), phase as f32);

    Echo {
        value,
        range,
        azimuth,
        elevation,
    }
}

/// Complex returns indexed by `[range bin, pulse]`.
#[derive(Clone, Debug, PartialEq)]
pub struct RangeTimeMatrix(Array2<Complex32>);

impl RangeTimeMatrix {
    pub fn zeros(range_bins: usize, pulses: usize) -> RangeTimeMatrix {
        RangeTimeMatrix(Array2::zeros((range_bins, pulses)))
    }

    pub fn range_bins(&self) -> usize {
        self.0.nrows()
    }

    pub fn pulses(&self) -> usize {
        self.0.ncols()
    }

    pub fn data(&self) -> &Array2<Complex32> {
        &self.0
    }

    // Coherent sum over range, one value per pulse.
    pub fn squeeze_range(&self) -> Array1<Complex32> {
        self.0.sum_axis(Axis(0))
    }

    /**
    Range-summed returns shifted by their mean magnitude and scaled by the spread of the
    shifted magnitudes,
    ```text
    p = (s - mean|s|) / std|s - mean|s||
    ```
    The result stays complex so the phase history survives. A profile with no spread is
    only shifted.
    */
    pub fn standardized_profile(&self) -> Array1<Complex32> {
        let s = self.squeeze_range();
        let mean = s.mapv(|x| x.norm()).mean().unwrap_or(0.);
        let shifted = s.mapv(|x| x - mean);
        let std = shifted.mapv(|x| x.norm()).std(0.);

        if std > 0. {
            shifted.mapv(|x| x / std)
        } else {
            shifted
        }
    }

    // Power of each cell in dB. Empty cells get `floor`.
    pub fn power_db(&self, floor: f32) -> Array2<f32> {
        self.0.mapv(|x| decibels_or_else(x.norm_sqr(), floor))
    }

    // First and last range bin holding any energy.
    pub fn occupied_bins(&self) -> Option<(usize, usize)> {
        let occupied: Vec<usize> = self
            .0
            .axis_iter(Axis(0))
            .enumerate()
            .filter(|(_, row)| row.iter().any(|x| x.norm_sqr() > 0.))
            .map(|(i, _)| i)
            .collect();
        Some((*occupied.first()?, *occupied.last()?))
    }
}

/// Accumulates every enabled body part into one range bin per pulse.
///
/// Parts sharing a bin add coherently. A part outside the matrix is an error, the matrix is
/// never clipped.
pub fn simulate_radar(
    segments: &SegmentTrajectories,
    lengths: &SegmentLengths,
    radar: &Radar,
    parts: &ScatteringConfig,
) -> Result<RangeTimeMatrix> {
    let bins = radar.range_bins();
    let mut matrix = RangeTimeMatrix::zeros(bins, segments.len());
    let mut no_azimuth = BTreeSet::new();

    for (pulse, pose) in segments.poses().iter().enumerate() {
        let scene = Scene::from_pose(pose, lengths, parts.enabled_parts());
        for target in scene.targets() {
            let echo = compute_return(radar, target);
            let bin = radar.range_bin(echo.range);
            if !echo.range.is_finite() || bin < 0 || bin >= bins as i64 {
                return Err(SimError::IndexOutOfRange {
                    part: target.part,
                    pulse,
                    bin,
                    bins,
                });
            }
            if echo.azimuth.is_nan() {
                no_azimuth.insert(target.part);
            }
            trace!(pulse, part = ?target.part, bin, azimuth = echo.azimuth, "echo");
            matrix.0[[bin as usize, pulse]] += echo.value;
        }
    }

    if !no_azimuth.is_empty() {
        warn!(parts = ?no_azimuth, "azimuth undefined, radar straight above or below these parts");
    }

    debug!(
        range_bins = matrix.range_bins(),
        pulses = matrix.pulses(),
        parts = parts.enabled_parts().count(),
        "simulated range-time matrix"
    );

    Ok(matrix)
}

#[cfg(test)]
mod test {
    use approx::assert_relative_eq;
    use nalgebra::Vector3;
    use ndarray::Array1;
    use num::complex::{Complex32, Complex64};

    use crate::{
        body::{BodyPart, SegmentLengths},
        config::ScatteringConfig,
        ellipsoid::{ellipsoid_rcs, Ellipsoid},
        error::SimError,
        gait::{curves::JointAngleCurves, CycleTiming, GaitParameters},
        kinematics::{build_segments, generate_segments},
        scene::EllipsoidTarget,
    };

    use super::{compute_return, simulate_radar, Radar, RangeTimeMatrix};

    fn reference_walk() -> GaitParameters {
        GaitParameters {
            height: 1.7,
            relative_velocity: 1.0,
            gait: None,
            forward_motion: false,
            sample_rate: 100.,
            duration: 5.,
        }
    }

    fn reference_radar() -> Radar {
        Radar::new(Vector3::new(0., 10., 0.), 0.0125, 0.01).unwrap()
    }

    #[test]
    fn radar_rejects_bad_values() {
        assert!(Radar::new(Vector3::new(0., 10., 0.), 0., 0.01).is_err());
        assert!(Radar::new(Vector3::new(0., 10., 0.), 0.0125, -1.).is_err());
        assert!(Radar::new(Vector3::new(f32::NAN, 10., 0.), 0.0125, 0.01).is_err());
    }

    #[test]
    fn magnitude_is_root_rcs() {
        let radar = Radar::new(Vector3::new(0., 1000., 0.), 0.0125, 0.01).unwrap();
        let shape = Ellipsoid::new(0.1, 0.1, 0.3).unwrap();
        let target = EllipsoidTarget {
            part: BodyPart::Torso,
            pos: Vector3::new(0., 0., 1.),
            aspect: Vector3::new(0., 0., 0.5),
            shape,
        };
        let echo = compute_return(&radar, &target);

        let rcs = ellipsoid_rcs(0.1, 0.1, 0.3, echo.azimuth, echo.elevation);
        assert_relative_eq!(echo.value.norm(), rcs.sqrt(), max_relative = 1e-5);
        assert_relative_eq!(echo.range, (1000f32 * 1000. + 1.).sqrt());
        // Nearly broadside
        assert_relative_eq!(echo.elevation, std::f32::consts::FRAC_PI_2, epsilon = 1e-2);
    }

    #[test]
    fn phase_follows_two_way_range() {
        let radar = Radar::new(Vector3::new(0., 2., 0.), 0.1, 0.01).unwrap();
        let target = EllipsoidTarget {
            part: BodyPart::Head,
            pos: Vector3::zeros(),
            aspect: Vector3::new(0., 0., 0.1),
            shape: Ellipsoid::new(0.1, 0.1, 0.1).unwrap(),
        };
        // 4π·2/0.1 is a whole number of turns
        let echo = compute_return(&radar, &target);
        assert_relative_eq!(echo.value.im, 0., epsilon = 1e-3);
        assert!(echo.value.re > 0.);
    }

    #[test]
    fn target_straight_below_has_no_azimuth() {
        let radar = Radar::new(Vector3::new(0., 0., 5.), 0.0125, 0.01).unwrap();
        let target = EllipsoidTarget {
            part: BodyPart::Head,
            pos: Vector3::zeros(),
            aspect: Vector3::new(0., 0., 0.1),
            shape: Ellipsoid::new(0.1, 0.1, 0.1).unwrap(),
        };
        let echo = compute_return(&radar, &target);
        assert!(echo.azimuth.is_nan());
        assert!(echo.value.re.is_nan());
    }

    #[test]
    fn overhead_radar_poisons_only_the_parts_below_it() {
        let n = 4;
        let curves = JointAngleCurves {
            curves: std::array::from_fn(|_| Array1::zeros(n)),
        };
        let lengths = SegmentLengths::new(1.8).unwrap();
        let timing = CycleTiming::from_counts(1., 1.8, n, 3).unwrap();
        let segments = build_segments(&curves, &lengths, &timing, false).unwrap();
        let radar = Radar::new(Vector3::new(0., 0., 10.), 0.0125, 0.01).unwrap();

        let matrix =
            simulate_radar(&segments, &lengths, &radar, &ScatteringConfig::complete_human()).unwrap();

        // Head and torso sit on the vertical through the radar
        let nan_cells = matrix.data().iter().filter(|x| x.re.is_nan()).count();
        assert_eq!(nan_cells, 2 * matrix.pulses());
    }

    #[test]
    fn no_parts_gives_zeros() {
        let (segments, lengths, timing) = generate_segments(&reference_walk()).unwrap();
        let matrix = simulate_radar(&segments, &lengths, &reference_radar(), &ScatteringConfig::none()).unwrap();

        assert_eq!(matrix.range_bins(), 2000);
        assert_eq!(matrix.pulses(), timing.total_pulses());
        assert!(matrix.data().iter().all(|x| *x == Complex32::new(0., 0.)));
        assert_eq!(matrix.occupied_bins(), None);
    }

    #[test]
    fn single_part_matches_compute_return() {
        let (segments, lengths, _) = generate_segments(&reference_walk()).unwrap();
        let radar = reference_radar();
        let parts = ScatteringConfig::only(&[BodyPart::LeftFoot]);
        let matrix = simulate_radar(&segments, &lengths, &radar, &parts).unwrap();

        for (pulse, pose) in segments.poses().iter().enumerate() {
            let target = EllipsoidTarget::from_pose(BodyPart::LeftFoot, pose, &lengths);
            let echo = compute_return(&radar, &target);
            let bin = radar.range_bin(echo.range) as usize;

            let column = matrix.data().column(pulse);
            for (b, v) in column.iter().enumerate() {
                if b == bin {
                    assert_eq!(*v, echo.value);
                } else {
                    assert_eq!(*v, Complex32::new(0., 0.));
                }
            }
        }
    }

    #[test]
    fn reference_scenario() {
        let (segments, lengths, timing) = generate_segments(&reference_walk()).unwrap();
        let matrix = simulate_radar(
            &segments,
            &lengths,
            &reference_radar(),
            &ScatteringConfig::complete_human(),
        )
        .unwrap();

        assert_eq!(timing.total_pulses(), 648);
        assert_eq!((matrix.range_bins(), matrix.pulses()), (2000, 648));

        let (first, last) = matrix.occupied_bins().unwrap();
        // The body stands about 10 m away
        assert!(first > 950 && last < 1050);
        assert!(matrix.data().iter().all(|x| x.re.is_finite() && x.im.is_finite()));

        let profile = matrix.standardized_profile();
        assert_eq!(profile.len(), 648);
        assert_relative_eq!(profile.mapv(|x| x.norm()).std(0.), 1., epsilon = 1e-3);
    }

    #[test]
    fn parts_beyond_the_matrix_fail() {
        let (segments, lengths, _) = generate_segments(&reference_walk()).unwrap();
        let radar = Radar::new(Vector3::new(0., 0.3, 0.), 0.0125, 0.01).unwrap();
        let result = simulate_radar(&segments, &lengths, &radar, &ScatteringConfig::complete_human());

        match result {
            Err(SimError::IndexOutOfRange { pulse, bins, bin, .. }) => {
                assert_eq!(pulse, 0);
                assert_eq!(bins, 60);
                assert!(bin >= 60);
            }
            other => panic!("expected an out of range bin, got {:?}", other),
        }
    }

    #[test]
    fn power_and_profile_helpers() {
        let mut m = RangeTimeMatrix::zeros(3, 2);
        m.0[[1, 0]] = Complex32::new(10., 0.);
        m.0[[2, 0]] = Complex32::new(0., 10.);
        m.0[[1, 1]] = Complex32::new(1., 0.);

        let squeezed = m.squeeze_range();
        assert_eq!(squeezed[0], Complex32::new(10., 10.));

        let db = m.power_db(-100.);
        assert_relative_eq!(db[[1, 0]], 20.);
        assert_relative_eq!(db[[0, 0]], -100.);
        assert_relative_eq!(db[[1, 1]], 0.);
        assert_eq!(m.occupied_bins(), Some((1, 2)));
    }

    #[test]
    fn standardized_profile_keeps_phase() {
        let mut m = RangeTimeMatrix::zeros(1, 3);
        m.0[[0, 0]] = Complex32::new(1., 0.);
        m.0[[0, 1]] = Complex32::new(-1., 0.);
        m.0[[0, 2]] = Complex32::new(0., 3.);

        let profile = m.standardized_profile();
        // Equal magnitude, opposite phase
        assert!((profile[0] - profile[1]).norm() > 1.);
        assert_relative_eq!(profile[0], Complex32::new(-0.57185, 0.), epsilon = 1e-4);
        assert_relative_eq!(profile[1], Complex32::new(-2.28740, 0.), epsilon = 1e-4);
        assert_relative_eq!(profile[2], Complex32::new(-1.42963, 2.57333), epsilon = 1e-4);
    }

    #[test]
    fn flat_profile_is_only_shifted() {
        let mut m = RangeTimeMatrix::zeros(2, 2);
        m.0[[0, 0]] = Complex32::new(2., 0.);
        m.0[[1, 1]] = Complex32::new(2., 0.);

        let profile = m.standardized_profile();
        assert_eq!(profile[0], Complex32::new(0., 0.));
        assert_eq!(profile[1], Complex32::new(0., 0.));
    }

    #[test]
    fn phase_is_accurate_far_away() {
        let radar = Radar::new(Vector3::new(3., 9.7, 0.4), 0.0125, 0.01).unwrap();
        let target = EllipsoidTarget {
            part: BodyPart::Head,
            pos: Vector3::zeros(),
            aspect: Vector3::new(0., 0., 0.1),
            shape: Ellipsoid::new(0.1, 0.1, 0.1).unwrap(),
        };
        let echo = compute_return(&radar, &target);

        let magnitude = echo.value.norm() as f64;
        let phase = -4. * std::f64::consts::PI * echo.range as f64 / 0.0125f32 as f64;
        let want = Complex64::from_polar(magnitude, phase);
        assert_relative_eq!(echo.value.re as f64, want.re, epsilon = 1e-6);
        assert_relative_eq!(echo.value.im as f64, want.im, epsilon = 1e-6);
    }
}
