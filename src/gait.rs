use ndarray::Array1;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    body::Segment,
    error::{require_positive, Result, SimError},
};

pub mod curves;

pub const MAX_RELATIVE_VELOCITY: f32 = 3.;

// Gait classes switch at these relative velocities. The lower bound of each class is inclusive.
const GAIT_B_FROM: f32 = 0.5;
const GAIT_C_FROM: f32 = 1.3;

/// Parametric regime of the control point tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gait {
    /// Slow walk, `rv < 0.5`. Amplitudes scale with velocity.
    A,
    /// Normal walk, `0.5 <= rv < 1.3`.
    B,
    /// Fast walk, `1.3 <= rv <= 3`. Interpolates from the normal walk towards the limit.
    C,
}

pub fn check_relative_velocity(rv: f32) -> Result<f32> {
    if !rv.is_finite() || rv <= 0. {
        Err(SimError::invalid("relative_velocity", rv, "velocity must be positive"))
    } else if rv > MAX_RELATIVE_VELOCITY {
        Err(SimError::invalid(
            "relative_velocity",
            rv,
            "relative velocity must be at most 3",
        ))
    } else {
        Ok(rv)
    }
}

/// Picks the gait class matching a relative velocity.
pub fn resolve_gait(rv: f32) -> Result<Gait> {
    let rv = check_relative_velocity(rv)?;
    Ok(if rv < GAIT_B_FROM {
        Gait::A
    } else if rv < GAIT_C_FROM {
        Gait::B
    } else {
        Gait::C
    })
}

/**
Inputs of the walking model of [1]. Speed is given as a relative velocity, the speed
divided by the hip joint height, valid for `0 < rv <= 3`.

[1] R. Boulic, N. M. Thalmann and D. Thalmann, "A global human walking model with
    real-time kinematic personification", The Visual Computer 6, 344-358, 1990.
*/
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GaitParameters {
    // Meters
    pub height: f32,
    pub relative_velocity: f32,
    // Derived from the velocity when absent
    pub gait: Option<Gait>,
    pub forward_motion: bool,
    // Hz
    pub sample_rate: f32,
    // Seconds
    pub duration: f32,
}

impl GaitParameters {
    pub fn validate(&self) -> Result<()> {
        require_positive("height", self.height)?;
        check_relative_velocity(self.relative_velocity)?;
        require_positive("sample_rate", self.sample_rate)?;
        require_positive("duration", self.duration)?;
        Ok(())
    }

    pub fn gait(&self) -> Result<Gait> {
        match self.gait {
            Some(gait) => {
                check_relative_velocity(self.relative_velocity)?;
                Ok(gait)
            }
            None => resolve_gait(self.relative_velocity),
        }
    }
}

/// Scalars derived once per request that fix the length of everything downstream.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CycleTiming {
    /// Distance covered in one cycle, relative to the hip joint height.
    pub relative_cycle_length: f32,
    /// Duration of one cycle in relative time units, `relative_cycle_length / rv`.
    pub relative_cycle_duration: f32,
    /// Real duration of one cycle in seconds.
    pub cycle_duration: f32,
    /// Duration of the support phase, in the same units as `relative_cycle_duration`.
    pub support_duration: f32,
    /// Fraction of the cycle one foot is on the ground.
    pub support_fraction: f32,
    pub total_cycles: usize,
    /// Always even, so that left and right sides can be shifted by exactly half a cycle.
    pub samples_per_cycle: usize,
}

impl CycleTiming {
    /// Derives the sample and cycle counts from the duration and sample rate.
    pub fn new(params: &GaitParameters) -> Result<CycleTiming> {
        params.validate()?;

        let mut timing = Self::spatial(params.relative_velocity, params.height);

        let cycles = (params.duration as f64 / timing.cycle_duration as f64).ceil();
        let total_time = timing.cycle_duration as f64 * cycles;
        let pulses = (total_time * params.sample_rate as f64).round_ties_even();
        let mut samples = (pulses / cycles).round_ties_even() as usize;
        samples += samples % 2;

        if samples < 2 {
            return Err(SimError::invalid(
                "sample_rate",
                params.sample_rate,
                "too low to sample a single gait cycle",
            ));
        }

        timing.total_cycles = cycles as usize;
        timing.samples_per_cycle = samples;

        debug!(
            cycles = timing.total_cycles,
            samples_per_cycle = timing.samples_per_cycle,
            cycle_duration = timing.cycle_duration,
            "derived cycle timing"
        );

        Ok(timing)
    }

    /// Uses sample and cycle counts that were already decided by the caller.
    pub fn from_counts(
        rv: f32,
        height: f32,
        samples_per_cycle: usize,
        cycles: usize,
    ) -> Result<CycleTiming> {
        check_relative_velocity(rv)?;
        require_positive("height", height)?;
        if samples_per_cycle < 2 || samples_per_cycle % 2 != 0 {
            return Err(SimError::invalid(
                "samples_per_cycle",
                samples_per_cycle as f32,
                "must be even and at least 2",
            ));
        }
        if cycles == 0 {
            return Err(SimError::invalid("cycles", 0., "at least one cycle is needed"));
        }

        let mut timing = Self::spatial(rv, height);
        timing.total_cycles = cycles;
        timing.samples_per_cycle = samples_per_cycle;
        Ok(timing)
    }

    // Everything that depends only on velocity and height.
    fn spatial(rv: f32, height: f32) -> CycleTiming {
        let leg = (Segment::UpperLeg.ratio() + Segment::LowerLeg.ratio()) * height;

        let relative_cycle_length = 1.346 * rv.sqrt();
        let relative_cycle_duration = relative_cycle_length / rv;
        let support_duration = 0.752 * relative_cycle_duration - 0.143;

        CycleTiming {
            relative_cycle_length,
            relative_cycle_duration,
            cycle_duration: relative_cycle_length / (rv * leg),
            support_duration,
            support_fraction: support_duration / relative_cycle_duration,
            total_cycles: 0,
            samples_per_cycle: 0,
        }
    }

    pub fn total_pulses(&self) -> usize {
        self.samples_per_cycle * self.total_cycles
    }

    pub fn total_duration(&self) -> f32 {
        self.cycle_duration * self.total_cycles as f32
    }

    // Phase of each sample within a cycle, i/n for i in 0..n.
    pub fn phases(&self) -> Array1<f32> {
        let n = self.samples_per_cycle;
        (0..n).map(|i| i as f32 / n as f32).collect()
    }
}
