use tracing::{debug, info_span};

use crate::{
    body::SegmentLengths,
    config::SimulationConfig,
    error::Result,
    gait::CycleTiming,
    kinematics::generate_segments,
    radar::{simulate_radar, RangeTimeMatrix},
};

/// Result of one simulated walk.
#[derive(Clone, Debug)]
pub struct SimulationOutput {
    pub matrix: RangeTimeMatrix,
    pub lengths: SegmentLengths,
    pub timing: CycleTiming,
}

/// Runs one sample from parameters to range-time matrix.
///
/// All inputs are checked before the gait is synthesized. Either the whole matrix is
/// produced or an error is returned.
pub fn simulate(config: &SimulationConfig) -> Result<SimulationOutput> {
    let params = config.gait_parameters()?;
    let radar = config.radar()?;

    let span = info_span!(
        "simulate",
        height = params.height,
        rv = params.relative_velocity,
        duration = params.duration
    );
    let _guard = span.enter();

    let (segments, lengths, timing) = generate_segments(&params)?;
    let matrix = simulate_radar(&segments, &lengths, &radar, &config.body_parts)?;

    debug!(
        pulses = timing.total_pulses(),
        range_bins = matrix.range_bins(),
        "simulation finished"
    );

    Ok(SimulationOutput {
        matrix,
        lengths,
        timing,
    })
}
