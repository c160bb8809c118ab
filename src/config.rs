use std::{collections::BTreeMap, fs::File, io::BufReader, path::Path};

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::{
    body::BodyPart,
    error::{Result, SimError},
    gait::{Gait, GaitParameters},
    helper::wavelength,
    radar::Radar,
};

/// Which body parts scatter. Serialized as a map from part name to flag, absent parts
/// are enabled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<BodyPart, bool>", into = "BTreeMap<BodyPart, bool>")]
pub struct ScatteringConfig([bool; BodyPart::COUNT]);

impl ScatteringConfig {
    pub fn complete_human() -> ScatteringConfig {
        ScatteringConfig([true; BodyPart::COUNT])
    }

    pub fn none() -> ScatteringConfig {
        ScatteringConfig([false; BodyPart::COUNT])
    }

    pub fn feet_only() -> ScatteringConfig {
        Self::only(&[BodyPart::LeftFoot, BodyPart::RightFoot])
    }

    pub fn only(parts: &[BodyPart]) -> ScatteringConfig {
        let mut config = Self::none();
        for &part in parts {
            config.set(part, true);
        }
        config
    }

    pub fn is_enabled(&self, part: BodyPart) -> bool {
        self.0[part.index()]
    }

    pub fn set(&mut self, part: BodyPart, enabled: bool) {
        self.0[part.index()] = enabled;
    }

    // In `BodyPart::ALL` order.
    pub fn enabled_parts(&self) -> impl Iterator<Item = BodyPart> + '_ {
        BodyPart::ALL.into_iter().filter(|&p| self.is_enabled(p))
    }
}

impl Default for ScatteringConfig {
    fn default() -> Self {
        Self::complete_human()
    }
}

impl From<BTreeMap<BodyPart, bool>> for ScatteringConfig {
    fn from(map: BTreeMap<BodyPart, bool>) -> Self {
        let mut config = Self::complete_human();
        for (part, enabled) in map {
            config.set(part, enabled);
        }
        config
    }
}

impl From<ScatteringConfig> for BTreeMap<BodyPart, bool> {
    fn from(config: ScatteringConfig) -> Self {
        BodyPart::ALL
            .into_iter()
            .map(|p| (p, config.is_enabled(p)))
            .collect()
    }
}

pub const DEFAULT_CARRIER_FREQUENCY: f32 = 24e9;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    // Meters
    pub height: f32,
    pub relative_velocity: f32,
    pub gait: Option<Gait>,
    pub forward_motion: bool,
    // Hz
    pub sample_rate: f32,
    // Seconds
    pub duration: f32,
    // Meters, in the walker's frame: x forward, y left, z up
    pub radar_location: [f32; 3],
    // Meters
    pub wavelength: f32,
    // Meters
    pub range_resolution: f32,
    pub body_parts: ScatteringConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            height: 1.8,
            relative_velocity: 1.0,
            gait: None,
            forward_motion: false,
            sample_rate: 100.,
            duration: 11.,
            radar_location: [0., 10., 0.],
            wavelength: wavelength(DEFAULT_CARRIER_FREQUENCY),
            range_resolution: 0.01,
            body_parts: ScatteringConfig::complete_human(),
        }
    }
}

impl SimulationConfig {
    pub fn from_json_str(s: &str) -> Result<SimulationConfig> {
        serde_json::from_str(s).map_err(|e| SimError::Config(e.to_string()))
    }

    pub fn from_json_file(path: &Path) -> Result<SimulationConfig> {
        let file = File::open(path)
            .map_err(|e| SimError::Config(format!("{}: {}", path.display(), e)))?;
        serde_json::from_reader(BufReader::new(file))
            .map_err(|e| SimError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| SimError::Config(e.to_string()))
    }

    pub fn gait_parameters(&self) -> Result<GaitParameters> {
        let params = GaitParameters {
            height: self.height,
            relative_velocity: self.relative_velocity,
            gait: self.gait,
            forward_motion: self.forward_motion,
            sample_rate: self.sample_rate,
            duration: self.duration,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn radar(&self) -> Result<Radar> {
        let [x, y, z] = self.radar_location;
        Radar::new(Vector3::new(x, y, z), self.wavelength, self.range_resolution)
    }
}
