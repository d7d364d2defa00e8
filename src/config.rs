use std::fs::File;
use std::path::{Path, PathBuf};

use nalgebra::Vector3;
use serde::Deserialize;

use crate::control::pid::validate_clamp;
use crate::control::{AxisGains, Gains};
use crate::dynamics::constants::{PhysicalConstants, STEREO_A};
use crate::dynamics::state::SpacecraftState;
use crate::error::{Result, SimError};

/// Orbit advance per tick at the star-tracker image cadence (one image every
/// 40 minutes).
pub const IMAGE_CADENCE_DAYS: f64 = 0.02778;

// ---------------------------------------------------------------------------
// Simulation configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SimConfig {
    pub dt: f64,                              // controller/integration step
    pub gains: AxisGains,
    pub integral_clamp: f64,                  // anti-windup bound on |integral|
    pub initial_state: Option<SpacecraftState>,
    pub orbit_step_days: Option<f64>,         // None: orbit advances by dt
    pub constants: PhysicalConstants,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            dt: 1.0,
            gains: AxisGains::default(),
            integral_clamp: 1.0,
            initial_state: None,
            orbit_step_days: None,
            constants: STEREO_A,
        }
    }
}

impl SimConfig {
    /// Check every option before a single record is consumed.
    pub fn validate(&self) -> Result<()> {
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(SimError::configuration("dt", format!("must be finite and > 0, got {}", self.dt)));
        }
        self.gains.validate()?;
        validate_clamp(self.integral_clamp)?;
        if let Some(days) = self.orbit_step_days {
            if !days.is_finite() || days < 0.0 {
                return Err(SimError::configuration(
                    "orbit_step_days",
                    format!("must be finite and >= 0, got {days}"),
                ));
            }
        }
        if let Some(s) = &self.initial_state {
            let finite = s.attitude.iter().chain(s.rates.iter()).all(|v| v.is_finite())
                && s.orbit_phase.is_finite();
            if !finite {
                return Err(SimError::configuration("initial_state", "values must be finite"));
            }
        }
        self.constants.validate()
    }

    pub fn start_state(&self) -> SpacecraftState {
        self.initial_state.unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// YAML config file
// ---------------------------------------------------------------------------

/// On-disk form of the recognised options. Every field is optional and
/// command-line flags take precedence.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub input_path: Option<PathBuf>,
    pub output_path: Option<PathBuf>,
    pub dt: Option<f64>,
    pub gains: Option<GainsFile>,
    pub integral_clamp: Option<f64>,
    pub initial_state: Option<InitialStateFile>,
    pub orbit_step_days: Option<f64>,
}

/// Gains for all axes, or per axis. Per-axis entries override `all`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GainsFile {
    pub all: Option<Gains>,
    pub ra: Option<Gains>,
    pub dec: Option<Gains>,
    pub roll: Option<Gains>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InitialStateFile {
    #[serde(default)]
    pub attitude: [f64; 3],
    #[serde(default)]
    pub rates: [f64; 3],
    #[serde(default)]
    pub orbit_phase: f64,
}

impl From<InitialStateFile> for SpacecraftState {
    fn from(f: InitialStateFile) -> Self {
        SpacecraftState {
            attitude: Vector3::from(f.attitude),
            rates: Vector3::from(f.rates),
            orbit_phase: f.orbit_phase,
        }
    }
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let config: ConfigFile = serde_yaml::from_reader(file)?;
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Overlay the file's simulation options onto `base`.
    pub fn apply(&self, mut base: SimConfig) -> SimConfig {
        if let Some(dt) = self.dt {
            base.dt = dt;
        }
        if let Some(g) = &self.gains {
            if let Some(all) = g.all {
                base.gains = AxisGains::uniform(all);
            }
            if let Some(ra) = g.ra {
                base.gains.ra = ra;
            }
            if let Some(dec) = g.dec {
                base.gains.dec = dec;
            }
            if let Some(roll) = g.roll {
                base.gains.roll = roll;
            }
        }
        if let Some(clamp) = self.integral_clamp {
            base.integral_clamp = clamp;
        }
        if let Some(init) = self.initial_state {
            base.initial_state = Some(init.into());
        }
        if self.orbit_step_days.is_some() {
            base.orbit_step_days = self.orbit_step_days;
        }
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_dt_is_configuration_error() {
        let c = SimConfig { dt: 0.0, ..SimConfig::default() };
        match c.validate() {
            Err(SimError::Configuration { field, .. }) => assert_eq!(field, "dt"),
            other => panic!("expected configuration error, got {other:?}"),
        }
    }

    #[test]
    fn nan_clamp_rejected() {
        let c = SimConfig { integral_clamp: f64::NAN, ..SimConfig::default() };
        assert!(c.validate().is_err());
    }

    #[test]
    fn infinite_clamp_allowed() {
        let c = SimConfig { integral_clamp: f64::INFINITY, ..SimConfig::default() };
        assert!(c.validate().is_ok());
    }

    #[test]
    fn yaml_overlays_defaults() {
        let file = ConfigFile::parse(
            "dt: 0.5\n\
             integral_clamp: 2.0\n\
             gains:\n  all: { kp: 2.0, ki: 0.0, kd: 0.0 }\n  roll: { kp: 3.0, ki: 0.2, kd: 0.1 }\n\
             initial_state:\n  attitude: [1.0, 2.0, 3.0]\n",
        )
        .unwrap();
        let c = file.apply(SimConfig::default());
        assert_eq!(c.dt, 0.5);
        assert_eq!(c.integral_clamp, 2.0);
        assert_eq!(c.gains.ra, Gains::new(2.0, 0.0, 0.0));
        assert_eq!(c.gains.roll, Gains::new(3.0, 0.2, 0.1));
        let s = c.start_state();
        assert_eq!(s.attitude, Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(s.rates, Vector3::zeros());
    }

    #[test]
    fn unknown_yaml_key_rejected() {
        assert!(ConfigFile::parse("dtt: 1.0\n").is_err());
    }
}
