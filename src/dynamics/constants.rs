use crate::error::{Result, SimError};
use crate::orbital::Orbit;

// ---------------------------------------------------------------------------
// STEREO-A physical constants
// ---------------------------------------------------------------------------

pub const STEREO_A_MASS_KG: f64 = 620.0;
pub const STEREO_A_SIDE_M: f64 = 1.1; // approximate cube
pub const STEREO_A_ORBIT: Orbit = Orbit {
    semi_major_axis_au: 0.97,
    eccentricity: 0.01,
    period_days: 347.0,
};

/// Process-wide, read-only defaults.
pub const STEREO_A: PhysicalConstants = PhysicalConstants {
    mass_kg: STEREO_A_MASS_KG,
    cube_side_m: STEREO_A_SIDE_M,
    orbit: STEREO_A_ORBIT,
};

/// Rigid-body and orbital parameters of the simulated spacecraft.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicalConstants {
    pub mass_kg: f64,
    pub cube_side_m: f64,
    pub orbit: Orbit,
}

impl PhysicalConstants {
    /// Solid-cube moment of inertia, I = m * s^2 / 6 (same for every axis).
    pub fn moment_of_inertia(&self) -> f64 {
        self.mass_kg * self.cube_side_m * self.cube_side_m / 6.0
    }

    /// Orbital angular rate in degrees per day.
    pub fn mean_motion(&self) -> f64 {
        self.orbit.mean_motion()
    }

    pub fn validate(&self) -> Result<()> {
        check_positive("mass_kg", self.mass_kg)?;
        check_positive("cube_side_m", self.cube_side_m)?;
        check_positive("orbital period_days", self.orbit.period_days)?;
        let inertia = self.moment_of_inertia();
        if !(inertia.is_finite() && inertia > 0.0) {
            return Err(SimError::domain(format!("degenerate moment of inertia {inertia}")));
        }
        Ok(())
    }
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        STEREO_A
    }
}

fn check_positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SimError::domain(format!("{name} must be finite and > 0, got {value}")))
    }
}
