use nalgebra::Vector3;

use crate::dynamics::constants::PhysicalConstants;
use crate::dynamics::state::SpacecraftState;
use crate::error::{Result, SimError};
use crate::orbital::Orbit;
use crate::sim::integrator::semi_implicit_euler_step;

// ---------------------------------------------------------------------------
// Rigid-body attitude + orbital phase model
// ---------------------------------------------------------------------------

/// Propagates attitude under applied torques and advances the orbit phase.
///
/// Stateless between calls: every tick gets the previous state by value and
/// returns the next one.
#[derive(Debug, Clone)]
pub struct DynamicsModel {
    inertia: f64, // kg·m^2, isotropic cube
    orbit: Orbit,
    orbit_step_days: Option<f64>,
}

impl DynamicsModel {
    pub fn new(constants: &PhysicalConstants) -> Result<Self> {
        constants.validate()?;
        Ok(Self {
            inertia: constants.moment_of_inertia(),
            orbit: constants.orbit,
            orbit_step_days: None,
        })
    }

    /// Advance the orbit by a fixed number of days per tick instead of `dt`.
    pub fn with_orbit_step_days(mut self, days: Option<f64>) -> Self {
        self.orbit_step_days = days;
        self
    }

    pub fn inertia(&self) -> f64 {
        self.inertia
    }

    pub fn orbit(&self) -> &Orbit {
        &self.orbit
    }

    /// Angular acceleration per axis, alpha = torque / I.
    pub fn angular_accel(&self, torques: &Vector3<f64>) -> Vector3<f64> {
        torques / self.inertia
    }

    pub fn propagate(
        &self,
        state: SpacecraftState,
        torques: &Vector3<f64>,
        dt: f64,
    ) -> Result<SpacecraftState> {
        if !dt.is_finite() {
            return Err(SimError::domain(format!("non-finite propagation step dt={dt}")));
        }
        if self.inertia == 0.0 || !self.inertia.is_finite() {
            return Err(SimError::domain(format!("degenerate moment of inertia {}", self.inertia)));
        }

        let alpha = self.angular_accel(torques);
        let (attitude, rates) = semi_implicit_euler_step(&state.attitude, &state.rates, &alpha, dt);
        let orbit_dt = self.orbit_step_days.unwrap_or(dt);
        let orbit_phase = self.orbit.advance_phase(state.orbit_phase, orbit_dt);

        Ok(SpacecraftState { attitude, rates, orbit_phase })
    }
}
