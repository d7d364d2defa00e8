use nalgebra::Vector3;

use crate::error::Result;

/// Trait for attitude controllers.
///
/// Implement this to plug a custom control law into the simulation loop.
pub trait Controller {
    /// Torque command [RA, DEC, Roll] for the current per-axis errors (deg).
    fn control(&mut self, errors: &Vector3<f64>, dt: f64) -> Result<Vector3<f64>>;

    /// Reset controller internal state (e.g., PID integrators).
    fn reset(&mut self) {}

    /// Human-readable name for logging/display.
    fn name(&self) -> &str {
        "unnamed"
    }
}
