// ---------------------------------------------------------------------------
// Heliocentric orbit (mean-motion phase only)
// ---------------------------------------------------------------------------

/// Heliocentric orbit parameters. Only the period drives the simulation;
/// semi-major axis and eccentricity are carried for reporting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orbit {
    pub semi_major_axis_au: f64,
    pub eccentricity: f64,
    pub period_days: f64,
}

impl Orbit {
    /// Mean motion in degrees per day.
    pub fn mean_motion(&self) -> f64 {
        360.0 / self.period_days
    }

    /// Advance `phase` by `elapsed_days` of mean motion, wrapped into [0, 360).
    pub fn advance_phase(&self, phase: f64, elapsed_days: f64) -> f64 {
        wrap_degrees(phase + self.mean_motion() * elapsed_days)
    }
}

/// Wrap an angle in degrees into [0, 360).
pub fn wrap_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}
