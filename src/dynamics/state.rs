use nalgebra::Vector3;

// ---------------------------------------------------------------------------
// Control axes
// ---------------------------------------------------------------------------

/// One of the three pointing axes. Indexes the components of every
/// per-axis `Vector3` in the crate: x = RA, y = DEC, z = Roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Ra,
    Dec,
    Roll,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::Ra, Axis::Dec, Axis::Roll];

    pub fn index(self) -> usize {
        match self {
            Axis::Ra => 0,
            Axis::Dec => 1,
            Axis::Roll => 2,
        }
    }

    /// Column name of this axis in the input error table.
    pub fn error_column(self) -> &'static str {
        match self {
            Axis::Ra => "RA_error",
            Axis::Dec => "DEC_error",
            Axis::Roll => "Roll_error",
        }
    }
}

// ---------------------------------------------------------------------------
// Spacecraft state
// ---------------------------------------------------------------------------

/// Attitude and orbital phase at a single tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpacecraftState {
    pub attitude: Vector3<f64>, // deg   [RA, DEC, Roll]
    pub rates: Vector3<f64>,    // deg per unit time
    pub orbit_phase: f64,       // deg, [0, 360)
}

impl SpacecraftState {
    pub fn zero() -> Self {
        Self {
            attitude: Vector3::zeros(),
            rates: Vector3::zeros(),
            orbit_phase: 0.0,
        }
    }
}

impl Default for SpacecraftState {
    fn default() -> Self {
        Self::zero()
    }
}

// ---------------------------------------------------------------------------
// Per-tick output
// ---------------------------------------------------------------------------

/// What the loop emits for one consumed disturbance record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepResult {
    pub step_index: usize,
    pub torque: Vector3<f64>,   // PID correction [RA, DEC, Roll]
    pub attitude: Vector3<f64>, // deg, after integration
    pub orbit_phase: f64,       // deg
}
