use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

// ---------------------------------------------------------------------------
// Gains
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gains {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
}

impl Gains {
    pub const fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self { kp, ki, kd }
    }

    /// Reject negative or non-finite gains. `field` prefixes the error.
    pub fn validate(&self, field: &str) -> Result<()> {
        for (name, v) in [("kp", self.kp), ("ki", self.ki), ("kd", self.kd)] {
            if !v.is_finite() || v < 0.0 {
                return Err(SimError::configuration(
                    format!("{field}.{name}"),
                    format!("gain must be finite and >= 0, got {v}"),
                ));
            }
        }
        Ok(())
    }
}

impl Default for Gains {
    fn default() -> Self {
        Self::new(1.0, 0.1, 0.05)
    }
}

// ---------------------------------------------------------------------------
// PID Controller (single axis)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Pid {
    gains: Gains,
    integral_clamp: f64,
    integral: f64,
    prev_error: f64,
    first_tick: bool,
}

impl Pid {
    /// Build a controller; `integral_clamp` bounds |integral| (INFINITY disables it).
    pub fn new(gains: Gains, integral_clamp: f64) -> Result<Self> {
        gains.validate("gains")?;
        validate_clamp(integral_clamp)?;
        Ok(Self {
            gains,
            integral_clamp,
            integral: 0.0,
            prev_error: 0.0,
            first_tick: true,
        })
    }

    pub fn integral(&self) -> f64 {
        self.integral
    }

    pub fn update(&mut self, error: f64, dt: f64) -> Result<f64> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(SimError::InvalidStep { dt });
        }
        self.integral += error * dt;
        // Anti-windup
        self.integral = self.integral.clamp(-self.integral_clamp, self.integral_clamp);
        // No previous sample on the first tick
        let derivative = if self.first_tick { 0.0 } else { (error - self.prev_error) / dt };
        self.prev_error = error;
        self.first_tick = false;
        let Gains { kp, ki, kd } = self.gains;
        Ok(kp * error + ki * self.integral + kd * derivative)
    }

    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.prev_error = 0.0;
        self.first_tick = true;
    }
}

pub(crate) fn validate_clamp(clamp: f64) -> Result<()> {
    if clamp.is_nan() || clamp <= 0.0 {
        return Err(SimError::configuration(
            "integral_clamp",
            format!("must be > 0 (or infinite), got {clamp}"),
        ));
    }
    Ok(())
}
