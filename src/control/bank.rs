use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::dynamics::state::Axis;
use crate::error::Result;
use super::pid::{Gains, Pid};

// ---------------------------------------------------------------------------
// Per-axis gain set
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct AxisGains {
    pub ra: Gains,
    pub dec: Gains,
    pub roll: Gains,
}

impl AxisGains {
    /// Same gains on every axis.
    pub fn uniform(gains: Gains) -> Self {
        Self { ra: gains, dec: gains, roll: gains }
    }

    pub fn get(&self, axis: Axis) -> Gains {
        match axis {
            Axis::Ra => self.ra,
            Axis::Dec => self.dec,
            Axis::Roll => self.roll,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.ra.validate("gains.ra")?;
        self.dec.validate("gains.dec")?;
        self.roll.validate("gains.roll")
    }
}

// ---------------------------------------------------------------------------
// PID controller bank: one independent controller per axis
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct PidBank {
    axes: [Pid; 3],
}

impl PidBank {
    pub fn new(gains: &AxisGains, integral_clamp: f64) -> Result<Self> {
        gains.validate()?;
        Ok(Self {
            axes: [
                Pid::new(gains.ra, integral_clamp)?,
                Pid::new(gains.dec, integral_clamp)?,
                Pid::new(gains.roll, integral_clamp)?,
            ],
        })
    }

    /// Torque command for one axis. Mutates only that axis's controller.
    pub fn compute(&mut self, axis: Axis, error: f64, dt: f64) -> Result<f64> {
        self.axes[axis.index()].update(error, dt)
    }

    /// Torques for all three axes, computed in RA, DEC, Roll order.
    pub fn compute_all(&mut self, errors: &Vector3<f64>, dt: f64) -> Result<Vector3<f64>> {
        let mut torque = Vector3::zeros();
        for axis in Axis::ALL {
            torque[axis.index()] = self.compute(axis, errors[axis.index()], dt)?;
        }
        Ok(torque)
    }

    pub fn axis(&self, axis: Axis) -> &Pid {
        &self.axes[axis.index()]
    }

    pub fn reset(&mut self) {
        for pid in &mut self.axes {
            pid.reset();
        }
    }
}

impl super::Controller for PidBank {
    fn control(&mut self, errors: &Vector3<f64>, dt: f64) -> Result<Vector3<f64>> {
        self.compute_all(errors, dt)
    }

    fn reset(&mut self) {
        PidBank::reset(self);
    }

    fn name(&self) -> &str {
        "PidBank"
    }
}
