use nalgebra::Vector3;

use attitude_sim::control::Controller;
use attitude_sim::dynamics::model::DynamicsModel;
use attitude_sim::error::Result;
use attitude_sim::io::DisturbanceRecord;
use attitude_sim::{sim, SimConfig};

/// Fires a fixed torque against any error outside a deadband, per axis.
struct BangBangController {
    deadband: f64,  // deg
    torque: f64,
}

impl Controller for BangBangController {
    fn control(&mut self, errors: &Vector3<f64>, _dt: f64) -> Result<Vector3<f64>> {
        Ok(errors.map(|e| if e.abs() > self.deadband { self.torque * e.signum() } else { 0.0 }))
    }

    fn name(&self) -> &str {
        "BangBang"
    }
}

fn main() -> anyhow::Result<()> {
    // a slow roll drift with small RA/DEC jitter
    let records: Vec<DisturbanceRecord> = (0..500)
        .map(|i| {
            let t = i as f64;
            DisturbanceRecord::new(i, 0.002 * (t * 0.05).sin(), -0.001 * (t * 0.03).cos(), 0.0137 + 1e-5 * t)
        })
        .collect();

    let config = SimConfig::default();
    let model = DynamicsModel::new(&config.constants)?.with_orbit_step_days(config.orbit_step_days);
    let mut controller = BangBangController { deadband: 0.005, torque: 0.5 };

    println!("Simulating with {} controller...", controller.name());
    println!(
        "Inertia: {:.1} kg·m^2, orbit period: {} days",
        model.inertia(),
        model.orbit().period_days
    );
    let results = sim::run_with(&records, &config, &mut controller, &model)?;

    let firings = results.iter().filter(|r| r.torque.z != 0.0).count();
    if let Some(last) = results.last() {
        println!("Roll firings: {firings} of {} ticks", results.len());
        println!(
            "Final attitude: RA {:.6} DEC {:.6} Roll {:.6} deg",
            last.attitude.x, last.attitude.y, last.attitude.z
        );
        println!("Final orbit phase: {:.3} deg", last.orbit_phase);
    }
    Ok(())
}
