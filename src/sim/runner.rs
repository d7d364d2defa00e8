use tracing::{info, trace};

use crate::config::SimConfig;
use crate::control::{Controller, PidBank};
use crate::dynamics::model::DynamicsModel;
use crate::dynamics::state::StepResult;
use crate::error::{RunError, SimError};
use crate::io::errors_table::DisturbanceRecord;

// ---------------------------------------------------------------------------
// Closed-loop simulation
// ---------------------------------------------------------------------------

/// Run the loop over `records` with a custom controller and dynamics model.
///
/// Per record: COMPUTE_CONTROL -> INTEGRATE -> RECORD. The record's errors are
/// the controller input for that tick. Any failure aborts the run; the
/// returned `RunError` keeps the results committed before the failing tick.
pub fn run_with(
    records: &[DisturbanceRecord],
    config: &SimConfig,
    controller: &mut dyn Controller,
    model: &DynamicsModel,
) -> Result<Vec<StepResult>, RunError> {
    config.validate().map_err(|e| RunError::new(e, vec![]))?;

    let dt = config.dt;
    let mut state = config.start_state();
    controller.reset();

    info!(
        records = records.len(),
        dt,
        controller = controller.name(),
        "starting simulation"
    );

    let mut results = Vec::with_capacity(records.len());
    for rec in records {
        if let Err(e) = rec.check_finite() {
            return Err(RunError::new(e, results));
        }
        let errors = rec.errors();

        let torque = match controller.control(&errors, dt) {
            Ok(t) => t,
            Err(e) => return Err(RunError::new(e, results)),
        };

        let next = match model.propagate(state, &torque, dt) {
            Ok(s) => s,
            Err(e) => return Err(RunError::new(e, results)),
        };

        trace!(
            step = rec.step_index,
            torque_ra = torque.x,
            torque_dec = torque.y,
            torque_roll = torque.z,
            orbit_deg = next.orbit_phase,
            "tick"
        );

        results.push(StepResult {
            step_index: rec.step_index,
            torque,
            attitude: next.attitude,
            orbit_phase: next.orbit_phase,
        });
        state = next;
    }

    info!(steps = results.len(), "simulation complete");
    Ok(results)
}

/// Run with the configured three-axis PID bank (convenience wrapper).
pub fn run(records: &[DisturbanceRecord], config: &SimConfig) -> Result<Vec<StepResult>, RunError> {
    let setup = || -> Result<(PidBank, DynamicsModel), SimError> {
        let bank = PidBank::new(&config.gains, config.integral_clamp)?;
        let model = DynamicsModel::new(&config.constants)?.with_orbit_step_days(config.orbit_step_days);
        Ok((bank, model))
    };
    let (mut bank, model) = setup().map_err(|e| RunError::new(e, vec![]))?;
    run_with(records, config, &mut bank, &model)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::{AxisGains, Gains};
    use crate::dynamics::state::SpacecraftState;
    use nalgebra::Vector3;

    fn records(errors: &[(f64, f64, f64)]) -> Vec<DisturbanceRecord> {
        errors
            .iter()
            .enumerate()
            .map(|(i, &(ra, dec, roll))| DisturbanceRecord::new(i, ra, dec, roll))
            .collect()
    }

    fn p_only() -> SimConfig {
        SimConfig {
            gains: AxisGains::uniform(Gains::new(1.0, 0.0, 0.0)),
            ..SimConfig::default()
        }
    }

    #[test]
    fn one_result_per_record_in_order() {
        let recs = records(&[(0.1, 0.2, 0.3); 7]);
        let out = run(&recs, &SimConfig::default()).unwrap();
        assert_eq!(out.len(), 7);
        for (i, r) in out.iter().enumerate() {
            assert_eq!(r.step_index, i);
        }
    }

    #[test]
    fn empty_table_yields_empty_run() {
        assert!(run(&[], &SimConfig::default()).unwrap().is_empty());
    }

    #[test]
    fn zero_disturbance_stays_at_rest() {
        let recs = records(&[(0.0, 0.0, 0.0); 50]);
        let out = run(&recs, &SimConfig::default()).unwrap();
        for r in &out {
            assert_eq!(r.torque, Vector3::zeros());
            assert_eq!(r.attitude, Vector3::zeros());
        }
    }

    #[test]
    fn deterministic_across_runs() {
        let recs = records(&[(0.3, -0.1, 0.0137), (-0.2, 0.05, 0.0137), (0.0, 0.4, 0.01)]);
        let a = run(&recs, &SimConfig::default()).unwrap();
        let b = run(&recs, &SimConfig::default()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn single_axis_disturbance_does_not_leak() {
        let recs = records(&[(0.0, 0.0, 0.5), (0.0, 0.0, -0.2), (0.0, 0.0, 0.1)]);
        let out = run(&recs, &SimConfig::default()).unwrap();
        for r in &out {
            assert_eq!(r.torque.x, 0.0);
            assert_eq!(r.torque.y, 0.0);
            assert_eq!(r.attitude.x, 0.0);
            assert_eq!(r.attitude.y, 0.0);
            assert!(r.torque.z != 0.0);
        }
    }

    #[test]
    fn three_tick_proportional_scenario() {
        let recs = records(&[(1.0, 0.0, 0.0), (0.0, 0.0, 0.0), (0.0, 0.0, 0.0)]);
        let config = p_only();
        let out = run(&recs, &config).unwrap();

        assert_eq!(out[0].torque.x, 1.0);
        assert_eq!(out[1].torque.x, 0.0);
        assert_eq!(out[2].torque.x, 0.0);

        // by hand: alpha = 1/I, omega stays at 1/I, angle grows by omega each tick
        let i = config.constants.moment_of_inertia();
        let omega = 1.0 / i;
        assert!((out[0].attitude.x - omega).abs() < 1e-15);
        assert!((out[1].attitude.x - 2.0 * omega).abs() < 1e-15);
        assert!((out[2].attitude.x - 3.0 * omega).abs() < 1e-15);
        assert!(out[0].attitude.x <= out[1].attitude.x && out[1].attitude.x <= out[2].attitude.x);
    }

    #[test]
    fn integral_torque_grows_then_plateaus() {
        let config = SimConfig {
            gains: AxisGains::uniform(Gains::new(0.0, 1.0, 0.0)),
            integral_clamp: 0.1,
            ..SimConfig::default()
        };
        let recs = records(&[(0.0, 0.0, 0.0137); 20]);
        let out = run(&recs, &config).unwrap();
        let roll: Vec<f64> = out.iter().map(|r| r.torque.z).collect();
        for w in roll.windows(2) {
            assert!(w[1] >= w[0]);
        }
        assert!(roll[0] < roll[5]);
        assert!((roll[19] - 0.1).abs() < 1e-12);
        assert_eq!(roll[18], roll[19]);
    }

    #[test]
    fn orbit_phase_returns_after_one_period() {
        let config = SimConfig { dt: 1.0, ..SimConfig::default() };
        let ticks = (config.constants.orbit.period_days / config.dt) as usize;
        let recs = records(&vec![(0.0, 0.0, 0.0); ticks]);
        let out = run(&recs, &config).unwrap();
        let last = out.last().unwrap().orbit_phase;
        let dist = last.min(360.0 - last);
        assert!(dist < 1e-9, "phase after one period: {last}");
    }

    #[test]
    fn initial_state_is_honoured() {
        let config = SimConfig {
            initial_state: Some(SpacecraftState {
                attitude: Vector3::new(10.0, 0.0, 0.0),
                rates: Vector3::zeros(),
                orbit_phase: 90.0,
            }),
            ..SimConfig::default()
        };
        let out = run(&records(&[(0.0, 0.0, 0.0)]), &config).unwrap();
        assert_eq!(out[0].attitude.x, 10.0);
        assert!(out[0].orbit_phase > 90.0);
    }

    #[test]
    fn non_finite_record_aborts_with_committed_prefix() {
        let mut recs = records(&[(0.1, 0.1, 0.1); 5]);
        recs[3].roll_error = f64::NAN;
        let err = run(&recs, &SimConfig::default()).unwrap_err();
        match &err.source {
            SimError::Data { step, field, .. } => {
                assert_eq!(*step, 3);
                assert_eq!(field, "Roll_error");
            }
            other => panic!("expected data error, got {other:?}"),
        }
        assert_eq!(err.last_committed, Some(2));
        assert_eq!(err.partial.len(), 3);
    }

    #[test]
    fn bad_config_fails_before_any_tick() {
        let config = SimConfig { dt: -1.0, ..SimConfig::default() };
        let err = run(&records(&[(1.0, 0.0, 0.0)]), &config).unwrap_err();
        assert!(matches!(err.source, SimError::Configuration { .. }));
        assert_eq!(err.last_committed, None);
    }

    struct Constant(Vector3<f64>);

    impl Controller for Constant {
        fn control(&mut self, _errors: &Vector3<f64>, _dt: f64) -> crate::error::Result<Vector3<f64>> {
            Ok(self.0)
        }
    }

    #[test]
    fn run_with_rejects_bad_config_for_custom_controller() {
        let config = SimConfig { dt: 0.0, ..SimConfig::default() };
        let model = DynamicsModel::new(&config.constants).unwrap();
        let mut controller = Constant(Vector3::new(1.0, 0.0, 0.0));
        let err = run_with(&records(&[(0.0, 0.0, 0.0)]), &config, &mut controller, &model).unwrap_err();
        match err.source {
            SimError::Configuration { field, .. } => assert_eq!(field, "dt"),
            other => panic!("expected configuration error, got {other:?}"),
        }
    }
}
