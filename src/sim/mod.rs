pub mod integrator;
pub mod runner;
pub mod scenario;

pub use integrator::semi_implicit_euler_step;
pub use runner::{run, run_with};
pub use scenario::{group_scenarios, run_scenarios, Scenario, ScenarioOutcome};
