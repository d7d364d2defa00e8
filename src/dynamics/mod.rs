pub mod constants;
pub mod model;
pub mod state;

pub use constants::{PhysicalConstants, STEREO_A};
pub use model::DynamicsModel;
pub use state::{Axis, SpacecraftState, StepResult};
