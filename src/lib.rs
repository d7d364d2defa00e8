pub mod config;
pub mod control;
pub mod dynamics;
pub mod error;
pub mod io;
pub mod orbital;
pub mod sim;

pub use config::SimConfig;
pub use error::{RunError, SimError};
pub use sim::{run, run_with};
