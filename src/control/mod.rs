pub mod bank;
pub mod controller;
pub mod pid;

pub use bank::{AxisGains, PidBank};
pub use controller::Controller;
pub use pid::{Gains, Pid};
