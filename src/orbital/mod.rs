pub mod phase;

pub use phase::{wrap_degrees, Orbit};
