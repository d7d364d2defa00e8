use thiserror::Error;

use crate::dynamics::state::StepResult;

// ---------------------------------------------------------------------------
// Error taxonomy
// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum SimError {
    /// Bad gains, bad dt or bad clamp. Raised at startup, never mid-run.
    #[error("invalid configuration for `{field}`: {reason}")]
    Configuration { field: String, reason: String },

    #[error("invalid controller step dt={dt} (must be finite and > 0)")]
    InvalidStep { dt: f64 },

    /// Malformed or missing disturbance value at a given step.
    #[error("bad disturbance record at step {step}, field `{field}`: {reason}")]
    Data {
        step: usize,
        field: String,
        reason: String,
    },

    /// Degenerate physical constants or non-finite propagation step.
    #[error("domain error: {reason}")]
    Domain { reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("config file error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl SimError {
    pub fn configuration(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Configuration { field: field.into(), reason: reason.into() }
    }

    pub fn data(step: usize, field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Data { step, field: field.into(), reason: reason.into() }
    }

    pub fn domain(reason: impl Into<String>) -> Self {
        Self::Domain { reason: reason.into() }
    }
}

pub type Result<T> = std::result::Result<T, SimError>;

// ---------------------------------------------------------------------------
// Run failure: the error plus everything committed before it
// ---------------------------------------------------------------------------

/// An aborted simulation run.
///
/// `partial` holds the results committed before the failing tick, so a caller
/// catching the error can still analyse a truncated but consistent series.
#[derive(Error, Debug)]
#[error("{source} (last committed step: {})", fmt_last(.last_committed))]
pub struct RunError {
    #[source]
    pub source: SimError,
    pub last_committed: Option<usize>,
    pub partial: Vec<StepResult>,
}

impl RunError {
    pub fn new(source: SimError, partial: Vec<StepResult>) -> Self {
        let last_committed = partial.last().map(|r| r.step_index);
        Self { source, last_committed, partial }
    }
}

fn fmt_last(last: &Option<usize>) -> String {
    match last {
        Some(step) => step.to_string(),
        None => "none".into(),
    }
}
