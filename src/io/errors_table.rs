//! Loader for the external attitude-error table.
//!
//! Every row must carry `RA_error`, `DEC_error` and `Roll_error` in degrees.
//! Rows are validated here, at load time, so the control loop only ever sees
//! fully populated records. A bad row fails the whole load; nothing is
//! skipped.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use nalgebra::Vector3;
use serde::Deserialize;
use tracing::{debug, info};

use crate::dynamics::state::Axis;
use crate::error::{Result, SimError};

/// Pass-through columns, kept for joining results back to the input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RecordTags {
    pub filename_adv: Option<String>,
    pub attack: Option<String>,
    pub level: Option<String>,
}

impl RecordTags {
    pub fn is_empty(&self) -> bool {
        self.filename_adv.is_none() && self.attack.is_none() && self.level.is_none()
    }
}

/// One per-tick attitude error, consumed as a disturbance by the loop.
#[derive(Debug, Clone, PartialEq)]
pub struct DisturbanceRecord {
    pub step_index: usize,
    pub ra_error: f64,   // deg
    pub dec_error: f64,  // deg
    pub roll_error: f64, // deg
    pub tags: RecordTags,
}

impl DisturbanceRecord {
    pub fn new(step_index: usize, ra_error: f64, dec_error: f64, roll_error: f64) -> Self {
        Self { step_index, ra_error, dec_error, roll_error, tags: RecordTags::default() }
    }

    pub fn errors(&self) -> Vector3<f64> {
        Vector3::new(self.ra_error, self.dec_error, self.roll_error)
    }

    /// Fail with a data error naming the first non-finite axis.
    pub fn check_finite(&self) -> Result<()> {
        let errors = self.errors();
        for axis in Axis::ALL {
            let v = errors[axis.index()];
            if !v.is_finite() {
                return Err(SimError::data(
                    self.step_index,
                    axis.error_column(),
                    format!("non-finite value {v}"),
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(rename = "RA_error")]
    ra_error: Option<String>,
    #[serde(rename = "DEC_error")]
    dec_error: Option<String>,
    #[serde(rename = "Roll_error")]
    roll_error: Option<String>,
    filename_adv: Option<String>,
    attack: Option<String>,
    level: Option<String>,
}

/// Load and validate the error table at `path`.
///
/// The file is closed before this returns.
pub fn load_errors(path: &Path) -> Result<Vec<DisturbanceRecord>> {
    let file = File::open(path)?;
    let records = read_errors(file)?;
    info!(path = %path.display(), records = records.len(), "loaded attitude error table");
    Ok(records)
}

/// Parse an error table from any reader (CSV with a header row).
pub fn read_errors<R: Read>(reader: R) -> Result<Vec<DisturbanceRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    for axis in Axis::ALL {
        let column = axis.error_column();
        if !headers.iter().any(|h| h == column) {
            return Err(SimError::data(0, column, "required column missing from header"));
        }
    }

    let mut records = Vec::new();
    for (step, row) in rdr.records().enumerate() {
        let row = row.map_err(|e| SimError::data(step, "row", e.to_string()))?;
        let raw: RawRow = row
            .deserialize(Some(&headers))
            .map_err(|e| SimError::data(step, "row", e.to_string()))?;

        records.push(DisturbanceRecord {
            step_index: step,
            ra_error: parse_axis(step, Axis::Ra, raw.ra_error)?,
            dec_error: parse_axis(step, Axis::Dec, raw.dec_error)?,
            roll_error: parse_axis(step, Axis::Roll, raw.roll_error)?,
            tags: RecordTags {
                filename_adv: non_empty(raw.filename_adv),
                attack: non_empty(raw.attack),
                level: non_empty(raw.level),
            },
        });
    }

    debug!(records = records.len(), "validated disturbance records");
    Ok(records)
}

fn parse_axis(step: usize, axis: Axis, cell: Option<String>) -> Result<f64> {
    let field = axis.error_column();
    let text = match non_empty(cell) {
        Some(t) => t,
        None => return Err(SimError::data(step, field, "missing value")),
    };
    let value: f64 = text
        .parse()
        .map_err(|_| SimError::data(step, field, format!("not a number: {text:?}")))?;
    if !value.is_finite() {
        return Err(SimError::data(step, field, format!("non-finite value {value}")));
    }
    Ok(value)
}

fn non_empty(cell: Option<String>) -> Option<String> {
    cell.filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_rows_in_order_with_tags() {
        let csv = "filename_adv,attack,level,RA_error,DEC_error,Roll_error,extra\n\
                   a.png,fgsm,1,0.1,-0.2,0.0137,x\n\
                   b.png,fgsm,2,0.3,0.4,-0.5,y\n";
        let recs = read_errors(csv.as_bytes()).unwrap();
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].step_index, 0);
        assert_eq!(recs[1].step_index, 1);
        assert_eq!(recs[0].errors(), Vector3::new(0.1, -0.2, 0.0137));
        assert_eq!(recs[1].tags.attack.as_deref(), Some("fgsm"));
        assert_eq!(recs[1].tags.level.as_deref(), Some("2"));
    }

    #[test]
    fn tags_are_optional() {
        let csv = "RA_error,DEC_error,Roll_error\n1,2,3\n";
        let recs = read_errors(csv.as_bytes()).unwrap();
        assert!(recs[0].tags.is_empty());
    }

    #[test]
    fn empty_cell_names_step_and_field() {
        let csv = "RA_error,DEC_error,Roll_error\n1,2,3\n1,,3\n";
        match read_errors(csv.as_bytes()) {
            Err(SimError::Data { step, field, .. }) => {
                assert_eq!(step, 1);
                assert_eq!(field, "DEC_error");
            }
            other => panic!("expected data error, got {other:?}"),
        }
    }

    #[test]
    fn short_row_is_missing_value() {
        let csv = "RA_error,DEC_error,Roll_error\n1,2\n";
        match read_errors(csv.as_bytes()) {
            Err(SimError::Data { step, field, .. }) => {
                assert_eq!(step, 0);
                assert_eq!(field, "Roll_error");
            }
            other => panic!("expected data error, got {other:?}"),
        }
    }

    #[test]
    fn garbage_value_rejected() {
        let csv = "RA_error,DEC_error,Roll_error\nabc,0,0\n";
        assert!(matches!(read_errors(csv.as_bytes()), Err(SimError::Data { step: 0, .. })));
    }

    #[test]
    fn nan_value_rejected() {
        let csv = "RA_error,DEC_error,Roll_error\n0,NaN,0\n";
        assert!(matches!(read_errors(csv.as_bytes()), Err(SimError::Data { .. })));
    }

    #[test]
    fn missing_column_rejected() {
        let csv = "RA_error,DEC_error\n1,2\n";
        match read_errors(csv.as_bytes()) {
            Err(SimError::Data { field, .. }) => assert_eq!(field, "Roll_error"),
            other => panic!("expected data error, got {other:?}"),
        }
    }
}
