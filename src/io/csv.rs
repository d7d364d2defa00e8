use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::info;

use crate::dynamics::state::StepResult;
use crate::error::{Result, SimError};
use crate::io::errors_table::{DisturbanceRecord, RecordTags};

/// Output columns, identical for every run.
pub const RESULT_HEADER: [&str; 11] = [
    "step",
    "RA_correction",
    "DEC_correction",
    "Roll_correction",
    "RA",
    "DEC",
    "Roll",
    "orbit_deg",
    "filename_adv",
    "attack",
    "level",
];

/// Write PID corrections and spacecraft state as CSV.
///
/// `records` is the input the results were produced from; its pass-through
/// tags are echoed on each row (empty when absent or when `records` is
/// shorter than `results`).
pub fn write_results<W: Write>(
    writer: W,
    results: &[StepResult],
    records: &[DisturbanceRecord],
) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(RESULT_HEADER)?;

    let no_tags = RecordTags::default();
    for (i, r) in results.iter().enumerate() {
        let tags = records.get(i).map_or(&no_tags, |rec| &rec.tags);
        wtr.write_record(&[
            r.step_index.to_string(),
            r.torque.x.to_string(),
            r.torque.y.to_string(),
            r.torque.z.to_string(),
            r.attitude.x.to_string(),
            r.attitude.y.to_string(),
            r.attitude.z.to_string(),
            r.orbit_phase.to_string(),
            tags.filename_adv.clone().unwrap_or_default(),
            tags.attack.clone().unwrap_or_default(),
            tags.level.clone().unwrap_or_default(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Rows fully written and synced to a temp file next to their target, not
/// yet visible under the target name. Dropping it removes the temp file.
#[derive(Debug)]
pub struct StagedResults {
    tmp: NamedTempFile,
    path: PathBuf,
    rows: usize,
}

impl StagedResults {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rename the temp file over the target.
    pub fn commit(self) -> Result<()> {
        self.tmp.persist(&self.path).map_err(|e| SimError::Io(e.error))?;
        info!(path = %self.path.display(), rows = self.rows, "wrote results");
        Ok(())
    }
}

/// Write results to a temp file in `path`'s directory without touching `path`.
pub fn stage_results_file(
    path: &Path,
    results: &[StepResult],
    records: &[DisturbanceRecord],
) -> Result<StagedResults> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    write_results(tmp.as_file_mut(), results, records)?;
    tmp.as_file().sync_all()?;
    Ok(StagedResults { tmp, path: path.to_path_buf(), rows: results.len() })
}

/// Write results to `path` atomically: rows go to a temp file in the same
/// directory, which replaces `path` only once everything is flushed.
pub fn write_results_file(
    path: &Path,
    results: &[StepResult],
    records: &[DisturbanceRecord],
) -> Result<()> {
    stage_results_file(path, results, records)?.commit()
}
