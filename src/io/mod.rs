pub mod csv;
pub mod errors_table;

pub use self::csv::{stage_results_file, write_results, write_results_file, StagedResults, RESULT_HEADER};
pub use errors_table::{load_errors, read_errors, DisturbanceRecord, RecordTags};
