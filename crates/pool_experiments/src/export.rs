//! Result export utilities.
//!
//! Experiment results go out as CSV (for spreadsheets and plotting) or JSON
//! (for downstream tooling).

use std::path::Path;

use crate::metrics::ExperimentResult;

#[path = "export/csv.rs"]
mod csv;
#[path = "export/json.rs"]
mod json;
#[path = "export/writer_utils.rs"]
mod writer_utils;

/// Export experiment results to CSV, one row per experiment.
///
/// # Errors
///
/// Returns an error if `results` is empty or if file creation/writing fails.
pub fn export_to_csv(
    results: &[ExperimentResult],
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    writer_utils::ensure_not_empty(results)?;
    let file = writer_utils::create_output_file(path)?;
    csv::export_to_csv_impl(results, file)
}

/// Export experiment results to a JSON array.
///
/// # Errors
///
/// Returns an error if `results` is empty or if file creation/serialization
/// fails.
pub fn export_to_json(
    results: &[ExperimentResult],
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    writer_utils::ensure_not_empty(results)?;
    let file = writer_utils::create_output_file(path)?;
    json::export_to_json_impl(results, file)
}
