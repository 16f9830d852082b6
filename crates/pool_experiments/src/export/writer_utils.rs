use std::fs::File;
use std::path::Path;

use crate::metrics::ExperimentResult;

pub(crate) fn ensure_not_empty(
    results: &[ExperimentResult],
) -> Result<(), Box<dyn std::error::Error>> {
    if results.is_empty() {
        return Err("no experiment results to export".into());
    }
    Ok(())
}

pub(crate) fn create_output_file(
    path: impl AsRef<Path>,
) -> Result<File, Box<dyn std::error::Error>> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(File::create(path)?)
}
