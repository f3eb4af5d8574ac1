use std::fs::{OpenOptions, create_dir_all};
use std::path::{Path, PathBuf};

use serde::Serialize;

use anonymizer_policy::RunReport;

use crate::CliError;

/// JSON document written by `run --report`.
#[derive(Debug, Serialize)]
pub struct RunSummary<'a> {
    pub config: PathBuf,
    pub data: PathBuf,
    pub out: PathBuf,
    #[serde(flatten)]
    pub report: &'a RunReport,
}

pub fn write_report(path: &Path, summary: &RunSummary<'_>) -> Result<(), CliError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(path)?;
    serde_json::to_writer_pretty(file, summary)?;
    Ok(())
}
