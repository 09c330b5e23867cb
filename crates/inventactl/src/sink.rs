//! Report sink - filename derivation and artifact writing.
//!
//! One UTF-8 text file per invocation, named after the host and the run
//! date, written to the working directory. A same-day re-run on the same
//! host overwrites the previous artifact.

use chrono::NaiveDate;
use inventa_core::Report;
use std::fs;
use std::path::{Path, PathBuf};

/// `informe_<HOST_UPPER_WITH_UNDERSCORES>_<YYYY-MM-DD>.txt`
pub fn report_filename(hostname: &str, date: NaiveDate) -> String {
    format!(
        "informe_{}_{}.txt",
        hostname.to_uppercase().replace(' ', "_"),
        date.format("%Y-%m-%d")
    )
}

/// Write the rendered report into `dir`, returning the artifact path.
pub fn write_report_in(dir: &Path, report: &Report, hostname: &str) -> std::io::Result<PathBuf> {
    let filename = report_filename(hostname, report.generated_at().date_naive());
    let path = dir.join(filename);
    fs::write(&path, report.render())?;
    Ok(path)
}

/// Write the rendered report into the working directory.
pub fn write_report(report: &Report, hostname: &str) -> std::io::Result<PathBuf> {
    write_report_in(Path::new("."), report, hostname)
}
