//! CSV export of appointments

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use thiserror::Error;
use tracing::info;

use crate::models::Appointment;

/// Column order of exported files
pub const CSV_HEADER: [&str; 7] = [
    "id",
    "user_id",
    "resource_id",
    "start_time",
    "end_time",
    "status",
    "notes",
];

/// Errors raised while writing an export
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// ISO-8601 without offset; fractional seconds only when present
pub fn format_timestamp(timestamp: &NaiveDateTime) -> String {
    timestamp.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
}

/// File name for an export taken at `now`
pub fn export_file_name(now: NaiveDateTime) -> String {
    format!("appointments_{}.csv", now.format("%Y%m%d_%H%M%S"))
}

/// Write the header and one row per appointment
pub fn write_appointments<W: Write>(
    writer: W,
    appointments: &[Appointment],
) -> Result<(), ExportError> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(CSV_HEADER)?;

    for appointment in appointments {
        csv.write_record([
            appointment.id.to_string(),
            appointment.user_id.to_string(),
            appointment.resource_id.to_string(),
            format_timestamp(&appointment.start_time),
            format_timestamp(&appointment.end_time),
            appointment.status.to_string(),
            appointment.notes.clone().unwrap_or_default(),
        ])?;
    }

    csv.flush()?;
    Ok(())
}

/// Export into `dir` under a name derived from the current local time
pub fn export_to_tabular(dir: &Path, appointments: &[Appointment]) -> Result<PathBuf, ExportError> {
    export_to_tabular_at(dir, appointments, Local::now().naive_local())
}

/// Export into `dir`, creating it when missing
pub fn export_to_tabular_at(
    dir: &Path,
    appointments: &[Appointment],
    now: NaiveDateTime,
) -> Result<PathBuf, ExportError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(now));

    write_appointments(File::create(&path)?, appointments)?;

    info!(
        "Exported {} appointments to {}",
        appointments.len(),
        path.display()
    );
    Ok(path)
}
