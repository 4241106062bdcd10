//! CSV export for trajectory samples.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::sim::types::Sample;

/// Column header for trajectory CSV export.
pub const HEADER: &str = "t,Ppv,Pwind,Pload,Pdg,Pb,f,soc,fuelLh,pvCurtMW,windCurtMW";

/// Exports samples to a CSV file at the given path.
///
/// Writes a header row followed by one data row per sample. Produces
/// deterministic output for identical inputs.
///
/// # Arguments
///
/// * `samples` - Trajectory samples, oldest first
/// * `path` - Output file path
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(samples: &[Sample], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(samples, buf)
}

/// Writes samples as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(samples: &[Sample], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(','))?;

    for s in samples {
        wtr.write_record(&[
            format!("{:.3}", s.t_s),
            format!("{:.4}", s.pv_mw),
            format!("{:.4}", s.wind_mw),
            format!("{:.4}", s.load_mw),
            format!("{:.4}", s.diesel_mw),
            format!("{:.4}", s.battery_mw),
            format!("{:.5}", s.frequency_hz),
            format!("{:.5}", s.soc),
            format!("{:.2}", s.fuel_rate_l_per_h),
            format!("{:.4}", s.pv_curtailed_mw),
            format!("{:.4}", s.wind_curtailed_mw),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
