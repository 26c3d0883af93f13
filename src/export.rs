// src/export.rs

//! # Record and Metrics Export
//!
//! Tabular and JSON serialization for handing results to reporting or
//! plotting tools. The CSV layout has one row per [`Sample`] with a
//! header named after the sample fields.

use crate::error::Result;
use crate::simulation::{Sample, SimulationRecord};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::Path;

/// Writes the samples of `record` as CSV to `writer`.
pub fn write_record_csv<W: Write>(record: &SimulationRecord, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for sample in record.samples() {
        wtr.serialize(sample)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes the samples of `record` as CSV to `path`, creating parent directories.
pub fn save_record_csv<P: AsRef<Path>>(record: &SimulationRecord, path: P) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    write_record_csv(record, BufWriter::new(File::create(path)?))
}

/// Reads CSV samples written by [`write_record_csv`] back into a completed record.
pub fn read_record_csv<R: Read>(reader: R, time_step: f64) -> Result<SimulationRecord> {
    let mut rdr = csv::Reader::from_reader(reader);
    let samples = rdr.deserialize().collect::<std::result::Result<Vec<Sample>, _>>()?;
    Ok(SimulationRecord::from_samples(time_step, samples))
}

/// Pretty-printed JSON of any exported value.
pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Writes pretty-printed JSON of `value` to `writer`.
pub fn write_json<T: Serialize, W: Write>(value: &T, writer: W) -> Result<()> {
    serde_json::to_writer_pretty(writer, value)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationParameters;
    use crate::metrics::{extract_metrics, MetricsConfig, PerformanceMetrics};
    use crate::simulation::simulate;

    fn short_record() -> SimulationRecord {
        simulate(&SimulationParameters {
            time_step: 0.01,
            duration: 3.0,
            ..SimulationParameters::default()
        })
        .unwrap()
    }

    #[test]
    fn test_csv_layout() {
        let record = short_record();
        let mut buffer = Vec::new();
        write_record_csv(&record, &mut buffer).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            Some("time,commanded_altitude,true_altitude,sensed_altitude,thrust_command,thrust_force,control_error"),
            lines.next()
        );
        assert_eq!(record.len(), lines.count());
    }

    #[test]
    fn test_csv_read_back() {
        let record = short_record();
        let mut buffer = Vec::new();
        write_record_csv(&record, &mut buffer).unwrap();

        let restored = read_record_csv(buffer.as_slice(), record.time_step()).unwrap();
        assert_eq!(record.samples(), restored.samples());
    }

    #[test]
    fn test_save_csv_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runs").join("step.csv");

        save_record_csv(&short_record(), &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_json_metrics() {
        let record = short_record();
        let metrics = extract_metrics(&record, &MetricsConfig::default()).unwrap();

        let json = to_json(&metrics).unwrap();
        let parsed: PerformanceMetrics = serde_json::from_str(&json).unwrap();
        assert_eq!(metrics, parsed);

        let mut buffer = Vec::new();
        write_json(&record, &mut buffer).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!("completed", value["status"]["status"]);
        assert_eq!(record.len(), value["samples"].as_array().unwrap().len());
    }
}
