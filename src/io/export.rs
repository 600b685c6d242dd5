//! Prediction exports.
//!
//! - a single prediction as pretty JSON (the "portable" record of a run)
//! - batch results as CSV, one row per reading, easy to open in a spreadsheet

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::domain::CutTrace;
use crate::error::AppError;
use crate::predict::Calibration;
use crate::report::maps_url;
use crate::topology::SegmentSelection;

/// JSON record of one prediction.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionRecord {
    pub tool: String,
    pub generated_at: DateTime<Local>,
    pub city: String,
    pub olt: String,
    pub segment_id: String,
    pub slack_ratio: f64,
    pub calibration: Calibration,
    pub trace: CutTrace,
    pub map_url: String,
}

impl PredictionRecord {
    pub fn new(selection: &SegmentSelection, calibration: &Calibration, slack_ratio: f64, trace: &CutTrace) -> Self {
        Self {
            tool: "cutloc".to_string(),
            generated_at: Local::now(),
            city: selection.city.clone(),
            olt: selection.olt.clone(),
            segment_id: selection.segment_id.clone(),
            slack_ratio,
            calibration: *calibration,
            trace: trace.clone(),
            map_url: maps_url(trace.location),
        }
    }
}

/// Outcome of one batch reading, successful or not.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub line: usize,
    pub segment_id: String,
    pub distance_m: f64,
    pub slack_ratio: f64,
    pub result: Result<CutTrace, String>,
}

#[derive(Debug, Serialize)]
struct BatchCsvRow<'a> {
    line: usize,
    segment_id: &'a str,
    distance_m: f64,
    slack_ratio: f64,
    latitude: Option<String>,
    longitude: Option<String>,
    span_from: Option<&'a str>,
    span_to: Option<&'a str>,
    within_span_m: Option<String>,
    map_url: Option<String>,
    error: Option<&'a str>,
}

/// Write a single prediction as JSON.
pub fn write_prediction_json(path: &Path, record: &PredictionRecord) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create prediction JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, record)
        .map_err(|e| AppError::new(2, format!("Failed to write prediction JSON: {e}")))?;
    Ok(())
}

/// Write batch outcomes as CSV.
pub fn write_batch_csv(path: &Path, outcomes: &[BatchOutcome]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_batch_rows(file, outcomes)
}

fn write_batch_rows<W: std::io::Write>(out: W, outcomes: &[BatchOutcome]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(out);
    for o in outcomes {
        let row = match &o.result {
            Ok(trace) => BatchCsvRow {
                line: o.line,
                segment_id: &o.segment_id,
                distance_m: o.distance_m,
                slack_ratio: o.slack_ratio,
                latitude: Some(format!("{:.6}", trace.location.latitude)),
                longitude: Some(format!("{:.6}", trace.location.longitude)),
                span_from: Some(trace.start_pole.as_str()),
                span_to: trace.end_pole.as_deref(),
                within_span_m: Some(format!("{:.2}", trace.distance_within_span_m)),
                map_url: Some(maps_url(trace.location)),
                error: None,
            },
            Err(message) => BatchCsvRow {
                line: o.line,
                segment_id: &o.segment_id,
                distance_m: o.distance_m,
                slack_ratio: o.slack_ratio,
                latitude: None,
                longitude: None,
                span_from: None,
                span_to: None,
                within_span_m: None,
                map_url: None,
                error: Some(message.as_str()),
            },
        };
        writer
            .serialize(row)
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}
