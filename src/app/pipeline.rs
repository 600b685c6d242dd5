//! Shared prediction pipeline used by the `predict` and `batch` commands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! segment resolution -> cut prediction -> outcome assembly
//!
//! The commands can then focus on selection and presentation.

use crate::domain::{CutTrace, OtdrReading, SegmentPoleEntry};
use crate::error::AppError;
use crate::io::BatchOutcome;
use crate::predict::{BatchJob, CutPredictor, predict_batch};
use crate::topology::{SegmentSelection, Topology};

/// Predict the cut for one reading on the selected segment.
pub fn run_prediction(
    topology: &Topology,
    predictor: &CutPredictor,
    selection: &SegmentSelection,
    distance_otdr: f64,
    slack_ratio: f64,
) -> Result<CutTrace, AppError> {
    let chain = topology.segment_poles(selection)?;
    tracing::info!(
        segment = %selection.segment_id,
        poles = chain.len(),
        distance_otdr,
        "predicting cut location"
    );
    let trace = predictor.trace(&chain, topology, distance_otdr, slack_ratio)?;
    Ok(trace)
}

/// Defaults applied to readings that leave fields empty.
#[derive(Debug, Clone, Default)]
pub struct BatchDefaults {
    pub city: Option<String>,
    pub olt: Option<String>,
    pub slack_ratio: f64,
}

/// Predict every reading; failures are recorded per reading.
///
/// Segment resolution is sequential (cheap lookups); predictions run in
/// parallel.
pub fn run_batch(
    topology: &Topology,
    predictor: &CutPredictor,
    readings: &[OtdrReading],
    defaults: &BatchDefaults,
) -> Vec<BatchOutcome> {
    let chains: Vec<Result<Vec<SegmentPoleEntry>, AppError>> = readings
        .iter()
        .map(|r| resolve_chain(topology, r, defaults))
        .collect();

    let mut jobs = Vec::new();
    let mut job_of_reading = Vec::with_capacity(readings.len());
    for (reading, chain) in readings.iter().zip(&chains) {
        match chain {
            Ok(chain) => {
                job_of_reading.push(Some(jobs.len()));
                jobs.push(BatchJob {
                    segment_poles: chain,
                    distance_otdr: reading.distance_m,
                    slack_ratio: reading.slack_ratio.unwrap_or(defaults.slack_ratio),
                });
            }
            Err(_) => job_of_reading.push(None),
        }
    }

    tracing::info!(readings = readings.len(), jobs = jobs.len(), "running batch predictions");
    let mut results: Vec<Option<Result<CutTrace, String>>> = predict_batch(predictor, &jobs, topology)
        .into_iter()
        .map(|r| Some(r.map_err(|e| AppError::from(e).to_string())))
        .collect();

    readings
        .iter()
        .zip(chains)
        .zip(job_of_reading)
        .map(|((reading, chain), job)| {
            let result = match (chain, job) {
                (Err(e), _) => Err(e.to_string()),
                (Ok(_), Some(idx)) => results[idx]
                    .take()
                    .unwrap_or_else(|| Err("prediction result missing".to_string())),
                (Ok(_), None) => Err("prediction result missing".to_string()),
            };
            if let Err(message) = &result {
                tracing::warn!(line = reading.line, segment = %reading.segment_id, "{message}");
            }
            BatchOutcome {
                line: reading.line,
                segment_id: reading.segment_id.clone(),
                distance_m: reading.distance_m,
                slack_ratio: reading.slack_ratio.unwrap_or(defaults.slack_ratio),
                result,
            }
        })
        .collect()
}

fn resolve_chain(
    topology: &Topology,
    reading: &OtdrReading,
    defaults: &BatchDefaults,
) -> Result<Vec<SegmentPoleEntry>, AppError> {
    let city = reading.city.as_ref().or(defaults.city.as_ref());
    let olt = reading.olt.as_ref().or(defaults.olt.as_ref());
    match (city, olt) {
        (Some(city), Some(olt)) => topology.segment_poles(&SegmentSelection {
            city: city.clone(),
            olt: olt.clone(),
            segment_id: reading.segment_id.clone(),
        }),
        _ => topology.segment_poles_by_id(&reading.segment_id),
    }
}
