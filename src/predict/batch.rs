//! Parallel evaluation of many OTDR readings.
//!
//! Predictions are independent and read-only over the shared lookup, so they
//! fan out over rayon's pool. Output order matches input order.

use rayon::prelude::*;

use crate::domain::{CutTrace, SegmentPoleEntry};
use crate::predict::{CutPredictor, PoleLookup, PredictError};

/// One reading to evaluate against a resolved segment.
#[derive(Debug, Clone, Copy)]
pub struct BatchJob<'a> {
    pub segment_poles: &'a [SegmentPoleEntry],
    pub distance_otdr: f64,
    pub slack_ratio: f64,
}

/// Trace every job; each job fails or succeeds on its own.
pub fn predict_batch<L>(
    predictor: &CutPredictor,
    jobs: &[BatchJob<'_>],
    pole_lookup: &L,
) -> Vec<Result<CutTrace, PredictError>>
where
    L: PoleLookup + Sync + ?Sized,
{
    jobs.par_iter()
        .map(|job| predictor.trace(job.segment_poles, pole_lookup, job.distance_otdr, job.slack_ratio))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Coordinate;
    use std::collections::HashMap;

    #[test]
    fn batch_preserves_order_and_isolates_failures() {
        let poles: HashMap<String, Coordinate> = [
            ("P1".to_string(), Coordinate::new(10.0, 100.0)),
            ("P2".to_string(), Coordinate::new(10.002, 100.0)),
        ]
        .into_iter()
        .collect();
        let segment = vec![SegmentPoleEntry::new("P1", 300.0), SegmentPoleEntry::new("P2", 200.0)];
        let broken = vec![SegmentPoleEntry::new("P9", 100.0)];

        let distances = [0.0, 100.0, 250.0, 400.0, 10_000.0];
        let mut jobs: Vec<BatchJob<'_>> = distances
            .iter()
            .map(|&d| BatchJob {
                segment_poles: &segment,
                distance_otdr: d,
                slack_ratio: 1.1,
            })
            .collect();
        jobs.push(BatchJob {
            segment_poles: &broken,
            distance_otdr: 10.0,
            slack_ratio: 1.1,
        });

        let predictor = CutPredictor::default();
        let results = predict_batch(&predictor, &jobs, &poles);
        assert_eq!(results.len(), jobs.len());

        for (job, result) in jobs.iter().zip(&results).take(4) {
            let expected = predictor
                .trace(job.segment_poles, &poles, job.distance_otdr, job.slack_ratio)
                .unwrap();
            assert_eq!(result.as_ref().unwrap(), &expected);
        }
        assert!(matches!(results[4], Err(PredictError::OutOfRange { .. })));
        assert!(matches!(results[5], Err(PredictError::Lookup { .. })));
    }
}
