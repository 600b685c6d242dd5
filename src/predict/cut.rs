//! Span search along a segment's pole chain.
//!
//! The chain is walked once, in routing order. At every entry the slack model
//! is re-evaluated for the distance reached so far, because slack loops accrue
//! progressively along the route. The first span whose far end reaches the
//! slack-corrected reading holds the cut; the exact point is found by
//! projecting from the span's start pole toward its end pole.

use crate::domain::{Coordinate, CutTrace, SegmentPoleEntry};
use crate::geodesy::{destination, initial_bearing};
use crate::predict::calibration::validate_slack_ratio;
use crate::predict::{Calibration, PoleLookup, PredictError};

/// Predict a cut location with the default calibration.
pub fn predict_cut_location<L: PoleLookup + ?Sized>(
    segment_poles: &[SegmentPoleEntry],
    pole_lookup: &L,
    distance_otdr: f64,
    slack_ratio: f64,
) -> Result<Coordinate, PredictError> {
    CutPredictor::default().predict(segment_poles, pole_lookup, distance_otdr, slack_ratio)
}

/// Cut predictor bound to one deployment's calibration.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CutPredictor {
    calibration: Calibration,
}

impl CutPredictor {
    pub fn new(calibration: Calibration) -> Result<Self, PredictError> {
        calibration.validate()?;
        Ok(Self { calibration })
    }

    /// Predicted cut coordinates.
    pub fn predict<L: PoleLookup + ?Sized>(
        &self,
        segment_poles: &[SegmentPoleEntry],
        pole_lookup: &L,
        distance_otdr: f64,
        slack_ratio: f64,
    ) -> Result<Coordinate, PredictError> {
        self.trace(segment_poles, pole_lookup, distance_otdr, slack_ratio)
            .map(|trace| trace.location)
    }

    /// Predicted cut coordinates plus the quantities that led to them.
    pub fn trace<L: PoleLookup + ?Sized>(
        &self,
        segment_poles: &[SegmentPoleEntry],
        pole_lookup: &L,
        distance_otdr: f64,
        slack_ratio: f64,
    ) -> Result<CutTrace, PredictError> {
        validate_chain(segment_poles)?;
        if !(distance_otdr.is_finite() && distance_otdr >= 0.0) {
            return Err(PredictError::InvalidParameter {
                name: "OTDR distance",
                value: distance_otdr,
            });
        }
        validate_slack_ratio(slack_ratio)?;

        let adjusted = self.calibration.adjusted_distance(distance_otdr);
        tracing::debug!(distance_otdr, adjusted, slack_ratio, "walking pole chain");

        let mut accumulated = 0.0_f64;
        for (idx, entry) in segment_poles.iter().enumerate() {
            let reach = accumulated + entry.distance_m;
            let slack = self.calibration.slack_adjustment(reach, slack_ratio);
            let effective = adjusted - slack;

            if reach < effective {
                accumulated = reach;
                continue;
            }

            // `reach >= effective` guarantees this is >= 0 up to rounding.
            let within = (effective - accumulated).max(0.0);
            let start = resolve(pole_lookup, &entry.pole_id)?;
            let next = segment_poles.get(idx + 1);
            let end = next
                .map(|n| resolve(pole_lookup, &n.pole_id))
                .transpose()?;

            let (location, along_chain) = match end {
                // Chain ends at this pole: there is nothing to project toward.
                None => (start, accumulated),
                // Cut sits exactly at the start pole.
                Some(_) if within == 0.0 => (start, accumulated),
                // Co-located poles have no bearing.
                Some(end) if end == start => (start, accumulated + within),
                Some(end) => {
                    let bearing = initial_bearing(start, end);
                    (destination(start, bearing, within / 1000.0), accumulated + within)
                }
            };

            tracing::debug!(
                span = idx,
                start_pole = %entry.pole_id,
                slack,
                effective,
                within,
                "cut located"
            );

            return Ok(CutTrace {
                location,
                distance_otdr_m: distance_otdr,
                adjusted_distance_m: adjusted,
                slack_adjustment_m: slack,
                effective_distance_m: effective,
                span_index: idx,
                start_pole: entry.pole_id.clone(),
                end_pole: next.map(|n| n.pole_id.clone()),
                distance_within_span_m: within,
                along_chain_m: along_chain,
            });
        }

        Err(PredictError::OutOfRange {
            adjusted_m: adjusted,
            chain_m: accumulated,
        })
    }
}

fn validate_chain(segment_poles: &[SegmentPoleEntry]) -> Result<(), PredictError> {
    if segment_poles.is_empty() {
        return Err(PredictError::InvalidSegment("segment has no poles".to_string()));
    }
    if let Some(bad) = segment_poles
        .iter()
        .find(|e| !(e.distance_m.is_finite() && e.distance_m >= 0.0))
    {
        return Err(PredictError::InvalidSegment(format!(
            "pole '{}' has invalid forward distance {}",
            bad.pole_id, bad.distance_m
        )));
    }
    Ok(())
}

fn resolve<L: PoleLookup + ?Sized>(lookup: &L, pole_id: &str) -> Result<Coordinate, PredictError> {
    lookup
        .coordinates(pole_id)
        .ok_or_else(|| PredictError::Lookup {
            pole_id: pole_id.to_string(),
        })
}
