//! Deployment calibration for the cut predictor.
//!
//! The three constants below model field practice rather than physics and
//! differ between deployments, so they are configuration:
//!
//! - `overread_factor` (k): systematic OTDR overread correction, applied as
//!   `adjusted = otdr × k`.
//! - `slack_span_m` (S) and `slack_loop_m` (C): installers coil a slack loop of
//!   length `C` every `S` meters of route, so by the time the route has reached
//!   `d` meters the cable carries `floor(d / S) × C × ratio` meters of slack.
//!
//! `slack_ratio` is the per-run default for the ratio; callers may still pass
//! a different ratio per prediction.

use serde::{Deserialize, Serialize};

use crate::predict::PredictError;

pub const DEFAULT_OVERREAD_FACTOR: f64 = 1.005;
pub const DEFAULT_SLACK_SPAN_M: f64 = 500.0;
pub const DEFAULT_SLACK_LOOP_M: f64 = 15.0;
pub const DEFAULT_SLACK_RATIO: f64 = 1.1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    pub overread_factor: f64,
    pub slack_span_m: f64,
    pub slack_loop_m: f64,
    pub slack_ratio: f64,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            overread_factor: DEFAULT_OVERREAD_FACTOR,
            slack_span_m: DEFAULT_SLACK_SPAN_M,
            slack_loop_m: DEFAULT_SLACK_LOOP_M,
            slack_ratio: DEFAULT_SLACK_RATIO,
        }
    }
}

impl Calibration {
    /// Reject values the slack model cannot work with.
    pub fn validate(&self) -> Result<(), PredictError> {
        if !(self.overread_factor.is_finite() && self.overread_factor > 0.0) {
            return Err(PredictError::InvalidParameter {
                name: "overread factor",
                value: self.overread_factor,
            });
        }
        if !(self.slack_span_m.is_finite() && self.slack_span_m > 0.0) {
            return Err(PredictError::InvalidParameter {
                name: "slack span",
                value: self.slack_span_m,
            });
        }
        if !(self.slack_loop_m.is_finite() && self.slack_loop_m >= 0.0) {
            return Err(PredictError::InvalidParameter {
                name: "slack loop length",
                value: self.slack_loop_m,
            });
        }
        validate_slack_ratio(self.slack_ratio)
    }

    /// OTDR reading after overread correction.
    pub fn adjusted_distance(&self, distance_otdr_m: f64) -> f64 {
        distance_otdr_m * self.overread_factor
    }

    /// Slack accumulated once the route has reached `reach_m` meters.
    pub fn slack_adjustment(&self, reach_m: f64, slack_ratio: f64) -> f64 {
        (reach_m / self.slack_span_m).floor() * self.slack_loop_m * slack_ratio
    }
}

pub(crate) fn validate_slack_ratio(slack_ratio: f64) -> Result<(), PredictError> {
    if slack_ratio.is_finite() && slack_ratio > 0.0 {
        Ok(())
    } else {
        Err(PredictError::InvalidParameter {
            name: "slack ratio",
            value: slack_ratio,
        })
    }
}
