//! Shared domain types.
//!
//! Reference data (poles, segments, OLTs) is loaded once and never mutated;
//! prediction outputs are computed fresh per request. Everything here is
//! serializable so results can be exported as JSON/CSV.

use serde::{Deserialize, Serialize};

/// A geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

/// A pole from the poles table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pole {
    pub id: String,
    pub position: Coordinate,
}

/// One link of a segment's ordered pole chain.
///
/// `distance_m` is the forward distance from this pole to the next one in
/// chain order (meters). Chain order is the physical routing direction away
/// from the segment origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentPoleEntry {
    pub pole_id: String,
    pub distance_m: f64,
}

impl SegmentPoleEntry {
    pub fn new(pole_id: impl Into<String>, distance_m: f64) -> Self {
        Self {
            pole_id: pole_id.into(),
            distance_m,
        }
    }
}

/// A raw row of the segments table.
///
/// Rows sharing `(residences, olt_id, segment_id)` form one segment, ordered
/// by their position in the file.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentRow {
    pub residences: String,
    pub olt_id: String,
    pub olt_name: Option<String>,
    pub segment_id: String,
    pub pole_id: String,
    pub distance_m: f64,
}

impl SegmentRow {
    pub fn entry(&self) -> SegmentPoleEntry {
        SegmentPoleEntry::new(self.pole_id.clone(), self.distance_m)
    }
}

/// An Optical Line Terminal serving a city ("residences").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Olt {
    pub residences: String,
    pub olt_id: String,
    pub olt_name: Option<String>,
}

impl Olt {
    /// Label used in listings and prompts.
    pub fn label(&self) -> String {
        match &self.olt_name {
            Some(name) if name != &self.olt_id => format!("{} ({name})", self.olt_id),
            _ => self.olt_id.clone(),
        }
    }

    /// Whether `key` names this OLT by id or by display name (case-insensitive).
    pub fn matches(&self, key: &str) -> bool {
        let key = key.trim();
        self.olt_id.eq_ignore_ascii_case(key)
            || self
                .olt_name
                .as_deref()
                .map(|n| n.eq_ignore_ascii_case(key))
                .unwrap_or(false)
    }
}

/// One row of a batch readings file.
#[derive(Debug, Clone, PartialEq)]
pub struct OtdrReading {
    /// 1-based line in the source file (for error reporting).
    pub line: usize,
    pub segment_id: String,
    pub city: Option<String>,
    pub olt: Option<String>,
    pub distance_m: f64,
    /// Overrides the run's default slack ratio for this reading.
    pub slack_ratio: Option<f64>,
}

/// Intermediate quantities of a single cut prediction.
///
/// `location` is the predicted cut; the remaining fields explain how the
/// predictor got there and feed the report/exports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CutTrace {
    pub location: Coordinate,
    /// Raw OTDR reading (m).
    pub distance_otdr_m: f64,
    /// OTDR reading after overread correction (m).
    pub adjusted_distance_m: f64,
    /// Slack subtracted at the span where the cut was found (m).
    pub slack_adjustment_m: f64,
    /// Adjusted distance minus slack (m).
    pub effective_distance_m: f64,
    /// Index of the chain entry the span starts at.
    pub span_index: usize,
    pub start_pole: String,
    /// `None` when the cut sits at the last pole of the chain.
    pub end_pole: Option<String>,
    /// Distance from `start_pole` toward `end_pole` (m, clamped at 0).
    pub distance_within_span_m: f64,
    /// Distance walked along the chain up to the cut (m).
    pub along_chain_m: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn olt_matches_id_or_name() {
        let olt = Olt {
            residences: "Bandung".to_string(),
            olt_id: "OLT-01".to_string(),
            olt_name: Some("Cibiru".to_string()),
        };
        assert!(olt.matches("olt-01"));
        assert!(olt.matches(" CIBIRU "));
        assert!(!olt.matches("OLT-02"));
        assert_eq!(olt.label(), "OLT-01 (Cibiru)");
    }

    #[test]
    fn coordinate_display_uses_six_decimals() {
        let c = Coordinate::new(10.0022581, 100.0);
        assert_eq!(c.to_string(), "10.002258, 100.000000");
    }
}
