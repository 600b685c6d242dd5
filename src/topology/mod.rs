//! In-memory FTTH network topology and city → OLT → segment selection.
//!
//! The topology is built once from the three ingested tables and is then
//! only read. Keys are compared after trimming and case-insensitively so that
//! hand-maintained spreadsheets (`"OLT-01 "`, `"olt-01"`) still match.

use std::collections::HashMap;

use crate::domain::{Coordinate, Olt, Pole, SegmentPoleEntry, SegmentRow};
use crate::error::AppError;
use crate::predict::{PoleLookup, PredictError};

/// Which segment to predict on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentSelection {
    pub city: String,
    pub olt: String,
    pub segment_id: String,
}

#[derive(Debug, Clone, Default)]
pub struct Topology {
    poles: HashMap<String, Coordinate>,
    segments: Vec<SegmentRow>,
    olts: Vec<Olt>,
    /// Segment ids that lost rows during ingest.
    incomplete_segments: Vec<String>,
}

impl Topology {
    /// Build from ingested tables. The first occurrence of a pole id wins.
    pub fn new(poles: Vec<Pole>, segments: Vec<SegmentRow>, olts: Vec<Olt>) -> Self {
        let mut pole_map = HashMap::with_capacity(poles.len());
        for pole in poles {
            pole_map.entry(pole.id).or_insert(pole.position);
        }
        Self {
            poles: pole_map,
            segments,
            olts,
            incomplete_segments: Vec::new(),
        }
    }

    /// Mark segments whose chains are missing rows; they refuse predictions.
    pub fn with_incomplete_segments(mut self, segment_ids: Vec<String>) -> Self {
        self.incomplete_segments = segment_ids;
        self
    }

    /// Cities served by at least one OLT, in first-seen order.
    pub fn cities(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for olt in &self.olts {
            if !out.iter().any(|c| same_key(c, &olt.residences)) {
                out.push(olt.residences.clone());
            }
        }
        out
    }

    /// OLTs in `city`, deduplicated by id.
    pub fn olts_in_city(&self, city: &str) -> Result<Vec<&Olt>, AppError> {
        let mut out: Vec<&Olt> = Vec::new();
        for olt in self.olts.iter().filter(|o| same_key(&o.residences, city)) {
            if !out.iter().any(|o| same_key(&o.olt_id, &olt.olt_id)) {
                out.push(olt);
            }
        }
        if out.is_empty() {
            return Err(AppError::new(2, format!("Invalid City: {city}")));
        }
        Ok(out)
    }

    /// Segment ids fed by `olt` (id or name) in `city`, in first-seen order.
    pub fn segments_for(&self, city: &str, olt: &str) -> Result<Vec<String>, AppError> {
        let olts = self.olts_in_city(city)?;
        if !olts.iter().any(|o| o.matches(olt)) {
            return Err(AppError::new(2, format!("Invalid OLT: {olt}")));
        }

        let mut out: Vec<String> = Vec::new();
        for row in self.rows_for(city, olt) {
            if !out.iter().any(|s| same_key(s, &row.segment_id)) {
                out.push(row.segment_id.clone());
            }
        }
        if out.is_empty() {
            return Err(AppError::new(
                3,
                format!("No segments found for OLT {olt} in {city}."),
            ));
        }
        Ok(out)
    }

    /// Ordered pole chain of the selected segment.
    pub fn segment_poles(&self, selection: &SegmentSelection) -> Result<Vec<SegmentPoleEntry>, AppError> {
        self.ensure_complete(&selection.segment_id)?;
        let chain: Vec<SegmentPoleEntry> = self
            .rows_for(&selection.city, &selection.olt)
            .filter(|r| same_key(&r.segment_id, &selection.segment_id))
            .map(SegmentRow::entry)
            .collect();
        if chain.is_empty() {
            return Err(invalid_segment(&selection.segment_id));
        }
        Ok(chain)
    }

    /// Pole chain of `segment_id` when city/OLT are not given.
    ///
    /// Fails if the id is unknown or is used by more than one city/OLT pair.
    pub fn segment_poles_by_id(&self, segment_id: &str) -> Result<Vec<SegmentPoleEntry>, AppError> {
        self.ensure_complete(segment_id)?;
        let rows: Vec<&SegmentRow> = self
            .segments
            .iter()
            .filter(|r| same_key(&r.segment_id, segment_id))
            .collect();
        let Some(first) = rows.first() else {
            return Err(invalid_segment(segment_id));
        };
        let ambiguous = rows
            .iter()
            .any(|r| !same_key(&r.residences, &first.residences) || !same_key(&r.olt_id, &first.olt_id));
        if ambiguous {
            return Err(AppError::new(
                2,
                format!("Segment_ID {segment_id} is used by several OLTs; specify city and OLT."),
            ));
        }
        Ok(rows.into_iter().map(SegmentRow::entry).collect())
    }

    fn ensure_complete(&self, segment_id: &str) -> Result<(), AppError> {
        if self.incomplete_segments.iter().any(|s| same_key(s, segment_id)) {
            return Err(PredictError::InvalidSegment(format!(
                "Segment_ID {} has rows that could not be read, so its pole chain has gaps.",
                segment_id.trim()
            ))
            .into());
        }
        Ok(())
    }

    fn rows_for<'a>(&'a self, city: &'a str, olt: &'a str) -> impl Iterator<Item = &'a SegmentRow> + 'a {
        self.segments.iter().filter(move |r| {
            same_key(&r.residences, city)
                && (same_key(&r.olt_id, olt)
                    || r.olt_name.as_deref().map(|n| same_key(n, olt)).unwrap_or(false))
        })
    }
}

impl PoleLookup for Topology {
    fn coordinates(&self, pole_id: &str) -> Option<Coordinate> {
        self.poles.get(pole_id.trim()).copied()
    }
}

fn same_key(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

fn invalid_segment(segment_id: &str) -> AppError {
    AppError::new(
        2,
        format!("Invalid Segment_ID: {segment_id}. Please check your input."),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(city: &str, olt: &str, name: Option<&str>, seg: &str, pole: &str, d: f64) -> SegmentRow {
        SegmentRow {
            residences: city.to_string(),
            olt_id: olt.to_string(),
            olt_name: name.map(str::to_string),
            segment_id: seg.to_string(),
            pole_id: pole.to_string(),
            distance_m: d,
        }
    }

    fn olt(city: &str, id: &str, name: Option<&str>) -> Olt {
        Olt {
            residences: city.to_string(),
            olt_id: id.to_string(),
            olt_name: name.map(str::to_string),
        }
    }

    fn sample() -> Topology {
        let poles = vec![
            Pole { id: "P1".to_string(), position: Coordinate::new(1.0, 1.0) },
            Pole { id: "P2".to_string(), position: Coordinate::new(2.0, 2.0) },
            Pole { id: "P1".to_string(), position: Coordinate::new(9.0, 9.0) },
        ];
        let segments = vec![
            row("Bandung", "OLT-1", Some("Cibiru"), "S1", "P1", 100.0),
            row("Bandung", "OLT-1", Some("Cibiru"), "S1", "P2", 0.0),
            row("Bandung", "OLT-1", Some("Cibiru"), "S2", "P2", 50.0),
            row("Bandung", "OLT-2", None, "S3", "P1", 10.0),
            row("Jakarta", "OLT-9", None, "S3", "P2", 10.0),
        ];
        let olts = vec![
            olt("Bandung", "OLT-1", Some("Cibiru")),
            olt("Bandung", "OLT-1", Some("Cibiru")),
            olt("Bandung", "OLT-2", None),
            olt("Jakarta", "OLT-9", None),
            olt("Surabaya", "OLT-7", None),
        ];
        Topology::new(poles, segments, olts)
    }

    #[test]
    fn first_pole_occurrence_wins() {
        let t = sample();
        assert_eq!(t.coordinates(" P1 "), Some(Coordinate::new(1.0, 1.0)));
        assert_eq!(t.coordinates("P2"), Some(Coordinate::new(2.0, 2.0)));
    }

    #[test]
    fn cities_and_olts_are_unique_in_order() {
        let t = sample();
        assert_eq!(t.cities(), vec!["Bandung", "Jakarta", "Surabaya"]);
        let olts = t.olts_in_city("bandung").unwrap();
        let ids: Vec<&str> = olts.iter().map(|o| o.olt_id.as_str()).collect();
        assert_eq!(ids, vec!["OLT-1", "OLT-2"]);
        assert!(t.olts_in_city("Medan").is_err());
    }

    #[test]
    fn segments_match_olt_by_id_or_name() {
        let t = sample();
        assert_eq!(t.segments_for("Bandung", "OLT-1").unwrap(), vec!["S1", "S2"]);
        assert_eq!(t.segments_for("Bandung", "cibiru").unwrap(), vec!["S1", "S2"]);
        assert_eq!(t.segments_for("Bandung", "OLT-9").unwrap_err().exit_code(), 2);

        let err = t.segments_for("Surabaya", "OLT-7").unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("No segments found"));
    }

    #[test]
    fn segment_chain_keeps_file_order() {
        let t = sample();
        let sel = SegmentSelection {
            city: "Bandung".to_string(),
            olt: "Cibiru".to_string(),
            segment_id: "S1".to_string(),
        };
        let chain = t.segment_poles(&sel).unwrap();
        assert_eq!(chain, vec![SegmentPoleEntry::new("P1", 100.0), SegmentPoleEntry::new("P2", 0.0)]);

        let missing = SegmentSelection {
            segment_id: "S9".to_string(),
            ..sel
        };
        let err = t.segment_poles(&missing).unwrap_err();
        assert!(err.to_string().starts_with("Invalid Segment_ID: S9"));
    }

    #[test]
    fn lookup_by_id_detects_ambiguity() {
        let t = sample();
        assert_eq!(t.segment_poles_by_id("S2").unwrap().len(), 1);
        assert!(t.segment_poles_by_id("S3").unwrap_err().to_string().contains("several OLTs"));
        assert!(t.segment_poles_by_id("nope").is_err());
    }

    #[test]
    fn incomplete_segments_refuse_both_lookups() {
        let t = sample().with_incomplete_segments(vec!["S1".to_string()]);
        let sel = SegmentSelection {
            city: "Bandung".to_string(),
            olt: "OLT-1".to_string(),
            segment_id: " s1".to_string(),
        };
        let err = t.segment_poles(&sel).unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("Segment_ID s1 has rows that could not be read"), "{err}");
        assert_eq!(t.segment_poles_by_id("S1").unwrap_err().exit_code(), 3);
        assert_eq!(t.segment_poles_by_id("S2").unwrap().len(), 1);
    }
}
