//! CSV ingest and normalization for the network tables.
//!
//! Three tables describe the network (poles, segments, OLTs) and a fourth,
//! optional one holds batch OTDR readings. Each is parsed the same way:
//!
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Tolerant headers**: case, surrounding whitespace, a UTF-8 BOM and
//!   punctuation are ignored, so `Distance (m)` and `distance_m` are the same
//!   column.
//! - String fields are trimmed.

use std::collections::{HashMap, HashSet};
use std::io::Read;

use csv::StringRecord;

use crate::domain::{Coordinate, Olt, OtdrReading, Pole, SegmentRow};
use crate::error::AppError;
use crate::io::source::open_source;
use crate::topology::Topology;

const POLES_TABLE: &str = "poles";
const SEGMENTS_TABLE: &str = "segments";
const OLTS_TABLE: &str = "olts";
const READINGS_TABLE: &str = "readings";

/// Where to load each network table from (path or URL).
#[derive(Debug, Clone)]
pub struct DataSources {
    pub poles: String,
    pub segments: String,
    pub olts: String,
}

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub table: &'static str,
    pub line: usize,
    pub id: Option<String>,
    /// `Segment_ID` of the row, when it had one.
    pub segment_id: Option<String>,
    pub message: String,
}

impl std::fmt::Display for RowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.id {
            Some(id) => write!(f, "{} line {} ({id}): {}", self.table, self.line, self.message),
            None => write!(f, "{} line {}: {}", self.table, self.line, self.message),
        }
    }
}

/// Parsed rows of one table plus what was skipped.
#[derive(Debug, Clone)]
pub struct TableRows<T> {
    pub rows: Vec<T>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// All network tables, assembled into a topology.
#[derive(Debug, Clone)]
pub struct NetworkData {
    pub topology: Topology,
    pub row_errors: Vec<RowError>,
}

/// Load the three network tables and build the topology.
pub fn load_network(sources: &DataSources) -> Result<NetworkData, AppError> {
    let poles = read_poles(open_source(&sources.poles)?.as_slice())?;
    let segments = read_segments(open_source(&sources.segments)?.as_slice())?;
    let olts = read_olts(open_source(&sources.olts)?.as_slice())?;
    build_network(poles, segments, olts)
}

/// Assemble parsed tables into a topology.
///
/// Skipped pole and OLT rows only shrink the lookup tables. A skipped segment
/// row is a missing link in an ordered chain, so its segment is marked
/// incomplete and refuses predictions. A skipped segment row without a
/// `Segment_ID` cannot be attributed and fails the load.
pub fn build_network(
    poles: TableRows<Pole>,
    segments: TableRows<SegmentRow>,
    olts: TableRows<Olt>,
) -> Result<NetworkData, AppError> {
    tracing::info!(
        poles = poles.rows.len(),
        segment_rows = segments.rows.len(),
        olts = olts.rows.len(),
        "network tables loaded"
    );

    if poles.rows.is_empty() {
        return Err(AppError::new(3, "No valid rows in the poles table."));
    }
    if segments.rows.is_empty() {
        return Err(AppError::new(3, "No valid rows in the segments table."));
    }
    if olts.rows.is_empty() {
        return Err(AppError::new(3, "No valid rows in the OLT table."));
    }

    let mut incomplete: Vec<String> = Vec::new();
    for err in &segments.row_errors {
        let Some(segment_id) = &err.segment_id else {
            return Err(AppError::new(
                3,
                format!("Unreadable segment row without a Segment_ID ({err}); fix the segments table."),
            ));
        };
        if !incomplete.contains(segment_id) {
            incomplete.push(segment_id.clone());
        }
    }
    if !incomplete.is_empty() {
        tracing::warn!(segments = ?incomplete, "segments with unreadable rows are unavailable");
    }

    let mut row_errors = poles.row_errors;
    row_errors.extend(segments.row_errors);
    row_errors.extend(olts.row_errors);
    for err in &row_errors {
        tracing::warn!("skipped row: {err}");
    }

    Ok(NetworkData {
        topology: Topology::new(poles.rows, segments.rows, olts.rows).with_incomplete_segments(incomplete),
        row_errors,
    })
}

/// Parse the poles table (`Pole_ID`, `Latitude`, `Longitude`).
///
/// Duplicate ids keep the first row; later ones are reported.
pub fn read_poles<R: Read>(reader: R) -> Result<TableRows<Pole>, AppError> {
    let mut seen = HashSet::new();
    read_table(reader, POLES_TABLE, &["pole_id", "latitude", "longitude"], |row| {
        let id = row.required("pole_id")?.to_string();
        let latitude = row.required_f64("latitude")?;
        let longitude = row.required_f64("longitude")?;
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(format!("Latitude {latitude} outside [-90, 90]."));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(format!("Longitude {longitude} outside [-180, 180]."));
        }
        if !seen.insert(id.clone()) {
            return Err(format!("Duplicate Pole_ID '{id}' (first occurrence kept)."));
        }
        Ok(Pole {
            id,
            position: Coordinate::new(latitude, longitude),
        })
    })
}

/// Parse the segments table
/// (`Residences`, `OLT_ID`, `Segment_ID`, `Pole_ID`, `Distance (m)`, optional `OLT_Name`).
pub fn read_segments<R: Read>(reader: R) -> Result<TableRows<SegmentRow>, AppError> {
    read_table(
        reader,
        SEGMENTS_TABLE,
        &["residences", "olt_id", "segment_id", "pole_id", "distance_m"],
        |row| {
            let distance_m = row.required_f64("distance_m")?;
            if distance_m < 0.0 {
                return Err(format!("Negative distance {distance_m}."));
            }
            Ok(SegmentRow {
                residences: row.required("residences")?.to_string(),
                olt_id: row.required("olt_id")?.to_string(),
                olt_name: row.optional("olt_name").map(str::to_string),
                segment_id: row.required("segment_id")?.to_string(),
                pole_id: row.required("pole_id")?.to_string(),
                distance_m,
            })
        },
    )
}

/// Parse the OLT table (`Residences`, `OLT_ID`, optional `OLT_Name`).
pub fn read_olts<R: Read>(reader: R) -> Result<TableRows<Olt>, AppError> {
    read_table(reader, OLTS_TABLE, &["residences", "olt_id"], |row| {
        Ok(Olt {
            residences: row.required("residences")?.to_string(),
            olt_id: row.required("olt_id")?.to_string(),
            olt_name: row.optional("olt_name").map(str::to_string),
        })
    })
}

/// Parse a batch readings file
/// (`Segment_ID`, `Distance (m)`, optional `Residences`, `OLT_ID`, `Slack_Ratio`).
pub fn read_readings<R: Read>(reader: R) -> Result<TableRows<OtdrReading>, AppError> {
    read_table(reader, READINGS_TABLE, &["segment_id", "distance_m"], |row| {
        let distance_m = row.required_f64("distance_m")?;
        if distance_m < 0.0 {
            return Err(format!("Negative OTDR distance {distance_m}."));
        }
        let slack_ratio = match row.optional("slack_ratio") {
            Some(raw) => Some(parse_f64("slack_ratio", raw)?),
            None => None,
        };
        Ok(OtdrReading {
            line: row.line,
            segment_id: row.required("segment_id")?.to_string(),
            city: row.optional("residences").map(str::to_string),
            olt: row
                .optional("olt_id")
                .or_else(|| row.optional("olt_name"))
                .map(str::to_string),
            distance_m,
            slack_ratio,
        })
    })
}

struct Row<'a> {
    record: &'a StringRecord,
    header_map: &'a HashMap<String, usize>,
    line: usize,
}

impl<'a> Row<'a> {
    fn optional(&self, name: &str) -> Option<&'a str> {
        let idx = self.header_map.get(name)?;
        self.record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
    }

    fn required(&self, name: &str) -> Result<&'a str, String> {
        self.optional(name)
            .ok_or_else(|| format!("Missing required value: `{name}`"))
    }

    fn required_f64(&self, name: &str) -> Result<f64, String> {
        parse_f64(name, self.required(name)?)
    }

    fn id_hint(&self) -> Option<String> {
        ["pole_id", "segment_id", "olt_id"]
            .iter()
            .find_map(|k| self.optional(k))
            .map(str::to_string)
    }
}

fn read_table<R, T, F>(
    reader: R,
    table: &'static str,
    required: &[&str],
    mut parse: F,
) -> Result<TableRows<T>, AppError>
where
    R: Read,
    F: FnMut(&Row<'_>) -> Result<T, String>,
{
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read {table} headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    for name in required {
        if !header_map.contains_key(*name) {
            return Err(AppError::new(
                2,
                format!("Missing required column in {table}: `{name}`"),
            ));
        }
    }

    let mut rows = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // Line 1 is the header.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    table,
                    line,
                    id: None,
                    segment_id: None,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        // Spreadsheet exports often end with fully blank rows.
        if record.iter().all(|f| f.trim().is_empty()) {
            rows_read -= 1;
            continue;
        }

        let row = Row {
            record: &record,
            header_map: &header_map,
            line,
        };
        match parse(&row) {
            Ok(value) => rows.push(value),
            Err(message) => row_errors.push(RowError {
                table,
                line,
                id: row.id_hint(),
                segment_id: row.optional("segment_id").map(str::to_string),
                message,
            }),
        }
    }

    Ok(TableRows {
        rows,
        row_errors,
        rows_read,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    let mut map = HashMap::new();
    for (idx, name) in headers.iter().enumerate() {
        // Duplicate headers resolve to the leftmost column.
        map.entry(normalize_header_name(name)).or_insert(idx);
    }
    map
}

/// `"\u{feff}Distance (m)"` -> `"distance_m"`, `"OLT Name"` -> `"olt_name"`.
fn normalize_header_name(name: &str) -> String {
    let name = name.trim().trim_start_matches('\u{feff}');
    let mut out = String::with_capacity(name.len());
    let mut pending_sep = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(ch.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }
    out
}

fn parse_f64(name: &str, raw: &str) -> Result<f64, String> {
    // Some locales export decimals with a comma.
    let normalized = if raw.contains(',') && !raw.contains('.') {
        raw.replace(',', ".")
    } else {
        raw.to_string()
    };
    match normalized.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(format!("Invalid number for `{name}`: '{raw}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_names_are_normalized() {
        assert_eq!(normalize_header_name("\u{feff}Pole_ID"), "pole_id");
        assert_eq!(normalize_header_name(" Distance (m) "), "distance_m");
        assert_eq!(normalize_header_name("OLT Name"), "olt_name");
        assert_eq!(normalize_header_name("Slack-Ratio"), "slack_ratio");
    }

    #[test]
    fn poles_parse_and_report_bad_rows() {
        let csv = "\u{feff}Pole_ID,Latitude,Longitude\n\
                   P1,10.0,100.0\n\
                   P2,abc,100.0\n\
                   P3,95.0,100.0\n\
                   P1,11.0,101.0\n\
                   ,,\n\
                   P4,\"10,5\",100.0\n";
        let t = read_poles(csv.as_bytes()).unwrap();
        assert_eq!(t.rows_read, 5);
        assert_eq!(t.rows.len(), 2);
        assert_eq!(t.rows[0].position, Coordinate::new(10.0, 100.0));
        assert_eq!(t.rows[1].position, Coordinate::new(10.5, 100.0));

        let lines: Vec<usize> = t.row_errors.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![3, 4, 5]);
        assert_eq!(t.row_errors[0].id.as_deref(), Some("P2"));
        assert!(t.row_errors[2].message.contains("Duplicate"));
    }

    #[test]
    fn segments_keep_row_order_and_trim_fields() {
        let csv = "Residences,OLT_ID,OLT_Name,Segment_ID,Pole_ID,Distance (m)\n\
                   Bandung , OLT-1,Cibiru,S1,P1,300\n\
                   Bandung,OLT-1,,S1,P2,200\n\
                   Bandung,OLT-1,,S1,P3,-5\n";
        let t = read_segments(csv.as_bytes()).unwrap();
        assert_eq!(t.rows.len(), 2);
        assert_eq!(t.rows[0].residences, "Bandung");
        assert_eq!(t.rows[0].olt_id, "OLT-1");
        assert_eq!(t.rows[0].olt_name.as_deref(), Some("Cibiru"));
        assert_eq!(t.rows[1].olt_name, None);
        assert_eq!(t.rows[1].pole_id, "P2");
        assert_eq!(t.row_errors.len(), 1);
        assert_eq!(t.row_errors[0].line, 4);
        assert_eq!(t.row_errors[0].segment_id.as_deref(), Some("S1"));
    }

    #[test]
    fn segment_rows_without_segment_id_fail_the_load() {
        let poles = read_poles("Pole_ID,Latitude,Longitude\nP1,10.0,100.0\n".as_bytes()).unwrap();
        let segments = read_segments(
            "Residences,OLT_ID,Segment_ID,Pole_ID,Distance (m)\n\
             Bandung,OLT-1,S1,P1,0\n\
             Bandung,OLT-1,,P2,40\n"
                .as_bytes(),
        )
        .unwrap();
        assert_eq!(segments.row_errors[0].segment_id, None);
        let olts = read_olts("Residences,OLT_ID\nBandung,OLT-1\n".as_bytes()).unwrap();

        let err = build_network(poles, segments, olts).unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("segments line 3"), "{err}");
    }

    #[test]
    fn missing_required_column_fails_fast() {
        let csv = "Residences,OLT_ID,Segment_ID,Pole_ID\nX,Y,Z,P\n";
        let err = read_segments(csv.as_bytes()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("`distance_m`"), "{err}");
    }

    #[test]
    fn readings_accept_optional_columns() {
        let csv = "Segment_ID,Distance (m),Residences,OLT_ID,Slack_Ratio\n\
                   S1,250,Bandung,OLT-1,\n\
                   S2,1200.5,,,1.05\n\
                   S3,-1,,,\n";
        let t = read_readings(csv.as_bytes()).unwrap();
        assert_eq!(t.rows.len(), 2);
        assert_eq!(t.rows[0].line, 2);
        assert_eq!(t.rows[0].city.as_deref(), Some("Bandung"));
        assert_eq!(t.rows[0].slack_ratio, None);
        assert_eq!(t.rows[1].olt, None);
        assert_eq!(t.rows[1].slack_ratio, Some(1.05));
        assert_eq!(t.row_errors.len(), 1);
    }

    #[test]
    fn row_error_display_includes_table_and_line() {
        let e = RowError {
            table: POLES_TABLE,
            line: 7,
            id: Some("P7".to_string()),
            segment_id: None,
            message: "bad".to_string(),
        };
        assert_eq!(e.to_string(), "poles line 7 (P7): bad");
    }
}
